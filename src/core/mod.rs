pub mod debounce;
pub mod logging;
pub mod settings;
pub mod watch;
