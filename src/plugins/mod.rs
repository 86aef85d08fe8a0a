pub mod gifs;
pub mod progress;
