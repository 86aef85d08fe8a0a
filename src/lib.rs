pub mod core;
pub mod plugins;
pub mod shared;
pub mod storage;

use crate::core::settings::load_settings;
use crate::plugins::gifs::TenorClient;
use crate::shared::errors::ServerError;

/// Loads settings and serves the GIF proxy until ctrl-c.
///
/// The binary is only the proxy; hosts that embed the store build it with
/// `plugins::progress::init_progress_store` and keep it in sync with
/// `core::watch::watch_store`.
pub async fn run() -> Result<(), ServerError> {
    let settings = load_settings();
    let addr = settings.listen_addr()?;

    let tenor = TenorClient::new(settings.tenor_config());
    plugins::gifs::serve(addr, tenor).await?;
    Ok(())
}
