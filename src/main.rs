use progress_lib::core::logging::init_logging;

#[tokio::main]
async fn main() {
    let _guards = init_logging();

    if let Err(e) = progress_lib::run().await {
        tracing::error!(target: "system", error = %e, "Progress server stopped");
        std::process::exit(1);
    }
}
