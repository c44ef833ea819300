#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    // Set up logging; RUST_LOG=debug shows editor activity
    env_logger::init();

    // File dialogs are spawned onto this runtime
    flowchart_editor::run_app()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
