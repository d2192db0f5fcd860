//! SBT Mint: connect a wallet, switch to Base and mint a soul-bound token

mod app;
mod bridge;
mod ui;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting SBT Mint");

    let bridge = bridge::MintBridge::new()?;
    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("SBT Mint")
            .with_inner_size([520.0, 560.0])
            .with_min_inner_size([420.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "SBT Mint",
        native_options,
        Box::new(|cc| Ok(Box::new(app::App::new(cc, bridge)))),
    )
    .map_err(|e| eyre::eyre!("eframe exited with error: {e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    tracing_wasm::set_as_global_default();
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = start_web().await {
            tracing::error!(error = %e, "failed to start SBT Mint");
        }
    });
}

#[cfg(target_arch = "wasm32")]
async fn start_web() -> eyre::Result<()> {
    use wasm_bindgen::JsCast;

    let bridge = bridge::MintBridge::new()?;
    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("sbt_mint_canvas"))
        .ok_or_else(|| eyre::eyre!("canvas #sbt_mint_canvas not found"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| eyre::eyre!("#sbt_mint_canvas is not a canvas"))?;

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(|cc| Ok(Box::new(app::App::new(cc, bridge)))),
        )
        .await
        .map_err(|e| eyre::eyre!("web runner failed: {e:?}"))
}
