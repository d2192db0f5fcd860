//! Bridge between the egui shell and the mint workspace crates.
//! The shell never talks to the adapters directly.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eframe::egui;
use tokio::sync::Mutex;

use sbt_mint_adapters::{Eip1193Adapter, MintAdapterConfig, PublicRpcAdapter, SharedView};
use sbt_mint_core::{Deployment, WalletPort, WalletSessionController};

type MintController = WalletSessionController<Eip1193Adapter, PublicRpcAdapter, SharedView>;

/// Seconds between polls of a wallet that cannot push notifications.
const WALLET_POLL_SECS: f64 = 2.0;

#[derive(Clone)]
pub struct MintBridge {
    controller: Arc<Mutex<MintController>>,
    /// Shares provider state with the controller's adapter.
    wallet: Eip1193Adapter,
    view: SharedView,
    deployment: Deployment,
    busy: Arc<AtomicBool>,
    pumping: Arc<AtomicBool>,
    /// egui time of the last polling pump.
    last_poll: Arc<std::sync::Mutex<f64>>,
    #[cfg(not(target_arch = "wasm32"))]
    runtime: Arc<tokio::runtime::Runtime>,
}

impl MintBridge {
    pub fn new() -> eyre::Result<Self> {
        let config = MintAdapterConfig::from_env();
        let wallet = Eip1193Adapter::with_config(config.clone());
        let view = SharedView::new();
        tracing::info!(
            wallet = wallet.mode_name(),
            rpc = %config.public_rpc_url,
            "mint bridge ready"
        );

        let deployment = Deployment::default();
        let controller = WalletSessionController::with_deployment(
            wallet.clone(),
            PublicRpcAdapter::with_config(&config),
            view.clone(),
            deployment.clone(),
        );

        Ok(Self {
            controller: Arc::new(Mutex::new(controller)),
            wallet,
            view,
            deployment,
            busy: Arc::new(AtomicBool::new(false)),
            pumping: Arc::new(AtomicBool::new(false)),
            last_poll: Arc::new(std::sync::Mutex::new(f64::NEG_INFINITY)),
            #[cfg(not(target_arch = "wasm32"))]
            runtime: Arc::new(tokio::runtime::Runtime::new()?),
        })
    }

    pub fn view(&self) -> &SharedView {
        &self.view
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn wallet_available(&self) -> bool {
        self.wallet.is_available()
    }

    /// A user-triggered operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn initialize(&self, ctx: &egui::Context) {
        self.run_exclusive(ctx, |controller| async move {
            controller.lock().await.initialize().await;
        });
    }

    pub fn connect(&self, ctx: &egui::Context) {
        self.run_exclusive(ctx, |controller| async move {
            controller.lock().await.connect().await;
        });
    }

    /// Mints, or connects first when there is no session yet.
    pub fn mint(&self, ctx: &egui::Context) {
        self.run_exclusive(ctx, |controller| async move {
            controller.lock().await.mint().await;
        });
    }

    pub fn show_balance(&self, ctx: &egui::Context) {
        self.run_exclusive(ctx, |controller| async move {
            controller.lock().await.display_balance().await;
        });
    }

    pub fn refresh_owned_count(&self, ctx: &egui::Context) {
        self.run(ctx, |controller| async move {
            controller.lock().await.fetch_owned_count().await;
        });
    }

    /// Applies queued wallet notifications. Cheap to call every frame.
    pub fn pump_pending_events(&self, ctx: &egui::Context) {
        if !(self.wallet.pending_event_count() > 0 || self.poll_due(ctx))
            || self.pumping.swap(true, Ordering::SeqCst)
        {
            return;
        }
        let pumping = Arc::clone(&self.pumping);
        self.run(ctx, move |controller| async move {
            let applied = controller.lock().await.pump_events().await;
            tracing::debug!(applied, "wallet notifications applied");
            pumping.store(false, Ordering::SeqCst);
        });
    }

    fn poll_due(&self, ctx: &egui::Context) -> bool {
        if !self.wallet.polls_for_events() {
            return false;
        }
        let now = ctx.input(|i| i.time);
        let Ok(mut last) = self.last_poll.lock() else {
            return false;
        };
        if now - *last < WALLET_POLL_SECS {
            return false;
        }
        *last = now;
        true
    }

    /// Best effort: skipped while another operation holds the controller.
    pub fn teardown(&self) {
        match self.controller.try_lock() {
            Ok(mut controller) => controller.teardown(),
            Err(_) => tracing::debug!("controller busy during teardown"),
        }
    }

    fn run_exclusive<F, Fut>(&self, ctx: &egui::Context, op: F)
    where
        F: FnOnce(Arc<Mutex<MintController>>) -> Fut + RunBound + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        if self.busy.swap(true, Ordering::SeqCst) {
            tracing::debug!("operation already in flight");
            return;
        }
        let busy = Arc::clone(&self.busy);
        self.run(ctx, move |controller| async move {
            op(controller).await;
            busy.store(false, Ordering::SeqCst);
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn run<F, Fut>(&self, ctx: &egui::Context, op: F)
    where
        F: FnOnce(Arc<Mutex<MintController>>) -> Fut + RunBound + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let controller = Arc::clone(&self.controller);
        let runtime = Arc::clone(&self.runtime);
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            runtime.block_on(op(controller));
            ctx.request_repaint();
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn run<F, Fut>(&self, ctx: &egui::Context, op: F)
    where
        F: FnOnce(Arc<Mutex<MintController>>) -> Fut + RunBound + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let controller = Arc::clone(&self.controller);
        let ctx = ctx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            op(controller).await;
            ctx.request_repaint();
        });
    }
}

/// Native operations run on a worker thread; browser ones stay on the page's
/// single thread.
#[cfg(not(target_arch = "wasm32"))]
pub trait RunBound: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> RunBound for T {}

#[cfg(target_arch = "wasm32")]
pub trait RunBound {}
#[cfg(target_arch = "wasm32")]
impl<T> RunBound for T {}
