//! Platform layer: async runtime & event loop.
//!
//! Two loaders run concurrently on a single-threaded runtime; each reports
//! back exactly once over a channel. Events are applied to [`AppState`] one
//! at a time and the view is re-derived after every change.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use asset::{AssetSource, load_mesh, load_texture};
use renderer::Renderer;
use scene::compose::PLACEHOLDER;
use scene::{AppEvent, AppState, View, view};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Everything the binary can configure.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    /// HTTP base URL or local directory holding `Pod.png` and `Pod.obj.txt`.
    pub assets: String,
    /// Where the rendered frame is written (PNG).
    pub output: PathBuf,
    pub backends: wgpu::Backends,
}

/// Load both assets, render the scene once they are in, write it out.
/// Fails if the assets never became available.
pub fn run_viewer(config: ViewerConfig) -> Result<()> {
    let source = AssetSource::parse(&config.assets)
        .with_context(|| format!("Bad asset location: {}", config.assets))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut presenter = Presenter::new(config.backends, config.output);
    let state = runtime.block_on(async move {
        let events = spawn_loaders(source);
        drive(events, |view| presenter.present(view)).await
    })?;

    if !state.is_ready() {
        bail!("Assets unavailable; view stuck at '{}'", PLACEHOLDER);
    }
    Ok(())
}

/// Start both fetches. Each sends one event and drops its sender.
pub fn spawn_loaders(source: AssetSource) -> UnboundedReceiver<AppEvent> {
    let (tx, rx) = unbounded_channel();

    let texture_tx = tx.clone();
    let texture_source = source.clone();
    tokio::spawn(async move {
        let result = load_texture(&texture_source).await;
        let _ = texture_tx.send(AppEvent::TextureLoaded(result));
    });

    tokio::spawn(async move {
        let result = load_mesh(&source).await;
        let _ = tx.send(AppEvent::MeshLoaded(result));
    });

    rx
}

/// Apply events until every sender is gone, presenting the view after the
/// initial state and after each event. Returns the final state.
pub async fn drive<F>(mut events: UnboundedReceiver<AppEvent>, mut present: F) -> Result<AppState>
where
    F: FnMut(View<'_>) -> Result<()>,
{
    let mut state = AppState::default();
    present(view(&state))?;

    while let Some(event) = events.recv().await {
        log_event(&event);
        let was_stuck = state.is_stuck();
        state = state.update(event);
        if became_stuck(was_stuck, &state) {
            log::warn!("An asset failed to load; it will not be retried");
        }
        present(view(&state))?;
    }

    Ok(state)
}

/// True only on the event that first makes the state unreachable.
fn became_stuck(was_stuck: bool, state: &AppState) -> bool {
    !was_stuck && state.is_stuck()
}

fn log_event(event: &AppEvent) {
    match event {
        AppEvent::TextureLoaded(Ok(_)) => log::info!("Texture ready"),
        AppEvent::TextureLoaded(Err(err)) => log::warn!("Texture unavailable: {err}"),
        AppEvent::MeshLoaded(Ok(_)) => log::info!("Mesh ready"),
        AppEvent::MeshLoaded(Err(err)) => log::warn!("Mesh unavailable: {err}"),
    }
}

/// Turns views into output: placeholder text goes to the log, scenes are
/// rasterized and written as PNG. The GPU is only touched for a scene.
struct Presenter {
    backends: wgpu::Backends,
    output: PathBuf,
    renderer: Option<Renderer>,
}

impl Presenter {
    fn new(backends: wgpu::Backends, output: PathBuf) -> Self {
        Self {
            backends,
            output,
            renderer: None,
        }
    }

    fn present(&mut self, view: View<'_>) -> Result<()> {
        let scene = match view {
            View::Placeholder(text) => {
                log::info!("{}", text);
                return Ok(());
            }
            View::Scene(scene) => scene,
        };

        let renderer = match self.renderer.take() {
            Some(renderer) => renderer,
            None => Renderer::new(self.backends)?,
        };
        let frame = renderer.render(&scene)?;
        self.renderer = Some(renderer);

        frame
            .save(&self.output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;
        log::info!("Wrote {}", self.output.display());
        Ok(())
    }
}
