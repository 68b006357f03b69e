use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;

use lifecycle_wizard::config::WizardConfig;
use lifecycle_wizard::repl::Repl;
use lifecycle_wizard::server::fixture_routes;
use lifecycle_wizard::source::{DirSource, DocumentSource, HttpSource};
use lifecycle_wizard::views::PresentationMode;
use lifecycle_wizard::wizard::WizardController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = WizardConfig::from_env().context("reading WIZARD_* configuration")?;
    let mode = PresentationMode::from_query(&config.query);
    let base_url = config.effective_base_url();

    eprintln!("📱 Lifecycle Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Documents: {}", base_url);
    if !mode.shows_chrome() {
        eprintln!("   Presentation: screenshot");
    }

    // ── Fixture server ──────────────────────────────────────────────────
    if config.base_url.is_none() {
        config
            .ensure_fixtures_dir()
            .with_context(|| format!("fixture directory {}", config.fixtures_dir.display()))?;

        let addr = config.socket_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding fixture server to {addr}"))?;
        let app = fixture_routes(config.fixtures_dir.clone());
        tokio::spawn(async move {
            tracing::info!(%addr, "Fixture server started");
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fixture server stopped");
            }
        });
        eprintln!("   Fixtures: {}", config.fixtures_dir.display());
    }

    // ── Wizard ──────────────────────────────────────────────────────────
    let source: Arc<dyn DocumentSource> = match base_url.strip_prefix("file://") {
        Some(dir) => Arc::new(DirSource::new(dir)),
        None => Arc::new(HttpSource::new(base_url.clone())),
    };
    let controller = WizardController::new(source);
    eprintln!("   Session: {}", controller.session_id());
    eprintln!("   Type 'help' for commands, 'quit' to exit.\n");

    if let Err(e) = controller.start().await.await {
        tracing::warn!(error = %e, "Initial load did not finish");
    }

    let mut repl = Repl::new(controller, mode);
    repl.run(BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
