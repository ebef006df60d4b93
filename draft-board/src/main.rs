// Draft board entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the shared HTTP client
// 4. Load the player catalog
// 5. Fetch team names
// 6. Generate the snake draft order
// 7. Open the draft session (load persisted picks)
// 8. Create mpsc channels
// 9. Spawn app logic task
// 10. Run the TUI until the user quits
// 11. Cleanup on exit

use std::collections::HashMap;

use draft_board::app;
use draft_board::catalog::players::PlayerCatalog;
use draft_board::catalog::teams::TeamDirectory;
use draft_board::config;
use draft_board::draft::order;
use draft_board::protocol::Notice;
use draft_board::session::DraftSession;
use draft_board::store::{self, Persistence};
use draft_board::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Draft board starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} participants, {} rounds",
        config.league.name,
        config.league.participants.len(),
        config.league.rounds
    );

    // 3. Shared HTTP client
    let http = store::http_client(config.store.http_timeout())
        .context("failed to build HTTP client")?;

    // 4. Load the player catalog
    let catalog = PlayerCatalog::load_from_config(&config)
        .context("failed to load player catalog")?;
    info!("Loaded {} players from {}", catalog.len(), config.data_paths.players);

    let mut notices = Vec::new();

    // 5. Team names (display only, so a failure is not fatal)
    let teams = match TeamDirectory::fetch(&http, &config.metadata.bootstrap_url).await {
        Ok(teams) => teams,
        Err(e) => {
            warn!("Could not load team names: {}", e);
            notices.push(Notice::warning(format!(
                "Team names unavailable ({e}); showing team ids"
            )));
            TeamDirectory::empty()
        }
    };

    // 6. Snake draft order
    let draft_order = order::generate(&config.league.participants, config.league.rounds);
    info!("Generated draft order with {} picks", draft_order.len());

    // 7. Open the draft session
    let (persistence, store_warning) = Persistence::from_config(&config, http);
    notices.extend(store_warning.map(Notice::warning));

    let (session, load_warning) = DraftSession::open(draft_order, persistence).await;
    notices.extend(load_warning.map(Notice::warning));

    let participant_names: HashMap<_, _> = config
        .league
        .participants
        .iter()
        .map(|&id| (id, config.league.participant_name(id)))
        .collect();
    let session = session.with_participant_names(participant_names);

    let app_state = app::AppState::new(session, catalog, teams).with_notices(notices);

    // 8. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 9. Spawn app logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 10. Run the TUI event loop (blocks until the user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 11. Cleanup: wait for the app task to finish any in-flight write
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Draft board shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draft-board.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draft_board=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
