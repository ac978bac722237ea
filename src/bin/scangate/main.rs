//! scangate CLI entry point.
//!
//! Runs a scan session against standard input in keyboard-wedge mode: each
//! line is a decoded QR payload (USB scanners in keyboard mode type the code
//! followed by Enter), and a bare Enter resumes scanning after a result.

mod cli;

use clap::Parser;
use cli::Cli;
use scangate::feed::KeyboardWedgeFeed;
use scangate::{SessionBuilder, SessionEvent};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("scangate v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = cli.into_config()?;

    // Build the session
    let mut session = SessionBuilder::new(config).build()?;

    // Render events as operator-facing lines
    let mut events = session.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            render(&event);
        }
    });

    // Feed the session from stdin
    let feed = KeyboardWedgeFeed::new(session.handle());
    tokio::spawn(async move {
        if let Err(e) = feed.pump_stdin().await {
            warn!("Decode feed stopped: {e}");
        }
    });

    // Run until shutdown
    session.run().await?;

    info!("Goodbye!");
    Ok(())
}

/// Render one session event for the operator.
fn render(event: &SessionEvent) {
    match event {
        SessionEvent::Started => println!("Ready to scan."),
        SessionEvent::ModeChanged { mode } => println!("[{}]", mode.label()),
        SessionEvent::DecodeFailed { message } => println!("Scanner problem: {message}"),
        SessionEvent::OutcomeReady { category } => {
            println!("== {} ==", category.title());
            println!("{}", category.message());
            println!("(press Enter to scan the next ticket)");
        }
        SessionEvent::ShuttingDown => println!("Closing."),
        // Accepted/suppressed scans are visible in the logs, not the card.
        SessionEvent::ScanAccepted { .. } | SessionEvent::ScanSuppressed { .. } => {}
    }
}
