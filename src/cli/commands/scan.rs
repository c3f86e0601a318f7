//! Foreground scan command handler

use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::config::Config;
use crate::domain::EpisodeKey;
use crate::domain::events::ScanEvent;
use crate::services::ScanScope;
use crate::state::SharedState;

pub async fn cmd_scan(config: Config, show: Option<usize>) -> anyhow::Result<()> {
    let state = SharedState::new(config, None).await?;

    let scope = match show {
        Some(index) => {
            state.library.read().await.show(index)?;
            ScanScope::Show(index)
        }
        None => ScanScope::All,
    };

    let mut events = state.event_bus.subscribe();
    if !state.scanner.start(scope).await {
        anyhow::bail!("A scan is already running");
    }
    println!("Scanning... press Ctrl+C to stop after the current step.");

    let mut stop_requested = false;
    loop {
        tokio::select! {
            result = signal::ctrl_c(), if !stop_requested => {
                if let Err(e) = result {
                    warn!("Error listening for Ctrl+C: {}", e);
                }
                stop_requested = true;
                state.scanner.stop().await;
            }
            received = events.recv() => match received {
                Ok(event) => {
                    let finished = matches!(event, ScanEvent::ScanFinished { .. });
                    if let Some(line) = describe(&event) {
                        println!("{line}");
                    }
                    if finished {
                        break;
                    }
                }
                Err(RecvError::Lagged(count)) => {
                    warn!("Missed {} scan events", count);
                    if !state.scanner.is_active().await {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    state.scanner.wait().await;
    Ok(())
}

fn describe(event: &ScanEvent) -> Option<String> {
    Some(match event {
        ScanEvent::ScanStarted { shows } => format!("Scanning {shows} show(s)"),
        ScanEvent::ScanFinished {
            matches,
            shows_scanned,
            stopped,
        } => {
            let verb = if *stopped { "stopped" } else { "finished" };
            format!("Scan {verb}: {matches} match(es) across {shows_scanned} show(s)")
        }
        ScanEvent::StopRequested => "Stopping after the current step...".to_string(),
        ScanEvent::ShowStarted { show } => format!("▶ {show}"),
        ScanEvent::ShowFinished { show, acquired } => {
            format!("  {show}: {acquired} episode(s) acquired")
        }
        ScanEvent::EpisodeChecking { .. } => return None,
        ScanEvent::EpisodeNotFound {
            season, episode, ..
        } => format!(
            "  {} not found, later episodes are probably not out yet",
            EpisodeKey::new(*season, *episode)
        ),
        ScanEvent::MatchFound {
            title, acquired, ..
        } => {
            let keys: Vec<String> = acquired
                .iter()
                .map(|[season, episode]| EpisodeKey::new(*season, *episode).to_string())
                .collect();
            format!("  ✓ {title} [{}]", keys.join(" "))
        }
        ScanEvent::Error { message } => format!("  ✗ {message}"),
        ScanEvent::Info { message } => format!("  {message}"),
    })
}
