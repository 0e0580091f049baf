//! Watch command handler

use anyhow::Result;

use parley_core::{Config, ConnectivityState, EngineState, SyncEvent};

use crate::output::Output;
use crate::session;

/// Follow the live message list, reprinting it on every change
pub async fn run(mut config: Config, offline: bool, output: &Output) -> Result<()> {
    let mut session = session::start(&mut config, offline)?;

    let mode = match session.monitor.current() {
        ConnectivityState::Online => "online",
        ConnectivityState::Offline => "offline",
    };
    output.message(&format!(
        "Watching '{}' in {} mode (Ctrl-C to stop)",
        config.channel, mode
    ));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = session.handle.next_event() => {
                match event {
                    None => break,
                    Some(SyncEvent::ListChanged(messages)) => output.print_messages(&messages),
                    Some(SyncEvent::StateChanged(state)) => {
                        output.message(&format!("-- {} --", state_label(state)));
                    }
                    Some(SyncEvent::Error(error)) => {
                        if !output.is_quiet() {
                            eprintln!("⚠ {}", error);
                        }
                    }
                }
            }
        }
    }

    session.handle.stop().await;
    output.message("Stopped.");
    Ok(())
}

fn state_label(state: EngineState) -> &'static str {
    match state {
        EngineState::Uninitialized => "starting",
        EngineState::SyncingOnline => "syncing online",
        EngineState::SyncingOffline => "offline, serving the cached list",
        EngineState::Stopped => "stopped",
    }
}
