//! Delete command handler

use anyhow::Result;
use uuid::Uuid;

use parley_core::{Config, SyncError, SyncEvent};

use crate::output::Output;
use crate::session;

/// Delete a message; the id is absent from the list when this returns
pub async fn run(mut config: Config, id: Uuid, offline: bool, output: &Output) -> Result<()> {
    let mut session = session::start(&mut config, offline)?;
    let list = session::initial_list(&mut session.handle).await?;

    if !list.iter().any(|m| m.id == id) {
        session.handle.stop().await;
        anyhow::bail!("No message with id {}", id);
    }

    session.handle.delete(id).await?;

    loop {
        match session::next_event(&mut session.handle).await? {
            SyncEvent::ListChanged(messages) if messages.iter().all(|m| m.id != id) => break,
            SyncEvent::Error(SyncError::RemoteOperationFailed(reason)) => {
                session.handle.stop().await;
                anyhow::bail!("The feed rejected the delete: {}", reason);
            }
            _ => {}
        }
    }

    output.success("Message deleted");

    session.handle.stop().await;
    Ok(())
}
