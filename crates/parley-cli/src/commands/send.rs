//! Send command handler

use std::time::Duration;

use anyhow::Result;

use parley_core::{Config, Draft, Message, SyncError, SyncEvent};

use crate::output::{Output, OutputFormat};
use crate::session;

/// Send a message through the engine
///
/// Online, the command finishes when the feed echoes the message back
/// through the live subscription; offline, when the local write lands.
pub async fn run(mut config: Config, draft: Draft, offline: bool, output: &Output) -> Result<()> {
    let mut session = session::start(&mut config, offline)?;
    let before = session::initial_list(&mut session.handle).await?;

    session.handle.send(draft).await?;

    let sent = loop {
        match session::next_event(&mut session.handle).await? {
            SyncEvent::ListChanged(messages) => {
                if let Some(message) = newly_sent(&before, &messages, &session.author.id) {
                    break message.clone();
                }
            }
            SyncEvent::Error(SyncError::RemoteOperationFailed(reason)) => {
                session.handle.stop().await;
                anyhow::bail!("The feed rejected the message: {}", reason);
            }
            _ => {}
        }
    };

    match output.format {
        OutputFormat::Human => output.success("Message sent"),
        OutputFormat::Json => output.print_message(&sent),
        OutputFormat::Quiet => println!("{}", sent.id),
    }

    // A transient-failure notice may trail the local fallback write
    if let Ok(Some(SyncEvent::Error(SyncError::ConnectivityTransient(reason)))) =
        tokio::time::timeout(Duration::from_millis(200), session.handle.next_event()).await
    {
        if !output.is_quiet() {
            eprintln!("⚠ Not delivered to the feed ({}); kept in the local cache.", reason);
        }
    }

    session.handle.stop().await;
    Ok(())
}

/// The message that appeared since `before`, authored by us
fn newly_sent<'a>(
    before: &[Message],
    after: &'a [Message],
    author_id: &str,
) -> Option<&'a Message> {
    after
        .iter()
        .find(|m| m.author.id == author_id && !before.iter().any(|b| b.id == m.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{Author, Draft};

    #[test]
    fn test_newly_sent_picks_our_new_message() {
        let ours = Author::new("me", "Me");
        let theirs = Author::new("them", "Them");

        let old = Draft::text("old").into_message(ours.clone());
        let incoming = Draft::text("incoming").into_message(theirs);
        let sent = Draft::text("sent").into_message(ours);

        let before = vec![old.clone()];
        let after = vec![sent.clone(), incoming, old];

        let found = newly_sent(&before, &after, "me").unwrap();
        assert_eq!(found.id, sent.id);
    }

    #[test]
    fn test_newly_sent_ignores_unchanged_list() {
        let ours = Author::new("me", "Me");
        let old = Draft::text("old").into_message(ours);

        let list = vec![old];
        assert!(newly_sent(&list, &list, "me").is_none());
    }
}
