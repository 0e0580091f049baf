//! Data models for Parley
//!
//! Defines the core data structures: Message, Author, Draft, and the
//! ordered MessageList the sync engine maintains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The sender of a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Stable identifier for the sender
    pub id: String,
    /// Display name
    pub name: String,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A geographic coordinate pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single chat message
///
/// At least one of `text`, `image`, or `location` is present in a
/// well-formed message; [`Draft`] enforces this at the send boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier
    pub id: Uuid,
    /// When this message was created
    pub created_at: DateTime<Utc>,
    /// Who sent it
    pub author: Author,
    /// Text body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Shared location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl Message {
    /// Create a text message stamped with a fresh id and the current time
    pub fn text(author: Author, body: impl Into<String>) -> Self {
        Draft::text(body).into_message(author)
    }
}

/// A ready-to-send payload, produced by capture flows (text input, image
/// picker, location share) before the engine stamps identity and time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub text: Option<String>,
    pub image: Option<String>,
    pub location: Option<Coordinates>,
}

impl Draft {
    /// A text draft
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            text: Some(body.into()),
            ..Self::default()
        }
    }

    /// An image draft referencing an already-uploaded URI
    pub fn image(uri: impl Into<String>) -> Self {
        Self {
            image: Some(uri.into()),
            ..Self::default()
        }
    }

    /// A location draft
    pub fn location(latitude: f64, longitude: f64) -> Self {
        Self {
            location: Some(Coordinates {
                latitude,
                longitude,
            }),
            ..Self::default()
        }
    }

    /// True when no payload is present; empty drafts are rejected by the
    /// engine before anything is stamped or persisted.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none() && self.location.is_none()
    }

    /// Stamp the draft into a full message
    pub fn into_message(self, author: Author) -> Message {
        Message {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            author,
            text: self.text,
            image: self.image,
            location: self.location,
        }
    }
}

/// Ordered, identifier-unique message list
///
/// Invariants held by every mutation path: sorted by `created_at`
/// descending (newest first, ties broken by id so the order is total),
/// and no two entries share an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from arbitrary messages, sorting and deduplicating.
    /// When two entries share an id the first occurrence wins.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        let mut list = Self::new();
        for message in messages {
            list.insert(message);
        }
        list
    }

    /// Insert a message at its sorted position
    ///
    /// Returns false (and leaves the list unchanged) if the id is already
    /// present.
    pub fn insert(&mut self, message: Message) -> bool {
        if self.contains(&message.id) {
            return false;
        }
        let pos = self
            .messages
            .partition_point(|m| Self::sort_key(m) < Self::sort_key(&message));
        self.messages.insert(pos, message);
        true
    }

    /// Remove a message by id, returning whether it was present
    pub fn remove(&mut self, id: &Uuid) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| m.id != *id);
        self.messages.len() != before
    }

    /// Replace the whole list with a remote snapshot
    pub fn replace(&mut self, messages: Vec<Message>) {
        *self = Self::from_messages(messages);
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.messages.iter().any(|m| m.id == *id)
    }

    /// Messages, newest first
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    // Descending creation time; partition_point sees ascending keys, so
    // the key inverts the timestamp ordering via Reverse.
    fn sort_key(message: &Message) -> (std::cmp::Reverse<DateTime<Utc>>, Uuid) {
        (std::cmp::Reverse(message.created_at), message.id)
    }
}

impl IntoIterator for MessageList {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}
