//! Session activity feed.
//!
//! The feed is append-only. Every item receives a `sequence` number from the
//! aggregate when it is appended; that number, not the wall-clock
//! `timestamp`, defines the order clients see.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{FeedItemId, Timestamp, UserId};

use super::participant::ParticipantRole;

/// Maximum length (in characters) of user-supplied feed content.
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// Discriminant of a feed item, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedItemType {
    UserJoined,
    UserLeft,
    ActivityCompleted,
    SetCompleted,
    MilestoneAchieved,
    Encouragement,
    ChatMessage,
}

impl FeedItemType {
    /// Types clients may post directly. The rest are produced by commands.
    pub fn is_postable(&self) -> bool {
        matches!(
            self,
            FeedItemType::ChatMessage
                | FeedItemType::Encouragement
                | FeedItemType::MilestoneAchieved
        )
    }
}

impl fmt::Display for FeedItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedItemType::UserJoined => "user_joined",
            FeedItemType::UserLeft => "user_left",
            FeedItemType::ActivityCompleted => "activity_completed",
            FeedItemType::SetCompleted => "set_completed",
            FeedItemType::MilestoneAchieved => "milestone_achieved",
            FeedItemType::Encouragement => "encouragement",
            FeedItemType::ChatMessage => "chat_message",
        };
        write!(f, "{}", s)
    }
}

/// Feed item payload. Each variant carries the metadata its type needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedItemKind {
    UserJoined {
        role: ParticipantRole,
    },
    UserLeft,
    ActivityCompleted {
        activity: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weight: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reps: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_seconds: Option<u32>,
    },
    SetCompleted {
        activity: String,
        set_number: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weight: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reps: Option<u32>,
    },
    MilestoneAchieved {
        milestone_id: String,
    },
    Encouragement {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target_user_id: Option<UserId>,
    },
    ChatMessage,
}

impl FeedItemKind {
    pub fn item_type(&self) -> FeedItemType {
        match self {
            FeedItemKind::UserJoined { .. } => FeedItemType::UserJoined,
            FeedItemKind::UserLeft => FeedItemType::UserLeft,
            FeedItemKind::ActivityCompleted { .. } => FeedItemType::ActivityCompleted,
            FeedItemKind::SetCompleted { .. } => FeedItemType::SetCompleted,
            FeedItemKind::MilestoneAchieved { .. } => FeedItemType::MilestoneAchieved,
            FeedItemKind::Encouragement { .. } => FeedItemType::Encouragement,
            FeedItemKind::ChatMessage => FeedItemType::ChatMessage,
        }
    }
}

/// An immutable record of something that happened during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFeedItem {
    id: FeedItemId,
    sequence: u64,
    user_id: UserId,
    user_name: String,
    content: String,
    timestamp: Timestamp,
    kind: FeedItemKind,
}

impl SessionFeedItem {
    pub(crate) fn new(
        sequence: u64,
        user_id: UserId,
        user_name: String,
        content: String,
        kind: FeedItemKind,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: FeedItemId::new(),
            sequence,
            user_id,
            user_name,
            content,
            timestamp,
            kind,
        }
    }

    pub fn id(&self) -> &FeedItemId {
        &self.id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn kind(&self) -> &FeedItemKind {
        &self.kind
    }

    pub fn item_type(&self) -> FeedItemType {
        self.kind.item_type()
    }
}

/// Position in the feed a client has already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedCursor {
    /// Nothing seen yet.
    #[default]
    Start,
    /// Last seen sequence number.
    Sequence(u64),
    /// Last seen item id.
    Item(FeedItemId),
}

impl FeedCursor {
    /// Index of the first item after the cursor.
    ///
    /// `feed` must be ordered by sequence. An unknown item id resolves to the
    /// start of the feed so the client resynchronizes fully.
    pub(crate) fn resolve(&self, feed: &[SessionFeedItem]) -> usize {
        match self {
            FeedCursor::Start => 0,
            FeedCursor::Sequence(seq) => feed.partition_point(|item| item.sequence <= *seq),
            FeedCursor::Item(id) => feed
                .iter()
                .position(|item| &item.id == id)
                .map(|idx| idx + 1)
                .unwrap_or(0),
        }
    }
}

/// Lazy iterator over the feed items after a cursor.
///
/// Cloning yields an independent iterator starting from the same point.
#[derive(Debug, Clone)]
pub struct FeedSince<'a> {
    inner: std::slice::Iter<'a, SessionFeedItem>,
}

impl<'a> FeedSince<'a> {
    pub(crate) fn new(feed: &'a [SessionFeedItem], cursor: FeedCursor) -> Self {
        let start = cursor.resolve(feed);
        Self {
            inner: feed[start..].iter(),
        }
    }
}

impl<'a> Iterator for FeedSince<'a> {
    type Item = &'a SessionFeedItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for FeedSince<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sequence: u64) -> SessionFeedItem {
        SessionFeedItem::new(
            sequence,
            UserId::new("athlete-1").unwrap(),
            "Ada".to_string(),
            format!("item {}", sequence),
            FeedItemKind::ChatMessage,
            Timestamp::now(),
        )
    }

    fn feed() -> Vec<SessionFeedItem> {
        (1..=5).map(item).collect()
    }

    #[test]
    fn start_cursor_yields_everything() {
        let feed = feed();
        assert_eq!(FeedSince::new(&feed, FeedCursor::Start).count(), 5);
    }

    #[test]
    fn sequence_cursor_yields_strictly_later_items() {
        let feed = feed();
        let seqs: Vec<u64> = FeedSince::new(&feed, FeedCursor::Sequence(2))
            .map(|i| i.sequence())
            .collect();
        assert_eq!(seqs, vec![3, 4, 5]);
    }

    #[test]
    fn sequence_cursor_past_end_is_empty() {
        let feed = feed();
        assert_eq!(FeedSince::new(&feed, FeedCursor::Sequence(99)).len(), 0);
    }

    #[test]
    fn item_cursor_yields_items_after_it() {
        let feed = feed();
        let cursor = FeedCursor::Item(*feed[3].id());
        let seqs: Vec<u64> = FeedSince::new(&feed, cursor).map(|i| i.sequence()).collect();
        assert_eq!(seqs, vec![5]);
    }

    #[test]
    fn unknown_item_cursor_restarts_from_beginning() {
        let feed = feed();
        let cursor = FeedCursor::Item(FeedItemId::new());
        assert_eq!(FeedSince::new(&feed, cursor).len(), 5);
    }

    #[test]
    fn cloned_iterator_restarts_from_same_point() {
        let feed = feed();
        let mut first = FeedSince::new(&feed, FeedCursor::Sequence(1));
        let replay = first.clone();
        first.next();
        first.next();
        assert_eq!(replay.map(|i| i.sequence()).collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn kind_serializes_with_type_tag_and_metadata() {
        let kind = FeedItemKind::SetCompleted {
            activity: "Bench press".to_string(),
            set_number: 3,
            weight: Some(80.0),
            reps: Some(8),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "set_completed");
        assert_eq!(json["set_number"], 3);
        assert_eq!(json["weight"], 80.0);
    }

    #[test]
    fn only_social_types_are_postable() {
        assert!(FeedItemType::ChatMessage.is_postable());
        assert!(FeedItemType::Encouragement.is_postable());
        assert!(FeedItemType::MilestoneAchieved.is_postable());
        assert!(!FeedItemType::UserJoined.is_postable());
        assert!(!FeedItemType::ActivityCompleted.is_postable());
    }
}
