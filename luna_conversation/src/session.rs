//! Session state for one conversation.
//!
//! A session holds the ordered turn history and the emotion Luna is currently
//! showing. It has no locking of its own; the controller owns it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use luna_core::{EmotionTag, Turn};

#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Session identifier
    pub id: Uuid,
    turns: Vec<Turn>,
    current_emotion: EmotionTag,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Create a new empty session with Luna idle.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            turns: Vec::new(),
            current_emotion: EmotionTag::Idle,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a turn. Agent turns carry their emotion onto the avatar.
    pub fn push(&mut self, turn: Turn) {
        if let Some(emotion) = turn.emotion() {
            self.current_emotion = emotion;
        }
        self.turns.push(turn);
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Text of the trailing user turn that has no reply yet.
    #[must_use]
    pub fn pending_user_input(&self) -> Option<&str> {
        self.turns
            .last()
            .filter(|turn| turn.is_user())
            .map(Turn::text)
    }

    #[must_use]
    pub const fn current_emotion(&self) -> EmotionTag {
        self.current_emotion
    }

    pub fn set_emotion(&mut self, emotion: EmotionTag) {
        self.current_emotion = emotion;
    }

    /// Forget all turns and put the avatar back to idle.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.current_emotion = EmotionTag::Idle;
        self.updated_at = Utc::now();
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_turns_drive_the_avatar() {
        let mut session = ConversationSession::new();
        assert!(session.turns().is_empty());
        assert_eq!(session.current_emotion(), EmotionTag::Idle);

        session.push(Turn::user("Hello"));
        assert_eq!(session.pending_user_input(), Some("Hello"));
        assert_eq!(session.current_emotion(), EmotionTag::Idle);

        session.push(Turn::agent("Kyaa~!", EmotionTag::Excited, None));
        assert_eq!(session.pending_user_input(), None);
        assert_eq!(session.current_emotion(), EmotionTag::Excited);
        assert_eq!(session.turns().len(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = ConversationSession::new();
        session.push(Turn::user("hi"));
        session.push(Turn::agent("Aww...", EmotionTag::Sad, None));
        session.clear();

        assert!(session.turns().is_empty());
        assert_eq!(session.current_emotion(), EmotionTag::Idle);
    }
}
