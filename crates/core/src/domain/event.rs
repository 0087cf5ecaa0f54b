use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who produced an event: the human user or a model-backed agent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "agent" => Some(Self::Agent),
            _ => None,
        }
    }
}

/// One piece of event content. Text is the only kind in scope today;
/// the enum leaves room for richer parts without a wire break.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
}

/// The ordered content parts of an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    /// Content consisting of a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// Primary text of this content: the first text part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            Part::Text { text } => Some(text.as_str()),
        })
    }
}

/// An immutable record of one unit of conversational output.
///
/// Events are ordered by their position in the session event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub author: String,
    pub role: Role,
    pub content: Content,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(author: impl Into<String>, role: Role, content: Content) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: author.into(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    /// A user-originated text event.
    pub fn user(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(author, Role::User, Content::text(text))
    }

    /// An agent-originated text event.
    pub fn agent(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(author, Role::Agent, Content::text(text))
    }

    /// Primary text of this event, if it carries any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first_text()
    }
}
