use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::{Event, Role};
use super::state::SessionState;

/// One workflow run: its identity, its append-only event log, and the
/// state map every step reads and writes.
///
/// A session is created once before the first step runs, mutated by
/// every step, and discarded at process end. Nothing here persists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub app_name: String,
    pub user_id: String,
    pub id: String,
    pub events: Vec<Event>,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            id: id.into(),
            events: Vec::new(),
            state: SessionState::new(),
            created_at: Utc::now(),
        }
    }

    /// Append an event to the log. Order of appends is the order the
    /// caller observes.
    pub fn append_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Primary text of the most recent user-originated event.
    ///
    /// Scans the log newest-first and stops at the first user event;
    /// if that event carries no text, this returns `None` rather than
    /// falling back to an older one.
    pub fn last_user_text(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find(|event| event.role == Role::User)
            .and_then(Event::first_text)
    }
}
