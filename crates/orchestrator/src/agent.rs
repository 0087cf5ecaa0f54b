//! The agent abstraction and the stream type every agent produces.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use tokio::sync::Mutex;

use toneflow_core::{Event, Session};

use crate::error::Result;

/// Lazy, finite, non-restartable sequence of events produced by one
/// agent run. The consumer pulls; the producer only advances between
/// polls, so dropping the stream halts the run with no rollback of
/// state already written.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Event>> + Send>>;

/// The session shared by every agent in a run.
///
/// Agents lock it only across synchronous log/state accesses, never
/// across a model call, so steps interleave cooperatively: writes from
/// one step are visible before the next step starts.
pub type SharedSession = Arc<Mutex<Session>>;

/// Wrap a session for use by a workflow run.
pub fn shared_session(session: Session) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// A composable execution unit over one shared session.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The agent's display name, used as the author of its events.
    fn name(&self) -> &str;

    /// Start a run against the session and return its event stream.
    ///
    /// Returning `Ok` performs no model work yet; the stream drives the
    /// run as it is polled. Errors during the run surface as `Err`
    /// items and are never retried.
    async fn run(&self, session: SharedSession) -> Result<EventStream>;
}
