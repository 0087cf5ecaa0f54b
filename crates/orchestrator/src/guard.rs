//! Pre-step validation of the latest user input.

use tracing::{debug, warn};

use toneflow_core::{Event, Session};

/// Outcome of an [`InputGuard`] check.
#[derive(Debug, Clone)]
pub enum GuardDecision {
    /// Input matched; the step proceeds with its model call.
    Pass,
    /// Input rejected; the carried synthetic event replaces the step's
    /// model call entirely.
    Reject(Event),
}

/// Validates the most recent user-originated input before a step is
/// allowed to call its backend.
///
/// The check is single-shot: it runs at most once per step invocation
/// and never retries. Only an exact match against the expected command
/// passes; any other input, including a session with no user event at
/// all, is rejected with a fixed usage hint.
#[derive(Debug, Clone)]
pub struct InputGuard {
    expected_command: String,
    usage_hint: String,
}

impl InputGuard {
    pub fn new(expected_command: impl Into<String>, usage_hint: impl Into<String>) -> Self {
        Self {
            expected_command: expected_command.into(),
            usage_hint: usage_hint.into(),
        }
    }

    pub fn expected_command(&self) -> &str {
        &self.expected_command
    }

    pub fn check(&self, agent_name: &str, session: &Session) -> GuardDecision {
        match session.last_user_text() {
            Some(text) if text == self.expected_command => {
                debug!(agent = agent_name, "input command confirmed");
                GuardDecision::Pass
            }
            Some(text) => {
                warn!(
                    agent = agent_name,
                    expected = %self.expected_command,
                    received = text,
                    "input rejected"
                );
                GuardDecision::Reject(Event::agent(agent_name, self.usage_hint.clone()))
            }
            None => {
                warn!(agent = agent_name, "no user input to validate, rejecting");
                GuardDecision::Reject(Event::agent(agent_name, self.usage_hint.clone()))
            }
        }
    }
}
