use async_trait::async_trait;

use toneflow_core::Event;

use crate::agent::EventStream;
use crate::error::Result;

/// The remote instruction-following backend an [`LlmAgent`] calls.
///
/// Given a rendered instruction and the conversation so far, the
/// backend yields a finite stream of events and completes. No format
/// contract is assumed beyond "the final event's primary text is the
/// step's result"; failures propagate to the caller unretried.
///
/// [`LlmAgent`]: crate::llm_agent::LlmAgent
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn stream_reply(
        &self,
        agent_name: &str,
        instruction: &str,
        history: &[Event],
    ) -> Result<EventStream>;
}
