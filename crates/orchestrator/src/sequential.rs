//! Fixed-order composition of agents over one session.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::agent::{Agent, EventStream, SharedSession};
use crate::error::{OrchestratorError, Result};

/// Runs a fixed ordered list of agents against the same session,
/// forwarding every event each one produces, in order.
///
/// A sub-agent that ends its stream early (for example a workflow that
/// aborted after a failed precondition) does not stop the sequence; the
/// next agent still runs. An `Err` item does: it is forwarded and the
/// composed stream ends there.
pub struct SequentialAgent {
    name: String,
    agents: Vec<Arc<dyn Agent>>,
}

impl SequentialAgent {
    pub fn new(name: impl Into<String>, agents: Vec<Arc<dyn Agent>>) -> Self {
        Self {
            name: name.into(),
            agents,
        }
    }
}

/// Mutable state threaded through the sequence's unfold stream.
struct SequenceRun {
    agents: Vec<Arc<dyn Agent>>,
    session: SharedSession,
    index: usize,
    current: Option<EventStream>,
    failed: bool,
}

#[async_trait]
impl Agent for SequentialAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, session: SharedSession) -> Result<EventStream> {
        if self.agents.is_empty() {
            return Err(OrchestratorError::EmptyFlow(self.name.clone()));
        }

        let run = SequenceRun {
            agents: self.agents.clone(),
            session,
            index: 0,
            current: None,
            failed: false,
        };

        let stream = stream::unfold(run, |mut run| async move {
            loop {
                if run.failed {
                    return None;
                }

                if let Some(ref mut current) = run.current {
                    match current.next().await {
                        Some(Ok(event)) => return Some((Ok(event), run)),
                        Some(Err(error)) => {
                            run.current = None;
                            run.failed = true;
                            return Some((Err(error), run));
                        }
                        None => {
                            // Finished or aborted early; either way, move on.
                            run.current = None;
                            run.index += 1;
                        }
                    }
                    continue;
                }

                if run.index >= run.agents.len() {
                    return None;
                }

                let agent = run.agents[run.index].clone();
                debug!(agent = %agent.name(), position = run.index, "starting sequence step");
                match agent.run(run.session.clone()).await {
                    Ok(stream) => {
                        run.current = Some(stream);
                    }
                    Err(error) => {
                        run.failed = true;
                        return Some((Err(error), run));
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
