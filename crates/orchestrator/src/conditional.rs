//! Conditional branching over a generated value.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use toneflow_core::Session;

use crate::agent::{Agent, EventStream, SharedSession};
use crate::error::{OrchestratorError, Result};
use crate::llm_agent::LlmAgent;

/// Runs a generator step, validates its output, then dispatches exactly
/// one of two branch steps on the parity of the generated number.
///
/// The run is a small state machine: generator events are forwarded as
/// produced; once the generator completes, its output key is read back
/// from state. A missing, empty, or still-unresolved value ends the run
/// silently (logged, no event emitted). A value that survives those
/// checks but is not numeric is a data contract violation and surfaces
/// as an error. Even selects the even branch, odd the odd branch; the
/// chosen branch's events are forwarded until it completes.
#[derive(Clone)]
pub struct ConditionalAgent {
    name: String,
    generator: LlmAgent,
    odd_branch: LlmAgent,
    even_branch: LlmAgent,
    placeholder_sentinel: Option<String>,
}

impl ConditionalAgent {
    pub fn new(
        name: impl Into<String>,
        generator: LlmAgent,
        odd_branch: LlmAgent,
        even_branch: LlmAgent,
    ) -> Self {
        Self {
            name: name.into(),
            generator,
            odd_branch,
            even_branch,
            placeholder_sentinel: None,
        }
    }

    /// Treat generated values still containing `sentinel` as unresolved
    /// placeholders: the run aborts instead of branching on them.
    pub fn with_placeholder_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.placeholder_sentinel = Some(sentinel.into());
        self
    }
}

/// What the generator's output tells us to do next.
enum Verdict {
    Abort,
    Invalid(OrchestratorError),
    Number(i64),
}

fn branch_verdict(flow: &ConditionalAgent, session: &Session) -> Verdict {
    let key = flow.generator.output_key();

    let Some(raw) = session.state.get(key) else {
        warn!(flow = %flow.name, key = %key, "generator wrote no output, aborting workflow");
        return Verdict::Abort;
    };

    let value = raw.trim();
    if value.is_empty() {
        warn!(flow = %flow.name, key = %key, "generator output is empty, aborting workflow");
        return Verdict::Abort;
    }

    if let Some(ref sentinel) = flow.placeholder_sentinel {
        if value.contains(sentinel.as_str()) {
            warn!(
                flow = %flow.name,
                key = %key,
                value = %value,
                "generator echoed the command instead of a value, aborting workflow"
            );
            return Verdict::Abort;
        }
    }

    match value.parse::<i64>() {
        Ok(number) => Verdict::Number(number),
        Err(_) => Verdict::Invalid(OrchestratorError::NonNumericValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

enum FlowPhase {
    Generator,
    Branch,
    Done,
}

/// Mutable state threaded through the flow's unfold stream.
struct FlowRun {
    flow: ConditionalAgent,
    session: SharedSession,
    phase: FlowPhase,
    current: Option<EventStream>,
    branch_key: Option<String>,
}

#[async_trait]
impl Agent for ConditionalAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, session: SharedSession) -> Result<EventStream> {
        let run = FlowRun {
            flow: self.clone(),
            session,
            phase: FlowPhase::Generator,
            current: None,
            branch_key: None,
        };

        let stream = stream::unfold(run, |mut run| async move {
            loop {
                // Drain the active sub-stream first, whichever phase owns it.
                if let Some(ref mut current) = run.current {
                    match current.next().await {
                        Some(Ok(event)) => return Some((Ok(event), run)),
                        Some(Err(error)) => {
                            run.current = None;
                            run.phase = FlowPhase::Done;
                            return Some((Err(error), run));
                        }
                        None => {
                            run.current = None;
                        }
                    }
                }

                match run.phase {
                    FlowPhase::Generator => {
                        info!(flow = %run.flow.name, "generating number");
                        match run.flow.generator.run(run.session.clone()).await {
                            Ok(stream) => {
                                run.current = Some(stream);
                                run.phase = FlowPhase::Branch;
                            }
                            Err(error) => {
                                run.phase = FlowPhase::Done;
                                return Some((Err(error), run));
                            }
                        }
                    }
                    FlowPhase::Branch => {
                        // Generator finished; decide what comes next.
                        if run.branch_key.is_some() {
                            // Branch finished too: read its result for the log.
                            run.phase = FlowPhase::Done;
                            let session = run.session.lock().await;
                            let key = run.branch_key.as_deref().unwrap_or_default();
                            match session.state.get(key) {
                                Some(response) => {
                                    info!(flow = %run.flow.name, response = %response, "workflow finished")
                                }
                                None => info!(flow = %run.flow.name, "workflow finished"),
                            }
                            return None;
                        }

                        let verdict = {
                            let session = run.session.lock().await;
                            branch_verdict(&run.flow, &session)
                        };
                        let number = match verdict {
                            Verdict::Abort => {
                                run.phase = FlowPhase::Done;
                                return None;
                            }
                            Verdict::Invalid(error) => {
                                run.phase = FlowPhase::Done;
                                return Some((Err(error), run));
                            }
                            Verdict::Number(number) => number,
                        };

                        let branch = if number % 2 == 0 {
                            &run.flow.even_branch
                        } else {
                            &run.flow.odd_branch
                        };
                        info!(
                            flow = %run.flow.name,
                            number,
                            branch = %branch.name(),
                            "branching on generated number"
                        );
                        run.branch_key = Some(branch.output_key().to_string());
                        match branch.run(run.session.clone()).await {
                            Ok(stream) => {
                                run.current = Some(stream);
                            }
                            Err(error) => {
                                run.phase = FlowPhase::Done;
                                return Some((Err(error), run));
                            }
                        }
                    }
                    FlowPhase::Done => {
                        debug!(flow = %run.flow.name, "workflow stream exhausted");
                        return None;
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
