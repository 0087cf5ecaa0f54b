//! A single model-backed workflow step.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::agent::{Agent, EventStream, SharedSession};
use crate::backend::ModelBackend;
use crate::error::Result;
use crate::guard::{GuardDecision, InputGuard};
use crate::instruction::render_instruction;

/// One remote instruction-following step.
///
/// An `LlmAgent` renders its instruction template against the current
/// state, calls the backend, forwards every backend event as produced,
/// and records the final event's primary text in state under its
/// output key. An optional [`InputGuard`] runs first; on rejection the
/// guard's synthetic event is the step's sole output and the output
/// key is left unwritten.
///
/// Configured once, immutable afterwards. Cloning is cheap: the
/// backend is shared behind an `Arc`.
#[derive(Clone)]
pub struct LlmAgent {
    name: String,
    instruction: String,
    output_key: String,
    guard: Option<InputGuard>,
    backend: Arc<dyn ModelBackend>,
}

impl LlmAgent {
    pub fn new(
        name: impl Into<String>,
        instruction: impl Into<String>,
        output_key: impl Into<String>,
        backend: Arc<dyn ModelBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            instruction: instruction.into(),
            output_key: output_key.into(),
            guard: None,
            backend,
        }
    }

    /// Attach an input guard that runs before the model call.
    pub fn with_guard(mut self, guard: InputGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// The state key this step writes its result under.
    pub fn output_key(&self) -> &str {
        &self.output_key
    }
}

/// Mutable state threaded through the step's unfold stream.
struct StepRun {
    agent: LlmAgent,
    session: SharedSession,
    started: bool,
    done: bool,
    inner: Option<EventStream>,
    last_text: Option<String>,
}

#[async_trait]
impl Agent for LlmAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, session: SharedSession) -> Result<EventStream> {
        let run = StepRun {
            agent: self.clone(),
            session,
            started: false,
            done: false,
            inner: None,
            last_text: None,
        };

        let stream = stream::unfold(run, |mut run| async move {
            loop {
                if run.done {
                    return None;
                }

                // Forward the backend stream while it lasts.
                if let Some(ref mut inner) = run.inner {
                    match inner.next().await {
                        Some(Ok(event)) => {
                            {
                                let mut session = run.session.lock().await;
                                session.append_event(event.clone());
                            }
                            if let Some(text) = event.first_text() {
                                run.last_text = Some(text.to_string());
                            }
                            return Some((Ok(event), run));
                        }
                        Some(Err(error)) => {
                            run.done = true;
                            return Some((Err(error), run));
                        }
                        None => {
                            run.inner = None;
                            run.done = true;
                            if let Some(text) = run.last_text.take() {
                                let mut session = run.session.lock().await;
                                debug!(
                                    agent = %run.agent.name,
                                    key = %run.agent.output_key,
                                    "recording step output"
                                );
                                session.state.set(run.agent.output_key.clone(), text);
                            }
                            return None;
                        }
                    }
                }

                if run.started {
                    return None;
                }
                run.started = true;

                // Guard check plus instruction rendering happen under one
                // lock so the step sees a consistent session snapshot.
                let (instruction, history) = {
                    let mut session = run.session.lock().await;
                    if let Some(ref guard) = run.agent.guard {
                        if let GuardDecision::Reject(event) = guard.check(&run.agent.name, &session)
                        {
                            session.append_event(event.clone());
                            run.done = true;
                            drop(session);
                            return Some((Ok(event), run));
                        }
                    }
                    (
                        render_instruction(&run.agent.instruction, &session.state),
                        session.events.clone(),
                    )
                };

                info!(agent = %run.agent.name, "running model step");
                match run
                    .agent
                    .backend
                    .stream_reply(&run.agent.name, &instruction, &history)
                    .await
                {
                    Ok(inner) => {
                        run.inner = Some(inner);
                    }
                    Err(error) => {
                        run.done = true;
                        return Some((Err(error), run));
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
