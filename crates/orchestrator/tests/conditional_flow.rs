//! End-to-end workflow tests: a sequential pipeline wrapping the
//! dice-roll conditional flow, driven by a scripted backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use orchestrator::{
    shared_session, Agent, ConditionalAgent, EventStream, InputGuard, LlmAgent, ModelBackend,
    OrchestratorError, Result, SequentialAgent, SharedSession,
};
use toneflow_core::{Event, Session};

struct ScriptedBackend {
    replies: Mutex<VecDeque<Vec<String>>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(replies: Vec<Vec<&str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|texts| texts.into_iter().map(str::to_string).collect())
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn stream_reply(
        &self,
        agent_name: &str,
        _instruction: &str,
        _history: &[Event],
    ) -> Result<EventStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let texts = self.replies.lock().unwrap().pop_front().unwrap_or_default();
        let events: Vec<Result<Event>> = texts
            .into_iter()
            .map(|text| Ok(Event::agent(agent_name, text)))
            .collect();
        Ok(Box::pin(stream::iter(events)))
    }
}

fn pipeline(backend: Arc<ScriptedBackend>) -> SequentialAgent {
    let generator = LlmAgent::new(
        "NumberGenerator",
        "You are a dice. Return a number between 1 and 6.",
        "current_number",
        backend.clone(),
    )
    .with_guard(InputGuard::new("roll", "To generate a number, enter: roll"));
    let critic = LlmAgent::new(
        "Critic",
        "You are a critic. Return a one word negative response, the severity is determined by the input number {current_number}.",
        "message",
        backend.clone(),
    );
    let fan = LlmAgent::new(
        "Fan",
        "You are a fan. Return a one word positive response, the severity is determined by the input number {current_number}.",
        "message",
        backend,
    );
    let dice = ConditionalAgent::new("DiceTone", generator, critic, fan)
        .with_placeholder_sentinel("roll");
    SequentialAgent::new("root", vec![Arc::new(dice)])
}

fn session_with_input(text: &str) -> SharedSession {
    let mut session = Session::new("toneflow", "alice", "s-1");
    session.append_event(Event::user("alice", text));
    shared_session(session)
}

async fn drain(mut stream: EventStream) -> (Vec<Event>, Vec<OrchestratorError>) {
    let mut events = Vec::new();
    let mut errors = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => events.push(event),
            Err(error) => errors.push(error),
        }
    }
    (events, errors)
}

#[tokio::test]
async fn even_roll_flows_through_fan() {
    let backend = ScriptedBackend::new(vec![vec!["4"], vec!["Nice!"]]);
    let session = session_with_input("roll");

    let stream = pipeline(backend.clone())
        .run(session.clone())
        .await
        .unwrap();
    let (events, errors) = drain(stream).await;

    assert!(errors.is_empty());
    let authors: Vec<_> = events.iter().map(|e| e.author.as_str()).collect();
    assert_eq!(authors, vec!["NumberGenerator", "Fan"]);

    let session = session.lock().await;
    assert_eq!(session.state.get("current_number"), Some("4"));
    assert_eq!(session.state.get("message"), Some("Nice!"));
    // user input + generator event + fan event in the log.
    assert_eq!(session.events.len(), 3);
}

#[tokio::test]
async fn odd_roll_flows_through_critic() {
    let backend = ScriptedBackend::new(vec![vec!["3"], vec!["Weak"]]);
    let session = session_with_input("roll");

    let stream = pipeline(backend.clone())
        .run(session.clone())
        .await
        .unwrap();
    let (events, errors) = drain(stream).await;

    assert!(errors.is_empty());
    let authors: Vec<_> = events.iter().map(|e| e.author.as_str()).collect();
    assert_eq!(authors, vec!["NumberGenerator", "Critic"]);
    assert_eq!(session.lock().await.state.get("message"), Some("Weak"));
}

#[tokio::test]
async fn typo_command_produces_one_rejection_and_aborts() {
    let backend = ScriptedBackend::new(vec![vec!["4"], vec!["Nice!"]]);
    let session = session_with_input("rol");

    let stream = pipeline(backend.clone())
        .run(session.clone())
        .await
        .unwrap();
    let (events, errors) = drain(stream).await;

    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].first_text(),
        Some("To generate a number, enter: roll")
    );
    assert!(errors.is_empty());
    assert_eq!(backend.calls(), 0);

    let session = session.lock().await;
    assert!(!session.state.contains("current_number"));
    assert!(!session.state.contains("message"));
}

#[tokio::test]
async fn dropping_the_stream_stops_the_run() {
    let backend = ScriptedBackend::new(vec![vec!["4"], vec!["Nice!"]]);
    let session = session_with_input("roll");

    let mut stream = pipeline(backend.clone())
        .run(session.clone())
        .await
        .unwrap();

    // Pull the generator's event and the first branch event, then cancel.
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.author, "NumberGenerator");
    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second.author, "Fan");
    drop(stream);

    // Already-applied state writes stay applied; the branch result was
    // never recorded because its stream was cancelled before completing.
    assert_eq!(backend.calls(), 2);
    let session = session.lock().await;
    assert_eq!(session.state.get("current_number"), Some("4"));
    assert!(!session.state.contains("message"));
}
