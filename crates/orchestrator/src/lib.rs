//! Workflow orchestration for toneflow.
//!
//! Agents are composable execution units over one shared [`Session`]:
//! a [`LlmAgent`] runs a single model step and records its result under
//! an output key, [`ConditionalAgent`] branches on a generated value,
//! and [`SequentialAgent`] chains agents into a pipeline. Every agent
//! returns a lazy stream of events that the caller pulls to drive the
//! run forward.
//!
//! [`Session`]: toneflow_core::Session

pub mod agent;
pub mod backend;
pub mod conditional;
pub mod error;
pub mod guard;
pub mod instruction;
pub mod llm_agent;
pub mod sequential;
pub mod warehouse;

pub use agent::{shared_session, Agent, EventStream, SharedSession};
pub use backend::ModelBackend;
pub use conditional::ConditionalAgent;
pub use error::{OrchestratorError, Result};
pub use guard::{GuardDecision, InputGuard};
pub use instruction::render_instruction;
pub use llm_agent::LlmAgent;
pub use sequential::SequentialAgent;
pub use warehouse::{latest_order_query, order_status_update_query, QueryPrep, WarehouseTarget};
