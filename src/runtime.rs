//! The remote agent-runtime boundary.
//!
//! The conversation driver only ever needs one operation from the service:
//! submit a turn, get back the full event sequence. [`AgentRuntime`] captures
//! that as an injected capability so agents can run against the real Bedrock
//! binding (see the `aws` feature) or a scripted double in tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::schema::ActionGroupSchema;

/// One request/response round-trip of the conversation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub session_id: String,
    pub foundation_model: String,
    pub instruction: String,
    pub action_groups: Vec<ActionGroupSchema>,
    /// Raw user input; present on the first turn only. Follow-up turns carry
    /// session state instead, continuing the conversation.
    pub input_text: Option<String>,
    /// Pending function results keyed by invocation id.
    pub session_states: Vec<SessionState>,
    pub enable_trace: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub events: Vec<ResponseEvent>,
}

impl TurnResponse {
    pub fn of(events: Vec<ResponseEvent>) -> Self {
        Self { events }
    }
}

/// One event of a turn's completion stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseEvent {
    /// A fragment of the final answer text.
    Chunk(Vec<u8>),
    /// The service needs the caller to execute functions before continuing.
    ReturnControl(ReturnControlPayload),
    /// Diagnostic event; surfaced but never alters control flow.
    Trace(Value),
}

impl ResponseEvent {
    pub fn chunk(text: impl AsRef<str>) -> Self {
        ResponseEvent::Chunk(text.as_ref().as_bytes().to_vec())
    }
}

/// A batch of function-invocation requests sharing one invocation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnControlPayload {
    pub invocation_id: String,
    pub invocation_inputs: Vec<FunctionInvocationInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInvocationInput {
    pub action_group: String,
    pub function: String,
    pub parameters: Vec<FunctionParameter>,
}

/// Parameter values always arrive as strings; the invoked function coerces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionParameter {
    pub name: String,
    pub value: String,
}

/// Pending results for one return-control batch, sent back on the next turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub invocation_id: String,
    pub return_control_invocation_results: Vec<FunctionResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResult {
    pub action_group: String,
    pub function: String,
    pub response_body: ResponseBody,
}

/// Text-encoded function result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
}

impl ResponseBody {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            text: TextBody { body: body.into() },
        }
    }
}

/// Minimal abstraction over the inline-agent service.
///
/// Implementations must be safe for concurrent use; request timeouts and
/// cancellation stay at this boundary rather than in the conversation loop.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke_inline_agent(&self, request: TurnRequest) -> Result<TurnResponse>;
}

/// A deterministic runtime used for tests and demos.
///
/// Pops scripted responses in order and records every outbound request so
/// tests can assert on the exact turn payloads.
pub struct ScriptedRuntime {
    responses: Mutex<VecDeque<TurnResponse>>,
    requests: Mutex<Vec<TurnRequest>>,
}

impl ScriptedRuntime {
    pub fn new(responses: Vec<TurnResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<TurnRequest> {
        self.requests.lock().expect("scripted runtime poisoned").clone()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn invoke_inline_agent(&self, request: TurnRequest) -> Result<TurnResponse> {
        self.requests
            .lock()
            .expect("scripted runtime poisoned")
            .push(request);
        self.responses
            .lock()
            .expect("scripted runtime poisoned")
            .pop_front()
            .ok_or_else(|| {
                AgentError::Runtime("ScriptedRuntime ran out of scripted responses".into())
            })
    }
}
