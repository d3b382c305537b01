use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::function::{AgentFunction, FunctionArgs, FunctionRegistry};
use crate::runtime::{
    AgentRuntime, FunctionResult, ResponseBody, ResponseEvent, ReturnControlPayload, SessionState,
    TurnRequest, TurnResponse,
};

pub const DEFAULT_FOUNDATION_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";

const CONVERSATIONAL_INSTRUCTION: &str = "You are an everyday conversation agent. \
Respond appropriately to whatever the user asks.";

/// Per-call options for [`Agent::invoke`].
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Correlates the turns of one conversation; generated when absent.
    pub session_id: Option<String>,
    pub enable_trace: bool,
}

impl InvokeOptions {
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_trace(mut self, enable_trace: bool) -> Self {
        self.enable_trace = enable_trace;
        self
    }
}

/// A configured pairing of a foundation model, an instruction, and a set of
/// locally executable functions, driven against an injected [`AgentRuntime`].
///
/// All state is read-only after construction, so one agent can serve
/// concurrent `invoke` calls; each call owns its session id and loop state.
pub struct Agent<R: AgentRuntime> {
    runtime: Arc<R>,
    foundation_model: String,
    instruction: String,
    functions: FunctionRegistry,
}

impl<R: AgentRuntime> Agent<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self {
            runtime,
            foundation_model: DEFAULT_FOUNDATION_MODEL.to_string(),
            instruction: String::new(),
            functions: FunctionRegistry::new(),
        }
    }

    /// Preset agent for open-ended conversation; instruction text is fixed,
    /// functions stay up to the caller.
    pub fn conversational(runtime: Arc<R>) -> Self {
        Self::new(runtime).with_instruction(CONVERSATIONAL_INSTRUCTION)
    }

    pub fn with_foundation_model(mut self, model: impl Into<String>) -> Self {
        self.foundation_model = model.into();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Register one more function; duplicate names fail here, at construction.
    pub fn register<F: AgentFunction + 'static>(&mut self, function: F) -> Result<()> {
        self.functions.register(function)
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    pub fn foundation_model(&self) -> &str {
        &self.foundation_model
    }

    /// Run one exchange with the agent service, executing any functions the
    /// service hands back, and return the final answer text.
    ///
    /// The loop is strictly sequential: submit a turn, drain the whole event
    /// sequence, dispatch requested functions, resubmit with their results,
    /// until a turn arrives with no return-control batches. Transport errors,
    /// unknown function names, and callable failures all abort the call.
    pub async fn invoke(
        &self,
        input_text: impl Into<String>,
        options: InvokeOptions,
    ) -> Result<String> {
        let session_id = options
            .session_id
            .unwrap_or_else(generate_session_id);
        let action_groups = self.functions.schemas();

        let mut request = TurnRequest {
            session_id: session_id.clone(),
            foundation_model: self.foundation_model.clone(),
            instruction: self.instruction.clone(),
            action_groups: action_groups.clone(),
            input_text: Some(input_text.into()),
            session_states: Vec::new(),
            enable_trace: options.enable_trace,
        };

        let mut text = Vec::new();
        let mut turn = 0usize;

        loop {
            turn += 1;
            debug!(%session_id, turn, "submitting turn");
            let response = self.runtime.invoke_inline_agent(request).await?;
            let batches = self.drain_events(response, &mut text);

            if batches.is_empty() {
                break;
            }

            let mut session_states = Vec::with_capacity(batches.len());
            for batch in batches {
                session_states.push(self.dispatch_batch(batch).await?);
            }

            request = TurnRequest {
                session_id: session_id.clone(),
                foundation_model: self.foundation_model.clone(),
                instruction: self.instruction.clone(),
                action_groups: action_groups.clone(),
                input_text: None,
                session_states,
                enable_trace: options.enable_trace,
            };
        }

        String::from_utf8(text)
            .map_err(|err| AgentError::Protocol(format!("final answer is not UTF-8: {err}")))
    }

    /// Consume a turn's full event sequence: chunks concatenate into the
    /// answer, traces are logged, return-control batches are collected.
    fn drain_events(
        &self,
        response: TurnResponse,
        text: &mut Vec<u8>,
    ) -> Vec<ReturnControlPayload> {
        let mut batches = Vec::new();
        for event in response.events {
            match event {
                ResponseEvent::Chunk(bytes) => text.extend_from_slice(&bytes),
                ResponseEvent::ReturnControl(payload) => batches.push(payload),
                ResponseEvent::Trace(trace) => debug!(trace = %trace, "agent trace"),
            }
        }
        batches
    }

    /// Execute every function request in one return-control batch and collect
    /// the results under the batch's invocation id.
    ///
    /// A name the registry does not know is a contract violation: the service
    /// can only request names this agent advertised, so the call fails loudly
    /// instead of skipping.
    async fn dispatch_batch(&self, batch: ReturnControlPayload) -> Result<SessionState> {
        let mut results = Vec::with_capacity(batch.invocation_inputs.len());
        for input in batch.invocation_inputs {
            let function = self
                .functions
                .get(&input.function)
                .ok_or_else(|| AgentError::UnknownFunction(input.function.clone()))?
                .clone();

            let args: FunctionArgs = input
                .parameters
                .into_iter()
                .map(|param| (param.name, param.value))
                .collect();

            debug!(function = %input.function, "dispatching return-control request");
            let value = function.call(args).await.map_err(|source| {
                AgentError::FunctionInvocation {
                    name: input.function.clone(),
                    source: Box::new(source),
                }
            })?;
            // serde_json leaves non-ASCII text unescaped, as the service expects.
            let body = serde_json::to_string(&value)?;

            results.push(FunctionResult {
                action_group: input.action_group,
                function: input.function,
                response_body: ResponseBody::text(body),
            });
        }

        Ok(SessionState {
            invocation_id: batch.invocation_id,
            return_control_invocation_results: results,
        })
    }
}

fn generate_session_id() -> String {
    format!("session-{}", Uuid::new_v4().simple())
}
