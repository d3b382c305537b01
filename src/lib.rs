//! Client harness for Amazon Bedrock inline agents.
//!
//! The crate provides a minimal harness with:
//! - A remote-runtime abstraction (`AgentRuntime`) with a scripted test double.
//! - Declarative function schemas (`FunctionSpec`) and a name-unique
//!   `FunctionRegistry` of locally executable `AgentFunction`s.
//! - An `Agent` that drives the return-control loop: it advertises the
//!   registered functions as action groups, executes the ones the service
//!   hands back, and resubmits their results until a final answer arrives.
//!
//! Enable the `aws` feature for the real `bedrock-agent-runtime` binding.

mod agent;
#[cfg(feature = "aws")]
mod bedrock;
mod config;
mod error;
mod function;
pub mod functions;
mod runtime;
mod schema;

pub use agent::{Agent, InvokeOptions, DEFAULT_FOUNDATION_MODEL};
#[cfg(feature = "aws")]
pub use bedrock::BedrockAgentRuntime;
pub use config::HarnessConfig;
pub use error::{AgentError, Result};
pub use function::{AgentFunction, FunctionArgs, FunctionRegistry};
pub use runtime::{
    AgentRuntime, FunctionInvocationInput, FunctionParameter, FunctionResult, ResponseBody,
    ResponseEvent, ReturnControlPayload, ScriptedRuntime, SessionState, TextBody, TurnRequest,
    TurnResponse,
};
pub use schema::{
    ActionGroupExecutor, ActionGroupSchema, FunctionDescriptor, FunctionSchemaBlock, FunctionSpec,
    ParamType, ParameterDetail, ParameterSpec, RETURN_CONTROL,
};
