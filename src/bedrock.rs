//! Binding from [`AgentRuntime`](crate::runtime::AgentRuntime) to the AWS
//! SDK's `bedrock-agent-runtime` client.
//!
//! Credential, region, and signing concerns live entirely in `aws-config`;
//! this module only translates the harness wire model into the SDK's builder
//! types and drains the completion event stream back out.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::types as sdk;
use aws_sdk_bedrockagentruntime::Client;

use crate::config::HarnessConfig;
use crate::error::{AgentError, Result};
use crate::runtime::{
    AgentRuntime, FunctionInvocationInput, FunctionParameter, ResponseEvent, ReturnControlPayload,
    SessionState, TurnRequest, TurnResponse,
};
use crate::schema::ActionGroupSchema;

pub struct BedrockAgentRuntime {
    client: Client,
}

impl BedrockAgentRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential/region chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }

    /// Build a client applying the harness's region and timeout settings on
    /// top of the default chain.
    pub async fn from_config(harness: &HarnessConfig) -> Self {
        let timeouts = aws_config::timeout::TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(harness.request_timeout_secs))
            .build();
        let mut loader =
            aws_config::defaults(aws_config::BehaviorVersion::latest()).timeout_config(timeouts);
        if let Some(region) = &harness.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        Self::new(Client::new(&loader.load().await))
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    async fn invoke_inline_agent(&self, request: TurnRequest) -> Result<TurnResponse> {
        let mut builder = self
            .client
            .invoke_inline_agent()
            .session_id(&request.session_id)
            .foundation_model(&request.foundation_model)
            .instruction(&request.instruction)
            .enable_trace(request.enable_trace);

        for group in &request.action_groups {
            builder = builder.action_groups(to_sdk_action_group(group)?);
        }
        if let Some(text) = &request.input_text {
            builder = builder.input_text(text);
        }
        // The service accepts a single inline session state per request.
        if request.session_states.len() > 1 {
            return Err(AgentError::Protocol(
                "Bedrock accepts one inline session state per turn".into(),
            ));
        }
        if let Some(state) = request.session_states.into_iter().next() {
            builder = builder.inline_session_state(to_sdk_session_state(&state)?);
        }

        let output = builder
            .send()
            .await
            .map_err(|err| AgentError::Runtime(err.to_string()))?;

        let mut completion = output.completion;
        let mut events = Vec::new();
        while let Some(event) = completion
            .recv()
            .await
            .map_err(|err| AgentError::Runtime(err.to_string()))?
        {
            match event {
                sdk::InlineAgentResponseStream::Chunk(part) => {
                    if let Some(bytes) = part.bytes {
                        events.push(ResponseEvent::Chunk(bytes.into_inner()));
                    }
                }
                sdk::InlineAgentResponseStream::ReturnControl(payload) => {
                    events.push(ResponseEvent::ReturnControl(from_sdk_return_control(
                        payload,
                    )?));
                }
                sdk::InlineAgentResponseStream::Trace(trace) => {
                    events.push(ResponseEvent::Trace(serde_json::Value::String(format!(
                        "{trace:?}"
                    ))));
                }
                _ => {}
            }
        }

        Ok(TurnResponse::of(events))
    }
}

fn to_sdk_action_group(schema: &ActionGroupSchema) -> Result<sdk::AgentActionGroup> {
    let mut functions = Vec::with_capacity(schema.function_schema.functions.len());
    for descriptor in &schema.function_schema.functions {
        let mut function = sdk::FunctionDefinition::builder().name(&descriptor.name);
        if let Some(description) = &descriptor.description {
            function = function.description(description);
        }
        for (name, detail) in &descriptor.parameters {
            let parameter = sdk::ParameterDetail::builder()
                .r#type(sdk::ParameterType::from(detail.param_type.wire_name()))
                .required(detail.required)
                .build()
                .map_err(|err| AgentError::Runtime(err.to_string()))?;
            function = function.parameters(name.clone(), parameter);
        }
        functions.push(
            function
                .build()
                .map_err(|err| AgentError::Runtime(err.to_string()))?,
        );
    }

    sdk::AgentActionGroup::builder()
        .action_group_name(&schema.action_group_name)
        .action_group_executor(sdk::ActionGroupExecutor::CustomControl(
            sdk::CustomControlMethod::ReturnControl,
        ))
        .function_schema(sdk::FunctionSchema::Functions(functions))
        .build()
        .map_err(|err| AgentError::Runtime(err.to_string()))
}

fn to_sdk_session_state(state: &SessionState) -> Result<sdk::InlineSessionState> {
    let mut builder = sdk::InlineSessionState::builder().invocation_id(&state.invocation_id);
    for result in &state.return_control_invocation_results {
        let function_result = sdk::FunctionResult::builder()
            .action_group(&result.action_group)
            .function(&result.function)
            .response_body(
                "TEXT",
                sdk::ContentBody::builder()
                    .body(&result.response_body.text.body)
                    .build(),
            )
            .build()
            .map_err(|err| AgentError::Runtime(err.to_string()))?;
        builder = builder
            .return_control_invocation_results(sdk::InvocationResultMember::FunctionResult(
                function_result,
            ));
    }
    Ok(builder.build())
}

fn from_sdk_return_control(
    payload: sdk::InlineAgentReturnControlPayload,
) -> Result<ReturnControlPayload> {
    let invocation_id = payload.invocation_id.ok_or_else(|| {
        AgentError::Protocol("return-control payload is missing an invocation id".into())
    })?;

    let mut invocation_inputs = Vec::new();
    for member in payload.invocation_inputs.unwrap_or_default() {
        if let sdk::InvocationInputMember::FunctionInvocationInput(input) = member {
            let parameters = input
                .parameters
                .unwrap_or_default()
                .into_iter()
                .map(|parameter| FunctionParameter {
                    name: parameter.name.unwrap_or_default(),
                    value: parameter.value.unwrap_or_default(),
                })
                .collect();
            invocation_inputs.push(FunctionInvocationInput {
                action_group: input.action_group.unwrap_or_default(),
                function: input.function.unwrap_or_default(),
                parameters,
            });
        }
    }

    Ok(ReturnControlPayload {
        invocation_id,
        invocation_inputs,
    })
}
