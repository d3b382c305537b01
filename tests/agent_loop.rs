use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use bedrock_inline_agent::functions::calculator_functions;
use bedrock_inline_agent::{
    Agent, AgentError, AgentFunction, FunctionArgs, FunctionInvocationInput, FunctionParameter,
    FunctionRegistry, FunctionSpec, InvokeOptions, ResponseEvent, Result, ReturnControlPayload,
    ScriptedRuntime, TurnResponse,
};

fn return_control(
    invocation_id: &str,
    function: &str,
    parameters: &[(&str, &str)],
) -> ResponseEvent {
    ResponseEvent::ReturnControl(ReturnControlPayload {
        invocation_id: invocation_id.into(),
        invocation_inputs: vec![FunctionInvocationInput {
            action_group: function.into(),
            function: function.into(),
            parameters: parameters
                .iter()
                .map(|(name, value)| FunctionParameter {
                    name: (*name).into(),
                    value: (*value).into(),
                })
                .collect(),
        }],
    })
}

#[tokio::test]
async fn single_turn_returns_text_with_one_request() {
    let runtime = Arc::new(ScriptedRuntime::new(vec![TurnResponse::of(vec![
        ResponseEvent::chunk("hello"),
    ])]));
    let agent = Agent::new(runtime.clone()).with_instruction("answer briefly");

    let answer = agent.invoke("hi", InvokeOptions::default()).await.unwrap();

    assert_eq!(answer, "hello");
    let requests = runtime.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].input_text.as_deref(), Some("hi"));
    assert!(requests[0].session_states.is_empty());
}

#[tokio::test]
async fn dispatches_add_and_feeds_result_into_follow_up_turn() {
    let runtime = Arc::new(ScriptedRuntime::new(vec![
        TurnResponse::of(vec![return_control(
            "inv-1",
            "add",
            &[("a", "2"), ("b", "3")],
        )]),
        TurnResponse::of(vec![ResponseEvent::chunk("2 + 3 = 5")]),
    ]));
    let agent = Agent::new(runtime.clone())
        .with_instruction("you can do arithmetic")
        .with_functions(calculator_functions());

    let answer = agent.invoke("what is 2 + 3?", InvokeOptions::default()).await.unwrap();
    assert_eq!(answer, "2 + 3 = 5");

    let requests = runtime.requests();
    assert_eq!(requests.len(), 2);

    // Both turns share the session id and the advertised schema set.
    assert_eq!(requests[0].session_id, requests[1].session_id);
    assert_eq!(requests[0].action_groups, requests[1].action_groups);

    // The follow-up turn continues the conversation: results, no input text.
    let follow_up = &requests[1];
    assert_eq!(follow_up.input_text, None);
    assert_eq!(follow_up.session_states.len(), 1);
    let state = &follow_up.session_states[0];
    assert_eq!(state.invocation_id, "inv-1");
    let result = &state.return_control_invocation_results[0];
    assert_eq!(result.function, "add");
    assert_eq!(result.response_body.text.body, "5.0");
}

#[tokio::test]
async fn dispatches_every_batch_and_every_input_within_a_batch() {
    let first_batch = ResponseEvent::ReturnControl(ReturnControlPayload {
        invocation_id: "inv-1".into(),
        invocation_inputs: vec![
            FunctionInvocationInput {
                action_group: "add".into(),
                function: "add".into(),
                parameters: vec![
                    FunctionParameter { name: "a".into(), value: "1".into() },
                    FunctionParameter { name: "b".into(), value: "2".into() },
                ],
            },
            FunctionInvocationInput {
                action_group: "multiply".into(),
                function: "multiply".into(),
                parameters: vec![
                    FunctionParameter { name: "a".into(), value: "3".into() },
                    FunctionParameter { name: "b".into(), value: "4".into() },
                ],
            },
        ],
    });
    let second_batch = return_control("inv-2", "add", &[("a", "5"), ("b", "6")]);

    let runtime = Arc::new(ScriptedRuntime::new(vec![
        TurnResponse::of(vec![first_batch, second_batch]),
        TurnResponse::of(vec![ResponseEvent::chunk("all done")]),
    ]));
    let agent = Agent::new(runtime.clone()).with_functions(calculator_functions());

    let answer = agent.invoke("do the math", InvokeOptions::default()).await.unwrap();
    assert_eq!(answer, "all done");

    // The follow-up turn carries one pending record per batch, in order.
    let follow_up = &runtime.requests()[1];
    assert_eq!(follow_up.session_states.len(), 2);

    let first = &follow_up.session_states[0];
    assert_eq!(first.invocation_id, "inv-1");
    let results: Vec<(&str, &str)> = first
        .return_control_invocation_results
        .iter()
        .map(|r| (r.function.as_str(), r.response_body.text.body.as_str()))
        .collect();
    assert_eq!(results, vec![("add", "3.0"), ("multiply", "12.0")]);

    let second = &follow_up.session_states[1];
    assert_eq!(second.invocation_id, "inv-2");
    assert_eq!(second.return_control_invocation_results.len(), 1);
    assert_eq!(second.return_control_invocation_results[0].response_body.text.body, "11.0");
}

#[tokio::test]
async fn unknown_function_name_fails_loudly() {
    let runtime = Arc::new(ScriptedRuntime::new(vec![TurnResponse::of(vec![
        return_control("inv-1", "subtract", &[("a", "2"), ("b", "3")]),
    ])]));
    let agent = Agent::new(runtime.clone()).with_functions(calculator_functions());

    let err = agent
        .invoke("what is 2 - 3?", InvokeOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::UnknownFunction(name) if name == "subtract"));
    // No follow-up turn was sent after the contract violation.
    assert_eq!(runtime.requests().len(), 1);
}

#[tokio::test]
async fn non_ascii_result_travels_verbatim() {
    struct Greet;

    #[async_trait]
    impl AgentFunction for Greet {
        fn spec(&self) -> FunctionSpec {
            FunctionSpec::new("greet").with_description("Greet in Japanese")
        }

        async fn call(&self, _args: FunctionArgs) -> Result<Value> {
            Ok(json!("こんにちは"))
        }
    }

    let runtime = Arc::new(ScriptedRuntime::new(vec![
        TurnResponse::of(vec![return_control("inv-9", "greet", &[])]),
        TurnResponse::of(vec![ResponseEvent::chunk("done")]),
    ]));
    let mut functions = FunctionRegistry::new();
    functions.register(Greet).unwrap();
    let agent = Agent::new(runtime.clone()).with_functions(functions);

    agent.invoke("greet me", InvokeOptions::default()).await.unwrap();

    let body = runtime.requests()[1].session_states[0].return_control_invocation_results[0]
        .response_body
        .text
        .body
        .clone();
    assert!(body.contains("こんにちは"));
    assert!(!body.contains("\\u"));
}

#[tokio::test]
async fn generated_session_ids_differ_across_invocations() {
    let runtime = Arc::new(ScriptedRuntime::new(vec![
        TurnResponse::of(vec![ResponseEvent::chunk("one")]),
        TurnResponse::of(vec![ResponseEvent::chunk("two")]),
    ]));
    let agent = Agent::new(runtime.clone());

    agent.invoke("first", InvokeOptions::default()).await.unwrap();
    agent.invoke("second", InvokeOptions::default()).await.unwrap();

    let requests = runtime.requests();
    assert_ne!(requests[0].session_id, requests[1].session_id);
}

#[tokio::test]
async fn explicit_session_id_is_passed_through() {
    let runtime = Arc::new(ScriptedRuntime::new(vec![TurnResponse::of(vec![
        ResponseEvent::chunk("ok"),
    ])]));
    let agent = Agent::new(runtime.clone());

    agent
        .invoke("hi", InvokeOptions::default().with_session_id("session-42"))
        .await
        .unwrap();

    assert_eq!(runtime.requests()[0].session_id, "session-42");
}

#[tokio::test]
async fn trace_events_do_not_alter_control_flow() {
    let runtime = Arc::new(ScriptedRuntime::new(vec![TurnResponse::of(vec![
        ResponseEvent::Trace(json!({"step": "orchestration"})),
        ResponseEvent::chunk("traced"),
    ])]));
    let agent = Agent::new(runtime.clone());

    let answer = agent
        .invoke("hi", InvokeOptions::default().with_trace(true))
        .await
        .unwrap();

    assert_eq!(answer, "traced");
    assert!(runtime.requests()[0].enable_trace);
}

#[tokio::test]
async fn failing_callable_aborts_the_whole_call() {
    struct Broken;

    #[async_trait]
    impl AgentFunction for Broken {
        fn spec(&self) -> FunctionSpec {
            FunctionSpec::new("broken")
        }

        async fn call(&self, _args: FunctionArgs) -> Result<Value> {
            Err(AgentError::Protocol("backend unavailable".into()))
        }
    }

    let runtime = Arc::new(ScriptedRuntime::new(vec![TurnResponse::of(vec![
        return_control("inv-1", "broken", &[]),
    ])]));
    let mut functions = FunctionRegistry::new();
    functions.register(Broken).unwrap();
    let agent = Agent::new(runtime.clone()).with_functions(functions);

    let err = agent.invoke("try it", InvokeOptions::default()).await.unwrap_err();
    // The dispatch site names the failing function; the cause is preserved.
    assert!(matches!(&err, AgentError::FunctionInvocation { name, .. } if name == "broken"));
    assert!(err.to_string().contains("backend unavailable"));
    assert_eq!(runtime.requests().len(), 1);
}

#[tokio::test]
async fn runtime_failure_propagates_unchanged() {
    // Script runs dry on the follow-up turn, standing in for a transport error.
    let runtime = Arc::new(ScriptedRuntime::new(vec![TurnResponse::of(vec![
        return_control("inv-1", "add", &[("a", "1"), ("b", "1")]),
    ])]));
    let agent = Agent::new(runtime).with_functions(calculator_functions());

    let err = agent.invoke("1 + 1", InvokeOptions::default()).await.unwrap_err();
    assert!(matches!(err, AgentError::Runtime(_)));
}
