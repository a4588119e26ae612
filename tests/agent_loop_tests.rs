use std::sync::Arc;
use std::time::Duration;

use agentdesk::agent::{AgentLoop, LoopOutcome, OpenAiChatModel, SessionState};
use agentdesk::config::Settings;
use agentdesk::progress::NoProgress;
use agentdesk::tools::{OpenMeteoClient, ToolContext, ToolDispatcher};
use async_openai::config::OpenAIConfig;
use async_openai::Client;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completion(message: Value, finish_reason: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason,
            "logprobs": null
        }]
    })
}

fn agent(server: &MockServer, settings: &Settings) -> AgentLoop {
    let config = OpenAIConfig::new()
        .with_api_base(format!("{}/openai/v1", server.uri()))
        .with_api_key("chat-key");
    let model = Arc::new(OpenAiChatModel::new(Client::with_config(config), "gpt-4o-mini"));

    let weather = Arc::new(OpenMeteoClient::new(&settings.weather).unwrap());
    let dispatcher = Arc::new(ToolDispatcher::new(ToolContext::new(weather)));
    AgentLoop::new(model, dispatcher, Duration::from_secs(10))
}

#[tokio::test]
async fn tool_round_then_final_answer() {
    let server = MockServer::start().await;
    let settings = Settings::default();

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer chat-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "lookup_kpi", "arguments": "{\"metric\":\"MRR\"}" }
                }]
            }),
            "tool_calls",
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            json!({ "role": "assistant", "content": "TL;DR: MRR is monthly recurring revenue." }),
            "stop",
        )))
        .mount(&server)
        .await;

    let agent = agent(&server, &settings);
    let mut session = SessionState::from_settings(&settings);
    session.begin_turn("What is MRR?");
    let options = session.turn_options(agent.dispatcher().registry());

    let response = agent
        .run(session.history_mut(), &options, &NoProgress, 4)
        .await
        .unwrap();

    assert_eq!(response.outcome, LoopOutcome::Answered);
    assert_eq!(response.content, "TL;DR: MRR is monthly recurring revenue.");
    assert_eq!(response.rounds, 2);
    assert_eq!(response.tool_calls.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let first: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(first["model"], "gpt-4o-mini");
    assert_eq!(first["tools"].as_array().unwrap().len(), 2);
    assert_eq!(first["max_completion_tokens"], 800);

    let second: Value = serde_json::from_slice(&requests[1].body).unwrap();
    let messages = second["messages"].as_array().unwrap();
    let tool_message = messages.last().unwrap();
    assert_eq!(tool_message["role"], "tool");
    assert_eq!(tool_message["tool_call_id"], "call_1");
    let result: Value = serde_json::from_str(tool_message["content"].as_str().unwrap()).unwrap();
    assert_eq!(result["metric"], "MRR");
    assert_eq!(result["source"], "local-kb");
    assert_eq!(messages[messages.len() - 2]["tool_calls"][0]["id"], "call_1");
}

#[tokio::test]
async fn rejected_request_returns_failure_sentinel() {
    let server = MockServer::start().await;
    let settings = Settings::default();

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "invalid key", "type": "invalid_request_error", "param": null, "code": "401" }
        })))
        .mount(&server)
        .await;

    let agent = agent(&server, &settings);
    let mut session = SessionState::from_settings(&settings);
    session.begin_turn("hello");
    let options = session.turn_options(agent.dispatcher().registry());

    let response = agent
        .run(session.history_mut(), &options, &NoProgress, 4)
        .await
        .unwrap();

    assert_eq!(response.content, agentdesk::agent::FAILED_SENTINEL);
    assert!(matches!(response.outcome, LoopOutcome::ModelFailed(_)));
    assert_eq!(response.rounds, 1);
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn rate_limited_request_fails_without_retry() {
    let server = MockServer::start().await;
    let mut settings = Settings::default();
    settings.model.endpoint = Some(server.uri());
    settings.model.api_key = Some("chat-key".to_string());

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "slow down", "type": "rate_limit_exceeded", "param": null, "code": "429" }
        })))
        .mount(&server)
        .await;

    let client = agentdesk::openai::create_client(&settings).unwrap();
    let model = Arc::new(OpenAiChatModel::new(client, "gpt-4o-mini"));
    let weather = Arc::new(OpenMeteoClient::new(&settings.weather).unwrap());
    let dispatcher = Arc::new(ToolDispatcher::new(ToolContext::new(weather)));
    let agent = AgentLoop::new(model, dispatcher, Duration::from_secs(5));

    let mut session = SessionState::from_settings(&settings);
    session.begin_turn("hello");
    let options = session.turn_options(agent.dispatcher().registry());

    let response = agent
        .run(session.history_mut(), &options, &NoProgress, 4)
        .await
        .unwrap();

    assert!(matches!(response.outcome, LoopOutcome::ModelFailed(_)));
    assert_eq!(response.content, agentdesk::agent::FAILED_SENTINEL);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
