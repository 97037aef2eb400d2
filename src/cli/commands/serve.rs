//! HTTP API server exposing the agent runtime.
//!
//! `/chat` proxies a raw completion with no agent involvement; `/audio`
//! drives an agent with the `generate_audio` tool through the runner.

use crate::agent::{Agent, AgentRunner, Message};
use crate::audio::{generate_audio_tool, SpeechSynthesizer};
use crate::cli::Output;
use crate::completion::{CompletionBackend, CompletionRequest, OpenAIBackend};
use crate::config::Settings;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Instructions for the audio-generation agent.
const AUDIO_SYSTEM_PROMPT: &str = "You are an audio generation assistant. \
    Use the generate_audio tool to produce the requested speech, \
    then briefly confirm what you generated.";

/// Shared application state.
struct AppState {
    settings: Settings,
    backend: Arc<OpenAIBackend>,
    synthesizer: Arc<SpeechSynthesizer>,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    let backend = super::build_backend(&settings)?;
    let api_key = super::api_key(&settings)?;
    let synthesizer = Arc::new(SpeechSynthesizer::new(
        &settings.completion.base_url,
        &api_key,
        &settings.audio.model,
    )?);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let state = Arc::new(AppState {
        settings,
        backend,
        synthesizer,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/audio", post(audio))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Stafett API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    Output::kv("Audio", "POST /audio");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    /// Single user message; mutually exclusive with `messages`.
    message: Option<String>,
    /// Full conversation to complete.
    messages: Option<Vec<Message>>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    message: Message,
    model: String,
}

#[derive(Deserialize)]
struct AudioRequest {
    /// What the user wants spoken.
    input: String,
    /// Voice override passed to the synthesizer.
    #[serde(default)]
    voice: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Raw completion pass-through; the agent runtime is bypassed entirely.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let messages = match (req.messages, req.message) {
        (Some(messages), _) if !messages.is_empty() => messages,
        (_, Some(message)) => vec![Message::user(message)],
        _ => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Provide 'message' or a non-empty 'messages' list".to_string(),
            )
        }
    };

    let model = req
        .model
        .unwrap_or_else(|| state.settings.completion.model.clone());

    let request = CompletionRequest {
        model: model.clone(),
        messages,
        tools: None,
        tool_choice: None,
    };

    match state.backend.complete(request).await {
        Ok(response) => match response.choices.into_iter().next() {
            Some(choice) => Json(ChatResponse {
                message: choice.message,
                model,
            })
            .into_response(),
            None => error_response(
                StatusCode::BAD_GATEWAY,
                "No response from model".to_string(),
            ),
        },
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Audio generation through the agent runtime.
async fn audio(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AudioRequest>,
) -> impl IntoResponse {
    let voice = req
        .voice
        .unwrap_or_else(|| state.settings.audio.default_voice.clone());

    let agent = Agent::new("audio", &state.settings.completion.model, state.backend.clone())
        .with_instructions(AUDIO_SYSTEM_PROMPT)
        .with_tool(generate_audio_tool(state.synthesizer.clone(), &voice));

    let mut runner = AgentRunner::with_config(state.settings.runner.to_config());
    runner.register_agent(agent, true);

    match runner.run(&req.input, None).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
