//! HTTP/WebSocket gateway.
//!
//! One WebSocket endpoint carries the conversation: structured text/control
//! messages or raw binary audio frames inbound, text or binary frames
//! outbound. A separate synchronous `POST /chat` endpoint serves one-shot
//! text prompts through the direct-completion path only.

pub mod session;

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::{any, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::turn::{
    ResponseMode, TurnController, TurnResult, REPLY_AUDIO_NOT_UNDERSTOOD, REPLY_INTERNAL_ERROR,
    REPLY_UPSTREAM_FAILURE,
};
use crate::providers::base::Transcriber;
use session::SessionState;

/// Text marker sent before a binary audio frame, so clients can distinguish
/// a text-only reply from a marker + audio pair.
pub const AUDIO_MARKER: &str = "[audio]";

/// Shared gateway state.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<TurnController>,
    pub transcriber: Arc<dyn Transcriber>,
}

/// Structured inbound message on the WebSocket channel.
#[derive(Debug, Deserialize)]
struct ClientMessage {
    #[serde(rename = "type")]
    kind: String,
    payload: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .route("/ws", any(ws_handler))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Gateway listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Synchronous request/response endpoint: direct completion only, no tool
/// dispatch, no memory.
async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let response = match state.controller.direct_reply(&req.prompt).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Direct completion failed: {}", e);
            REPLY_UPSTREAM_FAILURE.to_string()
        }
    };
    Json(ChatResponse { response })
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Per-connection loop.
///
/// Turns are strictly sequential: the next inbound message is not read until
/// the previous turn's result has been fully delivered. Any per-turn failure
/// is answered with a fixed message; only transport IO failures end the
/// session.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("WebSocket connection established");
    let mut session = SessionState::new();

    while let Some(msg_result) = socket.recv().await {
        let msg = match msg_result {
            Ok(m) => m,
            Err(e) => {
                info!("WebSocket read failed, closing session: {}", e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(m) if m.kind == "text" => {
                    let result = state.controller.process_turn(&m.payload, session.mode()).await;
                    if deliver(&mut socket, &result).await.is_err() {
                        break;
                    }
                }
                Ok(m) if m.kind == "mode" => match ResponseMode::parse(&m.payload) {
                    // Modality switch produces no reply.
                    Some(mode) => session.set_mode(mode),
                    None => warn!("Ignoring unknown mode '{}'", m.payload),
                },
                Ok(m) => {
                    warn!("Ignoring unknown message type '{}'", m.kind);
                }
                Err(e) => {
                    warn!("Unparseable client message: {}", e);
                    if send_text(&mut socket, REPLY_INTERNAL_ERROR).await.is_err() {
                        break;
                    }
                }
            },
            // A binary frame is one complete audio clip for one turn.
            Message::Binary(data) => {
                let result = audio_turn(
                    state.transcriber.as_ref(),
                    &state.controller,
                    &data,
                    session.mode(),
                )
                .await;
                if deliver(&mut socket, &result).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => {
                info!("WebSocket closed by client");
                break;
            }
            // Ping/pong handled by axum.
            _ => {}
        }
    }

    info!("WebSocket session closed");
}

/// Run one audio turn: transcribe the clip, then hand the transcript to the
/// turn controller.
///
/// A failed or empty transcription short-circuits before any completion call
/// is made; the user is told the audio was not understood.
pub async fn audio_turn(
    transcriber: &dyn Transcriber,
    controller: &TurnController,
    data: &[u8],
    mode: ResponseMode,
) -> TurnResult {
    let transcript = match transcriber.transcribe(data).await {
        Ok(t) => t,
        Err(e) => {
            warn!("Transcription failed: {}", e);
            String::new()
        }
    };

    if transcript.trim().is_empty() {
        return TurnResult {
            reply: REPLY_AUDIO_NOT_UNDERSTOOD.to_string(),
            mode,
            audio: None,
        };
    }

    info!("Transcribed {} bytes of audio", data.len());
    controller.process_turn(&transcript, mode).await
}

/// Deliver one turn result: plain text for text mode, marker + binary frame
/// when synthesized audio is attached. A missing audio payload in audio mode
/// (synthesis failure) falls back to the retained reply text.
async fn deliver(socket: &mut WebSocket, result: &TurnResult) -> Result<(), axum::Error> {
    match &result.audio {
        Some(bytes) => {
            socket.send(Message::Text(AUDIO_MARKER.into())).await?;
            socket.send(Message::Binary(bytes.clone().into())).await
        }
        None => send_text(socket, &result.reply).await,
    }
}

async fn send_text(socket: &mut WebSocket, text: &str) -> Result<(), axum::Error> {
    socket.send(Message::Text(text.to_string().into())).await
}
