//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "newslex_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "newslex_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target = "newslex_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e), retryable: false },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e), "retryable": false }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "newslex_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "newslex_backend", "WebSocket disconnected");
}

fn err_msg(e: crate::error::CoreError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string(), retryable: e.retryable() }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListCategories => {
      ServerWsMessage::Categories { categories: logic::list_categories(state) }
    }

    ClientWsMessage::NewSession => {
      let session = logic::create_session(state).await;
      tracing::info!(target: "session", session = %session.id, "WS session created");
      ServerWsMessage::Session { session }
    }

    ClientWsMessage::GetSession { session_id } => {
      match logic::get_session(state, &session_id).await {
        Ok(session) => ServerWsMessage::Session { session },
        Err(e) => err_msg(e),
      }
    }

    ClientWsMessage::LoadArticle { session_id, category } => {
      match logic::load_article(state, &session_id, &category).await {
        Ok(session) => {
          tracing::info!(target: "session", session = %session_id, %category, "WS article loaded");
          ServerWsMessage::Session { session }
        }
        Err(e) => err_msg(e),
      }
    }

    ClientWsMessage::ExtractVocabulary { session_id, level, count } => {
      match logic::extract_vocabulary(state, &session_id, &level, count).await {
        Ok(session) => ServerWsMessage::Session { session },
        Err(e) => err_msg(e),
      }
    }

    ClientWsMessage::EnterPractice { session_id, mode } => {
      match logic::enter_practice(state, &session_id, mode).await {
        Ok(session) => {
          tracing::info!(target: "session", session = %session_id, ?mode, "WS practice entered");
          ServerWsMessage::Session { session }
        }
        Err(e) => err_msg(e),
      }
    }

    ClientWsMessage::Advance { session_id, input } => {
      match logic::advance(state, &session_id, input).await {
        Ok((outcome, session)) => ServerWsMessage::Advanced { outcome, session },
        Err(e) => err_msg(e),
      }
    }

    ClientWsMessage::Complete { session_id, abandon } => {
      match logic::complete(state, &session_id, abandon).await {
        Ok(session) => ServerWsMessage::Session { session },
        Err(e) => err_msg(e),
      }
    }

    ClientWsMessage::EndSession { session_id } => {
      match logic::end_session(state, &session_id).await {
        Ok(()) => ServerWsMessage::Ended { session_id },
        Err(e) => err_msg(e),
      }
    }
  }
}
