//! Widget WebSocket channel — real-time chat for the embedded iframe.
//!
//! Each WebSocket connection owns one session. The client sends JSON
//! messages (`message`, `form`, `refresh`); the server streams
//! [`SessionEvent`]s back (`typing`, `message`, `step`, `cleared`). CORS is
//! wide open since the widget is embedded cross-origin.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::parsers;
use crate::profile::{self, BirthProfile};
use crate::session::{SessionEvent, SessionHandle, SessionManager};

// ── JSON Protocol ───────────────────────────────────────────────────────

/// Message from widget client → server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// Free-text user input for the dialog controller.
    Message { content: String },
    /// Modal-form submission: the whole birth profile at once.
    Form { profile: serde_json::Value },
    /// Reset the session (transcript, profile, guard, timers).
    Refresh,
}

// ── Axum wiring ─────────────────────────────────────────────────────────

/// Shared state for the widget routes.
#[derive(Clone)]
pub struct WidgetState {
    pub sessions: Arc<SessionManager>,
}

/// Build the widget router with the `/ws/widget` endpoint.
pub fn widget_routes(state: WidgetState) -> Router {
    Router::new()
        .route("/ws/widget", get(ws_widget_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn ws_widget_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<WidgetState>,
) -> impl IntoResponse {
    info!("Widget client connecting");
    let profile = prefilled_profile(&params);
    ws.on_upgrade(move |socket| handle_widget_socket(socket, state, profile))
}

/// Birth details the host page already knows, passed as query parameters.
/// A complete profile skips intake entirely; a name alone resumes at the
/// date-of-birth step.
fn prefilled_profile(params: &HashMap<String, String>) -> Option<BirthProfile> {
    let name = params.get("name")?.trim().to_string();
    if name.is_empty() {
        return None;
    }
    let mut prefilled = BirthProfile {
        name,
        ..Default::default()
    };
    if let Some(dob) = params.get("dob").and_then(|s| parsers::date::parse(s)) {
        prefilled.dob = dob;
    }
    if let Some(tob) = params.get("tob").and_then(|s| parsers::time::parse(s)) {
        prefilled.tob = tob;
    }
    if let Some(place) = params.get("place") {
        prefilled.place = place.trim().to_string();
    }
    if let Some(tz) = params.get("timezone") {
        if profile::is_valid_timezone(tz) {
            prefilled.timezone = tz.clone();
        }
    }
    Some(prefilled)
}

async fn handle_widget_socket(
    mut socket: WebSocket,
    state: WidgetState,
    prefilled: Option<BirthProfile>,
) {
    let (handle, mut events) = match prefilled {
        Some(profile) => state.sessions.resume(profile).await,
        None => state.sessions.create().await,
    };
    info!(session = %handle.id, "Widget session opened");

    handle.start().await;

    loop {
        tokio::select! {
            // Stream session events to the client.
            event = events.recv() => {
                match event {
                    Some(event) => {
                        if !send_event(&mut socket, &event).await {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // Receive client messages.
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => dispatch(&handle, message).await,
                            Err(e) => {
                                debug!(error = %e, text = %text, "Invalid JSON from widget client");
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Widget client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "Widget WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    state.sessions.remove(handle.id).await;
    info!(session = %handle.id, "Widget session closed");
}

async fn send_event(socket: &mut WebSocket, event: &SessionEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to serialize session event");
            true
        }
    }
}

async fn dispatch(handle: &Arc<SessionHandle>, message: ClientMessage) {
    match message {
        ClientMessage::Message { content } => {
            let content = content.trim().to_string();
            if content.is_empty() {
                return;
            }
            // Handle on a separate task so paced replies don't stall the
            // socket loop.
            let handle = Arc::clone(handle);
            tokio::spawn(async move {
                handle.handle_user_message(&content).await;
            });
        }
        ClientMessage::Form { profile } => {
            if let Err(e) = handle.apply_form(&profile).await {
                // Form validation failures stay with the modal; log only.
                warn!(error = %e, "Form submission rejected");
            }
        }
        ClientMessage::Refresh => handle.refresh().await,
    }
}
