//! Per-connection live view.
//!
//! Each socket owns one controller: a [`CitizenMap`] or an
//! [`OfficialsDashboard`]. The loop applies sync events, client commands
//! and finished submissions to it, and pushes the full view model after
//! every change. Dropping the controller on disconnect releases its live
//! queries.
//!
//! Wire format, both directions JSON text frames tagged by `type`:
//!
//! ```text
//! server -> client  {"type":"view","model":{"view":"citizen",...}}
//!                   {"type":"error","message":"..."}
//! client -> server  {"type":"set_filter","filter":"ongoing"}
//!                   {"type":"select","kind":"report","id":"..."}
//!                   {"type":"clear_selection"}
//!                   {"type":"dismiss","id":"..."}
//!                   {"type":"open_form"} / {"type":"close_form"}
//!                   {"type":"edit_form","form":{"type":"hazard","description":"..."}}
//!                   {"type":"submit_report"}
//!                   {"type":"move_camera","center":[lat,lng],"zoom":13}
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use citypulse_client::{
    CitizenMap, CitizenViewModel, DashboardViewModel, OfficialsDashboard, SubmitError, SyncEvent,
};
use citypulse_core::filter::StatusFilter;
use citypulse_core::presentation::MarkerKind;
use citypulse_core::report::ReportDraft;
use citypulse_core::session::View;
use citypulse_core::types::{DocId, Position};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::ws::manager::WsManager;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum LiveViewModel {
    Citizen(CitizenViewModel),
    Officials(DashboardViewModel),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    View { model: LiveViewModel },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    SetFilter { filter: StatusFilter },
    Select { kind: MarkerKind, id: String },
    ClearSelection,
    Dismiss { id: String },
    OpenForm,
    CloseForm,
    EditForm { form: ReportDraft },
    SubmitReport,
    MoveCamera { center: Position, zoom: f64 },
}

type Submission = Pin<Box<dyn Future<Output = Result<DocId, SubmitError>> + Send>>;

/// What a command did to the view.
enum Handled {
    Changed,
    Submit(Submission),
    Rejected(String),
}

// ---------------------------------------------------------------------------
// LiveView
// ---------------------------------------------------------------------------

pub enum LiveView {
    Citizen(CitizenMap),
    Officials(OfficialsDashboard),
}

impl LiveView {
    pub async fn mount(view: View, state: &AppState) -> Self {
        match view {
            View::Citizen => Self::Citizen(
                CitizenMap::mount(state.store.clone(), Arc::clone(&state.notifier)).await,
            ),
            View::Officials => Self::Officials(OfficialsDashboard::mount(state.store.clone()).await),
        }
    }

    /// Cancel-safe: delegates to the controller's live sync.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        match self {
            Self::Citizen(map) => map.sync_mut().next_event().await,
            Self::Officials(dashboard) => dashboard.sync_mut().next_event().await,
        }
    }

    pub fn apply(&mut self, event: SyncEvent) {
        match self {
            Self::Citizen(map) => map.apply(event),
            Self::Officials(dashboard) => dashboard.apply(event),
        }
    }

    pub fn model(&self) -> LiveViewModel {
        match self {
            Self::Citizen(map) => LiveViewModel::Citizen(map.view_model()),
            Self::Officials(dashboard) => LiveViewModel::Officials(dashboard.view_model()),
        }
    }

    fn handle(&mut self, command: ClientCommand) -> Handled {
        match (self, command) {
            (Self::Citizen(map), ClientCommand::Select { kind, id }) => {
                select_outcome(map.select(kind, &id), kind, &id)
            }
            (Self::Officials(dashboard), ClientCommand::Select { kind, id }) => {
                select_outcome(dashboard.select(kind, &id), kind, &id)
            }
            (Self::Citizen(map), ClientCommand::ClearSelection) => {
                map.clear_selection();
                Handled::Changed
            }
            (Self::Officials(dashboard), ClientCommand::ClearSelection) => {
                dashboard.clear_selection();
                Handled::Changed
            }
            (Self::Citizen(map), ClientCommand::MoveCamera { center, zoom }) => {
                map.move_camera(center, zoom);
                Handled::Changed
            }
            (Self::Officials(dashboard), ClientCommand::MoveCamera { center, zoom }) => {
                dashboard.move_camera(center, zoom);
                Handled::Changed
            }
            (Self::Officials(dashboard), ClientCommand::SetFilter { filter }) => {
                dashboard.set_filter(filter);
                Handled::Changed
            }
            (Self::Citizen(map), ClientCommand::Dismiss { id }) => {
                if map.dismiss(&id) {
                    Handled::Changed
                } else {
                    Handled::Rejected(format!("No notice with id {id}"))
                }
            }
            (Self::Citizen(map), ClientCommand::OpenForm) => {
                map.open_form();
                Handled::Changed
            }
            (Self::Citizen(map), ClientCommand::CloseForm) => {
                map.close_form();
                Handled::Changed
            }
            (Self::Citizen(map), ClientCommand::EditForm { form }) => {
                map.edit_form(form.kind, form.description);
                Handled::Changed
            }
            (Self::Citizen(map), ClientCommand::SubmitReport) => {
                Handled::Submit(Box::pin(map.submission()))
            }
            (live, command) => Handled::Rejected(format!(
                "Command {command:?} is not available in the {} view",
                live.view_name()
            )),
        }
    }

    /// Apply a finished submission. Returns the message for outcomes the
    /// tray does not show.
    fn finish_submission(&mut self, result: Result<DocId, SubmitError>) -> Option<String> {
        let Self::Citizen(map) = self else {
            return None;
        };
        map.finish_submission(&result);
        match result {
            Err(e @ (SubmitError::Validation(_) | SubmitError::InFlight)) => Some(e.to_string()),
            _ => None,
        }
    }

    fn view_name(&self) -> &'static str {
        match self {
            Self::Citizen(_) => "citizen",
            Self::Officials(_) => "officials",
        }
    }

    pub fn unmount(self) {
        match self {
            Self::Citizen(map) => map.unmount(),
            Self::Officials(dashboard) => dashboard.unmount(),
        }
    }
}

fn select_outcome(found: bool, kind: MarkerKind, id: &str) -> Handled {
    let kind = match kind {
        MarkerKind::Project => "project",
        MarkerKind::Report => "report",
    };
    if found {
        Handled::Changed
    } else {
        Handled::Rejected(format!("No {kind} with id {id}"))
    }
}

// ---------------------------------------------------------------------------
// Connection loop
// ---------------------------------------------------------------------------

/// Serve one live view until the client leaves or the server shuts down.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Runs the view loop on the current task.
///   4. Releases the view and cleans up on disconnect.
pub async fn run(socket: WebSocket, view: View, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, ?view, "Live view connected");

    let ws_manager = Arc::clone(&state.ws_manager);
    let mut rx = ws_manager.add(conn_id.clone(), view).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let mut live = LiveView::mount(view, &state).await;
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let mut syncing = true;
    let mut open = push(&ws_manager, &conn_id, &view_message(&live)).await;

    while open {
        let reply = tokio::select! {
            () = state.shutdown.cancelled() => break,
            event = live.next_event(), if syncing => match event {
                Some(event) => {
                    live.apply(event);
                    None
                }
                None => {
                    tracing::warn!(conn_id = %conn_id, "Live queries ended");
                    syncing = false;
                    continue;
                }
            },
            Some(result) = done_rx.recv() => live.finish_submission(result),
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientCommand>(text.as_str()) {
                        Ok(command) => match live.handle(command) {
                            Handled::Changed => None,
                            Handled::Rejected(message) => Some(message),
                            Handled::Submit(submission) => {
                                let done_tx = done_tx.clone();
                                tokio::spawn(async move {
                                    let _ = done_tx.send(submission.await);
                                });
                                None
                            }
                        },
                        Err(e) => Some(format!("Invalid command: {e}")),
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(conn_id = %conn_id, "Pong received");
                    continue;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
        };

        if let Some(message) = reply {
            open = push(&ws_manager, &conn_id, &ServerMessage::Error { message }).await;
        }
        open = open && push(&ws_manager, &conn_id, &view_message(&live)).await;
    }

    // Clean up: release the live queries, remove the connection, stop the sender.
    live.unmount();
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Live view disconnected");
}

fn view_message(live: &LiveView) -> ServerMessage {
    ServerMessage::View {
        model: live.model(),
    }
}

/// Queue a message for the connection; `false` once it is gone.
async fn push(ws_manager: &WsManager, conn_id: &str, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(text) => ws_manager.send_to(conn_id, Message::Text(text.into())).await,
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Failed to encode live view");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citypulse_core::report::ReportType;

    #[test]
    fn commands_decode_from_tagged_json() {
        let command: ClientCommand =
            serde_json::from_str(r#"{"type":"set_filter","filter":"ongoing"}"#).unwrap();
        assert_eq!(
            command,
            ClientCommand::SetFilter {
                filter: StatusFilter::Only("ongoing")
            }
        );

        let command: ClientCommand = serde_json::from_str(
            r#"{"type":"edit_form","form":{"type":"hazard","description":"pothole"}}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            ClientCommand::EditForm {
                form: ReportDraft::new(ReportType::Hazard, "pothole")
            }
        );

        let command: ClientCommand =
            serde_json::from_str(r#"{"type":"move_camera","center":[37.7,-122.4],"zoom":13}"#)
                .unwrap();
        assert_eq!(
            command,
            ClientCommand::MoveCamera {
                center: Position::new(37.7, -122.4),
                zoom: 13.0
            }
        );
    }

    #[test]
    fn unknown_filter_fails_to_decode() {
        let result =
            serde_json::from_str::<ClientCommand>(r#"{"type":"set_filter","filter":"archived"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn error_message_is_tagged() {
        let json = serde_json::to_value(ServerMessage::Error {
            message: "nope".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"type": "error", "message": "nope"}));
    }
}
