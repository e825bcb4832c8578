//! JSON bodies of the game server's HTTP surface.

use serde::{Deserialize, Serialize};

use crate::api::SessionSummary;
use crate::game::{Action, ParticipantId, SessionId};

#[derive(Debug, Deserialize)]
pub struct CreateSessionResponse {
    pub game_id: SessionId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinSessionRequest<'a> {
    pub bot_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct JoinSessionResponse {
    pub player_id: ParticipantId,
    pub position: usize,
    #[serde(default)]
    pub auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitActionRequest<'a> {
    pub player_id: &'a ParticipantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<&'a str>,
    pub action: &'a Action,
}

#[derive(Debug, Deserialize)]
pub struct SubmitActionResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionList {
    pub games: Vec<SessionSummary>,
}

/// Error payload the server attaches to non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: serde_json::Value,
}

impl ErrorBody {
    pub fn reason(&self) -> String {
        match &self.error {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}
