use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::wire::{
    CreateSessionResponse, ErrorBody, JoinSessionRequest, JoinSessionResponse, SessionList,
    SubmitActionRequest, SubmitActionResponse,
};
use crate::api::{ApiError, FetchOutcome, GameServer, Joined, SessionSummary, SubmissionOutcome};
use crate::config::{AgentConfig, TableConfig};
use crate::game::{Action, ParticipantId, SessionId};
use crate::session::Seat;

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    List,
    Create,
    Join,
    Start,
    State,
}

/// [`GameServer`] over the server's JSON HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGameServer {
    client: Client,
    base_url: Url,
}

impl HttpGameServer {
    /// `base_url` points at the API root, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;
        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|err| ApiError::InvalidUrl(format!("{raw}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(raw));
        }
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self, ApiError> {
        Self::new(config.server_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionSummary>, ApiError> {
        let response = self
            .client
            .get(self.url(&["games"])?)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(classify(Endpoint::List, status, &body));
        }
        let list: SessionList = decode(&body)?;
        Ok(list.games)
    }

    /// Appends percent-encoded path segments to the API root.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn game_url(&self, session: &SessionId, path: &str) -> Result<Url, ApiError> {
        self.url(&["games", session.as_str(), path])
    }
}

impl GameServer for HttpGameServer {
    async fn create_session(&self, table: &TableConfig) -> Result<SessionId, ApiError> {
        let response = self
            .client
            .post(self.url(&["games"])?)
            .json(table)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(classify(Endpoint::Create, status, &body));
        }
        let created: CreateSessionResponse = decode(&body)?;
        debug!(session = %created.game_id, name = ?created.name, "session created");
        Ok(created.game_id)
    }

    async fn join_session(&self, session: &SessionId, display_name: &str) -> Result<Joined, ApiError> {
        let response = self
            .client
            .post(self.game_url(session, "join")?)
            .json(&JoinSessionRequest {
                bot_name: display_name,
            })
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(classify(Endpoint::Join, status, &body));
        }
        let joined: JoinSessionResponse = decode(&body)?;
        Ok(Joined {
            participant: joined.player_id,
            position: joined.position,
            auth_token: joined.auth_token,
        })
    }

    async fn start_session(&self, session: &SessionId) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.game_url(session, "start")?)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(classify(Endpoint::Start, status, &body));
        }
        Ok(())
    }

    async fn fetch_state(
        &self,
        session: &SessionId,
        participant: &ParticipantId,
    ) -> Result<FetchOutcome, ApiError> {
        let response = self
            .client
            .get(self.game_url(session, "state")?)
            .query(&[("player_id", participant.as_str())])
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(classify(Endpoint::State, status, &body));
        }
        // A missing or empty body means the server has nothing to report yet.
        let body = body.trim();
        if body.is_empty() || body == "null" || body == "{}" {
            return Ok(FetchOutcome::Unavailable);
        }
        decode(body).map(FetchOutcome::Snapshot)
    }

    async fn submit_action(&self, seat: &Seat, action: Action) -> Result<SubmissionOutcome, ApiError> {
        let request = SubmitActionRequest {
            player_id: seat.participant(),
            auth_token: seat.auth_token(),
            action: &action,
        };
        let response = self
            .client
            .post(self.game_url(seat.session(), "action")?)
            .json(&request)
            .send()
            .await?;
        let (status, body) = read_body(response).await?;
        if status.is_server_error() {
            return Err(ApiError::ServerRejected {
                status: status.as_u16(),
                reason: reason_from(status, &body),
            });
        }
        if !status.is_success() {
            return Ok(SubmissionOutcome::Rejected {
                reason: reason_from(status, &body),
            });
        }
        let reply: SubmitActionResponse = decode(&body)?;
        if reply.success {
            Ok(SubmissionOutcome::Accepted)
        } else {
            Ok(SubmissionOutcome::Rejected {
                reason: reply
                    .error
                    .unwrap_or_else(|| "no reason given".to_string()),
            })
        }
    }
}

async fn read_body(response: Response) -> Result<(StatusCode, String), ApiError> {
    let status = response.status();
    let body = response.text().await?;
    Ok((status, body))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn reason_from(status: StatusCode, body: &str) -> String {
    if let Ok(error) = serde_json::from_str::<ErrorBody>(body) {
        return error.reason();
    }
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}

fn mentions(reason: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| reason.contains(needle))
}

/// Maps a non-success reply onto the error taxonomy. The server does not
/// always use precise status codes, so the reason text is consulted too.
fn classify(endpoint: Endpoint, status: StatusCode, body: &str) -> ApiError {
    let reason = reason_from(status, body);
    let lowered = reason.to_lowercase();
    let full = mentions(&lowered, &["full", "pleine"]);
    let missing = status == StatusCode::NOT_FOUND
        || mentions(&lowered, &["not found", "non trouv", "introuvable", "no such"]);

    match endpoint {
        Endpoint::List | Endpoint::Create => ApiError::ServerRejected {
            status: status.as_u16(),
            reason,
        },
        _ if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
            ApiError::NotAuthorized(reason)
        }
        Endpoint::Join if status == StatusCode::CONFLICT || full => ApiError::SessionFull(reason),
        // A poll cannot tell a vanished session from a seat the server forgot.
        Endpoint::State if missing => ApiError::NotAuthorized(reason),
        Endpoint::Join | Endpoint::Start if missing => ApiError::NoSuchSession(reason),
        _ => ApiError::ServerRejected {
            status: status.as_u16(),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_errors_are_classified_by_status_and_reason() {
        assert!(matches!(
            classify(Endpoint::Join, StatusCode::NOT_FOUND, ""),
            ApiError::NoSuchSession(_)
        ));
        assert!(matches!(
            classify(Endpoint::Join, StatusCode::BAD_REQUEST, r#"{"error":"La partie est pleine"}"#),
            ApiError::SessionFull(reason) if reason == "La partie est pleine"
        ));
        assert!(matches!(
            classify(Endpoint::Join, StatusCode::BAD_REQUEST, r#"{"error":"Partie non trouvée"}"#),
            ApiError::NoSuchSession(_)
        ));
        assert!(matches!(
            classify(Endpoint::Join, StatusCode::BAD_REQUEST, r#"{"error":"game already started"}"#),
            ApiError::ServerRejected { status: 400, .. }
        ));
    }

    #[test]
    fn unknown_participant_on_state_is_not_authorized() {
        assert!(matches!(
            classify(Endpoint::State, StatusCode::BAD_REQUEST, r#"{"error":"Joueur non trouvé"}"#),
            ApiError::NotAuthorized(_)
        ));
        assert!(matches!(
            classify(Endpoint::State, StatusCode::FORBIDDEN, "denied"),
            ApiError::NotAuthorized(reason) if reason == "denied"
        ));
    }

    #[test]
    fn missing_session_on_state_is_not_authorized() {
        assert!(matches!(
            classify(Endpoint::State, StatusCode::NOT_FOUND, r#"{"error":"game not found"}"#),
            ApiError::NotAuthorized(reason) if reason == "game not found"
        ));
        assert!(matches!(
            classify(Endpoint::State, StatusCode::BAD_REQUEST, r#"{"error":"Partie non trouvée"}"#),
            ApiError::NotAuthorized(_)
        ));
        assert!(matches!(
            classify(Endpoint::Start, StatusCode::BAD_REQUEST, r#"{"error":"Partie non trouvée"}"#),
            ApiError::NoSuchSession(_)
        ));
    }

    #[test]
    fn session_ids_are_percent_encoded_into_the_path() -> Result<(), ApiError> {
        let api = HttpGameServer::new("http://localhost:8080/api/", Duration::from_secs(1))?;
        assert_eq!(api.base_url(), "http://localhost:8080/api");
        assert_eq!(
            api.game_url(&SessionId::new("odd id/with?chars"), "state")?.as_str(),
            "http://localhost:8080/api/games/odd%20id%2Fwith%3Fchars/state"
        );

        let bare = HttpGameServer::new("http://localhost:8080", Duration::from_secs(1))?;
        assert_eq!(bare.url(&["games"])?.as_str(), "http://localhost:8080/games");
        Ok(())
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            HttpGameServer::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpGameServer::new("mailto:dealer@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn create_failures_are_always_server_rejections() {
        assert!(matches!(
            classify(Endpoint::Create, StatusCode::NOT_FOUND, ""),
            ApiError::ServerRejected { status: 404, reason } if reason == "Not Found"
        ));
    }
}
