//! Request/response boundary to the game server.
//!
//! [`GameServer`] is the contract the rest of the agent is written against;
//! [`HttpGameServer`] speaks it over HTTP. Implementations never retry: pacing
//! and recovery belong to the polling loop.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::TableConfig;
use crate::game::{Action, GameSnapshot, ParticipantId, Phase, SessionId};
use crate::session::Seat;

pub mod http;
pub mod wire;

pub use http::HttpGameServer;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("could not reach game server: {0}")]
    Transport(#[source] BoxError),
    #[error("server rejected request ({status}): {reason}")]
    ServerRejected { status: u16, reason: String },
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    #[error("no such session: {0}")]
    NoSuchSession(String),
    #[error("session is full: {0}")]
    SessionFull(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn transport(error: impl Into<BoxError>) -> Self {
        Self::Transport(error.into())
    }

    /// True when the server could not be reached at all, as opposed to
    /// answering with something the agent did not like.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(error)
    }
}

/// Result of a state poll that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Snapshot(GameSnapshot),
    /// The server answered but had no state to report yet.
    Unavailable,
}

/// What the server said about a submitted action. A refusal is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Rejected { reason: String },
}

/// Seat assignment returned by a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub participant: ParticipantId,
    pub position: usize,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub game_id: SessionId,
    pub name: String,
    #[serde(default)]
    pub player_count: usize,
    #[serde(default)]
    pub max_players: usize,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub pot: u32,
}

pub trait GameServer {
    fn create_session(
        &self,
        table: &TableConfig,
    ) -> impl Future<Output = Result<SessionId, ApiError>>;

    fn join_session(
        &self,
        session: &SessionId,
        display_name: &str,
    ) -> impl Future<Output = Result<Joined, ApiError>>;

    fn start_session(&self, session: &SessionId) -> impl Future<Output = Result<(), ApiError>>;

    fn fetch_state(
        &self,
        session: &SessionId,
        participant: &ParticipantId,
    ) -> impl Future<Output = Result<FetchOutcome, ApiError>>;

    fn submit_action(
        &self,
        seat: &Seat,
        action: Action,
    ) -> impl Future<Output = Result<SubmissionOutcome, ApiError>>;
}

impl<T: GameServer + ?Sized> GameServer for &T {
    fn create_session(
        &self,
        table: &TableConfig,
    ) -> impl Future<Output = Result<SessionId, ApiError>> {
        (**self).create_session(table)
    }

    fn join_session(
        &self,
        session: &SessionId,
        display_name: &str,
    ) -> impl Future<Output = Result<Joined, ApiError>> {
        (**self).join_session(session, display_name)
    }

    fn start_session(&self, session: &SessionId) -> impl Future<Output = Result<(), ApiError>> {
        (**self).start_session(session)
    }

    fn fetch_state(
        &self,
        session: &SessionId,
        participant: &ParticipantId,
    ) -> impl Future<Output = Result<FetchOutcome, ApiError>> {
        (**self).fetch_state(session, participant)
    }

    fn submit_action(
        &self,
        seat: &Seat,
        action: Action,
    ) -> impl Future<Output = Result<SubmissionOutcome, ApiError>> {
        (**self).submit_action(seat, action)
    }
}
