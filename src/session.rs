use tracing::{info, warn};

use crate::api::{ApiError, GameServer, Joined};
use crate::config::TableConfig;
use crate::game::{ParticipantId, SessionId};

/// How the agent came to be in its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    /// The agent opened the session and should share its id.
    Created,
    /// The agent joined a session someone else opened.
    Joined,
}

/// The agent's place in one session. Both identifiers are fixed once the
/// server assigns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    session: SessionId,
    participant: ParticipantId,
    position: usize,
    auth_token: Option<String>,
    origin: SessionOrigin,
}

impl Seat {
    pub fn new(session: SessionId, joined: Joined, origin: SessionOrigin) -> Self {
        Self {
            session,
            participant: joined.participant,
            position: joined.position,
            auth_token: joined.auth_token,
            origin,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    pub fn origin(&self) -> SessionOrigin {
        self.origin
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to create session: {0}")]
    Create(#[source] ApiError),
    #[error("failed to join session {session}: {source}")]
    Join {
        session: SessionId,
        #[source]
        source: ApiError,
    },
}

/// Creates a session when `existing` is absent, then joins it as `agent_name`.
///
/// Nothing here is retried: without a seat the agent has nothing to do.
pub async fn establish<S: GameServer>(
    server: &S,
    agent_name: &str,
    existing: Option<SessionId>,
    table: &TableConfig,
) -> Result<Seat, SetupError> {
    let (session, origin) = match existing {
        Some(session) => (session, SessionOrigin::Joined),
        None => {
            let table = table.named_for(agent_name);
            let session = server
                .create_session(&table)
                .await
                .map_err(SetupError::Create)?;
            info!(
                session = %session,
                name = %table.name,
                max_players = table.max_players,
                starting_chips = table.starting_chips,
                blinds = %format!("{}/{}", table.small_blind, table.big_blind),
                "created session"
            );
            (session, SessionOrigin::Created)
        }
    };

    let joined = match server.join_session(&session, agent_name).await {
        Ok(joined) => joined,
        Err(source) => return Err(SetupError::Join { session, source }),
    };
    info!(
        session = %session,
        participant = %joined.participant,
        position = joined.position,
        "joined session"
    );
    Ok(Seat::new(session, joined, origin))
}

/// Asks the server to deal the first hand. The server refuses until enough
/// players are seated, so failure is only worth a warning.
pub async fn request_start<S: GameServer>(server: &S, seat: &Seat) -> bool {
    match server.start_session(seat.session()).await {
        Ok(()) => {
            info!(session = %seat.session(), "session started");
            true
        }
        Err(error) => {
            warn!(session = %seat.session(), %error, "could not start session");
            false
        }
    }
}
