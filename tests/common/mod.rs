#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use poker_agent::agent::Pacer;
use poker_agent::api::{ApiError, FetchOutcome, GameServer, Joined, SubmissionOutcome};
use poker_agent::config::{Pacing, TableConfig};
use poker_agent::game::{Action, GameSnapshot, ParticipantId, SessionId};
use poker_agent::session::{Seat, SessionOrigin};
use serde_json::json;
use tokio::sync::Notify;

pub const ME: &str = "alpha_1";

/// In-memory server that replays queued replies. Once its fetch script runs
/// dry it answers `Unavailable` and fires `drained`.
#[derive(Default)]
pub struct ScriptedServer {
    fetches: Mutex<VecDeque<Result<FetchOutcome, ApiError>>>,
    replies: Mutex<VecDeque<Result<SubmissionOutcome, ApiError>>>,
    create_error: Mutex<Option<ApiError>>,
    join_error: Mutex<Option<ApiError>>,
    start_error: Mutex<Option<ApiError>>,
    created: Mutex<Vec<TableConfig>>,
    joins: Mutex<Vec<(SessionId, String)>>,
    submitted: Mutex<Vec<Action>>,
    fetch_count: Mutex<usize>,
    fetch_delay: Mutex<Option<Duration>>,
    pub drained: Arc<Notify>,
    pub fetch_started: Arc<Notify>,
}

impl ScriptedServer {
    pub fn push_fetch(&self, reply: Result<FetchOutcome, ApiError>) {
        self.fetches.lock().push_back(reply);
    }

    pub fn push_snapshot(&self, snapshot: GameSnapshot) {
        self.push_fetch(Ok(FetchOutcome::Snapshot(snapshot)));
    }

    pub fn push_reply(&self, reply: Result<SubmissionOutcome, ApiError>) {
        self.replies.lock().push_back(reply);
    }

    /// Holds every fetch open for `delay` after announcing it on `fetch_started`.
    pub fn delay_fetches(&self, delay: Duration) {
        *self.fetch_delay.lock() = Some(delay);
    }

    pub fn fail_create(&self, error: ApiError) {
        *self.create_error.lock() = Some(error);
    }

    pub fn fail_join(&self, error: ApiError) {
        *self.join_error.lock() = Some(error);
    }

    pub fn fail_start(&self, error: ApiError) {
        *self.start_error.lock() = Some(error);
    }

    pub fn created(&self) -> Vec<TableConfig> {
        self.created.lock().clone()
    }

    pub fn joins(&self) -> Vec<(SessionId, String)> {
        self.joins.lock().clone()
    }

    pub fn submitted(&self) -> Vec<Action> {
        self.submitted.lock().clone()
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetch_count.lock()
    }
}

impl GameServer for ScriptedServer {
    async fn create_session(&self, table: &TableConfig) -> Result<SessionId, ApiError> {
        if let Some(error) = self.create_error.lock().take() {
            return Err(error);
        }
        self.created.lock().push(table.clone());
        Ok(SessionId::new("game-1"))
    }

    async fn join_session(&self, session: &SessionId, display_name: &str) -> Result<Joined, ApiError> {
        if let Some(error) = self.join_error.lock().take() {
            return Err(error);
        }
        let mut joins = self.joins.lock();
        let position = joins.len();
        joins.push((session.clone(), display_name.to_string()));
        Ok(Joined {
            participant: ParticipantId::new(format!(
                "{}_{}",
                display_name.to_lowercase(),
                position + 1
            )),
            position,
            auth_token: None,
        })
    }

    async fn start_session(&self, _session: &SessionId) -> Result<(), ApiError> {
        match self.start_error.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn fetch_state(
        &self,
        _session: &SessionId,
        _participant: &ParticipantId,
    ) -> Result<FetchOutcome, ApiError> {
        *self.fetch_count.lock() += 1;
        self.fetch_started.notify_one();
        let delay = *self.fetch_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.fetches.lock().pop_front();
        match next {
            Some(reply) => reply,
            None => {
                self.drained.notify_one();
                Ok(FetchOutcome::Unavailable)
            }
        }
    }

    async fn submit_action(&self, _seat: &Seat, action: Action) -> Result<SubmissionOutcome, ApiError> {
        self.submitted.lock().push(action);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or(Ok(SubmissionOutcome::Accepted))
    }
}

/// Records every requested wait and returns at once.
#[derive(Debug, Clone, Default)]
pub struct RecordingPacer {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingPacer {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) -> impl Future<Output = ()> {
        self.waits.lock().push(duration);
        std::future::ready(())
    }
}

pub fn pacing() -> Pacing {
    Pacing {
        poll: Duration::from_millis(20),
        backoff: Duration::from_millis(500),
        after_action: Duration::from_millis(10),
    }
}

pub fn seat() -> Seat {
    Seat::new(
        SessionId::new("game-1"),
        Joined {
            participant: ParticipantId::new(ME),
            position: 0,
            auth_token: None,
        },
        SessionOrigin::Joined,
    )
}

pub fn snapshot(turn: &str, legal: &[&str], current_bet: u32) -> GameSnapshot {
    serde_json::from_value(json!({
        "phase": "flop",
        "pot": 150,
        "your_chips": 900,
        "your_cards": ["As", "Kd"],
        "community_cards": ["2c", "7h", "Td"],
        "current_player_id": turn,
        "valid_actions": legal,
        "current_bet": current_bet
    }))
    .expect("snapshot fixture decodes")
}

pub fn timed_out() -> ApiError {
    ApiError::transport(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "request timed out",
    ))
}
