//! Turn-driven polling loop.
//!
//! Each cycle polls the server once, decides when the snapshot says it is the
//! agent's turn, submits at most one action and reports how long to wait
//! before the next cycle. Steady-state failures never end the loop; only the
//! shutdown future passed to [`Agent::run`] does.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::FutureExt;
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::api::{FetchOutcome, GameServer, SubmissionOutcome};
use crate::config::Pacing;
use crate::game::GameSnapshot;
use crate::policy::Policy;
use crate::session::Seat;

/// Suspends the loop between cycles.
pub trait Pacer {
    fn pause(&self, duration: Duration) -> impl Future<Output = ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

impl Pacer for TokioPacer {
    fn pause(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// The poll reached the server but there was no snapshot yet.
    AwaitingState,
    /// Snapshot in hand, nothing for the agent to do.
    Observing,
    /// It was the agent's turn and an action went out.
    Deciding,
    /// The poll failed.
    IdleOnError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Accepted,
    Rejected,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub state: LoopState,
    pub wait: Duration,
    pub submission: Option<SubmitStatus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub submissions: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub errors: u64,
}

pub struct Agent<S, P, C = TokioPacer> {
    server: S,
    policy: P,
    pacer: C,
    seat: Seat,
    pacing: Pacing,
    stats: LoopStats,
    finish_reported: bool,
}

impl<S, P> Agent<S, P, TokioPacer> {
    pub fn new(server: S, policy: P, seat: Seat, pacing: Pacing) -> Self {
        Self {
            server,
            policy,
            pacer: TokioPacer,
            seat,
            pacing,
            stats: LoopStats::default(),
            finish_reported: false,
        }
    }
}

impl<S, P, C> Agent<S, P, C> {
    pub fn with_pacer<D: Pacer>(self, pacer: D) -> Agent<S, P, D> {
        Agent {
            server: self.server,
            policy: self.policy,
            pacer,
            seat: self.seat,
            pacing: self.pacing,
            stats: self.stats,
            finish_reported: self.finish_reported,
        }
    }

    pub fn seat(&self) -> &Seat {
        &self.seat
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }
}

impl<S, P, C> Agent<S, P, C>
where
    S: GameServer,
    P: Policy,
    C: Pacer,
{
    /// Runs cycles until `shutdown` resolves. Shutdown is only observed
    /// between cycles and while pausing, never during a request.
    pub async fn run<F>(&mut self, shutdown: F) -> LoopStats
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = pin!(shutdown);
        info!(
            session = %self.seat.session(),
            participant = %self.seat.participant(),
            "polling for game state"
        );

        loop {
            if shutdown.as_mut().now_or_never().is_some() {
                break;
            }
            let report = self.cycle().await;
            tokio::select! {
                _ = shutdown.as_mut() => break,
                _ = self.pacer.pause(report.wait) => {}
            }
        }

        info!(
            cycles = self.stats.cycles,
            submissions = self.stats.submissions,
            rejected = self.stats.rejected,
            errors = self.stats.errors,
            "agent stopped"
        );
        self.stats
    }

    /// One fetch, decide, submit pass.
    pub async fn cycle(&mut self) -> CycleReport {
        self.stats.cycles += 1;

        let fetched = self
            .server
            .fetch_state(self.seat.session(), self.seat.participant())
            .await;
        let snapshot = match fetched {
            Ok(FetchOutcome::Snapshot(snapshot)) => snapshot,
            Ok(FetchOutcome::Unavailable) => {
                debug!("game state not available yet");
                return self.idle(LoopState::AwaitingState, self.pacing.poll);
            }
            Err(error) => {
                self.stats.errors += 1;
                warn!(
                    %error,
                    wait_ms = self.pacing.backoff.as_millis() as u64,
                    "failed to fetch game state"
                );
                return self.idle(LoopState::IdleOnError, self.pacing.backoff);
            }
        };

        self.report_finish(&snapshot);

        if !snapshot.is_turn_of(self.seat.participant()) {
            debug!(
                phase = ?snapshot.phase,
                pot = snapshot.pot,
                turn = ?snapshot.current_player_id,
                "waiting for our turn"
            );
            return self.idle(LoopState::Observing, self.pacing.poll);
        }

        info!(
            phase = ?snapshot.phase,
            pot = snapshot.pot,
            chips = ?snapshot.your_chips,
            hand = %snapshot.hand(),
            board = %snapshot.board(),
            current_bet = snapshot.current_bet,
            legal = %snapshot.valid_actions.iter().join(","),
            "our turn"
        );

        let Some(action) = self.policy.decide(&snapshot) else {
            debug!("no legal action on our turn");
            return self.idle(LoopState::Observing, self.pacing.poll);
        };

        info!(%action, "submitting action");
        self.stats.submissions += 1;
        let status = match self.server.submit_action(&self.seat, action).await {
            Ok(SubmissionOutcome::Accepted) => {
                self.stats.accepted += 1;
                info!("action accepted");
                SubmitStatus::Accepted
            }
            Ok(SubmissionOutcome::Rejected { reason }) => {
                self.stats.rejected += 1;
                warn!(%reason, "action rejected");
                SubmitStatus::Rejected
            }
            Err(error) => {
                self.stats.errors += 1;
                warn!(%error, "failed to submit action");
                SubmitStatus::Failed
            }
        };

        CycleReport {
            state: LoopState::Deciding,
            wait: self.pacing.after_action,
            submission: Some(status),
        }
    }

    fn idle(&self, state: LoopState, wait: Duration) -> CycleReport {
        CycleReport {
            state,
            wait,
            submission: None,
        }
    }

    fn report_finish(&mut self, snapshot: &GameSnapshot) {
        if !snapshot.game_finished || self.finish_reported {
            return;
        }
        self.finish_reported = true;
        let won = snapshot.winner_id.as_ref() == Some(self.seat.participant());
        info!(
            winner = snapshot.winner_name.as_deref().unwrap_or("unknown"),
            won,
            "game finished"
        );
    }
}
