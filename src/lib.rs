pub mod agent;
pub mod api;
pub mod config;
pub mod game;
pub mod policy;
pub mod session;

pub use agent::{Agent, CycleReport, LoopState, LoopStats, Pacer, TokioPacer};
pub use api::{ApiError, FetchOutcome, GameServer, HttpGameServer, SubmissionOutcome};
pub use config::{AgentConfig, Pacing, TableConfig};
pub use game::{Action, ActionKind, GameSnapshot, ParticipantId, SessionId};
pub use policy::{Policy, WeightedRandomPolicy};
pub use session::{Seat, SessionOrigin, SetupError, establish};
