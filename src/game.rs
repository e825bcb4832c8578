use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, serde_as};

/// Server-assigned identifier of one game instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned identifier of the agent's seat within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    #[serde(other)]
    Other,
}

/// An action kind as named by the server. The set of kinds is discovered per
/// snapshot, so this wraps the wire string rather than enumerating it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct ActionKind(String);

impl From<String> for ActionKind {
    fn from(kind: String) -> Self {
        Self::new(kind)
    }
}

impl ActionKind {
    pub const CHECK: &'static str = "check";
    pub const CALL: &'static str = "call";
    pub const RAISE: &'static str = "raise";
    pub const BET: &'static str = "bet";
    pub const FOLD: &'static str = "fold";

    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into().to_ascii_lowercase())
    }

    pub fn check() -> Self {
        Self::new(Self::CHECK)
    }

    pub fn call() -> Self {
        Self::new(Self::CALL)
    }

    pub fn raise() -> Self {
        Self::new(Self::RAISE)
    }

    pub fn fold() -> Self {
        Self::new(Self::FOLD)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raise-like kinds carry a target amount; everything else is bare.
    pub fn requires_amount(&self) -> bool {
        matches!(self.0.as_str(), Self::RAISE | Self::BET)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAction {
    #[error("action `{0}` requires an amount")]
    MissingAmount(ActionKind),
    #[error("action `{0}` does not take an amount")]
    UnexpectedAmount(ActionKind),
}

/// One move, consumed by a single submission. The amount is present exactly
/// when the kind requires one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<u32>,
}

impl Action {
    pub fn new(kind: ActionKind, amount: Option<u32>) -> Result<Self, InvalidAction> {
        match (kind.requires_amount(), amount) {
            (true, None) => Err(InvalidAction::MissingAmount(kind)),
            (false, Some(_)) => Err(InvalidAction::UnexpectedAmount(kind)),
            _ => Ok(Self { kind, amount }),
        }
    }

    pub fn check() -> Self {
        Self {
            kind: ActionKind::check(),
            amount: None,
        }
    }

    pub fn call() -> Self {
        Self {
            kind: ActionKind::call(),
            amount: None,
        }
    }

    pub fn fold() -> Self {
        Self {
            kind: ActionKind::fold(),
            amount: None,
        }
    }

    pub fn raise_to(amount: u32) -> Self {
        Self {
            kind: ActionKind::raise(),
            amount: Some(amount),
        }
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn amount(&self) -> Option<u32> {
        self.amount
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.amount {
            Some(amount) => write!(f, "{} {}", self.kind, amount),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerInfo {
    pub id: ParticipantId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chips: u32,
    #[serde(default)]
    pub current_bet: u32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub status: String,
}

/// One immutable read of the session as seen by the agent.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub phase: Phase,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub pot: u32,
    #[serde(default)]
    pub your_chips: Option<u32>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub your_cards: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub community_cards: Vec<String>,
    #[serde(default)]
    pub current_player_id: Option<ParticipantId>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub valid_actions: Vec<ActionKind>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub current_bet: u32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub players: Vec<PlayerInfo>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub game_finished: bool,
    #[serde(default)]
    pub winner_id: Option<ParticipantId>,
    #[serde(default)]
    pub winner_name: Option<String>,
}

impl GameSnapshot {
    pub fn is_turn_of(&self, participant: &ParticipantId) -> bool {
        self.current_player_id.as_ref() == Some(participant)
    }

    pub fn is_legal(&self, kind: &str) -> bool {
        self.valid_actions.iter().any(|legal| legal.as_str() == kind)
    }

    pub fn hand(&self) -> String {
        format_cards(&self.your_cards)
    }

    pub fn board(&self) -> String {
        format_cards(&self.community_cards)
    }
}

fn format_cards(cards: &[String]) -> String {
    if cards.is_empty() {
        "--".to_string()
    } else {
        cards.iter().join(" ")
    }
}
