use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DEFAULT_RAISE_INCREMENT;
use crate::game::{Action, ActionKind, GameSnapshot};

/// Chooses what to do with a snapshot on the agent's turn.
///
/// Implementations must return `None` only when the snapshot offers no legal
/// action kinds, and otherwise an action whose kind is one of them.
pub trait Policy {
    fn decide(&mut self, snapshot: &GameSnapshot) -> Option<Action>;
}

impl<F> Policy for F
where
    F: FnMut(&GameSnapshot) -> Option<Action>,
{
    fn decide(&mut self, snapshot: &GameSnapshot) -> Option<Action> {
        self(snapshot)
    }
}

/// One slice of the unit interval: rolls below `upper` pick `kind`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    pub upper: f64,
    pub kind: &'static str,
}

/// Weighted choices used when `anchor` is legal. Branch bounds are cumulative
/// and end at 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Group {
    pub anchor: &'static str,
    pub branches: &'static [Branch],
    /// Used when the rolled kind is not legal in this snapshot.
    pub fallback: &'static str,
}

impl Group {
    fn roll(&self, roll: f64) -> &'static str {
        self.branches
            .iter()
            .find(|branch| roll < branch.upper)
            .or_else(|| self.branches.last())
            .map_or(self.anchor, |branch| branch.kind)
    }

    fn resolve(&self, snapshot: &GameSnapshot, rolled: &'static str) -> &'static str {
        [rolled, self.fallback]
            .into_iter()
            .find(|kind| snapshot.is_legal(kind))
            .unwrap_or(self.anchor)
    }
}

/// Groups are tried in order; the first whose anchor is legal decides.
pub const REFERENCE_TABLE: &[Group] = &[
    Group {
        anchor: ActionKind::CHECK,
        branches: &[
            Branch {
                upper: 0.7,
                kind: ActionKind::CHECK,
            },
            Branch {
                upper: 1.0,
                kind: ActionKind::RAISE,
            },
        ],
        fallback: ActionKind::CHECK,
    },
    Group {
        anchor: ActionKind::CALL,
        branches: &[
            Branch {
                upper: 0.6,
                kind: ActionKind::CALL,
            },
            Branch {
                upper: 0.9,
                kind: ActionKind::RAISE,
            },
            Branch {
                upper: 1.0,
                kind: ActionKind::FOLD,
            },
        ],
        fallback: ActionKind::FOLD,
    },
    Group {
        anchor: ActionKind::FOLD,
        branches: &[Branch {
            upper: 1.0,
            kind: ActionKind::FOLD,
        }],
        fallback: ActionKind::FOLD,
    },
];

/// Stochastic reference strategy driven by a cumulative probability table.
pub struct WeightedRandomPolicy<R = StdRng> {
    rng: R,
    table: &'static [Group],
    raise_increment: u32,
}

impl WeightedRandomPolicy<StdRng> {
    /// Seeds from `seed`, or from entropy when absent.
    pub fn seeded(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> WeightedRandomPolicy<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            table: REFERENCE_TABLE,
            raise_increment: DEFAULT_RAISE_INCREMENT,
        }
    }

    pub fn with_table(mut self, table: &'static [Group]) -> Self {
        self.table = table;
        self
    }

    /// Raises go to the current bet plus this many chips.
    pub fn raise_increment(mut self, increment: u32) -> Self {
        self.raise_increment = increment;
        self
    }

    fn amount_for(&self, kind: &ActionKind, snapshot: &GameSnapshot) -> Option<u32> {
        kind.requires_amount()
            .then(|| snapshot.current_bet.saturating_add(self.raise_increment))
    }
}

impl<R: Rng> Policy for WeightedRandomPolicy<R> {
    fn decide(&mut self, snapshot: &GameSnapshot) -> Option<Action> {
        let table = self.table;
        let Some(group) = table.iter().find(|group| snapshot.is_legal(group.anchor)) else {
            // Kinds the table does not know about: take the first one offered.
            let kind = snapshot.valid_actions.first()?.clone();
            let amount = self.amount_for(&kind, snapshot);
            return Action::new(kind, amount).ok();
        };

        let roll = Uniform::new(0.0f64, 1.0f64).sample(&mut self.rng);
        let kind = ActionKind::new(group.resolve(snapshot, group.roll(roll)));
        let amount = self.amount_for(&kind, snapshot);
        Action::new(kind, amount).ok()
    }
}
