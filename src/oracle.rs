//! The external positional evaluator and the scores it reports.
//!
//! An oracle is stateful: a UCI engine remembers the position it was
//! last given. [`SharedOracle`] is the process-wide handle; every
//! sequence of queries that belongs to one selection runs while holding
//! its lock, so two selections never interleave on one engine.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, uci::UciMove};

use crate::error::BlendError;

/// Converted value of a forced mate, divided by the mate distance.
pub const MATE_WEIGHT: f64 = 1e4;

/// Floor for the mate distance so mate-in-0 stays finite.
pub const MATE_EPSILON: f64 = 1e-9;

/// A raw engine score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    Centipawns(i32),
    /// Mate in the given number of moves; negative when being mated.
    Mate(i32),
}

/// A score together with the side it is reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub score: Score,
    pub pov: Color,
}

impl Evaluation {
    pub fn new(score: Score, pov: Color) -> Self {
        Evaluation { score, pov }
    }

    /// Signed value from `mover`'s side; higher is better for `mover`.
    ///
    /// Centipawns are scaled to pawns. A mate `m` becomes
    /// `MATE_WEIGHT / max(|m|, MATE_EPSILON)` carrying the sign of `m`.
    /// Mate 0 means the side to move of the analysed position is already
    /// mated, which is a win from the other side.
    pub fn for_mover(&self, mover: Color) -> f32 {
        let value = match self.score {
            Score::Centipawns(cp) => cp as f64 / 100.0,
            Score::Mate(0) => -MATE_WEIGHT / MATE_EPSILON,
            Score::Mate(m) => {
                m.signum() as f64 * MATE_WEIGHT / (m.unsigned_abs() as f64).max(MATE_EPSILON)
            }
        };
        let value = if self.pov == mover { value } else { -value };
        value as f32
    }
}

/// One entry of the oracle's ranked move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMove {
    pub uci: UciMove,
    pub evaluation: Evaluation,
}

/// Queries an external evaluator understands.
pub trait EvaluationOracle {
    /// Evaluation of `pos` itself.
    fn evaluate(&mut self, pos: &Chess) -> Result<Evaluation, BlendError>;

    /// Up to `k` best moves from `pos`, best first. Moves without a
    /// score are omitted.
    fn top_moves(&mut self, pos: &Chess, k: usize) -> Result<Vec<RankedMove>, BlendError>;

    /// The single best move from `pos`, if the oracle has one.
    fn best_move(&mut self, pos: &Chess) -> Result<Option<UciMove>, BlendError>;
}

impl<O: EvaluationOracle + ?Sized> EvaluationOracle for Box<O> {
    fn evaluate(&mut self, pos: &Chess) -> Result<Evaluation, BlendError> {
        (**self).evaluate(pos)
    }

    fn top_moves(&mut self, pos: &Chess, k: usize) -> Result<Vec<RankedMove>, BlendError> {
        (**self).top_moves(pos, k)
    }

    fn best_move(&mut self, pos: &Chess) -> Result<Option<UciMove>, BlendError> {
        (**self).best_move(pos)
    }
}

pub type DynOracle = Box<dyn EvaluationOracle + Send>;

/// Cloneable, mutually exclusive handle to one oracle instance.
#[derive(Clone)]
pub struct SharedOracle {
    inner: Arc<Mutex<DynOracle>>,
}

impl SharedOracle {
    pub fn new(oracle: impl EvaluationOracle + Send + 'static) -> Self {
        SharedOracle {
            inner: Arc::new(Mutex::new(Box::new(oracle))),
        }
    }

    /// Exclusive access for a whole query sequence.
    pub fn lock(&self) -> Result<MutexGuard<'_, DynOracle>, BlendError> {
        self.inner
            .lock()
            .map_err(|_| BlendError::OracleUnavailable("oracle lock poisoned".to_string()))
    }
}
