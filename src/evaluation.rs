use ndarray::Array2;
use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Position};

use crate::{
    error::BlendError,
    moves::{MoveIndex, NUM_SQUARES},
    oracle::EvaluationOracle,
};

/// Value of every matrix entry the oracle did not score. Far below any
/// reachable `alpha * p + evaluation`.
pub const SENTINEL: f32 = -1e6;

/// Oracle scores indexed by `[from][to]`, oriented so that higher is
/// better for the side to move.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMatrix(Array2<f32>);

impl EvaluationMatrix {
    pub fn new() -> Self {
        EvaluationMatrix(Array2::from_elem((NUM_SQUARES, NUM_SQUARES), SENTINEL))
    }

    pub fn get(&self, idx: MoveIndex) -> f32 {
        self.0[[idx.from_square() as usize, idx.to_square() as usize]]
    }

    pub fn set(&mut self, idx: MoveIndex, value: f32) {
        self.0[[idx.from_square() as usize, idx.to_square() as usize]] = value;
    }

    pub fn is_sentinel(&self, idx: MoveIndex) -> bool {
        self.get(idx) == SENTINEL
    }

    /// Row-major flattening, aligned with [`MoveIndex`].
    pub fn flatten(&self) -> impl Iterator<Item = f32> + '_ {
        self.0.iter().copied()
    }
}

impl Default for EvaluationMatrix {
    fn default() -> Self {
        Self::new()
    }
}

/// How the evaluation matrix is filled from the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationStrategy {
    /// One oracle evaluation per legal move, of the position after it.
    /// Every legal (from, to) pair receives a real value.
    FullScan,
    /// One ranked-list query from the current position. Only the listed
    /// moves are scored; everything else stays at [`SENTINEL`].
    TopList { k: usize },
}

impl EvaluationStrategy {
    pub fn evaluate(
        &self,
        pos: &Chess,
        oracle: &mut dyn EvaluationOracle,
    ) -> Result<EvaluationMatrix, BlendError> {
        match *self {
            EvaluationStrategy::FullScan => full_scan(pos, oracle),
            EvaluationStrategy::TopList { k } => top_list(pos, oracle, k),
        }
    }
}

fn full_scan(pos: &Chess, oracle: &mut dyn EvaluationOracle) -> Result<EvaluationMatrix, BlendError> {
    let mover = pos.turn();
    let mut matrix = EvaluationMatrix::new();
    let legal = pos.legal_moves();
    for m in &legal {
        let Some(idx) = MoveIndex::of_move(m) else {
            continue;
        };
        // scratch copy: the caller's position is never touched
        let mut scratch = pos.clone();
        scratch.play_unchecked(m.clone());
        let value = oracle.evaluate(&scratch)?.for_mover(mover);
        // promotions sharing a slot keep the best of their values
        if matrix.is_sentinel(idx) || value > matrix.get(idx) {
            matrix.set(idx, value);
        }
    }
    log::debug!("full scan evaluated {} legal moves", legal.len());
    Ok(matrix)
}

fn top_list(
    pos: &Chess,
    oracle: &mut dyn EvaluationOracle,
    k: usize,
) -> Result<EvaluationMatrix, BlendError> {
    let mover = pos.turn();
    let mut matrix = EvaluationMatrix::new();
    let ranked = oracle.top_moves(pos, k)?;
    for entry in &ranked {
        let Some(idx) = MoveIndex::of_uci(&entry.uci) else {
            continue;
        };
        let value = entry.evaluation.for_mover(mover);
        if matrix.is_sentinel(idx) || value > matrix.get(idx) {
            matrix.set(idx, value);
        }
    }
    log::debug!("top list scored {} of {k} requested moves", ranked.len());
    Ok(matrix)
}
