use ndarray::Array3;

use crate::{
    error::BlendError,
    moves::{Candidate, MOVE_SPACE},
};

/// Piece-placement tensor of shape `[8, 8, 12]` (rank, file, channel).
pub type EncodedPosition = Array3<f32>;

/// Probability distribution over the full 4096-slot move space.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDistribution(Vec<f32>);

impl PolicyDistribution {
    /// Allowed drift of the total mass away from 1.
    pub const MASS_TOLERANCE: f32 = 1e-3;

    /// Validates raw scorer output: 4096 finite, non-negative values
    /// that sum to 1.
    pub fn new(probs: Vec<f32>) -> Result<Self, BlendError> {
        if probs.len() != MOVE_SPACE {
            return Err(BlendError::PolicyUnavailable(format!(
                "expected {MOVE_SPACE} probabilities, got {}",
                probs.len()
            )));
        }
        if let Some(bad) = probs.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(BlendError::PolicyUnavailable(format!(
                "invalid probability {bad}"
            )));
        }
        let total: f32 = probs.iter().sum();
        if (total - 1.0).abs() > Self::MASS_TOLERANCE {
            return Err(BlendError::PolicyUnavailable(format!(
                "probabilities sum to {total}"
            )));
        }
        Ok(PolicyDistribution(probs))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Binary mask over the move space; slot `i` is set iff some legal move
/// decodes to index `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMoveMask(Vec<bool>);

impl LegalMoveMask {
    pub fn empty() -> Self {
        LegalMoveMask(vec![false; MOVE_SPACE])
    }

    pub fn set(&mut self, idx: usize) {
        self.0[idx] = true;
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.0[idx]
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// Result of one `select_move` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Move(Candidate),
    /// No move was produced; the caller must not substitute one.
    NoMove,
}

impl Selection {
    pub fn candidate(&self) -> Option<Candidate> {
        match self {
            Selection::Move(c) => Some(*c),
            Selection::NoMove => None,
        }
    }
}
