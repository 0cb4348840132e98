//! Chess move selection blending a learned policy with an external
//! engine's evaluations.
//!
//!
//! A position is encoded as an `8x8x12` piece-placement tensor and
//! scored by a [`PolicyScorer`] over the 4096 `(from, to)` move indices.
//! The policy is masked to the legal moves and renormalized, then added,
//! weighted by `alpha`, to an [`EvaluationMatrix`] built from a UCI
//! engine by one of two [`EvaluationStrategy`] variants. The argmax of
//! the combined scores is the candidate move.
//!
//! Two mover presets are provided by [`MoverConfig`]: mover A scans
//! every legal move with the engine and produces no move when the policy
//! is degenerate; mover B asks the engine for a ranked list once and
//! falls back to the engine's best move, then to the first legal move.
//!
//! Every candidate is advisory. Use [`Candidate::resolve`] to confirm it
//! against the legal moves before playing it.
//!
//! The library re‑exports `shakmaty` to make position construction easy.

mod blend;
mod config;
mod error;
mod evaluation;
mod moves;
mod oracle;
mod policy;
mod selector;
mod session;
mod tensor;
mod types;
mod uci;

#[cfg(test)]
mod test_support;

/// Move selection and its presets.
pub use selector::{DEFAULT_TOP_K, FallbackPolicy, MoveSelector, MoverConfig};

/// Error type produced by library operations.
pub use error::BlendError;

/// Position and move encoding.
pub use moves::{
    Candidate, CandidateSource, MOVE_SPACE, MoveIndex, decode_move_index, encode_move_index,
};
pub use tensor::{encode, legal_move_mask};

/// Policy scoring.
pub use policy::{Backend, OnnxPolicy, PolicyScorer};

/// Engine evaluations.
pub use evaluation::{EvaluationMatrix, EvaluationStrategy, SENTINEL};
pub use oracle::{
    Evaluation, EvaluationOracle, MATE_WEIGHT, RankedMove, Score, SharedOracle,
};
pub use uci::{UciOracle, fen_of};

/// Blending steps, usable on their own.
pub use blend::{MaskedPolicy, argmax, combine, mask_policy};

/// Data structures passed between the stages.
pub use types::{EncodedPosition, LegalMoveMask, PolicyDistribution, Selection};

pub use config::{Config, ModelConfig, OracleConfig};
pub use session::GameSession;

/// Re-export of `shakmaty` for convenience when building positions.
pub use shakmaty;
