use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Position};

use crate::{
    blend::{MaskedPolicy, argmax, combine, mask_policy},
    error::BlendError,
    evaluation::EvaluationStrategy,
    moves::{Candidate, CandidateSource},
    oracle::{EvaluationOracle, SharedOracle},
    policy::PolicyScorer,
    tensor::{encode, legal_move_mask},
    types::Selection,
};

/// Ranked-list length requested by the top-list mover.
pub const DEFAULT_TOP_K: usize = 64;

/// What a mover does when its policy has no mass on any legal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Report [`Selection::NoMove`].
    NoMove,
    /// Ask the oracle for its best move, then take the first legal move.
    OracleThenFirstLegal,
}

/// Parameters of one mover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoverConfig {
    /// Weight of the renormalized policy in the blend.
    pub alpha: f32,
    pub strategy: EvaluationStrategy,
    pub fallback: FallbackPolicy,
    /// Secondary weight carried by the configuration; selection never
    /// reads it.
    #[serde(default)]
    pub beta: Option<f32>,
}

impl MoverConfig {
    /// Full-scan mover with a strong policy weight and no fallback.
    pub fn mover_a() -> Self {
        MoverConfig {
            alpha: 5.0,
            strategy: EvaluationStrategy::FullScan,
            fallback: FallbackPolicy::NoMove,
            beta: Some(0.9),
        }
    }

    /// Top-list mover that always produces a move when the policy is
    /// degenerate.
    pub fn mover_b() -> Self {
        MoverConfig {
            alpha: 3.0,
            strategy: EvaluationStrategy::TopList { k: DEFAULT_TOP_K },
            fallback: FallbackPolicy::OracleThenFirstLegal,
            beta: Some(1.0),
        }
    }
}

/// Blends a policy scorer with an evaluation oracle to pick moves.
pub struct MoveSelector<S> {
    scorer: S,
    oracle: SharedOracle,
    config: MoverConfig,
}

impl<S: PolicyScorer> MoveSelector<S> {
    pub fn new(scorer: S, oracle: SharedOracle, config: MoverConfig) -> Self {
        MoveSelector {
            scorer,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &MoverConfig {
        &self.config
    }

    /// Picks a move for the side to move in `pos`.
    ///
    /// A returned candidate is advisory: callers must confirm it with
    /// [`Candidate::resolve`] before playing it.
    pub fn select_move(&mut self, pos: &Chess) -> Result<Selection, BlendError> {
        let mask = legal_move_mask(pos);
        if mask.count() == 0 {
            return Ok(Selection::NoMove);
        }
        let policy = self.scorer.score(&encode(pos))?;

        let renormalized = match mask_policy(&policy, &mask) {
            MaskedPolicy::Renormalized(p) => p,
            MaskedPolicy::Degenerate => {
                log::warn!("policy has no mass on legal moves");
                return self.fallback(pos);
            }
        };

        let matrix = {
            let mut oracle = self.oracle.lock()?;
            self.config.strategy.evaluate(pos, &mut **oracle)?
        };
        let combined = combine(&renormalized, &matrix, self.config.alpha);
        let Some(index) = argmax(&combined) else {
            return Ok(Selection::NoMove);
        };
        log::debug!(
            "blend picked {}{} with score {}",
            index.from_square(),
            index.to_square(),
            combined[index.get()]
        );
        Ok(Selection::Move(Candidate::from_index(index, CandidateSource::Blend)))
    }

    fn fallback(&mut self, pos: &Chess) -> Result<Selection, BlendError> {
        match self.config.fallback {
            FallbackPolicy::NoMove => Ok(Selection::NoMove),
            FallbackPolicy::OracleThenFirstLegal => {
                let mut oracle = self.oracle.lock()?;
                oracle_then_first_legal(pos, &mut **oracle)
            }
        }
    }
}

fn oracle_then_first_legal(
    pos: &Chess,
    oracle: &mut dyn EvaluationOracle,
) -> Result<Selection, BlendError> {
    let best = oracle
        .best_move(pos)?
        .and_then(|uci| uci.to_move(pos).ok())
        .and_then(|m| Candidate::from_move(&m, CandidateSource::OracleBestMove));
    if let Some(candidate) = best {
        return Ok(Selection::Move(candidate));
    }

    log::warn!("oracle has no usable best move, taking the first legal move");
    Ok(pos
        .legal_moves()
        .first()
        .and_then(|m| Candidate::from_move(m, CandidateSource::FirstLegal))
        .map_or(Selection::NoMove, Selection::Move))
}
