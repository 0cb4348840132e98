use shakmaty::{CastlingMode, Chess, Color, Position, fen::Fen, uci::UciMove};

use crate::{
    error::BlendError,
    moves::{MOVE_SPACE, MoveIndex},
    oracle::{Evaluation, EvaluationOracle, RankedMove, Score},
    policy::PolicyScorer,
    types::{EncodedPosition, PolicyDistribution},
};

pub fn position(fen: &str) -> Chess {
    fen.parse::<Fen>()
        .unwrap()
        .into_position(CastlingMode::Standard)
        .unwrap()
}

pub fn uci(s: &str) -> UciMove {
    s.parse().unwrap()
}

pub fn index(s: &str) -> MoveIndex {
    MoveIndex::of_uci(&uci(s)).unwrap()
}

/// Oracle answering from a script and counting every query.
#[derive(Default)]
pub struct ScriptedOracle {
    pub constant: Option<Score>,
    pub top: Vec<(UciMove, Evaluation)>,
    pub best: Option<UciMove>,
    pub fail: bool,
    pub evaluate_calls: usize,
    pub top_calls: usize,
    pub best_calls: usize,
    pub seen_turns: Vec<Color>,
}

impl ScriptedOracle {
    pub fn constant(score: Score) -> Self {
        ScriptedOracle {
            constant: Some(score),
            ..Default::default()
        }
    }

    pub fn with_top(top: Vec<(UciMove, Evaluation)>) -> Self {
        ScriptedOracle {
            top,
            ..Default::default()
        }
    }

    pub fn with_best(best: Option<UciMove>) -> Self {
        ScriptedOracle {
            best,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        ScriptedOracle {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), BlendError> {
        if self.fail {
            return Err(BlendError::OracleUnavailable("scripted failure".to_string()));
        }
        Ok(())
    }
}

impl EvaluationOracle for ScriptedOracle {
    fn evaluate(&mut self, pos: &Chess) -> Result<Evaluation, BlendError> {
        self.evaluate_calls += 1;
        self.seen_turns.push(pos.turn());
        self.check()?;
        let score = self.constant.unwrap_or(Score::Centipawns(0));
        Ok(Evaluation::new(score, pos.turn()))
    }

    fn top_moves(&mut self, _pos: &Chess, k: usize) -> Result<Vec<RankedMove>, BlendError> {
        self.top_calls += 1;
        self.check()?;
        Ok(self
            .top
            .iter()
            .take(k)
            .map(|(uci, evaluation)| RankedMove {
                uci: uci.clone(),
                evaluation: *evaluation,
            })
            .collect())
    }

    fn best_move(&mut self, _pos: &Chess) -> Result<Option<UciMove>, BlendError> {
        self.best_calls += 1;
        self.check()?;
        Ok(self.best.clone())
    }
}

/// Scorer returning the same distribution for every position.
pub struct FixedPolicy(pub Vec<f32>);

impl FixedPolicy {
    /// All mass on the given moves, split evenly.
    pub fn on(moves: &[&str]) -> Self {
        let mut probs = vec![0.0; MOVE_SPACE];
        for m in moves {
            probs[index(m).get()] = 1.0 / moves.len() as f32;
        }
        FixedPolicy(probs)
    }

    /// All mass on slot 0 (a1a1), which no legal move decodes to.
    pub fn degenerate() -> Self {
        let mut probs = vec![0.0; MOVE_SPACE];
        probs[0] = 1.0;
        FixedPolicy(probs)
    }
}

impl PolicyScorer for FixedPolicy {
    fn score(&mut self, _encoded: &EncodedPosition) -> Result<PolicyDistribution, BlendError> {
        PolicyDistribution::new(self.0.clone())
    }
}

/// Scorer that always fails.
pub struct BrokenPolicy;

impl PolicyScorer for BrokenPolicy {
    fn score(&mut self, _encoded: &EncodedPosition) -> Result<PolicyDistribution, BlendError> {
        Err(BlendError::PolicyUnavailable("model not loaded".to_string()))
    }
}
