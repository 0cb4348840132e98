use shakmaty::{CastlingMode, Chess, Color, Move, Position, uci::UciMove};

use crate::{error::BlendError, policy::PolicyScorer, selector::MoveSelector, types::Selection, uci::fen_of};

/// One game between a player and the engine.
///
/// The engine's candidate is checked against the legal moves before it
/// touches the board; a rejected candidate leaves the position as it was.
pub struct GameSession<S> {
    position: Chess,
    engine_color: Color,
    selector: MoveSelector<S>,
}

impl<S: PolicyScorer> GameSession<S> {
    pub fn new(selector: MoveSelector<S>, engine_color: Color) -> Self {
        GameSession {
            position: Chess::default(),
            engine_color,
            selector,
        }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> String {
        fen_of(&self.position)
    }

    pub fn engine_color(&self) -> Color {
        self.engine_color
    }

    /// Applies a player's move given in UCI notation.
    pub fn play_user_move(&mut self, uci: &str) -> Result<(), BlendError> {
        let parsed: UciMove = uci.parse()?;
        let m = parsed
            .to_move(&self.position)
            .map_err(|_| BlendError::IllegalMove {
                uci: uci.to_string(),
            })?;
        self.position.play_unchecked(m);
        log::debug!("after player move: {}", self.fen());
        Ok(())
    }

    /// Lets the engine move if the game is running and it is its turn.
    ///
    /// Returns the move played, or `None` when the engine did not move.
    pub fn engine_move(&mut self) -> Result<Option<Move>, BlendError> {
        if self.position.is_game_over() || self.position.turn() != self.engine_color {
            return Ok(None);
        }
        let candidate = match self.selector.select_move(&self.position)? {
            Selection::Move(candidate) => candidate,
            Selection::NoMove => {
                log::warn!("engine produced no move at {}", self.fen());
                return Ok(None);
            }
        };
        let m = candidate.resolve(&self.position)?;
        self.position.play_unchecked(m.clone());
        log::info!(
            "engine played {} ({:?}), now {}",
            m.to_uci(CastlingMode::Standard),
            candidate.source,
            self.fen()
        );
        Ok(Some(m))
    }

    /// Starts a new game. An engine playing White moves at once.
    pub fn reset(&mut self, engine_color: Color) -> Result<Option<Move>, BlendError> {
        self.position = Chess::default();
        self.engine_color = engine_color;
        self.engine_move()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{Evaluation, Score, SharedOracle};
    use crate::selector::MoverConfig;
    use crate::test_support::{FixedPolicy, ScriptedOracle, uci};

    fn session(policy: FixedPolicy, oracle: ScriptedOracle, config: MoverConfig) -> GameSession<FixedPolicy> {
        let selector = MoveSelector::new(policy, SharedOracle::new(oracle), config);
        GameSession::new(selector, Color::Black)
    }

    #[test]
    fn user_then_engine_move() {
        let oracle = ScriptedOracle::with_top(vec![(
            uci("e7e5"),
            Evaluation::new(Score::Centipawns(-20), Color::White),
        )]);
        let mut game = session(FixedPolicy::on(&["e7e5"]), oracle, MoverConfig::mover_b());

        // not the engine's turn yet
        assert_eq!(game.engine_move().unwrap(), None);
        game.play_user_move("e2e4").unwrap();
        let m = game.engine_move().unwrap().unwrap();
        assert_eq!(m.to_uci(CastlingMode::Standard).to_string(), "e7e5");
        assert_eq!(
            game.fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[test]
    fn illegal_user_moves_are_rejected() {
        let mut game = session(FixedPolicy::on(&["e7e5"]), ScriptedOracle::default(), MoverConfig::mover_b());
        assert!(matches!(
            game.play_user_move("e2e5"),
            Err(BlendError::IllegalMove { .. })
        ));
        assert!(matches!(game.play_user_move("zz"), Err(BlendError::InvalidUci(_))));
        assert_eq!(game.fen(), fen_of(&Chess::default()));
    }

    #[test]
    fn illegal_candidate_leaves_board_untouched() {
        // the policy's thin mass rounds away against the sentinel, so
        // the tie goes to a1a1
        let mut probs = vec![0.0; 4096];
        let legal: Vec<_> = {
            let pos = crate::test_support::position(
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
            );
            pos.legal_moves().iter().filter_map(crate::moves::MoveIndex::of_move).collect()
        };
        for idx in &legal {
            probs[idx.get()] = 0.0001;
        }
        probs[4095] = 1.0 - 0.0001 * legal.len() as f32;
        let policy = FixedPolicy(probs);
        let mut game = session(policy, ScriptedOracle::with_top(vec![]), MoverConfig {
            alpha: 0.1,
            ..MoverConfig::mover_b()
        });
        game.play_user_move("e2e4").unwrap();
        let before = game.fen();
        assert!(matches!(
            game.engine_move(),
            Err(BlendError::IllegalSelection { .. })
        ));
        assert_eq!(game.fen(), before);
    }

    #[test]
    fn no_move_from_mover_a_leaves_board_untouched() {
        let selector = MoveSelector::new(
            FixedPolicy::degenerate(),
            SharedOracle::new(ScriptedOracle::default()),
            MoverConfig::mover_a(),
        );
        let mut game = GameSession::new(selector, Color::Black);
        assert_eq!(game.reset(Color::White).unwrap(), None);
        assert_eq!(game.fen(), fen_of(&Chess::default()));
    }

    #[test]
    fn reset_as_white_moves_first() {
        let oracle = ScriptedOracle::with_best(Some(uci("d2d4")));
        let mut game = session(FixedPolicy::degenerate(), oracle, MoverConfig::mover_b());
        game.play_user_move("e2e4").unwrap();
        let m = game.reset(Color::White).unwrap().unwrap();
        assert_eq!(m.to_uci(CastlingMode::Standard).to_string(), "d2d4");
        assert_eq!(game.position().turn(), Color::Black);
        assert_eq!(game.engine_color(), Color::White);
    }
}
