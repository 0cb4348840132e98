use shakmaty::{CastlingMode, Chess, Move, Position, Role, Square, uci::UciMove};

use crate::{error::BlendError, tensor::legal_move_mask};

/// Number of squares on the board.
pub const NUM_SQUARES: usize = 64;

/// Size of the flat move-index space, one slot per (from, to) pair.
pub const MOVE_SPACE: usize = NUM_SQUARES * NUM_SQUARES;

/// Flat index `from * 64 + to` of a move.
///
/// Moves that share their origin and destination squares (the four
/// promotion choices of a pawn push, for instance) collapse onto the
/// same index. [`Candidate::resolve`] reports that case instead of
/// guessing a promotion piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveIndex(usize);

impl MoveIndex {
    pub fn new(from: Square, to: Square) -> Self {
        MoveIndex(encode_move_index(from as usize, to as usize))
    }

    /// Wraps a raw index, returning `None` outside `0..4096`.
    pub fn from_raw(idx: usize) -> Option<Self> {
        (idx < MOVE_SPACE).then_some(MoveIndex(idx))
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn from_square(self) -> Square {
        Square::new((self.0 / NUM_SQUARES) as u32)
    }

    pub fn to_square(self) -> Square {
        Square::new((self.0 % NUM_SQUARES) as u32)
    }

    /// Index of a legal move, using its UCI form in standard castling
    /// notation so that castling is the king's two-square step.
    pub fn of_move(m: &Move) -> Option<Self> {
        Self::of_uci(&m.to_uci(CastlingMode::Standard))
    }

    pub fn of_uci(uci: &UciMove) -> Option<Self> {
        match *uci {
            UciMove::Normal { from, to, .. } => Some(MoveIndex::new(from, to)),
            _ => None,
        }
    }

    /// Whether some legal move of `pos` decodes to this index.
    pub fn is_legal_in(self, pos: &Chess) -> bool {
        legal_move_mask(pos).contains(self.0)
    }
}

pub fn encode_move_index(from: usize, to: usize) -> usize {
    from * NUM_SQUARES + to
}

pub fn decode_move_index(idx: usize) -> (usize, usize) {
    (idx / NUM_SQUARES, idx % NUM_SQUARES)
}

/// How a candidate move was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Argmax of the blended policy and evaluation scores.
    Blend,
    /// The oracle's own best move, used when the policy is degenerate.
    OracleBestMove,
    /// The first legal move in generation order.
    FirstLegal,
}

/// A move proposed by selection. It is advisory until the caller has
/// confirmed it against the position with [`Candidate::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub index: MoveIndex,
    /// Known only when the candidate came from a concrete move.
    pub promotion: Option<Role>,
    pub source: CandidateSource,
}

impl Candidate {
    pub fn from_index(index: MoveIndex, source: CandidateSource) -> Self {
        Candidate {
            index,
            promotion: None,
            source,
        }
    }

    pub fn from_move(m: &Move, source: CandidateSource) -> Option<Self> {
        let index = MoveIndex::of_move(m)?;
        Some(Candidate {
            index,
            promotion: m.promotion(),
            source,
        })
    }

    pub fn to_uci(&self) -> UciMove {
        UciMove::Normal {
            from: self.index.from_square(),
            to: self.index.to_square(),
            promotion: self.promotion,
        }
    }

    /// Every legal move of `pos` this candidate decodes to.
    pub fn matching_moves(&self, pos: &Chess) -> Vec<Move> {
        pos.legal_moves()
            .into_iter()
            .filter(|m| MoveIndex::of_move(m) == Some(self.index))
            .filter(|m| self.promotion.is_none() || m.promotion() == self.promotion)
            .collect()
    }

    /// Confirms the candidate is exactly one legal move of `pos`.
    pub fn resolve(&self, pos: &Chess) -> Result<Move, BlendError> {
        let mut matches = self.matching_moves(pos);
        match matches.len() {
            0 => Err(BlendError::IllegalSelection {
                uci: self.to_uci().to_string(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(BlendError::AmbiguousDecode {
                uci: self.to_uci().to_string(),
                candidates: matches
                    .iter()
                    .map(|m| m.to_uci(CastlingMode::Standard).to_string())
                    .collect(),
            }),
        }
    }
}
