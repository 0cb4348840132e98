use ndarray::Array3;
use shakmaty::{Board, Chess, Position, Role, Square};

use crate::{
    moves::MoveIndex,
    types::{EncodedPosition, LegalMoveMask},
};

/// Number of piece channels: six roles for each color.
pub const NUM_CHANNELS: usize = 12;

/// Encode the piece placement of `pos` as an `[8, 8, 12]` tensor.
///
/// White pieces occupy channels 0..5 and black pieces 6..11, each in the
/// order pawn, knight, bishop, rook, queen, king. Row is the rank and
/// column the file, so square `s` lands at `(s / 8, s % 8)`.
///
/// Only placement is encoded: side to move, castling rights and the en
/// passant square are absent, so positions differing only in those
/// encode identically. Trained scorers depend on this exact shape.
pub fn encode(pos: &Chess) -> EncodedPosition {
    encode_board(pos.board())
}

pub fn encode_board(board: &Board) -> EncodedPosition {
    let mut tensor = Array3::<f32>::zeros((8, 8, NUM_CHANNELS));
    for sq in Square::ALL {
        if let Some(piece) = board.piece_at(sq) {
            let color_offset = if piece.color.is_white() { 0 } else { 6 };
            let channel = color_offset + role_offset(piece.role);
            tensor[[sq.rank() as usize, sq.file() as usize, channel]] = 1.0;
        }
    }
    tensor
}

fn role_offset(role: Role) -> usize {
    match role {
        Role::Pawn => 0,
        Role::Knight => 1,
        Role::Bishop => 2,
        Role::Rook => 3,
        Role::Queen => 4,
        Role::King => 5,
    }
}

/// Union of the one-hot (from, to) slots of every legal move.
pub fn legal_move_mask(pos: &Chess) -> LegalMoveMask {
    let mut mask = LegalMoveMask::empty();
    for m in &pos.legal_moves() {
        if let Some(idx) = MoveIndex::of_move(m) {
            mask.set(idx.get());
        }
    }
    mask
}
