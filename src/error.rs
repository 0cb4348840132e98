//! Error types for the blended move selector.
//!
//! `thiserror` gives the caller a single enumeration covering the
//! failure kinds of selection: the learned policy and the external
//! engine are both untrusted, so their failures are reported rather
//! than papered over, and a selected move that does not survive the
//! caller's legality check is an error in its own right.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlendError {
    /// The policy scorer failed or produced a malformed distribution.
    #[error("Policy unavailable: {0}")]
    PolicyUnavailable(String),

    /// The evaluation oracle could not be reached or answered badly.
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// The decoded candidate is not a legal move in the position.
    #[error("Illegal selection: {uci} is not a legal move")]
    IllegalSelection { uci: String },

    /// A move submitted by a player is not legal in the position.
    #[error("Illegal move: {uci}")]
    IllegalMove { uci: String },

    /// The candidate maps onto several legal moves that differ only by
    /// promotion piece.
    #[error("Ambiguous selection: {uci} matches {candidates:?}")]
    AmbiguousDecode { uci: String, candidates: Vec<String> },

    /// The provided FEN string could not be parsed.
    #[error("Invalid FEN: {0}")]
    InvalidFen(#[from] shakmaty::fen::ParseFenError),

    /// A parsed position is invalid from the perspective of `shakmaty`.
    #[error("Invalid Chess Position: {0}")]
    InvalidPosition(#[from] shakmaty::PositionError<shakmaty::Chess>),

    /// A move string could not be parsed as UCI.
    #[error("Invalid UCI move: {0}")]
    InvalidUci(#[from] shakmaty::uci::ParseUciMoveError),

    /// Wraps an error returned by the underlying ONNX Runtime bindings.
    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    /// The configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<std::io::Error> for BlendError {
    fn from(err: std::io::Error) -> Self {
        BlendError::OracleUnavailable(err.to_string())
    }
}
