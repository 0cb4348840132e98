use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use shakmaty::{Chess, EnPassantMode, Position, fen::Fen, uci::UciMove};

use crate::{
    error::BlendError,
    oracle::{Evaluation, EvaluationOracle, RankedMove, Score},
};

/// FEN of `pos` as sent to the engine.
pub fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// One parsed `info` line carrying a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoLine {
    pub multipv: usize,
    pub score: Score,
    pub first_move: Option<UciMove>,
}

/// Parses an `info ... score cp|mate N ... pv m1 m2` line.
///
/// Lines without a score, and bound-only scores (`lowerbound`,
/// `upperbound`), yield `None`.
pub fn parse_info(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }
    let mut multipv = 1;
    let mut score = None;
    let mut first_move = None;
    while let Some(tok) = tokens.next() {
        match tok {
            "multipv" => multipv = tokens.next()?.parse().ok()?,
            "score" => {
                let kind = tokens.next()?;
                let value: i32 = tokens.next()?.parse().ok()?;
                score = Some(match kind {
                    "cp" => Score::Centipawns(value),
                    "mate" => Score::Mate(value),
                    _ => return None,
                });
            }
            "lowerbound" | "upperbound" => return None,
            "pv" => {
                first_move = tokens.next().and_then(|m| m.parse().ok());
                break;
            }
            // free text runs to the end of the line
            "string" => break,
            _ => {}
        }
    }
    Some(InfoLine {
        multipv,
        score: score?,
        first_move,
    })
}

/// Parses a `bestmove` line. The outer `Option` is `None` for any other
/// line; the inner one is `None` when the engine has no move.
pub fn parse_bestmove(line: &str) -> Option<Option<UciMove>> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return None;
    }
    Some(match tokens.next() {
        Some("(none)") | Some("0000") | None => None,
        Some(m) => m.parse().ok(),
    })
}

/// Result of one `go` command.
#[derive(Debug, Default)]
struct SearchOutput {
    lines: BTreeMap<usize, InfoLine>,
    best_move: Option<UciMove>,
}

/// An external UCI engine run as a child process.
pub struct UciOracle {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    depth: u32,
    multipv: usize,
}

impl UciOracle {
    /// Starts the engine at `path`, completes the `uci` handshake and
    /// applies `options` with `setoption`.
    pub fn spawn(path: &str, depth: u32, options: &[(String, String)]) -> Result<Self, BlendError> {
        Self::from_command(Command::new(path), depth, options)
    }

    /// Like [`UciOracle::spawn`], for engines that need arguments or a
    /// custom environment.
    pub fn from_command(
        mut command: Command,
        depth: u32,
        options: &[(String, String)],
    ) -> Result<Self, BlendError> {
        let program = command.get_program().to_string_lossy().into_owned();
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| BlendError::OracleUnavailable(format!("failed to start {program}: {e}")))?;
        let stdin = child.stdin.take().ok_or_else(|| {
            BlendError::OracleUnavailable("engine stdin unavailable".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            BlendError::OracleUnavailable("engine stdout unavailable".to_string())
        })?;

        let mut oracle = UciOracle {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            depth,
            multipv: 1,
        };
        oracle.send("uci")?;
        oracle.read_until(|line| line == "uciok")?;
        for (name, value) in options {
            oracle.send(&format!("setoption name {name} value {value}"))?;
        }
        oracle.sync()?;
        log::debug!("uci engine {program} ready at depth {depth}");
        Ok(oracle)
    }

    fn send(&mut self, cmd: &str) -> Result<(), BlendError> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, BlendError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(BlendError::OracleUnavailable(
                "engine closed its output".to_string(),
            ));
        }
        Ok(line.trim().to_string())
    }

    /// Reads lines until `done` accepts one, returning that line.
    fn read_until(&mut self, done: impl Fn(&str) -> bool) -> Result<String, BlendError> {
        loop {
            let line = self.read_line()?;
            if done(&line) {
                return Ok(line);
            }
        }
    }

    fn sync(&mut self) -> Result<(), BlendError> {
        self.send("isready")?;
        self.read_until(|line| line == "readyok")?;
        Ok(())
    }

    fn set_multipv(&mut self, k: usize) -> Result<(), BlendError> {
        if self.multipv != k {
            self.send(&format!("setoption name MultiPV value {k}"))?;
            self.multipv = k;
        }
        Ok(())
    }

    fn search(&mut self, pos: &Chess, multipv: usize) -> Result<SearchOutput, BlendError> {
        self.set_multipv(multipv.max(1))?;
        self.send(&format!("position fen {}", fen_of(pos)))?;
        self.sync()?;
        self.send(&format!("go depth {}", self.depth))?;

        let mut output = SearchOutput::default();
        loop {
            let line = self.read_line()?;
            if let Some(best) = parse_bestmove(&line) {
                output.best_move = best;
                return Ok(output);
            }
            if let Some(info) = parse_info(&line) {
                output.lines.insert(info.multipv, info);
            }
        }
    }
}

impl EvaluationOracle for UciOracle {
    fn evaluate(&mut self, pos: &Chess) -> Result<Evaluation, BlendError> {
        let output = self.search(pos, 1)?;
        let info = output.lines.get(&1).ok_or_else(|| {
            BlendError::OracleUnavailable("engine reported no score".to_string())
        })?;
        Ok(Evaluation::new(info.score, pos.turn()))
    }

    fn top_moves(&mut self, pos: &Chess, k: usize) -> Result<Vec<RankedMove>, BlendError> {
        let output = self.search(pos, k)?;
        Ok(output
            .lines
            .into_values()
            .take(k)
            .filter_map(|info| {
                Some(RankedMove {
                    uci: info.first_move?,
                    evaluation: Evaluation::new(info.score, pos.turn()),
                })
            })
            .collect())
    }

    fn best_move(&mut self, pos: &Chess) -> Result<Option<UciMove>, BlendError> {
        Ok(self.search(pos, 1)?.best_move)
    }
}

impl Drop for UciOracle {
    fn drop(&mut self) {
        let _ = self.send("quit");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{CastlingMode, Color};

    #[test]
    fn parses_centipawn_info() {
        let info = parse_info(
            "info depth 15 seldepth 20 multipv 2 score cp -35 nodes 1200 nps 400000 pv d2d4 d7d5",
        )
        .unwrap();
        assert_eq!(info.multipv, 2);
        assert_eq!(info.score, Score::Centipawns(-35));
        assert_eq!(info.first_move, Some("d2d4".parse().unwrap()));
    }

    #[test]
    fn parses_mate_info_without_multipv() {
        let info = parse_info("info depth 3 score mate -2 pv h7h8q").unwrap();
        assert_eq!(info.multipv, 1);
        assert_eq!(info.score, Score::Mate(-2));
        assert_eq!(info.first_move, Some("h7h8q".parse().unwrap()));
    }

    #[test]
    fn ignores_bounds_and_scoreless_lines() {
        assert!(parse_info("info depth 12 score cp 20 lowerbound pv e2e4").is_none());
        assert!(parse_info("info depth 1 currmove e2e4 currmovenumber 1").is_none());
        assert!(parse_info("info string NNUE evaluation enabled").is_none());
        assert!(parse_info("readyok").is_none());
    }

    #[test]
    fn parses_terminal_position_score() {
        let info = parse_info("info depth 0 score mate 0").unwrap();
        assert_eq!(info.score, Score::Mate(0));
        assert_eq!(info.first_move, None);
    }

    #[test]
    fn parses_bestmove() {
        assert_eq!(
            parse_bestmove("bestmove e2e4 ponder e7e5"),
            Some(Some("e2e4".parse().unwrap()))
        );
        assert_eq!(parse_bestmove("bestmove (none)"), Some(None));
        assert_eq!(parse_bestmove("info depth 1"), None);
    }

    #[test]
    fn fen_round_trips_start_position() {
        assert_eq!(
            fen_of(&Chess::default()),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
    }

    #[test]
    fn missing_engine_is_oracle_unavailable() {
        assert!(matches!(
            UciOracle::spawn("/nonexistent/engine-binary", 1, &[]),
            Err(BlendError::OracleUnavailable(_))
        ));
    }

    /// Runs a shell-scripted engine that answers the handshake and
    /// replies to every `go` with `on_go`.
    #[cfg(unix)]
    fn scripted_engine(on_go: &str) -> Result<UciOracle, BlendError> {
        let script = format!(
            r#"while read -r cmd; do
  case "$cmd" in
    uci) echo "id name scripted"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) {on_go} ;;
    quit) exit 0 ;;
  esac
done"#
        );
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        UciOracle::from_command(command, 10, &[("Threads".to_string(), "1".to_string())])
    }

    #[cfg(unix)]
    #[test]
    fn multipv_lines_are_ranked_by_index() {
        let mut engine = scripted_engine(
            r#"echo "info depth 10 multipv 1 score cp 30 pv e2e4 e7e5"
       echo "info depth 10 multipv 2 score cp 25 pv d2d4 d7d5"
       echo "info depth 11 multipv 1 score cp 12 upperbound pv e2e4"
       echo "bestmove e2e4 ponder e7e5""#,
        )
        .unwrap();
        let top = engine.top_moves(&Chess::default(), 2).unwrap();
        let listed: Vec<(String, Score)> = top
            .iter()
            .map(|r| (r.uci.to_string(), r.evaluation.score))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("e2e4".to_string(), Score::Centipawns(30)),
                ("d2d4".to_string(), Score::Centipawns(25)),
            ]
        );
        assert_eq!(top[0].evaluation.pov, Color::White);
    }

    #[cfg(unix)]
    #[test]
    fn evaluation_is_reported_for_the_side_to_move() {
        let mut engine =
            scripted_engine(r#"echo "info depth 10 score mate 2 pv e2e4"; echo "bestmove e2e4""#)
                .unwrap();
        let pos: Chess = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
            .parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap();
        assert_eq!(
            engine.evaluate(&pos).unwrap(),
            Evaluation::new(Score::Mate(2), Color::Black)
        );
    }

    #[cfg(unix)]
    #[test]
    fn search_without_score_is_oracle_unavailable() {
        let mut engine = scripted_engine(
            r#"echo "info depth 1 currmove e2e4 currmovenumber 1"; echo "bestmove e2e4""#,
        )
        .unwrap();
        assert!(matches!(
            engine.evaluate(&Chess::default()),
            Err(BlendError::OracleUnavailable(msg)) if msg.contains("no score")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn engine_without_move_has_no_best_move() {
        let mut engine =
            scripted_engine(r#"echo "info depth 0 score mate 0"; echo "bestmove (none)""#).unwrap();
        assert_eq!(engine.best_move(&Chess::default()).unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn engine_exit_mid_search_is_oracle_unavailable() {
        let mut engine = scripted_engine("exit 0").unwrap();
        assert!(matches!(
            engine.best_move(&Chess::default()),
            Err(BlendError::OracleUnavailable(msg)) if msg.contains("closed")
        ));
    }
}
