use blendmove::shakmaty::{CastlingMode, Chess, fen::Fen};
use blendmove::{Backend, MoveSelector, MoverConfig, OnnxPolicy, Selection, SharedOracle, UciOracle};
use std::path::Path;

const MODEL_PATH: &str = "policy.onnx";
const ENGINE: &str = "stockfish";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // 1. Check the model
    if !Path::new(MODEL_PATH).exists() {
        println!("Model not found at '{}'.", MODEL_PATH);
        println!("Export the 8x8x12 policy network to ONNX and place it there.");
        return Ok(());
    }

    // 2. Initialize the policy and one engine shared by both movers
    println!("Initializing policy session...");
    Backend::Tract.install();
    let oracle = SharedOracle::new(UciOracle::spawn(ENGINE, 12, &[])?);

    // 3. Define the position (1. e4 e5)
    let fen = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
    let position: Chess = fen.parse::<Fen>()?.into_position(CastlingMode::Standard)?;

    // 4. Run both movers
    for (name, config) in [("A", MoverConfig::mover_a()), ("B", MoverConfig::mover_b())] {
        let policy = OnnxPolicy::from_file(MODEL_PATH)?;
        let mut selector = MoveSelector::new(policy, oracle.clone(), config);

        match selector.select_move(&position)? {
            Selection::Move(candidate) => match candidate.resolve(&position) {
                Ok(m) => println!(
                    "Mover {}: {} ({:?})",
                    name,
                    m.to_uci(CastlingMode::Standard),
                    candidate.source
                ),
                Err(e) => println!("Mover {}: rejected {} ({})", name, candidate.to_uci(), e),
            },
            Selection::NoMove => println!("Mover {}: no move", name),
        }
    }

    Ok(())
}
