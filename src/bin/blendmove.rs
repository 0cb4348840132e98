use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use blendmove::shakmaty::{CastlingMode, Chess, Color, Position, fen::Fen};
use blendmove::{Config, GameSession, MoveSelector, MoverConfig, PolicyScorer, Selection};
use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mover {
    A,
    B,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Pick a chess move by blending a policy network with a UCI engine", long_about = None)]
struct Args {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mover preset to use
    #[arg(long, value_enum, default_value_t = Mover::A)]
    mover: Mover,

    /// Position to move in (defaults to the start position)
    #[arg(long)]
    fen: Option<String>,

    /// Play a game on stdin instead of picking a single move
    #[arg(long)]
    play: bool,

    /// Engine color when playing: 'w' or 'b'
    #[arg(long, default_value = "w")]
    engine_color: String,
}

fn parse_color(color_str: &str) -> Result<Color, String> {
    match color_str.to_lowercase().as_str() {
        "w" | "white" => Ok(Color::White),
        "b" | "black" => Ok(Color::Black),
        _ => Err("Invalid color: use 'w' or 'b'".to_string()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let mover: MoverConfig = match args.mover {
        Mover::A => config.mover_a,
        Mover::B => config.mover_b,
    };

    let policy = config.load_policy()?;
    let oracle = config.spawn_oracle()?;
    let selector = MoveSelector::new(policy, oracle, mover);

    if args.play {
        let engine_color = parse_color(&args.engine_color)?;
        return play(GameSession::new(selector, engine_color));
    }

    let position: Chess = match &args.fen {
        Some(fen) => fen.parse::<Fen>()?.into_position(CastlingMode::Standard)?,
        None => Chess::default(),
    };
    let mut selector = selector;
    match selector.select_move(&position)? {
        Selection::Move(candidate) => match candidate.resolve(&position) {
            Ok(m) => println!("{}", m.to_uci(CastlingMode::Standard)),
            Err(e) => {
                eprintln!("rejected candidate {}: {e}", candidate.to_uci());
                println!("none");
            }
        },
        Selection::NoMove => println!("none"),
    }
    Ok(())
}

fn play<S: PolicyScorer>(mut game: GameSession<S>) -> Result<(), Box<dyn std::error::Error>> {
    let engine_color = game.engine_color();
    game.reset(engine_color)?;
    println!("{}", game.fen());

    let stdin = io::stdin();
    loop {
        if game.position().is_game_over() {
            println!("game over");
            return Ok(());
        }
        print!("your move: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        let input = line.trim();
        if input == "quit" {
            return Ok(());
        }
        if let Err(e) = game.play_user_move(input) {
            println!("{e}");
            continue;
        }
        match game.engine_move() {
            Ok(Some(m)) => println!("engine: {}", m.to_uci(CastlingMode::Standard)),
            Ok(None) => println!("engine: none"),
            Err(e) => println!("engine failed: {e}"),
        }
        println!("{}", game.fen());
    }
}
