use clap::{Parser, ValueEnum};
use minesweeper_engine::{Action, Difficulty, Game, GameConfig, GameError, Outcome, Position};
use std::io::{self, BufRead, Write};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    Classic,
    Beginner,
    Intermediate,
    Expert,
}

impl From<Preset> for Difficulty {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Classic => Difficulty::Classic,
            Preset::Beginner => Difficulty::Beginner,
            Preset::Intermediate => Difficulty::Intermediate,
            Preset::Expert => Difficulty::Expert,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Play minesweeper in the terminal", long_about = None)]
struct Args {
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board preset, overridden by --width/--height/--mines
    #[arg(short, long, value_enum, default_value_t = Preset::Classic)]
    difficulty: Preset,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    #[arg(long)]
    mines: Option<u32>,

    /// Fixed seed for mine placement
    #[arg(short, long)]
    seed: Option<u64>,
}

impl Args {
    fn config(&self) -> GameConfig {
        let mut config = GameConfig::from(Difficulty::from(self.difficulty));
        config.width = self.width.unwrap_or(config.width);
        config.height = self.height.unwrap_or(config.height);
        config.mines = self.mines.unwrap_or(config.mines);
        config.seed = self.seed;
        config
    }
}

enum Command {
    Play(Position, Action),
    NewGame,
    Quit,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match run_game(args.config()) {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn run_game(config: GameConfig) -> Result<(), GameError> {
    let mut game = Game::with_config(config)?;
    let mut lines = io::stdin().lock().lines();

    loop {
        print!("{}", game.snapshot());
        println!("Mines left: {}", game.remaining_flag_budget());

        match game.outcome() {
            Outcome::Won => println!("Congratulations! You won! (n = new game, q = quit)"),
            Outcome::Lost => println!("Game Over! (n = new game, q = quit)"),
            Outcome::InProgress => {}
        }

        print!("Enter command (x y [r/f/c/m], n, q): ");
        io::stdout().flush().unwrap();

        let Some(Ok(line)) = lines.next() else {
            return Ok(());
        };

        match parse_command(&line) {
            Some(Command::Quit) => return Ok(()),
            Some(Command::NewGame) => game.reset(),
            Some(Command::Play(pos, action)) => {
                if game.cell(pos).is_none() {
                    println!("Position out of bounds");
                    continue;
                }
                if let Err(e) = game.perform_action(pos, action) {
                    println!("Error: {}", e);
                }
            }
            None => println!("Invalid command. Use 'r' reveal, 'f' flag, 'c' chord, 'm' mark"),
        }
    }
}

fn parse_command(input: &str) -> Option<Command> {
    let mut parts = input.split_whitespace();

    let first = parts.next()?;
    match first {
        "q" => return Some(Command::Quit),
        "n" => return Some(Command::NewGame),
        _ => {}
    }

    let x = first.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let action = match parts.next().and_then(|s| s.chars().next()).unwrap_or('r') {
        'r' => Action::Reveal,
        'f' => Action::ToggleFlag,
        'c' => Action::Chord,
        'm' => Action::Mark,
        _ => return None,
    };

    Some(Command::Play(Position::new(x, y), action))
}
