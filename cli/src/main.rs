//! # gridmerge CLI
//!
//! Terminal host for the merge-puzzle engine: interactive play with undo,
//! JSON-file persistence, a local leaderboard, and headless simulations
//! with configurable policies.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use gridmerge_core::{
    CellRef, Direction, Grid, Leaderboard, PersistenceStore, Renderer, SaveData, Session,
};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "gridmerge")]
#[command(author, version, about = "Play the merge puzzle in the terminal or run simulations")]
struct Args {
    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Random seed for deterministic runs
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Maximum steps per episode (0 = unlimited)
    #[arg(short, long, default_value = "10000")]
    max_steps: u32,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "random")]
    policy: Policy,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,

    /// Directory holding the save file and the leaderboard
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Ignore any saved session and start fresh
    #[arg(long)]
    fresh: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Policy {
    /// Random legal moves
    Random,
    /// Cycle through directions: Left, Down, Right, Up
    Cycle,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Some(episodes) = args.episodes {
        run_headless(&args, episodes);
    } else {
        run_interactive(&args);
    }
}

// =============================================================================
// Persistence
// =============================================================================

/// On-disk layout of the save file: latest snapshot plus the best score,
/// stored under separate keys so the best score survives snapshot resets.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    snapshot: Option<SaveData>,
    best_score: u32,
}

/// JSON-file store. I/O and parse failures are logged and treated as an
/// empty store; they never reach the engine.
struct JsonStore {
    path: PathBuf,
    data: StoreFile,
}

impl JsonStore {
    fn open(path: PathBuf) -> JsonStore {
        let data = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                warn!("ignoring malformed save file {}: {err}", path.display());
                StoreFile::default()
            }),
            Err(_) => StoreFile::default(),
        };
        JsonStore { path, data }
    }

    fn flush(&self) {
        match serde_json::to_string_pretty(&self.data) {
            Ok(text) => {
                if let Err(err) = fs::write(&self.path, text) {
                    warn!("failed to write save file {}: {err}", self.path.display());
                }
            }
            Err(err) => warn!("failed to serialize save data: {err}"),
        }
    }
}

impl PersistenceStore for JsonStore {
    fn save(&mut self, data: &SaveData) {
        self.data.snapshot = Some(*data);
        self.flush();
    }

    fn load(&self) -> Option<SaveData> {
        self.data.snapshot.filter(|data| data.validate().is_ok())
    }

    fn best_score(&self) -> u32 {
        self.data.best_score
    }

    fn record_best(&mut self, score: u32) {
        if score > self.data.best_score {
            self.data.best_score = score;
            self.flush();
        }
    }
}

fn load_leaderboard(path: &Path) -> Leaderboard {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
            warn!("ignoring malformed leaderboard {}: {err}", path.display());
            Leaderboard::new()
        }),
        Err(_) => Leaderboard::new(),
    }
}

fn save_leaderboard(path: &Path, board: &Leaderboard) {
    match serde_json::to_string_pretty(board) {
        Ok(text) => {
            if let Err(err) = fs::write(path, text) {
                warn!("failed to write leaderboard {}: {err}", path.display());
            }
        }
        Err(err) => warn!("failed to serialize leaderboard: {err}"),
    }
}

/// Civil date (YYYY-MM-DD, UTC) from the system clock, for leaderboard
/// entries.
fn today() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut days = secs / 86_400;
    let mut year = 1970u64;
    loop {
        let year_days = if is_leap(year) { 366 } else { 365 };
        if days < year_days {
            break;
        }
        days -= year_days;
        year += 1;
    }

    let month_days = [
        31,
        if is_leap(year) { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut month = 0;
    while days >= month_days[month] {
        days -= month_days[month];
        month += 1;
    }

    format!("{year:04}-{:02}-{:02}", month + 1, days + 1)
}

fn is_leap(year: u64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

// =============================================================================
// Rendering
// =============================================================================

/// ANSI board renderer: spawned tiles green, merged tiles yellow.
struct AnsiRenderer;

impl AnsiRenderer {
    fn draw(&self, grid: &Grid, new_tiles: &[CellRef], merged_tiles: &[CellRef]) {
        println!("+------+------+------+------+");
        for row in 0..4 {
            print!("|");
            for col in 0..4 {
                let cell = CellRef { row, col };
                let value = grid.get(cell);
                let text = if value == 0 {
                    "      ".to_string()
                } else {
                    format!("{value:^6}")
                };
                if merged_tiles.contains(&cell) {
                    print!("\x1b[33m{text}\x1b[0m|");
                } else if new_tiles.contains(&cell) {
                    print!("\x1b[32m{text}\x1b[0m|");
                } else {
                    print!("{text}|");
                }
            }
            println!();
            println!("+------+------+------+------+");
        }
        io::stdout().flush().ok();
    }
}

impl Renderer for AnsiRenderer {
    fn on_move_applied(&mut self, grid: &Grid, new_tiles: &[CellRef], merged_tiles: &[CellRef]) {
        self.draw(grid, new_tiles, merged_tiles);
    }
}

// =============================================================================
// Interactive mode
// =============================================================================

fn print_header(session: &Session, store: &JsonStore) {
    println!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== gridmerge ===");
    println!("Controls: WASD or Arrow Keys | U to undo | R to restart | Q to quit\n");
    println!("Score: {}   Best: {}\n", session.score(), store.best_score());
}

/// Run interactive mode where the user plays with the keyboard.
fn run_interactive(args: &Args) {
    enable_raw_mode();

    let mut store = JsonStore::open(args.data_dir.join("gridmerge-save.json"));
    let leaderboard_path = args.data_dir.join("gridmerge-leaderboard.json");
    let mut leaderboard = load_leaderboard(&leaderboard_path);

    let mut session = if args.fresh {
        Session::new(args.seed)
    } else {
        store
            .load()
            .and_then(|data| Session::restore(&data, args.seed).ok())
            .unwrap_or_else(|| Session::new(args.seed))
    };
    let mut renderer = AnsiRenderer;

    print_header(&session, &store);
    renderer.draw(session.grid(), &[], &[]);

    let mut stdin = io::stdin();
    let mut buffer = [0u8; 3];

    loop {
        let bytes_read = stdin.read(&mut buffer).unwrap_or(0);
        if bytes_read == 0 {
            continue;
        }

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(direction) => {
                let outcome = session.step(direction);
                if !outcome.changed {
                    continue;
                }

                store.save(&session.save_data());
                store.record_best(session.score());

                print_header(&session, &store);
                renderer.on_move_applied(session.grid(), &outcome.spawned, &outcome.merged);
                if outcome.score_delta > 0 {
                    println!("  +{} points!", outcome.score_delta);
                }

                if session.is_terminal() {
                    handle_game_over(&session, &mut leaderboard, &leaderboard_path);
                }
            }
            InputAction::Undo => {
                if session.undo() {
                    store.save(&session.save_data());
                    print_header(&session, &store);
                    renderer.draw(session.grid(), &[], &[]);
                } else {
                    println!("  Nothing to undo");
                }
            }
            InputAction::Restart => {
                session.restart(args.seed);
                store.save(&session.save_data());
                print_header(&session, &store);
                renderer.draw(session.grid(), &[], &[]);
            }
            InputAction::Quit => {
                disable_raw_mode();
                println!("\nGoodbye!");
                break;
            }
            InputAction::None => {}
        }
    }
}

fn handle_game_over(session: &Session, leaderboard: &mut Leaderboard, path: &Path) {
    println!("\n  *** GAME OVER ***");
    println!("  Final Score: {}", session.score());
    println!("  Max Tile: {}", session.grid().max_tile());

    if leaderboard.qualifies(session.score()) {
        disable_raw_mode();
        print!("\n  Name for the leaderboard (blank = Anonymous): ");
        io::stdout().flush().ok();
        let mut name = String::new();
        io::stdin().read_line(&mut name).ok();
        leaderboard.record(name.trim(), session.score(), &today());
        save_leaderboard(path, leaderboard);

        println!("\n  === Leaderboard ===");
        for (rank, entry) in leaderboard.entries().iter().enumerate() {
            println!("  {:2}. {:<16} {:>8}  {}", rank + 1, entry.name, entry.score, entry.date);
        }
        enable_raw_mode();
    }

    println!("\n  Press U to undo, R to restart or Q to quit");
}

// =============================================================================
// Headless mode
// =============================================================================

/// Run headless simulation mode.
fn run_headless(args: &Args, episodes: u32) {
    if episodes == 0 {
        println!("episodes=0");
        return;
    }

    let mut total_score: u64 = 0;
    let mut max_tile_overall: u32 = 0;
    let mut scores: Vec<u32> = Vec::with_capacity(episodes as usize);
    let mut max_tiles: Vec<u32> = Vec::with_capacity(episodes as usize);

    // Separate RNG for action selection
    let mut action_rng = SimpleRng::new(args.seed.wrapping_add(1000));

    for episode in 0..episodes {
        let episode_seed = args.seed.wrapping_add(u64::from(episode));
        let mut session = Session::new(episode_seed);
        let mut steps = 0;
        let mut action_cycle = 0;

        while !session.is_terminal() && (args.max_steps == 0 || steps < args.max_steps) {
            let direction = match args.policy {
                Policy::Random => select_random_direction(&session, &mut action_rng),
                Policy::Cycle => select_cycle_direction(&session, &mut action_cycle),
            };

            let Some(direction) = direction else {
                break;
            };
            session.step(direction);
            steps += 1;

            if args.verbose {
                println!("Episode {} Step {}: {:?}", episode + 1, steps, direction);
                print!("{}", session.grid());
            }
        }

        let score = session.score();
        let max_tile = session.grid().max_tile();

        scores.push(score);
        max_tiles.push(max_tile);
        total_score += u64::from(score);
        max_tile_overall = max_tile_overall.max(max_tile);

        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                score,
                max_tile,
                steps
            );
        }
    }

    // Compute statistics
    let avg_score = total_score as f64 / f64::from(episodes);
    scores.sort();
    let median_score = if episodes % 2 == 0 {
        (scores[(episodes / 2 - 1) as usize] + scores[(episodes / 2) as usize]) as f64 / 2.0
    } else {
        scores[(episodes / 2) as usize] as f64
    };

    let mut tile_counts = HashMap::new();
    for tile in &max_tiles {
        *tile_counts.entry(*tile).or_insert(0u32) += 1;
    }

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", episodes);
    println!("policy={:?}", args.policy);
    println!("seed={}", args.seed);
    println!("max_steps={}", args.max_steps);
    println!("avg_score={:.2}", avg_score);
    println!("median_score={:.2}", median_score);
    println!("min_score={}", scores.first().unwrap_or(&0));
    println!("max_score={}", scores.last().unwrap_or(&0));
    println!("max_tile_overall={}", max_tile_overall);

    let mut tile_list: Vec<_> = tile_counts.iter().collect();
    tile_list.sort_by_key(|&(tile, _)| *tile);
    print!("tile_distribution=");
    for (i, (tile, count)) in tile_list.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        print!("{}:{}", tile, count);
    }
    println!();
}

/// Select a random legal direction.
fn select_random_direction(session: &Session, rng: &mut SimpleRng) -> Option<Direction> {
    let legal = session.legal_moves();
    let candidates: Vec<Direction> = Direction::all()
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| legal[i])
        .map(|(_, d)| d)
        .collect();

    if candidates.is_empty() {
        None
    } else {
        let idx = (rng.next() as usize) % candidates.len();
        Some(candidates[idx])
    }
}

/// Select a direction in a fixed cycle: Left, Down, Right, Up.
fn select_cycle_direction(session: &Session, cycle: &mut usize) -> Option<Direction> {
    let order = [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Up,
    ];
    let legal = session.legal_moves();

    for _ in 0..4 {
        let direction = order[*cycle % 4];
        *cycle += 1;
        let legal_idx = Direction::all()
            .iter()
            .position(|&d| d == direction)
            .unwrap_or(0);
        if legal[legal_idx] {
            return Some(direction);
        }
    }

    None
}

/// Simple xorshift RNG for action selection.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

// =============================================================================
// Input handling
// =============================================================================

enum InputAction {
    Move(Direction),
    Undo,
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        // Control keys
        [b'u'] | [b'U'] => InputAction::Undo,
        [b'r'] | [b'R'] => InputAction::Restart,
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc

        _ => InputAction::None,
    }
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        libc::tcgetattr(fd, &mut termios);
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn enable_raw_mode() {
    // On non-Unix systems, interactive mode requires Enter after each key
}

#[cfg(not(unix))]
fn disable_raw_mode() {}
