pub mod cancel;
pub mod error;
pub mod game;
pub mod mcts;
pub mod nets;
pub mod players;
pub mod report;
pub mod save;
pub mod selfplay;
pub mod train;

/// dimensional analysis types
pub type Probability = f32;
pub type Utility = f32;
pub type Loss = f32;

// board geometry. the board is a 3x3 grid addressed 0..9 in row-major
// order, and the feature encoding reserves 9 one-hot channels per square.
pub const COLS: usize = 3;
pub const SQUARES: usize = COLS * COLS;
pub const CHANNELS: usize = 9;
pub const FEATURES: usize = SQUARES * CHANNELS;

// game parameters
pub const HAND_SIZE: usize = 5;
pub const DECK_SIZE: usize = 2 * HAND_SIZE;
pub const MAX_ROUNDS: usize = 9;

// network parameters
pub const HIDDEN_SIZE: usize = 64;
pub const POLICY_OUTPUTS: usize = SQUARES;
pub const VALUE_OUTPUTS: usize = 1;
pub const POLICY_EPSILON: f32 = 1e-10;

// search parameters
pub const MCTS_SIMULATIONS: usize = 400;
pub const C_PUCT: f32 = 1.25;
pub const VIRTUAL_LOSS: u32 = 1;

// self-play parameters
pub const SELFPLAY_GAMES: usize = 128;
pub const TEMPERATURE: f32 = 0.0;
pub const EXPLORE_MOVES: usize = 3;

// training parameters
pub const LEARNING_RATE: f32 = 1e-3;
pub const BATCH_SIZE: usize = 32;
pub const EPOCHS: usize = 10;
pub const PATIENCE: usize = 10;
pub const HOLDOUT: f32 = 0.1;
pub const ADAM_BETA1: f32 = 0.9;
pub const ADAM_BETA2: f32 = 0.999;
pub const ADAM_EPSILON: f32 = 1e-8;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_secs(5);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// initialize logging to terminal and a timestamped file
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
