use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rpszero::cancel::Cancel;
use rpszero::error::Error;
use rpszero::nets::evaluator::NetEvaluator;
use rpszero::nets::policy::PolicyNet;
use rpszero::nets::value::ValueNet;
use rpszero::report::Event;
use rpszero::report::LogSink;
use rpszero::report::Sink;
use rpszero::save::checkpoint::Checkpoint;
use rpszero::save::disk::Disk;
use rpszero::selfplay::generator::Generator;
use rpszero::train::trainer::Schedule;
use rpszero::train::trainer::Trainer;
use std::path::PathBuf;
use std::time::Duration;

/// the outer loop the core leaves to its collaborators: self-play with
/// the current networks, fit the networks on the fresh pool, write a
/// checkpoint, repeat. ctrl-c or the deadline trips the cancellation
/// token; in-flight work finishes and a final checkpoint lands before
/// exit.
#[derive(Parser, Debug)]
#[command(about = "self-play training for the RPS card game")]
struct Args {
    /// outer self-play + training iterations
    #[arg(long, default_value_t = 10)]
    iterations: usize,
    /// games per iteration
    #[arg(long, default_value_t = rpszero::SELFPLAY_GAMES)]
    games: usize,
    /// MCTS simulations per move
    #[arg(long, default_value_t = rpszero::MCTS_SIMULATIONS)]
    simulations: usize,
    #[arg(long, default_value_t = rpszero::C_PUCT)]
    c_puct: f32,
    /// hidden width for freshly initialized networks
    #[arg(long, default_value_t = rpszero::HIDDEN_SIZE)]
    hidden: usize,
    #[arg(long, default_value_t = rpszero::LEARNING_RATE)]
    lr: f32,
    #[arg(long, default_value_t = rpszero::BATCH_SIZE)]
    batch: usize,
    #[arg(long, default_value_t = rpszero::EPOCHS)]
    epochs: usize,
    /// opening exploration temperature; zero means argmax throughout
    #[arg(long, default_value_t = rpszero::TEMPERATURE)]
    temperature: f32,
    /// moves played under temperature before switching to argmax
    #[arg(long, default_value_t = rpszero::EXPLORE_MOVES)]
    explore: usize,
    /// worker threads for self-play
    #[arg(long, default_value_t = num_cpus::get())]
    workers: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// checkpoint path, resumed from when present
    #[arg(long, default_value = "checkpoint.bin")]
    checkpoint: PathBuf,
    /// optional wall-clock budget in seconds
    #[arg(long)]
    deadline: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    rpszero::init();
    let args = Args::parse();
    let cancel = match args.deadline {
        Some(secs) => Cancel::deadline(Duration::from_secs(secs)),
        None => Cancel::new(),
    };
    let watcher = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.expect("listen for ctrl-c");
        log::warn!("interrupt received, finishing in-flight work");
        watcher.cancel();
    });
    tokio::task::spawn_blocking(move || run(args, cancel)).await?
}

fn run(args: Args, cancel: Cancel) -> anyhow::Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(args.workers)
        .build_global()?;
    let ref sink = LogSink;
    let ref mut rng = SmallRng::seed_from_u64(args.seed);
    let (mut iteration, mut policy, mut value, optimizers) = match Checkpoint::done(&args.checkpoint) {
        true => {
            let resumed = Checkpoint::load(&args.checkpoint)?;
            (resumed.iteration, resumed.policy, resumed.value, resumed.optimizers)
        }
        false => (
            0,
            PolicyNet::new(rng, args.hidden),
            ValueNet::new(rng, args.hidden),
            None,
        ),
    };
    let schedule = Schedule {
        lr: args.lr,
        batch: args.batch,
        epochs: args.epochs,
        ..Schedule::default()
    };
    let mut trainer = match optimizers {
        Some((p, v)) => Trainer::from_state(schedule, args.seed, p, v),
        None => Trainer::new(&policy, &value, schedule, args.seed),
    };
    let bar = rpszero::progress(args.iterations);
    bar.set_position(iteration as u64);
    while iteration < args.iterations && !cancel.is_cancelled() {
        sink.report(Event::IterationStarted { iteration });
        let pool = {
            let ref evaluator = NetEvaluator::new(&policy, &value);
            let mut generator = Generator::new(evaluator);
            generator.games = args.games;
            generator.simulations = args.simulations;
            generator.c_puct = args.c_puct;
            generator.temperature = args.temperature;
            generator.explore = args.explore;
            generator.seed = args.seed.wrapping_add(iteration as u64);
            generator.generate(&cancel, sink)?
        };
        log::info!("self-play produced {} examples (iteration {})", pool.len(), iteration);
        trainer.seed = args.seed.wrapping_add(iteration as u64);
        match trainer.fit(&mut policy, &mut value, &pool, &cancel, sink) {
            Ok((p, v)) => log::info!("fit losses: policy {:.6} value {:.6}", p, v),
            Err(Error::Cancelled) => break,
            Err(e) => return Err(e.into()),
        }
        iteration += 1;
        bar.inc(1);
        snapshot(&args, iteration, &policy, &value, &trainer, sink)?;
    }
    bar.finish_and_clear();
    // the loop may have broken out mid-iteration; leave a consistent
    // checkpoint behind either way
    snapshot(&args, iteration, &policy, &value, &trainer, sink)?;
    Ok(())
}

fn snapshot(
    args: &Args,
    iteration: usize,
    policy: &PolicyNet,
    value: &ValueNet,
    trainer: &Trainer,
    sink: &dyn Sink,
) -> anyhow::Result<()> {
    let (p, v) = trainer.optimizers();
    Checkpoint {
        iteration,
        seed: args.seed,
        policy: policy.clone(),
        value: value.clone(),
        optimizers: Some((p.clone(), v.clone())),
    }
    .save(&args.checkpoint)?;
    sink.report(Event::CheckpointWritten {
        path: args.checkpoint.display().to_string(),
        iteration,
    });
    Ok(())
}
