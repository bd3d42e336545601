use crate::game::player::Player;
use crate::Loss;

/// progress events emitted by the core. the orchestrator and workers report
/// through a Sink so that collaborators can redirect events into metrics or
/// UIs without the core knowing about either.
#[derive(Debug, Clone)]
pub enum Event {
    IterationStarted {
        iteration: usize,
    },
    GameCompleted {
        game: usize,
        moves: usize,
        winner: Option<Player>,
    },
    EpochCompleted {
        epoch: usize,
        policy: Loss,
        value: Loss,
    },
    CheckpointWritten {
        path: String,
        iteration: usize,
    },
    SearchStats {
        simulations: usize,
        visits: u32,
        millis: u128,
    },
}

pub trait Sink: Send + Sync {
    fn report(&self, event: Event);
}

/// default sink, forwards everything to the log crate
pub struct LogSink;

impl Sink for LogSink {
    fn report(&self, event: Event) {
        match event {
            Event::IterationStarted { iteration } => {
                log::info!("iteration started ({})", iteration)
            }
            Event::GameCompleted {
                game,
                moves,
                winner,
            } => {
                log::debug!("game completed ({}) in {} moves, winner {:?}", game, moves, winner)
            }
            Event::EpochCompleted {
                epoch,
                policy,
                value,
            } => {
                log::info!(
                    "epoch completed ({}) policy loss {:.6} value loss {:.6}",
                    epoch,
                    policy,
                    value
                )
            }
            Event::CheckpointWritten { path, iteration } => {
                log::info!("checkpoint written ({}) at iteration {}", path, iteration)
            }
            Event::SearchStats {
                simulations,
                visits,
                millis,
            } => {
                log::debug!(
                    "search stats: {} simulations, {} root visits, {}ms",
                    simulations,
                    visits,
                    millis
                )
            }
        }
    }
}
