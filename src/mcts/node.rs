use crate::game::game::Game;
use crate::Probability;
use crate::Utility;
use crate::VIRTUAL_LOSS;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// per-node search statistics. the counters are atomic so workers
/// holding the tree's shared lock can update them during selection and
/// backprop; only structural growth needs the exclusive lock. the game
/// snapshot is owned by the node and never mutates after creation.
#[derive(Debug)]
pub struct Node {
    game: Game,
    prior: Probability,
    visits: AtomicU32,
    wins: AtomicU64,
    expanded: AtomicBool,
}

impl Node {
    pub fn new(game: Game, prior: Probability) -> Self {
        Self {
            game,
            prior,
            visits: AtomicU32::new(0),
            wins: AtomicU64::new(0f64.to_bits()),
            expanded: AtomicBool::new(false),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }
    pub fn visits(&self) -> u32 {
        self.visits.load(Ordering::Acquire)
    }
    pub fn expanded(&self) -> bool {
        self.expanded.load(Ordering::Acquire)
    }
    pub fn expand(&self) {
        self.expanded.store(true, Ordering::Release);
    }

    /// summed backup value, read as the win probability total for the
    /// player who moved into this node
    pub fn wins(&self) -> f64 {
        f64::from_bits(self.wins.load(Ordering::Acquire))
    }

    /// mean value; zero before the first visit
    pub fn q(&self) -> Utility {
        match self.visits() {
            0 => 0.,
            n => (self.wins() / n as f64) as Utility,
        }
    }

    /// one completed backup: a visit plus its value
    pub fn update(&self, value: Utility) {
        self.visits.fetch_add(1, Ordering::AcqRel);
        self.accumulate(value as f64);
    }

    /// pessimistic bias while a worker is descending through this node.
    /// the extra visits count as losses (zero value), steering sibling
    /// workers elsewhere until the backup undoes them.
    pub fn virtual_loss(&self) {
        self.visits.fetch_add(VIRTUAL_LOSS, Ordering::AcqRel);
    }
    pub fn undo_virtual_loss(&self) {
        self.visits.fetch_sub(VIRTUAL_LOSS, Ordering::AcqRel);
    }

    /// PUCT: exploitation plus prior-weighted exploration
    pub fn ucb(&self, c_puct: f32, parent_visits: u32) -> f32 {
        self.q() + c_puct * self.prior * (parent_visits as f32).sqrt() / (1 + self.visits()) as f32
    }

    /// lock-free float accumulation via compare-and-swap on the bits
    fn accumulate(&self, value: f64) {
        let mut bits = self.wins.load(Ordering::Acquire);
        loop {
            let next = (f64::from_bits(bits) + value).to_bits();
            match self
                .wins
                .compare_exchange_weak(bits, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(observed) => bits = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn leaf(prior: Probability) -> Node {
        let ref mut rng = SmallRng::seed_from_u64(19);
        Node::new(Game::root(rng), prior)
    }

    #[test]
    fn q_is_zero_before_any_visit() {
        assert!(leaf(0.5).q() == 0.);
    }

    #[test]
    fn update_accumulates_mean() {
        let node = leaf(0.5);
        node.update(1.0);
        node.update(0.0);
        node.update(0.5);
        assert!((node.q() - 0.5).abs() < 1e-6);
        assert!(node.visits() == 3);
    }

    #[test]
    fn more_visits_strictly_lower_ucb_at_constant_q() {
        let sparse = leaf(0.3);
        let dense = leaf(0.3);
        for _ in 0..2 {
            sparse.update(0.5);
        }
        for _ in 0..4 {
            dense.update(0.5);
        }
        assert!(sparse.ucb(1.25, 100) > dense.ucb(1.25, 100));
    }

    #[test]
    fn virtual_loss_depresses_then_restores() {
        let node = leaf(0.5);
        node.update(1.0);
        let before = node.ucb(1.25, 10);
        node.virtual_loss();
        assert!(node.ucb(1.25, 10) < before);
        node.undo_virtual_loss();
        assert!((node.ucb(1.25, 10) - before).abs() < 1e-6);
    }
}
