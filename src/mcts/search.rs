use crate::cancel::Cancel;
use crate::error::Error;
use crate::error::Result;
use crate::game::action::Action;
use crate::game::game::Game;
use crate::mcts::node::Node;
use crate::mcts::tree::Tree;
use crate::nets::evaluator::Evaluator;
use crate::Probability;
use crate::Utility;
use crate::C_PUCT;
use crate::MCTS_SIMULATIONS;
use crate::SQUARES;
use petgraph::graph::NodeIndex;

/// outcome of one full search: the move to play, the normalized visit
/// distribution over the nine squares (the self-play policy target),
/// the per-move visit counts in move-generation order, and the root
/// visit count for stats.
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: Action,
    pub policy: [Probability; SQUARES],
    pub children: Vec<(Action, u32)>,
    pub visits: u32,
}

/// PUCT search with network priors and value bootstrap; no rollouts.
/// a single worker with a fixed evaluator is bit-reproducible, while
/// several workers cooperate on the shared tree through virtual loss
/// and converge to the same visit distribution in expectation.
pub struct Search<'a> {
    pub evaluator: &'a dyn Evaluator,
    pub simulations: usize,
    pub c_puct: f32,
    pub workers: usize,
}

impl<'a> Search<'a> {
    pub fn new(evaluator: &'a dyn Evaluator) -> Self {
        Self {
            evaluator,
            simulations: MCTS_SIMULATIONS,
            c_puct: C_PUCT,
            workers: 1,
        }
    }

    /// run the configured number of simulations from the root position.
    /// evaluation failures and cancellation abort the whole search; the
    /// partial tree is discarded with it.
    pub fn run(&self, root: &Game, cancel: &Cancel) -> Result<Decision> {
        if root.is_terminal() {
            return Err(Error::NoMoves);
        }
        let ref tree = Tree::seed(root.clone());
        match self.workers {
            0 | 1 => {
                for _ in 0..self.simulations {
                    if cancel.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                    self.simulate(tree)?;
                }
            }
            _ => {
                use rayon::iter::IntoParallelIterator;
                use rayon::iter::ParallelIterator;
                (0..self.simulations).into_par_iter().try_for_each(|_| {
                    if cancel.is_cancelled() {
                        Err(Error::Cancelled)
                    } else {
                        self.simulate(tree)
                    }
                })?;
            }
        }
        self.decide(tree)
    }

    /// one simulation: select to a leaf under shared access, evaluate
    /// and expand it, then walk the parent chain flipping perspective.
    /// node values are win probabilities for the player who moved into
    /// the node, so selection is a plain argmax at every depth.
    fn simulate(&self, tree: &Tree) -> Result<()> {
        let (path, leaf) = self.select(tree);
        let value = if leaf.is_terminal() {
            let ref mover = leaf.turn().opponent();
            match leaf.winner() {
                Some(winner) if winner == *mover => 1.,
                Some(_) => 0.,
                None => 0.5,
            }
        } else {
            match self.evaluator.evaluate(&leaf.features()) {
                Ok((priors, value)) => {
                    self.grow(tree, *path.last().expect("path starts at root"), &leaf, priors);
                    1. - value
                }
                Err(e) => {
                    let graph = tree.read();
                    for &index in path.iter().skip(1) {
                        graph[index].undo_virtual_loss();
                    }
                    return Err(e);
                }
            }
        };
        self.backup(tree, &path, value);
        Ok(())
    }

    /// descend by UCB from the root while nodes are expanded and live,
    /// leaving a virtual loss on everything below the root
    fn select(&self, tree: &Tree) -> (Vec<NodeIndex>, Game) {
        let graph = tree.read();
        let mut at = Tree::root();
        let mut path = vec![at];
        while graph[at].expanded() && !graph[at].game().is_terminal() {
            let parent_visits = graph[at].visits();
            let children = Tree::children(&graph, at);
            let best = children
                .into_iter()
                .fold(None::<(NodeIndex, f32)>, |best, child| {
                    let score = graph[child].ucb(self.c_puct, parent_visits);
                    match best {
                        Some((_, top)) if top >= score => best,
                        _ => Some((child, score)),
                    }
                })
                .map(|(child, _)| child)
                .expect("expanded non-terminal node has children");
            graph[best].virtual_loss();
            path.push(best);
            at = best;
        }
        (path, graph[at].game().clone())
    }

    /// attach one child per legal move, carrying the square's prior
    /// renormalized over legal moves. losing the expansion race to a
    /// sibling worker is fine; its children are just as good as ours.
    fn grow(&self, tree: &Tree, at: NodeIndex, leaf: &Game, priors: Vec<Probability>) {
        let mut graph = tree.write();
        if graph[at].expanded() {
            return;
        }
        let options = leaf.options();
        let uniform = 1. / options.len() as f32;
        let weights = options
            .iter()
            .map(|action| priors[action.square])
            .collect::<Vec<_>>();
        let total = weights.iter().sum::<f32>();
        for (action, weight) in options.into_iter().zip(weights.into_iter()) {
            let prior = match total {
                t if t > 0. => weight / t,
                _ => uniform,
            };
            let child = leaf.apply(action).expect("moves from options are legal");
            let child = graph.add_node(Node::new(child, prior));
            graph.add_edge(at, child, action);
        }
        graph[at].expand();
    }

    /// walk the path from leaf to root, undoing virtual losses and
    /// flipping the value's perspective at every ply
    fn backup(&self, tree: &Tree, path: &[NodeIndex], leaf_value: Utility) {
        let graph = tree.read();
        let mut value = leaf_value;
        for &index in path.iter().rev() {
            if index != Tree::root() {
                graph[index].undo_virtual_loss();
            }
            graph[index].update(value);
            value = 1. - value;
        }
    }

    /// the most-visited root child wins, ties to the lower index; the
    /// policy target is the visit distribution folded onto squares
    fn decide(&self, tree: &Tree) -> Result<Decision> {
        let graph = tree.read();
        let children = Tree::children(&graph, Tree::root());
        let best = children
            .iter()
            .copied()
            .fold(None::<(NodeIndex, u32)>, |best, child| {
                let visits = graph[child].visits();
                match best {
                    Some((_, top)) if top >= visits => best,
                    _ => Some((child, visits)),
                }
            })
            .ok_or(Error::NoMoves)?;
        let incoming = |child: NodeIndex| -> Action {
            *graph
                .edge_weight(
                    graph
                        .find_edge(Tree::root(), child)
                        .expect("children joined by edges"),
                )
                .expect("edge weight present")
        };
        let stats = children
            .iter()
            .map(|&child| (incoming(child), graph[child].visits()))
            .collect::<Vec<_>>();
        let total = stats.iter().map(|(_, n)| n).sum::<u32>().max(1);
        let mut policy = [0f32; SQUARES];
        for (action, visits) in stats.iter() {
            policy[action.square] += *visits as f32 / total as f32;
        }
        Ok(Decision {
            action: incoming(best.0),
            policy,
            children: stats,
            visits: graph[Tree::root()].visits(),
        })
    }
}
