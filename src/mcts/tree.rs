use crate::game::action::Action;
use crate::game::game::Game;
use crate::mcts::node::Node;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::Direction::Incoming;
use petgraph::Direction::Outgoing;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

/// the search tree: a petgraph DiGraph behind a read/write guard.
/// selection and backprop hold shared access and touch only the atomic
/// counters inside Node weights; attaching children takes the exclusive
/// lock. parents own children through graph edges and children find
/// their parent through the incoming edge, so there is no reference
/// cycle and teardown is a plain drop of the graph.
pub struct Tree {
    graph: RwLock<DiGraph<Node, Action>>,
}

impl Tree {
    /// a one-node tree rooted at the given position
    pub fn seed(game: Game) -> Self {
        let mut graph = DiGraph::default();
        graph.add_node(Node::new(game, 1.));
        Self {
            graph: RwLock::new(graph),
        }
    }

    pub fn root() -> NodeIndex {
        NodeIndex::new(0)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, DiGraph<Node, Action>> {
        self.graph.read().expect("tree lock poisoned")
    }
    pub fn write(&self) -> RwLockWriteGuard<'_, DiGraph<Node, Action>> {
        self.graph.write().expect("tree lock poisoned")
    }

    /// children in creation order, which is move-generation order, so
    /// index ties resolve deterministically
    pub fn children(graph: &DiGraph<Node, Action>, index: NodeIndex) -> Vec<NodeIndex> {
        let mut children = graph.neighbors_directed(index, Outgoing).collect::<Vec<_>>();
        children.sort();
        children
    }

    pub fn parent(graph: &DiGraph<Node, Action>, index: NodeIndex) -> Option<NodeIndex> {
        graph.neighbors_directed(index, Incoming).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::Player;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn children_come_back_in_creation_order() {
        let ref mut rng = SmallRng::seed_from_u64(20);
        let game = Game::root(rng);
        let tree = Tree::seed(game.clone());
        let mut graph = tree.write();
        for action in game.options().into_iter().take(3) {
            let child = graph.add_node(Node::new(game.apply(action).unwrap(), 0.1));
            graph.add_edge(Tree::root(), child, action);
        }
        let children = Tree::children(&graph, Tree::root());
        assert!(children.len() == 3);
        assert!(children.windows(2).all(|w| w[0] < w[1]));
        for child in children {
            assert!(Tree::parent(&graph, child) == Some(Tree::root()));
            assert!(graph[child].game().turn() == Player::P2);
        }
        assert!(Tree::parent(&graph, Tree::root()).is_none());
    }
}
