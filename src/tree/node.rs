use petgraph::Outgoing;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::data::Action;
use super::data::Data;
use super::data::Kind;
use crate::Chips;

/// a Node is a NodeIndex plus a readonly reference to the graph it
/// lives in, so navigation never copies tree state. successor order is
/// positional and meaningful: fold first when present, then call, then
/// bets from smallest to largest.
#[derive(Copy, Clone)]
pub struct Node<'tree> {
    index: NodeIndex,
    graph: &'tree DiGraph<Data, Action>,
}

impl<'tree> Node<'tree> {
    pub fn from(index: NodeIndex, graph: &'tree DiGraph<Data, Action>) -> Self {
        Self { index, graph }
    }
    pub fn index(&self) -> NodeIndex {
        self.index
    }
    pub fn data(&self) -> &'tree Data {
        self.graph.node_weight(self.index).expect("valid node index")
    }

    pub fn is_terminal(&self) -> bool {
        self.data().is_terminal()
    }
    pub fn street(&self) -> usize {
        self.data().street()
    }
    pub fn pot_size(&self) -> Chips {
        self.data().pot()
    }
    pub fn player_acting(&self) -> usize {
        match self.data().kind() {
            Kind::Decision { player } => player,
            kind => panic!("no player acting at {:?}", kind),
        }
    }
    pub fn nonterminal_id(&self) -> usize {
        self.data().id()
    }

    /// (action, successor) pairs in positional order
    pub fn succs(&self) -> Vec<(Action, Node<'tree>)> {
        // petgraph yields outgoing edges newest first
        let mut succs = self
            .graph
            .edges_directed(self.index, Outgoing)
            .map(|edge| (*edge.weight(), Self::from(edge.target(), self.graph)))
            .collect::<Vec<(Action, Node<'tree>)>>();
        succs.reverse();
        succs
    }
    pub fn num_succs(&self) -> usize {
        self.graph.edges_directed(self.index, Outgoing).count()
    }
    pub fn ith_succ(&self, i: usize) -> Node<'tree> {
        self.succs()[i].1
    }
    pub fn action(&self, i: usize) -> Action {
        self.succs()[i].0
    }

    pub fn fold_succ_index(&self) -> Option<usize> {
        self.succs().iter().position(|(a, _)| *a == Action::Fold)
    }
    pub fn call_succ_index(&self) -> Option<usize> {
        self.succs().iter().position(|(a, _)| *a == Action::Call)
    }
    pub fn has_fold_succ(&self) -> bool {
        self.fold_succ_index().is_some()
    }
    /// where unaccounted probability mass is parked by convention
    pub fn default_succ_index(&self) -> usize {
        self.call_succ_index().unwrap_or(0)
    }

    /// wager behind successor i as a fraction of this node's pot
    pub fn bet_frac(&self, i: usize) -> f64 {
        let wager = (self.ith_succ(i).pot_size() - self.pot_size()) / 2;
        wager as f64 / self.pot_size() as f64
    }
}
