use petgraph::Outgoing;
use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use super::data::Action;
use super::data::Data;
use super::data::Kind;
use super::node::Node;

/// a betting tree over a petgraph DiGraph. decision nodes carry ids
/// dense within each (player, street), which is what strategy tables
/// index rows by.
pub struct Tree {
    graph: DiGraph<Data, Action>,
    root: NodeIndex,
    /// decision node count per [player][street]
    counts: Vec<Vec<usize>>,
}

impl Tree {
    pub fn from(mut graph: DiGraph<Data, Action>, root: NodeIndex, streets: usize) -> Self {
        let counts = Self::enumerate(&mut graph, root, streets);
        Self {
            graph,
            root,
            counts,
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node::from(self.root, &self.graph)
    }
    pub fn at(&self, index: NodeIndex) -> Node<'_> {
        Node::from(index, &self.graph)
    }
    pub fn all(&self) -> impl Iterator<Item = Node<'_>> {
        self.graph.node_indices().map(|n| self.at(n))
    }
    pub fn num_nonterminals(&self, player: usize, street: usize) -> usize {
        self.counts[player][street]
    }

    /// standalone copy of the subtree under a node, with ids reassigned
    /// dense from zero. this is the shape an endgame gets resolved over.
    pub fn subtree(&self, at: NodeIndex) -> Tree {
        let mut graph = DiGraph::new();
        let root = Self::copy(&self.graph, at, &mut graph);
        let streets = self.counts[0].len() - 1;
        Self::from(graph, root, streets)
    }

    fn copy(
        src: &DiGraph<Data, Action>,
        at: NodeIndex,
        dst: &mut DiGraph<Data, Action>,
    ) -> NodeIndex {
        let node = dst.add_node(src.node_weight(at).expect("valid source index").clone());
        let mut succs = src
            .edges_directed(at, Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
            .collect::<Vec<(Action, NodeIndex)>>();
        succs.reverse();
        for (action, child) in succs {
            let sub = Self::copy(src, child, dst);
            dst.add_edge(node, sub, action);
        }
        node
    }

    /// preorder walk assigning dense (player, street) ids
    fn enumerate(
        graph: &mut DiGraph<Data, Action>,
        root: NodeIndex,
        streets: usize,
    ) -> Vec<Vec<usize>> {
        let mut counts = vec![vec![0; streets + 1]; 2];
        let mut stack = vec![root];
        while let Some(at) = stack.pop() {
            let kids = graph
                .edges_directed(at, Outgoing)
                .map(|edge| edge.target())
                .collect::<Vec<NodeIndex>>();
            let data = graph.node_weight_mut(at).expect("valid node index");
            if let Kind::Decision { player } = data.kind() {
                data.assign(counts[player][data.street()]);
                counts[player][data.street()] += 1;
            }
            // edges iterate newest first; pushing them as-is makes the
            // stack pop children in positional order
            stack.extend(kids);
        }
        counts
    }
}
