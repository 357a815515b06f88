use petgraph::graph::DiGraph;
use petgraph::graph::NodeIndex;

use super::data::Action;
use super::data::Data;
use super::tree::Tree;
use crate::Chips;
use crate::config::BettingAbstraction;
use crate::game::Game;

/// betting position within one node of the build
#[derive(Clone, Copy)]
struct State {
    street: usize,
    pot: Chips,
    player: usize,
    /// amount in front of us to call, zero when checking is open
    facing: Chips,
    /// wagers made this street
    bets: usize,
    /// the other player already checked this street
    checked: bool,
}

/// Builder grows a betting tree from a bet size menu. it is not a full
/// rules engine (no blinds, no min raise subtleties), just the node
/// graph that strategy walks and their tests require: check, call,
/// fold, and pot fraction bets capped at the stack.
pub struct Builder<'a> {
    game: &'a Game,
    abstraction: &'a BettingAbstraction,
}

impl<'a> Builder<'a> {
    pub fn new(game: &'a Game, abstraction: &'a BettingAbstraction) -> Self {
        Self { game, abstraction }
    }

    /// a tree rooted at the opening decision of a street
    pub fn build(&self, street: usize, pot: Chips) -> Tree {
        assert!(pot >= 1 && pot % 2 == 0, "pot splits evenly at the root");
        let mut graph = DiGraph::new();
        let root = self.grow(
            &mut graph,
            State {
                street,
                pot,
                player: 0,
                facing: 0,
                bets: 0,
                checked: false,
            },
        );
        Tree::from(graph, root, self.game.max_street())
    }

    fn allin(&self, pot: Chips) -> bool {
        pot / 2 >= self.game.stack_size()
    }

    fn grow(&self, graph: &mut DiGraph<Data, Action>, state: State) -> NodeIndex {
        let node = graph.add_node(Data::decision(state.street, state.pot, state.player));
        if state.facing > 0 {
            let fold = graph.add_node(Data::fold(state.street, state.pot, state.player));
            graph.add_edge(node, fold, Action::Fold);
        }
        let closes = state.facing > 0 || state.checked;
        let call = if !closes {
            self.grow(
                graph,
                State {
                    player: 1 - state.player,
                    checked: true,
                    facing: 0,
                    ..state
                },
            )
        } else if state.street == self.game.max_street() || self.allin(state.pot) {
            graph.add_node(Data::showdown(state.street, state.pot))
        } else {
            self.grow(
                graph,
                State {
                    street: state.street + 1,
                    pot: state.pot,
                    player: 0,
                    facing: 0,
                    bets: 0,
                    checked: false,
                },
            )
        };
        graph.add_edge(node, call, Action::Call);
        if state.bets < self.abstraction.max_bets() && !self.allin(state.pot) {
            let behind = self.game.stack_size() - state.pot / 2;
            let mut offered: Vec<Chips> = Vec::new();
            for frac in self.abstraction.bet_fracs(state.street) {
                let wager = ((frac * state.pot as f64).round() as Chips)
                    .max(1)
                    .min(behind);
                if offered.contains(&wager) {
                    continue;
                }
                offered.push(wager);
                let action = if wager == behind {
                    Action::AllIn
                } else {
                    Action::Bet(*frac)
                };
                let child = self.grow(
                    graph,
                    State {
                        street: state.street,
                        pot: state.pot + 2 * wager,
                        player: 1 - state.player,
                        facing: wager,
                        bets: state.bets + 1,
                        checked: false,
                    },
                );
                graph.add_edge(node, child, action);
            }
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::data::Kind;

    fn game() -> Game {
        Game::new("toy", 3, 2, 1, vec![0, 1], 100)
    }

    #[test]
    fn succ_order_is_positional() {
        let game = game();
        let ref betting = BettingAbstraction::new("halfpot", vec![vec![], vec![0.5, 1.0]], 2);
        let tree = Builder::new(&game, betting).build(1, 10);
        let root = tree.root();
        // opening node: no fold, check first, then bets ascending
        assert!(!root.has_fold_succ());
        assert!(root.call_succ_index() == Some(0));
        assert!(root.num_succs() == 3);
        assert!((root.bet_frac(1) - 0.5).abs() < 1e-9);
        assert!((root.bet_frac(2) - 1.0).abs() < 1e-9);
        // facing a bet: fold then call then raises
        let facing = root.ith_succ(2);
        assert!(facing.player_acting() == 1);
        assert!(facing.fold_succ_index() == Some(0));
        assert!(facing.call_succ_index() == Some(1));
        assert!(facing.pot_size() == 30);
    }

    #[test]
    fn checks_close_the_street() {
        let game = game();
        let ref betting = BettingAbstraction::new("flat", vec![vec![], vec![1.0]], 1);
        let tree = Builder::new(&game, betting).build(1, 10);
        let check = tree.root().ith_succ(0);
        assert!(check.player_acting() == 1);
        let down = check.ith_succ(0);
        // check behind on the last street shows down
        assert!(down.is_terminal());
        assert!(matches!(down.data().kind(), Kind::Showdown));
        assert!(down.pot_size() == 10);
    }

    #[test]
    fn stack_caps_bets_at_all_in() {
        let game = Game::new("short", 3, 2, 1, vec![0, 1], 12);
        let ref betting = BettingAbstraction::new("big", vec![vec![], vec![1.0, 2.0]], 2);
        let tree = Builder::new(&game, betting).build(1, 10);
        let root = tree.root();
        // stack 12, pot 10: both menu sizes cap to 7 behind, deduped
        assert!(root.num_succs() == 2);
        assert!(root.action(1) == Action::AllIn);
        let facing = root.ith_succ(1);
        assert!(facing.pot_size() == 24);
        // no reraise once the money is in
        assert!(facing.num_succs() == 2);
        assert!(facing.ith_succ(1).is_terminal());
    }

    #[test]
    fn ids_are_dense_per_player_and_street() {
        let game = game();
        let ref betting = BettingAbstraction::new("halfpot", vec![vec![], vec![0.5, 1.0]], 2);
        let tree = Builder::new(&game, betting).build(1, 10);
        for player in 0..2 {
            let mut ids = tree
                .all()
                .filter(|n| !n.is_terminal())
                .filter(|n| n.player_acting() == player)
                .map(|n| n.nonterminal_id())
                .collect::<Vec<usize>>();
            ids.sort();
            assert!(ids == (0..tree.num_nonterminals(player, 1)).collect::<Vec<usize>>());
        }
    }

    #[test]
    fn subtrees_renumber_from_zero() {
        let game = game();
        let ref betting = BettingAbstraction::new("halfpot", vec![vec![], vec![0.5, 1.0]], 2);
        let tree = Builder::new(&game, betting).build(1, 10);
        let at = tree.root().ith_succ(2).index();
        let sub = tree.subtree(at);
        assert!(sub.root().pot_size() == 30);
        assert!(sub.root().nonterminal_id() == 0);
        let total = sub.all().filter(|n| !n.is_terminal()).count();
        assert!(total == sub.num_nonterminals(0, 1) + sub.num_nonterminals(1, 1));
    }
}
