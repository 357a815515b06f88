use crate::WEIGHT_TOLERANCE;
use crate::config::BettingAbstraction;
use crate::strategy::StrategyStore;
use crate::tree::Action;
use crate::tree::Node;
use crate::tree::Tree;

/// one analogous position in the base tree for a node of the expanded
/// tree. dont_fold marks a candidate produced by rounding a wager down
/// to no bet: in its world nothing was bet, so it may never fold to
/// the wager it pretended away.
#[derive(Clone, Copy)]
struct Candidate<'a> {
    node: Node<'a>,
    dont_fold: bool,
}

impl<'a> Candidate<'a> {
    /// a candidate with nothing left to decide while the walk is still
    /// at `at`: its tree already showed down, or rounding a raise down
    /// to a call closed its street early. such a world can only call
    /// until the walk catches up to its street.
    fn anchored(&self, at: Node<'a>) -> bool {
        self.node.is_terminal() || self.node.street() > at.street()
    }
}

/// Expander translates a strategy trained under one bet size menu onto
/// a tree with a different, denser menu. the target player is assumed
/// never to take sizes the base menu lacks; wagers only the expanded
/// tree offers are handled by splitting each base candidate between
/// the nearest smaller and larger analogous actions, pseudo-harmonic
/// weighted, and carrying the pieces forward as a weighted candidate
/// list that stays normalized to one.
pub struct Expander<'a> {
    expanded: &'a Tree,
    base: &'a StrategyStore,
    /// the player whose strategy is being translated
    target: usize,
    /// output rows per street
    holdings: Vec<usize>,
}

impl<'a> Expander<'a> {
    pub fn new(
        expanded: &'a Tree,
        base: &'a StrategyStore,
        target: usize,
        holdings: Vec<usize>,
    ) -> Self {
        Self {
            expanded,
            base,
            target,
            holdings,
        }
    }

    /// translated strategy for the expanded tree. rows of nodes the
    /// target player never reaches stay zero, which covers every
    /// genuinely new action.
    pub fn expand(&self, root: Node<'a>) -> StrategyStore {
        let mut out = StrategyStore::sized(self.expanded, &self.holdings);
        let start = Candidate {
            node: root,
            dont_fold: false,
        };
        self.walk(self.expanded.root(), vec![start], vec![1.0], &mut out);
        out
    }

    fn walk(
        &self,
        node: Node<'a>,
        candidates: Vec<Candidate<'a>>,
        weights: Vec<f64>,
        out: &mut StrategyStore,
    ) {
        let total = weights.iter().sum::<f64>();
        assert!(
            (total - 1.0).abs() < WEIGHT_TOLERANCE,
            "translation weights drifted to {}",
            total
        );
        if node.is_terminal() {
            return;
        }
        if node.player_acting() == self.target {
            self.emit(node, &candidates, &weights, out);
        }
        for i in 0..node.num_succs() {
            let (next, reweighted) = match node.player_acting() == self.target {
                true => self.follow(node, i, &candidates, &weights),
                false => self.translate(node, i, &candidates, &weights),
            };
            if !next.is_empty() {
                self.walk(node.ith_succ(i), next, reweighted, out);
            }
        }
    }

    /// the target player's b-side action i in a candidate's a-side
    /// menu, None when the candidate has nothing analogous
    fn matching_succ(&self, node: Node<'a>, i: usize, candidate: &Candidate<'a>) -> Option<usize> {
        if candidate.anchored(node) {
            return None;
        }
        match node.action(i) {
            Action::Fold => match candidate.dont_fold {
                true => None,
                false => candidate.node.fold_succ_index(),
            },
            Action::Call => candidate.node.call_succ_index(),
            Action::Bet(_) | Action::AllIn => {
                let frac = node.bet_frac(i);
                let wagers = self.wagers(&candidate.node);
                match node.action(i) {
                    Action::AllIn => wagers
                        .iter()
                        .find(|(_, a, _)| *a == Action::AllIn)
                        .or(wagers.iter().find(|(_, _, f)| exact(*f, frac)))
                        .map(|(s, _, _)| *s),
                    _ => wagers
                        .iter()
                        .find(|(_, _, f)| exact(*f, frac))
                        .map(|(s, _, _)| *s),
                }
            }
        }
    }

    /// (succ index, action, pot fraction) of every wager a node offers
    fn wagers(&self, node: &Node<'a>) -> Vec<(usize, Action, f64)> {
        node.succs()
            .iter()
            .enumerate()
            .filter(|(_, (a, _))| matches!(a, Action::Bet(_) | Action::AllIn))
            .map(|(s, (a, _))| (s, *a, node.bet_frac(s)))
            .collect()
    }

    /// write the target player's translated distribution for one node:
    /// per holding, the candidates' base action probabilities summed
    /// under their translation weights
    fn emit(
        &self,
        node: Node<'a>,
        candidates: &[Candidate<'a>],
        weights: &[f64],
        out: &mut StrategyStore,
    ) {
        let street = node.street();
        let id = node.nonterminal_id();
        let n = node.num_succs();
        let call = node.default_succ_index();
        for holding in 0..self.holdings[street] {
            for i in 0..n {
                let mut p = 0.0;
                for (candidate, weight) in candidates.iter().zip(weights) {
                    if candidate.anchored(node) {
                        // nothing left to decide in this world, it calls
                        if i == call {
                            p += weight;
                        }
                        continue;
                    }
                    if let Some(succ) = self.matching_succ(node, i, candidate) {
                        let at = candidate.node;
                        p += weight
                            * self.base.probability(
                                self.target,
                                at.street(),
                                at.nonterminal_id(),
                                holding,
                                succ,
                                at.num_succs(),
                                at.default_succ_index(),
                            );
                    }
                }
                out.set(self.target, street, id, holding, i, n, p);
            }
        }
    }

    /// advance candidates through a target player action. the target
    /// never takes sizes the base menu lacks, so candidates without an
    /// analogous successor drop out and the rest renormalize.
    fn follow(
        &self,
        node: Node<'a>,
        i: usize,
        candidates: &[Candidate<'a>],
        weights: &[f64],
    ) -> (Vec<Candidate<'a>>, Vec<f64>) {
        let mut next = Vec::new();
        let mut reweighted = Vec::new();
        for (candidate, weight) in candidates.iter().zip(weights) {
            if candidate.anchored(node) {
                // anchored worlds ride along only through the call
                if node.action(i) == Action::Call {
                    next.push(*candidate);
                    reweighted.push(*weight);
                }
                continue;
            }
            if let Some(succ) = self.matching_succ(node, i, candidate) {
                next.push(Candidate {
                    node: candidate.node.ith_succ(succ),
                    dont_fold: false,
                });
                reweighted.push(*weight);
            }
        }
        normalize(&mut reweighted);
        (next, reweighted)
    }

    /// advance candidates through an opponent action, splitting wagers
    /// the base menu lacks across the nearest smaller and larger sizes
    fn translate(
        &self,
        node: Node<'a>,
        i: usize,
        candidates: &[Candidate<'a>],
        weights: &[f64],
    ) -> (Vec<Candidate<'a>>, Vec<f64>) {
        let mut next = Vec::new();
        let mut reweighted = Vec::new();
        for (candidate, weight) in candidates.iter().zip(weights) {
            if candidate.anchored(node) {
                if node.action(i) == Action::Call {
                    next.push(*candidate);
                    reweighted.push(*weight);
                }
                continue;
            }
            match node.action(i) {
                Action::Fold => {
                    // a dont_fold world has no wager to fold to
                    if !candidate.dont_fold {
                        if let Some(succ) = candidate.node.fold_succ_index() {
                            next.push(Candidate {
                                node: candidate.node.ith_succ(succ),
                                dont_fold: false,
                            });
                            reweighted.push(*weight);
                        }
                    }
                }
                Action::Call => {
                    let succ = candidate
                        .node
                        .call_succ_index()
                        .expect("decision nodes can always call");
                    next.push(Candidate {
                        node: candidate.node.ith_succ(succ),
                        dont_fold: false,
                    });
                    reweighted.push(*weight);
                }
                Action::Bet(_) | Action::AllIn => {
                    self.split(node, i, candidate, *weight, &mut next, &mut reweighted);
                }
            }
        }
        normalize(&mut reweighted);
        (next, reweighted)
    }

    /// route one candidate's weight through a wager of size `frac`
    /// that its own menu may not offer
    fn split(
        &self,
        node: Node<'a>,
        i: usize,
        candidate: &Candidate<'a>,
        weight: f64,
        next: &mut Vec<Candidate<'a>>,
        reweighted: &mut Vec<f64>,
    ) {
        let frac = node.bet_frac(i);
        let wagers = self.wagers(&candidate.node);
        if wagers.is_empty() {
            // an all in candidate has no larger action to give
            return;
        }
        if let Some((succ, _, _)) = wagers.iter().find(|(_, _, f)| exact(*f, frac)) {
            next.push(Candidate {
                node: candidate.node.ith_succ(*succ),
                dont_fold: false,
            });
            reweighted.push(weight);
            return;
        }
        let below = wagers
            .iter()
            .filter(|(_, _, f)| *f < frac)
            .max_by(|x, y| x.2.partial_cmp(&y.2).expect("finite fraction"));
        let above = wagers
            .iter()
            .filter(|(_, _, f)| *f > frac)
            .min_by(|x, y| x.2.partial_cmp(&y.2).expect("finite fraction"));
        match (below, above) {
            (Some((lo, _, lo_frac)), Some((hi, _, hi_frac))) => {
                let p = pseudo_harmonic(*lo_frac, *hi_frac, frac);
                next.push(Candidate {
                    node: candidate.node.ith_succ(*lo),
                    dont_fold: false,
                });
                reweighted.push(weight * p);
                next.push(Candidate {
                    node: candidate.node.ith_succ(*hi),
                    dont_fold: false,
                });
                reweighted.push(weight * (1.0 - p));
            }
            (None, Some((hi, _, hi_frac))) => {
                // round down to no bet at all, with the no-bet piece
                // barred from folding later
                let p = pseudo_harmonic(0.0, *hi_frac, frac);
                let call = candidate
                    .node
                    .call_succ_index()
                    .expect("decision nodes can always call");
                next.push(Candidate {
                    node: candidate.node.ith_succ(call),
                    dont_fold: true,
                });
                reweighted.push(weight * p);
                next.push(Candidate {
                    node: candidate.node.ith_succ(*hi),
                    dont_fold: false,
                });
                reweighted.push(weight * (1.0 - p));
            }
            (Some(_), None) => {
                match wagers.iter().find(|(_, a, _)| *a == Action::AllIn) {
                    // no larger size, but the menu tops out at all in:
                    // anchor the whole candidate there
                    Some((allin, _, _)) => {
                        next.push(Candidate {
                            node: candidate.node.ith_succ(*allin),
                            dont_fold: false,
                        });
                        reweighted.push(weight);
                    }
                    None => panic!(
                        "no bet of fraction {:.3} or larger to interpolate toward at node {}",
                        frac,
                        candidate.node.nonterminal_id()
                    ),
                }
            }
            (None, None) => unreachable!("wagers checked nonempty"),
        }
    }
}

/// probability of rounding a wager of `frac` pot down to `below`
/// rather than up to `above`
fn pseudo_harmonic(below: f64, above: f64, frac: f64) -> f64 {
    ((above - frac) * (1.0 + below)) / ((above - below) * (1.0 + frac))
}

fn exact(a: f64, b: f64) -> bool {
    (a - b).abs() < BettingAbstraction::FRAC_TOLERANCE
}

fn normalize(weights: &mut [f64]) {
    let total = weights.iter().sum::<f64>();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::tree::Builder;

    fn game() -> Game {
        Game::new("toy", 3, 2, 1, vec![0, 1], 1000)
    }

    fn facing(tree: &Tree, frac: f64) -> (usize, usize) {
        // (succ index at root, nonterminal id of the responding node)
        let root = tree.root();
        let i = (0..root.num_succs())
            .find(|i| {
                !matches!(root.action(*i), Action::Fold | Action::Call)
                    && exact(root.bet_frac(*i), frac)
            })
            .expect("bet offered at root");
        (i, root.ith_succ(i).nonterminal_id())
    }

    #[test]
    fn interpolates_between_nearest_sizes() {
        let game = game();
        let ref coarse = BettingAbstraction::new("coarse", vec![vec![], vec![0.5, 1.0]], 1);
        let ref dense = BettingAbstraction::new("dense", vec![vec![], vec![0.5, 0.75, 1.0]], 1);
        let base_tree = Builder::new(&game, coarse).build(1, 200);
        let expanded = Builder::new(&game, dense).build(1, 200);
        let mut base = StrategyStore::sized(&base_tree, &[0, 2]);
        // responses to the half pot and full pot bets
        let (_, half) = facing(&base_tree, 0.5);
        let (_, full) = facing(&base_tree, 1.0);
        for holding in 0..2 {
            base.set(1, 1, half, holding, 0, 2, 1.0);
            base.set(1, 1, half, holding, 1, 2, 9.0);
            base.set(1, 1, full, holding, 0, 2, 7.0);
            base.set(1, 1, full, holding, 1, 2, 3.0);
        }
        let expander = Expander::new(&expanded, &base, 1, vec![0, 2]);
        let out = expander.expand(base_tree.root());
        // the 0.75 pot response blends the 0.5 and full pot responses
        let p = pseudo_harmonic(0.5, 1.0, 0.75);
        assert!(p > 0.0 && p < 1.0);
        let (_, mid) = facing(&expanded, 0.75);
        let call = out.value(1, 1, mid, 0, 1, 2);
        let expect = p * 0.9 + (1.0 - p) * 0.3;
        assert!((call - expect).abs() < 1e-9);
        let fold = out.value(1, 1, mid, 0, 0, 2);
        assert!((fold + call - 1.0).abs() < 1e-9);
        // sizes both menus share translate verbatim
        let (_, same) = facing(&expanded, 0.5);
        assert!((out.value(1, 1, same, 0, 1, 2) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn rounding_to_no_bet_bars_folding() {
        let game = game();
        let ref coarse = BettingAbstraction::new("coarse", vec![vec![], vec![1.0]], 1);
        let ref dense = BettingAbstraction::new("dense", vec![vec![], vec![0.25, 1.0]], 1);
        let base_tree = Builder::new(&game, coarse).build(1, 200);
        let expanded = Builder::new(&game, dense).build(1, 200);
        let mut base = StrategyStore::sized(&base_tree, &[0, 2]);
        let check = base_tree.root().ith_succ(0);
        assert!(check.player_acting() == 1);
        let (_, full) = facing(&base_tree, 1.0);
        for holding in 0..2 {
            // after a check: bet the pot 20%, check back 80%
            base.set(1, 1, check.nonterminal_id(), holding, 0, 2, 8.0);
            base.set(1, 1, check.nonterminal_id(), holding, 1, 2, 2.0);
            // facing the pot bet: fold 60%, call 40%
            base.set(1, 1, full, holding, 0, 2, 6.0);
            base.set(1, 1, full, holding, 1, 2, 4.0);
        }
        let expander = Expander::new(&expanded, &base, 1, vec![0, 2]);
        let out = expander.expand(base_tree.root());
        let p = pseudo_harmonic(0.0, 1.0, 0.25);
        let (_, quarter) = facing(&expanded, 0.25);
        // the no-bet piece may not fold, so only the piece routed to
        // the pot bet contributes to folding
        let fold = out.value(1, 1, quarter, 0, 0, 2);
        assert!((fold - (1.0 - p) * 0.6).abs() < 1e-9);
        // the no-bet piece calls with its check-back mass
        let call = out.value(1, 1, quarter, 0, 1, 2);
        assert!((call - (p * 0.8 + (1.0 - p) * 0.4)).abs() < 1e-9);
    }

    #[test]
    fn rounding_a_raise_to_a_call_rides_out_the_street() {
        let game = Game::new("toy", 3, 2, 1, vec![0, 1, 1], 1000);
        let ref coarse = BettingAbstraction::new("coarse", vec![vec![], vec![1.0], vec![]], 2);
        let ref dense = BettingAbstraction::new("dense", vec![vec![], vec![0.5, 1.0], vec![]], 2);
        let base_tree = Builder::new(&game, coarse).build(1, 200);
        let expanded = Builder::new(&game, dense).build(1, 200);
        let mut base = StrategyStore::sized(&base_tree, &[0, 5, 3]);
        // bettor's decision after bet, raise: fold 25%, call 75%
        let reraised = base_tree.root().ith_succ(1).ith_succ(2);
        assert!(reraised.player_acting() == 0);
        for holding in 0..5 {
            base.set(0, 1, reraised.nonterminal_id(), holding, 0, 2, 1.0);
            base.set(0, 1, reraised.nonterminal_id(), holding, 1, 2, 3.0);
        }
        let expander = Expander::new(&expanded, &base, 0, vec![0, 5, 3]);
        let out = expander.expand(base_tree.root());
        // the half pot raise rounds down to a call in the coarse world,
        // which closes its street; that piece can no longer fold or
        // call anything but the line it is riding
        let bet = expanded.root().ith_succ(2);
        assert!(exact(expanded.root().bet_frac(2), 1.0));
        assert!(exact(bet.bet_frac(2), 0.5));
        let half_raised = bet.ith_succ(2);
        assert!(half_raised.player_acting() == 0);
        let p = pseudo_harmonic(0.0, 1.0, 0.5);
        let fold = out.value(0, 1, half_raised.nonterminal_id(), 4, 0, 2);
        assert!((fold - (1.0 - p) * 0.25).abs() < 1e-9);
        let call = out.value(0, 1, half_raised.nonterminal_id(), 4, 1, 2);
        assert!((call - (p + (1.0 - p) * 0.75)).abs() < 1e-9);
    }

    #[test]
    #[should_panic]
    fn missing_larger_size_is_fatal() {
        let game = game();
        let ref coarse = BettingAbstraction::new("coarse", vec![vec![], vec![0.5]], 1);
        let ref dense = BettingAbstraction::new("dense", vec![vec![], vec![2.0]], 1);
        let base_tree = Builder::new(&game, coarse).build(1, 200);
        let expanded = Builder::new(&game, dense).build(1, 200);
        let base = StrategyStore::sized(&base_tree, &[0, 2]);
        Expander::new(&expanded, &base, 1, vec![0, 2]).expand(base_tree.root());
    }
}
