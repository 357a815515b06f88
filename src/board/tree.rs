use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::cards::card::Card;
use crate::cards::deal::DealIterator;
use crate::cards::indexer::CardIndexer;
use crate::game::Game;

/// one canonical board class at some street
struct Board {
    /// canonical cards segmented by street, streets 1 ..= this one
    streets: Vec<Vec<Card>>,
    /// canonical key, unique within a street
    key: u64,
    /// index of the canonical parent one street back
    parent: usize,
    /// raw one-card-sequence extensions of the canonical parent
    /// that land in this class
    variants: usize,
    /// raw full deal sequences that collapse into this class,
    /// i.e. parent count times variants
    count: usize,
    /// suit interchangeability classes given this board
    groups: Vec<u8>,
}

/// BoardTree enumerates every canonical board of every street up front,
/// exactly once, and gives them dense indices. children of a canonical
/// parent occupy a contiguous index range on the next street, which is
/// what lets strategy tables store per-board rows back to back and walk
/// them with plain offset arithmetic.
///
/// `variants` and `count` carry the raw deal multiplicities collapsed
/// into each class so downstream averaging can weight boards by how
/// often they actually come up.
///
/// the reverse lookup table and the predecessor table are built on
/// demand with build_lookup and build_preds. construction order is
/// new -> build_* -> share, typically behind an Arc once no &mut is
/// needed anymore.
pub struct BoardTree {
    game: Game,
    indexer: CardIndexer,
    /// boards[street][index]
    boards: Vec<Vec<Board>>,
    /// succs[street][index][target - street - 1] = index range at target street
    succs: Vec<Vec<Vec<(usize, usize)>>>,
    /// canonical key -> board index, per street
    lookup: Option<Vec<HashMap<u64, usize>>>,
    /// preds[final street index][street] = ancestor index
    preds: Option<Vec<Vec<usize>>>,
}

impl BoardTree {
    pub fn new(game: &Game) -> Self {
        let indexer = CardIndexer::new(game.num_suits());
        let mut boards = Vec::with_capacity(game.max_street() + 1);
        let mut childs = Vec::with_capacity(game.max_street());
        boards.push(vec![Board {
            groups: indexer.suit_groups(&[]),
            streets: vec![],
            key: 0,
            parent: 0,
            variants: 1,
            count: 1,
        }]);
        for street in 1..=game.max_street() {
            let mut level = Vec::new();
            let mut ranges = Vec::with_capacity(boards[street - 1].len());
            for parent in 0..boards[street - 1].len() {
                let begin = level.len();
                let ref prior = boards[street - 1][parent];
                let ref dead = prior.streets.iter().flatten().copied().collect::<Vec<Card>>();
                let deals = DealIterator::from((
                    game.num_cards_for_street(street),
                    game.deck_size(),
                    dead.as_slice(),
                ));
                let mut classes = BTreeMap::<u64, (Vec<Vec<Card>>, usize)>::new();
                for deal in deals {
                    let mut streets = prior.streets.clone();
                    streets.push(deal);
                    let (canon, key) = indexer.canonize(&streets);
                    classes.entry(key).and_modify(|c| c.1 += 1).or_insert((canon, 1));
                }
                let count = prior.count;
                for (key, (canon, variants)) in classes {
                    level.push(Board {
                        groups: indexer.suit_groups(&canon),
                        count: count * variants,
                        streets: canon,
                        key,
                        parent,
                        variants,
                    });
                }
                ranges.push((begin, level.len()));
            }
            log::info!("{:<32}{:<32}", format!("enumerated street {}", street), level.len());
            childs.push(ranges);
            boards.push(level);
        }
        let succs = boards
            .iter()
            .enumerate()
            .map(|(street, level)| {
                (0..level.len())
                    .map(|index| {
                        let mut range = (index, index + 1);
                        (street..game.max_street())
                            .map(|t| {
                                range = (childs[t][range.0].0, childs[t][range.1 - 1].1);
                                range
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        Self {
            game: game.clone(),
            indexer,
            boards,
            succs,
            lookup: None,
            preds: None,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }
    pub fn num_boards(&self, street: usize) -> usize {
        self.boards[street].len()
    }
    /// canonical cards in deal order, flattened across streets
    pub fn board(&self, street: usize, index: usize) -> Vec<Card> {
        self.boards[street][index]
            .streets
            .iter()
            .flatten()
            .copied()
            .collect()
    }
    pub fn suit_groups(&self, street: usize, index: usize) -> &[u8] {
        &self.boards[street][index].groups
    }
    /// raw extensions of the canonical parent collapsing into this board
    pub fn num_variants(&self, street: usize, index: usize) -> usize {
        self.boards[street][index].variants
    }
    /// raw full deal sequences collapsing into this board
    pub fn board_count(&self, street: usize, index: usize) -> usize {
        self.boards[street][index].count
    }
    /// raw deal sequences across the whole street
    pub fn raw_boards(&self, street: usize) -> usize {
        self.boards[street].iter().map(|b| b.count).sum()
    }

    /// contiguous index range at `target` street reachable from this board
    pub fn succ_range(&self, street: usize, index: usize, target: usize) -> (usize, usize) {
        assert!(street <= target, "no successors on earlier streets");
        match target - street {
            0 => (index, index + 1),
            gap => self.succs[street][index][gap - 1],
        }
    }

    pub fn build_lookup(&mut self) {
        self.lookup = Some(
            self.boards
                .iter()
                .map(|level| {
                    level
                        .iter()
                        .enumerate()
                        .map(|(index, board)| (board.key, index))
                        .collect()
                })
                .collect(),
        );
    }

    /// canonical index of any raw board, given its cards in deal order
    pub fn lookup_board(&self, cards: &[Card], street: usize) -> usize {
        assert!(cards.len() == self.game.num_board_cards(street));
        let ref lookup = self.lookup.as_ref().expect("build_lookup before lookup_board")[street];
        let mut streets = Vec::with_capacity(street);
        let mut taken = 0;
        for st in 1..=street {
            let n = self.game.num_cards_for_street(st);
            streets.push(cards[taken..taken + n].to_vec());
            taken += n;
        }
        lookup[&self.indexer.key(&streets)]
    }

    pub fn build_preds(&mut self) {
        let max = self.game.max_street();
        self.preds = Some(
            (0..self.boards[max].len())
                .map(|index| {
                    let mut chain = vec![0; max + 1];
                    let mut at = index;
                    for street in (0..=max).rev() {
                        chain[street] = at;
                        at = self.boards[street][at].parent;
                    }
                    chain
                })
                .collect(),
        );
    }

    /// ancestor of a final-street board at any earlier street
    pub fn pred_board(&self, index: usize, street: usize) -> usize {
        self.preds.as_ref().expect("build_preds before pred_board")[index][street]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Game {
        Game::new("toy", 3, 2, 1, vec![0, 1, 1], 100)
    }

    #[test]
    fn counts_collapse_correctly() {
        let tree = BoardTree::new(&toy());
        // 6 raw single cards collapse into 3 rank classes
        assert!(tree.num_boards(0) == 1);
        assert!(tree.num_boards(1) == 3);
        assert!(tree.raw_boards(1) == 6);
        assert!((0..3).all(|b| tree.board_count(1, b) == 2));
        // second street pins both suits, no further collapsing
        assert!(tree.num_boards(2) == 15);
        assert!(tree.raw_boards(2) == 6 * 5);
        assert!((0..15).all(|b| tree.num_variants(2, b) == 1));
    }

    #[test]
    fn succ_ranges_partition_the_street() {
        let tree = BoardTree::new(&toy());
        assert!(tree.succ_range(0, 0, 2) == (0, 15));
        assert!(tree.succ_range(1, 1, 1) == (1, 2));
        let mut at = 0;
        for b in 0..tree.num_boards(1) {
            let (begin, end) = tree.succ_range(1, b, 2);
            assert!(begin == at);
            assert!(end > begin);
            at = end;
        }
        assert!(at == tree.num_boards(2));
    }

    #[test]
    fn children_inherit_mass() {
        let tree = BoardTree::new(&toy());
        for b in 0..tree.num_boards(1) {
            let (begin, end) = tree.succ_range(1, b, 2);
            let mass = (begin..end).map(|c| tree.board_count(2, c)).sum::<usize>();
            // 5 live cards extend each of the parent's raw variants
            assert!(mass == tree.board_count(1, b) * 5);
        }
    }

    #[test]
    fn lookup_collapses_suits() {
        let mut tree = BoardTree::new(&toy());
        tree.build_lookup();
        let ref spade = [Card::new(1, 0, 2)];
        let ref heart = [Card::new(1, 1, 2)];
        assert!(tree.lookup_board(spade, 1) == tree.lookup_board(heart, 1));
        let ref offsuit = [Card::new(1, 0, 2), Card::new(2, 1, 2)];
        let ref suited = [Card::new(1, 1, 2), Card::new(2, 0, 2)];
        assert!(tree.lookup_board(offsuit, 2) == tree.lookup_board(suited, 2));
    }

    #[test]
    fn preds_invert_succ_ranges() {
        let mut tree = BoardTree::new(&toy());
        tree.build_preds();
        for b in 0..tree.num_boards(1) {
            let (begin, end) = tree.succ_range(1, b, 2);
            assert!((begin..end).all(|c| tree.pred_board(c, 1) == b));
        }
        assert!((0..tree.num_boards(2)).all(|c| tree.pred_board(c, 0) == 0));
        assert!((0..tree.num_boards(2)).all(|c| tree.pred_board(c, 2) == c));
    }
}
