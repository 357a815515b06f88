use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::path::Path;

use super::values::Values;
use crate::Probability;
use crate::tree::Tree;

/// slack over 1.0 before a probability is declared corrupt
const PROBABILITY_SLACK: f64 = 1e-6;

struct Table {
    /// first value index per nonterminal id
    offsets: Vec<usize>,
    /// rows per action column: bucket count, raw hand count, or
    /// board times bucket for merged suffixes
    holdings: usize,
    values: Values,
}

/// StrategyStore is the accumulated-strategy (sumprob) table: one
/// dense array per (player, street), rows keyed by nonterminal id and
/// holding, columns by successor index. values normalize to action
/// probabilities on read; rows that never accumulated mass resolve to
/// the node's default successor.
pub struct StrategyStore {
    tables: Vec<Vec<Table>>,
}

impl StrategyStore {
    /// zeroed Doubles shaped to a tree, with the per-street holdings
    /// row count chosen by the caller
    pub fn sized(tree: &Tree, holdings: &[usize]) -> Self {
        let tables = (0..2)
            .map(|player| {
                holdings
                    .iter()
                    .enumerate()
                    .map(|(street, rows)| {
                        let n = tree.num_nonterminals(player, street);
                        let mut succs = vec![0usize; n];
                        for node in tree
                            .all()
                            .filter(|node| !node.is_terminal())
                            .filter(|node| node.player_acting() == player)
                            .filter(|node| node.street() == street)
                        {
                            succs[node.nonterminal_id()] = node.num_succs();
                        }
                        let mut offsets = Vec::with_capacity(n);
                        let mut total = 0;
                        for count in succs {
                            offsets.push(total);
                            total += rows * count;
                        }
                        Table {
                            offsets,
                            holdings: *rows,
                            values: Values::zeros(total),
                        }
                    })
                    .collect()
            })
            .collect();
        Self { tables }
    }

    pub fn num_holdings(&self, player: usize, street: usize) -> usize {
        self.tables[player][street].holdings
    }

    fn index(table: &Table, node_id: usize, holding: usize, succ: usize, num_succs: usize) -> usize {
        assert!(holding < table.holdings && succ < num_succs);
        table.offsets[node_id] + holding * num_succs + succ
    }

    pub fn value(
        &self,
        player: usize,
        street: usize,
        node_id: usize,
        holding: usize,
        succ: usize,
        num_succs: usize,
    ) -> f64 {
        let ref table = self.tables[player][street];
        table.values.value(Self::index(table, node_id, holding, succ, num_succs))
    }

    pub fn set(
        &mut self,
        player: usize,
        street: usize,
        node_id: usize,
        holding: usize,
        succ: usize,
        num_succs: usize,
        x: f64,
    ) {
        let ref mut table = self.tables[player][street];
        let i = Self::index(table, node_id, holding, succ, num_succs);
        table.values.set(i, x);
    }

    pub fn add(
        &mut self,
        player: usize,
        street: usize,
        node_id: usize,
        holding: usize,
        succ: usize,
        num_succs: usize,
        x: f64,
    ) {
        let ref mut table = self.tables[player][street];
        let i = Self::index(table, node_id, holding, succ, num_succs);
        table.values.add(i, x);
    }

    /// normalized action probability for one (holding, successor).
    /// rows with no accumulated mass put everything on the default
    /// successor.
    pub fn probability(
        &self,
        player: usize,
        street: usize,
        node_id: usize,
        holding: usize,
        succ: usize,
        num_succs: usize,
        default_succ: usize,
    ) -> Probability {
        let ref table = self.tables[player][street];
        let base = Self::index(table, node_id, holding, 0, num_succs);
        let sum = (0..num_succs).map(|s| table.values.value(base + s)).sum::<f64>();
        if sum <= 0.0 {
            return if succ == default_succ { 1.0 } else { 0.0 };
        }
        let p = table.values.value(base + succ) / sum;
        assert!(
            p <= 1.0 + PROBABILITY_SLACK,
            "corrupt accumulator at player {} street {} node {}: {}",
            player,
            street,
            node_id,
            p
        );
        p
    }

    pub fn save(&self, path: &Path, player: usize) -> anyhow::Result<()> {
        log::info!("{:<32}{:<32}", "saving strategy", path.display());
        let mut writer = BufWriter::new(File::create(path)?);
        for table in self.tables[player].iter() {
            table.values.save(&mut writer)?;
        }
        Ok(())
    }

    /// replace one player's tables from disk. the stored lengths must
    /// match what the tree and holdings imply, anything else means the
    /// file was trained against a different shape.
    pub fn load(&mut self, path: &Path, player: usize) -> anyhow::Result<()> {
        log::info!("{:<32}{:<32}", "loading strategy", path.display());
        let mut reader = BufReader::new(File::open(path)?);
        for (street, table) in self.tables[player].iter_mut().enumerate() {
            let values = Values::load(&mut reader)?;
            assert!(
                values.len() == table.values.len(),
                "strategy size mismatch at player {} street {}: {} stored, {} expected",
                player,
                street,
                values.len(),
                table.values.len()
            );
            table.values = values;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BettingAbstraction;
    use crate::game::Game;
    use crate::tree::Builder;

    fn tree() -> Tree {
        let game = Game::new("toy", 3, 2, 1, vec![0, 1], 100);
        let ref betting = BettingAbstraction::new("flat", vec![vec![], vec![1.0]], 1);
        Builder::new(&game, betting).build(1, 10)
    }

    #[test]
    fn rows_normalize_to_probabilities() {
        let tree = tree();
        let mut store = StrategyStore::sized(&tree, &[0, 3]);
        let root = tree.root();
        let (player, id, n) = (root.player_acting(), root.nonterminal_id(), root.num_succs());
        store.set(player, 1, id, 0, 0, n, 30.0);
        store.set(player, 1, id, 0, 1, n, 10.0);
        let p = store.probability(player, 1, id, 0, 0, n, root.default_succ_index());
        assert!((p - 0.75).abs() < 1e-12);
    }

    #[test]
    fn empty_rows_fall_back_to_default_succ() {
        let tree = tree();
        let store = StrategyStore::sized(&tree, &[0, 3]);
        let root = tree.root();
        let (player, id, n) = (root.player_acting(), root.nonterminal_id(), root.num_succs());
        let default = root.default_succ_index();
        assert!(store.probability(player, 1, id, 1, default, n, default) == 1.0);
        assert!(store.probability(player, 1, id, 1, 1 - default, n, default) == 0.0);
    }

    #[test]
    fn survives_disk() {
        let ref path = std::env::temp_dir().join("endgame.strategy.roundtrip");
        let tree = tree();
        let mut store = StrategyStore::sized(&tree, &[0, 3]);
        let root = tree.root();
        let (player, id, n) = (root.player_acting(), root.nonterminal_id(), root.num_succs());
        store.set(player, 1, id, 2, 1, n, 42.5);
        store.save(path, player).unwrap();
        let mut read = StrategyStore::sized(&tree, &[0, 3]);
        read.load(path, player).unwrap();
        assert!(read.value(player, 1, id, 2, 1, n) == 42.5);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    #[should_panic]
    fn shape_mismatch_is_fatal() {
        let ref path = std::env::temp_dir().join("endgame.strategy.mismatch");
        let tree = tree();
        let store = StrategyStore::sized(&tree, &[0, 3]);
        store.save(path, 0).unwrap();
        let mut other = StrategyStore::sized(&tree, &[0, 5]);
        let outcome = other.load(path, 0);
        std::fs::remove_file(path).ok();
        outcome.unwrap();
    }
}
