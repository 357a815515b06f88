use crate::Chips;
use crate::board::BoardTree;
use crate::strategy::StrategyStore;
use crate::tree::Node;
use crate::tree::Tree;

/// per-board resolved strategies for the subtrees hanging below the
/// merge frontier. implementations typically read them off disk, one
/// solve per target street board.
pub trait EndgameSource {
    /// strategy for one board's standalone subtree, shaped to it
    fn resolve(&self, board: usize, subtree: &Tree) -> anyhow::Result<StrategyStore>;
}

/// Assembler merges a coarse whole-game strategy with finer per-board
/// endgame strategies. the output keeps the base strategy verbatim
/// everywhere above the frontier, and below any frontier node (target
/// street reached with the pot at or past the threshold) each board's
/// resolved strategy overwrites the board's slice of the rows.
///
/// base and merged trees must correspond positionally: successor i of
/// a base node is successor i of the matching merged node, anywhere
/// the walk descends both at once.
pub struct Assembler<'a> {
    base_tree: &'a Tree,
    merged_tree: &'a Tree,
    base: &'a StrategyStore,
    boards: &'a BoardTree,
    target_street: usize,
    pot_threshold: Chips,
}

impl<'a> Assembler<'a> {
    pub fn new(
        base_tree: &'a Tree,
        merged_tree: &'a Tree,
        base: &'a StrategyStore,
        boards: &'a BoardTree,
        target_street: usize,
        pot_threshold: Chips,
    ) -> Self {
        assert!(target_street <= boards.game().max_street());
        Self {
            base_tree,
            merged_tree,
            base,
            boards,
            target_street,
            pot_threshold,
        }
    }

    /// rows per board on a merged street at or past the frontier
    fn rows_per_board(&self, street: usize) -> usize {
        let holdings = self.base.num_holdings(0, street);
        let boards = self.boards.num_boards(self.target_street);
        assert!(
            holdings % boards == 0,
            "street {} rows ({}) do not split across {} boards",
            street,
            holdings,
            boards
        );
        holdings / boards
    }

    pub fn assemble(&self, source: &dyn EndgameSource) -> anyhow::Result<StrategyStore> {
        let game = self.boards.game();
        let holdings = (0..=game.max_street())
            .map(|street| self.base.num_holdings(0, street))
            .collect::<Vec<usize>>();
        let mut merged = StrategyStore::sized(self.merged_tree, &holdings);
        self.copy(self.base_tree.root(), self.merged_tree.root(), &mut merged);
        self.walk(
            self.base_tree.root(),
            self.merged_tree.root(),
            &mut merged,
            source,
        )?;
        Ok(merged)
    }

    /// verbatim base copy, descending as far as the two trees stay
    /// positionally identical
    fn copy(&self, base: Node<'_>, merged: Node<'_>, out: &mut StrategyStore) {
        if base.is_terminal() || merged.is_terminal() {
            return;
        }
        if base.num_succs() != merged.num_succs() {
            // shapes diverge below the frontier where resolving will
            // overwrite anyway
            return;
        }
        let n = base.num_succs();
        let (player, street) = (base.player_acting(), base.street());
        for holding in 0..self.base.num_holdings(player, street) {
            for succ in 0..n {
                let x = self
                    .base
                    .value(player, street, base.nonterminal_id(), holding, succ, n);
                out.set(
                    player,
                    street,
                    merged.nonterminal_id(),
                    holding,
                    succ,
                    n,
                    x,
                );
            }
        }
        for i in 0..n {
            self.copy(base.ith_succ(i), merged.ith_succ(i), out);
        }
    }

    fn walk(
        &self,
        base: Node<'_>,
        merged: Node<'_>,
        out: &mut StrategyStore,
        source: &dyn EndgameSource,
    ) -> anyhow::Result<()> {
        if merged.is_terminal() {
            return Ok(());
        }
        if merged.street() == self.target_street && merged.pot_size() >= self.pot_threshold {
            return self.merge(merged, out, source);
        }
        assert!(
            base.num_succs() == merged.num_succs(),
            "trees diverge above the frontier at street {} pot {}",
            merged.street(),
            merged.pot_size()
        );
        for i in 0..merged.num_succs() {
            self.walk(base.ith_succ(i), merged.ith_succ(i), out, source)?;
        }
        Ok(())
    }

    /// overwrite everything below one frontier node, board by board
    fn merge(
        &self,
        merged: Node<'_>,
        out: &mut StrategyStore,
        source: &dyn EndgameSource,
    ) -> anyhow::Result<()> {
        log::info!(
            "{:<32}{:<32}",
            "merging endgames below node",
            merged.nonterminal_id()
        );
        let subtree = self.merged_tree.subtree(merged.index());
        for board in 0..self.boards.num_boards(self.target_street) {
            let endgame = source.resolve(board, &subtree)?;
            self.graft(subtree.root(), merged, &endgame, board, out);
        }
        Ok(())
    }

    /// write one board's resolved values over its slice of the rows
    fn graft(
        &self,
        resolved: Node<'_>,
        merged: Node<'_>,
        endgame: &StrategyStore,
        board: usize,
        out: &mut StrategyStore,
    ) {
        if merged.is_terminal() {
            return;
        }
        let n = merged.num_succs();
        let (player, street) = (merged.player_acting(), merged.street());
        let rows = self.rows_per_board(street);
        assert!(
            endgame.num_holdings(player, street) == rows,
            "endgame shaped for {} rows, frontier expects {}",
            endgame.num_holdings(player, street),
            rows
        );
        for row in 0..rows {
            for succ in 0..n {
                let x = endgame.value(player, street, resolved.nonterminal_id(), row, succ, n);
                out.set(
                    player,
                    street,
                    merged.nonterminal_id(),
                    board * rows + row,
                    succ,
                    n,
                    x,
                );
            }
        }
        for i in 0..n {
            self.graft(resolved.ith_succ(i), merged.ith_succ(i), endgame, board, out);
        }
    }
}
