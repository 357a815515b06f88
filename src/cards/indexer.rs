use super::card::Card;

/// CardIndexer canonicalizes street-segmented boards under the suit
/// permutation group. two boards that differ only by a relabeling of
/// suits are strategically identical, so we pick one representative per
/// equivalence class: the permuted image with the smallest packed key.
///
/// streets are canonicalized most-significant-first, so the canonical
/// form of a board always extends the canonical form of its prefix.
/// this is what lets the board tree number children of one canonical
/// parent contiguously.
pub struct CardIndexer {
    num_suits: u8,
    perms: Vec<Vec<u8>>,
}

impl CardIndexer {
    pub fn new(num_suits: u8) -> Self {
        Self {
            num_suits,
            perms: Self::exhaust(num_suits),
        }
    }

    /// every |S|! permutation of suit labels, built by inserting each
    /// successive suit into every position of every shorter permutation
    fn exhaust(num_suits: u8) -> Vec<Vec<u8>> {
        (0..num_suits).fold(vec![Vec::new()], |perms, suit| {
            perms
                .into_iter()
                .flat_map(|perm| {
                    (0..=perm.len()).map(move |i| {
                        let mut grown = perm.clone();
                        grown.insert(i, suit);
                        grown
                    })
                })
                .collect()
        })
    }

    /// image of one card under a suit relabeling
    fn map(&self, perm: &[u8], card: Card) -> Card {
        Card::new(
            card.rank(self.num_suits),
            perm[card.suit(self.num_suits) as usize],
            self.num_suits,
        )
    }

    /// image of a segmented board: permute every card, then restore the
    /// within-street ordering (deal order within a street carries no
    /// information, so each street is kept sorted high to low)
    fn image(&self, perm: &[u8], streets: &[Vec<Card>]) -> Vec<Vec<Card>> {
        streets
            .iter()
            .map(|street| {
                let mut cards = street.iter().map(|&c| self.map(perm, c)).collect::<Vec<_>>();
                cards.sort_by(|a, b| b.cmp(a));
                cards
            })
            .collect()
    }

    /// pack a segmented board into a u64, earliest street most significant.
    /// cards are stored as 1 + code so an absent byte is distinguishable
    /// from card 0. boards of up to 8 cards fit.
    pub fn pack(streets: &[Vec<Card>]) -> u64 {
        let n: usize = streets.iter().map(|s| s.len()).sum();
        assert!(n <= 8, "board too large to pack: {} cards", n);
        streets
            .iter()
            .flat_map(|street| street.iter())
            .fold(0u64, |acc, &card| acc << 8 | (1 + u8::from(card) as u64))
    }

    /// canonical representative and its packed key
    pub fn canonize(&self, streets: &[Vec<Card>]) -> (Vec<Vec<Card>>, u64) {
        self.perms
            .iter()
            .map(|perm| self.image(perm, streets))
            .map(|image| (Self::pack(&image), image))
            .min_by_key(|(key, _)| *key)
            .map(|(key, image)| (image, key))
            .expect("at least the identity permutation")
    }

    /// canonical key alone, when the representative cards are not needed
    pub fn key(&self, streets: &[Vec<Card>]) -> u64 {
        self.canonize(streets).1
    }

    /// number of raw boards collapsing onto this board's canonical class,
    /// i.e. the size of its orbit under suit relabeling
    pub fn num_variants(&self, streets: &[Vec<Card>]) -> usize {
        let mut keys = self
            .perms
            .iter()
            .map(|perm| Self::pack(&self.image(perm, streets)))
            .collect::<Vec<_>>();
        keys.sort();
        keys.dedup();
        keys.len()
    }

    /// which suits remain interchangeable given this board: suits i and j
    /// share a group when swapping them leaves the board unchanged street
    /// by street. each suit maps to the smallest suit in its group.
    pub fn suit_groups(&self, streets: &[Vec<Card>]) -> Vec<u8> {
        let identity = Self::pack(&self.image(&self.identity(), streets));
        let mut groups = (0..self.num_suits).collect::<Vec<u8>>();
        for i in 0..self.num_suits {
            for j in 0..i {
                let mut swap = self.identity();
                swap.swap(i as usize, j as usize);
                if Self::pack(&self.image(&swap, streets)) == identity {
                    groups[i as usize] = groups[j as usize];
                    break;
                }
            }
        }
        groups
    }

    fn identity(&self) -> Vec<u8> {
        (0..self.num_suits).collect()
    }

    pub fn num_suits(&self) -> u8 {
        self.num_suits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(rank: u8, suit: u8) -> Card {
        Card::new(rank, suit, 4)
    }

    #[test]
    fn permutation_count() {
        assert!(CardIndexer::new(2).perms.len() == 2);
        assert!(CardIndexer::new(3).perms.len() == 6);
        assert!(CardIndexer::new(4).perms.len() == 24);
    }

    #[test]
    fn canonical_is_orbit_minimum() {
        let indexer = CardIndexer::new(4);
        // same ranks, different suit labelings, one class
        let ref a = vec![vec![card(5, 0), card(3, 2)]];
        let ref b = vec![vec![card(5, 3), card(3, 1)]];
        assert!(indexer.key(a) == indexer.key(b));
    }

    #[test]
    fn distinct_rank_structures_stay_distinct() {
        let indexer = CardIndexer::new(4);
        // suited vs offsuit boards are different classes
        let ref suited = vec![vec![card(5, 0), card(3, 0)]];
        let ref offsuit = vec![vec![card(5, 0), card(3, 1)]];
        assert!(indexer.key(suited) != indexer.key(offsuit));
    }

    #[test]
    fn orbit_counts() {
        let indexer = CardIndexer::new(2);
        // one card: both suits collapse, orbit of 2
        let ref single = vec![vec![Card::new(1, 0, 2)]];
        assert!(indexer.num_variants(single) == 2);
        // a rank pair uses both suits symmetrically, orbit of 1
        let ref pair = vec![vec![Card::new(1, 0, 2), Card::new(1, 1, 2)]];
        assert!(indexer.num_variants(pair) == 1);
    }

    #[test]
    fn street_segmentation_matters() {
        // cards sort within a street but never across streets, so the
        // same multiset dealt in a different order is a different board
        let ref together = vec![vec![card(5, 0), card(3, 0)]];
        let ref apart = vec![vec![card(3, 0)], vec![card(5, 0)]];
        assert!(CardIndexer::pack(together) != CardIndexer::pack(apart));
    }

    #[test]
    fn suit_groups_on_empty_board() {
        let indexer = CardIndexer::new(4);
        // nothing dealt: all four suits interchangeable
        assert!(indexer.suit_groups(&[vec![]]) == vec![0, 0, 0, 0]);
    }

    #[test]
    fn suit_groups_after_deal() {
        let indexer = CardIndexer::new(4);
        // one suit pinned by the board, other three interchangeable
        let groups = indexer.suit_groups(&[vec![card(5, 0)]]);
        assert!(groups[0] == 0);
        assert!(groups[1] == 1);
        assert!(groups[2] == 1);
        assert!(groups[3] == 1);
    }
}
