use super::card::Card;

/// DealIterator enumerates every n-card deal from a deck, skipping any
/// card in the dead mask. it holds a u64 bitset and walks the k-subsets
/// in colex order with Gosper's hack, so it never allocates and always
/// visits deals in the same deterministic order.
pub struct DealIterator {
    next: u64,
    dead: u64,
    deck: u32,
}

impl DealIterator {
    pub fn combinations(&self) -> usize {
        let n = self.deck as usize - (self.dead.count_ones() as usize);
        let k = self.next.count_ones() as usize;
        (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
    }

    fn exhausted(&self) -> bool {
        self.next == 0 || 64 - self.deck > self.next.leading_zeros()
    }

    /// Gosper's hack: next bit pattern with the same popcount
    fn permute(x: u64) -> u64 {
        let a = x | (x - 1);
        let b = a + 1;
        b | ((!a & b) - 1) >> (1 + x.trailing_zeros())
    }

    fn advance(&mut self) {
        loop {
            self.next = Self::permute(self.next);
            if self.next & self.dead == 0 {
                break;
            }
        }
    }
}

impl Iterator for DealIterator {
    type Item = Vec<Card>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted() {
            None
        } else {
            let mut bits = self.next;
            let mut deal = Vec::with_capacity(bits.count_ones() as usize);
            while bits > 0 {
                deal.push(Card::from(bits.trailing_zeros() as u8));
                bits &= bits - 1;
            }
            self.advance();
            Some(deal)
        }
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        let combos = self.combinations();
        (combos, Some(combos))
    }
}

/// (deal size, deck size, dead cards) decided at construction
impl From<(usize, usize, &[Card])> for DealIterator {
    fn from((n, deck, dead): (usize, usize, &[Card])) -> Self {
        assert!(deck <= 64);
        let dead = dead.iter().copied().map(u64::from).fold(0, |a, b| a | b);
        let mut this = Self {
            next: (1u64 << n) - 1,
            dead,
            deck: deck as u32,
        };
        while this.next & this.dead > 0 {
            this.next = Self::permute(this.next);
        }
        this
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_choose_two() {
        let deals = DealIterator::from((2, 5, &[][..])).collect::<Vec<_>>();
        assert!(deals.len() == 10);
        assert!(deals[0] == vec![Card::from(0), Card::from(1)]);
        assert!(deals[9] == vec![Card::from(3), Card::from(4)]);
    }

    #[test]
    fn dead_cards_skipped() {
        let ref dead = [Card::from(1), Card::from(2)];
        let deals = DealIterator::from((2, 5, &dead[..])).collect::<Vec<_>>();
        assert!(deals.len() == 3);
        for deal in deals {
            assert!(!deal.contains(&Card::from(1)));
            assert!(!deal.contains(&Card::from(2)));
        }
    }

    #[test]
    fn counts_respect_mask() {
        let ref dead = [Card::from(0)];
        let iter = DealIterator::from((3, 6, &dead[..]));
        assert!(iter.combinations() == 10); // C(5, 3)
        assert!(iter.count() == 10);
    }
}
