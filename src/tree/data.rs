use crate::Chips;

/// edge label: the action taken to reach a successor. bets carry the
/// menu fraction they were built from; a bet capped by the stack
/// becomes AllIn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Fold,
    Call,
    Bet(f64),
    AllIn,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Fold => write!(f, "fold"),
            Self::Call => write!(f, "call"),
            Self::Bet(frac) => write!(f, "bet {:.2}", frac),
            Self::AllIn => write!(f, "all in"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    Decision { player: usize },
    Fold { folded: usize },
    Showdown,
}

/// vertex payload. pot sizes use the if-called convention: a wager is
/// counted for both players the moment it is made, so the pot is the
/// amount at stake if the action in flight gets called.
#[derive(Debug, Clone)]
pub struct Data {
    street: usize,
    pot: Chips,
    kind: Kind,
    /// dense within (player, street), assigned after construction
    id: usize,
}

impl Data {
    pub fn decision(street: usize, pot: Chips, player: usize) -> Self {
        Self {
            street,
            pot,
            kind: Kind::Decision { player },
            id: 0,
        }
    }
    pub fn fold(street: usize, pot: Chips, folded: usize) -> Self {
        Self {
            street,
            pot,
            kind: Kind::Fold { folded },
            id: 0,
        }
    }
    pub fn showdown(street: usize, pot: Chips) -> Self {
        Self {
            street,
            pot,
            kind: Kind::Showdown,
            id: 0,
        }
    }

    pub fn street(&self) -> usize {
        self.street
    }
    pub fn pot(&self) -> Chips {
        self.pot
    }
    pub fn kind(&self) -> Kind {
        self.kind
    }
    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, Kind::Decision { .. })
    }
    pub fn id(&self) -> usize {
        assert!(!self.is_terminal(), "terminal nodes carry no id");
        self.id
    }
    pub fn assign(&mut self, id: usize) {
        self.id = id;
    }
}
