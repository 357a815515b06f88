use serde::Deserialize;

/// per-street bucketing choice. a street may opt out of abstraction
/// entirely, in which case raw hand indices stand in for bucket ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucketing {
    None,
    Named(String),
}

impl Bucketing {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
    pub fn name(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Named(name) => name,
        }
    }
}

/// a named card abstraction: which bucketing each street uses.
/// the name participates in every artifact path derived from it.
#[derive(Debug, Clone, Deserialize)]
pub struct CardAbstraction {
    name: String,
    bucketings: Vec<Bucketing>,
}

impl CardAbstraction {
    pub fn new(name: &str, bucketings: Vec<Bucketing>) -> Self {
        Self {
            name: name.to_string(),
            bucketings,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn bucketing(&self, street: usize) -> &Bucketing {
        &self.bucketings[street]
    }
}

/// a named betting abstraction: the menu of bet fractions offered on
/// each street, plus the raise cap that keeps trees finite.
#[derive(Debug, Clone, Deserialize)]
pub struct BettingAbstraction {
    name: String,
    /// allowed bet sizes as fractions of the pot, per street
    bet_fracs: Vec<Vec<f64>>,
    /// maximum number of bets (open + raises) per street
    max_bets: usize,
}

impl BettingAbstraction {
    /// two bet fractions within this of each other are the same size.
    /// empirically chosen; see the translation layer.
    pub const FRAC_TOLERANCE: f64 = 0.001;

    pub fn new(name: &str, bet_fracs: Vec<Vec<f64>>, max_bets: usize) -> Self {
        for street in &bet_fracs {
            for pair in street.windows(2) {
                assert!(pair[0] < pair[1], "bet fractions sorted ascending");
            }
        }
        Self {
            name: name.to_string(),
            bet_fracs,
            max_bets,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn bet_fracs(&self, street: usize) -> &[f64] {
        &self.bet_fracs[street]
    }
    pub fn max_bets(&self) -> usize {
        self.max_bets
    }
}

/// a named CFR configuration. the solver itself lives upstream; we only
/// carry the name (a path component) and the iteration being read.
#[derive(Debug, Clone, Deserialize)]
pub struct CfrConfig {
    name: String,
}

impl CfrConfig {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
}
