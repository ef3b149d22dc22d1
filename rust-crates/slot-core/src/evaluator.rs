use crate::{
    settings::GameSettings,
    symbols::{
        REEL_COUNT,
        Reels,
        Symbol,
        is_jackpot,
    },
};
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone, Serialize, Deserialize)]
pub enum MatchTier {
    Jackpot,
    ThreeMatch,
    TwoMatch,
    NoMatch,
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchTier::Jackpot => "Jackpot",
            MatchTier::ThreeMatch => "Three Match",
            MatchTier::TwoMatch => "Two Match",
            MatchTier::NoMatch => "No Match",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub tier: MatchTier,
    pub prize: f64,
    pub message: String,
}

/// Match tier of a drawn outcome. Jackpot is checked before the generic
/// three-of-a-kind rule, which would otherwise also match three 7s.
pub fn classify(reels: &Reels) -> MatchTier {
    if is_jackpot(reels) {
        return MatchTier::Jackpot;
    }
    let counts = reels.iter().counts();
    if counts.values().any(|count| *count == REEL_COUNT) {
        MatchTier::ThreeMatch
    } else if counts.values().any(|count| *count == 2) {
        MatchTier::TwoMatch
    } else {
        MatchTier::NoMatch
    }
}

pub fn evaluate(reels: &Reels, settings: &GameSettings) -> SpinOutcome {
    let tier = classify(reels);
    let (prize, message) = match tier {
        MatchTier::Jackpot => {
            let prize = settings.jackpot_prize();
            (prize, format!("🎰 JACKPOT! Three 7s! You won ${prize}!"))
        }
        MatchTier::ThreeMatch => {
            let prize = settings.three_match_prize();
            (prize, format!("✨ Three of a kind! You won ${prize}!"))
        }
        MatchTier::TwoMatch => {
            let prize = settings.two_match_prize();
            (prize, format!("✨ Two of a kind! You won ${prize}!"))
        }
        MatchTier::NoMatch => (0.0, "No match. Try again!".to_string()),
    };
    SpinOutcome {
        tier,
        prize,
        message,
    }
}

/// Real per-tier odds for uniform, independent reels, as fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierOdds {
    pub jackpot: f64,
    pub three_match: f64,
    pub two_match: f64,
    pub no_match: f64,
}

impl TierOdds {
    pub fn for_uniform_reels() -> Self {
        let n = Symbol::ALL.len() as f64;
        let total = n * n * n;
        TierOdds {
            jackpot: 1.0 / total,
            three_match: (n - 1.0) / total,
            two_match: 3.0 * n * (n - 1.0) / total,
            no_match: n * (n - 1.0) * (n - 2.0) / total,
        }
    }

    /// Expected prize per spin divided by spin cost.
    pub fn return_to_player(&self, settings: &GameSettings) -> f64 {
        self.jackpot * settings.payouts.jackpot
            + self.three_match * settings.payouts.three_match
            + self.two_match * settings.payouts.two_match
    }
}
