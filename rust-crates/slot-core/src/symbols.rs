use rand::Rng;
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

pub const REEL_COUNT: usize = 3;

/// One spin outcome, left to right.
pub type Reels = [Symbol; REEL_COUNT];

/// The fixed reel alphabet. Serialized as the key shown on the reel, so a
/// stored spin log reads `["🍎","🍎","7"]`.
#[derive(
    PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Copy, Clone, Serialize, Deserialize,
)]
pub enum Symbol {
    #[serde(rename = "🍎")]
    Apple,
    #[serde(rename = "🍊")]
    Orange,
    #[serde(rename = "🍋")]
    Lemon,
    #[serde(rename = "🔔")]
    Bell,
    #[serde(rename = "⭐")]
    Star,
    #[serde(rename = "💎")]
    Diamond,
    #[serde(rename = "7")]
    Seven,
}

impl Symbol {
    pub const ALL: [Symbol; 7] = [
        Symbol::Apple,
        Symbol::Orange,
        Symbol::Lemon,
        Symbol::Bell,
        Symbol::Star,
        Symbol::Diamond,
        Symbol::Seven,
    ];

    pub const JACKPOT: Symbol = Symbol::Seven;

    pub fn key(self) -> &'static str {
        match self {
            Symbol::Apple => "🍎",
            Symbol::Orange => "🍊",
            Symbol::Lemon => "🍋",
            Symbol::Bell => "🔔",
            Symbol::Star => "⭐",
            Symbol::Diamond => "💎",
            Symbol::Seven => "7",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|symbol| symbol.key() == key)
    }

    /// Uniform pick over the whole alphabet.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Draws every reel independently. Configured probabilities play no part here.
pub fn draw_reels<R: Rng + ?Sized>(rng: &mut R) -> Reels {
    std::array::from_fn(|_| Symbol::random(rng))
}

pub fn is_jackpot(reels: &Reels) -> bool {
    reels.iter().all(|symbol| *symbol == Symbol::JACKPOT)
}

pub fn format_reels(reels: &Reels) -> String {
    reels
        .iter()
        .map(|symbol| symbol.key())
        .collect::<Vec<_>>()
        .join(" ")
}
