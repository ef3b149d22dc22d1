use serde::{
    Deserialize,
    Serialize,
};

pub const DEFAULT_SPIN_COST: f64 = 10.0;
pub const DEFAULT_INITIAL_BALANCE: f64 = 100.0;

/// Payout multipliers, applied to the spin cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payouts {
    pub jackpot: f64,
    pub three_match: f64,
    pub two_match: f64,
}

/// Advertised odds in percent. Shown to operators only; reel draws stay
/// uniform whatever these say.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probabilities {
    pub jackpot: f64,
    pub three_match: f64,
    pub two_match: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub spin_cost: f64,
    pub payouts: Payouts,
    pub probabilities: Probabilities,
    pub initial_balance: f64,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            spin_cost: DEFAULT_SPIN_COST,
            payouts: Payouts {
                jackpot: 100.0,
                three_match: 10.0,
                two_match: 2.0,
            },
            probabilities: Probabilities {
                jackpot: 1.0,
                three_match: 10.0,
                two_match: 25.0,
            },
            initial_balance: DEFAULT_INITIAL_BALANCE,
        }
    }
}

impl GameSettings {
    pub fn jackpot_prize(&self) -> f64 {
        self.spin_cost * self.payouts.jackpot
    }

    pub fn three_match_prize(&self) -> f64 {
        self.spin_cost * self.payouts.three_match
    }

    pub fn two_match_prize(&self) -> f64 {
        self.spin_cost * self.payouts.two_match
    }
}

/// Partial update from the admin surface. Unset fields keep their value.
/// Finite values are stored as given, without range checks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsPatch {
    pub spin_cost: Option<f64>,
    pub jackpot_payout: Option<f64>,
    pub three_match_payout: Option<f64>,
    pub two_match_payout: Option<f64>,
    pub jackpot_probability: Option<f64>,
    pub three_match_probability: Option<f64>,
    pub two_match_probability: Option<f64>,
    pub initial_balance: Option<f64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }

    /// Name of the first field holding NaN or an infinity, which JSON cannot
    /// carry.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("spin cost", self.spin_cost),
            ("jackpot payout", self.jackpot_payout),
            ("three match payout", self.three_match_payout),
            ("two match payout", self.two_match_payout),
            ("jackpot probability", self.jackpot_probability),
            ("three match probability", self.three_match_probability),
            ("two match probability", self.two_match_probability),
            ("initial balance", self.initial_balance),
        ]
        .into_iter()
        .find(|(_, value)| value.is_some_and(|value| !value.is_finite()))
        .map(|(name, _)| name)
    }

    pub fn apply(&self, settings: &mut GameSettings) {
        let fields = [
            (self.spin_cost, &mut settings.spin_cost),
            (self.jackpot_payout, &mut settings.payouts.jackpot),
            (self.three_match_payout, &mut settings.payouts.three_match),
            (self.two_match_payout, &mut settings.payouts.two_match),
            (self.jackpot_probability, &mut settings.probabilities.jackpot),
            (
                self.three_match_probability,
                &mut settings.probabilities.three_match,
            ),
            (
                self.two_match_probability,
                &mut settings.probabilities.two_match,
            ),
            (self.initial_balance, &mut settings.initial_balance),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}
