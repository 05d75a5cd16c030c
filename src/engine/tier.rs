use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryTier {
    Economy,
    Standard,
    Premium,
}

impl CategoryTier {
    pub const ALL: [CategoryTier; 3] = [
        CategoryTier::Economy,
        CategoryTier::Standard,
        CategoryTier::Premium,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "economy" | "econ" | "economico" | "económico" => Some(Self::Economy),
            "standard" | "std" | "estandar" | "estándar" => Some(Self::Standard),
            "premium" | "prem" => Some(Self::Premium),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryTier::Economy => "Economy",
            CategoryTier::Standard => "Standard",
            CategoryTier::Premium => "Premium",
        }
    }
}

impl fmt::Display for CategoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cost cut-offs between tiers. `economy` must be strictly below `premium`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Thresholds {
    pub economy: f64,
    pub premium: f64,
}

pub const DEFAULT_THRESHOLDS: Thresholds = Thresholds {
    economy: 20000.0,
    premium: 60000.0,
};

impl Default for Thresholds {
    fn default() -> Self {
        DEFAULT_THRESHOLDS
    }
}

impl Thresholds {
    pub fn new(economy: f64, premium: f64) -> Result<Self, String> {
        if !economy.is_finite() || !premium.is_finite() {
            return Err("thresholds must be finite numbers".to_string());
        }
        if economy < 0.0 || premium < 0.0 {
            return Err("thresholds must be non-negative".to_string());
        }
        if economy >= premium {
            return Err("economy threshold must be less than premium threshold".to_string());
        }
        Ok(Self { economy, premium })
    }
}

/// Tier for a cost. A threshold value itself belongs to the higher tier.
pub fn classify(cost: f64, thresholds: &Thresholds) -> CategoryTier {
    if cost < thresholds.economy {
        CategoryTier::Economy
    } else if cost < thresholds.premium {
        CategoryTier::Standard
    } else {
        CategoryTier::Premium
    }
}
