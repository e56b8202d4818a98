//! Grit/Veil prevention arithmetic.

use serde::{Deserialize, Serialize};

use crate::core::types::{Pools, PreventionBreakdown};

/// Points of Grit (Veil) spent per point of Damage (Risk) prevented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreventionRatios {
    pub grit_per_damage: u32,
    pub veil_per_risk: u32,
}

impl Default for PreventionRatios {
    fn default() -> Self {
        Self {
            grit_per_damage: 2,
            veil_per_risk: 2,
        }
    }
}

/// Apply prevention with the standard 2:1 ratios.
pub fn prevent(pools: &Pools) -> (Pools, PreventionBreakdown) {
    prevent_with(pools, PreventionRatios::default())
}

/// Apply prevention with explicit ratios.
///
/// Only positive Damage/Risk is reduced, and never below zero. The returned
/// pools keep the accumulated Grit/Veil; what is left after consumption is
/// reported in the breakdown.
pub fn prevent_with(pools: &Pools, ratios: PreventionRatios) -> (Pools, PreventionBreakdown) {
    let (damage_prevented, grit_consumed) = offset(pools.damage, pools.grit, ratios.grit_per_damage);
    let (risk_prevented, veil_consumed) = offset(pools.risk, pools.veil, ratios.veil_per_risk);

    let breakdown = PreventionBreakdown {
        damage_prevented,
        grit_consumed,
        grit_remaining: pools.grit - grit_consumed,
        risk_prevented,
        veil_consumed,
        veil_remaining: pools.veil - veil_consumed,
    };
    let finals = Pools {
        damage: pools.damage - damage_prevented,
        risk: pools.risk - risk_prevented,
        ..*pools
    };
    (finals, breakdown)
}

/// Returns `(prevented, consumed)`.
fn offset(amount: i64, resource: i64, ratio: u32) -> (i64, i64) {
    if amount <= 0 || resource <= 0 || ratio == 0 {
        return (0, 0);
    }
    let ratio = i64::from(ratio);
    let prevented = (resource / ratio).min(amount);
    (prevented, prevented * ratio)
}
