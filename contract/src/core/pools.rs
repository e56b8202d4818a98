//! Full pool recomputation for a selection and roster.
//!
//! Each pass starts from zero pools and walks the effective selection in id
//! order. Conditions are evaluated first, then additive effects (`+`, `-`) are
//! applied, then multiplicative ones (`*`, `/`), each phase in (node id, slot)
//! order. The result depends only on the selected *set*, never on the order
//! the player picked nodes in.

use crate::core::availability::effective_selection;
use crate::core::condition::{ConditionExtensions, EvalContext, Unresolved, evaluate_condition};
use crate::core::effect::Effect;
use crate::core::error::EngineError;
use crate::core::prevention::{PreventionRatios, prevent_with};
use crate::core::selection::Selection;
use crate::core::types::{EffectOutcome, PoolReport, Pools, TraceEntry};
use crate::graph::Contract;
use crate::roster::Roster;

/// Knobs for a pool pass.
#[derive(Clone, Copy)]
pub struct PoolOptions<'a> {
    pub ratios: PreventionRatios,
    pub extensions: &'a dyn ConditionExtensions,
}

impl Default for PoolOptions<'_> {
    fn default() -> Self {
        Self {
            ratios: PreventionRatios::default(),
            extensions: &Unresolved,
        }
    }
}

/// Recompute pools with default options.
pub fn recompute_pools(contract: &Contract, selection: &Selection, roster: &Roster) -> PoolReport {
    recompute_pools_with(contract, selection, roster, &PoolOptions::default())
}

/// Recompute pools, prevention and trace from scratch.
///
/// Malformed or failing effects are recorded in the trace and excluded from
/// the sums; the pass always completes.
pub fn recompute_pools_with(
    contract: &Contract,
    selection: &Selection,
    roster: &Roster,
    options: &PoolOptions<'_>,
) -> PoolReport {
    let selected = effective_selection(contract, selection, roster);
    let ctx = EvalContext::new(contract, roster, &selected).with_extensions(options.extensions);

    let mut trace = Vec::new();
    let mut pending: Vec<(usize, &Effect)> = Vec::new();
    for node in selected.iter().filter_map(|id| contract.node(id)) {
        for slot in &node.effects {
            let index = trace.len();
            let outcome = match &slot.parsed {
                Err(err) => EffectOutcome::Failed {
                    error: EngineError::from(err.clone()),
                },
                Ok(effect) => match evaluate_condition(&effect.condition, &node.id, &ctx) {
                    Ok(true) => {
                        pending.push((index, effect));
                        // Overwritten once the effect is applied below.
                        EffectOutcome::ConditionNotMet
                    }
                    Ok(false) => EffectOutcome::ConditionNotMet,
                    Err(err) => EffectOutcome::Failed { error: err.into() },
                },
            };
            trace.push(TraceEntry {
                node_id: node.id.clone(),
                slot: slot.slot,
                raw: slot.raw.clone(),
                outcome,
            });
        }
    }

    let mut raw = Pools::default();
    let (additive, multiplicative): (Vec<_>, Vec<_>) = pending
        .into_iter()
        .partition(|(_, effect)| effect.operator.is_additive());
    for (index, effect) in additive.into_iter().chain(multiplicative) {
        let pool = raw.get_mut(effect.stat);
        let before = *pool;
        trace[index].outcome = match effect.operator.apply(before, effect.amount) {
            Ok(after) => {
                *pool = after;
                EffectOutcome::Applied {
                    stat: effect.stat,
                    before,
                    after,
                }
            }
            Err(err) => EffectOutcome::Failed { error: err.into() },
        };
    }

    let (pools, prevention) = prevent_with(&raw, options.ratios);
    PoolReport {
        raw,
        pools,
        prevention,
        trace,
    }
}
