//! Distributes a deposit to correct drift: shortfalls against the
//! post-deposit target values are funded first, then any remaining cash is
//! optionally spread by target weight.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::constants::EPSILON;
use crate::errors::Result;
use crate::planning::{
    grant_leftover_shares, is_target_sum_off, round_to_shares, sanitize_deposit, snap_leftover,
    validate_asset_keys, Asset, RoundingCandidate, RoundingMode, SanitizedAsset,
};

use super::rebalancing_model::{
    RebalancePlan, RebalanceRequest, RebalanceRow, RebalanceTotals, RebalanceWarnings,
};

impl RebalanceRequest {
    pub fn plan(&self) -> Result<RebalancePlan> {
        compute_rebalance_plan(
            &self.assets,
            self.deposit,
            self.rounding_mode,
            &self.price_map,
            &self.locked_keys,
            self.auto_distribute_leftover,
        )
    }
}

/// Computes a drift-correcting deposit plan.
///
/// Locked assets never receive funds. When target percents sum to zero,
/// unlocked assets are weighted equally. Prices come from `price_map`
/// first and fall back to each asset's own price.
pub fn compute_rebalance_plan<I, S>(
    assets: &[Asset],
    deposit: f64,
    rounding_mode: RoundingMode,
    price_map: &HashMap<String, f64>,
    locked_keys: I,
    auto_distribute_leftover: bool,
) -> Result<RebalancePlan>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    validate_asset_keys(assets)?;

    let deposit = sanitize_deposit(deposit);
    let locked_keys: HashSet<String> = locked_keys
        .into_iter()
        .map(|key| key.as_ref().to_string())
        .collect();

    let sanitized: Vec<SanitizedAsset<'_>> = assets
        .iter()
        .map(|asset| SanitizedAsset::new(asset, price_map.get(&asset.key).copied()))
        .collect();
    let locked: Vec<bool> = sanitized
        .iter()
        .map(|asset| locked_keys.contains(asset.key))
        .collect();

    let locked_count = locked.iter().filter(|l| **l).count();
    let unlocked_count = sanitized.len() - locked_count;

    let total_current: f64 = sanitized.iter().map(|a| a.current_value).sum();
    let target_sum: f64 = sanitized.iter().map(|a| a.target_percent).sum();
    let equal_weight = target_sum <= EPSILON && unlocked_count > 0;
    let effective_target = if target_sum > EPSILON {
        target_sum
    } else if equal_weight {
        unlocked_count as f64
    } else {
        0.0
    };
    let new_total = total_current + deposit;

    let weights: Vec<f64> = sanitized
        .iter()
        .zip(&locked)
        .map(|(asset, &is_locked)| {
            if target_sum > EPSILON {
                asset.target_percent / target_sum
            } else if equal_weight && !is_locked {
                1.0 / unlocked_count as f64
            } else {
                0.0
            }
        })
        .collect();

    let raw_needs: Vec<f64> = sanitized
        .iter()
        .zip(&weights)
        .map(|(asset, weight)| weight * new_total - asset.current_value)
        .collect();

    let asset_count = sanitized.len();
    let locked_flags = &locked;
    let unlocked = move || (0..asset_count).filter(move |&i| !locked_flags[i]);

    let positive_needs_sum: f64 = unlocked().map(|i| raw_needs[i].max(0.0)).sum();
    let needs_count = unlocked().filter(|&i| raw_needs[i] > EPSILON).count();

    let mut allocations = vec![0.0; sanitized.len()];

    // Needs first: never fund more than the aggregate shortfall.
    if positive_needs_sum > EPSILON {
        let scale = (deposit / positive_needs_sum).min(1.0);
        for i in unlocked() {
            allocations[i] = raw_needs[i].max(0.0) * scale;
        }
    }

    if auto_distribute_leftover && unlocked_count > 0 {
        let leftover = deposit - allocations.iter().sum::<f64>();
        if leftover > EPSILON {
            let unlocked_weight_sum: f64 = unlocked().map(|i| weights[i]).sum();
            for i in unlocked() {
                let share = if unlocked_weight_sum > EPSILON {
                    weights[i] / unlocked_weight_sum
                } else {
                    1.0 / unlocked_count as f64
                };
                allocations[i] += leftover * share;
            }
        }
    }

    let rounding_requested = rounding_mode.rounds_to_shares();
    let mut rows: Vec<RebalanceRow> = Vec::with_capacity(sanitized.len());
    let mut candidates: Vec<RoundingCandidate> = Vec::new();
    let mut price_coverage_count = 0;
    let mut missing_price_tickers = Vec::new();

    for (index, asset) in sanitized.iter().enumerate() {
        if asset.price.is_some() {
            price_coverage_count += 1;
        }

        let raw_allocation = allocations[index];
        if rounding_requested && asset.price.is_none() && raw_allocation > EPSILON {
            missing_price_tickers.push(asset.key.to_string());
        }

        let rounded = round_to_shares(raw_allocation, asset.price, rounding_mode);
        if let Some(candidate) = RoundingCandidate::from_rounded(index, asset.price, &rounded) {
            candidates.push(candidate);
        }

        rows.push(RebalanceRow {
            key: asset.key.to_string(),
            target_percent: asset.target_percent,
            current_value: asset.current_value,
            current_percent: asset.current_percent,
            weight: weights[index],
            ideal_value: weights[index] * new_total,
            raw_need: raw_needs[index],
            locked: locked[index],
            price: asset.price,
            raw_allocation,
            final_allocation: rounded.final_amount,
            allocation_diff: 0.0,
            shares: rounded.shares,
            raw_shares: rounded.raw_shares,
            new_value: 0.0,
            new_percent: 0.0,
            delta: 0.0,
            pre_delta: 0.0,
        });
    }

    let rounding_applied = !candidates.is_empty();
    let raw_assigned: f64 = allocations.iter().sum();

    // Floor keeps its rounded-down shares; only nearest re-spends the residue,
    // and never beyond what the raw plan assigned.
    let grant_threshold = match rounding_mode {
        RoundingMode::Nearest => rounding_mode.grant_threshold(),
        _ => None,
    };
    if let Some(threshold) = grant_threshold {
        if rounding_applied {
            let rounded_total: f64 = rows.iter().map(|r| r.final_allocation).sum();
            let outcome =
                grant_leftover_shares(&mut candidates, raw_assigned - rounded_total, threshold);
            debug!(
                "Rebalance rounding granted {} extra share(s), {:.2} left",
                outcome.grants, outcome.leftover
            );
            for candidate in &candidates {
                let row = &mut rows[candidate.index];
                row.final_allocation = candidate.final_amount;
                row.shares = Some(candidate.shares);
            }
        }
    }

    let assigned: f64 = rows.iter().map(|r| r.final_allocation).sum();
    let final_total_value = total_current + assigned;

    let mut impacted_count = 0;
    let mut resolved_count = 0;
    let mut max_delta_after: f64 = 0.0;

    for row in rows.iter_mut() {
        row.allocation_diff = row.final_allocation - row.raw_allocation;
        row.new_value = row.current_value + row.final_allocation;
        row.new_percent = if final_total_value > EPSILON {
            row.new_value / final_total_value * 100.0
        } else {
            0.0
        };
        row.delta = row.new_percent - row.target_percent;
        row.pre_delta = row.current_percent - row.target_percent;

        if row.final_allocation > EPSILON {
            impacted_count += 1;
        }
        if row.delta.abs() + EPSILON < row.pre_delta.abs() {
            resolved_count += 1;
        }
        max_delta_after = max_delta_after.max(row.delta.abs());
    }

    let leftover_cash = snap_leftover(deposit - assigned);

    let warnings = RebalanceWarnings {
        non_hundred_target: is_target_sum_off(target_sum),
        missing_prices: !missing_price_tickers.is_empty(),
        zero_deposit: deposit <= 0.0 || sanitized.is_empty(),
        no_active_assets: unlocked_count == 0,
    };

    let totals = RebalanceTotals {
        deposit,
        total_current,
        final_total_value,
        positive_needs_sum,
        raw_assigned,
        assigned,
        leftover_cash,
        target_sum,
        effective_target,
        rounding_mode,
        rounding_applied,
        price_coverage_count,
        missing_price_tickers,
        impacted_count,
        resolved_count,
        needs_count,
        max_delta_after,
        locked_count,
    };

    debug!(
        "Rebalance plan: deposit={:.2} assets={} locked={} mode={} assigned={:.2} leftover={:.2}",
        deposit,
        rows.len(),
        locked_count,
        rounding_mode,
        assigned,
        leftover_cash
    );

    Ok(RebalancePlan {
        rows: rows.into_iter().map(|row| (row.key.clone(), row)).collect(),
        totals,
        warnings,
    })
}
