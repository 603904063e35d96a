//! Splits a fresh deposit across assets in proportion to their target
//! weights, independent of current holdings.

use log::debug;

use crate::constants::{DEFAULT_TARGET_DENOMINATOR, EPSILON};
use crate::errors::Result;
use crate::planning::{
    grant_leftover_shares, is_target_sum_off, round_to_shares, sanitize_deposit, snap_leftover,
    validate_asset_keys, Asset, RoundingCandidate, RoundingMode, SanitizedAsset,
};

use super::allocation_model::{
    AllocationPlan, AllocationRequest, AllocationRow, AllocationTotals, AllocationWarnings,
};

impl AllocationRequest {
    pub fn plan(&self) -> Result<AllocationPlan> {
        compute_allocation_plan(&self.assets, self.deposit, self.rounding_mode)
    }
}

/// Computes how a deposit splits by target percent.
///
/// Target percents are normalized by their sum; when they sum to zero the
/// denominator falls back to 100, so nothing is allocated. In `floor` and
/// `nearest` modes each priced asset is rounded down to whole shares and
/// the cash freed by rounding buys extra shares, largest remainder first.
pub fn compute_allocation_plan(
    assets: &[Asset],
    deposit: f64,
    rounding_mode: RoundingMode,
) -> Result<AllocationPlan> {
    validate_asset_keys(assets)?;

    let deposit = sanitize_deposit(deposit);
    let sanitized: Vec<SanitizedAsset<'_>> = assets
        .iter()
        .map(|asset| SanitizedAsset::new(asset, None))
        .collect();

    let target_sum: f64 = sanitized.iter().map(|a| a.target_percent).sum();
    let effective_target = if target_sum > EPSILON {
        target_sum
    } else {
        DEFAULT_TARGET_DENOMINATOR
    };
    let rounding_requested = rounding_mode.rounds_to_shares();

    let mut rows: Vec<AllocationRow> = Vec::with_capacity(sanitized.len());
    let mut candidates: Vec<RoundingCandidate> = Vec::new();
    let mut price_coverage_count = 0;
    let mut missing_price_tickers = Vec::new();

    for (index, asset) in sanitized.iter().enumerate() {
        if asset.price.is_some() {
            price_coverage_count += 1;
        }

        let weight = if effective_target > EPSILON {
            asset.target_percent / effective_target
        } else {
            0.0
        };
        let raw_amount = deposit * weight;

        if rounding_requested && asset.price.is_none() && raw_amount > EPSILON {
            missing_price_tickers.push(asset.key.to_string());
        }

        let rounded = round_to_shares(raw_amount, asset.price, rounding_mode);
        if let Some(candidate) = RoundingCandidate::from_rounded(index, asset.price, &rounded) {
            candidates.push(candidate);
        }

        rows.push(AllocationRow {
            key: asset.key.to_string(),
            target_percent: asset.target_percent,
            weight,
            price: asset.price,
            raw_amount,
            final_amount: rounded.final_amount,
            diff_amount: 0.0,
            shares: rounded.shares,
            raw_shares: rounded.raw_shares,
        });
    }

    let rounding_applied = !candidates.is_empty();

    if let Some(threshold) = rounding_mode.grant_threshold() {
        if rounding_applied {
            let assigned: f64 = rows.iter().map(|r| r.final_amount).sum();
            let outcome = grant_leftover_shares(&mut candidates, deposit - assigned, threshold);
            debug!(
                "Allocation rounding granted {} extra share(s), {:.2} left",
                outcome.grants, outcome.leftover
            );
            for candidate in &candidates {
                let row = &mut rows[candidate.index];
                row.final_amount = candidate.final_amount;
                row.shares = Some(candidate.shares);
            }
        }
    }

    for row in rows.iter_mut() {
        row.diff_amount = row.final_amount - row.raw_amount;
    }

    let raw_total: f64 = rows.iter().map(|r| r.raw_amount).sum();
    let final_total: f64 = rows.iter().map(|r| r.final_amount).sum();
    let leftover = snap_leftover(deposit - final_total);

    let warnings = AllocationWarnings {
        non_hundred_target: is_target_sum_off(target_sum),
        missing_prices: !missing_price_tickers.is_empty(),
        zero_deposit: deposit <= 0.0,
    };

    let totals = AllocationTotals {
        deposit,
        raw_total,
        final_total,
        diff_total: final_total - raw_total,
        leftover,
        target_sum,
        effective_target,
        rounding_mode,
        rounding_applied,
        price_coverage_count,
        missing_price_tickers,
    };

    debug!(
        "Allocation plan: deposit={:.2} assets={} mode={} final={:.2} leftover={:.2}",
        deposit,
        rows.len(),
        rounding_mode,
        final_total,
        leftover
    );

    Ok(AllocationPlan {
        rows: rows.into_iter().map(|row| (row.key.clone(), row)).collect(),
        totals,
        warnings,
    })
}
