use log::debug;

use crate::constants::{DEFAULT_TARGET_DENOMINATOR, EPSILON, LEFTOVER_SNAP_THRESHOLD};
use crate::errors::Result;
use crate::planning::{sanitize_amount, validate_asset_keys, Asset, SanitizedAsset};

use super::drift_model::{DriftEntry, DriftReport, DriftRequest, TradeAction};

impl DriftRequest {
    /// Builds the report, using `default_band` when the request has none.
    pub fn report(&self, default_band: f64) -> Result<DriftReport> {
        compute_drift_report(&self.assets, self.drift_band.unwrap_or(default_band))
    }
}

/// Compares each asset's value-based weight with its normalized target and
/// proposes the trade that would close the gap without new cash.
pub fn compute_drift_report(assets: &[Asset], drift_band: f64) -> Result<DriftReport> {
    validate_asset_keys(assets)?;

    let drift_band = sanitize_amount(drift_band);
    let sanitized: Vec<SanitizedAsset<'_>> = assets
        .iter()
        .map(|asset| SanitizedAsset::new(asset, None))
        .collect();

    let total_value: f64 = sanitized.iter().map(|a| a.current_value).sum();
    let target_sum: f64 = sanitized.iter().map(|a| a.target_percent).sum();
    let denominator = if target_sum > EPSILON {
        target_sum
    } else {
        DEFAULT_TARGET_DENOMINATOR
    };

    let entries: Vec<DriftEntry> = sanitized
        .iter()
        .map(|asset| {
            let target_percent = asset.target_percent / denominator * 100.0;
            let actual_percent = if total_value > EPSILON {
                asset.current_value / total_value * 100.0
            } else {
                0.0
            };
            let drift = actual_percent - target_percent;
            let target_value = target_percent / 100.0 * total_value;
            let trade_amount = target_value - asset.current_value;

            let action = if trade_amount >= LEFTOVER_SNAP_THRESHOLD {
                TradeAction::Buy
            } else if trade_amount <= -LEFTOVER_SNAP_THRESHOLD {
                TradeAction::Sell
            } else {
                TradeAction::Hold
            };

            DriftEntry {
                key: asset.key.to_string(),
                target_percent,
                current_value: asset.current_value,
                actual_percent,
                drift,
                target_value,
                trade_amount,
                trade_shares: asset.price.map(|price| trade_amount / price),
                action,
                within_band: drift.abs() <= drift_band + EPSILON,
            }
        })
        .collect();

    let max_abs_drift = entries.iter().map(|e| e.drift.abs()).fold(0.0, f64::max);
    let buy_total: f64 = entries
        .iter()
        .filter(|e| e.action == TradeAction::Buy)
        .map(|e| e.trade_amount)
        .sum();
    let sell_total: f64 = entries
        .iter()
        .filter(|e| e.action == TradeAction::Sell)
        .map(|e| -e.trade_amount)
        .sum();
    let rebalance_needed = entries.iter().any(|e| !e.within_band);

    debug!(
        "Drift report: assets={} total={:.2} max_drift={:.2} band={:.2}",
        entries.len(),
        total_value,
        max_abs_drift,
        drift_band
    );

    Ok(DriftReport {
        entries,
        total_value,
        drift_band,
        max_abs_drift,
        rebalance_needed,
        buy_total,
        sell_total,
    })
}
