//! Input sanitization and structural validation.
//!
//! Values are coerced, never rejected: non-finite or negative amounts become
//! `0`, oversized ones are clamped, and unusable prices become `None`. Structure is validated explicitly.

use std::collections::HashSet;

use crate::constants::{LEFTOVER_SNAP_THRESHOLD, MAX_PLANNABLE_AMOUNT, TARGET_SUM_TOLERANCE};
use crate::errors::{Result, ValidationError};

use super::planning_model::Asset;

/// Coerces a currency amount or percent to a finite, non-negative number
/// no larger than [`MAX_PLANNABLE_AMOUNT`].
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.min(MAX_PLANNABLE_AMOUNT)
    } else {
        0.0
    }
}

pub fn sanitize_optional_amount(value: Option<f64>) -> f64 {
    value.map(sanitize_amount).unwrap_or(0.0)
}

pub fn sanitize_percent(value: f64) -> f64 {
    sanitize_amount(value)
}

/// A price is only usable when it is finite and strictly positive.
pub fn sanitize_price(value: Option<f64>) -> Option<f64> {
    value.filter(|price| price.is_finite() && *price > 0.0)
}

pub fn sanitize_deposit(value: f64) -> f64 {
    sanitize_amount(value)
}

/// Snaps sub-cent leftover cash to zero.
pub fn snap_leftover(value: f64) -> f64 {
    if value.abs() < LEFTOVER_SNAP_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// True when target percents do not add up to ~100.
pub fn is_target_sum_off(target_sum: f64) -> bool {
    (target_sum - 100.0).abs() > TARGET_SUM_TOLERANCE
}

/// Rejects assets with blank keys and duplicate keys.
pub fn validate_asset_keys(assets: &[Asset]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(assets.len());
    for (position, asset) in assets.iter().enumerate() {
        if asset.key.trim().is_empty() {
            return Err(ValidationError::MissingField(format!("assets[{}].key", position)).into());
        }
        if !seen.insert(asset.key.as_str()) {
            return Err(ValidationError::DuplicateKey(asset.key.clone()).into());
        }
    }
    Ok(())
}

/// An asset with every numeric field coerced to a safe value.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedAsset<'a> {
    pub key: &'a str,
    pub target_percent: f64,
    pub current_value: f64,
    pub current_percent: f64,
    pub price: Option<f64>,
}

impl<'a> SanitizedAsset<'a> {
    /// Sanitizes `asset`, preferring `price_override` over the asset's own price.
    pub fn new(asset: &'a Asset, price_override: Option<f64>) -> Self {
        let price = sanitize_price(price_override).or_else(|| sanitize_price(asset.price));
        Self {
            key: asset.key.as_str(),
            target_percent: sanitize_percent(asset.target_percent),
            current_value: sanitize_optional_amount(asset.current_value),
            current_percent: sanitize_optional_amount(asset.current_percent),
            price,
        }
    }
}
