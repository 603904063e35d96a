//! Whole-share rounding and leftover share redistribution.

use log::warn;

use crate::constants::{EPSILON, MAX_SHARE_GRANT_ITERATIONS};

use super::planning_model::RoundingMode;

/// Result of rounding one raw allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedAmount {
    pub final_amount: f64,
    /// Whole shares when rounded, fractional shares when only a price is known.
    pub shares: Option<f64>,
    pub raw_shares: Option<f64>,
    /// Fractional shares dropped by rounding down. `None` when not rounded.
    pub remainder: Option<f64>,
}

/// Rounds `raw_amount` down to whole shares when the mode asks for it and a
/// price is known. Otherwise the amount is passed through untouched, as it
/// is when the share count would not be finite.
pub fn round_to_shares(raw_amount: f64, price: Option<f64>, mode: RoundingMode) -> RoundedAmount {
    match price {
        Some(price)
            if mode.rounds_to_shares()
                && raw_amount > 0.0
                && (raw_amount / price).is_finite() =>
        {
            let raw_shares = raw_amount / price;
            let base_shares = (raw_shares + EPSILON).floor();
            RoundedAmount {
                final_amount: base_shares * price,
                shares: Some(base_shares),
                raw_shares: Some(raw_shares),
                remainder: Some(raw_shares - base_shares),
            }
        }
        _ => {
            let shares = price.map(|price| raw_amount / price);
            RoundedAmount {
                final_amount: raw_amount,
                shares,
                raw_shares: shares,
                remainder: None,
            }
        }
    }
}

/// A rounded-down position that may receive one more share from leftover cash.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundingCandidate {
    /// Position of the asset in the planner's input order.
    pub index: usize,
    pub price: f64,
    pub shares: f64,
    pub final_amount: f64,
    pub remainder: f64,
}

impl RoundingCandidate {
    pub fn from_rounded(index: usize, price: Option<f64>, rounded: &RoundedAmount) -> Option<Self> {
        let price = price?;
        let remainder = rounded.remainder?;
        Some(Self {
            index,
            price,
            shares: rounded.shares.unwrap_or(0.0),
            final_amount: rounded.final_amount,
            remainder,
        })
    }

    fn is_eligible(&self, threshold: f64, leftover: f64) -> bool {
        self.remainder > EPSILON
            && self.remainder + EPSILON >= threshold
            && self.price <= leftover + EPSILON
    }

    fn grant_share(&mut self) {
        self.shares += 1.0;
        self.final_amount += self.price;
        self.remainder -= 1.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrantOutcome {
    /// Budget left after all grants.
    pub leftover: f64,
    pub grants: usize,
    /// True when the iteration cap stopped the loop.
    pub capped: bool,
}

/// Spends `budget` on extra whole shares, one per iteration, always picking
/// the affordable candidate with the largest remainder at or above
/// `threshold`. Ties go to the earlier asset. Each grant consumes a full
/// unit of remainder, so a candidate is granted at most once.
pub fn grant_leftover_shares(
    candidates: &mut [RoundingCandidate],
    budget: f64,
    threshold: f64,
) -> GrantOutcome {
    let cheapest = candidates
        .iter()
        .map(|c| c.price)
        .fold(f64::INFINITY, f64::min);

    let mut leftover = budget;
    let mut grants = 0;

    for _ in 0..MAX_SHARE_GRANT_ITERATIONS {
        if leftover + EPSILON < cheapest {
            return GrantOutcome {
                leftover,
                grants,
                capped: false,
            };
        }

        let mut best: Option<usize> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            if !candidate.is_eligible(threshold, leftover) {
                continue;
            }
            match best {
                Some(b) if candidates[b].remainder >= candidate.remainder => {}
                _ => best = Some(i),
            }
        }

        let Some(i) = best else {
            return GrantOutcome {
                leftover,
                grants,
                capped: false,
            };
        };

        candidates[i].grant_share();
        leftover -= candidates[i].price;
        grants += 1;
    }

    warn!(
        "Share grant loop hit the {} iteration cap with {:.2} left",
        MAX_SHARE_GRANT_ITERATIONS, leftover
    );
    GrantOutcome {
        leftover,
        grants,
        capped: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{FLOOR_GRANT_THRESHOLD, NEAREST_GRANT_THRESHOLD};

    fn candidate(index: usize, raw_amount: f64, price: f64) -> RoundingCandidate {
        let rounded = round_to_shares(raw_amount, Some(price), RoundingMode::Floor);
        RoundingCandidate::from_rounded(index, Some(price), &rounded).unwrap()
    }

    #[test]
    fn exact_mode_passes_amount_through() {
        let rounded = round_to_shares(100.0, Some(40.0), RoundingMode::Exact);
        assert_eq!(rounded.final_amount, 100.0);
        assert_eq!(rounded.shares, Some(2.5));
        assert_eq!(rounded.remainder, None);
    }

    #[test]
    fn missing_price_passes_amount_through() {
        let rounded = round_to_shares(100.0, None, RoundingMode::Nearest);
        assert_eq!(rounded.final_amount, 100.0);
        assert_eq!(rounded.shares, None);
        assert_eq!(rounded.raw_shares, None);
    }

    #[test]
    fn floor_rounds_down_and_records_remainder() {
        let rounded = round_to_shares(100.0, Some(40.0), RoundingMode::Floor);
        assert_eq!(rounded.final_amount, 80.0);
        assert_eq!(rounded.shares, Some(2.0));
        assert_eq!(rounded.raw_shares, Some(2.5));
        assert!((rounded.remainder.unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn near_whole_share_counts_are_not_lost_to_float_noise() {
        let rounded = round_to_shares(0.3, Some(0.1), RoundingMode::Floor);
        assert_eq!(rounded.shares, Some(3.0));
    }

    #[test]
    fn grants_go_to_largest_remainder_first() {
        // remainders 0.5 and 0.75, only one share affordable
        let mut candidates = vec![candidate(0, 25.0, 10.0), candidate(1, 17.5, 10.0)];
        let outcome = grant_leftover_shares(&mut candidates, 12.5, FLOOR_GRANT_THRESHOLD);
        assert_eq!(outcome.grants, 1);
        assert_eq!(candidates[1].shares, 2.0);
        assert_eq!(candidates[0].shares, 2.0);
        assert!((outcome.leftover - 2.5).abs() < 1e-9);
    }

    #[test]
    fn nearest_threshold_skips_small_remainders() {
        let mut candidates = vec![candidate(0, 12.0, 10.0), candidate(1, 16.0, 10.0)];
        let outcome = grant_leftover_shares(&mut candidates, 50.0, NEAREST_GRANT_THRESHOLD);

        assert_eq!(outcome.grants, 1);
        assert_eq!(candidates[0].shares, 1.0);
        assert_eq!(candidates[1].shares, 2.0);
    }

    #[test]
    fn ties_go_to_the_earlier_candidate() {
        let mut candidates = vec![candidate(0, 15.0, 10.0), candidate(1, 15.0, 10.0)];
        let outcome = grant_leftover_shares(&mut candidates, 10.0, FLOOR_GRANT_THRESHOLD);

        assert_eq!(outcome.grants, 1);
        assert_eq!(candidates[0].shares, 2.0);
        assert_eq!(candidates[1].shares, 1.0);
    }

    #[test]
    fn unbounded_share_counts_are_not_rounded() {
        let rounded = round_to_shares(1e15, Some(1e-300), RoundingMode::Floor);
        assert_eq!(rounded.final_amount, 1e15);
        assert_eq!(rounded.remainder, None);
    }

    #[test]
    fn grant_loop_stops_at_the_iteration_cap() {
        let mut candidates: Vec<RoundingCandidate> =
            (0..1_500).map(|i| candidate(i, 1.5, 1.0)).collect();
        let outcome = grant_leftover_shares(&mut candidates, 2_000.0, NEAREST_GRANT_THRESHOLD);

        assert_eq!(outcome.grants, MAX_SHARE_GRANT_ITERATIONS);
        assert!(outcome.capped);
        assert!((outcome.leftover - 1_000.0).abs() < 1e-9);
        assert_eq!(candidates[999].shares, 2.0);
        assert_eq!(candidates[1_000].shares, 1.0);
    }

    #[test]
    fn nothing_is_granted_without_candidates() {
        let outcome = grant_leftover_shares(&mut [], 1_000.0, FLOOR_GRANT_THRESHOLD);
        assert_eq!(outcome.grants, 0);
        assert_eq!(outcome.leftover, 1_000.0);
        assert!(!outcome.capped);
    }
}
