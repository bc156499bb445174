//! Target price computation.
//!
//! [`compute_price`] is a pure function of its inputs. It never rejects a
//! result: a large negative [`PriceStrategy::FixedAmount`] can produce a
//! non-positive price, and it is the reconciler's job to refuse it. Decimal
//! overflow yields a zero quote for the same reason.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Rounding applied to the final price and to the `RoundUp` buckets.
const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointNearestEven;

/// How a new price is derived from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceStrategy {
    /// `current * (1 + p/100)`.
    Percentage,
    /// `current + p`, in the offer's currency.
    FixedAmount,
    /// Percentage increase, then rounded to 10/100/1000 depending on the
    /// magnitude of the original price.
    RoundUp,
    /// Percentage increase, then `N.99` pricing for fractional results.
    Competitive,
    /// Percentage increase, then the nearest value ending in `90`.
    CustomRound,
}

impl PriceStrategy {
    pub const ALL: [PriceStrategy; 5] = [
        PriceStrategy::Percentage,
        PriceStrategy::FixedAmount,
        PriceStrategy::RoundUp,
        PriceStrategy::Competitive,
        PriceStrategy::CustomRound,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceStrategy::Percentage => "percentage",
            PriceStrategy::FixedAmount => "fixed_amount",
            PriceStrategy::RoundUp => "round_up",
            PriceStrategy::Competitive => "competitive",
            PriceStrategy::CustomRound => "custom_round",
        }
    }
}

impl std::fmt::Display for PriceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PriceStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| format!("unknown price strategy: {s}"))
    }
}

/// Optional clamp applied after the strategy formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceBounds {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceBounds {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// A computed target price with a human-readable derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: Decimal,
    pub description: String,
}

impl PriceQuote {
    /// A quote the marketplace could accept: strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.price > Decimal::ZERO
    }
}

/// Computes the target price for `current` under `strategy`.
///
/// `parameter` is a percentage for every strategy except
/// [`PriceStrategy::FixedAmount`], where it is an absolute amount. The result
/// is clamped to `bounds` and rounded to two decimal places.
#[must_use]
pub fn compute_price(
    current: Decimal,
    strategy: PriceStrategy,
    parameter: Decimal,
    bounds: PriceBounds,
) -> PriceQuote {
    let increased = || {
        let factor = Decimal::ONE.checked_add(parameter / Decimal::ONE_HUNDRED)?;
        current.checked_mul(factor)
    };

    let (computed, mut description) = match strategy {
        PriceStrategy::Percentage => (increased(), format!("Increase by {parameter}%")),
        PriceStrategy::FixedAmount => (
            current.checked_add(parameter),
            format!("Increase by {parameter}"),
        ),
        PriceStrategy::RoundUp => (
            increased().and_then(|v| round_to_step(v, magnitude_step(current))),
            format!("Increase by {parameter}% with rounding"),
        ),
        PriceStrategy::Competitive => (
            increased().and_then(psychological),
            format!("Competitive increase by {parameter}%"),
        ),
        PriceStrategy::CustomRound => (
            increased().and_then(nearest_ending_in_90),
            format!("Increase by {parameter}% rounded to X90"),
        ),
    };

    let Some(mut price) = computed else {
        description.push_str(" (out of range)");
        return PriceQuote {
            price: Decimal::ZERO,
            description,
        };
    };

    if let Some(min) = bounds.min {
        if price < min {
            price = min;
            description.push_str(&format!(" (limited by minimum {min})"));
        }
    }
    if let Some(max) = bounds.max {
        if price > max {
            price = max;
            description.push_str(&format!(" (limited by maximum {max})"));
        }
    }

    PriceQuote {
        price: to_cents(price),
        description,
    }
}

/// Rounding granularity chosen from the original price, not the increased one.
fn magnitude_step(current: Decimal) -> Decimal {
    if current < Decimal::ONE_HUNDRED {
        Decimal::TEN
    } else if current < Decimal::ONE_THOUSAND {
        Decimal::ONE_HUNDRED
    } else {
        Decimal::ONE_THOUSAND
    }
}

fn round_to_step(value: Decimal, step: Decimal) -> Option<Decimal> {
    value
        .checked_div(step)?
        .round_dp_with_strategy(0, ROUNDING)
        .checked_mul(step)
}

/// `N.99` for any fractional value; integral values pass through.
fn psychological(value: Decimal) -> Option<Decimal> {
    if value.fract().is_zero() {
        Some(value)
    } else {
        value.floor().checked_add(Decimal::new(99, 2))
    }
}

/// Nearest value of the form `k*100 + 90`; ties go to the lower candidate.
///
/// The lower candidate is skipped when it would be negative.
fn nearest_ending_in_90(value: Decimal) -> Option<Decimal> {
    let ninety = Decimal::from(90);
    let lower = (value.checked_sub(ninety)? / Decimal::ONE_HUNDRED)
        .floor()
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_add(ninety)?;
    let upper = lower.checked_add(Decimal::ONE_HUNDRED)?;
    if lower < Decimal::ZERO {
        return Some(upper);
    }
    if upper - value < value - lower {
        Some(upper)
    } else {
        Some(lower)
    }
}

/// Rounds to two places and fixes the scale so `1100` renders as `1100.00`.
fn to_cents(value: Decimal) -> Decimal {
    let mut cents = value.round_dp_with_strategy(2, ROUNDING);
    cents.rescale(2);
    cents
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
