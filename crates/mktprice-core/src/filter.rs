//! Offer selection predicates.

use std::collections::HashSet;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::offer::Offer;
use crate::pricing::PriceBounds;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("minimum current price {min} is greater than maximum {max}")]
    CurrentPriceRange { min: Decimal, max: Decimal },

    #[error("minimum new price {min} is greater than maximum {max}")]
    NewPriceRange { min: Decimal, max: Decimal },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },
}

/// Optional predicates over an offer snapshot. Present predicates are ANDed;
/// an empty set passes every offer.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub min_current_price: Option<Decimal>,
    pub max_current_price: Option<Decimal>,
    /// Case-insensitive substring of the category name.
    pub category: Option<String>,
    /// Case-insensitive substring of the offer name.
    pub name: Option<String>,
    pub exclude_ids: HashSet<String>,
}

impl FilterSet {
    /// Rejects contradictory ranges before any work begins.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::CurrentPriceRange`] when min > max.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let (Some(min), Some(max)) = (self.min_current_price, self.max_current_price) {
            if min > max {
                return Err(FilterError::CurrentPriceRange { min, max });
            }
        }
        Ok(())
    }

    /// Number of predicates that will actually be applied.
    #[must_use]
    pub fn active_count(&self) -> usize {
        [
            self.min_current_price.is_some(),
            self.max_current_price.is_some(),
            non_empty(self.category.as_deref()).is_some(),
            non_empty(self.name.as_deref()).is_some(),
            !self.exclude_ids.is_empty(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    #[must_use]
    pub fn matches(&self, offer: &Offer) -> bool {
        if self.min_current_price.is_some_and(|min| offer.price < min) {
            return false;
        }
        if self.max_current_price.is_some_and(|max| offer.price > max) {
            return false;
        }
        if let Some(needle) = non_empty(self.category.as_deref()) {
            if !contains_ignore_case(offer.category_or_empty(), needle) {
                return false;
            }
        }
        if let Some(needle) = non_empty(self.name.as_deref()) {
            if !contains_ignore_case(&offer.name, needle) {
                return false;
            }
        }
        !self.exclude_ids.contains(&offer.id)
    }
}

/// Validates clamp bounds for computed prices.
///
/// # Errors
///
/// Returns [`FilterError::NewPriceRange`] when min > max, or
/// [`FilterError::NonPositive`] when either bound is zero or negative.
pub fn validate_bounds(bounds: &PriceBounds) -> Result<(), FilterError> {
    for (field, value) in [("min new price", bounds.min), ("max new price", bounds.max)] {
        if let Some(value) = value {
            if value <= Decimal::ZERO {
                return Err(FilterError::NonPositive { field, value });
            }
        }
    }
    if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
        if min > max {
            return Err(FilterError::NewPriceRange { min, max });
        }
    }
    Ok(())
}

/// Returns the offers matching every present predicate, in input order.
#[must_use]
pub fn apply_filters(offers: &[Offer], filters: &FilterSet) -> Vec<Offer> {
    let selected: Vec<Offer> = offers
        .iter()
        .filter(|offer| filters.matches(offer))
        .cloned()
        .collect();
    tracing::debug!(
        before = offers.len(),
        after = selected.len(),
        active_filters = filters.active_count(),
        "applied offer filters"
    );
    selected
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::offer::OfferStatus;

    fn offer(id: &str, name: &str, category: Option<&str>, price: Decimal) -> Offer {
        Offer {
            id: id.to_owned(),
            name: name.to_owned(),
            category: category.map(str::to_owned),
            price,
            currency: "RUR".to_owned(),
            status: OfferStatus::Published,
        }
    }

    fn ids(offers: &[Offer]) -> Vec<&str> {
        offers.iter().map(|o| o.id.as_str()).collect()
    }

    fn catalog() -> Vec<Offer> {
        vec![
            offer("A", "USB-C Cable", Some("Кабели"), dec!(50)),
            offer("B", "Сетевое зарядное устройство 20W", Some("Сетевые зарядные устройства"), dec!(150)),
            offer("C", "Power Bank 10000", None, dec!(250)),
        ]
    }

    #[test]
    fn empty_filter_set_passes_everything() {
        let out = apply_filters(&catalog(), &FilterSet::default());
        assert_eq!(ids(&out), ["A", "B", "C"]);
    }

    #[test]
    fn price_range_selects_middle_offer() {
        let filters = FilterSet {
            min_current_price: Some(dec!(100)),
            max_current_price: Some(dec!(200)),
            ..FilterSet::default()
        };
        assert_eq!(ids(&apply_filters(&catalog(), &filters)), ["B"]);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filters = FilterSet {
            min_current_price: Some(dec!(50)),
            max_current_price: Some(dec!(250)),
            ..FilterSet::default()
        };
        assert_eq!(ids(&apply_filters(&catalog(), &filters)), ["A", "B", "C"]);
    }

    #[test]
    fn category_match_is_case_insensitive_for_cyrillic() {
        let filters = FilterSet {
            category: Some("СЕТЕВЫЕ зарядные".to_owned()),
            ..FilterSet::default()
        };
        assert_eq!(ids(&apply_filters(&catalog(), &filters)), ["B"]);
    }

    #[test]
    fn category_filter_excludes_unmapped_offers() {
        let filters = FilterSet {
            category: Some("bank".to_owned()),
            ..FilterSet::default()
        };
        assert!(apply_filters(&catalog(), &filters).is_empty());
    }

    #[test]
    fn blank_substring_filters_are_ignored() {
        let filters = FilterSet {
            category: Some("  ".to_owned()),
            name: Some(String::new()),
            ..FilterSet::default()
        };
        assert_eq!(filters.active_count(), 0);
        assert_eq!(apply_filters(&catalog(), &filters).len(), 3);
    }

    #[test]
    fn name_and_exclusion_compose_with_and() {
        let filters = FilterSet {
            name: Some("c".to_owned()),
            exclude_ids: HashSet::from(["A".to_owned()]),
            ..FilterSet::default()
        };
        // "c" matches "USB-C Cable" (excluded) and nothing else in Latin;
        // "Power Bank" has no c, the Cyrillic name neither.
        assert!(apply_filters(&catalog(), &filters).is_empty());

        let filters = FilterSet {
            name: Some("power".to_owned()),
            exclude_ids: HashSet::from(["A".to_owned()]),
            ..FilterSet::default()
        };
        assert_eq!(ids(&apply_filters(&catalog(), &filters)), ["C"]);
    }

    #[test]
    fn output_preserves_input_order() {
        let mut offers = catalog();
        offers.reverse();
        let filters = FilterSet {
            min_current_price: Some(dec!(100)),
            ..FilterSet::default()
        };
        assert_eq!(ids(&apply_filters(&offers, &filters)), ["C", "B"]);
    }

    #[test]
    fn validate_rejects_inverted_current_range() {
        let filters = FilterSet {
            min_current_price: Some(dec!(500)),
            max_current_price: Some(dec!(100)),
            ..FilterSet::default()
        };
        assert_eq!(
            filters.validate(),
            Err(FilterError::CurrentPriceRange {
                min: dec!(500),
                max: dec!(100)
            })
        );
    }

    #[test]
    fn validate_bounds_rejects_inverted_range() {
        let bounds = PriceBounds {
            min: Some(dec!(900)),
            max: Some(dec!(100)),
        };
        assert!(matches!(
            validate_bounds(&bounds),
            Err(FilterError::NewPriceRange { .. })
        ));
    }

    #[test]
    fn validate_bounds_rejects_zero_minimum() {
        let bounds = PriceBounds {
            min: Some(Decimal::ZERO),
            max: None,
        };
        assert!(matches!(
            validate_bounds(&bounds),
            Err(FilterError::NonPositive { .. })
        ));
    }
}
