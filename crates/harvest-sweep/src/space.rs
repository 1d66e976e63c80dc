//! Parameter-space enumeration.
//!
//! A [`ParameterSpace`] is an ordered list of filter dimensions, each with a
//! finite domain. Iterating it yields every [`ParameterSet`] of the cartesian
//! product: the first dimension varies slowest, values come in domain order.
//! Iteration is lazy and can be restarted by calling [`ParameterSpace::iter`]
//! again.

use crate::error::{Result, SweepError};
use harvest_core::{FilterValue, SpaceConfig};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// One filter dimension and its domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    name: String,
    domain: Vec<FilterValue>,
}

impl Dimension {
    #[must_use]
    pub fn new(name: impl Into<String>, domain: Vec<FilterValue>) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn domain(&self) -> &[FilterValue] {
        &self.domain
    }
}

/// One fully specified point in the filter space.
///
/// Cheap to clone; the entries are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSet {
    entries: Arc<[(String, FilterValue)]>,
}

impl ParameterSet {
    #[must_use]
    pub fn new(entries: Vec<(String, FilterValue)>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// Value selected for a dimension.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Dimension names and selected values, in dimension order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Query pairs in dimension order; unconstrained dimensions are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in self.iter() {
            value.append_query_pairs(key, &mut pairs);
        }
        pairs
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if value.is_unconstrained() {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        if first {
            f.write_str("<unconstrained>")?;
        }
        Ok(())
    }
}

/// Ordered filter dimensions whose cartesian product is swept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpace {
    dimensions: Vec<Dimension>,
}

impl ParameterSpace {
    /// Build a space from dimensions in sweep order.
    ///
    /// # Errors
    /// Returns `SweepError::InvalidSpace` if two dimensions share a name.
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self> {
        let mut seen = HashSet::new();
        for dimension in &dimensions {
            if !seen.insert(dimension.name.as_str()) {
                return Err(SweepError::InvalidSpace(format!(
                    "duplicate dimension '{}'",
                    dimension.name
                )));
            }
        }
        Ok(Self { dimensions })
    }

    pub fn from_config(config: &SpaceConfig) -> Result<Self> {
        Self::new(
            config
                .dimensions
                .iter()
                .map(|d| Dimension::new(d.name.clone(), d.domain()))
                .collect(),
        )
    }

    #[must_use]
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of parameter sets: the product of the domain sizes.
    ///
    /// No dimensions gives one (empty) set; any empty domain gives none.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dimensions
            .iter()
            .fold(1usize, |acc, d| acc.saturating_mul(d.domain.len()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh pass over the space.
    #[must_use]
    pub fn iter(&self) -> Combinations<'_> {
        Combinations {
            space: self,
            cursor: vec![0; self.dimensions.len()],
            remaining: self.len(),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterSpace {
    type Item = ParameterSet;
    type IntoIter = Combinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy odometer over a [`ParameterSpace`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    space: &'a ParameterSpace,
    cursor: Vec<usize>,
    remaining: usize,
}

impl Combinations<'_> {
    fn advance(&mut self) {
        for (position, dimension) in self.space.dimensions.iter().enumerate().rev() {
            self.cursor[position] += 1;
            if self.cursor[position] < dimension.domain.len() {
                return;
            }
            self.cursor[position] = 0;
        }
    }
}

impl Iterator for Combinations<'_> {
    type Item = ParameterSet;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let entries = self
            .space
            .dimensions
            .iter()
            .zip(&self.cursor)
            .map(|(dimension, &index)| (dimension.name.clone(), dimension.domain[index].clone()))
            .collect();

        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(ParameterSet::new(entries))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Combinations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(values: &[&str]) -> Vec<FilterValue> {
        values.iter().copied().map(FilterValue::text).collect()
    }

    fn small_space() -> ParameterSpace {
        ParameterSpace::new(vec![
            Dimension::new("deal_type", texts(&["sale"])),
            Dimension::new(
                "rooms",
                vec![FilterValue::Unconstrained, FilterValue::text("st"), FilterValue::text("1")],
            ),
            Dimension::new("minutes", vec![FilterValue::Integer(5), FilterValue::Integer(10)]),
        ])
        .expect("valid space")
    }

    #[test]
    fn test_count_is_product_of_domains() {
        let space = small_space();
        assert_eq!(space.len(), 6);
        assert_eq!(space.iter().len(), 6);
        assert_eq!(space.iter().count(), 6);
    }

    #[test]
    fn test_order_last_dimension_fastest() {
        let space = small_space();
        let rendered: Vec<String> = space.iter().map(|set| set.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "deal_type=sale minutes=5",
                "deal_type=sale minutes=10",
                "deal_type=sale rooms=st minutes=5",
                "deal_type=sale rooms=st minutes=10",
                "deal_type=sale rooms=1 minutes=5",
                "deal_type=sale rooms=1 minutes=10",
            ]
        );
    }

    #[test]
    fn test_no_duplicates_and_restartable() {
        let space = small_space();
        let first: Vec<ParameterSet> = space.iter().collect();
        let second: Vec<ParameterSet> = space.iter().collect();
        assert_eq!(first, second);

        let unique: HashSet<&ParameterSet> = first.iter().collect();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn test_default_space_has_300_sets() {
        let space = ParameterSpace::from_config(&SpaceConfig::default()).expect("default space");
        assert_eq!(space.len(), 300);

        let sets: Vec<ParameterSet> = space.iter().collect();
        assert_eq!(sets.len(), 300);
        let unique: HashSet<&ParameterSet> = sets.iter().collect();
        assert_eq!(unique.len(), 300);
    }

    #[test]
    fn test_empty_and_degenerate_spaces() {
        let none = ParameterSpace::new(vec![]).expect("empty space");
        assert_eq!(none.len(), 1);
        let only: Vec<ParameterSet> = none.iter().collect();
        assert_eq!(only.len(), 1);
        assert!(only[0].query_pairs().is_empty());

        let hollow = ParameterSpace::new(vec![
            Dimension::new("a", texts(&["x"])),
            Dimension::new("b", vec![]),
        ])
        .expect("space with empty domain");
        assert!(hollow.is_empty());
        assert_eq!(hollow.iter().next(), None);
    }

    #[test]
    fn test_duplicate_dimension_rejected() {
        let result = ParameterSpace::new(vec![
            Dimension::new("rooms", texts(&["1"])),
            Dimension::new("rooms", texts(&["2"])),
        ]);
        assert!(matches!(result, Err(SweepError::InvalidSpace(_))));
    }

    #[test]
    fn test_query_pairs_skip_unconstrained() {
        let set = ParameterSet::new(vec![
            ("offer_type".to_string(), FilterValue::list(["flat"])),
            ("rooms".to_string(), FilterValue::Unconstrained),
            ("time_on_foot__lte".to_string(), FilterValue::Integer(15)),
        ]);
        assert_eq!(
            set.query_pairs(),
            vec![
                ("offer_type".to_string(), "flat".to_string()),
                ("time_on_foot__lte".to_string(), "15".to_string()),
            ]
        );
        assert_eq!(set.get("rooms"), Some(&FilterValue::Unconstrained));
        assert_eq!(set.get("missing"), None);

        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["offer_type", "rooms", "time_on_foot__lte"]);
        assert_eq!(set.to_string(), "offer_type=[flat] time_on_foot__lte=15");
    }
}
