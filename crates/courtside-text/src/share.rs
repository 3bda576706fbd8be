//! Share of the total word count taken by named groups of terms.

use std::str::FromStr;

use crate::error::TextError;
use crate::frequency::FrequencyTable;

/// A named set of spelling variants counted together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermGroup {
    pub name: String,
    pub variants: Vec<String>,
}

impl TermGroup {
    pub fn new<I, S>(name: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for variant in variants {
            let variant = variant.as_ref().trim().to_lowercase();
            if !variant.is_empty() && !unique.contains(&variant) {
                unique.push(variant);
            }
        }
        Self {
            name: name.trim().to_string(),
            variants: unique,
        }
    }
}

/// Parses `name=word1,word2`. A bare `name` is its own only variant.
impl FromStr for TermGroup {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let group = match s.split_once('=') {
            Some((name, variants)) => TermGroup::new(name, variants.split(',')),
            None => TermGroup::new(s, [s]),
        };
        if group.name.is_empty() || group.variants.is_empty() {
            return Err(TextError::InvalidGroup(s.to_string()));
        }
        Ok(group)
    }
}

/// The groups tracked for comment threads about a single player.
#[must_use]
pub fn default_groups() -> Vec<TermGroup> {
    vec![
        TermGroup::new("dirty", ["dirty"]),
        TermGroup::new("injury", ["injured", "injury", "injuries"]),
        TermGroup::new("foul", ["foul"]),
        TermGroup::new("ft", ["ft"]),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermShare {
    pub name: String,
    pub count: u64,
    /// Percentage of [`FrequencyTable::total`], `0.0` for an empty table.
    pub percent: f64,
}

/// Sums each group's variants in `table` and expresses the sum as a
/// percentage of the table total.
#[must_use]
pub fn term_share(table: &FrequencyTable, groups: &[TermGroup]) -> Vec<TermShare> {
    let total = table.total();
    groups
        .iter()
        .map(|group| {
            let count = group
                .variants
                .iter()
                .fold(0u64, |sum, v| sum.saturating_add(table.count(v)));
            #[allow(clippy::cast_precision_loss)]
            let percent = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            TermShare {
                name: group.name.clone(),
                count,
                percent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_sum_their_variants() {
        let table = FrequencyTable::from_counts(vec![
            ("injury".to_string(), 3),
            ("injured".to_string(), 2),
            ("foul".to_string(), 5),
            ("embiid".to_string(), 10),
        ]);
        let shares = term_share(&table, &default_groups());

        assert_eq!(shares.len(), 4);
        assert_eq!(shares[0].name, "dirty");
        assert_eq!(shares[0].count, 0);
        assert_eq!(shares[1].count, 5);
        assert!((shares[1].percent - 25.0).abs() < 1e-9);
        assert_eq!(shares[2].count, 5);
    }

    #[test]
    fn empty_table_yields_zero_percent() {
        let shares = term_share(&FrequencyTable::new(), &default_groups());
        assert!(shares.iter().all(|s| s.count == 0 && s.percent == 0.0));
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let table = FrequencyTable::from_counts(vec![
            ("injury".to_string(), u64::MAX),
            ("injured".to_string(), 1),
            ("foul".to_string(), 1),
        ]);
        let shares = term_share(&table, &default_groups());
        assert_eq!(shares[1].count, u64::MAX);
        assert!((shares[1].percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn parses_group_definition() {
        let group: TermGroup = "injury=Injured, injury,injury".parse().unwrap();
        assert_eq!(group.name, "injury");
        assert_eq!(group.variants, vec!["injured", "injury"]);

        let bare: TermGroup = "refs".parse().unwrap();
        assert_eq!(bare.variants, vec!["refs"]);
    }

    #[test]
    fn rejects_empty_group_definition() {
        assert!(matches!(
            "=a,b".parse::<TermGroup>(),
            Err(TextError::InvalidGroup(_))
        ));
        assert!(matches!(
            "name=".parse::<TermGroup>(),
            Err(TextError::InvalidGroup(_))
        ));
    }
}
