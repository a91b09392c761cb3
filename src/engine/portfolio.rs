//! Portfolio aggregation: filtering, sorting, and summary totals.

use crate::domain::{Currency, Decimal, Sats, SavedItem};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Field to sort saved items by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DateAdded,
    Sats,
    Name,
}

/// A sort criterion in `key-direction` form, e.g. `dateAdded-desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        SortSpec {
            key: SortKey::DateAdded,
            ascending: false,
        }
    }
}

/// Error for malformed sort criteria.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort criteria: {0:?}")]
pub struct SortSpecError(pub String);

impl FromStr for SortSpec {
    type Err = SortSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, direction) = s
            .split_once('-')
            .ok_or_else(|| SortSpecError(s.to_string()))?;
        let key = match key {
            "dateAdded" => SortKey::DateAdded,
            "sats" => SortKey::Sats,
            "name" => SortKey::Name,
            _ => return Err(SortSpecError(s.to_string())),
        };
        let ascending = match direction {
            "asc" => true,
            "desc" => false,
            _ => return Err(SortSpecError(s.to_string())),
        };
        Ok(SortSpec { key, ascending })
    }
}

/// Keep the items matching a case-insensitive substring query over name,
/// category, and currency. An empty query keeps everything.
pub fn filter_items(items: Vec<SavedItem>, query: &str) -> Vec<SavedItem> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            item.name.to_lowercase().contains(&query)
                || item
                    .category
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&query))
                || item.currency.as_str().contains(&query)
        })
        .collect()
}

/// Sort items in place by the given criterion, breaking ties by id so the
/// order is deterministic.
pub fn sort_items(items: &mut [SavedItem], spec: SortSpec) {
    items.sort_by(|a, b| {
        let ordering = match spec.key {
            SortKey::DateAdded => a.date_added.cmp(&b.date_added),
            SortKey::Sats => a.sats.cmp(&b.sats),
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        };
        let ordering = if spec.ascending {
            ordering
        } else {
            ordering.reverse()
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    });
}

/// Aggregates over a (possibly filtered) item list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioSummary {
    pub item_count: usize,
    pub total_sats: Sats,
    /// Goal progress percentage, capped at 100.
    pub progress_pct: Decimal,
    /// Fiat spent per currency.
    pub fiat_totals: BTreeMap<Currency, Decimal>,
    /// Sats per category; uncategorized items bucket under "Uncategorized".
    pub category_totals: BTreeMap<String, Sats>,
}

/// Summarize items against a satoshi goal.
pub fn summarize(items: &[SavedItem], goal: Sats) -> PortfolioSummary {
    let total_sats = items
        .iter()
        .fold(Sats::new(0), |acc, item| acc.saturating_add(item.sats));

    let progress_pct = if goal.as_u64() == 0 {
        if total_sats.as_u64() > 0 {
            Decimal::hundred()
        } else {
            Decimal::zero()
        }
    } else {
        let pct = Decimal::from_u64(total_sats.as_u64()) / Decimal::from_u64(goal.as_u64())
            * Decimal::hundred();
        pct.min(Decimal::hundred())
    };

    let mut fiat_totals: BTreeMap<Currency, Decimal> = BTreeMap::new();
    let mut category_totals: BTreeMap<String, Sats> = BTreeMap::new();
    for item in items {
        let fiat = fiat_totals
            .entry(item.currency.clone())
            .or_insert_with(Decimal::zero);
        *fiat = *fiat + item.price;

        let category = item
            .category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Uncategorized".to_string());
        let sats = category_totals.entry(category).or_insert(Sats::new(0));
        *sats = sats.saturating_add(item.sats);
    }

    PortfolioSummary {
        item_count: items.len(),
        total_sats,
        progress_pct,
        fiat_totals,
        category_totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn item(id: u128, name: &str, currency: &str, price: &str, sats: u64, category: Option<&str>, added: &str) -> SavedItem {
        SavedItem {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            price: Decimal::from_str_canonical(price).unwrap(),
            currency: Currency::parse(currency).unwrap(),
            sats: Sats::new(sats),
            category: category.map(str::to_string),
            date_added: DateTime::parse_from_rfc3339(added)
                .unwrap()
                .with_timezone(&Utc),
            current_sats: None,
        }
    }

    fn sample_items() -> Vec<SavedItem> {
        vec![
            item(1, "Coffee", "usd", "4", 4000, Some("Food"), "2026-01-01T00:00:00Z"),
            item(2, "Bus ticket", "sek", "30", 2500, Some("Transport"), "2026-01-02T00:00:00Z"),
            item(3, "Snack", "usd", "2.5", 2500, None, "2026-01-03T00:00:00Z"),
        ]
    }

    #[test]
    fn test_sort_spec_parse() {
        let spec: SortSpec = "sats-asc".parse().unwrap();
        assert_eq!(spec.key, SortKey::Sats);
        assert!(spec.ascending);

        let spec: SortSpec = "dateAdded-desc".parse().unwrap();
        assert_eq!(spec.key, SortKey::DateAdded);
        assert!(!spec.ascending);

        assert!("price-asc".parse::<SortSpec>().is_err());
        assert!("sats".parse::<SortSpec>().is_err());
        assert!("sats-sideways".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_filter_matches_name_category_currency() {
        let items = sample_items();
        assert_eq!(filter_items(items.clone(), "coffee").len(), 1);
        assert_eq!(filter_items(items.clone(), "transPORT").len(), 1);
        assert_eq!(filter_items(items.clone(), "usd").len(), 2);
        assert_eq!(filter_items(items.clone(), "").len(), 3);
        assert_eq!(filter_items(items, "pizza").len(), 0);
    }

    #[test]
    fn test_sort_default_newest_first() {
        let mut items = sample_items();
        sort_items(&mut items, SortSpec::default());
        assert_eq!(items[0].name, "Snack");
        assert_eq!(items[2].name, "Coffee");
    }

    #[test]
    fn test_sort_by_name_asc() {
        let mut items = sample_items();
        sort_items(&mut items, "name-asc".parse().unwrap());
        assert_eq!(items[0].name, "Bus ticket");
        assert_eq!(items[1].name, "Coffee");
        assert_eq!(items[2].name, "Snack");
    }

    #[test]
    fn test_sort_sats_tie_broken_by_id() {
        let mut items = sample_items();
        sort_items(&mut items, "sats-asc".parse().unwrap());
        // Bus ticket (id 2) and Snack (id 3) tie on sats; id orders them
        assert_eq!(items[0].name, "Bus ticket");
        assert_eq!(items[1].name, "Snack");
        assert_eq!(items[2].name, "Coffee");
    }

    #[test]
    fn test_summarize_totals() {
        let summary = summarize(&sample_items(), Sats::new(1_000_000));
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_sats, Sats::new(9000));
        assert_eq!(summary.progress_pct.to_canonical_string(), "0.9");
        assert_eq!(
            summary.fiat_totals[&Currency::parse("usd").unwrap()].to_canonical_string(),
            "6.5"
        );
        assert_eq!(
            summary.fiat_totals[&Currency::parse("sek").unwrap()].to_canonical_string(),
            "30"
        );
        assert_eq!(summary.category_totals["Food"], Sats::new(4000));
        assert_eq!(summary.category_totals["Uncategorized"], Sats::new(2500));
    }

    #[test]
    fn test_summarize_progress_capped_at_100() {
        let summary = summarize(&sample_items(), Sats::new(1000));
        assert_eq!(summary.progress_pct, Decimal::hundred());
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], Sats::new(1_000_000));
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.total_sats, Sats::new(0));
        assert!(summary.progress_pct.is_zero());
        assert!(summary.fiat_totals.is_empty());
        assert!(summary.category_totals.is_empty());
    }
}
