//! The durable portfolio entity.

use super::{Currency, Decimal, Sats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A priced item saved to the portfolio.
///
/// `sats` is the item's cost converted at the BTC/`currency` rate in effect
/// when the item was saved (or last edited). It is a cached value, never
/// recomputed automatically; `current_sats` carries today's cost when a
/// caller asks for enrichment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub currency: Currency,
    pub sats: Sats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub date_added: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sats: Option<Sats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> SavedItem {
        SavedItem {
            id: Uuid::nil(),
            name: "A cup of coffee".to_string(),
            price: Decimal::from_str_canonical("4").unwrap(),
            currency: Currency::parse("usd").unwrap(),
            sats: Sats::new(4000),
            category: Some("Food".to_string()),
            date_added: DateTime::parse_from_rfc3339("2026-01-05T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            current_sats: None,
        }
    }

    #[test]
    fn test_saved_item_wire_shape() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(json["name"], "A cup of coffee");
        assert_eq!(json["price"], "4");
        assert_eq!(json["currency"], "usd");
        assert_eq!(json["sats"], 4000);
        assert_eq!(json["category"], "Food");
        assert!(json["dateAdded"].is_string());
        // Optional enrichment is omitted when absent
        assert!(json.get("currentSats").is_none());
    }

    #[test]
    fn test_saved_item_roundtrip_without_category() {
        let mut item = sample_item();
        item.category = None;
        let json = serde_json::to_string(&item).unwrap();
        let back: SavedItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }
}
