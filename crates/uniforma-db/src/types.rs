//! JSON-typed column values shared by the pricing entities.

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// A single size/price row of a price list.
///
/// `size` is free text ("32", "Free Size"), `price` a non-negative amount.
/// Non-negativity is validated in `uniforma-core` before any write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub size: String,
    pub price: f64,
}

/// Ordered price list, stored as a JSON column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PriceList(pub Vec<PriceRow>);

impl PriceList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.0
    }
}

impl From<Vec<PriceRow>> for PriceList {
    fn from(rows: Vec<PriceRow>) -> Self {
        Self(rows)
    }
}

/// Descriptive tag set ("Premium", "Cotton"), stored as a JSON column.
///
/// Order is preserved as supplied by the client; matching in the linkage
/// engine treats it as a set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct TagSet(pub Vec<String>);

impl TagSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if every tag in `other` is present in this set.
    pub fn is_superset_of(&self, other: &[String]) -> bool {
        other.iter().all(|tag| self.0.contains(tag))
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superset_includes_equal_sets() {
        let tags = TagSet(vec!["Premium".into(), "Cotton".into()]);
        assert!(tags.is_superset_of(&["Premium".into(), "Cotton".into()]));
        assert!(tags.is_superset_of(&["Cotton".into()]));
        assert!(tags.is_superset_of(&[]));
        assert!(!tags.is_superset_of(&["Silk".into()]));
    }

    #[test]
    fn price_list_json_round_trip() {
        let list = PriceList(vec![PriceRow {
            size: "Free Size".into(),
            price: 450.0,
        }]);
        let json = serde_json::to_string(&list).unwrap();
        let back: PriceList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
