use crate::domain::values::risk_tier::RiskTier;
use serde::{Deserialize, Serialize};

/// One listing in a market table.
///
/// `price_per_area` is derived from `price` and `area` and is only reachable
/// through accessors, so it can never drift from its inputs. A record whose
/// price or area is missing, non-finite or non-positive has no price per
/// area and is skipped by every aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ListingRow")]
pub struct PropertyRecord {
    pub id: String,
    pub title: String,
    pub district: String,
    pub city: String,
    pub property_type: String,
    price: Option<f64>,
    area: Option<f64>,
    price_per_area: Option<f64>,
    /// Expected rental yield in percent, when known.
    pub expected_yield: Option<f64>,
    pub risk_tier: RiskTier,
}

impl PropertyRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        district: impl Into<String>,
        city: impl Into<String>,
        property_type: impl Into<String>,
        price: f64,
        area: f64,
    ) -> Self {
        Self::from_parts(
            id.into(),
            title.into(),
            district.into(),
            city.into(),
            property_type.into(),
            Some(price),
            Some(area),
        )
    }

    fn from_parts(
        id: String,
        title: String,
        district: String,
        city: String,
        property_type: String,
        price: Option<f64>,
        area: Option<f64>,
    ) -> Self {
        let mut record = Self {
            id,
            title,
            district,
            city,
            property_type,
            price,
            area,
            price_per_area: None,
            expected_yield: None,
            risk_tier: RiskTier::Unknown,
        };
        record.recompute();
        record
    }

    pub fn with_expected_yield(mut self, expected_yield: f64) -> Self {
        self.expected_yield = Some(expected_yield).filter(|y| y.is_finite());
        self
    }

    pub fn with_risk_tier(mut self, risk_tier: RiskTier) -> Self {
        self.risk_tier = risk_tier;
        self
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn area(&self) -> Option<f64> {
        self.area
    }

    /// `price / area`, or `None` when the record is ineligible.
    pub fn price_per_area(&self) -> Option<f64> {
        self.price_per_area
    }

    pub fn is_eligible(&self) -> bool {
        self.price_per_area.is_some()
    }

    pub fn set_price(&mut self, price: f64) {
        self.price = Some(price);
        self.recompute();
    }

    pub fn set_area(&mut self, area: f64) {
        self.area = Some(area);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.price_per_area = match (self.price, self.area) {
            (Some(p), Some(a)) if p.is_finite() && a.is_finite() && p > 0.0 && a > 0.0 => {
                Some(p / a)
            }
            _ => None,
        };
    }
}

/// Wire shape of a listing as it arrives from a data provider. Every field
/// is read as a raw JSON value so one badly typed field leaves that record
/// ineligible (or labelled by its id) instead of failing the whole table.
#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default, alias = "name")]
    title: serde_json::Value,
    #[serde(default)]
    district: serde_json::Value,
    #[serde(default)]
    city: serde_json::Value,
    #[serde(default, alias = "type")]
    property_type: serde_json::Value,
    #[serde(default)]
    price: serde_json::Value,
    #[serde(default)]
    area: serde_json::Value,
    #[serde(default)]
    expected_yield: serde_json::Value,
    #[serde(default)]
    risk_tier: serde_json::Value,
}

impl From<ListingRow> for PropertyRecord {
    fn from(row: ListingRow) -> Self {
        let id = lenient_text(&row.id).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let title = lenient_text(&row.title).unwrap_or_else(|| id.clone());
        let mut record = PropertyRecord::from_parts(
            id,
            title,
            lenient_text(&row.district).unwrap_or_default(),
            lenient_text(&row.city).unwrap_or_default(),
            lenient_text(&row.property_type).unwrap_or_default(),
            lenient_number(&row.price),
            lenient_number(&row.area),
        );
        record.expected_yield = lenient_number(&row.expected_yield);
        record.risk_tier = lenient_text(&row.risk_tier)
            .and_then(|s| s.parse().ok())
            .unwrap_or(RiskTier::Unknown);
        record
    }
}

/// Reads a trimmed, non-empty string; numbers are taken as their text.
fn lenient_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(text).filter(|t| !t.is_empty())
}

/// Reads a JSON number, or a string like `"12 500.5"` / `"7.2%"`.
fn lenient_number(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '%')
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    n.filter(|v| v.is_finite())
}
