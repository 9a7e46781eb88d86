//! Common type definitions and newtype wrappers for domain modeling.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::{states, OrderLensError};

/// A two-letter administrative region code, e.g. `SP`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateCode(String);

impl StateCode {
    /// Creates a state code, normalizing surrounding whitespace and case.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// The raw code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full region name from the fixed lookup table, if the code is known.
    pub fn full_name(&self) -> Option<&'static str> {
        states::state_name(&self.0)
    }

    /// Full name when known, otherwise the code itself.
    pub fn display_name(&self) -> String {
        self.full_name()
            .map_or_else(|| self.0.clone(), ToString::to_string)
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StateCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A calendar month bucket rendered as `YYYY-MM`.
///
/// Ordering is chronological and agrees with the lexical order of the
/// rendered form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    year: i32,
    month: u32,
}

impl MonthBucket {
    /// Creates a month bucket; `month` must be in `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (0..=9999).contains(&year)).then_some(Self { year, month })
    }

    /// The month containing the given timestamp.
    pub fn from_datetime(timestamp: &NaiveDateTime) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// Calendar year.
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Calendar month, `1..=12`.
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month.
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Every month from `start` to `end` inclusive, in chronological order.
    pub fn range_inclusive(start: Self, end: Self) -> Vec<Self> {
        let mut months = Vec::new();
        let mut current = start;
        while current <= end {
            months.push(current);
            current = current.next();
        }
        months
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthBucket {
    type Err = OrderLensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OrderLensError::validation(format!("invalid month bucket '{s}', expected YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One row of the pre-joined order-fact table (one order item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order identifier; repeated for every item of the order.
    pub order_id: String,
    /// 1-based position of the item inside its order.
    pub order_item_id: u32,
    /// Per-order customer identifier.
    pub customer_id: String,
    /// Stable customer identifier across orders.
    pub customer_unique_id: String,
    /// Product identifier.
    pub product_id: String,
    /// Seller identifier.
    pub seller_id: String,
    /// Customer state code.
    pub customer_state: StateCode,
    /// Customer city.
    pub customer_city: String,
    /// Customer zip code prefix.
    pub customer_zip_code_prefix: String,
    /// Order status, e.g. `delivered`, `shipped`, `canceled`.
    pub order_status: String,
    /// Item price.
    pub price: Option<f64>,
    /// Freight charged for the item.
    pub freight_value: Option<f64>,
    /// When the order was placed.
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    /// When the seller handed the order to the carrier.
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    /// When the customer received the order.
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    /// Delivery date promised at purchase.
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
    /// Latest date the seller may hand the item to the carrier.
    pub shipping_limit_date: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_state_code_normalization() {
        let code = StateCode::new(" sp ");
        assert_eq!(code.as_str(), "SP");
        assert_eq!(code.full_name(), Some("São Paulo"));
        assert_eq!(StateCode::new("XX").display_name(), "XX");
    }

    #[test]
    fn test_month_bucket_display_and_parse() {
        let month = MonthBucket::new(2017, 3).unwrap();
        assert_eq!(month.to_string(), "2017-03");
        assert_eq!("2017-03".parse::<MonthBucket>().unwrap(), month);
        assert!("2017-13".parse::<MonthBucket>().is_err());
        assert!("2017/03".parse::<MonthBucket>().is_err());
        assert!("17-3".parse::<MonthBucket>().is_err());
    }

    #[test]
    fn test_month_bucket_order_matches_lexical_order() {
        let mut months = vec![
            MonthBucket::new(2018, 1).unwrap(),
            MonthBucket::new(2017, 12).unwrap(),
            MonthBucket::new(2017, 2).unwrap(),
        ];
        let mut labels: Vec<String> = months.iter().map(ToString::to_string).collect();
        months.sort();
        labels.sort();
        let sorted: Vec<String> = months.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, labels);
    }

    #[test]
    fn test_month_range_crosses_year_boundary() {
        let start = MonthBucket::new(2016, 11).unwrap();
        let end = MonthBucket::new(2017, 2).unwrap();
        let range = MonthBucket::range_inclusive(start, end);
        let labels: Vec<String> = range.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["2016-11", "2016-12", "2017-01", "2017-02"]);
        assert!(MonthBucket::range_inclusive(end, start).is_empty());
    }

    #[test]
    fn test_month_from_datetime() {
        let ts = NaiveDate::from_ymd_opt(2018, 8, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(MonthBucket::from_datetime(&ts).to_string(), "2018-08");
    }

    #[test]
    fn test_month_bucket_serde_roundtrip_as_string() {
        let month = MonthBucket::new(2017, 1).unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2017-01\"");
    }
}
