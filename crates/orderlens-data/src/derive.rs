//! Per-record derived metrics.
//!
//! Every value here is a pure function of a single [`OrderRecord`]; a null
//! operand yields a null metric instead of an error or a zero.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use orderlens_common::{MonthBucket, OrderRecord};
use serde::Serialize;
use tracing::{debug, instrument};

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Signed whole days from `b` to `a`, rounded toward negative infinity.
///
/// Null when either side is null. The result is antisymmetric whenever
/// `a - b` is a whole number of days; otherwise
/// `difference_in_days(a, b) + difference_in_days(b, a) == -1`.
pub fn difference_in_days(a: Option<NaiveDateTime>, b: Option<NaiveDateTime>) -> Option<i64> {
    let delta = a?.signed_duration_since(b?);
    Some(match delta.num_nanoseconds() {
        Some(nanos) => nanos.div_euclid(NANOS_PER_DAY),
        None => delta.num_seconds().div_euclid(SECONDS_PER_DAY),
    })
}

/// Strips the time of day.
pub fn normalize_to_day(timestamp: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    timestamp?.date().and_hms_opt(0, 0, 0)
}

/// The derived columns attached to every record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Customer delivery minus carrier hand-over.
    pub diff_delivered_carrier: Option<i64>,
    /// Customer delivery day minus estimated delivery.
    pub diff_delivered_estimated: Option<i64>,
    /// Carrier hand-over minus shipping limit.
    pub diff_carrier_limit: Option<i64>,
    /// Customer delivery minus purchase.
    pub diff_delivered_ordered: Option<i64>,
    /// Carrier hand-over minus purchase.
    pub diff_carrier_ordered: Option<i64>,
    /// Price plus freight.
    pub price_with_freight: Option<f64>,
    /// Weekday of the purchase.
    pub day_of_week: Option<Weekday>,
    /// Hour of the purchase, `0..=23`.
    pub hour_of_day: Option<u32>,
    /// Calendar month of the purchase.
    pub month_year: Option<MonthBucket>,
}

impl DerivedMetrics {
    /// Computes every derived field of one record.
    pub fn from_record(record: &OrderRecord) -> Self {
        let purchase = record.order_purchase_timestamp;
        let carrier = record.order_delivered_carrier_date;
        let delivered = record.order_delivered_customer_date;

        Self {
            diff_delivered_carrier: difference_in_days(delivered, carrier),
            diff_delivered_estimated: difference_in_days(
                normalize_to_day(delivered),
                record.order_estimated_delivery_date,
            ),
            diff_carrier_limit: difference_in_days(carrier, record.shipping_limit_date),
            diff_delivered_ordered: difference_in_days(delivered, purchase),
            diff_carrier_ordered: difference_in_days(carrier, purchase),
            price_with_freight: record.price.zip(record.freight_value).map(|(p, f)| p + f),
            day_of_week: purchase.map(|ts| ts.weekday()),
            hour_of_day: purchase.map(|ts| ts.hour()),
            month_year: purchase.as_ref().map(MonthBucket::from_datetime),
        }
    }
}

/// A source record together with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedOrder {
    /// The source row.
    pub record: OrderRecord,
    /// Metrics derived from it.
    pub metrics: DerivedMetrics,
}

impl EnrichedOrder {
    /// Attaches derived metrics to a record.
    pub fn new(record: OrderRecord) -> Self {
        let metrics = DerivedMetrics::from_record(&record);
        Self { record, metrics }
    }

    /// Whether the delivery landed after the estimate.
    ///
    /// Null unless both timestamps are present.
    pub fn is_late(&self) -> Option<bool> {
        let delivered = self.record.order_delivered_customer_date?;
        let estimated = self.record.order_estimated_delivery_date?;
        Some(delivered > estimated)
    }
}

/// Derives metrics for the whole table.
#[instrument(skip_all, fields(records = records.len()))]
pub fn enrich(records: Vec<OrderRecord>) -> Vec<EnrichedOrder> {
    let enriched: Vec<EnrichedOrder> = records.into_iter().map(EnrichedOrder::new).collect();
    let undelivered = enriched
        .iter()
        .filter(|order| order.metrics.diff_delivered_ordered.is_none())
        .count();
    debug!(undelivered, "Derived per-record metrics");
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderlens_common::test_utils::{ts, OrderRecordBuilder};

    #[test]
    fn test_difference_in_days_floors() {
        let a = ts(2017, 1, 3, 12, 0, 0);
        let b = ts(2017, 1, 1, 0, 0, 0);
        assert_eq!(difference_in_days(Some(a), Some(b)), Some(2));
        assert_eq!(difference_in_days(Some(b), Some(a)), Some(-3));
    }

    #[test]
    fn test_difference_in_days_whole_days_is_antisymmetric() {
        let a = ts(2017, 3, 10, 8, 0, 0);
        let b = ts(2017, 2, 28, 8, 0, 0);
        assert_eq!(difference_in_days(Some(a), Some(b)), Some(10));
        assert_eq!(difference_in_days(Some(b), Some(a)), Some(-10));
    }

    #[test]
    fn test_difference_in_days_null_propagates() {
        let a = ts(2017, 1, 1, 0, 0, 0);
        assert_eq!(difference_in_days(Some(a), None), None);
        assert_eq!(difference_in_days(None, Some(a)), None);
        assert_eq!(difference_in_days(None, None), None);
    }

    #[test]
    fn test_same_day_delivery_is_not_late_against_estimate() {
        let record = OrderRecordBuilder::new("o1", "u1")
            .delivered(Some(ts(2017, 1, 20, 23, 59, 0)))
            .estimated(Some(ts(2017, 1, 20, 0, 0, 0)))
            .build();
        let metrics = DerivedMetrics::from_record(&record);
        assert_eq!(metrics.diff_delivered_estimated, Some(0));
    }

    #[test]
    fn test_metrics_from_record() {
        let record = OrderRecordBuilder::new("o1", "u1").build();
        let metrics = DerivedMetrics::from_record(&record);

        // purchase 01-02 10:00, carrier 01-04 12:00, delivered 01-09 15:00,
        // estimated 01-20, limit 01-06 10:00
        assert_eq!(metrics.diff_delivered_carrier, Some(5));
        assert_eq!(metrics.diff_delivered_estimated, Some(-11));
        assert_eq!(metrics.diff_carrier_limit, Some(-2));
        assert_eq!(metrics.diff_delivered_ordered, Some(7));
        assert_eq!(metrics.diff_carrier_ordered, Some(2));
        assert_eq!(metrics.price_with_freight, Some(110.0));
        assert_eq!(metrics.day_of_week, Some(Weekday::Mon));
        assert_eq!(metrics.hour_of_day, Some(10));
        assert_eq!(metrics.month_year.map(|m| m.to_string()).as_deref(), Some("2017-01"));
    }

    #[test]
    fn test_missing_fields_only_null_their_metrics() {
        let record = OrderRecordBuilder::new("o1", "u1")
            .delivered(None)
            .money(Some(20.0), None)
            .build();
        let metrics = DerivedMetrics::from_record(&record);

        assert_eq!(metrics.diff_delivered_carrier, None);
        assert_eq!(metrics.diff_delivered_estimated, None);
        assert_eq!(metrics.diff_delivered_ordered, None);
        assert_eq!(metrics.diff_carrier_ordered, Some(2));
        assert_eq!(metrics.price_with_freight, None);
    }

    #[test]
    fn test_is_late() {
        let late = EnrichedOrder::new(
            OrderRecordBuilder::new("o1", "u1")
                .delivered(Some(ts(2017, 1, 21, 9, 0, 0)))
                .build(),
        );
        assert_eq!(late.is_late(), Some(true));

        let pending = EnrichedOrder::new(OrderRecordBuilder::new("o2", "u2").delivered(None).build());
        assert_eq!(pending.is_late(), None);
    }
}
