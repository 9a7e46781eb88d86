//! Test utilities and shared fixtures for the OrderLens workspace.
//!
//! Enabled for dependants through the `testing` feature so every crate can
//! build order records the same way in its unit and integration tests.

use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{OrderRecord, StateCode};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Test fixture for a naive timestamp.
pub fn ts(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .expect("valid fixture timestamp")
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Builder for [`OrderRecord`] fixtures with a delivered-on-time default.
#[derive(Debug, Clone)]
pub struct OrderRecordBuilder {
    record: OrderRecord,
}

impl OrderRecordBuilder {
    /// A delivered single-item order bought on 2017-01-02 10:00 in `SP`.
    pub fn new(order_id: &str, customer_unique_id: &str) -> Self {
        Self {
            record: OrderRecord {
                order_id: order_id.to_string(),
                order_item_id: 1,
                customer_id: format!("c-{order_id}"),
                customer_unique_id: customer_unique_id.to_string(),
                product_id: "p-1".to_string(),
                seller_id: "s-1".to_string(),
                customer_state: StateCode::new("SP"),
                customer_city: "sao paulo".to_string(),
                customer_zip_code_prefix: "01000".to_string(),
                order_status: "delivered".to_string(),
                price: Some(100.0),
                freight_value: Some(10.0),
                order_purchase_timestamp: Some(ts(2017, 1, 2, 10, 0, 0)),
                order_delivered_carrier_date: Some(ts(2017, 1, 4, 12, 0, 0)),
                order_delivered_customer_date: Some(ts(2017, 1, 9, 15, 0, 0)),
                order_estimated_delivery_date: Some(ts(2017, 1, 20, 0, 0, 0)),
                shipping_limit_date: Some(ts(2017, 1, 6, 10, 0, 0)),
            },
        }
    }

    /// Sets the item position inside the order.
    pub fn item(mut self, order_item_id: u32) -> Self {
        self.record.order_item_id = order_item_id;
        self
    }

    /// Sets the customer state.
    pub fn state(mut self, code: &str) -> Self {
        self.record.customer_state = StateCode::new(code);
        self
    }

    /// Sets the customer city.
    pub fn city(mut self, city: &str) -> Self {
        self.record.customer_city = city.to_string();
        self
    }

    /// Sets the zip prefix.
    pub fn zip(mut self, zip: &str) -> Self {
        self.record.customer_zip_code_prefix = zip.to_string();
        self
    }

    /// Sets the order status.
    pub fn status(mut self, status: &str) -> Self {
        self.record.order_status = status.to_string();
        self
    }

    /// Sets price and freight.
    pub fn money(mut self, price: Option<f64>, freight: Option<f64>) -> Self {
        self.record.price = price;
        self.record.freight_value = freight;
        self
    }

    /// Sets the purchase timestamp.
    pub fn purchased(mut self, at: Option<NaiveDateTime>) -> Self {
        self.record.order_purchase_timestamp = at;
        self
    }

    /// Sets the carrier hand-over timestamp.
    pub fn carrier(mut self, at: Option<NaiveDateTime>) -> Self {
        self.record.order_delivered_carrier_date = at;
        self
    }

    /// Sets the customer delivery timestamp.
    pub fn delivered(mut self, at: Option<NaiveDateTime>) -> Self {
        self.record.order_delivered_customer_date = at;
        self
    }

    /// Sets the estimated delivery date.
    pub fn estimated(mut self, at: Option<NaiveDateTime>) -> Self {
        self.record.order_estimated_delivery_date = at;
        self
    }

    /// Sets the shipping limit.
    pub fn shipping_limit(mut self, at: Option<NaiveDateTime>) -> Self {
        self.record.shipping_limit_date = at;
        self
    }

    /// Finishes the fixture.
    pub fn build(self) -> OrderRecord {
        self.record
    }
}

/// A small mixed dataset: three states, two months, one undelivered order.
pub fn sample_orders() -> Vec<OrderRecord> {
    vec![
        OrderRecordBuilder::new("o1", "u1").build(),
        OrderRecordBuilder::new("o1", "u1").item(2).money(Some(50.0), Some(5.0)).build(),
        OrderRecordBuilder::new("o2", "u2")
            .state("RJ")
            .city("rio de janeiro")
            .purchased(Some(ts(2017, 2, 10, 20, 30, 0)))
            .carrier(Some(ts(2017, 2, 12, 9, 0, 0)))
            .delivered(Some(ts(2017, 3, 1, 18, 0, 0)))
            .estimated(Some(ts(2017, 2, 25, 0, 0, 0)))
            .build(),
        OrderRecordBuilder::new("o3", "u3")
            .state("AM")
            .city("manaus")
            .status("shipped")
            .purchased(Some(ts(2017, 2, 14, 8, 0, 0)))
            .delivered(None)
            .build(),
        OrderRecordBuilder::new("o4", "u1")
            .purchased(Some(ts(2017, 2, 20, 11, 0, 0)))
            .carrier(Some(ts(2017, 2, 22, 9, 0, 0)))
            .delivered(Some(ts(2017, 2, 27, 9, 0, 0)))
            .estimated(Some(ts(2017, 3, 10, 0, 0, 0)))
            .build(),
    ]
}
