//! Integration tests for orderlens-data.

use chrono::Duration;
use orderlens_common::test_utils::{create_temp_dir, sample_orders, ts};
use orderlens_data::{difference_in_days, enrich, load_orders};
use proptest::prelude::*;
use std::fs;

const HEADER: &str = "order_id,order_item_id,customer_id,customer_unique_id,product_id,seller_id,\
customer_state,customer_city,customer_zip_code_prefix,order_status,price,freight_value,\
order_purchase_timestamp,order_delivered_carrier_date,order_delivered_customer_date,\
order_estimated_delivery_date,shipping_limit_date";

#[test]
fn test_csv_load_then_enrich() {
    let dir = create_temp_dir();
    let path = dir.path().join("orders.csv");
    let body = format!(
        "{HEADER}\n\
o1,1,c1,u1,p1,s1,SP,sao paulo,01000,delivered,100.0,10.0,2017-01-02 10:00:00,2017-01-04 12:00:00,2017-01-09 15:00:00,2017-01-20 00:00:00,2017-01-06 10:00:00\n\
o2,1,c2,u2,p2,s2,RJ,rio,20000,shipped,50.0,5.0,2017-02-10 20:30:00,2017-02-12 09:00:00,,2017-02-25 00:00:00,2017-02-11 00:00:00\n"
    );
    fs::write(&path, body).unwrap();

    let orders = enrich(load_orders(&path).unwrap());
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].metrics.diff_delivered_ordered, Some(7));
    assert_eq!(orders[0].metrics.price_with_freight, Some(110.0));
    assert_eq!(orders[1].record.customer_state.as_str(), "RJ");
    assert_eq!(orders[1].metrics.diff_delivered_ordered, None);
    assert_eq!(orders[1].metrics.diff_carrier_limit, Some(1));
}

#[test]
fn test_missing_column_is_fatal() {
    let dir = create_temp_dir();
    let path = dir.path().join("orders.csv");
    fs::write(&path, "order_id,customer_state\no1,SP\n").unwrap();

    let err = load_orders(&path).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_enrich_preserves_row_count_and_order() {
    let records = sample_orders();
    let ids: Vec<String> = records.iter().map(|r| r.order_id.clone()).collect();
    let enriched = enrich(records);

    let enriched_ids: Vec<String> = enriched.iter().map(|o| o.record.order_id.clone()).collect();
    assert_eq!(enriched_ids, ids);
}

proptest! {
    #[test]
    fn prop_whole_day_spans_are_antisymmetric(days in -400i64..400, secs in 0i64..86_400) {
        let a = ts(2017, 6, 1, 0, 0, 0) + Duration::seconds(secs);
        let b = a + Duration::days(days);
        prop_assert_eq!(difference_in_days(Some(b), Some(a)), Some(days));
        prop_assert_eq!(difference_in_days(Some(a), Some(b)), Some(-days));
    }

    #[test]
    fn prop_fractional_spans_sum_to_minus_one(days in -400i64..400, secs in 1i64..86_400) {
        let a = ts(2017, 6, 1, 0, 0, 0);
        let b = a + Duration::days(days) + Duration::seconds(secs);
        let forward = difference_in_days(Some(b), Some(a)).unwrap();
        let backward = difference_in_days(Some(a), Some(b)).unwrap();
        prop_assert_eq!(forward, days);
        prop_assert_eq!(forward + backward, -1);
    }
}
