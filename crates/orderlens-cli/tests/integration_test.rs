//! End-to-end runs of the `orderlens` binary.

use orderlens_common::test_utils::create_temp_dir;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const ORDERS_CSV: &str = "order_id,order_item_id,customer_id,customer_unique_id,product_id,seller_id,\
customer_state,customer_city,customer_zip_code_prefix,order_status,price,freight_value,\
order_purchase_timestamp,order_delivered_carrier_date,order_delivered_customer_date,\
order_estimated_delivery_date,shipping_limit_date
o1,1,c1,u1,p1,s1,SP,sao paulo,01000,delivered,100.0,10.0,2017-01-02 10:00:00,2017-01-04 12:00:00,2017-01-09 15:00:00,2017-01-20 00:00:00,2017-01-06 10:00:00
o1,2,c1,u1,p2,s1,SP,sao paulo,01000,delivered,50.0,5.0,2017-01-02 10:00:00,2017-01-04 12:00:00,2017-01-09 15:00:00,2017-01-20 00:00:00,2017-01-06 10:00:00
o2,1,c2,u2,p1,s2,RJ,rio de janeiro,20000,delivered,80.0,12.0,2017-02-10 20:30:00,2017-02-12 09:00:00,2017-03-01 18:00:00,2017-02-25 00:00:00,2017-02-11 00:00:00
o3,1,c3,u3,p3,s3,AM,manaus,69000,shipped,40.0,20.0,2017-02-14 08:00:00,2017-02-16 08:00:00,,2017-03-05 00:00:00,2017-02-15 00:00:00
";

fn orderlens(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_orderlens"))
        .args(args)
        .env_remove("ORDERLENS_CONFIG_PATH")
        .env_remove("ORDERLENS_INPUT")
        .env_remove("ORDERLENS_OUTPUT_DIR")
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to launch orderlens")
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_offline_run_writes_all_reports() {
    let dir = create_temp_dir();
    let input = dir.path().join("orders.csv");
    let output = dir.path().join("assets");
    fs::write(&input, ORDERS_CSV).unwrap();

    let result = orderlens(&[
        "--input",
        &path_arg(&input),
        "--output-dir",
        &path_arg(&output),
        "--offline",
    ]);

    assert_eq!(result.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    let pages = fs::read_dir(&output)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "html"))
        .count();
    assert_eq!(pages, 23);
    assert!(output.join("fig1_choropleth.html").exists());
}

#[test]
fn test_unwritable_output_reports_failure() {
    let dir = create_temp_dir();
    let input = dir.path().join("orders.csv");
    fs::write(&input, ORDERS_CSV).unwrap();
    let output = dir.path().join("assets");
    fs::write(&output, "not a directory").unwrap();

    let result = orderlens(&[
        "--input",
        &path_arg(&input),
        "--output-dir",
        &path_arg(&output),
        "--offline",
    ]);

    assert_eq!(result.status.code(), Some(2), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    assert!(output.is_file());
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = create_temp_dir();
    let result = orderlens(&[
        "--input",
        &path_arg(&dir.path().join("absent.csv")),
        "--output-dir",
        &path_arg(&dir.path().join("assets")),
        "--offline",
    ]);

    assert_eq!(result.status.code(), Some(1));
    assert!(!dir.path().join("assets").exists());
}

#[test]
fn test_unknown_disabled_report_is_fatal() {
    let dir = create_temp_dir();
    let input = dir.path().join("orders.csv");
    fs::write(&input, ORDERS_CSV).unwrap();
    let config = dir.path().join("orderlens.yaml");
    fs::write(&config, "reports:\n  disabled:\n    - no_such_report\n").unwrap();

    let result = orderlens(&[
        "--config",
        &path_arg(&config),
        "--input",
        &path_arg(&input),
        "--output-dir",
        &path_arg(&dir.path().join("assets")),
        "--offline",
    ]);

    assert_eq!(result.status.code(), Some(1));
}
