//! Loading the order-fact table from CSV or Parquet.
//!
//! Both decoders produce the same [`OrderRecord`] rows. Any missing file,
//! unknown format, missing column or malformed cell is an input error and
//! aborts the run before aggregation starts.

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float64Type, Int64Type, TimeUnit, TimestampMicrosecondType};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use orderlens_common::{
    finite_amount, parse_amount, parse_timestamp, OrderLensError, OrderRecord, Result, StateCode,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::columns;

/// On-disk formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl SourceFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("parquet" | "pq") => Ok(Self::Parquet),
            _ => Err(OrderLensError::input_at(
                format!("unsupported source format for '{}'", path.display()),
                path,
            )),
        }
    }
}

/// Reads the whole order table into memory.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_orders(path: &Path) -> Result<Vec<OrderRecord>> {
    if !path.is_file() {
        return Err(OrderLensError::input_at(
            format!("source file '{}' does not exist", path.display()),
            path,
        ));
    }

    let format = SourceFormat::from_path(path)?;
    debug!(?format, "Decoding order table");
    let records = match format {
        SourceFormat::Csv => read_csv(path)?,
        SourceFormat::Parquet => read_parquet(path)?,
    };

    if records.is_empty() {
        return Err(OrderLensError::input_at("source table has no rows", path));
    }

    info!(rows = records.len(), "Loaded order table");
    Ok(records)
}

// ============================================================================
// CSV
// ============================================================================

#[derive(Debug, Deserialize)]
struct CsvOrderRow {
    order_id: String,
    order_item_id: f64,
    customer_id: String,
    customer_unique_id: String,
    product_id: String,
    seller_id: String,
    customer_state: String,
    customer_city: String,
    customer_zip_code_prefix: String,
    order_status: String,
    price: Option<String>,
    freight_value: Option<String>,
    order_purchase_timestamp: Option<String>,
    order_delivered_carrier_date: Option<String>,
    order_delivered_customer_date: Option<String>,
    order_estimated_delivery_date: Option<String>,
    shipping_limit_date: Option<String>,
}

fn optional_timestamp(raw: Option<&str>, column: &str, line: usize) -> Result<Option<NaiveDateTime>> {
    match raw {
        Some(value) => parse_timestamp(value).map_err(|e| {
            OrderLensError::input_with_source(format!("line {line}: bad value in column '{column}'"), e)
        }),
        None => Ok(None),
    }
}

fn optional_amount(raw: Option<&str>, column: &str, line: usize) -> Result<Option<f64>> {
    match raw {
        Some(value) => parse_amount(value).map_err(|e| {
            OrderLensError::input_with_source(format!("line {line}: bad value in column '{column}'"), e)
        }),
        None => Ok(None),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn item_position(value: f64, line: usize) -> Result<u32> {
    if value.fract() == 0.0 && value >= 1.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(OrderLensError::input(format!(
            "line {line}: '{}' must be a positive integer, got {value}",
            columns::ORDER_ITEM_ID
        )))
    }
}

impl CsvOrderRow {
    fn into_record(self, line: usize) -> Result<OrderRecord> {
        Ok(OrderRecord {
            order_item_id: item_position(self.order_item_id, line)?,
            price: optional_amount(self.price.as_deref(), columns::PRICE, line)?,
            freight_value: optional_amount(self.freight_value.as_deref(), columns::FREIGHT_VALUE, line)?,
            order_purchase_timestamp: optional_timestamp(
                self.order_purchase_timestamp.as_deref(),
                columns::ORDER_PURCHASE_TIMESTAMP,
                line,
            )?,
            order_delivered_carrier_date: optional_timestamp(
                self.order_delivered_carrier_date.as_deref(),
                columns::ORDER_DELIVERED_CARRIER_DATE,
                line,
            )?,
            order_delivered_customer_date: optional_timestamp(
                self.order_delivered_customer_date.as_deref(),
                columns::ORDER_DELIVERED_CUSTOMER_DATE,
                line,
            )?,
            order_estimated_delivery_date: optional_timestamp(
                self.order_estimated_delivery_date.as_deref(),
                columns::ORDER_ESTIMATED_DELIVERY_DATE,
                line,
            )?,
            shipping_limit_date: optional_timestamp(
                self.shipping_limit_date.as_deref(),
                columns::SHIPPING_LIMIT_DATE,
                line,
            )?,
            order_id: self.order_id,
            customer_id: self.customer_id,
            customer_unique_id: self.customer_unique_id,
            product_id: self.product_id,
            seller_id: self.seller_id,
            customer_state: StateCode::new(self.customer_state),
            customer_city: self.customer_city,
            customer_zip_code_prefix: self.customer_zip_code_prefix,
            order_status: self.order_status,
        })
    }
}

/// Every column the decoders require, in table order.
pub const REQUIRED_HEADERS: [&str; 17] = [
    columns::ORDER_ID,
    columns::ORDER_ITEM_ID,
    columns::CUSTOMER_ID,
    columns::CUSTOMER_UNIQUE_ID,
    columns::PRODUCT_ID,
    columns::SELLER_ID,
    columns::CUSTOMER_STATE,
    columns::CUSTOMER_CITY,
    columns::CUSTOMER_ZIP_CODE_PREFIX,
    columns::ORDER_STATUS,
    columns::PRICE,
    columns::FREIGHT_VALUE,
    columns::ORDER_PURCHASE_TIMESTAMP,
    columns::ORDER_DELIVERED_CARRIER_DATE,
    columns::ORDER_DELIVERED_CUSTOMER_DATE,
    columns::ORDER_ESTIMATED_DELIVERY_DATE,
    columns::SHIPPING_LIMIT_DATE,
];

fn read_csv(path: &Path) -> Result<Vec<OrderRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_HEADERS
        .iter()
        .find(|name| !headers.iter().any(|header| header == **name))
    {
        return Err(OrderLensError::input_at(format!("missing column '{missing}'"), path));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CsvOrderRow>().enumerate() {
        // header is line 1
        records.push(row?.into_record(index + 2)?);
    }
    Ok(records)
}

// ============================================================================
// Parquet
// ============================================================================

fn arrow_error(context: String, err: impl std::error::Error + Send + Sync + 'static) -> OrderLensError {
    OrderLensError::input_with_source(context, err)
}

fn column_as(batch: &RecordBatch, name: &str, data_type: &DataType) -> Result<arrow::array::ArrayRef> {
    let column = batch
        .column_by_name(name)
        .ok_or_else(|| OrderLensError::input(format!("missing column '{name}'")))?;
    arrow::compute::cast(column, data_type)
        .map_err(|e| arrow_error(format!("column '{name}' cannot be read as {data_type}"), e))
}

/// Column accessors for one record batch, cast to canonical types.
struct BatchColumns {
    strings: Vec<(&'static str, arrow::array::ArrayRef)>,
    order_item_id: arrow::array::ArrayRef,
    price: arrow::array::ArrayRef,
    freight_value: arrow::array::ArrayRef,
    timestamps: Vec<arrow::array::ArrayRef>,
}

const STRING_COLUMNS: [&str; 9] = [
    columns::ORDER_ID,
    columns::CUSTOMER_ID,
    columns::CUSTOMER_UNIQUE_ID,
    columns::PRODUCT_ID,
    columns::SELLER_ID,
    columns::CUSTOMER_STATE,
    columns::CUSTOMER_CITY,
    columns::CUSTOMER_ZIP_CODE_PREFIX,
    columns::ORDER_STATUS,
];

const TIMESTAMP_COLUMNS: [&str; 5] = [
    columns::ORDER_PURCHASE_TIMESTAMP,
    columns::ORDER_DELIVERED_CARRIER_DATE,
    columns::ORDER_DELIVERED_CUSTOMER_DATE,
    columns::ORDER_ESTIMATED_DELIVERY_DATE,
    columns::SHIPPING_LIMIT_DATE,
];

/// Identifier columns that may not contain nulls.
const REQUIRED_COLUMNS: [&str; 3] = [
    columns::ORDER_ID,
    columns::CUSTOMER_UNIQUE_ID,
    columns::CUSTOMER_STATE,
];

impl BatchColumns {
    fn new(batch: &RecordBatch) -> Result<Self> {
        let timestamp_type = DataType::Timestamp(TimeUnit::Microsecond, None);
        Ok(Self {
            strings: STRING_COLUMNS
                .iter()
                .map(|name| Ok((*name, column_as(batch, name, &DataType::Utf8)?)))
                .collect::<Result<_>>()?,
            order_item_id: column_as(batch, columns::ORDER_ITEM_ID, &DataType::Int64)?,
            price: column_as(batch, columns::PRICE, &DataType::Float64)?,
            freight_value: column_as(batch, columns::FREIGHT_VALUE, &DataType::Float64)?,
            timestamps: TIMESTAMP_COLUMNS
                .iter()
                .map(|name| column_as(batch, name, &timestamp_type))
                .collect::<Result<_>>()?,
        })
    }

    fn string(&self, column: usize, row: usize) -> Result<String> {
        let (name, array) = &self.strings[column];
        let values = array.as_string::<i32>();
        if values.is_null(row) {
            if REQUIRED_COLUMNS.contains(name) {
                return Err(OrderLensError::input(format!("row {row}: null in required column '{name}'")));
            }
            return Ok(String::new());
        }
        Ok(values.value(row).to_string())
    }

    fn float(array: &arrow::array::ArrayRef, row: usize) -> Option<f64> {
        let values = array.as_primitive::<Float64Type>();
        if values.is_null(row) {
            None
        } else {
            finite_amount(values.value(row))
        }
    }

    fn timestamp(&self, column: usize, row: usize) -> Option<NaiveDateTime> {
        let values = self.timestamps[column].as_primitive::<TimestampMicrosecondType>();
        if values.is_null(row) {
            None
        } else {
            values.value_as_datetime(row)
        }
    }

    fn item_position(&self, row: usize) -> Result<u32> {
        let values = self.order_item_id.as_primitive::<Int64Type>();
        if values.is_null(row) {
            return Err(OrderLensError::input(format!(
                "row {row}: null in required column '{}'",
                columns::ORDER_ITEM_ID
            )));
        }
        u32::try_from(values.value(row))
            .ok()
            .filter(|position| *position >= 1)
            .ok_or_else(|| {
                OrderLensError::input(format!(
                    "row {row}: '{}' must be a positive integer",
                    columns::ORDER_ITEM_ID
                ))
            })
    }

    fn record(&self, row: usize) -> Result<OrderRecord> {
        Ok(OrderRecord {
            order_id: self.string(0, row)?,
            order_item_id: self.item_position(row)?,
            customer_id: self.string(1, row)?,
            customer_unique_id: self.string(2, row)?,
            product_id: self.string(3, row)?,
            seller_id: self.string(4, row)?,
            customer_state: StateCode::new(self.string(5, row)?),
            customer_city: self.string(6, row)?,
            customer_zip_code_prefix: self.string(7, row)?,
            order_status: self.string(8, row)?,
            price: Self::float(&self.price, row),
            freight_value: Self::float(&self.freight_value, row),
            order_purchase_timestamp: self.timestamp(0, row),
            order_delivered_carrier_date: self.timestamp(1, row),
            order_delivered_customer_date: self.timestamp(2, row),
            order_estimated_delivery_date: self.timestamp(3, row),
            shipping_limit_date: self.timestamp(4, row),
        })
    }
}

fn read_parquet(path: &Path) -> Result<Vec<OrderRecord>> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| arrow_error(format!("'{}' is not a readable Parquet file", path.display()), e))?
        .build()
        .map_err(|e| arrow_error("failed to build Parquet reader".to_string(), e))?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| arrow_error("failed to decode Parquet batch".to_string(), e))?;
        let columns = BatchColumns::new(&batch)?;
        records.reserve(batch.num_rows());
        for row in 0..batch.num_rows() {
            records.push(columns.record(row)?);
        }
    }
    Ok(records)
}
