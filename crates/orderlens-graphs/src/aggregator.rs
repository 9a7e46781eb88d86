//! Parameterized group-by over enriched orders.
//!
//! Every per-chart summary is one [`aggregate`] call: a grouping key, and a
//! list of `(field, reducer)` pairs given as data.

use orderlens_common::{OrderLensError, Result};
use orderlens_data::EnrichedOrder;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

/// How the values of one field are folded within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    /// Arithmetic mean of the non-null values; null for an all-null group.
    Mean,
    /// Sum of the non-null values; `0` for an all-null group.
    Sum,
    /// Largest non-null value.
    Max,
    /// Smallest non-null value.
    Min,
    /// Number of rows in the group, nulls included.
    Count,
    /// Number of distinct non-null values.
    CountDistinct,
}

impl Reducer {
    /// Short name used in column labels.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Sum => "sum",
            Self::Max => "max",
            Self::Min => "min",
            Self::Count => "count",
            Self::CountDistinct => "nunique",
        }
    }

    const fn needs_numbers(self) -> bool {
        matches!(self, Self::Mean | Self::Sum | Self::Max | Self::Min)
    }
}

/// A column of [`EnrichedOrder`] that can be reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    DiffDeliveredCarrier,
    DiffDeliveredEstimated,
    DiffCarrierLimit,
    DiffDeliveredOrdered,
    DiffCarrierOrdered,
    Price,
    FreightValue,
    PriceWithFreight,
    OrderItemId,
    OrderId,
    CustomerUniqueId,
    CustomerCity,
    CustomerZipCodePrefix,
}

/// A single cell read from an order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl Field {
    /// Column name as it appears in the source table or derived metrics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DiffDeliveredCarrier => "diff_delivered_carrier",
            Self::DiffDeliveredEstimated => "diff_delivered_estimated",
            Self::DiffCarrierLimit => "diff_carrier_limit",
            Self::DiffDeliveredOrdered => "diff_delivered_ordered",
            Self::DiffCarrierOrdered => "diff_carrier_ordered",
            Self::Price => "price",
            Self::FreightValue => "freight_value",
            Self::PriceWithFreight => "price_with_freight",
            Self::OrderItemId => "order_item_id",
            Self::OrderId => "order_id",
            Self::CustomerUniqueId => "customer_unique_id",
            Self::CustomerCity => "customer_city",
            Self::CustomerZipCodePrefix => "customer_zip_code_prefix",
        }
    }

    /// Whether the field holds numbers.
    pub const fn is_numeric(self) -> bool {
        !matches!(
            self,
            Self::OrderId
                | Self::CustomerUniqueId
                | Self::CustomerCity
                | Self::CustomerZipCodePrefix
        )
    }

    /// Reads the field. Null metrics and blank text are `None`.
    #[allow(clippy::cast_precision_loss)]
    pub fn value<'a>(self, order: &'a EnrichedOrder) -> Option<FieldValue<'a>> {
        let record = &order.record;
        let metrics = &order.metrics;
        let days = |d: Option<i64>| d.map(|v| FieldValue::Number(v as f64));
        let text = |s: &'a str| (!s.is_empty()).then_some(FieldValue::Text(s));

        match self {
            Self::DiffDeliveredCarrier => days(metrics.diff_delivered_carrier),
            Self::DiffDeliveredEstimated => days(metrics.diff_delivered_estimated),
            Self::DiffCarrierLimit => days(metrics.diff_carrier_limit),
            Self::DiffDeliveredOrdered => days(metrics.diff_delivered_ordered),
            Self::DiffCarrierOrdered => days(metrics.diff_carrier_ordered),
            Self::Price => record.price.map(FieldValue::Number),
            Self::FreightValue => record.freight_value.map(FieldValue::Number),
            Self::PriceWithFreight => metrics.price_with_freight.map(FieldValue::Number),
            Self::OrderItemId => Some(FieldValue::Number(f64::from(record.order_item_id))),
            Self::OrderId => text(&record.order_id),
            Self::CustomerUniqueId => text(&record.customer_unique_id),
            Self::CustomerCity => text(&record.customer_city),
            Self::CustomerZipCodePrefix => text(&record.customer_zip_code_prefix),
        }
    }

    /// Reads the field as a number.
    pub fn number(self, order: &EnrichedOrder) -> Option<f64> {
        match self.value(order)? {
            FieldValue::Number(n) => Some(n),
            FieldValue::Text(_) => None,
        }
    }
}

/// One output column: which field, folded how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AggregateSpec {
    pub field: Field,
    pub reducer: Reducer,
}

impl AggregateSpec {
    pub const fn new(field: Field, reducer: Reducer) -> Self {
        Self { field, reducer }
    }

    /// Column label, e.g. `price_mean`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.field.name(), self.reducer.name())
    }

    fn validate(&self) -> Result<()> {
        if self.reducer.needs_numbers() && !self.field.is_numeric() {
            return Err(OrderLensError::report(format!(
                "reducer '{}' cannot be applied to text column '{}'",
                self.reducer.name(),
                self.field.name()
            )));
        }
        Ok(())
    }
}

/// One group of an aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow<K> {
    pub key: K,
    /// One value per spec, in spec order.
    pub values: Vec<Option<f64>>,
}

/// Result of [`aggregate`]: one row per distinct key, sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable<K> {
    specs: Vec<AggregateSpec>,
    rows: Vec<SummaryRow<K>>,
}

impl<K: Ord> SummaryTable<K> {
    pub fn specs(&self) -> &[AggregateSpec] {
        &self.specs
    }

    pub fn rows(&self) -> &[SummaryRow<K>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a spec's column.
    pub fn column(&self, spec: AggregateSpec) -> Option<usize> {
        self.specs.iter().position(|s| *s == spec)
    }

    /// The value of one column for one key.
    pub fn get(&self, key: &K, spec: AggregateSpec) -> Option<f64> {
        let column = self.column(spec)?;
        let index = self.rows.binary_search_by(|row| row.key.cmp(key)).ok()?;
        self.rows[index].values[column]
    }

    /// `(key, value)` pairs of one column, in key order.
    pub fn series(&self, spec: AggregateSpec) -> Vec<(&K, Option<f64>)> {
        match self.column(spec) {
            Some(column) => self
                .rows
                .iter()
                .map(|row| (&row.key, row.values[column]))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn into_rows(self) -> Vec<SummaryRow<K>> {
        self.rows
    }
}

/// Groups `orders` by `key_fn` and folds each spec within every group.
///
/// Rows whose key is `None` are left out. Every key that occurs produces a
/// row, even when all of its metrics are null.
#[instrument(skip_all, fields(records = orders.len(), columns = specs.len()))]
pub fn aggregate<'a, K, F>(
    orders: &'a [EnrichedOrder],
    key_fn: F,
    specs: &[AggregateSpec],
) -> Result<SummaryTable<K>>
where
    K: Ord,
    F: Fn(&'a EnrichedOrder) -> Option<K>,
{
    for spec in specs {
        spec.validate()?;
    }

    let mut groups: BTreeMap<K, Vec<&'a EnrichedOrder>> = BTreeMap::new();
    for order in orders {
        if let Some(key) = key_fn(order) {
            groups.entry(key).or_default().push(order);
        }
    }

    let rows: Vec<SummaryRow<K>> = groups
        .into_iter()
        .map(|(key, members)| SummaryRow {
            values: specs.iter().map(|spec| reduce(*spec, &members)).collect(),
            key,
        })
        .collect();

    debug!(groups = rows.len(), "Aggregated summary table");
    Ok(SummaryTable {
        specs: specs.to_vec(),
        rows,
    })
}

#[derive(PartialEq, Eq, Hash)]
enum DistinctKey<'a> {
    Number(u64),
    Text(&'a str),
}

#[allow(clippy::cast_precision_loss)]
fn reduce(spec: AggregateSpec, members: &[&EnrichedOrder]) -> Option<f64> {
    let numbers = || members.iter().filter_map(|order| spec.field.number(order));

    match spec.reducer {
        Reducer::Count => Some(members.len() as f64),
        Reducer::CountDistinct => {
            let distinct: HashSet<DistinctKey<'_>> = members
                .iter()
                .filter_map(|order| match spec.field.value(order)? {
                    FieldValue::Number(n) => Some(DistinctKey::Number(n.to_bits())),
                    FieldValue::Text(s) => Some(DistinctKey::Text(s)),
                })
                .collect();
            Some(distinct.len() as f64)
        }
        Reducer::Sum => Some(numbers().sum()),
        Reducer::Mean => {
            let (total, count) = numbers().fold((0.0, 0usize), |(t, c), v| (t + v, c + 1));
            (count > 0).then(|| total / count as f64)
        }
        Reducer::Max => numbers().reduce(f64::max),
        Reducer::Min => numbers().reduce(f64::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderlens_common::test_utils::{sample_orders, OrderRecordBuilder};
    use orderlens_common::StateCode;
    use orderlens_data::enrich;

    fn by_state(order: &EnrichedOrder) -> Option<StateCode> {
        Some(order.record.customer_state.clone())
    }

    #[test]
    fn test_mean_skips_nulls() {
        let orders = enrich(sample_orders());
        let spec = AggregateSpec::new(Field::DiffDeliveredCarrier, Reducer::Mean);
        let table = aggregate(&orders, by_state, &[spec]).unwrap();

        // AM has only an undelivered order
        assert_eq!(table.get(&StateCode::new("AM"), spec), None);
        assert!(table.get(&StateCode::new("SP"), spec).is_some());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_count_distinct_and_count() {
        let orders = enrich(sample_orders());
        let distinct = AggregateSpec::new(Field::OrderId, Reducer::CountDistinct);
        let rows = AggregateSpec::new(Field::OrderId, Reducer::Count);
        let table = aggregate(&orders, by_state, &[distinct, rows]).unwrap();

        let sp = StateCode::new("SP");
        assert_eq!(table.get(&sp, distinct), Some(2.0));
        assert_eq!(table.get(&sp, rows), Some(3.0));
    }

    #[test]
    fn test_all_null_group_reductions() {
        let orders = enrich(vec![OrderRecordBuilder::new("o1", "u1")
            .money(None, None)
            .build()]);
        let specs = [
            AggregateSpec::new(Field::Price, Reducer::Sum),
            AggregateSpec::new(Field::Price, Reducer::Mean),
            AggregateSpec::new(Field::Price, Reducer::Max),
            AggregateSpec::new(Field::Price, Reducer::Min),
            AggregateSpec::new(Field::Price, Reducer::CountDistinct),
        ];
        let table = aggregate(&orders, by_state, &specs).unwrap();

        assert_eq!(table.rows()[0].values, vec![Some(0.0), None, None, None, Some(0.0)]);
    }

    #[test]
    fn test_max_and_min() {
        let orders = enrich(sample_orders());
        let max = AggregateSpec::new(Field::OrderItemId, Reducer::Max);
        let min = AggregateSpec::new(Field::Price, Reducer::Min);
        let table = aggregate(&orders, |o| Some(o.record.order_id.clone()), &[max, min]).unwrap();

        assert_eq!(table.get(&"o1".to_string(), max), Some(2.0));
        assert_eq!(table.get(&"o1".to_string(), min), Some(50.0));
    }

    #[test]
    fn test_none_keys_are_dropped() {
        let orders = enrich(vec![
            OrderRecordBuilder::new("o1", "u1").build(),
            OrderRecordBuilder::new("o2", "u2").purchased(None).build(),
        ]);
        let spec = AggregateSpec::new(Field::OrderId, Reducer::Count);
        let table = aggregate(&orders, |o| o.metrics.month_year, &[spec]).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].values[0], Some(1.0));
    }

    #[test]
    fn test_numeric_reducer_on_text_is_rejected() {
        let orders = enrich(sample_orders());
        let spec = AggregateSpec::new(Field::CustomerCity, Reducer::Mean);
        assert!(aggregate(&orders, by_state, &[spec]).is_err());
    }

    #[test]
    fn test_labels() {
        let spec = AggregateSpec::new(Field::CustomerUniqueId, Reducer::CountDistinct);
        assert_eq!(spec.label(), "customer_unique_id_nunique");
    }
}
