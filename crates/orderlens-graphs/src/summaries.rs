//! Summary tables behind the reports.

use chrono::Weekday;
use orderlens_common::{capitalize, MonthBucket, Result, StateCode};
use orderlens_data::EnrichedOrder;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

use crate::aggregator::{aggregate, AggregateSpec, Field, Reducer};

/// The five lag metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LagMetric {
    /// Carrier hand-over to customer delivery.
    DeliveredCarrier,
    /// Customer delivery day against the estimate.
    DeliveredEstimated,
    /// Carrier hand-over against the shipping limit.
    CarrierLimit,
    /// Purchase to customer delivery.
    DeliveredOrdered,
    /// Purchase to carrier hand-over.
    CarrierOrdered,
}

impl LagMetric {
    pub const ALL: [Self; 5] = [
        Self::DeliveredCarrier,
        Self::DeliveredEstimated,
        Self::CarrierLimit,
        Self::DeliveredOrdered,
        Self::CarrierOrdered,
    ];

    pub const fn field(self) -> Field {
        match self {
            Self::DeliveredCarrier => Field::DiffDeliveredCarrier,
            Self::DeliveredEstimated => Field::DiffDeliveredEstimated,
            Self::CarrierLimit => Field::DiffCarrierLimit,
            Self::DeliveredOrdered => Field::DiffDeliveredOrdered,
            Self::CarrierOrdered => Field::DiffCarrierOrdered,
        }
    }

    pub fn days(self, order: &EnrichedOrder) -> Option<i64> {
        let metrics = &order.metrics;
        match self {
            Self::DeliveredCarrier => metrics.diff_delivered_carrier,
            Self::DeliveredEstimated => metrics.diff_delivered_estimated,
            Self::CarrierLimit => metrics.diff_carrier_limit,
            Self::DeliveredOrdered => metrics.diff_delivered_ordered,
            Self::CarrierOrdered => metrics.diff_carrier_ordered,
        }
    }
}

/// Per-state figures shared by the state-level reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSummary {
    pub state: StateCode,
    pub mean_diff_delivered_carrier: Option<f64>,
    pub mean_diff_delivered_estimated: Option<f64>,
    pub mean_diff_carrier_limit: Option<f64>,
    pub mean_diff_delivered_ordered: Option<f64>,
    pub mean_diff_carrier_ordered: Option<f64>,
    /// Distinct customers.
    pub customers: u64,
    /// Distinct cities.
    pub cities: u64,
    /// Distinct zip code prefixes.
    pub zip_prefixes: u64,
    /// Distinct orders.
    pub orders: u64,
    pub mean_price: Option<f64>,
    pub mean_freight: Option<f64>,
    /// Mean customer lifetime value of the customers attributed to the state.
    pub mean_lifetime_value: Option<f64>,
    /// Late share of qualifying orders; `None` when there are none.
    pub late_ratio: Option<f64>,
}

impl StateSummary {
    pub const fn lag_mean(&self, metric: LagMetric) -> Option<f64> {
        match metric {
            LagMetric::DeliveredCarrier => self.mean_diff_delivered_carrier,
            LagMetric::DeliveredEstimated => self.mean_diff_delivered_estimated,
            LagMetric::CarrierLimit => self.mean_diff_carrier_limit,
            LagMetric::DeliveredOrdered => self.mean_diff_delivered_ordered,
            LagMetric::CarrierOrdered => self.mean_diff_carrier_ordered,
        }
    }
}

const STATE_SPECS: [AggregateSpec; 11] = [
    AggregateSpec::new(Field::DiffDeliveredCarrier, Reducer::Mean),
    AggregateSpec::new(Field::DiffDeliveredEstimated, Reducer::Mean),
    AggregateSpec::new(Field::DiffCarrierLimit, Reducer::Mean),
    AggregateSpec::new(Field::DiffDeliveredOrdered, Reducer::Mean),
    AggregateSpec::new(Field::DiffCarrierOrdered, Reducer::Mean),
    AggregateSpec::new(Field::CustomerUniqueId, Reducer::CountDistinct),
    AggregateSpec::new(Field::CustomerCity, Reducer::CountDistinct),
    AggregateSpec::new(Field::CustomerZipCodePrefix, Reducer::CountDistinct),
    AggregateSpec::new(Field::OrderId, Reducer::CountDistinct),
    AggregateSpec::new(Field::Price, Reducer::Mean),
    AggregateSpec::new(Field::FreightValue, Reducer::Mean),
];

fn by_state(order: &EnrichedOrder) -> Option<StateCode> {
    Some(order.record.customer_state.clone())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: Option<f64>) -> u64 {
    value.map_or(0, |v| v as u64)
}

/// One summary per state present in the input, sorted by state code.
#[instrument(skip_all, fields(records = orders.len()))]
pub fn build_state_summaries(orders: &[EnrichedOrder]) -> Result<Vec<StateSummary>> {
    let table = aggregate(orders, by_state, &STATE_SPECS)?;
    let lifetime = lifetime_value_by_state(orders)?;
    let late = late_ratio_by_state(orders);

    let summaries: Vec<StateSummary> = table
        .into_rows()
        .into_iter()
        .map(|row| {
            let v = &row.values;
            StateSummary {
                mean_diff_delivered_carrier: v[0],
                mean_diff_delivered_estimated: v[1],
                mean_diff_carrier_limit: v[2],
                mean_diff_delivered_ordered: v[3],
                mean_diff_carrier_ordered: v[4],
                customers: as_count(v[5]),
                cities: as_count(v[6]),
                zip_prefixes: as_count(v[7]),
                orders: as_count(v[8]),
                mean_price: v[9],
                mean_freight: v[10],
                mean_lifetime_value: lifetime.get(&row.key).copied(),
                late_ratio: late.get(&row.key).copied().flatten(),
                state: row.key,
            }
        })
        .collect();

    debug!(states = summaries.len(), "Built state summaries");
    Ok(summaries)
}

/// State of each customer's first record in source order.
pub fn customer_home_states(orders: &[EnrichedOrder]) -> HashMap<&str, &StateCode> {
    let mut homes = HashMap::new();
    for order in orders {
        homes
            .entry(order.record.customer_unique_id.as_str())
            .or_insert(&order.record.customer_state);
    }
    homes
}

/// Mean customer lifetime value per state.
///
/// A customer's lifetime value is the sum of `price_with_freight` over all
/// of their records; the customer counts toward their home state only.
#[allow(clippy::cast_precision_loss)]
pub fn lifetime_value_by_state(orders: &[EnrichedOrder]) -> Result<BTreeMap<StateCode, f64>> {
    let spend = AggregateSpec::new(Field::PriceWithFreight, Reducer::Sum);
    let per_customer = aggregate(orders, |o| Some(o.record.customer_unique_id.as_str()), &[spend])?;
    let homes = customer_home_states(orders);

    let mut totals: BTreeMap<StateCode, (f64, usize)> = BTreeMap::new();
    for (customer, value) in per_customer.series(spend) {
        let (Some(state), Some(value)) = (homes.get(customer), value) else {
            continue;
        };
        let entry = totals.entry((*state).clone()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    Ok(totals
        .into_iter()
        .map(|(state, (total, count))| (state, total / count as f64))
        .collect())
}

/// Late-delivery ratio per state over its qualifying orders.
///
/// Every state present in the input has an entry; it is `None` when the
/// state has no order with both a delivery and an estimate.
#[allow(clippy::cast_precision_loss)]
pub fn late_ratio_by_state(orders: &[EnrichedOrder]) -> BTreeMap<StateCode, Option<f64>> {
    let mut qualifying: BTreeMap<&StateCode, (HashSet<&str>, HashSet<&str>)> = BTreeMap::new();
    for order in orders {
        let entry = qualifying.entry(&order.record.customer_state).or_default();
        if let Some(late) = order.is_late() {
            entry.0.insert(order.record.order_id.as_str());
            if late {
                entry.1.insert(order.record.order_id.as_str());
            }
        }
    }

    qualifying
        .into_iter()
        .map(|(state, (all, late))| {
            let ratio = (!all.is_empty()).then(|| late.len() as f64 / all.len() as f64);
            (state.clone(), ratio)
        })
        .collect()
}

/// Weekday rows in display order.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Distinct orders by purchase weekday and hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityMatrix {
    /// `cells[weekday][hour]`, Monday first; `None` where no order was placed.
    pub cells: Vec<Vec<Option<u64>>>,
}

impl ActivityMatrix {
    pub fn weekday_label(weekday: Weekday) -> &'static str {
        match weekday {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

pub fn order_activity(orders: &[EnrichedOrder]) -> Result<ActivityMatrix> {
    let spec = AggregateSpec::new(Field::OrderId, Reducer::CountDistinct);
    let table = aggregate(
        orders,
        |o| Some((o.metrics.day_of_week?.num_days_from_monday(), o.metrics.hour_of_day?)),
        &[spec],
    )?;

    let mut cells = vec![vec![None; 24]; 7];
    for ((day, hour), value) in table.series(spec) {
        if let Some(cell) = cells
            .get_mut(*day as usize)
            .and_then(|row| row.get_mut(*hour as usize))
        {
            *cell = Some(as_count(value));
        }
    }
    Ok(ActivityMatrix { cells })
}

/// Mean purchase-to-delivery days per purchase month.
pub fn delivery_time_trend(orders: &[EnrichedOrder]) -> Result<Vec<(MonthBucket, Option<f64>)>> {
    let spec = AggregateSpec::new(Field::DiffDeliveredOrdered, Reducer::Mean);
    let table = aggregate(orders, |o| o.metrics.month_year, &[spec])?;
    Ok(table.series(spec).into_iter().map(|(m, v)| (*m, v)).collect())
}

/// Record count per purchase month.
pub fn monthly_orders(orders: &[EnrichedOrder]) -> Result<Vec<(MonthBucket, u64)>> {
    let spec = AggregateSpec::new(Field::OrderId, Reducer::Count);
    let table = aggregate(orders, |o| o.metrics.month_year, &[spec])?;
    Ok(table
        .series(spec)
        .into_iter()
        .map(|(m, v)| (*m, as_count(v)))
        .collect())
}

/// Price sum per (purchase month, state); only pairs with records appear.
pub fn monthly_sales(orders: &[EnrichedOrder]) -> Result<BTreeMap<(MonthBucket, StateCode), f64>> {
    let spec = AggregateSpec::new(Field::Price, Reducer::Sum);
    let table = aggregate(
        orders,
        |o| Some((o.metrics.month_year?, o.record.customer_state.clone())),
        &[spec],
    )?;
    Ok(table
        .into_rows()
        .into_iter()
        .map(|row| (row.key, row.values[0].unwrap_or(0.0)))
        .collect())
}

/// Mean item price by basket size, where the basket size of an order is its
/// largest `order_item_id`.
pub fn price_by_basket_size(orders: &[EnrichedOrder]) -> Result<Vec<(u32, Option<f64>)>> {
    let items = AggregateSpec::new(Field::OrderItemId, Reducer::Max);
    let sizes = aggregate(orders, |o| Some(o.record.order_id.as_str()), &[items])?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let size_of: HashMap<&str, u32> = sizes
        .series(items)
        .into_iter()
        .filter_map(|(order, size)| Some((*order, size? as u32)))
        .collect();

    let price = AggregateSpec::new(Field::Price, Reducer::Mean);
    let table = aggregate(
        orders,
        |o| size_of.get(o.record.order_id.as_str()).copied(),
        &[price],
    )?;
    Ok(table.series(price).into_iter().map(|(n, v)| (*n, v)).collect())
}

/// Row counts per capitalized status, `delivered` excluded, largest first.
pub fn status_mix(orders: &[EnrichedOrder]) -> Result<Vec<(String, u64)>> {
    let spec = AggregateSpec::new(Field::OrderId, Reducer::Count);
    let table = aggregate(
        orders,
        |o| {
            let status = o.record.order_status.trim();
            (!status.is_empty() && !status.eq_ignore_ascii_case("delivered")).then(|| capitalize(status))
        },
        &[spec],
    )?;

    let mut mix: Vec<(String, u64)> = table
        .into_rows()
        .into_iter()
        .map(|row| (row.key, as_count(row.values[0])))
        .collect();
    mix.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(mix)
}

/// Inclusive bounds on a lag value, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub min: Option<i64>,
    pub max: i64,
}

impl DayWindow {
    pub const fn up_to(max: i64) -> Self {
        Self { min: None, max }
    }

    pub const fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max,
        }
    }

    pub fn contains(&self, days: i64) -> bool {
        days <= self.max && self.min.map_or(true, |min| days >= min)
    }
}

/// One histogram bar: how many records have exactly `days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    pub days: i64,
    pub count: u64,
}

/// Integer-day histogram of one lag metric, restricted to a window.
pub fn lag_histogram(
    orders: &[EnrichedOrder],
    metric: LagMetric,
    window: DayWindow,
) -> Result<Vec<HistogramBin>> {
    let spec = AggregateSpec::new(metric.field(), Reducer::Count);
    let table = aggregate(
        orders,
        |o| metric.days(o).filter(|d| window.contains(*d)),
        &[spec],
    )?;
    Ok(table
        .series(spec)
        .into_iter()
        .map(|(days, count)| HistogramBin {
            days: *days,
            count: as_count(count),
        })
        .collect())
}
