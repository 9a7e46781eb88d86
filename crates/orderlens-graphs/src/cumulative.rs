//! Cumulative customer growth per state.

use orderlens_common::{MonthBucket, StateCode};
use orderlens_data::EnrichedOrder;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, instrument};

use crate::padder::{month_axis, pad, MonthlyStateSummary};
use crate::summaries::customer_home_states;

/// Running distinct-customer counts per (month, state).
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeGrowth {
    /// Contiguous acquisition months, oldest first.
    pub months: Vec<MonthBucket>,
    /// Every state present in the input.
    pub states: Vec<StateCode>,
    /// Customers acquired up to and including each month.
    pub counts: BTreeMap<(MonthBucket, StateCode), u64>,
}

impl CumulativeGrowth {
    /// Running count for one state, zero before its first customer.
    pub fn count(&self, month: MonthBucket, state: &StateCode) -> u64 {
        self.counts
            .get(&(month, state.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Padded view: months without customers yet carry the sentinel.
    #[allow(clippy::cast_precision_loss)]
    pub fn padded(&self, sentinel: f64) -> Vec<MonthlyStateSummary> {
        let sparse: BTreeMap<(MonthBucket, StateCode), f64> = self
            .counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(key, count)| (key.clone(), *count as f64))
            .collect();
        pad(&self.months, &self.states, &sparse, sentinel)
    }
}

/// Counts, per state and month, the customers whose first purchase falls in
/// that month or earlier.
///
/// A customer belongs to the state of their first record in source order and
/// is acquired in the month of their earliest purchase. Customers without any
/// purchase timestamp are not counted.
#[instrument(skip_all, fields(records = orders.len()))]
pub fn cumulative_customers(orders: &[EnrichedOrder]) -> CumulativeGrowth {
    let homes = customer_home_states(orders);

    let mut first_purchase: HashMap<&str, MonthBucket> = HashMap::new();
    for order in orders {
        let Some(month) = order.metrics.month_year else {
            continue;
        };
        first_purchase
            .entry(order.record.customer_unique_id.as_str())
            .and_modify(|m| *m = (*m).min(month))
            .or_insert(month);
    }

    let mut acquired: BTreeMap<(MonthBucket, &StateCode), u64> = BTreeMap::new();
    for (customer, month) in &first_purchase {
        if let Some(state) = homes.get(customer) {
            *acquired.entry((*month, *state)).or_insert(0) += 1;
        }
    }

    let states: Vec<StateCode> = orders
        .iter()
        .map(|o| &o.record.customer_state)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .cloned()
        .collect();
    let months = month_axis(first_purchase.values());

    let mut counts = BTreeMap::new();
    let mut running: HashMap<&StateCode, u64> = HashMap::new();
    for month in &months {
        for state in &states {
            let total = running.entry(state).or_insert(0);
            *total += acquired.get(&(*month, state)).copied().unwrap_or(0);
            counts.insert((*month, state.clone()), *total);
        }
    }

    debug!(
        customers = first_purchase.len(),
        months = months.len(),
        states = states.len(),
        "Built cumulative customer counts"
    );
    CumulativeGrowth {
        months,
        states,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderlens_common::test_utils::{sample_orders, ts, OrderRecordBuilder};
    use orderlens_data::enrich;

    fn month(s: &str) -> MonthBucket {
        s.parse().unwrap()
    }

    #[test]
    fn test_cumulative_counts_sample() {
        let growth = cumulative_customers(&enrich(sample_orders()));
        let sp = StateCode::new("SP");
        let rj = StateCode::new("RJ");

        assert_eq!(growth.months, vec![month("2017-01"), month("2017-02")]);
        // u1 first bought in January; the February repeat adds nobody
        assert_eq!(growth.count(month("2017-01"), &sp), 1);
        assert_eq!(growth.count(month("2017-02"), &sp), 1);
        assert_eq!(growth.count(month("2017-01"), &rj), 0);
        assert_eq!(growth.count(month("2017-02"), &rj), 1);
    }

    #[test]
    fn test_padded_view_flags_zero_counts() {
        let growth = cumulative_customers(&enrich(sample_orders()));
        let cells = growth.padded(1.0);

        assert_eq!(cells.len(), growth.months.len() * growth.states.len());
        let rj_january = cells
            .iter()
            .find(|c| c.member.as_str() == "RJ" && c.frame == month("2017-01"))
            .unwrap();
        assert!(rj_january.padded);
        assert_eq!(rj_january.value, 1.0);
    }

    #[test]
    fn test_gap_months_carry_previous_total() {
        let orders = enrich(vec![
            OrderRecordBuilder::new("o1", "u1").build(),
            OrderRecordBuilder::new("o2", "u2")
                .purchased(Some(ts(2017, 4, 3, 9, 0, 0)))
                .build(),
        ]);
        let growth = cumulative_customers(&orders);
        let sp = StateCode::new("SP");

        assert_eq!(growth.months.len(), 4);
        assert_eq!(growth.count(month("2017-02"), &sp), 1);
        assert_eq!(growth.count(month("2017-04"), &sp), 2);
    }

    #[test]
    fn test_customer_without_purchase_is_skipped() {
        let orders = enrich(vec![OrderRecordBuilder::new("o1", "u1").purchased(None).build()]);
        let growth = cumulative_customers(&orders);
        assert!(growth.months.is_empty());
        assert!(growth.padded(1.0).is_empty());
        assert_eq!(growth.states.len(), 1);
    }
}
