//! Integration tests for orderlens-graphs.

use orderlens_common::test_utils::{
    create_temp_dir, init_test_logging, sample_orders, ts, OrderRecordBuilder,
};
use orderlens_common::{MonthBucket, OrderRecord, StateCode};
use orderlens_config::Config;
use orderlens_data::{enrich, EnrichedOrder};
use orderlens_graphs::{
    build_state_summaries, catalogue, cumulative_customers, month_axis, pad, ReportRunner,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

const STATES: [&str; 4] = ["SP", "RJ", "MG", "BA"];

/// Orders spread over a handful of customers, states and months.
fn orders_strategy() -> impl Strategy<Value = Vec<EnrichedOrder>> {
    prop::collection::vec((0usize..6, 0usize..STATES.len(), 0u32..12, 0u32..24), 0..40).prop_map(
        |rows| {
            let records: Vec<OrderRecord> = rows
                .into_iter()
                .enumerate()
                .map(|(i, (customer, state, month, hour))| {
                    OrderRecordBuilder::new(&format!("o{i}"), &format!("u{customer}"))
                        .state(STATES[state])
                        .purchased(Some(ts(2017, month + 1, 5, hour, 0, 0)))
                        .build()
                })
                .collect();
            enrich(records)
        },
    )
}

proptest! {
    #[test]
    fn prop_padder_emits_every_pair_once(
        frames in prop::collection::vec(0u32..20, 0..10),
        members in prop::collection::vec(0u32..8, 0..6),
        filled in prop::collection::vec((0u32..20, 0u32..8, 1.0f64..1e6), 0..30),
    ) {
        let sparse: BTreeMap<(u32, u32), f64> =
            filled.into_iter().map(|(a, b, v)| ((a, b), v)).collect();
        let cells = pad(&frames, &members, &sparse, 1.0);

        let distinct_frames: BTreeSet<u32> = frames.iter().copied().collect();
        let distinct_members: BTreeSet<u32> = members.iter().copied().collect();
        prop_assert_eq!(cells.len(), distinct_frames.len() * distinct_members.len());

        let pairs: BTreeSet<(u32, u32)> = cells.iter().map(|c| (c.frame, c.member)).collect();
        prop_assert_eq!(pairs.len(), cells.len());
        for cell in &cells {
            prop_assert_eq!(cell.padded, !sparse.contains_key(&(cell.frame, cell.member)));
        }
    }

    #[test]
    fn prop_cumulative_counts_accumulate(orders in orders_strategy()) {
        let growth = cumulative_customers(&orders);

        let mut first_month = BTreeMap::new();
        let mut home = BTreeMap::new();
        for order in &orders {
            let customer = order.record.customer_unique_id.clone();
            home.entry(customer.clone()).or_insert_with(|| order.record.customer_state.clone());
            if let Some(month) = order.metrics.month_year {
                first_month
                    .entry(customer)
                    .and_modify(|m| if month < *m { *m = month })
                    .or_insert(month);
            }
        }

        for state in &growth.states {
            let mut previous = 0u64;
            for month in &growth.months {
                let new_customers = first_month
                    .iter()
                    .filter(|(customer, m)| *m == month && home.get(*customer) == Some(state))
                    .count() as u64;
                let count = growth.count(*month, state);
                prop_assert!(count >= previous);
                prop_assert_eq!(count, previous + new_customers);
                previous = count;
            }
        }
    }

    #[test]
    fn prop_every_state_is_summarized(orders in orders_strategy()) {
        let summaries = build_state_summaries(&orders).unwrap();
        let expected: BTreeSet<&StateCode> =
            orders.iter().map(|o| &o.record.customer_state).collect();
        let summarized: BTreeSet<&StateCode> = summaries.iter().map(|s| &s.state).collect();
        prop_assert_eq!(expected, summarized);
    }
}

#[test]
fn test_month_axis_has_no_gaps() {
    let months: Vec<MonthBucket> = vec!["2017-11".parse().unwrap(), "2018-02".parse().unwrap()];
    let axis = month_axis(&months);
    let rendered: Vec<String> = axis.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["2017-11", "2017-12", "2018-01", "2018-02"]);
}

#[test]
fn test_full_run_writes_every_page() {
    init_test_logging();
    let dir = create_temp_dir();
    let mut config = Config::default();
    config.output.directory = dir.path().join("assets").display().to_string();

    let orders = enrich(sample_orders());
    let runner = ReportRunner::from_config(&config);
    let summary = runner.run(&orders, None);

    assert!(summary.is_success(), "failures: {:?}", summary.failed);
    assert_eq!(summary.written.len(), 23);
    for report in catalogue() {
        let page = fs::read_to_string(runner.output_dir().join(report.file_name())).unwrap();
        assert!(page.contains("Plotly.newPlot"));
        assert!(page.contains(&config.output.plotlyjs_cdn));
    }
}
