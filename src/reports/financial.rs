//! Financial report: revenue split by payment method

use super::types::{FinancialReport, PaymentMethodItem};
use super::{
    filter_orders, guarded_average, sort_desc_by, GroupMap, ReportEngine, SkipLog, SkipReason,
    StatusFilter,
};
use crate::records::{parse_all, OrderRecord, PaymentMethodRecord};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct PaymentAccumulator {
    count: usize,
    amount: f64,
}

/// Recognized revenue per payment method.
///
/// Groups are keyed by method name; an order whose method id has no
/// directory record lands in the "Unknown" bucket rather than disappearing,
/// so the per-method percentages still sum to 100.
pub fn build_financial_report(
    orders: &[OrderRecord],
    payment_methods: &[PaymentMethodRecord],
    start: NaiveDate,
    end: NaiveDate,
    skips: &mut SkipLog,
) -> FinancialReport {
    let qualifying = filter_orders(orders, start, end, StatusFilter::Qualifying, skips);

    let total_revenue: f64 = qualifying
        .iter()
        .map(|o| o.total_amount.unwrap_or(0.0))
        .sum();
    let total_orders = qualifying.len();

    let mut method_names: HashMap<i64, String> = HashMap::new();
    for method in payment_methods {
        if let (Some(id), Some(name)) = (method.id, method.method_name.clone()) {
            method_names.insert(id, name);
        }
    }

    let mut stats: GroupMap<String, PaymentAccumulator> = GroupMap::new();
    for order in &qualifying {
        let name = match order.id_payment_method {
            Some(id) => method_names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            None => {
                skips.record("orders", SkipReason::MissingField("id_payment_method"));
                "Unknown".to_string()
            }
        };
        let acc = stats.entry(name);
        acc.count += 1;
        acc.amount += order.total_amount.unwrap_or(0.0);
    }

    let mut payment_items: Vec<PaymentMethodItem> = stats
        .into_entries()
        .into_iter()
        .map(|(method_name, acc)| PaymentMethodItem {
            method_name,
            total_transactions: acc.count,
            total_amount: acc.amount,
            percentage: if total_revenue > 0.0 {
                acc.amount / total_revenue * 100.0
            } else {
                0.0
            },
        })
        .collect();

    sort_desc_by(&mut payment_items, |item| item.total_amount);

    FinancialReport {
        period_start: start,
        period_end: end,
        total_revenue,
        total_orders,
        payment_methods: payment_items,
        average_transaction: guarded_average(total_revenue, total_orders),
    }
}

impl ReportEngine {
    pub async fn financial_report(&self, start: NaiveDate, end: NaiveDate) -> FinancialReport {
        let (raw_orders, raw_methods) = tokio::join!(
            self.source().fetch_list("/orders", &[]),
            self.source().fetch_list("/payment-methods", &[]),
        );
        let orders = parse_all(&raw_orders, OrderRecord::from_value);
        let methods = parse_all(&raw_methods, PaymentMethodRecord::from_value);

        let mut skips = SkipLog::new();
        let report = build_financial_report(&orders, &methods, start, end, &mut skips);
        skips.emit("financial_report");
        report
    }
}
