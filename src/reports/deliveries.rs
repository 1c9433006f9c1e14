//! Delivery performance report

use super::types::{DeliveryPerformanceReport, DeliveryStatusItem};
use super::{filter_orders, GroupMap, ReportEngine, SkipLog, SkipReason, StatusFilter};
use crate::records::{parse_all, DeliveryRecord, OrderRecord};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Upstream delivery statuses are Spanish-language labels.
const STATUS_DELIVERED: &str = "Entregado";
const STATUS_CANCELLED: &str = "Cancelado";

/// Delivery outcomes for the range, joined through the qualifying orders'
/// `id_delivery` references. Any status other than delivered/cancelled
/// counts as pending.
pub fn build_delivery_performance_report(
    deliveries: &[DeliveryRecord],
    orders: &[OrderRecord],
    start: NaiveDate,
    end: NaiveDate,
    skips: &mut SkipLog,
) -> DeliveryPerformanceReport {
    let qualifying = filter_orders(orders, start, end, StatusFilter::Qualifying, skips);

    let mut delivery_ids: HashSet<i64> = HashSet::new();
    for order in &qualifying {
        if let Some(id) = order.id_delivery {
            delivery_ids.insert(id);
        }
    }

    let mut completed = 0;
    let mut pending = 0;
    let mut cancelled = 0;
    let mut total = 0;
    let mut by_status: GroupMap<String, usize> = GroupMap::new();

    for delivery in deliveries {
        match delivery.id {
            Some(id) if delivery_ids.contains(&id) => {}
            Some(_) => continue,
            None => {
                skips.record("deliveries", SkipReason::MissingField("id_delivery"));
                continue;
            }
        }
        let status = match &delivery.status {
            Some(s) => s.as_str(),
            None => {
                skips.record("deliveries", SkipReason::MissingField("status"));
                continue;
            }
        };

        total += 1;
        *by_status.entry(status.to_string()) += 1;
        match status {
            STATUS_DELIVERED => completed += 1,
            STATUS_CANCELLED => cancelled += 1,
            _ => pending += 1,
        }
    }

    let status_breakdown: Vec<DeliveryStatusItem> = by_status
        .into_entries()
        .into_iter()
        .map(|(status, count)| DeliveryStatusItem {
            status,
            count,
            percentage: if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    DeliveryPerformanceReport {
        period_start: start,
        period_end: end,
        total_deliveries: total,
        completed,
        pending,
        cancelled,
        // TODO: compute from delivery timestamps once the upstream exposes
        // created/delivered times; until then this is a fixed estimate.
        average_delivery_time_hours: 24.0,
        status_breakdown,
    }
}

impl ReportEngine {
    pub async fn delivery_performance_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DeliveryPerformanceReport {
        let (raw_deliveries, raw_orders) = tokio::join!(
            self.source().fetch_list("/deliveries", &[]),
            self.source().fetch_list("/orders", &[]),
        );
        let deliveries = parse_all(&raw_deliveries, DeliveryRecord::from_value);
        let orders = parse_all(&raw_orders, OrderRecord::from_value);

        let mut skips = SkipLog::new();
        let report =
            build_delivery_performance_report(&deliveries, &orders, start, end, &mut skips);
        skips.emit("delivery_performance_report");
        report
    }
}
