//! Global dashboard counters
//!
//! Unlike the ranking reports, these counters keep every order that was not
//! explicitly cancelled or expired: the dashboard shows activity, not
//! recognized revenue.

use super::types::DashboardStats;
use super::{status_passes, ReportEngine, SkipLog, SkipReason, StatusFilter};
use crate::records::{
    parse_all, ClientRecord, DeliveryRecord, OrderRecord, ProductRecord, SellerRecord,
};
use chrono::{Datelike, NaiveDate};

/// Stock level at or below which a product counts as "low stock" on the
/// dashboard tiles.
const DASHBOARD_LOW_STOCK_THRESHOLD: i64 = 10;

/// Compute the dashboard counters against an explicit `today` reference.
pub fn build_dashboard_stats(
    orders: &[OrderRecord],
    clients: &[ClientRecord],
    sellers: &[SellerRecord],
    products: &[ProductRecord],
    deliveries: &[DeliveryRecord],
    today: NaiveDate,
    skips: &mut SkipLog,
) -> DashboardStats {
    let month_start = today.with_day(1).unwrap_or(today);

    let mut today_sales = 0.0;
    let mut today_orders = 0;
    let mut month_revenue = 0.0;
    let mut month_orders = 0;

    for order in orders {
        let date = match order.order_date {
            Some(dt) => dt.date(),
            None => {
                skips.record("orders", SkipReason::BadDate);
                continue;
            }
        };
        if !status_passes(order.status.as_deref(), StatusFilter::Countable) {
            continue;
        }
        let amount = order.total_amount.unwrap_or(0.0);
        if date == today {
            today_sales += amount;
            today_orders += 1;
        }
        if date >= month_start && date <= today {
            month_revenue += amount;
            month_orders += 1;
        }
    }

    let pending_deliveries = deliveries
        .iter()
        .filter(|d| {
            !matches!(
                d.status.as_deref(),
                Some("Entregado") | Some("Cancelado")
            )
        })
        .count();

    let low_stock_products = products
        .iter()
        .filter(|p| p.stock.map(|s| s <= DASHBOARD_LOW_STOCK_THRESHOLD).unwrap_or(false))
        .count();

    DashboardStats {
        today_sales,
        today_orders,
        total_active_clients: clients.len(),
        total_active_sellers: sellers.len(),
        total_products: products.len(),
        pending_deliveries,
        low_stock_products,
        month_revenue,
        month_orders,
    }
}

impl ReportEngine {
    pub async fn dashboard_stats(&self, today: NaiveDate) -> DashboardStats {
        let (raw_orders, raw_clients, raw_sellers, raw_products, raw_deliveries) = tokio::join!(
            self.source().fetch_list("/orders", &[]),
            self.source().fetch_list("/clients", &[]),
            self.source().fetch_list("/sellers", &[]),
            self.source().fetch_list("/products", &[]),
            self.source().fetch_list("/deliveries", &[]),
        );

        let orders = parse_all(&raw_orders, OrderRecord::from_value);
        let clients = parse_all(&raw_clients, ClientRecord::from_value);
        let sellers = parse_all(&raw_sellers, SellerRecord::from_value);
        let products = parse_all(&raw_products, ProductRecord::from_value);
        let deliveries = parse_all(&raw_deliveries, DeliveryRecord::from_value);

        let mut skips = SkipLog::new();
        let stats = build_dashboard_stats(
            &orders,
            &clients,
            &sellers,
            &products,
            &deliveries,
            today,
            &mut skips,
        );
        skips.emit("dashboard_stats");
        stats
    }
}
