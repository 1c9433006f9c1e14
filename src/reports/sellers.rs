//! Seller rankings and seller-scoped statistics
//!
//! The global top-sellers ranking is computed locally from order lines. The
//! seller-scoped dashboard and best-products reports delegate to the
//! pre-aggregated `/statistics/seller/{id}/...` endpoints instead of
//! recomputing the same joins here; a failed delegation degrades to zeroed /
//! empty results rather than surfacing the outage.

use super::types::{
    BestProductsReport, ProductSalesItem, SellerDashboardStats, TopSellerItem, TopSellersReport,
};
use super::{
    filter_orders, index_by_id, order_id_set, sort_desc_by, GroupMap, ReportEngine, SkipLog,
    SkipReason, StatusFilter,
};
use crate::coerce::{coerce_f64, coerce_i64};
use crate::fetch::unwrap_list;
use crate::records::{parse_all, OrderRecord, ProductOrderRecord, ProductRecord, SellerRecord};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct SellerAccumulator {
    sales: f64,
    orders: HashSet<i64>,
    products_sold: usize,
}

/// Rank sellers by recognized revenue inside the range.
///
/// The seller key is only reachable through the product referenced by each
/// order line; lines whose product (or its seller) is unknown are skipped,
/// and groups whose seller has no directory record are dropped.
pub fn build_top_sellers_report(
    orders: &[OrderRecord],
    product_orders: &[ProductOrderRecord],
    products: &[ProductRecord],
    sellers: &[SellerRecord],
    start: NaiveDate,
    end: NaiveDate,
    limit: usize,
    skips: &mut SkipLog,
) -> TopSellersReport {
    let qualifying = filter_orders(orders, start, end, StatusFilter::Qualifying, skips);
    let order_ids = order_id_set(&qualifying, skips);

    let mut product_to_seller: HashMap<i64, i64> = HashMap::new();
    for product in products {
        if let (Some(id), Some(seller_id)) = (product.id, product.id_seller) {
            product_to_seller.insert(id, seller_id);
        }
    }
    let seller_info = index_by_id(sellers, |s: &SellerRecord| s.id, "sellers", skips);

    let mut stats: GroupMap<i64, SellerAccumulator> = GroupMap::new();
    for line in product_orders {
        let order_id = match line.id_order {
            Some(id) if order_ids.contains(&id) => id,
            Some(_) => continue,
            None => {
                skips.record("product_orders", SkipReason::MissingField("id_order"));
                continue;
            }
        };
        let seller_id = match line.id_product.and_then(|p| product_to_seller.get(&p)) {
            Some(id) => *id,
            None => {
                skips.record("product_orders", SkipReason::UnknownReference("seller"));
                continue;
            }
        };

        let acc = stats.entry(seller_id);
        acc.sales += line.subtotal.unwrap_or(0.0);
        acc.orders.insert(order_id);
        acc.products_sold += 1;
    }

    let mut top_sellers: Vec<TopSellerItem> = Vec::new();
    for (seller_id, acc) in stats.into_entries() {
        let seller = match seller_info.get(&seller_id) {
            Some(s) => s,
            None => {
                skips.record("sellers", SkipReason::UnknownReference("seller"));
                continue;
            }
        };
        top_sellers.push(TopSellerItem {
            seller_id,
            seller_name: seller
                .seller_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            business_name: seller
                .business_name
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            total_sales: acc.sales,
            total_orders: acc.orders.len(),
            products_sold: acc.products_sold,
        });
    }

    sort_desc_by(&mut top_sellers, |item| item.total_sales);
    top_sellers.truncate(limit);

    TopSellersReport {
        period_start: start,
        period_end: end,
        top_sellers,
    }
}

fn stat_f64(payload: &Value, key: &str) -> f64 {
    payload.get(key).map(|v| coerce_f64(v, 0.0)).unwrap_or(0.0)
}

fn stat_usize(payload: &Value, key: &str) -> usize {
    payload
        .get(key)
        .map(|v| coerce_i64(v, 0))
        .unwrap_or(0)
        .max(0) as usize
}

/// Parse the delegated seller dashboard payload, unwrapping an optional
/// `data` envelope.
fn parse_seller_dashboard(seller_id: i64, payload: &Value) -> SellerDashboardStats {
    let body = payload.get("data").unwrap_or(payload);
    SellerDashboardStats {
        seller_id,
        today_sales: stat_f64(body, "today_sales"),
        today_orders: stat_usize(body, "today_orders"),
        month_revenue: stat_f64(body, "month_revenue"),
        month_orders: stat_usize(body, "month_orders"),
        total_products: stat_usize(body, "total_products"),
        low_stock_products: stat_usize(body, "low_stock_products"),
        total_revenue: stat_f64(body, "total_revenue"),
        total_orders: stat_usize(body, "total_orders"),
        pending_orders: stat_usize(body, "pending_orders"),
    }
}

fn parse_delegated_product_item(item: &Value) -> Option<ProductSalesItem> {
    let product_id = item.get("product_id").map(|v| coerce_i64(v, -1))?;
    if product_id < 0 {
        return None;
    }
    Some(ProductSalesItem {
        product_id,
        product_name: item
            .get("product_name")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string(),
        category_name: item
            .get("category_name")
            .and_then(|v| v.as_str())
            .unwrap_or("Uncategorized")
            .to_string(),
        units_sold: stat_usize(item, "units_sold"),
        total_revenue: stat_f64(item, "total_revenue"),
        average_price: stat_f64(item, "average_price"),
    })
}

impl ReportEngine {
    pub async fn top_sellers_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> TopSellersReport {
        let (raw_orders, raw_lines, raw_products, raw_sellers) = tokio::join!(
            self.source().fetch_list("/orders", &[]),
            self.source().fetch_list("/product-orders", &[]),
            self.source().fetch_list("/products", &[]),
            self.source().fetch_list("/sellers", &[]),
        );

        let orders = parse_all(&raw_orders, OrderRecord::from_value);
        let lines = parse_all(&raw_lines, ProductOrderRecord::from_value);
        let products = parse_all(&raw_products, ProductRecord::from_value);
        let sellers = parse_all(&raw_sellers, SellerRecord::from_value);

        let mut skips = SkipLog::new();
        let report = build_top_sellers_report(
            &orders, &lines, &products, &sellers, start, end, limit, &mut skips,
        );
        skips.emit("top_sellers_report");
        report
    }

    /// Seller dashboard, delegated to the pre-aggregated upstream endpoint.
    /// Any failure yields the all-zero stats object for that seller.
    pub async fn seller_dashboard_stats(&self, seller_id: i64) -> SellerDashboardStats {
        let path = format!("/statistics/seller/{}/dashboard", seller_id);
        match self.source().fetch_value(&path, &[]).await {
            Some(payload) => parse_seller_dashboard(seller_id, &payload),
            None => {
                log::warn!(
                    "Seller dashboard delegation failed for seller {}; returning zeroed stats",
                    seller_id
                );
                SellerDashboardStats::zeroed(seller_id)
            }
        }
    }

    /// Seller best-products, delegated upstream. Failure yields an empty
    /// report for the range.
    pub async fn seller_best_products(
        &self,
        seller_id: i64,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> BestProductsReport {
        let path = format!("/statistics/seller/{}/best-products", seller_id);
        let params = [
            ("start_date", start.format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("limit", limit.to_string()),
        ];

        let best_products = match self.source().fetch_value(&path, &params).await {
            Some(payload) => unwrap_list(&path, payload)
                .iter()
                .filter_map(parse_delegated_product_item)
                .collect(),
            None => {
                log::warn!(
                    "Seller best-products delegation failed for seller {}; returning empty report",
                    seller_id
                );
                Vec::new()
            }
        };

        BestProductsReport {
            period_start: start,
            period_end: end,
            best_products,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(id: i64, date: &str, status: &str) -> OrderRecord {
        OrderRecord::from_value(&json!({
            "id_order": id,
            "order_date": date,
            "status": status,
            "total_amount": 0.0,
        }))
    }

    fn line(id_order: i64, id_product: i64, subtotal: f64) -> ProductOrderRecord {
        ProductOrderRecord::from_value(&json!({
            "id_order": id_order,
            "id_product": id_product,
            "subtotal": subtotal,
            "price_unit": subtotal,
        }))
    }

    fn product(id: i64, id_seller: i64) -> ProductRecord {
        ProductRecord::from_value(&json!({"id_product": id, "id_seller": id_seller}))
    }

    fn seller(id: i64, name: &str) -> SellerRecord {
        SellerRecord::from_value(&json!({
            "id_seller": id,
            "seller_name": name,
            "bussines_name": format!("{} Co", name),
        }))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build(
        orders: &[OrderRecord],
        lines: &[ProductOrderRecord],
        products: &[ProductRecord],
        sellers: &[SellerRecord],
        limit: usize,
    ) -> (TopSellersReport, SkipLog) {
        let mut skips = SkipLog::new();
        let report = build_top_sellers_report(
            orders,
            lines,
            products,
            sellers,
            day(2025, 1, 1),
            day(2025, 1, 31),
            limit,
            &mut skips,
        );
        (report, skips)
    }

    #[test]
    fn test_ranking_and_distinct_orders() {
        let orders = vec![
            order(1, "2025-01-05", "completed"),
            order(2, "2025-01-06", "delivered"),
        ];
        // seller 1: two lines in the same order; seller 2: one bigger line
        let lines = vec![line(1, 10, 30.0), line(1, 10, 20.0), line(2, 20, 100.0)];
        let products = vec![product(10, 1), product(20, 2)];
        let sellers = vec![seller(1, "Ana"), seller(2, "Luis")];

        let (report, _) = build(&orders, &lines, &products, &sellers, 10);
        assert_eq!(report.top_sellers.len(), 2);
        assert_eq!(report.top_sellers[0].seller_id, 2);
        assert_eq!(report.top_sellers[0].total_sales, 100.0);
        assert_eq!(report.top_sellers[1].seller_id, 1);
        assert_eq!(report.top_sellers[1].total_sales, 50.0);
        // two lines, one order
        assert_eq!(report.top_sellers[1].total_orders, 1);
        assert_eq!(report.top_sellers[1].products_sold, 2);
    }

    #[test]
    fn test_unknown_product_line_skipped() {
        let orders = vec![order(1, "2025-01-05", "completed")];
        let lines = vec![line(1, 10, 30.0), line(1, 999, 500.0)];
        let products = vec![product(10, 1)];
        let sellers = vec![seller(1, "Ana")];

        let (report, skips) = build(&orders, &lines, &products, &sellers, 10);
        assert_eq!(report.top_sellers.len(), 1);
        assert_eq!(report.top_sellers[0].total_sales, 30.0);
        assert_eq!(
            skips.count("product_orders", SkipReason::UnknownReference("seller")),
            1
        );
    }

    #[test]
    fn test_seller_without_directory_record_dropped() {
        let orders = vec![order(1, "2025-01-05", "completed")];
        let lines = vec![line(1, 10, 30.0)];
        let products = vec![product(10, 7)];
        let sellers: Vec<SellerRecord> = Vec::new();

        let (report, _) = build(&orders, &lines, &products, &sellers, 10);
        assert!(report.top_sellers.is_empty());
    }

    #[test]
    fn test_group_revenue_sums_to_line_total() {
        let orders = vec![
            order(1, "2025-01-05", "completed"),
            order(2, "2025-01-06", "completed"),
        ];
        let lines = vec![line(1, 10, 25.0), line(1, 20, 75.0), line(2, 10, 10.0)];
        let products = vec![product(10, 1), product(20, 2)];
        let sellers = vec![seller(1, "Ana"), seller(2, "Luis")];

        let (report, _) = build(&orders, &lines, &products, &sellers, 10);
        let grouped: f64 = report.top_sellers.iter().map(|s| s.total_sales).sum();
        assert_eq!(grouped, 110.0);
    }

    #[test]
    fn test_limit_truncates() {
        let orders = vec![order(1, "2025-01-05", "completed")];
        let lines = vec![line(1, 10, 30.0), line(1, 20, 20.0), line(1, 30, 10.0)];
        let products = vec![product(10, 1), product(20, 2), product(30, 3)];
        let sellers = vec![seller(1, "A"), seller(2, "B"), seller(3, "C")];

        let (report, _) = build(&orders, &lines, &products, &sellers, 2);
        assert_eq!(report.top_sellers.len(), 2);
        assert_eq!(report.top_sellers[0].seller_id, 1);
    }

    #[test]
    fn test_parse_seller_dashboard_with_envelope() {
        let payload = json!({"data": {
            "today_sales": "12.5",
            "today_orders": 2,
            "month_revenue": 300.0,
            "month_orders": 9,
            "total_products": 14,
            "low_stock_products": 3,
            "total_revenue": 1500.5,
            "total_orders": 80,
            "pending_orders": 4
        }});
        let stats = parse_seller_dashboard(5, &payload);
        assert_eq!(stats.seller_id, 5);
        assert_eq!(stats.today_sales, 12.5);
        assert_eq!(stats.month_orders, 9);
        assert_eq!(stats.pending_orders, 4);
    }

    #[test]
    fn test_parse_seller_dashboard_garbage_is_zeroed_fields() {
        let stats = parse_seller_dashboard(5, &json!({"unexpected": true}));
        assert_eq!(stats, SellerDashboardStats::zeroed(5));
    }
}
