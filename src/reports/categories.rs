//! Category sales breakdown

use super::types::{CategorySalesItem, CategorySalesReport};
use super::{
    filter_orders, order_id_set, sort_desc_by, GroupMap, ReportEngine, SkipLog, SkipReason,
    StatusFilter,
};
use crate::records::{parse_all, CategoryRecord, OrderRecord, ProductOrderRecord, ProductRecord};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct CategoryAccumulator {
    sales: f64,
    orders: HashSet<i64>,
    products: HashSet<i64>,
}

/// Revenue per category over the range.
///
/// Unlike the seller and product rankings, a category group without a
/// directory record is kept under a placeholder label rather than dropped:
/// miscategorized revenue should stay visible in the breakdown.
pub fn build_category_sales_report(
    orders: &[OrderRecord],
    product_orders: &[ProductOrderRecord],
    products: &[ProductRecord],
    categories: &[CategoryRecord],
    start: NaiveDate,
    end: NaiveDate,
    skips: &mut SkipLog,
) -> CategorySalesReport {
    let qualifying = filter_orders(orders, start, end, StatusFilter::Qualifying, skips);
    let order_ids = order_id_set(&qualifying, skips);

    let mut product_to_category: HashMap<i64, i64> = HashMap::new();
    for product in products {
        if let (Some(id), Some(category_id)) = (product.id, product.id_category) {
            product_to_category.insert(id, category_id);
        }
    }
    let category_names = super::products::category_name_lookup(categories);

    let mut stats: GroupMap<i64, CategoryAccumulator> = GroupMap::new();
    for line in product_orders {
        let order_id = match line.id_order {
            Some(id) if order_ids.contains(&id) => id,
            Some(_) => continue,
            None => {
                skips.record("product_orders", SkipReason::MissingField("id_order"));
                continue;
            }
        };
        let product_id = match line.id_product {
            Some(id) => id,
            None => {
                skips.record("product_orders", SkipReason::MissingField("id_product"));
                continue;
            }
        };
        let category_id = match product_to_category.get(&product_id) {
            Some(id) => *id,
            None => {
                skips.record("product_orders", SkipReason::UnknownReference("category"));
                continue;
            }
        };

        let acc = stats.entry(category_id);
        acc.sales += line.subtotal.unwrap_or(0.0);
        acc.orders.insert(order_id);
        acc.products.insert(product_id);
    }

    let mut items: Vec<CategorySalesItem> = stats
        .into_entries()
        .into_iter()
        .map(|(category_id, acc)| CategorySalesItem {
            category_id,
            category_name: category_names
                .get(&category_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            total_sales: acc.sales,
            total_orders: acc.orders.len(),
            products_count: acc.products.len(),
        })
        .collect();

    sort_desc_by(&mut items, |item| item.total_sales);

    CategorySalesReport {
        period_start: start,
        period_end: end,
        categories: items,
    }
}

impl ReportEngine {
    pub async fn category_sales_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CategorySalesReport {
        let (raw_orders, raw_lines, raw_products, raw_categories) = tokio::join!(
            self.source().fetch_list("/orders", &[]),
            self.source().fetch_list("/product-orders", &[]),
            self.source().fetch_list("/products", &[]),
            self.source().fetch_list("/categories", &[]),
        );

        let orders = parse_all(&raw_orders, OrderRecord::from_value);
        let lines = parse_all(&raw_lines, ProductOrderRecord::from_value);
        let products = parse_all(&raw_products, ProductRecord::from_value);
        let categories = parse_all(&raw_categories, CategoryRecord::from_value);

        let mut skips = SkipLog::new();
        let report = build_category_sales_report(
            &orders,
            &lines,
            &products,
            &categories,
            start,
            end,
            &mut skips,
        );
        skips.emit("category_sales_report");
        report
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
        }))
    }

    fn product(id: i64, id_category: i64) -> ProductRecord {
        ProductRecord::from_value(&json!({"id_product": id, "id_category": id_category}))
    }

    fn category(id: i64, name: &str) -> CategoryRecord {
        CategoryRecord::from_value(&json!({"id_category": id, "category_name": name}))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_grouping_and_distinct_counts() {
        let orders = vec![
            order(1, "2025-01-05", "completed"),
            order(2, "2025-01-06", "delivered"),
            order(3, "2025-01-07", "cancelled"),
        ];
        let lines = vec![
            line(1, 10, 30.0),
            line(1, 11, 20.0),
            line(2, 10, 50.0),
            line(3, 10, 999.0), // cancelled order, excluded
        ];
        let products = vec![product(10, 1), product(11, 1)];
        let categories = vec![category(1, "Pescados")];

        let mut skips = SkipLog::new();
        let report = build_category_sales_report(
            &orders,
            &lines,
            &products,
            &categories,
            day(2025, 1, 1),
            day(2025, 1, 31),
            &mut skips,
        );
        assert_eq!(report.categories.len(), 1);
        let item = &report.categories[0];
        assert_eq!(item.category_name, "Pescados");
        assert_eq!(item.total_sales, 100.0);
        assert_eq!(item.total_orders, 2);
        assert_eq!(item.products_count, 2);
    }

    #[test]
    fn test_unknown_category_label_placeholder_kept() {
        let orders = vec![order(1, "2025-01-05", "completed")];
        let lines = vec![line(1, 10, 30.0)];
        let products = vec![product(10, 77)];
        let categories = vec![category(1, "Pescados")];

        let mut skips = SkipLog::new();
        let report = build_category_sales_report(
            &orders,
            &lines,
            &products,
            &categories,
            day(2025, 1, 1),
            day(2025, 1, 31),
            &mut skips,
        );
        assert_eq!(report.categories.len(), 1);
        assert_eq!(report.categories[0].category_id, 77);
        assert_eq!(report.categories[0].category_name, "Unknown");
    }

    #[test]
    fn test_group_sales_sum_to_resolvable_line_total() {
        let orders = vec![order(1, "2025-01-05", "completed")];
        let lines = vec![line(1, 10, 25.0), line(1, 11, 75.0), line(1, 404, 13.0)];
        let products = vec![product(10, 1), product(11, 2)];
        let categories = vec![category(1, "Pescados"), category(2, "Mariscos")];

        let mut skips = SkipLog::new();
        let report = build_category_sales_report(
            &orders,
            &lines,
            &products,
            &categories,
            day(2025, 1, 1),
            day(2025, 1, 31),
            &mut skips,
        );
        // line for the unknown product 404 contributes nowhere
        let grouped: f64 = report.categories.iter().map(|c| c.total_sales).sum();
        assert_eq!(grouped, 100.0);
        assert_eq!(
            skips.count("product_orders", SkipReason::UnknownReference("category")),
            1
        );
    }
}
