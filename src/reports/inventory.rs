//! Inventory health report

use super::types::{InventoryReport, LowStockItem, StockStatus};
use super::{ReportEngine, SkipLog, SkipReason};
use crate::records::{parse_all, ProductRecord, SellerRecord};
use std::collections::HashMap;

/// Classify every product's stock level and surface the unhealthy ones.
///
/// `critical` means sold out, `warning` means at or below the caller's
/// threshold. Only non-`ok` products are returned, sold-out first and then
/// by ascending stock. Products without a stock field are skipped.
pub fn build_inventory_report(
    products: &[ProductRecord],
    sellers: &[SellerRecord],
    min_stock_threshold: i64,
    skips: &mut SkipLog,
) -> InventoryReport {
    let mut seller_names: HashMap<i64, String> = HashMap::new();
    for seller in sellers {
        if let (Some(id), Some(name)) = (seller.id, seller.seller_name.clone()) {
            seller_names.insert(id, name);
        }
    }

    let mut out_of_stock = 0;
    let mut low_stock = 0;
    let mut critical_products: Vec<LowStockItem> = Vec::new();

    for product in products {
        let stock = match product.stock {
            Some(s) => s,
            None => {
                skips.record("products", SkipReason::MissingField("stock"));
                continue;
            }
        };

        let status = if stock == 0 {
            out_of_stock += 1;
            StockStatus::Critical
        } else if stock <= min_stock_threshold {
            low_stock += 1;
            StockStatus::Warning
        } else {
            StockStatus::Ok
        };

        if status != StockStatus::Ok {
            critical_products.push(LowStockItem {
                product_id: product.id.unwrap_or(0),
                product_name: product
                    .product_name
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
                seller_name: product
                    .id_seller
                    .and_then(|id| seller_names.get(&id).cloned())
                    .unwrap_or_else(|| "Unknown".to_string()),
                current_stock: stock,
                min_stock_threshold,
                status,
            });
        }
    }

    // sold-out first, then ascending stock
    critical_products.sort_by_key(|item| {
        let rank = if item.status == StockStatus::Critical { 0 } else { 1 };
        (rank, item.current_stock)
    });

    InventoryReport {
        total_products: products.len(),
        out_of_stock,
        low_stock,
        critical_products,
    }
}

impl ReportEngine {
    pub async fn inventory_report(&self, min_stock_threshold: i64) -> InventoryReport {
        let (raw_products, raw_sellers) = tokio::join!(
            self.source().fetch_list("/products", &[]),
            self.source().fetch_list("/sellers", &[]),
        );
        let products = parse_all(&raw_products, ProductRecord::from_value);
        let sellers = parse_all(&raw_sellers, SellerRecord::from_value);

        let mut skips = SkipLog::new();
        let report = build_inventory_report(&products, &sellers, min_stock_threshold, &mut skips);
        skips.emit("inventory_report");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product(id: i64, stock: i64, id_seller: i64) -> ProductRecord {
        ProductRecord::from_value(&json!({
            "id_product": id,
            "product_name": format!("product-{}", id),
            "stock": stock,
            "id_seller": id_seller,
        }))
    }

    fn seller(id: i64, name: &str) -> SellerRecord {
        SellerRecord::from_value(&json!({"id_seller": id, "seller_name": name}))
    }

    #[test]
    fn test_classification_and_ordering() {
        let products = vec![product(1, 0, 1), product(2, 5, 1), product(3, 20, 1)];
        let sellers = vec![seller(1, "Ana")];

        let mut skips = SkipLog::new();
        let report = build_inventory_report(&products, &sellers, 10, &mut skips);

        assert_eq!(report.total_products, 3);
        assert_eq!(report.out_of_stock, 1);
        assert_eq!(report.low_stock, 1);

        let stocks: Vec<_> = report
            .critical_products
            .iter()
            .map(|i| i.current_stock)
            .collect();
        assert_eq!(stocks, vec![0, 5]);
        assert_eq!(report.critical_products[0].status, StockStatus::Critical);
        assert_eq!(report.critical_products[1].status, StockStatus::Warning);
        assert_eq!(report.critical_products[0].seller_name, "Ana");
    }

    #[test]
    fn test_warning_sorted_before_larger_warning() {
        let products = vec![product(1, 9, 1), product(2, 2, 1), product(3, 0, 1)];
        let sellers = vec![seller(1, "Ana")];

        let mut skips = SkipLog::new();
        let report = build_inventory_report(&products, &sellers, 10, &mut skips);
        let stocks: Vec<_> = report
            .critical_products
            .iter()
            .map(|i| i.current_stock)
            .collect();
        assert_eq!(stocks, vec![0, 2, 9]);
    }

    #[test]
    fn test_missing_stock_skipped_but_counted_in_total() {
        let products = vec![
            product(1, 0, 1),
            ProductRecord::from_value(&json!({"id_product": 2})),
        ];
        let mut skips = SkipLog::new();
        let report = build_inventory_report(&products, &[], 10, &mut skips);
        assert_eq!(report.total_products, 2);
        assert_eq!(report.out_of_stock, 1);
        assert_eq!(report.critical_products.len(), 1);
        assert_eq!(skips.count("products", SkipReason::MissingField("stock")), 1);
    }

    #[test]
    fn test_unknown_seller_label() {
        let products = vec![product(1, 0, 42)];
        let mut skips = SkipLog::new();
        let report = build_inventory_report(&products, &[], 10, &mut skips);
        assert_eq!(report.critical_products[0].seller_name, "Unknown");
    }

    #[test]
    fn test_boundary_stock_equal_threshold_is_warning() {
        let products = vec![product(1, 10, 1)];
        let mut skips = SkipLog::new();
        let report = build_inventory_report(&products, &[], 10, &mut skips);
        assert_eq!(report.low_stock, 1);
        assert_eq!(report.critical_products[0].status, StockStatus::Warning);
    }
}
