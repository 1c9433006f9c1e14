//! Product rankings: units sold and review ratings

use super::types::{
    BestProductsReport, ProductSalesItem, TopRatedProductItem, TopRatedProductsReport,
};
use super::{
    filter_orders, guarded_average, index_by_id, order_id_set, sort_desc_by, GroupMap,
    ReportEngine, SkipLog, SkipReason, StatusFilter,
};
use crate::records::{
    parse_all, CategoryRecord, OrderRecord, ProductOrderRecord, ProductRecord, ReviewRecord,
};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct ProductAccumulator {
    units: usize,
    revenue: f64,
    prices: Vec<f64>,
}

/// Rank products by units sold inside the range.
///
/// The upstream order line carries no reliable quantity field, so each
/// matching line counts as one unit; `average_price` is the unweighted mean
/// of the unit prices observed on those lines.
pub fn build_best_products_report(
    orders: &[OrderRecord],
    product_orders: &[ProductOrderRecord],
    products: &[ProductRecord],
    categories: &[CategoryRecord],
    start: NaiveDate,
    end: NaiveDate,
    limit: usize,
    skips: &mut SkipLog,
) -> BestProductsReport {
    let qualifying = filter_orders(orders, start, end, StatusFilter::Qualifying, skips);
    let order_ids = order_id_set(&qualifying, skips);

    let product_info = index_by_id(products, |p: &ProductRecord| p.id, "products", skips);
    let category_names = category_name_lookup(categories);

    let mut stats: GroupMap<i64, ProductAccumulator> = GroupMap::new();
    for line in product_orders {
        match line.id_order {
            Some(id) if order_ids.contains(&id) => {}
            Some(_) => continue,
            None => {
                skips.record("product_orders", SkipReason::MissingField("id_order"));
                continue;
            }
        }
        let product_id = match line.id_product {
            Some(id) => id,
            None => {
                skips.record("product_orders", SkipReason::MissingField("id_product"));
                continue;
            }
        };

        let acc = stats.entry(product_id);
        acc.units += 1;
        acc.revenue += line.subtotal.unwrap_or(0.0);
        if let Some(price) = line.price_unit {
            acc.prices.push(price);
        }
    }

    let mut best_products: Vec<ProductSalesItem> = Vec::new();
    for (product_id, acc) in stats.into_entries() {
        let product = match product_info.get(&product_id) {
            Some(p) => p,
            None => {
                skips.record("product_orders", SkipReason::UnknownReference("product"));
                continue;
            }
        };
        let price_sum: f64 = acc.prices.iter().sum();
        best_products.push(ProductSalesItem {
            product_id,
            product_name: product
                .product_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            category_name: resolve_category_name(&category_names, product.id_category),
            units_sold: acc.units,
            total_revenue: acc.revenue,
            average_price: guarded_average(price_sum, acc.prices.len()),
        });
    }

    sort_desc_by(&mut best_products, |item| item.units_sold as f64);
    best_products.truncate(limit);

    BestProductsReport {
        period_start: start,
        period_end: end,
        best_products,
    }
}

pub(crate) fn category_name_lookup(categories: &[CategoryRecord]) -> HashMap<i64, String> {
    categories
        .iter()
        .filter_map(|c| {
            let id = c.id?;
            let name = c.category_name.clone()?;
            Some((id, name))
        })
        .collect()
}

/// Category labels degrade to a placeholder instead of dropping the product.
pub(crate) fn resolve_category_name(
    names: &HashMap<i64, String>,
    id_category: Option<i64>,
) -> String {
    id_category
        .and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| "Uncategorized".to_string())
}

/// Build the top-rated ranking from per-product review collections.
///
/// Independent of any date range. Products with no rated review are excluded
/// entirely; `total_reviews` counts all fetched reviews, rated or not.
pub fn build_top_rated_products_report(
    products: &[ProductRecord],
    categories: &[CategoryRecord],
    reviews_by_product: &HashMap<i64, Vec<ReviewRecord>>,
    limit: usize,
    skips: &mut SkipLog,
) -> TopRatedProductsReport {
    let category_names = category_name_lookup(categories);

    let mut top_products: Vec<TopRatedProductItem> = Vec::new();
    for product in products {
        let product_id = match product.id {
            Some(id) => id,
            None => {
                skips.record("products", SkipReason::MissingField("id_product"));
                continue;
            }
        };
        let reviews = match reviews_by_product.get(&product_id) {
            Some(r) if !r.is_empty() => r,
            _ => continue,
        };

        let ratings: Vec<f64> = reviews
            .iter()
            .filter_map(|r| r.rating)
            .filter(|r| *r > 0.0)
            .collect();
        if ratings.is_empty() {
            continue;
        }

        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        top_products.push(TopRatedProductItem {
            product_id,
            product_name: product
                .product_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            category_name: resolve_category_name(&category_names, product.id_category),
            average_rating: (mean * 100.0).round() / 100.0,
            total_reviews: reviews.len(),
            units_sold: 0,
        });
    }

    // rating first, review count as tie break, both descending
    top_products.sort_by(|a, b| {
        b.average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.total_reviews.cmp(&a.total_reviews))
    });
    top_products.truncate(limit);

    TopRatedProductsReport { top_products }
}

impl ReportEngine {
    pub async fn best_products_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> BestProductsReport {
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
        let report = build_best_products_report(
            &orders,
            &lines,
            &products,
            &categories,
            start,
            end,
            limit,
            &mut skips,
        );
        skips.emit("best_products_report");
        report
    }

    pub async fn top_rated_products_report(&self, limit: usize) -> TopRatedProductsReport {
        let (raw_products, raw_categories) = tokio::join!(
            self.source().fetch_list("/products", &[]),
            self.source().fetch_list("/categories", &[]),
        );
        let products = parse_all(&raw_products, ProductRecord::from_value);
        let categories = parse_all(&raw_categories, CategoryRecord::from_value);

        // one review fetch per product; a failed fetch is an empty review set
        let mut reviews_by_product: HashMap<i64, Vec<ReviewRecord>> = HashMap::new();
        for product in &products {
            if let Some(product_id) = product.id {
                let path = format!("/orders/products/{}/reviews", product_id);
                let raw = self.source().fetch_list(&path, &[]).await;
                reviews_by_product
                    .insert(product_id, parse_all(&raw, ReviewRecord::from_value));
            }
        }

        let mut skips = SkipLog::new();
        let report = build_top_rated_products_report(
            &products,
            &categories,
            &reviews_by_product,
            limit,
            &mut skips,
        );
        skips.emit("top_rated_products_report");
        report
    }
}
