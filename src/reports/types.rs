//! Report result shapes
//!
//! Immutable output contracts for every report builder. Field names are the
//! wire contract consumed by the admin and seller dashboards; all computation
//! lives in the builders, none here.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReportItem {
    /// Period key: "2025-01-15", "2025-W03", "2025-01" or "2025"
    pub period: String,
    pub total_sales: f64,
    pub total_orders: usize,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_revenue: f64,
    pub total_orders: usize,
    pub average_order_value: f64,
    pub sales_by_period: Vec<SalesReportItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSellerItem {
    pub seller_id: i64,
    pub seller_name: String,
    pub business_name: String,
    pub total_sales: f64,
    pub total_orders: usize,
    pub products_sold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSellersReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub top_sellers: Vec<TopSellerItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSalesItem {
    pub product_id: i64,
    pub product_name: String,
    pub category_name: String,
    pub units_sold: usize,
    pub total_revenue: f64,
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestProductsReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub best_products: Vec<ProductSalesItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRatedProductItem {
    pub product_id: i64,
    pub product_name: String,
    pub category_name: String,
    /// Mean of present ratings, rounded to 2 decimals
    pub average_rating: f64,
    pub total_reviews: usize,
    pub units_sold: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopRatedProductsReport {
    pub top_products: Vec<TopRatedProductItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySalesItem {
    pub category_id: i64,
    pub category_name: String,
    pub total_sales: f64,
    pub total_orders: usize,
    pub products_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySalesReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub categories: Vec<CategorySalesItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientActivityItem {
    pub client_id: i64,
    pub client_name: String,
    pub client_email: String,
    pub total_orders: usize,
    pub total_spent: f64,
    pub last_order_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientsReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_clients: usize,
    pub new_clients: usize,
    pub active_clients: usize,
    pub top_clients: Vec<ClientActivityItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Critical,
    Warning,
    Ok,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockItem {
    pub product_id: i64,
    pub product_name: String,
    pub seller_name: String,
    pub current_stock: i64,
    pub min_stock_threshold: i64,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    pub total_products: usize,
    pub out_of_stock: usize,
    pub low_stock: usize,
    pub critical_products: Vec<LowStockItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryStatusItem {
    pub status: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryPerformanceReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_deliveries: usize,
    pub completed: usize,
    pub pending: usize,
    pub cancelled: usize,
    pub average_delivery_time_hours: f64,
    pub status_breakdown: Vec<DeliveryStatusItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodItem {
    pub method_name: String,
    pub total_transactions: usize,
    pub total_amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_revenue: f64,
    pub total_orders: usize,
    pub payment_methods: Vec<PaymentMethodItem>,
    pub average_transaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub today_sales: f64,
    pub today_orders: usize,
    pub total_active_clients: usize,
    pub total_active_sellers: usize,
    pub total_products: usize,
    pub pending_deliveries: usize,
    pub low_stock_products: usize,
    pub month_revenue: f64,
    pub month_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct SellerDashboardStats {
    pub seller_id: i64,
    pub today_sales: f64,
    pub today_orders: usize,
    pub month_revenue: f64,
    pub month_orders: usize,
    pub total_products: usize,
    pub low_stock_products: usize,
    pub total_revenue: f64,
    pub total_orders: usize,
    pub pending_orders: usize,
}

impl SellerDashboardStats {
    /// All-zero stats for a seller whose delegated dashboard fetch failed.
    pub fn zeroed(seller_id: i64) -> Self {
        Self {
            seller_id,
            ..Self::default()
        }
    }
}
