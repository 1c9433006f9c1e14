//! Query surface over the report engine
//!
//! Thin layer that normalizes caller input (date ranges, limits, seller
//! identifiers) before handing off to `ReportEngine`. All defaulting lives
//! here so the builders never see an absent range or a zero limit.

use crate::reports::sales::ReportPeriod;
use crate::reports::types::{
    BestProductsReport, CategorySalesReport, ClientsReport, DashboardStats,
    DeliveryPerformanceReport, FinancialReport, InventoryReport, SalesReport,
    SellerDashboardStats, TopRatedProductsReport, TopSellersReport,
};
use crate::reports::ReportEngine;
use crate::resolver::{ResolveError, SellerResolver};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;

const DEFAULT_RANGE_DAYS: i64 = 30;
/// Delegated seller rankings default to "all time" in practice.
const SELLER_PRODUCTS_RANGE_DAYS: i64 = 3650;

const DEFAULT_TOP_SELLERS_LIMIT: usize = 10;
const DEFAULT_BEST_PRODUCTS_LIMIT: usize = 20;
const DEFAULT_TOP_RATED_LIMIT: usize = 20;
const DEFAULT_TOP_CLIENTS_LIMIT: usize = 10;
const DEFAULT_SELLER_PRODUCTS_LIMIT: usize = 10;
const DEFAULT_STOCK_THRESHOLD: i64 = 10;

/// Inclusive day-granularity date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Trailing window of `days` ending today.
    fn trailing(days: i64) -> Self {
        let end = Utc::now().date_naive();
        Self {
            start: end - Duration::days(days),
            end,
        }
    }
}

fn range_or_default(range: Option<DateRange>) -> DateRange {
    range.unwrap_or_else(|| DateRange::trailing(DEFAULT_RANGE_DAYS))
}

fn limit_or(limit: Option<usize>, default: usize) -> usize {
    match limit {
        Some(n) if n > 0 => n,
        _ => default,
    }
}

pub struct ReportQueries {
    engine: ReportEngine,
    resolver: SellerResolver,
}

impl ReportQueries {
    pub fn new(engine: ReportEngine, resolver: SellerResolver) -> Self {
        Self { engine, resolver }
    }

    pub async fn sales_report(
        &self,
        range: Option<DateRange>,
        period: ReportPeriod,
    ) -> SalesReport {
        let range = range_or_default(range);
        self.engine.sales_report(range.start, range.end, period).await
    }

    pub async fn top_sellers_report(
        &self,
        range: Option<DateRange>,
        limit: Option<usize>,
    ) -> TopSellersReport {
        let range = range_or_default(range);
        let limit = limit_or(limit, DEFAULT_TOP_SELLERS_LIMIT);
        self.engine.top_sellers_report(range.start, range.end, limit).await
    }

    pub async fn best_products_report(
        &self,
        range: Option<DateRange>,
        limit: Option<usize>,
    ) -> BestProductsReport {
        let range = range_or_default(range);
        let limit = limit_or(limit, DEFAULT_BEST_PRODUCTS_LIMIT);
        self.engine.best_products_report(range.start, range.end, limit).await
    }

    /// Ratings are lifetime figures, so no date range applies here.
    pub async fn top_rated_products_report(&self, limit: Option<usize>) -> TopRatedProductsReport {
        let limit = limit_or(limit, DEFAULT_TOP_RATED_LIMIT);
        self.engine.top_rated_products_report(limit).await
    }

    pub async fn category_sales_report(&self, range: Option<DateRange>) -> CategorySalesReport {
        let range = range_or_default(range);
        self.engine.category_sales_report(range.start, range.end).await
    }

    pub async fn clients_report(
        &self,
        range: Option<DateRange>,
        top_limit: Option<usize>,
    ) -> ClientsReport {
        let range = range_or_default(range);
        let top_limit = limit_or(top_limit, DEFAULT_TOP_CLIENTS_LIMIT);
        self.engine.clients_report(range.start, range.end, top_limit).await
    }

    pub async fn inventory_report(&self, min_stock_threshold: Option<i64>) -> InventoryReport {
        let threshold = match min_stock_threshold {
            Some(t) if t > 0 => t,
            _ => DEFAULT_STOCK_THRESHOLD,
        };
        self.engine.inventory_report(threshold).await
    }

    pub async fn delivery_performance_report(
        &self,
        range: Option<DateRange>,
    ) -> DeliveryPerformanceReport {
        let range = range_or_default(range);
        self.engine
            .delivery_performance_report(range.start, range.end)
            .await
    }

    pub async fn financial_report(&self, range: Option<DateRange>) -> FinancialReport {
        let range = range_or_default(range);
        self.engine.financial_report(range.start, range.end).await
    }

    pub async fn dashboard_stats(&self) -> DashboardStats {
        self.engine.dashboard_stats(Utc::now().date_naive()).await
    }

    /// Seller-scoped dashboard. Resolution failures propagate; delegated
    /// statistics failures do not.
    pub async fn seller_dashboard_stats(
        &self,
        seller_identifier: &str,
    ) -> Result<SellerDashboardStats, ResolveError> {
        let seller_id = self.resolver.resolve(seller_identifier).await?;
        Ok(self.engine.seller_dashboard_stats(seller_id).await)
    }

    pub async fn seller_best_products(
        &self,
        seller_identifier: &str,
        range: Option<DateRange>,
        limit: Option<usize>,
    ) -> Result<BestProductsReport, ResolveError> {
        let seller_id = self.resolver.resolve(seller_identifier).await?;
        let range =
            range.unwrap_or_else(|| DateRange::trailing(SELLER_PRODUCTS_RANGE_DAYS));
        let limit = limit_or(limit, DEFAULT_SELLER_PRODUCTS_LIMIT);
        Ok(self
            .engine
            .seller_best_products(seller_id, range.start, range.end, limit)
            .await)
    }

    /// Raw collection passthrough, no aggregation or reshaping.
    pub async fn list_records(&self, resource: &str) -> Vec<Value> {
        let path = format!("/{}", resource.trim_start_matches('/'));
        self.engine.source().fetch_list(&path, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaulting() {
        assert_eq!(limit_or(None, 10), 10);
        assert_eq!(limit_or(Some(0), 10), 10);
        assert_eq!(limit_or(Some(5), 10), 5);
    }

    #[test]
    fn test_default_range_is_trailing_thirty_days() {
        let range = range_or_default(None);
        assert_eq!(range.end - range.start, Duration::days(30));
    }

    #[test]
    fn test_explicit_range_passes_through() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let range = range_or_default(Some(DateRange::new(start, end)));
        assert_eq!(range.start, start);
        assert_eq!(range.end, end);
    }
}
