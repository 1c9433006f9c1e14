//! Report CLI - run one named report and print its JSON
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin report_cli -- <report> [options]
//! ```
//!
//! Reports: sales, top-sellers, best-products, top-rated, categories,
//! clients, inventory, deliveries, financial, dashboard, seller-dashboard,
//! seller-best-products, list
//!
//! ## Options
//!
//! - `--start YYYY-MM-DD` / `--end YYYY-MM-DD` - date range (default: trailing 30 days)
//! - `--period daily|weekly|monthly|yearly|custom` - sales bucketing (default: daily)
//! - `--limit N` - ranking size where the report has one
//! - `--threshold N` - low-stock threshold for the inventory report
//! - `--seller ID` - seller id or external user reference for seller-scoped reports
//! - `--resource NAME` - collection name for the raw `list` passthrough
//!
//! ## Environment Variables
//!
//! - REST_API_URL - upstream base URL (default: http://127.0.0.1:3000/api)
//! - SERVICE_TOKEN - internal service secret (required)
//! - SERVICE_NAME - announced service name (default: report-service)
//! - HTTP_TIMEOUT_SECS - per-request timeout (default: 30)
//! - RUST_LOG - logging level (optional, default: info)

use chrono::NaiveDate;
use marketflow::config::ReportConfig;
use marketflow::fetch::DataFetcher;
use marketflow::queries::{DateRange, ReportQueries};
use marketflow::reports::sales::ReportPeriod;
use marketflow::reports::ReportEngine;
use marketflow::resolver::SellerResolver;
use std::env;
use std::sync::Arc;

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn parse_date(args: &[String], flag: &str) -> Result<Option<NaiveDate>, String> {
    match arg_value(args, flag) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{} expects YYYY-MM-DD, got '{}'", flag, raw)),
    }
}

fn parse_range(args: &[String]) -> Result<Option<DateRange>, String> {
    let start = parse_date(args, "--start")?;
    let end = parse_date(args, "--end")?;
    match (start, end) {
        (Some(s), Some(e)) => {
            if s > e {
                return Err("--start must not be after --end".to_string());
            }
            Ok(Some(DateRange::new(s, e)))
        }
        (None, None) => Ok(None),
        _ => Err("--start and --end must be given together".to_string()),
    }
}

fn parse_limit(args: &[String]) -> Result<Option<usize>, String> {
    match arg_value(args, "--limit") {
        None => Ok(None),
        Some(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("--limit expects an integer, got '{}'", raw)),
    }
}

fn usage() -> String {
    "usage: report_cli <report> [--start YYYY-MM-DD --end YYYY-MM-DD] \
     [--period P] [--limit N] [--threshold N] [--seller ID] [--resource NAME]\n\
     reports: sales top-sellers best-products top-rated categories clients \
     inventory deliveries financial dashboard seller-dashboard \
     seller-best-products list"
        .to_string()
}

async fn run(queries: &ReportQueries, report: &str, args: &[String]) -> Result<String, String> {
    let range = parse_range(args)?;
    let limit = parse_limit(args)?;

    let json = match report {
        "sales" => {
            let period = match arg_value(args, "--period") {
                None => ReportPeriod::Daily,
                Some(raw) => ReportPeriod::from_str(&raw)
                    .ok_or_else(|| format!("unknown period '{}'", raw))?,
            };
            serde_json::to_value(queries.sales_report(range, period).await)
        }
        "top-sellers" => serde_json::to_value(queries.top_sellers_report(range, limit).await),
        "best-products" => serde_json::to_value(queries.best_products_report(range, limit).await),
        "top-rated" => serde_json::to_value(queries.top_rated_products_report(limit).await),
        "categories" => serde_json::to_value(queries.category_sales_report(range).await),
        "clients" => serde_json::to_value(queries.clients_report(range, limit).await),
        "inventory" => {
            let threshold = match arg_value(args, "--threshold") {
                None => None,
                Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                    format!("--threshold expects an integer, got '{}'", raw)
                })?),
            };
            serde_json::to_value(queries.inventory_report(threshold).await)
        }
        "deliveries" => serde_json::to_value(queries.delivery_performance_report(range).await),
        "financial" => serde_json::to_value(queries.financial_report(range).await),
        "dashboard" => serde_json::to_value(queries.dashboard_stats().await),
        "seller-dashboard" => {
            let seller = arg_value(args, "--seller")
                .ok_or_else(|| "seller-dashboard requires --seller".to_string())?;
            let stats = queries
                .seller_dashboard_stats(&seller)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(stats)
        }
        "seller-best-products" => {
            let seller = arg_value(args, "--seller")
                .ok_or_else(|| "seller-best-products requires --seller".to_string())?;
            let report = queries
                .seller_best_products(&seller, range, limit)
                .await
                .map_err(|e| e.to_string())?;
            serde_json::to_value(report)
        }
        "list" => {
            let resource = arg_value(args, "--resource")
                .ok_or_else(|| "list requires --resource".to_string())?;
            serde_json::to_value(queries.list_records(&resource).await)
        }
        other => return Err(format!("unknown report '{}'\n{}", other, usage())),
    };

    json.and_then(|v| serde_json::to_string_pretty(&v))
        .map_err(|e| format!("failed to serialize report: {}", e))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let report = match args.first() {
        Some(r) => r.clone(),
        None => {
            eprintln!("{}", usage());
            std::process::exit(2);
        }
    };

    let config = ReportConfig::from_env()?;
    let fetcher = DataFetcher::new(config.clone())?;
    let resolver = SellerResolver::new(config)?;
    let engine = ReportEngine::new(Arc::new(fetcher));
    let queries = ReportQueries::new(engine, resolver);

    match run(&queries, &report, &args[1..]).await {
        Ok(json) => {
            println!("{}", json);
            Ok(())
        }
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }
}
