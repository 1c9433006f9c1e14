//! Tolerant record model for upstream collections
//!
//! Every upstream record arrives as loose JSON. Each struct here captures the
//! fields the aggregation engine actually joins on, all optional, populated by
//! a `from_value` constructor that never fails: a missing or wrong-typed field
//! simply parses to `None` and is dealt with per-report.
//!
//! Primary keys accept both the upstream's `id_<entity>` spelling and a plain
//! `id`, since the REST source is not consistent between resources.

use crate::coerce::{coerce_datetime, coerce_f64, coerce_i64};
use chrono::NaiveDateTime;
use serde_json::Value;

fn get<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|k| record.get(*k))
        .filter(|v| !v.is_null())
}

fn get_i64(record: &Value, keys: &[&str]) -> Option<i64> {
    let v = get(record, keys)?;
    match v {
        Value::Number(_) | Value::String(_) => {
            let parsed = coerce_i64(v, i64::MIN);
            (parsed != i64::MIN).then_some(parsed)
        }
        _ => None,
    }
}

fn get_f64(record: &Value, keys: &[&str]) -> Option<f64> {
    let v = get(record, keys)?;
    match v {
        Value::Number(_) | Value::String(_) => {
            let parsed = coerce_f64(v, f64::NAN);
            (!parsed.is_nan()).then_some(parsed)
        }
        _ => None,
    }
}

fn get_string(record: &Value, keys: &[&str]) -> Option<String> {
    get(record, keys)?.as_str().map(|s| s.to_string())
}

fn get_datetime(record: &Value, keys: &[&str]) -> Option<NaiveDateTime> {
    get(record, keys).and_then(coerce_datetime)
}

#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: Option<i64>,
    pub order_date: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub total_amount: Option<f64>,
    pub id_client: Option<i64>,
    pub id_cart: Option<i64>,
    pub id_payment_method: Option<i64>,
    pub id_delivery: Option<i64>,
}

impl OrderRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_order", "id"]),
            order_date: get_datetime(v, &["order_date"]),
            status: get_string(v, &["status"]),
            total_amount: get_f64(v, &["total_amount"]),
            id_client: get_i64(v, &["id_client"]),
            id_cart: get_i64(v, &["id_cart"]),
            id_payment_method: get_i64(v, &["id_payment_method"]),
            id_delivery: get_i64(v, &["id_delivery"]),
        }
    }
}

/// One product line inside an order.
#[derive(Debug, Clone)]
pub struct ProductOrderRecord {
    pub id: Option<i64>,
    pub id_order: Option<i64>,
    pub id_product: Option<i64>,
    pub price_unit: Option<f64>,
    pub subtotal: Option<f64>,
    pub rating: Option<f64>,
}

impl ProductOrderRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_product_order", "id"]),
            id_order: get_i64(v, &["id_order"]),
            id_product: get_i64(v, &["id_product"]),
            price_unit: get_f64(v, &["price_unit"]),
            subtotal: get_f64(v, &["subtotal"]),
            rating: get_f64(v, &["rating"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: Option<i64>,
    pub id_seller: Option<i64>,
    pub id_category: Option<i64>,
    pub product_name: Option<String>,
    pub stock: Option<i64>,
    pub price: Option<f64>,
}

impl ProductRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_product", "id"]),
            id_seller: get_i64(v, &["id_seller"]),
            id_category: get_i64(v, &["id_category"]),
            product_name: get_string(v, &["product_name"]),
            stock: get_i64(v, &["stock"]),
            price: get_f64(v, &["price"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRecord {
    pub id: Option<i64>,
    pub category_name: Option<String>,
}

impl CategoryRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_category", "id"]),
            category_name: get_string(v, &["category_name"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SellerRecord {
    pub id: Option<i64>,
    pub seller_name: Option<String>,
    pub business_name: Option<String>,
}

impl SellerRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_seller", "id"]),
            seller_name: get_string(v, &["seller_name"]),
            // upstream spells this field "bussines_name"
            business_name: get_string(v, &["business_name", "bussines_name"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientRecord {
    pub id: Option<i64>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl ClientRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_client", "id"]),
            client_name: get_string(v, &["client_name"]),
            client_email: get_string(v, &["client_email"]),
            created_at: get_datetime(v, &["created_at"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub id: Option<i64>,
    pub status: Option<String>,
}

impl DeliveryRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_delivery", "id"]),
            status: get_string(v, &["status"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentMethodRecord {
    pub id: Option<i64>,
    pub method_name: Option<String>,
}

impl PaymentMethodRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            id: get_i64(v, &["id_payment_method", "id"]),
            method_name: get_string(v, &["method_name"]),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewRecord {
    pub rating: Option<f64>,
}

impl ReviewRecord {
    pub fn from_value(v: &Value) -> Self {
        Self {
            rating: get_f64(v, &["rating"]),
        }
    }
}

/// Parse a whole raw collection with the given per-record constructor.
pub fn parse_all<T>(raw: &[Value], from_value: fn(&Value) -> T) -> Vec<T> {
    raw.iter().map(from_value).collect()
}
