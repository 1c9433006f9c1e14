//! Client activity report

use super::types::{ClientActivityItem, ClientsReport};
use super::{
    filter_orders, index_by_id, sort_desc_by, GroupMap, ReportEngine, SkipLog, SkipReason,
    StatusFilter,
};
use crate::records::{parse_all, ClientRecord, OrderRecord};
use chrono::{NaiveDate, NaiveDateTime};

#[derive(Debug, Default)]
struct ClientAccumulator {
    orders: usize,
    spent: f64,
    last_order: Option<NaiveDateTime>,
}

/// Client totals over the range: registrations, activity and top spenders.
///
/// `new_clients` counts registrations (`created_at`) inside the range;
/// `active_clients` counts distinct clients with at least one qualifying
/// order, whether or not the directory still knows them. Only clients with a
/// directory record appear in `top_clients`.
pub fn build_clients_report(
    clients: &[ClientRecord],
    orders: &[OrderRecord],
    start: NaiveDate,
    end: NaiveDate,
    top_limit: usize,
    skips: &mut SkipLog,
) -> ClientsReport {
    let qualifying = filter_orders(orders, start, end, StatusFilter::Qualifying, skips);

    let new_clients = clients
        .iter()
        .filter(|c| match c.created_at {
            Some(created) => {
                let d = created.date();
                d >= start && d <= end
            }
            None => false,
        })
        .count();

    let mut activity: GroupMap<i64, ClientAccumulator> = GroupMap::new();
    for order in &qualifying {
        let client_id = match order.id_client {
            Some(id) => id,
            None => {
                skips.record("orders", SkipReason::MissingField("id_client"));
                continue;
            }
        };
        let acc = activity.entry(client_id);
        acc.orders += 1;
        acc.spent += order.total_amount.unwrap_or(0.0);
        if let Some(dt) = order.order_date {
            if acc.last_order.map(|prev| dt > prev).unwrap_or(true) {
                acc.last_order = Some(dt);
            }
        }
    }
    let active_clients = activity.len();

    let client_info = index_by_id(clients, |c: &ClientRecord| c.id, "clients", skips);

    let mut top_clients: Vec<ClientActivityItem> = Vec::new();
    for (client_id, acc) in activity.into_entries() {
        let client = match client_info.get(&client_id) {
            Some(c) => c,
            None => {
                skips.record("orders", SkipReason::UnknownReference("client"));
                continue;
            }
        };
        top_clients.push(ClientActivityItem {
            client_id,
            client_name: client
                .client_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            client_email: client.client_email.clone().unwrap_or_default(),
            total_orders: acc.orders,
            total_spent: acc.spent,
            last_order_date: acc.last_order,
        });
    }

    sort_desc_by(&mut top_clients, |item| item.total_spent);
    top_clients.truncate(top_limit);

    ClientsReport {
        period_start: start,
        period_end: end,
        total_clients: clients.len(),
        new_clients,
        active_clients,
        top_clients,
    }
}

impl ReportEngine {
    pub async fn clients_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        top_limit: usize,
    ) -> ClientsReport {
        let (raw_clients, raw_orders) = tokio::join!(
            self.source().fetch_list("/clients", &[]),
            self.source().fetch_list("/orders", &[]),
        );
        let clients = parse_all(&raw_clients, ClientRecord::from_value);
        let orders = parse_all(&raw_orders, OrderRecord::from_value);

        let mut skips = SkipLog::new();
        let report = build_clients_report(&clients, &orders, start, end, top_limit, &mut skips);
        skips.emit("clients_report");
        report
    }
}
