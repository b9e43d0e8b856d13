//! Report generation business logic.
//!
//! Read-only projections over orders: the admin weekly overview, the client history,
//! the dashboard figures and the user x menu export matrix. All functions return
//! structured data that the bot layer formats.

use crate::{
    core::{
        order::{OrderFilter, get_orders_for_user, get_orders_for_week},
        week::{WeekKey, after_condition, bucket_condition, quarter_bounds, quarter_of},
    },
    entities::{Menu, Order, User, Weekmenu, menu, order, user, weekmenu},
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, prelude::*};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

/// Number of pre-order summaries shown on the dashboard
pub const DASHBOARD_PRE_ORDERS: usize = 10;
/// Number of recent clients shown on the dashboard
pub const DASHBOARD_RECENT_CLIENTS: usize = 5;
/// Number of recent notes shown on the dashboard
pub const DASHBOARD_RECENT_NOTES: u64 = 5;

/// Unit price of an order: the admin's special price, or else the menu price.
#[must_use]
pub fn line_price(order: &order::Model, menu: &menu::Model) -> f64 {
    order.special_price.unwrap_or(menu.price)
}

/// Price of an order line: unit price times quantity.
#[must_use]
pub fn line_total(order: &order::Model, menu: &menu::Model) -> f64 {
    line_price(order, menu) * f64::from(order.quantity)
}

/// An order together with its client and the menu it is for.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// The order row
    pub order: order::Model,
    /// The client who placed it
    pub user: user::Model,
    /// The ordered menu
    pub menu: menu::Model,
}

impl OrderLine {
    /// Unit price of this line.
    #[must_use]
    pub fn price(&self) -> f64 {
        line_price(&self.order, &self.menu)
    }

    /// Total price of this line.
    #[must_use]
    pub fn total(&self) -> f64 {
        line_total(&self.order, &self.menu)
    }
}

/// Joins orders with their clients and menus, keeping the input order.
///
/// Orders whose user or weekmenu disappeared are skipped.
pub async fn load_order_lines<C>(db: &C, orders: Vec<order::Model>) -> Result<Vec<OrderLine>>
where
    C: ConnectionTrait,
{
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: Vec<i64> = orders.iter().map(|o| o.user_id).collect();
    let weekmenu_ids: Vec<i64> = orders.iter().map(|o| o.weekmenu_id).collect();

    let users: HashMap<i64, user::Model> = User::find()
        .filter(user::Column::Id.is_in(user_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let menus: HashMap<i64, menu::Model> = Weekmenu::find()
        .find_also_related(Menu)
        .filter(weekmenu::Column::Id.is_in(weekmenu_ids))
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(wm, menu)| menu.map(|menu| (wm.id, menu)))
        .collect();

    Ok(orders
        .into_iter()
        .filter_map(|order| {
            let user = users.get(&order.user_id)?.clone();
            let menu = menus.get(&order.weekmenu_id)?.clone();
            Some(OrderLine { order, user, menu })
        })
        .collect())
}

/// One client's orders in the weekly overview.
#[derive(Debug, Clone, PartialEq)]
pub struct UserWeekGroup {
    /// The client
    pub user: user::Model,
    /// The client's order lines
    pub lines: Vec<OrderLine>,
    /// Sum of the line totals
    pub total: f64,
    /// When the client first ordered for this week
    pub first_ordered_at: DateTimeUtc,
}

/// The admin overview of one week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyOverview {
    /// The week shown
    pub week: WeekKey,
    /// Per-client groups, by client name
    pub groups: Vec<UserWeekGroup>,
    /// Sum of all client totals
    pub grand_total: f64,
}

/// Groups order lines per client, sorted by client name.
#[must_use]
pub fn group_by_user(lines: Vec<OrderLine>) -> Vec<UserWeekGroup> {
    let mut by_user: HashMap<i64, UserWeekGroup> = HashMap::new();

    for line in lines {
        let total = line.total();
        let created_at = line.order.created_at;
        let group = by_user
            .entry(line.user.id)
            .or_insert_with(|| UserWeekGroup {
                user: line.user.clone(),
                lines: Vec::new(),
                total: 0.0,
                first_ordered_at: created_at,
            });
        group.total += total;
        group.first_ordered_at = group.first_ordered_at.min(created_at);
        group.lines.push(line);
    }

    let mut groups: Vec<UserWeekGroup> = by_user.into_values().collect();
    groups.sort_by(|a, b| {
        a.user
            .name
            .to_lowercase()
            .cmp(&b.user.name.to_lowercase())
            .then(a.user.id.cmp(&b.user.id))
    });
    groups
}

/// Builds the admin overview of a week, narrowed by the filter.
pub async fn aggregate_by_user_week(
    db: &DatabaseConnection,
    week: WeekKey,
    filter: &OrderFilter,
) -> Result<WeeklyOverview> {
    let orders = get_orders_for_week(db, week, filter).await?;
    let lines = load_order_lines(db, orders).await?;
    let groups = group_by_user(lines);
    let grand_total = groups.iter().map(|g| g.total).sum();

    Ok(WeeklyOverview {
        week,
        groups,
        grand_total,
    })
}

/// A client's orders for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekHistory {
    /// The week
    pub week: WeekKey,
    /// Order lines of that week
    pub lines: Vec<OrderLine>,
    /// Sum of the line totals
    pub total: f64,
}

/// A client's order history, newest week first.
pub async fn client_order_history(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<WeekHistory>> {
    let orders = get_orders_for_user(db, user_id).await?;
    let lines = load_order_lines(db, orders).await?;

    let mut weeks: BTreeMap<WeekKey, Vec<OrderLine>> = BTreeMap::new();
    for line in lines {
        weeks
            .entry(WeekKey::new(line.order.week, line.order.year))
            .or_default()
            .push(line);
    }

    Ok(weeks
        .into_iter()
        .rev()
        .map(|(week, lines)| WeekHistory {
            week,
            total: lines.iter().map(OrderLine::total).sum(),
            lines,
        })
        .collect())
}

/// Pre-orders of one client.
#[derive(Debug, Clone, PartialEq)]
pub struct PreOrderSummary {
    /// The client
    pub user: user::Model,
    /// Sum of the client's pre-order line totals
    pub total: f64,
    /// Number of pre-order rows
    pub order_count: usize,
    /// The earliest future week the client ordered for
    pub earliest_week: WeekKey,
}

/// A client who ordered during the current quarter.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentClient {
    /// The client
    pub user: user::Model,
    /// Sum of the client's line totals this quarter
    pub total: f64,
    /// Number of order rows this quarter
    pub order_count: usize,
    /// Distinct non-empty notes, most recent first
    pub notes: Vec<String>,
    /// When the client last ordered
    pub latest_at: DateTimeUtc,
    /// Whether the latest order is less than a day old
    pub is_new: bool,
}

/// A recent order note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentNote {
    /// Name of the client
    pub client_name: String,
    /// Label of the ordered menu
    pub menu_label: String,
    /// The note
    pub notes: String,
    /// When the order was placed
    pub created_at: DateTimeUtc,
}

/// Dashboard figures at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    /// The current week
    pub current_week: WeekKey,
    /// The current calendar quarter (1-4)
    pub quarter: u32,
    /// Order rows in the current week
    pub current_week_orders: u64,
    /// Revenue of orders placed this quarter
    pub quarter_revenue: f64,
    /// Distinct weeks among weekmenus created this quarter
    pub quarter_weeks: usize,
    /// Order rows for weeks after the current one
    pub pre_order_count: u64,
    /// Pre-orders per client, earliest week first
    pub pre_orders: Vec<PreOrderSummary>,
    /// Clients with orders this quarter, most recent first
    pub recent_clients: Vec<RecentClient>,
    /// Notes from the last seven days, most recent first
    pub recent_notes: Vec<RecentNote>,
}

fn summarize_pre_orders(lines: Vec<OrderLine>) -> Vec<PreOrderSummary> {
    let mut summaries: Vec<PreOrderSummary> = Vec::new();

    for line in lines {
        let week = WeekKey::new(line.order.week, line.order.year);
        let total = line.total();
        if let Some(summary) = summaries.iter_mut().find(|s| s.user.id == line.user.id) {
            summary.total += total;
            summary.order_count += 1;
            summary.earliest_week = summary.earliest_week.min(week);
        } else if summaries.len() < DASHBOARD_PRE_ORDERS {
            summaries.push(PreOrderSummary {
                user: line.user,
                total,
                order_count: 1,
                earliest_week: week,
            });
        }
    }

    summaries
}

fn summarize_recent_clients(lines: Vec<OrderLine>, now: DateTime<Utc>) -> Vec<RecentClient> {
    let mut clients: Vec<RecentClient> = Vec::new();

    for line in lines {
        let total = line.total();
        let note = line.order.notes.clone().filter(|n| !n.trim().is_empty());

        let index = if let Some(index) = clients.iter().position(|c| c.user.id == line.user.id) {
            clients[index].total += total;
            clients[index].order_count += 1;
            index
        } else if clients.len() < DASHBOARD_RECENT_CLIENTS {
            let latest_at = line.order.created_at;
            clients.push(RecentClient {
                user: line.user,
                total,
                order_count: 1,
                notes: Vec::new(),
                latest_at,
                is_new: now.signed_duration_since(latest_at) < Duration::hours(24),
            });
            clients.len() - 1
        } else {
            continue;
        };

        if let Some(note) = note {
            let notes = &mut clients[index].notes;
            if !notes.contains(&note) {
                notes.push(note);
            }
        }
    }

    clients
}

/// Computes the dashboard figures as of `now`.
pub async fn aggregate_dashboard_stats(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<DashboardStats> {
    let current_week = WeekKey::containing(now);
    let quarter = quarter_of(now.date_naive());
    let (quarter_start, quarter_end) = quarter_bounds(now)?;

    let current_week_orders = Order::find()
        .filter(bucket_condition(
            order::Column::Year,
            order::Column::Week,
            current_week,
        ))
        .count(db)
        .await?;

    let quarter_orders = Order::find()
        .filter(order::Column::CreatedAt.gte(quarter_start))
        .filter(order::Column::CreatedAt.lt(quarter_end))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?;
    let quarter_lines = load_order_lines(db, quarter_orders).await?;
    let quarter_revenue = quarter_lines.iter().map(OrderLine::total).sum();

    let quarter_weeks = Weekmenu::find()
        .select_only()
        .column(weekmenu::Column::Week)
        .column(weekmenu::Column::Year)
        .filter(weekmenu::Column::CreatedAt.gte(quarter_start))
        .filter(weekmenu::Column::CreatedAt.lt(quarter_end))
        .group_by(weekmenu::Column::Week)
        .group_by(weekmenu::Column::Year)
        .into_tuple::<(i32, i32)>()
        .all(db)
        .await?
        .len();

    let future_orders = Order::find()
        .filter(after_condition(
            order::Column::Year,
            order::Column::Week,
            current_week,
        ))
        .order_by_asc(order::Column::Year)
        .order_by_asc(order::Column::Week)
        .order_by_asc(order::Column::Id)
        .all(db)
        .await?;
    let pre_order_count = u64::try_from(future_orders.len())?;
    let pre_orders = summarize_pre_orders(load_order_lines(db, future_orders).await?);

    let recent_clients = summarize_recent_clients(quarter_lines, now);

    let note_orders = Order::find()
        .filter(order::Column::Notes.is_not_null())
        .filter(order::Column::Notes.ne(""))
        .filter(order::Column::CreatedAt.gte(now - Duration::days(7)))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .limit(DASHBOARD_RECENT_NOTES)
        .all(db)
        .await?;
    let recent_notes = load_order_lines(db, note_orders)
        .await?
        .into_iter()
        .map(|line| RecentNote {
            client_name: line.user.name,
            menu_label: line.menu.label,
            notes: line.order.notes.unwrap_or_default(),
            created_at: line.order.created_at,
        })
        .collect();

    Ok(DashboardStats {
        current_week,
        quarter,
        current_week_orders,
        quarter_revenue,
        quarter_weeks,
        pre_order_count,
        pre_orders,
        recent_clients,
        recent_notes,
    })
}

/// A menu column of the export matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    /// Menu id
    pub menu_id: i64,
    /// Menu label, used as the column heading
    pub label: String,
}

/// One client row of the export matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    /// Client name
    pub client_name: String,
    /// Quantity per menu column
    pub quantities: Vec<i32>,
    /// Sum of the quantities
    pub total_quantity: i32,
    /// Sum of the line totals
    pub total_price: f64,
}

/// User x menu quantity pivot for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMatrix {
    /// The exported week
    pub week: WeekKey,
    /// Menu columns, by label
    pub columns: Vec<ExportColumn>,
    /// One row per client
    pub rows: Vec<ExportRow>,
    /// Column sums; `client_name` is `TOTAL`
    pub totals: ExportRow,
    /// (client name, distinct notes joined with `; `) for clients with notes
    pub notes: Vec<(String, String)>,
}

/// Pivots order lines into a user x menu matrix.
///
/// Quantities of several lines for the same menu are summed.
#[must_use]
pub fn build_export_matrix(week: WeekKey, lines: &[OrderLine]) -> ExportMatrix {
    let mut columns: Vec<ExportColumn> = Vec::new();
    for line in lines {
        if !columns.iter().any(|c| c.menu_id == line.menu.id) {
            columns.push(ExportColumn {
                menu_id: line.menu.id,
                label: line.menu.label.clone(),
            });
        }
    }
    columns.sort_by(|a, b| a.label.cmp(&b.label).then(a.menu_id.cmp(&b.menu_id)));

    let column_index: HashMap<i64, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.menu_id, i))
        .collect();

    let mut rows: Vec<(i64, ExportRow)> = Vec::new();
    let mut notes: Vec<(i64, String, Vec<String>)> = Vec::new();

    for line in lines {
        let position = if let Some(position) = rows.iter().position(|(id, _)| *id == line.user.id) {
            position
        } else {
            rows.push((
                line.user.id,
                ExportRow {
                    client_name: line.user.name.clone(),
                    quantities: vec![0; columns.len()],
                    total_quantity: 0,
                    total_price: 0.0,
                },
            ));
            rows.len() - 1
        };

        let row = &mut rows[position].1;
        if let Some(&column) = column_index.get(&line.menu.id) {
            row.quantities[column] += line.order.quantity;
        }
        row.total_quantity += line.order.quantity;
        row.total_price += line.total();

        if let Some(note) = line.order.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            match notes.iter_mut().find(|(id, _, _)| *id == line.user.id) {
                Some((_, _, user_notes)) => {
                    if !user_notes.iter().any(|n| n == note) {
                        user_notes.push(note.to_string());
                    }
                }
                None => notes.push((line.user.id, line.user.name.clone(), vec![note.to_string()])),
            }
        }
    }

    let rows: Vec<ExportRow> = rows.into_iter().map(|(_, row)| row).collect();

    let mut totals = ExportRow {
        client_name: "TOTAL".to_string(),
        quantities: vec![0; columns.len()],
        total_quantity: 0,
        total_price: 0.0,
    };
    for row in &rows {
        for (total, quantity) in totals.quantities.iter_mut().zip(&row.quantities) {
            *total += quantity;
        }
        totals.total_quantity += row.total_quantity;
        totals.total_price += row.total_price;
    }

    ExportMatrix {
        week,
        columns,
        rows,
        totals,
        notes: notes
            .into_iter()
            .map(|(_, name, user_notes)| (name, user_notes.join("; ")))
            .collect(),
    }
}

/// Builds the export matrix of a week, narrowed by the filter.
pub async fn export_matrix(
    db: &DatabaseConnection,
    week: WeekKey,
    filter: &OrderFilter,
) -> Result<ExportMatrix> {
    let orders = get_orders_for_week(db, week, filter).await?;
    let lines = load_order_lines(db, orders).await?;
    Ok(build_export_matrix(week, &lines))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(out: &mut String, row: &ExportRow) -> std::fmt::Result {
    write!(out, "{}", csv_field(&row.client_name))?;
    for quantity in &row.quantities {
        write!(out, ",{quantity}")?;
    }
    writeln!(out, ",{},{:.2}", row.total_quantity, row.total_price)
}

impl ExportMatrix {
    /// Renders the matrix as CSV: heading, client rows, totals row, then the notes section.
    pub fn to_csv(&self) -> Result<String> {
        let mut out = String::new();

        write!(out, "Name")?;
        for column in &self.columns {
            write!(out, ",{}", csv_field(&column.label))?;
        }
        writeln!(out, ",Total Qty,Total Price")?;

        for row in &self.rows {
            csv_row(&mut out, row)?;
        }
        csv_row(&mut out, &self.totals)?;

        if !self.notes.is_empty() {
            writeln!(out)?;
            writeln!(out, "NOTES")?;
            writeln!(out, "Client Name,Notes")?;
            for (name, notes) in &self.notes {
                writeln!(out, "{},{}", csv_field(name), csv_field(notes))?;
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::order::{StockPolicy, place_or_update, update_quantity_and_price};
    use crate::core::weekmenu::create_weekmenu;
    use crate::test_utils::*;

    fn sample_line(user_id: i64, name: &str, menu_id: i64, label: &str, quantity: i32) -> OrderLine {
        let now = Utc::now();
        OrderLine {
            order: order::Model {
                id: 0,
                user_id,
                weekmenu_id: menu_id,
                group_id: None,
                week: 10,
                year: 2025,
                quantity,
                special_price: None,
                notes: None,
                created_at: now,
                updated_at: now,
            },
            user: user::Model {
                id: user_id,
                name: name.to_string(),
                username: format!("{name}@example.com"),
                phone: None,
                group_id: None,
                role: "client".to_string(),
                active: true,
                discord_id: None,
                created_at: now,
            },
            menu: menu::Model {
                id: menu_id,
                label: label.to_string(),
                description: None,
                price: 10.0,
                menutype: "normal".to_string(),
                image_path: None,
                created_at: now,
            },
        }
    }

    #[test]
    fn test_line_price_prefers_special_price() {
        let mut line = sample_line(1, "Alice", 1, "Rendang", 3);
        assert_eq!(line.price(), 10.0);
        assert_eq!(line.total(), 30.0);

        line.order.special_price = Some(7.5);
        assert_eq!(line.price(), 7.5);
        assert_eq!(line.total(), 22.5);
    }

    #[test]
    fn test_build_export_matrix_totals() {
        let mut with_note = sample_line(1, "Alice", 2, "Soto", 1);
        with_note.order.notes = Some("no egg".to_string());
        let lines = vec![
            sample_line(1, "Alice", 1, "Rendang", 2),
            with_note,
            sample_line(2, "Bob", 1, "Rendang", 3),
            // Second weekmenu of the same menu is summed into one column
            sample_line(2, "Bob", 1, "Rendang", 1),
        ];

        let matrix = build_export_matrix(WeekKey::new(10, 2025), &lines);

        let labels: Vec<&str> = matrix.columns.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Rendang", "Soto"]);

        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].client_name, "Alice");
        assert_eq!(matrix.rows[0].quantities, vec![2, 1]);
        assert_eq!(matrix.rows[0].total_quantity, 3);
        assert_eq!(matrix.rows[0].total_price, 30.0);
        assert_eq!(matrix.rows[1].quantities, vec![4, 0]);

        assert_eq!(matrix.totals.quantities, vec![6, 1]);
        assert_eq!(matrix.totals.total_quantity, 7);
        assert_eq!(matrix.totals.total_price, 70.0);
        let row_sum: f64 = matrix.rows.iter().map(|r| r.total_price).sum();
        assert_eq!(matrix.totals.total_price, row_sum);

        assert_eq!(matrix.notes, vec![("Alice".to_string(), "no egg".to_string())]);
    }

    #[test]
    fn test_export_matrix_to_csv() {
        let mut line = sample_line(1, "Doe, Jane", 1, "Rendang", 2);
        line.order.notes = Some("say \"hi\"".to_string());
        let matrix = build_export_matrix(WeekKey::new(10, 2025), &[line]);

        let csv = matrix.to_csv().unwrap();
        let expected = "Name,Rendang,Total Qty,Total Price\n\
                        \"Doe, Jane\",2,2,20.00\n\
                        TOTAL,2,2,20.00\n\
                        \n\
                        NOTES\n\
                        Client Name,Notes\n\
                        \"Doe, Jane\",\"say \"\"hi\"\"\"\n";
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_group_by_user_sorts_by_name() {
        let lines = vec![
            sample_line(2, "bob", 1, "Rendang", 1),
            sample_line(1, "Alice", 1, "Rendang", 2),
            sample_line(2, "bob", 2, "Soto", 1),
        ];

        let groups = group_by_user(lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].user.name, "Alice");
        assert_eq!(groups[0].total, 20.0);
        assert_eq!(groups[1].lines.len(), 2);
        assert_eq!(groups[1].total, 20.0);
    }

    #[tokio::test]
    async fn test_aggregate_by_user_week() -> Result<()> {
        let (db, alice, weekmenu) = setup_with_weekmenu(20).await?;
        let bob = create_test_client(&db, "Bob", alice.group_id.unwrap()).await?;

        let placed = place_or_update(
            &db,
            StockPolicy::Clamp,
            alice.id,
            weekmenu.id,
            TEST_WEEK,
            2,
            None,
        )
        .await?;
        place_or_update(
            &db,
            StockPolicy::Clamp,
            bob.id,
            weekmenu.id,
            TEST_WEEK,
            3,
            None,
        )
        .await?;
        update_quantity_and_price(&db, placed.order.id, 2, Some(5.0)).await?;

        let overview = aggregate_by_user_week(&db, TEST_WEEK, &OrderFilter::default()).await?;
        assert_eq!(overview.groups.len(), 2);
        assert_eq!(overview.groups[0].user.id, alice.id);
        assert_eq!(overview.groups[0].total, 10.0);
        assert_eq!(overview.groups[1].total, 30.0);
        assert_eq!(overview.grand_total, 40.0);

        let empty = aggregate_by_user_week(&db, WeekKey::new(11, 2025), &OrderFilter::default())
            .await?;
        assert!(empty.groups.is_empty());
        assert_eq!(empty.grand_total, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_client_order_history_newest_first() -> Result<()> {
        let (db, alice, weekmenu) = setup_with_weekmenu(20).await?;
        let later = create_weekmenu(&db, weekmenu.menu_id, WeekKey::new(1, 2026), None, 5).await?;

        place_or_update(
            &db,
            StockPolicy::Clamp,
            alice.id,
            weekmenu.id,
            TEST_WEEK,
            2,
            None,
        )
        .await?;
        place_or_update(
            &db,
            StockPolicy::Clamp,
            alice.id,
            later.id,
            WeekKey::new(1, 2026),
            1,
            None,
        )
        .await?;

        let history = client_order_history(&db, alice.id).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].week, WeekKey::new(1, 2026));
        assert_eq!(history[0].total, 10.0);
        assert_eq!(history[1].week, TEST_WEEK);
        assert_eq!(history[1].total, 20.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_stats() -> Result<()> {
        let now = Utc::now();
        let current = WeekKey::containing(now);
        let next = WeekKey::containing(now + Duration::days(7));

        let db = setup_test_db().await?;
        let group = create_test_group(&db, "test").await?;
        let alice = create_test_client(&db, "Alice", group.id).await?;
        let bob = create_test_client(&db, "Bob", group.id).await?;
        let menu = create_test_menu(&db, "Rendang", 10.0).await?;
        let this_week = create_test_weekmenu(&db, menu.id, current, None, 20).await?;
        let next_week = create_test_weekmenu(&db, menu.id, next, None, 20).await?;

        place_or_update(
            &db,
            StockPolicy::Clamp,
            alice.id,
            this_week.id,
            current,
            2,
            Some("extra sambal".to_string()),
        )
        .await?;
        place_or_update(&db, StockPolicy::Clamp, bob.id, next_week.id, next, 3, None).await?;

        let stats = aggregate_dashboard_stats(&db, now).await?;
        assert_eq!(stats.current_week, current);
        assert_eq!(stats.current_week_orders, 1);
        assert_eq!(stats.quarter_revenue, 50.0);
        assert_eq!(stats.quarter_weeks, 2);
        assert_eq!(stats.pre_order_count, 1);
        assert_eq!(stats.pre_orders.len(), 1);
        assert_eq!(stats.pre_orders[0].user.id, bob.id);
        assert_eq!(stats.pre_orders[0].earliest_week, next);
        assert_eq!(stats.pre_orders[0].total, 30.0);

        assert_eq!(stats.recent_clients.len(), 2);
        assert!(stats.recent_clients.iter().all(|c| c.is_new));
        let alice_recent = stats
            .recent_clients
            .iter()
            .find(|c| c.user.id == alice.id)
            .unwrap();
        assert_eq!(alice_recent.notes, vec!["extra sambal".to_string()]);

        assert_eq!(stats.recent_notes.len(), 1);
        assert_eq!(stats.recent_notes[0].client_name, "Alice");
        assert_eq!(stats.recent_notes[0].menu_label, "Rendang");

        Ok(())
    }
}
