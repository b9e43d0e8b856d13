//! Plain-text rendering of ordering windows, overviews, invoices and the dashboard
//! for Discord replies.

use crate::{
    core::{
        invoice::{InvoiceDetail, InvoiceSummary},
        report::{DashboardStats, WeekHistory, WeeklyOverview},
        week::WeekKey,
        window::OrderingWindow,
    },
    entities::{menu, weekmenu},
    errors::Result,
};
use std::fmt::Write;

/// Renders the offerings of an ordering window.
pub fn format_window(ordering_window: &OrderingWindow) -> Result<String> {
    let mut out = String::new();
    match ordering_window {
        OrderingWindow::Empty => {
            write!(out, "🍽️ Nothing can be ordered right now. Check back later!")?;
            return Ok(out);
        }
        OrderingWindow::Current { week, .. } => {
            writeln!(out, "🍽️ **Menu for {week}**")?;
        }
        OrderingWindow::PreOrder { week, .. } => {
            writeln!(out, "📅 **Pre-order for {week}**")?;
            writeln!(out, "_This week's menu is closed; these dishes are for a coming week._")?;
        }
    }

    for offering in ordering_window.offerings() {
        write!(
            out,
            "\n• **{}** - {:.2} ({} left)",
            offering.menu.label, offering.menu.price, offering.weekmenu.quantity
        )?;
        if let Some(description) = &offering.menu.description {
            write!(out, "\n  {description}")?;
        }
    }
    write!(out, "\n\nUse `/order` to place an order.")?;
    Ok(out)
}

/// Renders a client's order history, newest week first.
pub fn format_history(history: &[WeekHistory]) -> Result<String> {
    let mut out = String::new();
    if history.is_empty() {
        write!(out, "📭 You have no orders yet.")?;
        return Ok(out);
    }

    writeln!(out, "🧾 **Your orders**")?;
    for week in history {
        write!(out, "\n**{}** - {:.2}", week.week, week.total)?;
        for line in &week.lines {
            write!(
                out,
                "\n• {}x {} @ {:.2}",
                line.order.quantity,
                line.menu.label,
                line.price()
            )?;
            if let Some(notes) = &line.order.notes {
                write!(out, " _({notes})_")?;
            }
        }
        writeln!(out)?;
    }
    Ok(out)
}

/// Renders the per-client overview of a week.
pub fn format_overview(overview: &WeeklyOverview) -> Result<String> {
    let mut out = String::new();
    if overview.groups.is_empty() {
        write!(out, "📭 No orders for {}.", overview.week)?;
        return Ok(out);
    }

    writeln!(out, "📋 **Orders for {}**", overview.week)?;
    for group in &overview.groups {
        write!(
            out,
            "\n**{}** <{}> - {:.2}",
            group.user.name, group.user.username, group.total
        )?;
        for line in &group.lines {
            write!(
                out,
                "\n• #{} {}x {} @ {:.2}",
                line.order.id,
                line.order.quantity,
                line.menu.label,
                line.price()
            )?;
            if let Some(notes) = &line.order.notes {
                write!(out, " _({notes})_")?;
            }
        }
        writeln!(out)?;
    }
    write!(out, "\n**Grand total:** {:.2}", overview.grand_total)?;
    Ok(out)
}

/// Renders the weekmenus of a week for the back office.
pub fn format_weekmenus(week: WeekKey, rows: &[(weekmenu::Model, menu::Model)]) -> Result<String> {
    let mut out = String::new();
    if rows.is_empty() {
        write!(out, "📭 No weekmenus for {week}.")?;
        return Ok(out);
    }

    writeln!(out, "🗓️ **Weekmenus for {week}**")?;
    for (wm, m) in rows {
        let scope = wm
            .group_id
            .map_or_else(|| "all groups".to_string(), |id| format!("group {id}"));
        write!(
            out,
            "\n• #{} **{}** - {} left, position {}, {}",
            wm.id, m.label, wm.quantity, wm.ordering, scope
        )?;
        if wm.invitation {
            write!(out, ", open for pre-order")?;
        }
    }
    Ok(out)
}

/// Renders a client's invoices.
pub fn format_invoice_list(client_name: &str, invoices: &[InvoiceSummary]) -> Result<String> {
    let mut out = String::new();
    if invoices.is_empty() {
        write!(out, "📭 No invoices for {client_name}.")?;
        return Ok(out);
    }

    writeln!(out, "🧾 **Invoices for {client_name}**")?;
    for summary in invoices {
        write!(
            out,
            "\n• #{} **{}** ({}) - {} order{}, {:.2}",
            summary.invoice.id,
            summary.invoice.invoice_number,
            summary.invoice.invoice_date.format("%Y-%m-%d"),
            summary.item_count,
            if summary.item_count == 1 { "" } else { "s" },
            summary.total
        )?;
    }
    Ok(out)
}

/// Renders a full invoice with its VAT breakdown.
pub fn format_invoice(detail: &InvoiceDetail) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "🧾 **Invoice {}** - {}",
        detail.invoice.invoice_number,
        detail.invoice.invoice_date.format("%Y-%m-%d")
    )?;
    writeln!(out, "{} <{}>", detail.user.name, detail.user.email())?;
    writeln!(out, "```")?;
    for line in &detail.lines {
        writeln!(
            out,
            "{:<10} {:>3} x {:<24} {:>8.2} {:>9.2}",
            line.week.to_string(),
            line.quantity,
            line.menu_label,
            line.price,
            line.total
        )?;
    }
    writeln!(out, "```")?;
    writeln!(out, "Total excl. VAT: {:.2}", detail.total_excl_tax)?;
    writeln!(out, "VAT: {:.2}", detail.vat)?;
    write!(out, "**Total: {:.2}**", detail.total_incl_tax)?;
    Ok(out)
}

/// Renders the back office dashboard.
pub fn format_dashboard(stats: &DashboardStats) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "📊 **Dashboard** - {}, Q{}", stats.current_week, stats.quarter)?;
    writeln!(out, "• Orders this week: {}", stats.current_week_orders)?;
    writeln!(out, "• Revenue this quarter: {:.2}", stats.quarter_revenue)?;
    writeln!(out, "• Weeks with menus this quarter: {}", stats.quarter_weeks)?;
    writeln!(out, "• Pre-orders: {}", stats.pre_order_count)?;

    if !stats.pre_orders.is_empty() {
        writeln!(out, "\n**Pre-orders**")?;
        for summary in &stats.pre_orders {
            writeln!(
                out,
                "• {} - {} order{} from {}, {:.2}",
                summary.user.name,
                summary.order_count,
                if summary.order_count == 1 { "" } else { "s" },
                summary.earliest_week,
                summary.total
            )?;
        }
    }

    if !stats.recent_clients.is_empty() {
        writeln!(out, "\n**Recent clients**")?;
        for client in &stats.recent_clients {
            write!(
                out,
                "• {}{} - {} order{}, {:.2}, last {}",
                if client.is_new { "🆕 " } else { "" },
                client.user.name,
                client.order_count,
                if client.order_count == 1 { "" } else { "s" },
                client.total,
                client.latest_at.format("%Y-%m-%d %H:%M")
            )?;
            if !client.notes.is_empty() {
                write!(out, " _({})_", client.notes.join("; "))?;
            }
            writeln!(out)?;
        }
    }

    if !stats.recent_notes.is_empty() {
        writeln!(out, "\n**Recent notes**")?;
        for note in &stats.recent_notes {
            writeln!(
                out,
                "• {} on {}: {}",
                note.client_name, note.menu_label, note.notes
            )?;
        }
    }

    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::window::Offering;
    use chrono::Utc;

    fn sample_offering() -> Offering {
        let now = Utc::now();
        Offering {
            weekmenu: weekmenu::Model {
                id: 7,
                menu_id: 3,
                week: 12,
                year: 2025,
                group_id: None,
                quantity: 5,
                ordering: 0,
                invitation: true,
                created_at: now,
            },
            menu: menu::Model {
                id: 3,
                label: "Rendang".to_string(),
                description: Some("Slow-cooked beef".to_string()),
                price: 12.5,
                menutype: "normal".to_string(),
                image_path: None,
                created_at: now,
            },
        }
    }

    #[test]
    fn test_format_window_flags_pre_order() {
        let window = OrderingWindow::PreOrder {
            week: WeekKey::new(12, 2025),
            offerings: vec![sample_offering()],
        };
        let text = format_window(&window).unwrap();
        assert!(text.starts_with("📅 **Pre-order for week 12/2025**"));
        assert!(text.contains("• **Rendang** - 12.50 (5 left)"));
        assert!(text.contains("  Slow-cooked beef"));
    }

    #[test]
    fn test_format_window_current_and_empty() {
        let window = OrderingWindow::Current {
            week: WeekKey::new(10, 2025),
            offerings: vec![sample_offering()],
        };
        let text = format_window(&window).unwrap();
        assert!(text.starts_with("🍽️ **Menu for week 10/2025**"));
        assert!(!text.contains("Pre-order"));

        let text = format_window(&OrderingWindow::Empty).unwrap();
        assert!(text.contains("Nothing can be ordered"));
    }

    #[test]
    fn test_format_weekmenus() {
        let offering = sample_offering();
        let text = format_weekmenus(
            WeekKey::new(12, 2025),
            &[(offering.weekmenu, offering.menu)],
        )
        .unwrap();
        assert!(text.contains("#7 **Rendang** - 5 left, position 0, all groups, open for pre-order"));

        let text = format_weekmenus(WeekKey::new(12, 2025), &[]).unwrap();
        assert_eq!(text, "📭 No weekmenus for week 12/2025.");
    }
}
