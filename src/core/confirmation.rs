//! Order confirmation - The summary a client receives after ordering.

use crate::{
    core::{
        report::{OrderLine, load_order_lines},
        week::{WeekKey, bucket_condition},
    },
    entities::{Order, User, order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use std::fmt::Write as _;

/// One confirmed line.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationLine {
    /// Label of the ordered menu
    pub menu_label: String,
    /// Units ordered
    pub quantity: i32,
    /// Unit price
    pub price: f64,
    /// Line total
    pub total: f64,
    /// Client notes
    pub notes: Option<String>,
}

/// Everything a client ordered for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation {
    /// Client display name
    pub client_name: String,
    /// Client e-mail address
    pub email: String,
    /// The confirmed week
    pub week: WeekKey,
    /// Confirmed lines
    pub lines: Vec<ConfirmationLine>,
    /// Sum of the line totals
    pub total: f64,
}

impl From<&OrderLine> for ConfirmationLine {
    fn from(line: &OrderLine) -> Self {
        Self {
            menu_label: line.menu.label.clone(),
            quantity: line.order.quantity,
            price: line.price(),
            total: line.total(),
            notes: line.order.notes.clone(),
        }
    }
}

impl OrderConfirmation {
    /// Renders the confirmation as a plain-text message.
    pub fn render_text(&self) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "Hi {},", self.client_name)?;
        writeln!(out)?;
        writeln!(out, "Thank you for your order for {}:", self.week)?;
        for line in &self.lines {
            write!(
                out,
                "- {}x {} @ {:.2} = {:.2}",
                line.quantity, line.menu_label, line.price, line.total
            )?;
            if let Some(notes) = &line.notes {
                write!(out, " ({notes})")?;
            }
            writeln!(out)?;
        }
        writeln!(out)?;
        write!(out, "Total: {:.2}", self.total)?;
        Ok(out)
    }
}

/// Collects all of a user's orders for `week` into a confirmation.
pub async fn build_confirmation(
    db: &DatabaseConnection,
    user_id: i64,
    week: WeekKey,
) -> Result<OrderConfirmation> {
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let orders = Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .filter(bucket_condition(order::Column::Year, order::Column::Week, week))
        .order_by_asc(order::Column::Id)
        .all(db)
        .await?;

    let lines: Vec<ConfirmationLine> = load_order_lines(db, orders)
        .await?
        .iter()
        .map(ConfirmationLine::from)
        .collect();
    let total = lines.iter().map(|l| l.total).sum();

    Ok(OrderConfirmation {
        email: user.email().to_string(),
        client_name: user.name,
        week,
        lines,
        total,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::order::{OrderRequest, StockPolicy, place_client_orders};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_build_confirmation() -> Result<()> {
        let (db, alice, weekmenu) = setup_with_weekmenu(10).await?;

        let placement = place_client_orders(
            &db,
            StockPolicy::Clamp,
            alice.id,
            &[OrderRequest {
                weekmenu_id: weekmenu.id,
                quantity: 3,
                notes: Some("no peanuts".to_string()),
            }],
        )
        .await?;

        let confirmation = build_confirmation(&db, alice.id, placement.week).await?;
        assert_eq!(confirmation.email, "alice@example.com");
        assert_eq!(confirmation.lines.len(), 1);
        assert_eq!(confirmation.total, 30.0);

        let text = confirmation.render_text().unwrap();
        assert!(text.starts_with("Hi Alice,"));
        assert!(text.contains("week 10/2025"));
        assert!(text.contains("- 3x Test Menu @ 10.00 = 30.00 (no peanuts)"));
        assert!(text.ends_with("Total: 30.00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_build_confirmation_unknown_user() -> Result<()> {
        let db = setup_test_db().await?;
        let result = build_confirmation(&db, 999, TEST_WEEK).await;
        assert!(matches!(result.unwrap_err(), Error::UserNotFound { id: 999 }));
        Ok(())
    }
}
