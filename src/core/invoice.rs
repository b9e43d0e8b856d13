//! Invoice business logic - Grouping a client's orders under an invoice number.
//!
//! Menu prices include VAT. The invoice detail splits the total back into the
//! amount excluding VAT and the VAT itself.

use crate::{
    core::{
        report::{OrderLine, load_order_lines},
        week::WeekKey,
    },
    entities::{Invoice, InvoiceItem, Order, User, invoice, invoice_item, order, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

/// VAT rate used when none is configured
pub const DEFAULT_VAT_RATE: f64 = 0.09;

/// Splits a VAT-inclusive amount into (amount excluding VAT, VAT).
#[must_use]
pub fn split_vat(total_incl_tax: f64, vat_rate: f64) -> (f64, f64) {
    let excl = total_incl_tax / (1.0 + vat_rate);
    (excl, total_incl_tax - excl)
}

/// An invoice with its computed total, for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceSummary {
    /// The invoice row
    pub invoice: invoice::Model,
    /// Sum of the line totals, VAT included
    pub total: f64,
    /// Number of orders on the invoice
    pub item_count: usize,
}

/// One printed line of an invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    /// The invoiced order
    pub order_id: i64,
    /// Label of the ordered menu
    pub menu_label: String,
    /// Week of the order
    pub week: WeekKey,
    /// Units ordered
    pub quantity: i32,
    /// Unit price, VAT included
    pub price: f64,
    /// Line total, VAT included
    pub total: f64,
}

impl From<&OrderLine> for InvoiceLine {
    fn from(line: &OrderLine) -> Self {
        Self {
            order_id: line.order.id,
            menu_label: line.menu.label.clone(),
            week: WeekKey::new(line.order.week, line.order.year),
            quantity: line.order.quantity,
            price: line.price(),
            total: line.total(),
        }
    }
}

/// A full invoice ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetail {
    /// The invoice row
    pub invoice: invoice::Model,
    /// The invoiced client
    pub user: user::Model,
    /// Invoice lines
    pub lines: Vec<InvoiceLine>,
    /// Total including VAT
    pub total_incl_tax: f64,
    /// Total excluding VAT
    pub total_excl_tax: f64,
    /// VAT amount
    pub vat: f64,
}

/// Creates or replaces the invoice `invoice_number` of a user.
///
/// An existing invoice with the same number keeps its id; its date is refreshed and
/// its items are replaced by `order_ids`. Every order must exist and belong to the user.
#[instrument(skip(db))]
pub async fn save_invoice(
    db: &DatabaseConnection,
    user_id: i64,
    invoice_number: String,
    invoice_date: NaiveDate,
    order_ids: &[i64],
) -> Result<invoice::Model> {
    let invoice_number = invoice_number.trim().to_string();
    if invoice_number.is_empty() {
        return Err(Error::Validation {
            field: "invoice_number",
            message: "must not be empty".to_string(),
        });
    }

    let mut order_ids = order_ids.to_vec();
    order_ids.sort_unstable();
    order_ids.dedup();
    if order_ids.is_empty() {
        return Err(Error::Validation {
            field: "orders",
            message: "an invoice needs at least one order".to_string(),
        });
    }

    let txn = db.begin().await?;

    User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let orders: HashMap<i64, order::Model> = Order::find()
        .filter(order::Column::Id.is_in(order_ids.clone()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|o| (o.id, o))
        .collect();

    for order_id in &order_ids {
        let order = orders
            .get(order_id)
            .ok_or(Error::OrderNotFound { id: *order_id })?;
        if order.user_id != user_id {
            return Err(Error::Validation {
                field: "orders",
                message: format!("order {order_id} does not belong to user {user_id}"),
            });
        }
    }

    let existing = Invoice::find()
        .filter(invoice::Column::UserId.eq(user_id))
        .filter(invoice::Column::InvoiceNumber.eq(invoice_number.as_str()))
        .one(&txn)
        .await?;

    let saved = if let Some(existing) = existing {
        InvoiceItem::delete_many()
            .filter(invoice_item::Column::InvoiceId.eq(existing.id))
            .exec(&txn)
            .await?;
        let mut active: invoice::ActiveModel = existing.into();
        active.invoice_date = Set(invoice_date);
        active.update(&txn).await?
    } else {
        invoice::ActiveModel {
            user_id: Set(user_id),
            invoice_number: Set(invoice_number),
            invoice_date: Set(invoice_date),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?
    };

    let items = order_ids.iter().map(|order_id| invoice_item::ActiveModel {
        invoice_id: Set(saved.id),
        order_id: Set(*order_id),
        ..Default::default()
    });
    InvoiceItem::insert_many(items).exec(&txn).await?;

    txn.commit().await?;

    info!(
        "Saved invoice {} for user {} with {} orders",
        saved.invoice_number,
        user_id,
        order_ids.len()
    );
    Ok(saved)
}

/// Loads the order lines of each invoice, keyed by invoice id.
async fn lines_per_invoice(
    db: &DatabaseConnection,
    invoice_ids: Vec<i64>,
) -> Result<HashMap<i64, Vec<OrderLine>>> {
    let items = InvoiceItem::find()
        .filter(invoice_item::Column::InvoiceId.is_in(invoice_ids))
        .order_by_asc(invoice_item::Column::Id)
        .all(db)
        .await?;

    let orders = Order::find()
        .filter(order::Column::Id.is_in(items.iter().map(|i| i.order_id).collect::<Vec<_>>()))
        .all(db)
        .await?;
    let lines: HashMap<i64, OrderLine> = load_order_lines(db, orders)
        .await?
        .into_iter()
        .map(|line| (line.order.id, line))
        .collect();

    let mut per_invoice: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for item in items {
        if let Some(line) = lines.get(&item.order_id) {
            per_invoice
                .entry(item.invoice_id)
                .or_default()
                .push(line.clone());
        }
    }
    Ok(per_invoice)
}

/// Lists a user's invoices, newest first, with their totals.
pub async fn get_invoices_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<InvoiceSummary>> {
    let invoices = Invoice::find()
        .filter(invoice::Column::UserId.eq(user_id))
        .order_by_desc(invoice::Column::InvoiceDate)
        .order_by_desc(invoice::Column::Id)
        .all(db)
        .await?;

    let mut lines = lines_per_invoice(db, invoices.iter().map(|i| i.id).collect()).await?;

    Ok(invoices
        .into_iter()
        .map(|invoice| {
            let invoice_lines = lines.remove(&invoice.id).unwrap_or_default();
            InvoiceSummary {
                total: invoice_lines.iter().map(OrderLine::total).sum(),
                item_count: invoice_lines.len(),
                invoice,
            }
        })
        .collect())
}

/// Builds the full invoice with its VAT split.
pub async fn invoice_detail(
    db: &DatabaseConnection,
    invoice_id: i64,
    vat_rate: f64,
) -> Result<InvoiceDetail> {
    let (invoice, user) = Invoice::find_by_id(invoice_id)
        .find_also_related(User)
        .one(db)
        .await?
        .and_then(|(invoice, user)| user.map(|user| (invoice, user)))
        .ok_or(Error::InvoiceNotFound { id: invoice_id })?;

    let order_lines = lines_per_invoice(db, vec![invoice_id])
        .await?
        .remove(&invoice_id)
        .unwrap_or_default();
    let lines: Vec<InvoiceLine> = order_lines.iter().map(InvoiceLine::from).collect();

    let total_incl_tax: f64 = lines.iter().map(|l| l.total).sum();
    let (total_excl_tax, vat) = split_vat(total_incl_tax, vat_rate);

    Ok(InvoiceDetail {
        invoice,
        user,
        lines,
        total_incl_tax,
        total_excl_tax,
        vat,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::order::{StockPolicy, place_or_update};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_split_vat() {
        let (excl, vat) = split_vat(109.0, DEFAULT_VAT_RATE);
        assert!((excl - 100.0).abs() < 1e-9);
        assert!((vat - 9.0).abs() < 1e-9);

        let (excl, vat) = split_vat(0.0, DEFAULT_VAT_RATE);
        assert_eq!(excl, 0.0);
        assert_eq!(vat, 0.0);
    }

    #[tokio::test]
    async fn test_save_invoice_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = save_invoice(&db, 1, " ".to_string(), date(7), &[1]).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "invoice_number",
                ..
            }
        ));

        let result = save_invoice(&db, 1, "2025-001".to_string(), date(7), &[]).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "orders",
                ..
            }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_save_invoice_upserts_by_number() -> Result<()> {
        let (db, alice, weekmenu) = setup_with_weekmenu(20).await?;
        let first = place_or_update(
            &db,
            StockPolicy::Clamp,
            alice.id,
            weekmenu.id,
            TEST_WEEK,
            2,
            None,
        )
        .await?;
        let other_week = create_test_weekmenu(
            &db,
            weekmenu.menu_id,
            WeekKey::new(11, 2025),
            None,
            5,
        )
        .await?;
        let second = place_or_update(
            &db,
            StockPolicy::Clamp,
            alice.id,
            other_week.id,
            WeekKey::new(11, 2025),
            1,
            None,
        )
        .await?;

        let invoice = save_invoice(&db, alice.id, "2025-001".to_string(), date(7), &[first.order.id])
            .await?;
        let replaced = save_invoice(
            &db,
            alice.id,
            "2025-001".to_string(),
            date(14),
            &[first.order.id, second.order.id, second.order.id],
        )
        .await?;
        assert_eq!(invoice.id, replaced.id);
        assert_eq!(replaced.invoice_date, date(14));

        let summaries = get_invoices_for_user(&db, alice.id).await?;
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].item_count, 2);
        assert_eq!(summaries[0].total, 30.0);

        let detail = invoice_detail(&db, invoice.id, DEFAULT_VAT_RATE).await?;
        assert_eq!(detail.user.id, alice.id);
        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.total_incl_tax, 30.0);
        assert!((detail.total_excl_tax + detail.vat - 30.0).abs() < 1e-9);
        assert!((detail.total_excl_tax - 30.0 / 1.09).abs() < 1e-9);

        Ok(())
    }

    #[tokio::test]
    async fn test_save_invoice_rejects_foreign_orders() -> Result<()> {
        let (db, alice, weekmenu) = setup_with_weekmenu(20).await?;
        let bob = create_test_client(&db, "Bob", alice.group_id.unwrap()).await?;
        let bobs = place_or_update(
            &db,
            StockPolicy::Clamp,
            bob.id,
            weekmenu.id,
            TEST_WEEK,
            1,
            None,
        )
        .await?;

        let result = save_invoice(&db, alice.id, "A-1".to_string(), date(7), &[bobs.order.id]).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation {
                field: "orders",
                ..
            }
        ));

        let result = save_invoice(&db, alice.id, "A-1".to_string(), date(7), &[999]).await;
        assert!(matches!(result.unwrap_err(), Error::OrderNotFound { id: 999 }));

        assert!(get_invoices_for_user(&db, alice.id).await?.is_empty());

        let result = invoice_detail(&db, 999, DEFAULT_VAT_RATE).await;
        assert!(matches!(result.unwrap_err(), Error::InvoiceNotFound { id: 999 }));

        Ok(())
    }
}
