//! Ordering window resolution.
//!
//! Decides what a client can order right now: the current week's weekmenus, or, when
//! the current week has nothing left, the earliest future week that an admin opened
//! for pre-order through the invitation flag.

use crate::{
    core::week::{WeekKey, after_condition, bucket_condition},
    entities::{Menu, Weekmenu, menu, weekmenu},
    errors::Result,
};
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryOrder, prelude::*};
use tracing::debug;

/// A weekmenu as shown to a client, with the menu it offers.
#[derive(Debug, Clone, PartialEq)]
pub struct Offering {
    /// The weekmenu with its remaining stock
    pub weekmenu: weekmenu::Model,
    /// The offered menu
    pub menu: menu::Model,
}

/// What a client may order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderingWindow {
    /// The current week still has stock
    Current {
        /// The current week
        week: WeekKey,
        /// Orderable weekmenus, by display rank
        offerings: Vec<Offering>,
    },
    /// The current week is empty; this future week is open for pre-order
    PreOrder {
        /// The earliest invited future week
        week: WeekKey,
        /// Orderable weekmenus, by display rank
        offerings: Vec<Offering>,
    },
    /// Nothing can be ordered
    Empty,
}

impl OrderingWindow {
    /// Whether the window is a pre-order for a future week.
    #[must_use]
    pub const fn is_pre_order(&self) -> bool {
        matches!(self, Self::PreOrder { .. })
    }

    /// The week the offerings belong to, if any.
    #[must_use]
    pub const fn week(&self) -> Option<WeekKey> {
        match self {
            Self::Current { week, .. } | Self::PreOrder { week, .. } => Some(*week),
            Self::Empty => None,
        }
    }

    /// The orderable offerings, empty for [`OrderingWindow::Empty`].
    #[must_use]
    pub fn offerings(&self) -> &[Offering] {
        match self {
            Self::Current { offerings, .. } | Self::PreOrder { offerings, .. } => offerings,
            Self::Empty => &[],
        }
    }
}

/// Weekmenus a caller may see: global ones and those of the caller's group.
/// A caller without a group sees everything.
fn visibility_condition(group_id: Option<i64>) -> Condition {
    match group_id {
        Some(group_id) => Condition::any()
            .add(weekmenu::Column::GroupId.is_null())
            .add(weekmenu::Column::GroupId.eq(group_id)),
        None => Condition::all(),
    }
}

fn into_offerings(rows: Vec<(weekmenu::Model, Option<menu::Model>)>) -> Vec<Offering> {
    rows.into_iter()
        .filter_map(|(weekmenu, menu)| menu.map(|menu| Offering { weekmenu, menu }))
        .collect()
}

/// Resolves the ordering window for a caller at the instant `now`.
///
/// # Arguments
/// * `db` - Database connection
/// * `group_id` - The caller's group, if any
/// * `now` - The instant that defines the current week
pub async fn resolve_ordering_window(
    db: &DatabaseConnection,
    group_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<OrderingWindow> {
    let current = WeekKey::containing(now);

    let rows = Weekmenu::find()
        .find_also_related(Menu)
        .filter(bucket_condition(
            weekmenu::Column::Year,
            weekmenu::Column::Week,
            current,
        ))
        .filter(weekmenu::Column::Quantity.gt(0))
        .filter(visibility_condition(group_id))
        .order_by_asc(weekmenu::Column::Ordering)
        .order_by_asc(weekmenu::Column::Id)
        .all(db)
        .await?;

    let offerings = into_offerings(rows);
    if !offerings.is_empty() {
        return Ok(OrderingWindow::Current {
            week: current,
            offerings,
        });
    }

    let future = Weekmenu::find()
        .find_also_related(Menu)
        .filter(after_condition(
            weekmenu::Column::Year,
            weekmenu::Column::Week,
            current,
        ))
        .filter(weekmenu::Column::Invitation.eq(true))
        .filter(weekmenu::Column::Quantity.gt(0))
        .filter(visibility_condition(group_id))
        .order_by_asc(weekmenu::Column::Year)
        .order_by_asc(weekmenu::Column::Week)
        .order_by_asc(weekmenu::Column::Ordering)
        .order_by_asc(weekmenu::Column::Id)
        .all(db)
        .await?;

    let Some(week) = future
        .first()
        .map(|(wm, _)| WeekKey::new(wm.week, wm.year))
    else {
        debug!("No weekmenus orderable in or after {current}");
        return Ok(OrderingWindow::Empty);
    };

    let earliest: Vec<_> = future
        .into_iter()
        .take_while(|(wm, _)| WeekKey::new(wm.week, wm.year) == week)
        .collect();

    debug!("{current} is empty, offering pre-order for {week}");
    Ok(OrderingWindow::PreOrder {
        week,
        offerings: into_offerings(earliest),
    })
}

/// Resolves the ordering window for the current instant.
pub async fn resolve_ordering_window_now(
    db: &DatabaseConnection,
    group_id: Option<i64>,
) -> Result<OrderingWindow> {
    resolve_ordering_window(db, group_id, Utc::now()).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::weekmenu::toggle_invitation_visibility;
    use crate::test_utils::*;
    use chrono::TimeZone;

    /// Wednesday of ISO week 10 of 2025
    fn week_10_2025() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_current_week_wins() -> Result<()> {
        let db = setup_test_db().await?;
        let menu = create_test_menu(&db, "Rendang", 12.5).await?;
        let current = create_test_weekmenu(&db, menu.id, WeekKey::new(10, 2025), None, 5).await?;
        create_test_weekmenu(&db, menu.id, WeekKey::new(12, 2025), None, 5).await?;
        toggle_invitation_visibility(&db, WeekKey::new(12, 2025)).await?;

        let window = resolve_ordering_window(&db, None, week_10_2025()).await?;
        assert!(!window.is_pre_order());
        assert_eq!(window.week(), Some(WeekKey::new(10, 2025)));
        let ids: Vec<i64> = window.offerings().iter().map(|o| o.weekmenu.id).collect();
        assert_eq!(ids, vec![current.id]);

        Ok(())
    }

    #[tokio::test]
    async fn test_pre_order_picks_earliest_invited_week() -> Result<()> {
        let db = setup_test_db().await?;
        let menu = create_test_menu(&db, "Rendang", 12.5).await?;

        // Week 11 exists but is not invited, so it is skipped
        create_test_weekmenu(&db, menu.id, WeekKey::new(11, 2025), None, 5).await?;
        let invited = create_test_weekmenu(&db, menu.id, WeekKey::new(12, 2025), None, 5).await?;
        create_test_weekmenu(&db, menu.id, WeekKey::new(13, 2025), None, 5).await?;
        toggle_invitation_visibility(&db, WeekKey::new(12, 2025)).await?;
        toggle_invitation_visibility(&db, WeekKey::new(13, 2025)).await?;

        let window = resolve_ordering_window(&db, None, week_10_2025()).await?;
        assert!(window.is_pre_order());
        assert_eq!(window.week(), Some(WeekKey::new(12, 2025)));
        assert_eq!(window.offerings().len(), 1);
        assert_eq!(window.offerings()[0].weekmenu.id, invited.id);
        assert_eq!(window.offerings()[0].menu.label, "Rendang");

        Ok(())
    }

    #[tokio::test]
    async fn test_pre_order_crosses_year_boundary() -> Result<()> {
        let db = setup_test_db().await?;
        let menu = create_test_menu(&db, "Rendang", 12.5).await?;

        // Earlier year with a higher week number must not count as future
        create_test_weekmenu(&db, menu.id, WeekKey::new(52, 2024), None, 5).await?;
        toggle_invitation_visibility(&db, WeekKey::new(52, 2024)).await?;
        let next_year = create_test_weekmenu(&db, menu.id, WeekKey::new(2, 2026), None, 5).await?;
        toggle_invitation_visibility(&db, WeekKey::new(2, 2026)).await?;

        let window = resolve_ordering_window(&db, None, week_10_2025()).await?;
        assert_eq!(window.week(), Some(WeekKey::new(2, 2026)));
        assert_eq!(window.offerings()[0].weekmenu.id, next_year.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_sold_out_current_week_falls_through() -> Result<()> {
        let db = setup_test_db().await?;
        let menu = create_test_menu(&db, "Rendang", 12.5).await?;
        create_test_weekmenu(&db, menu.id, WeekKey::new(10, 2025), None, 5).await?;
        crate::core::weekmenu::close_ordering(&db, WeekKey::new(10, 2025)).await?;

        let window = resolve_ordering_window(&db, None, week_10_2025()).await?;
        assert_eq!(window, OrderingWindow::Empty);
        assert!(window.offerings().is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_group_visibility() -> Result<()> {
        let db = setup_test_db().await?;
        let north = create_test_group(&db, "north").await?;
        let south = create_test_group(&db, "south").await?;
        let menu = create_test_menu(&db, "Rendang", 12.5).await?;
        let week = WeekKey::new(10, 2025);

        let global = create_test_weekmenu(&db, menu.id, week, None, 5).await?;
        let for_north = create_test_weekmenu(&db, menu.id, week, Some(north.id), 5).await?;
        let for_south = create_test_weekmenu(&db, menu.id, week, Some(south.id), 5).await?;

        let window = resolve_ordering_window(&db, Some(north.id), week_10_2025()).await?;
        let ids: Vec<i64> = window.offerings().iter().map(|o| o.weekmenu.id).collect();
        assert_eq!(ids, vec![global.id, for_north.id]);

        // No group: everything is visible
        let window = resolve_ordering_window(&db, None, week_10_2025()).await?;
        let ids: Vec<i64> = window.offerings().iter().map(|o| o.weekmenu.id).collect();
        assert_eq!(ids, vec![global.id, for_north.id, for_south.id]);

        Ok(())
    }
}
