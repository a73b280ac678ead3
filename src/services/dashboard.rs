//! Dashboard aggregation: headline stats, the recent-items feed, and
//! the concurrent loader the home page calls.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::store::activities::ActivityStore;
use crate::store::contacts::ContactStore;
use crate::store::deals::DealStore;
use crate::types::{Activity, Contact, Deal, DealStatus};

/// How many of each collection feed candidates are drawn from.
const FEED_PER_TYPE: usize = 2;

/// Default feed length.
pub const FEED_LIMIT: usize = 6;

/// Headline numbers for the stat cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Every contact counts.
    pub contacts: usize,
    /// Open deals only.
    pub deals: usize,
    /// Incomplete activities only.
    pub activities: usize,
    /// Sum of value over Won deals.
    pub revenue: f64,
}

pub fn dashboard_stats(
    contacts: &[Contact],
    deals: &[Deal],
    activities: &[Activity],
) -> DashboardStats {
    DashboardStats {
        contacts: contacts.len(),
        deals: deals.iter().filter(|d| d.status == DealStatus::Open).count(),
        activities: activities.iter().filter(|a| !a.completed).count(),
        revenue: deals
            .iter()
            .filter(|d| d.status == DealStatus::Won)
            .map(|d| d.value)
            .sum(),
    }
}

/// One entry in the recent-items feed, tagged with its entity type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RecentItem {
    Contact(Contact),
    Deal(Deal),
    Activity(Activity),
}

impl RecentItem {
    /// Best-available timestamp: `created_at` for contacts and deals,
    /// the activity timestamp for activities.
    fn sort_key(&self) -> Option<DateTime<Utc>> {
        match self {
            RecentItem::Contact(c) => c.created_at,
            RecentItem::Deal(d) => d.created_at,
            RecentItem::Activity(a) => Some(a.timestamp),
        }
    }
}

/// Merge the first two items of each collection (store order, not
/// re-sorted per type), sort descending by best timestamp, truncate.
///
/// The sort is stable, so equal timestamps keep merge order: contacts
/// before deals before activities. Items with no timestamp sink to the
/// end.
pub fn recent_feed(
    contacts: &[Contact],
    deals: &[Deal],
    activities: &[Activity],
    limit: usize,
) -> Vec<RecentItem> {
    let mut items: Vec<RecentItem> = Vec::new();
    items.extend(
        contacts
            .iter()
            .take(FEED_PER_TYPE)
            .cloned()
            .map(RecentItem::Contact),
    );
    items.extend(deals.iter().take(FEED_PER_TYPE).cloned().map(RecentItem::Deal));
    items.extend(
        activities
            .iter()
            .take(FEED_PER_TYPE)
            .cloned()
            .map(RecentItem::Activity),
    );
    items.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
    items.truncate(limit);
    items
}

/// Everything the home page renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub recent: Vec<RecentItem>,
}

/// Fetch all three collections concurrently and aggregate. Any fetch
/// failure propagates unchanged; nothing is partially applied.
pub async fn load_dashboard(
    contacts: &ContactStore,
    deals: &DealStore,
    activities: &ActivityStore,
) -> Result<DashboardData, StoreError> {
    let (contacts, deals, activities) =
        tokio::join!(contacts.get_all(), deals.get_all(), activities.get_all());
    let (contacts, deals, activities) = (contacts?, deals?, activities?);

    tracing::debug!(
        target: "nimbus_crm::dashboard",
        contacts = contacts.len(),
        deals = deals.len(),
        activities = activities.len(),
        "dashboard collections loaded"
    );

    Ok(DashboardData {
        stats: dashboard_stats(&contacts, &deals, &activities),
        recent: recent_feed(&contacts, &deals, &activities, FEED_LIMIT),
    })
}
