//! Per-day activity grouping and activity list filters.

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::matches_query;
use crate::types::{Activity, ActivityType};

/// One calendar day of activities, most recent first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup {
    /// Local calendar day (the ISO date of the local start-of-day).
    pub day: NaiveDate,
    pub activities: Vec<Activity>,
}

/// Bucket activities by local calendar day.
///
/// The input is sorted descending by timestamp before bucketing, so
/// groups come out most-recent-day first and each group's activities
/// are most-recent first.
pub fn group_by_day(activities: &[Activity]) -> Vec<DayGroup> {
    let mut sorted: Vec<Activity> = activities.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut groups: Vec<DayGroup> = Vec::new();
    for activity in sorted {
        let day = activity.timestamp.with_timezone(&Local).date_naive();
        match groups.last_mut() {
            Some(group) if group.day == day => group.activities.push(activity),
            _ => groups.push(DayGroup {
                day,
                activities: vec![activity],
            }),
        }
    }
    groups
}

/// Completion facet of the activity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionFilter {
    #[default]
    All,
    Pending,
    Completed,
}

/// Active filters on the activity list. Facets compose with AND.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub completion: CompletionFilter,
    /// `None` means every type.
    pub kind: Option<ActivityType>,
    /// Substring match on the description, case-insensitive.
    pub search: String,
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity) -> bool {
        let completion_ok = match self.completion {
            CompletionFilter::All => true,
            CompletionFilter::Pending => !activity.completed,
            CompletionFilter::Completed => activity.completed,
        };
        let kind_ok = self.kind.map_or(true, |k| activity.kind == k);
        completion_ok && kind_ok && matches_query(&activity.description, self.search.trim())
    }
}

pub fn filter_activities(activities: &[Activity], filter: &ActivityFilter) -> Vec<Activity> {
    activities
        .iter()
        .filter(|a| filter.matches(a))
        .cloned()
        .collect()
}
