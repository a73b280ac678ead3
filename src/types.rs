use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A person or company contact.
///
/// `id`, `created_at`, and `updated_at` are assigned by the record
/// store; everything else is user-entered. Optional text fields are
/// represented as empty strings rather than `Option` — that is what
/// the store hands back and what forms submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A sales deal moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub title: String,
    /// Deal value in the workspace currency. Never negative, never NaN.
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub stage: DealStage,
    /// Win probability, 0–100.
    #[serde(default)]
    pub probability: i64,
    #[serde(default)]
    pub status: DealStatus,
    /// Reference to `Contact::id`. Unenforced — may dangle.
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub expected_close_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A logged touchpoint: call, email, meeting, note, task, follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: ActivityType,
    pub description: String,
    /// Reference to `Contact::id`. Unenforced — may dangle.
    #[serde(default)]
    pub contact_id: Option<String>,
    /// Reference to `Deal::id`. Unenforced — may dangle.
    #[serde(default)]
    pub deal_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

/// Pipeline stage for a deal. Linearly ordered for the advance/retreat
/// controls; `Won` and `Lost` sit at the end of the line but are only
/// ever entered through explicit selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DealStage {
    #[default]
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl DealStage {
    /// All stages in pipeline order.
    pub const ALL: [DealStage; 6] = [
        DealStage::Lead,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::Won,
        DealStage::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Lead => "Lead",
            DealStage::Qualified => "Qualified",
            DealStage::Proposal => "Proposal",
            DealStage::Negotiation => "Negotiation",
            DealStage::Won => "Won",
            DealStage::Lost => "Lost",
        }
    }

    /// Parse a wire value. Returns `None` for unrecognized input;
    /// callers decide the fallback.
    pub fn parse(raw: &str) -> Option<DealStage> {
        DealStage::ALL.into_iter().find(|s| s.as_str() == raw)
    }

    fn position(&self) -> usize {
        DealStage::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    /// One step forward along the pipeline. Saturates at `Lost`.
    pub fn advanced(&self) -> DealStage {
        let idx = self.position();
        if idx + 1 < DealStage::ALL.len() {
            DealStage::ALL[idx + 1]
        } else {
            *self
        }
    }

    /// One step back along the pipeline. Saturates at `Lead`.
    pub fn retreated(&self) -> DealStage {
        let idx = self.position();
        if idx > 0 {
            DealStage::ALL[idx - 1]
        } else {
            *self
        }
    }
}

/// Open/closed status of a deal, independent of its stage field.
/// Pipeline views key off this, not the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DealStatus {
    #[default]
    Open,
    Won,
    Lost,
}

impl DealStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DealStatus::Open => "Open",
            DealStatus::Won => "Won",
            DealStatus::Lost => "Lost",
        }
    }

    pub fn parse(raw: &str) -> Option<DealStatus> {
        [DealStatus::Open, DealStatus::Won, DealStatus::Lost]
            .into_iter()
            .find(|s| s.as_str() == raw)
    }
}

/// Kind of activity. The wire spelling of `FollowUp` is `Follow-up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivityType {
    #[default]
    Call,
    Email,
    Meeting,
    Note,
    Task,
    #[serde(rename = "Follow-up")]
    FollowUp,
}

impl ActivityType {
    pub const ALL: [ActivityType; 6] = [
        ActivityType::Call,
        ActivityType::Email,
        ActivityType::Meeting,
        ActivityType::Note,
        ActivityType::Task,
        ActivityType::FollowUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Call => "Call",
            ActivityType::Email => "Email",
            ActivityType::Meeting => "Meeting",
            ActivityType::Note => "Note",
            ActivityType::Task => "Task",
            ActivityType::FollowUp => "Follow-up",
        }
    }

    pub fn parse(raw: &str) -> Option<ActivityType> {
        ActivityType::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

/// Writable contact fields, as submitted from a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Writable deal fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInput {
    pub title: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub stage: DealStage,
    #[serde(default)]
    pub probability: i64,
    #[serde(default)]
    pub status: DealStatus,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub expected_close_date: Option<NaiveDate>,
}

impl Default for DealInput {
    fn default() -> Self {
        DealInput {
            title: String::new(),
            value: 0.0,
            stage: DealStage::Lead,
            probability: 0,
            status: DealStatus::Open,
            contact_id: None,
            expected_close_date: None,
        }
    }
}

/// Writable activity fields. A `None` timestamp means "now" — it is
/// stamped at the storage boundary, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    #[serde(rename = "type", default)]
    pub kind: ActivityType,
    pub description: String,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
}
