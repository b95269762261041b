use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::AccountId;
use crate::policy::FormOwnership;

/// Identifier wrapper for evaluation forms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FormId(pub i64);

/// Identifier wrapper for checklist line items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LineItemId(pub i64);

/// Why the evaluation was held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Purpose {
    #[serde(rename = "Final")]
    Final,
    #[serde(rename = "Estágio")]
    Internship,
}

impl Purpose {
    pub const fn label(self) -> &'static str {
        match self {
            Purpose::Final => "Final",
            Purpose::Internship => "Estágio",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Final" => Some(Purpose::Final),
            "Estágio" => Some(Purpose::Internship),
            _ => None,
        }
    }
}

/// Lifecycle status of a form. Transitions are deliberately
/// unconstrained: any caller permitted to update may set any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStatus {
    #[serde(rename = "rascunho")]
    Draft,
    #[serde(rename = "finalizada")]
    Finalized,
    #[serde(rename = "aprovada")]
    Approved,
    #[serde(rename = "reprovada")]
    Rejected,
}

impl FormStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FormStatus::Draft => "rascunho",
            FormStatus::Finalized => "finalizada",
            FormStatus::Approved => "aprovada",
            FormStatus::Rejected => "reprovada",
        }
    }
}

/// Assessment level assigned to one checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "O")]
    Excellent,
    #[serde(rename = "B")]
    Good,
    #[serde(rename = "R")]
    Regular,
    #[serde(rename = "NS")]
    Unsatisfactory,
    #[serde(rename = "NA")]
    NotApplicable,
}

/// The eleven fixed evaluation areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AreaCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
}

impl AreaCode {
    pub const fn letter(self) -> char {
        match self {
            AreaCode::A => 'A',
            AreaCode::B => 'B',
            AreaCode::C => 'C',
            AreaCode::D => 'D',
            AreaCode::E => 'E',
            AreaCode::F => 'F',
            AreaCode::G => 'G',
            AreaCode::H => 'H',
            AreaCode::I => 'I',
            AreaCode::J => 'J',
            AreaCode::K => 'K',
        }
    }
}

/// One practical evaluation record.
///
/// The evaluatee, evaluator, and unit-chief name fields are snapshots
/// taken when the form is written. They are never refreshed when the
/// referenced account changes or disappears, so historical records stay
/// legible on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationForm {
    pub id: FormId,
    pub evaluatee_id: AccountId,
    pub evaluatee_name: String,
    pub evaluator_id: AccountId,
    pub evaluator_name: String,
    pub atc_unit: String,
    pub location: String,
    pub evaluated_on: NaiveDate,
    pub purpose: Purpose,
    pub license: Option<String>,
    pub scenario_conditions: Option<String>,
    pub control_position_minutes: i32,
    pub assistant_position_minutes: i32,
    pub performance_summary: Option<String>,
    pub comments: Option<String>,
    pub status: FormStatus,
    pub signed_by_evaluatee: bool,
    pub signed_by_evaluator: bool,
    pub signed_by_unit_chief: bool,
    pub unit_chief_id: Option<AccountId>,
    pub unit_chief_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationForm {
    pub fn ownership(&self) -> FormOwnership {
        FormOwnership {
            evaluatee_id: self.evaluatee_id,
            evaluator_id: self.evaluator_id,
        }
    }
}

/// Form fields persisted on insert; id and timestamps come from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFormRecord {
    pub evaluatee_id: AccountId,
    pub evaluatee_name: String,
    pub evaluator_id: AccountId,
    pub evaluator_name: String,
    pub atc_unit: String,
    pub location: String,
    pub evaluated_on: NaiveDate,
    pub purpose: Purpose,
    pub license: Option<String>,
    pub scenario_conditions: Option<String>,
    pub status: FormStatus,
}

/// Partial form update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPatch {
    #[serde(default)]
    pub status: Option<FormStatus>,
    #[serde(default)]
    pub scenario_conditions: Option<String>,
    #[serde(default)]
    pub control_position_minutes: Option<i32>,
    #[serde(default)]
    pub assistant_position_minutes: Option<i32>,
    #[serde(default)]
    pub performance_summary: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

impl FormPatch {
    /// Names of the fields this patch touches, for the audit trail.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.status.is_some() {
            fields.push("status");
        }
        if self.scenario_conditions.is_some() {
            fields.push("scenarioConditions");
        }
        if self.control_position_minutes.is_some() {
            fields.push("controlPositionMinutes");
        }
        if self.assistant_position_minutes.is_some() {
            fields.push("assistantPositionMinutes");
        }
        if self.performance_summary.is_some() {
            fields.push("performanceSummary");
        }
        if self.comments.is_some() {
            fields.push("comments");
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }
}

/// One checklist row within a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub form_id: FormId,
    pub area: AreaCode,
    pub area_name: String,
    pub sub_item: String,
    pub grade: Option<Grade>,
    pub observations: Option<String>,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line-item fields persisted on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItemRecord {
    pub form_id: FormId,
    pub area: AreaCode,
    pub area_name: String,
    pub sub_item: String,
    pub grade: Option<Grade>,
    pub observations: Option<String>,
    pub position: i32,
}

/// Append-only change-log row attached to a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: i64,
    pub form_id: FormId,
    pub actor_id: AccountId,
    pub actor_name: String,
    pub action: String,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Audit fields persisted on append.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditRecord {
    pub form_id: FormId,
    pub actor_id: AccountId,
    pub actor_name: String,
    pub action: String,
    pub description: Option<String>,
}
