use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sprintdeck_common::error::SprintdeckError;

/// Sprint filter accepted by the Jira Agile API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintState {
    Active,
    Closed,
    Future,
}

impl SprintState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Future => "future",
        }
    }
}

impl FromStr for SprintState {
    type Err = SprintdeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            "future" => Ok(Self::Future),
            other => Err(SprintdeckError::Validation(format!(
                "invalid state '{other}', expected active, closed or future"
            ))),
        }
    }
}

/// A sprint from `GET /rest/agile/1.0/board/{id}/sprint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintPage {
    #[serde(default)]
    pub is_last: bool,
    pub values: Vec<Sprint>,
}

/// Flattened issue shape used by the analytics endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub status: String,
    pub story_points: Option<f64>,
    pub assignee: Option<String>,
    pub issue_type: String,
}

impl Issue {
    pub fn is_done(&self) -> bool {
        self.status.eq_ignore_ascii_case("done") || self.status.eq_ignore_ascii_case("closed")
    }
}

// Raw wire shapes from `GET /rest/agile/1.0/sprint/{id}/issue`.

#[derive(Debug, Deserialize)]
pub struct IssuePage {
    pub issues: Vec<IssueDoc>,
}

#[derive(Debug, Deserialize)]
pub struct IssueDoc {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize)]
pub struct IssueFields {
    pub status: NamedField,
    pub issuetype: NamedField,
    pub assignee: Option<AssigneeField>,
    /// Story points live in a customfield on Jira Cloud.
    #[serde(rename = "customfield_10016")]
    pub story_points: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct NamedField {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeField {
    pub display_name: Option<String>,
}

impl From<IssueDoc> for Issue {
    fn from(doc: IssueDoc) -> Self {
        Self {
            key: doc.key,
            status: doc.fields.status.name,
            story_points: doc.fields.story_points,
            assignee: doc.fields.assignee.and_then(|a| a.display_name),
            issue_type: doc.fields.issuetype.name,
        }
    }
}
