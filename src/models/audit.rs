use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: i64,
    pub action: String,
    pub kind: AuditKind,
    pub actor: String,
    pub details: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditKind {
    Create,
    Update,
    Delete,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::Create => "CREATE",
            AuditKind::Update => "UPDATE",
            AuditKind::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATE" => Some(AuditKind::Create),
            "UPDATE" => Some(AuditKind::Update),
            "DELETE" => Some(AuditKind::Delete),
            _ => None,
        }
    }
}
