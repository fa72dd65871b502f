use chrono::{DateTime, Utc};
use uuid::Uuid;

/// User lifecycle event kinds as named on the wire by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    UserCreated,
    UserUpdated,
    UserDeleted,
    /// Any other event type; acknowledged without touching the store.
    Other(String),
}

impl EventKind {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "user.created" => Self::UserCreated,
            "user.updated" => Self::UserUpdated,
            "user.deleted" => Self::UserDeleted,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::UserDeleted => "user.deleted",
            Self::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified and decoded webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    /// Stable identity key issued by the provider.
    pub subject_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl InboundEvent {
    pub fn full_name(&self) -> Option<String> {
        derive_full_name(self.first_name.as_deref(), self.last_name.as_deref())
    }

    /// Mutable columns written by an upsert.
    pub fn user_fields(&self) -> UserFields {
        UserFields {
            email: self.email.clone(),
            full_name: self.full_name(),
        }
    }
}

/// `trim(first + " " + last)`; an empty result becomes `None`.
pub fn derive_full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""));
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Columns an upsert may overwrite on an existing row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserFields {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Persisted user row, keyed by `external_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub external_id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a handled event did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Upserted { external_id: String },
    Deleted { external_id: String, existed: bool },
    Ignored { event_type: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_name_joins_and_trims() {
        assert_eq!(
            derive_full_name(Some("Ana"), Some("Silva")).as_deref(),
            Some("Ana Silva")
        );
        assert_eq!(derive_full_name(Some("Ana"), None).as_deref(), Some("Ana"));
        assert_eq!(derive_full_name(None, Some("Silva")).as_deref(), Some("Silva"));
        assert_eq!(
            derive_full_name(Some("  Ana "), Some(" Silva  ")).as_deref(),
            Some("Ana   Silva")
        );
    }

    #[test]
    fn empty_full_name_becomes_none() {
        assert_eq!(derive_full_name(None, None), None);
        assert_eq!(derive_full_name(Some(""), Some("   ")), None);
    }

    #[test]
    fn event_kind_wire_names() {
        for (raw, kind) in [
            ("user.created", EventKind::UserCreated),
            ("user.updated", EventKind::UserUpdated),
            ("user.deleted", EventKind::UserDeleted),
            ("session.created", EventKind::Other("session.created".into())),
        ] {
            let parsed = EventKind::from_wire(raw);
            assert_eq!(parsed, kind);
            assert_eq!(parsed.as_str(), raw);
        }
    }
}
