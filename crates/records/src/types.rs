//! Core record types.
//!
//! This module defines the data shared by every other crate in the workspace:
//! - `RecordId` and `FieldValue`, the generic vocabulary queries speak
//! - the `Record` trait, which lets a query read fields by name
//! - `User`, the concrete resource, with its draft and patch shapes

use crate::error::{RecordError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Identifiers and field values
// =============================================================================

/// Generated identifier for a persisted record.
///
/// Ids are handed out sequentially starting at 1 and never reused, so
/// ascending id order is creation order.
pub type RecordId = u64;

/// A single field read from a record.
///
/// Variant order matters: the derived `Ord` sorts `Null` before booleans,
/// booleans before integers and integers before text. Sorting by a column
/// with mixed types therefore stays total and deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Integer(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

// =============================================================================
// Record trait
// =============================================================================

/// A persisted resource that queries can inspect and repositories can store.
///
/// ## Design Note
/// - `Send + Sync` lets snapshots be filtered with rayon and shared behind locks
/// - `Draft` is the creation payload, `Patch` the partial update payload
/// - Unknown field names read as `FieldValue::Null` rather than failing, so a
///   constraint on a missing column simply matches nothing
pub trait Record: Clone + Send + Sync {
    /// Payload accepted by `create`
    type Draft;
    /// Partial payload accepted by `update`
    type Patch;

    /// Name of the collection this record type lives in
    const COLLECTION: &'static str;

    fn id(&self) -> RecordId;

    /// Read a field by name
    fn field(&self, name: &str) -> FieldValue;

    /// Build a validated record from a draft and a freshly generated id
    fn from_draft(id: RecordId, draft: Self::Draft) -> Result<Self>;

    /// Apply the supplied fields of a patch, then re-validate.
    ///
    /// On error the record must be left unchanged.
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<()>;
}

// =============================================================================
// User
// =============================================================================

/// Role assigned to a user when the draft names none
pub const DEFAULT_ROLE: &str = "member";

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub role: String,
    /// Storage path of the uploaded profile picture, if any
    pub profile_picture_path: Option<String>,
}

/// Creation payload for a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age: None,
            role: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Partial update for a user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub role: Option<String>,
    pub profile_picture_path: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.age.is_none()
            && self.role.is_none()
            && self.profile_picture_path.is_none()
    }
}

impl User {
    /// Check the field invariants of a user.
    ///
    /// - name is not blank
    /// - email contains an `@` with text on both sides
    /// - role is not blank
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.name, &self.email, Some(&self.role))
    }
}

impl UserDraft {
    /// Check the draft against the same invariants a stored user must hold.
    ///
    /// An absent role is fine; it becomes `DEFAULT_ROLE` on creation.
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.name, &self.email, self.role.as_deref())
    }
}

fn check_fields(name: &str, email: &str, role: Option<&str>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(RecordError::validation("name", "must not be empty"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(RecordError::validation(
                "email",
                format!("'{email}' is not an email address"),
            ));
        }
    }
    if role.is_some_and(|role| role.trim().is_empty()) {
        return Err(RecordError::validation("role", "must not be empty"));
    }
    Ok(())
}

impl Record for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";

    fn id(&self) -> RecordId {
        self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => FieldValue::Integer(self.id as i64),
            "name" => FieldValue::Text(self.name.clone()),
            "email" => FieldValue::Text(self.email.clone()),
            "age" => self.age.map(|a| FieldValue::Integer(a as i64)).into(),
            "role" => FieldValue::Text(self.role.clone()),
            "profile_picture_path" => self.profile_picture_path.clone().into(),
            _ => FieldValue::Null,
        }
    }

    fn from_draft(id: RecordId, draft: UserDraft) -> Result<Self> {
        let user = User {
            id,
            name: draft.name,
            email: draft.email,
            age: draft.age,
            role: draft.role.unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            profile_picture_path: None,
        };
        user.validate()?;
        Ok(user)
    }

    fn apply_patch(&mut self, patch: UserPatch) -> Result<()> {
        let mut next = self.clone();
        if let Some(name) = patch.name {
            next.name = name;
        }
        if let Some(email) = patch.email {
            next.email = email;
        }
        if let Some(age) = patch.age {
            next.age = Some(age);
        }
        if let Some(role) = patch.role {
            next.role = role;
        }
        if let Some(path) = patch.profile_picture_path {
            next.profile_picture_path = Some(path);
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::from_draft(1, UserDraft::new("Ann", "ann@example.com").with_age(31)).unwrap()
    }

    #[test]
    fn test_draft_defaults_role() {
        let user = sample_user();
        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(user.profile_picture_path, None);
    }

    #[test]
    fn test_draft_rejects_bad_email() {
        let err = User::from_draft(1, UserDraft::new("Ann", "ann.example.com")).unwrap_err();
        assert!(matches!(err, RecordError::Validation { ref field, .. } if field == "email"));

        let err = User::from_draft(1, UserDraft::new("Ann", "@example.com")).unwrap_err();
        assert!(matches!(err, RecordError::Validation { ref field, .. } if field == "email"));
    }

    #[test]
    fn test_draft_rejects_blank_name() {
        let err = User::from_draft(1, UserDraft::new("   ", "ann@example.com")).unwrap_err();
        assert!(matches!(err, RecordError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_draft_validate_without_id() {
        assert!(UserDraft::new("Ann", "ann@example.com").validate().is_ok());

        let err = UserDraft::new("Ann", "ann@example.com")
            .with_role(" ")
            .validate()
            .unwrap_err();
        assert!(matches!(err, RecordError::Validation { ref field, .. } if field == "role"));
    }

    #[test]
    fn test_patch_updates_only_supplied_fields() {
        let mut user = sample_user();
        user.apply_patch(UserPatch {
            name: Some("Annie".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(user.name, "Annie");
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.age, Some(31));
    }

    #[test]
    fn test_invalid_patch_leaves_record_unchanged() {
        let mut user = sample_user();
        let before = user.clone();
        let result = user.apply_patch(UserPatch {
            name: Some("Annie".to_string()),
            email: Some("broken".to_string()),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(user, before);
    }

    #[test]
    fn test_field_lookup() {
        let user = sample_user();
        assert_eq!(user.field("id"), FieldValue::Integer(1));
        assert_eq!(user.field("name"), FieldValue::Text("Ann".to_string()));
        assert_eq!(user.field("age"), FieldValue::Integer(31));
        assert_eq!(user.field("profile_picture_path"), FieldValue::Null);
        assert_eq!(user.field("no_such_column"), FieldValue::Null);
    }

    #[test]
    fn test_field_value_ordering() {
        assert!(FieldValue::Null < FieldValue::Integer(0));
        assert!(FieldValue::Integer(5) < FieldValue::Integer(10));
        assert!(FieldValue::Integer(99) < FieldValue::Text("a".to_string()));
    }
}
