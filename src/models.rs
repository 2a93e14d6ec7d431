//! Core data models used throughout Gravibook.
//!
//! [`Contact`] is the only persistent entity. Its serde shape (camelCase
//! keys, RFC 3339 timestamps) is the format of the storage file and of the
//! JSON export, so changing a field name here is a file-format change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single address-book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// `"{first} {last}"`, the key used by the name sort orders.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Replace every editable field with the values from `input`.
    ///
    /// `id`, `avatar`, and both timestamps are left to the caller.
    pub fn apply(&mut self, input: ContactInput) {
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.email = input.email;
        self.phone = input.phone;
        self.tags = input.tags;
    }

    pub fn has_any_tag(&self, wanted: &[String]) -> bool {
        wanted.iter().any(|t| self.tags.contains(t))
    }
}

/// The editable subset of a [`Contact`], as collected by `add` and `edit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tags: Vec<String>,
}

impl From<&Contact> for ContactInput {
    fn from(c: &Contact) -> Self {
        Self {
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            tags: c.tags.clone(),
        }
    }
}

/// Fresh opaque contact id.
pub fn new_contact_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Timestamp for a mutation that must not move `updatedAt` backwards.
///
/// Returns the latest of the wall clock and every `floor` given.
pub fn monotonic_now(floors: &[DateTime<Utc>]) -> DateTime<Utc> {
    floors.iter().copied().fold(Utc::now(), |acc, t| acc.max(t))
}
