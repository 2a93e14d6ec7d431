//! The authoritative contact collection.
//!
//! [`ContactStore`] exclusively owns the in-memory list. Every successful
//! mutation writes the whole list through its [`Storage`] collaborator.
//! Storage failures are logged and swallowed: the in-memory list stays
//! the source of truth for the rest of the session.
//!
//! | Method | Persists | Notes |
//! |--------|----------|-------|
//! | [`create`](ContactStore::create) | yes | fresh id, resolves avatar |
//! | [`update`](ContactStore::update) | yes | re-resolves avatar only on email change |
//! | [`delete`](ContactStore::delete) | on removal | `false` when absent |
//! | [`get`](ContactStore::get) | no | |
//! | [`import_many`](ContactStore::import_many) | yes | append-only, verbatim |

use crate::avatar::AvatarResolver;
use crate::models::{monotonic_now, new_contact_id, Contact, ContactInput};
use crate::storage::{decode_collection, encode_collection, Storage};

pub struct ContactStore {
    contacts: Vec<Contact>,
    storage: Box<dyn Storage>,
    avatars: AvatarResolver,
}

impl ContactStore {
    /// Load the collection from `storage`.
    ///
    /// Missing or unreadable stored data yields an empty collection;
    /// individual bad records are dropped (see [`decode_collection`]).
    pub fn open(storage: Box<dyn Storage>, avatars: AvatarResolver) -> Self {
        let contacts = match storage.load() {
            Ok(Some(text)) => decode_collection(&text).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored contacts unreadable, starting empty");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load contacts, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = contacts.len(), "contacts loaded");

        Self {
            contacts,
            storage,
            avatars,
        }
    }

    /// Read-only view of the whole collection in storage order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn avatars(&self) -> &AvatarResolver {
        &self.avatars
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    pub async fn create(&mut self, input: ContactInput) -> Contact {
        let avatar = self.avatars.resolve(&input.email).await;
        let now = chrono::Utc::now();

        let contact = Contact {
            id: self.fresh_id(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            tags: input.tags,
            avatar: Some(avatar),
            created_at: now,
            updated_at: now,
        };

        self.contacts.push(contact.clone());
        self.persist();
        contact
    }

    /// Replace the editable fields of `id`. `None` when no such record.
    pub async fn update(&mut self, id: &str, input: ContactInput) -> Option<Contact> {
        let index = self.contacts.iter().position(|c| c.id == id)?;

        let avatar = if self.contacts[index].email != input.email {
            Some(self.avatars.resolve(&input.email).await)
        } else {
            self.contacts[index].avatar.clone()
        };

        let contact = &mut self.contacts[index];
        contact.updated_at = monotonic_now(&[contact.created_at, contact.updated_at]);
        contact.apply(input);
        contact.avatar = avatar;
        let updated = contact.clone();

        self.persist();
        Some(updated)
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        let removed = self.contacts.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    /// Append records as-is. No id, email, or avatar processing.
    pub fn import_many(&mut self, records: Vec<Contact>) -> usize {
        let count = records.len();
        if count == 0 {
            return 0;
        }
        self.contacts.extend(records);
        self.persist();
        count
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = new_contact_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) {
        let result = encode_collection(&self.contacts).and_then(|text| self.storage.save(&text));
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist contacts");
        }
    }
}
