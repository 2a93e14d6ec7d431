//! CLI entry points for single-contact commands.
//!
//! Each `run_*` function prints to stdout and returns an error for a
//! not-found id so the binary exits non-zero.

use anyhow::{bail, Result};

use crate::avatar::AvatarResolver;
use crate::config::Config;
use crate::models::{Contact, ContactInput};
use crate::storage::{JsonFileStorage, MemoryStorage, Storage};
use crate::store::ContactStore;

/// Open the configured store. `ephemeral` keeps everything in memory.
pub fn open_store(config: &Config, ephemeral: bool) -> Result<ContactStore> {
    let storage: Box<dyn Storage> = if ephemeral {
        Box::new(MemoryStorage::new())
    } else {
        Box::new(JsonFileStorage::new(&config.storage.path))
    };
    let avatars = AvatarResolver::from_config(&config.avatar)?;
    Ok(ContactStore::open(storage, avatars))
}

/// Field overrides for `edit`. `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ContactPatch {
    pub fn merge_into(self, current: &Contact) -> ContactInput {
        let mut input = ContactInput::from(current);
        if let Some(v) = self.first_name {
            input.first_name = v;
        }
        if let Some(v) = self.last_name {
            input.last_name = v;
        }
        if let Some(v) = self.email {
            input.email = v;
        }
        if let Some(v) = self.phone {
            input.phone = v;
        }
        if let Some(v) = self.tags {
            input.tags = v;
        }
        input
    }
}

pub async fn run_add(store: &mut ContactStore, input: ContactInput) -> Result<()> {
    let contact = store.create(input).await;
    print_contact(&contact);
    Ok(())
}

pub async fn run_edit(store: &mut ContactStore, id: &str, patch: ContactPatch) -> Result<()> {
    let current = match store.get(id) {
        Some(c) => c.clone(),
        None => bail!("contact not found: {}", id),
    };
    match store.update(id, patch.merge_into(&current)).await {
        Some(contact) => {
            print_contact(&contact);
            Ok(())
        }
        None => bail!("contact not found: {}", id),
    }
}

pub fn run_remove(store: &mut ContactStore, id: &str) -> Result<()> {
    if !store.delete(id) {
        bail!("contact not found: {}", id);
    }
    println!("Deleted {}", id);
    Ok(())
}

pub fn run_get(store: &ContactStore, id: &str) -> Result<()> {
    match store.get(id) {
        Some(contact) => {
            print_contact(contact);
            Ok(())
        }
        None => bail!("contact not found: {}", id),
    }
}

pub async fn run_avatar(resolver: &AvatarResolver, email: &str) -> Result<()> {
    println!("{}", resolver.resolve(email).await);
    Ok(())
}

fn print_contact(contact: &Contact) {
    println!("id:         {}", contact.id);
    println!("name:       {}", contact.full_name());
    println!("email:      {}", contact.email);
    println!("phone:      {}", contact.phone);
    println!("tags:       {}", contact.tags.join(", "));
    println!(
        "avatar:     {}",
        contact.avatar.as_deref().unwrap_or("(pending)")
    );
    println!("created_at: {}", format_ts(contact.created_at));
    println!("updated_at: {}", format_ts(contact.updated_at));
}

fn format_ts(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
