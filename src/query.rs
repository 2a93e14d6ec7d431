//! Derived, filtered, and sorted views over the contact collection.
//!
//! A [`ContactQuery`] combines two filter axes with AND:
//!
//! - **search**: case-insensitive substring match on first name, last name,
//!   or email. An empty term matches everything.
//! - **tags**: the contact carries at least one of the selected tags (OR
//!   across tags). An empty selection matches everything.
//!
//! The result is then ordered by a [`SortOption`]. Name orders compare
//! `"{first} {last}"` with a locale-aware [`NameCollator`], so diacritics
//! land where a reader of that language expects them.
//!
//! Views are recomputed from scratch on each call and returned as owned
//! snapshots; nothing here holds a reference into the store.

use anyhow::{anyhow, Result};
use icu::collator::{Collator, CollatorOptions};
use icu::locid::Locale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::config::Config;
use crate::models::Contact;
use crate::store::ContactStore;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    NameAsc,
    NameDesc,
    CreatedDesc,
    CreatedAsc,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::NameAsc => "name-asc",
            SortOption::NameDesc => "name-desc",
            SortOption::CreatedDesc => "created-desc",
            SortOption::CreatedAsc => "created-asc",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name-asc" => Ok(SortOption::NameAsc),
            "name-desc" => Ok(SortOption::NameDesc),
            "created-desc" => Ok(SortOption::CreatedDesc),
            "created-asc" => Ok(SortOption::CreatedAsc),
            other => Err(anyhow!(
                "Unknown sort option: {}. Use name-asc, name-desc, created-desc, or created-asc.",
                other
            )),
        }
    }
}

/// Locale-aware string comparison for name sorting.
pub struct NameCollator {
    collator: Collator,
}

impl NameCollator {
    /// Build a collator for a BCP-47 locale tag such as `"pl"` or `"de-AT"`.
    pub fn new(locale: &str) -> Result<Self> {
        let locale: Locale = locale
            .parse()
            .map_err(|e| anyhow!("Invalid locale '{}': {:?}", locale, e))?;
        let collator = Collator::try_new(&(&locale).into(), CollatorOptions::new())
            .map_err(|e| anyhow!("No collation data for '{}': {:?}", locale, e))?;
        Ok(Self { collator })
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }
}

/// Search term, tag selection, and sort order for a derived view.
#[derive(Debug, Clone, Default)]
pub struct ContactQuery {
    pub search: String,
    pub tags: Vec<String>,
    pub sort: SortOption,
}

impl ContactQuery {
    pub fn matches(&self, contact: &Contact) -> bool {
        self.matches_search(contact) && self.matches_tags(contact)
    }

    fn matches_search(&self, contact: &Contact) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        contact.first_name.to_lowercase().contains(&needle)
            || contact.last_name.to_lowercase().contains(&needle)
            || contact.email.to_lowercase().contains(&needle)
    }

    fn matches_tags(&self, contact: &Contact) -> bool {
        self.tags.is_empty() || contact.has_any_tag(&self.tags)
    }

    /// Filter then sort `contacts`, returning an owned view.
    pub fn apply(&self, contacts: &[Contact], collator: &NameCollator) -> Vec<Contact> {
        let mut view: Vec<Contact> = contacts
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect();
        sort_contacts(&mut view, self.sort, collator);
        view
    }
}

pub fn sort_contacts(contacts: &mut [Contact], sort: SortOption, collator: &NameCollator) {
    match sort {
        SortOption::NameAsc => {
            contacts.sort_by(|a, b| collator.compare(&a.full_name(), &b.full_name()))
        }
        SortOption::NameDesc => {
            contacts.sort_by(|a, b| collator.compare(&b.full_name(), &a.full_name()))
        }
        SortOption::CreatedDesc => contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::CreatedAsc => contacts.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }
}

/// Every distinct tag in the collection, sorted.
pub fn all_tags(contacts: &[Contact]) -> Vec<String> {
    contacts
        .iter()
        .flat_map(|c| c.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// CLI entry point for `gravibook list`.
pub fn run_list(
    config: &Config,
    store: &ContactStore,
    query: &ContactQuery,
    as_json: bool,
) -> Result<()> {
    let collator = NameCollator::new(&config.display.locale)?;
    let view = query.apply(store.contacts(), &collator);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    if view.is_empty() {
        println!("No contacts.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<28}  {:<30}  {}",
        "ID", "NAME", "EMAIL", "TAGS"
    );
    for contact in &view {
        println!(
            "{:<36}  {:<28}  {:<30}  {}",
            contact.id,
            contact.full_name(),
            contact.email,
            contact.tags.join(", ")
        );
    }
    eprintln!("{} of {} contacts", view.len(), store.len());
    Ok(())
}

/// CLI entry point for `gravibook tags`.
pub fn run_tags(store: &ContactStore) -> Result<()> {
    let tags = all_tags(store.contacts());
    if tags.is_empty() {
        println!("No tags.");
    }
    for tag in tags {
        println!("{}", tag);
    }
    Ok(())
}
