//! Parse CSV or JSON text into contacts and append them to the store.
//!
//! CSV parsing degrades per row: a row without first name, last name, and
//! email is dropped, as is a row with fewer than [`REQUIRED_CSV_COLUMNS`]
//! fields. Columns are positional; the header names are not checked.
//! Every CSV row gets a fresh id, so identity does not survive a CSV round
//! trip.
//!
//! JSON parsing is all-or-nothing: the text must decode as an array of
//! complete contact records and every record must pass validation, or the
//! whole batch is rejected.
//!
//! Import is append-only. Nothing is deduplicated or overwritten, and a
//! failed import leaves the store untouched.

use chrono::{DateTime, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{monotonic_now, new_contact_id, Contact};
use crate::store::ContactStore;

/// `firstName, lastName, email, phone, tags`; `createdAt` may be missing.
pub const REQUIRED_CSV_COLUMNS: usize = 5;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported file format '{0}'; use .csv or .json files")]
    UnsupportedFormat(String),

    #[error("no valid contacts found in the CSV file")]
    NoValidContacts,

    #[error("malformed JSON contact list: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("invalid contact at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    /// Pick the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "json" => Ok(ImportFormat::Json),
            _ => Err(ImportError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImportFormat::Csv => "CSV",
            ImportFormat::Json => "JSON",
        }
    }
}

/// Each line after the header is tokenised on its own, so a broken row
/// (an unclosed quote, say) drops only itself.
pub fn parse_csv(text: &str) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for (line, raw) in text.trim().lines().enumerate().skip(1) {
        if raw.trim().is_empty() {
            continue;
        }

        let record = match split_csv_line(raw) {
            Ok(Some(r)) => r,
            Ok(None) => continue,
            Err(e) => {
                tracing::debug!(row = line, error = %e, "skipping unreadable CSV row");
                continue;
            }
        };

        if record.len() < REQUIRED_CSV_COLUMNS {
            tracing::debug!(row = line, fields = record.len(), "skipping short CSV row");
            continue;
        }

        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let created_at = parse_created_at(record.get(5).unwrap_or(""));

        let contact = Contact {
            id: new_contact_id(),
            first_name: field(0),
            last_name: field(1),
            email: field(2),
            phone: field(3),
            tags: field(4)
                .split(';')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
            avatar: None,
            created_at,
            updated_at: monotonic_now(&[created_at]),
        };

        if contact.first_name.is_empty() || contact.last_name.is_empty() || contact.email.is_empty()
        {
            tracing::debug!(row = line, "skipping CSV row without name or email");
            continue;
        }
        contacts.push(contact);
    }
    contacts
}

fn split_csv_line(line: &str) -> Result<Option<csv::StringRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    if reader.read_record(&mut record)? {
        Ok(Some(record))
    } else {
        Ok(None)
    }
}

/// RFC 3339 or a bare `YYYY-MM-DD`; anything else means "now".
fn parse_created_at(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Utc::now();
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    if let Some(ts) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return ts.and_utc();
    }
    tracing::debug!(value = raw, "unparseable createdAt, using now");
    Utc::now()
}

pub fn parse_json(text: &str) -> Result<Vec<Contact>, ImportError> {
    let contacts: Vec<Contact> = serde_json::from_str(text)?;

    for (index, contact) in contacts.iter().enumerate() {
        if contact.id.trim().is_empty() {
            return Err(ImportError::InvalidRecord {
                index,
                reason: "empty id".to_string(),
            });
        }
        if contact.updated_at < contact.created_at {
            return Err(ImportError::InvalidRecord {
                index,
                reason: "updatedAt is earlier than createdAt".to_string(),
            });
        }
    }
    Ok(contacts)
}

/// Parse `text` in `format` into a batch ready for [`ContactStore::import_many`].
pub fn parse(format: ImportFormat, text: &str) -> Result<Vec<Contact>, ImportError> {
    match format {
        ImportFormat::Csv => {
            let contacts = parse_csv(text);
            if contacts.is_empty() {
                return Err(ImportError::NoValidContacts);
            }
            Ok(contacts)
        }
        ImportFormat::Json => parse_json(text),
    }
}

/// Read, parse, and append a file. Returns the number of contacts added.
pub fn import_file(store: &mut ContactStore, path: &Path) -> Result<usize, ImportError> {
    let format = ImportFormat::from_path(path)?;
    import_file_as(store, path, format)
}

/// Like [`import_file`], with the format already chosen by the caller.
pub fn import_file_as(
    store: &mut ContactStore,
    path: &Path,
    format: ImportFormat,
) -> Result<usize, ImportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let batch = parse(format, &text)?;
    let count = store.import_many(batch);
    tracing::info!(count, format = format.label(), "contacts imported");
    Ok(count)
}

/// CLI entry point for `gravibook import`.
pub fn run_import(store: &mut ContactStore, path: &Path) -> anyhow::Result<()> {
    let format = ImportFormat::from_path(path)?;
    let count = import_file_as(store, path, format)?;
    println!("Imported {} contacts from {} file.", count, format.label());
    Ok(())
}
