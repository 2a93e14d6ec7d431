//! Export the full contact collection as CSV or JSON.
//!
//! Export always covers every stored contact, not the filtered view.
//!
//! CSV layout (read back by [`crate::import::parse_csv`]):
//!
//! ```text
//! firstName,lastName,email,phone,tags,createdAt
//! "Anna","Nowak","anna@example.com","600 100 200","work;vip","2024-03-01T10:00:00.000Z"
//! ```
//!
//! The header is bare, every data field is quoted, tags are joined with
//! `;`, and there is no trailing newline. JSON is a pretty-printed array of
//! full contact records, ids and timestamps included.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, SecondsFormat};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::models::Contact;
use crate::store::ContactStore;

pub const CSV_HEADER: [&str; 6] = ["firstName", "lastName", "email", "phone", "tags", "createdAt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

pub fn export_csv(contacts: &[Contact]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for contact in contacts {
        let tags = contact.tags.join(";");
        let created = contact
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        writer.write_record([
            contact.first_name.as_str(),
            contact.last_name.as_str(),
            contact.email.as_str(),
            contact.phone.as_str(),
            tags.as_str(),
            created.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    let rows = String::from_utf8(bytes)?;

    let mut out = CSV_HEADER.join(",");
    if !rows.is_empty() {
        out.push('\n');
        out.push_str(rows.strip_suffix('\n').unwrap_or(&rows));
    }
    Ok(out)
}

pub fn export_json(contacts: &[Contact]) -> Result<String> {
    Ok(serde_json::to_string_pretty(contacts)?)
}

pub fn export(contacts: &[Contact], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => export_csv(contacts),
        ExportFormat::Json => export_json(contacts),
    }
}

/// `<product>-kontakty-<YYYY-MM-DD>.<ext>`
pub fn export_filename(product: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}-kontakty-{}.{}",
        product,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// CLI entry point for `gravibook export`.
///
/// `output` of `-` writes to stdout; `None` writes the dated default file
/// name into the current directory.
pub fn run_export(
    config: &Config,
    store: &ContactStore,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    if store.is_empty() {
        eprintln!("No contacts to export.");
        return Ok(());
    }

    let text = export(store.contacts(), format)?;

    let path = match output {
        Some(p) if p == Path::new("-") => {
            println!("{}", text);
            return Ok(());
        }
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(export_filename(
            &config.export.product,
            format,
            chrono::Utc::now().date_naive(),
        )),
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create export directory: {}", parent.display())
            })?;
        }
    }
    std::fs::write(&path, &text)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    eprintln!(
        "Exported {} contacts to {}",
        store.len(),
        path.display()
    );
    Ok(())
}
