//! # Gravibook CLI (`gravibook`)
//!
//! ## Usage
//!
//! ```bash
//! gravibook --config ./config/gravibook.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `gravibook init` | Write an example config file |
//! | `gravibook add` | Create a contact |
//! | `gravibook edit <id>` | Change fields of a contact |
//! | `gravibook rm <id>` | Delete a contact |
//! | `gravibook get <id>` | Show one contact |
//! | `gravibook list` | Search, filter by tag, and sort |
//! | `gravibook tags` | List every tag in use |
//! | `gravibook export <csv\|json>` | Export all contacts |
//! | `gravibook import <file>` | Append contacts from a `.csv` or `.json` file |
//! | `gravibook avatar <email>` | Resolve an avatar URL |
//!
//! ## Examples
//!
//! ```bash
//! gravibook add --first Anna --last Nowak --email anna@example.com --tag work
//! gravibook list --search ann --tag work --tag vip --sort created-desc
//! gravibook export csv
//! gravibook import ./gravibook-kontakty-2024-03-01.json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gravibook::commands::{self, ContactPatch};
use gravibook::config;
use gravibook::export::{self, ExportFormat};
use gravibook::import;
use gravibook::models::ContactInput;
use gravibook::query::{self, ContactQuery, SortOption};

/// Gravibook: a local-first personal address book.
#[derive(Parser)]
#[command(name = "gravibook", version, about)]
struct Cli {
    /// Path to configuration file (TOML). A missing file means defaults.
    #[arg(long, global = true, default_value = "./config/gravibook.toml")]
    config: PathBuf,

    /// Keep contacts in memory only; nothing is read from or written to disk.
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a commented example config to `--config` if none exists.
    Init,

    /// Create a contact and resolve its avatar.
    Add {
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Tag to attach; repeat for several.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Change fields of an existing contact.
    ///
    /// Fields not given keep their value. Changing the email re-resolves
    /// the avatar.
    Edit {
        id: String,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Replace the tag list; repeat for several.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Remove all tags.
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },

    /// Delete a contact.
    Rm { id: String },

    /// Show a contact.
    Get { id: String },

    /// List contacts.
    ///
    /// `--search` matches first name, last name, or email (case-insensitive).
    /// Repeated `--tag` keeps contacts having any of the tags.
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Defaults to `[display].sort` from the config.
        #[arg(long, value_enum)]
        sort: Option<SortOption>,
        /// Print the view as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List every distinct tag.
    Tags,

    /// Export all contacts.
    Export {
        #[arg(value_enum)]
        format: ExportFormat,
        /// Output file, or `-` for stdout. Defaults to
        /// `<product>-kontakty-<date>.<ext>` in the current directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Append contacts from a `.csv` or `.json` file.
    Import { file: PathBuf },

    /// Resolve the avatar URL for an email address.
    Avatar { email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init()
        .ok();

    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        if config::write_example_config(&cli.config)? {
            println!("Wrote {}", cli.config.display());
        } else {
            println!("{} already exists.", cli.config.display());
        }
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    let mut store = commands::open_store(&cfg, cli.ephemeral)?;

    match cli.command {
        Commands::Init => {
            // Handled above (before config loading)
            unreachable!()
        }
        Commands::Add {
            first,
            last,
            email,
            phone,
            tags,
        } => {
            let input = ContactInput {
                first_name: first,
                last_name: last,
                email,
                phone,
                tags,
            };
            commands::run_add(&mut store, input).await?;
        }
        Commands::Edit {
            id,
            first,
            last,
            email,
            phone,
            tags,
            clear_tags,
        } => {
            let tags = if clear_tags {
                Some(Vec::new())
            } else if tags.is_empty() {
                None
            } else {
                Some(tags)
            };
            let patch = ContactPatch {
                first_name: first,
                last_name: last,
                email,
                phone,
                tags,
            };
            commands::run_edit(&mut store, &id, patch).await?;
        }
        Commands::Rm { id } => {
            commands::run_remove(&mut store, &id)?;
        }
        Commands::Get { id } => {
            commands::run_get(&store, &id)?;
        }
        Commands::List {
            search,
            tags,
            sort,
            json,
        } => {
            let query = ContactQuery {
                search,
                tags,
                sort: sort.unwrap_or(cfg.display.sort),
            };
            query::run_list(&cfg, &store, &query, json)?;
        }
        Commands::Tags => {
            query::run_tags(&store)?;
        }
        Commands::Export { format, output } => {
            export::run_export(&cfg, &store, format, output.as_deref())?;
        }
        Commands::Import { file } => {
            import::run_import(&mut store, &file)?;
        }
        Commands::Avatar { email } => {
            commands::run_avatar(store.avatars(), &email).await?;
        }
    }

    Ok(())
}
