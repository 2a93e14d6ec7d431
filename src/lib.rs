//! # Gravibook
//!
//! A local-first personal address book: create, edit, delete, search,
//! filter, sort, export, and import contacts, with avatars resolved from
//! public avatar services.
//!
//! ## Architecture
//!
//! ```text
//!  ┌──────────┐  mutate   ┌──────────────┐  write-through  ┌──────────┐
//!  │   CLI    │──────────▶│ ContactStore │────────────────▶│ Storage  │
//!  │gravibook │           └──────┬───────┘                 │ (JSON)   │
//!  └────┬─────┘                  │ snapshot                └──────────┘
//!       │          ┌─────────────┼──────────────┐
//!       │          ▼             ▼              ▼
//!       │    ┌──────────┐  ┌──────────┐  ┌──────────────┐
//!       └───▶│  Query   │  │  Export  │  │    Import    │
//!            │ (views)  │  │ CSV/JSON │  │  CSV/JSON    │
//!            └──────────┘  └──────────┘  └──────────────┘
//! ```
//!
//! Avatar URLs come from [`avatar::AvatarResolver`], an ordered fallback
//! chain that always ends in a fixed placeholder.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | The `Contact` record |
//! | [`storage`] | Single-key durable storage backends |
//! | [`store`] | The owned contact collection |
//! | [`query`] | Search, tag filter, sort, and tag listing |
//! | [`avatar`] | Avatar fallback chain |
//! | [`export`] | CSV and JSON export |
//! | [`import`] | CSV and JSON import |
//! | [`commands`] | Single-contact CLI commands |

pub mod avatar;
pub mod commands;
pub mod config;
pub mod export;
pub mod import;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;
