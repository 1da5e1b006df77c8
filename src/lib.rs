//! # Ebb
//!
//! Retires old social-media activity. A local SQLite table is the record of
//! what has been posted and liked; the remote API is used to delete posts and
//! unlike items once they are older than the retention window.
//!
//! ## Architecture
//!
//! ```text
//! Archive ─┐
//!          ├→ Store → Retire
//! Sync   ──┘      └→ Repair
//! ```
//!
//! - [`archive`]: one-time seeding of an empty store from an account export
//! - [`sync`]: incremental pull of new posts and likes
//! - [`retire`]: deletes posts and unlikes likes past the retention window
//! - [`repair`]: like/unlike round trip for likes the API no longer shows
//!
//! ## Quick Start
//!
//! ```bash
//! # Seed the database from an extracted archive
//! ebb import ~/archive/data
//!
//! # Sync and retire (what a scheduled job runs)
//! ebb run
//!
//! # Clear stale likes on popular accounts
//! ebb repair -n 100000
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct holds the store, the API client
/// and the loaded configuration for one run.
pub mod app;

/// Remote API seam.
///
/// - [`SocialApi`](api::SocialApi): async trait for the remote calls
/// - [`HttpApi`](api::HttpApi): reqwest-based implementation
pub mod api;

/// Account export loading and the archive importer.
pub mod archive;

/// Command-line interface using clap.
pub mod cli;

/// Configuration file (`~/.config/ebb/config.toml`).
pub mod config;

/// Foreground periodic runner (`ebb daemon`).
pub mod daemon;

/// Core domain models.
///
/// - [`ActivityItem`](domain::ActivityItem): a tracked post or like
/// - [`RetentionWindow`](domain::RetentionWindow): age at which items retire
pub mod domain;

/// Inconsistency repairer for likes the API does not show.
pub mod repair;

/// Retirement sweeps over posts and likes.
pub mod retire;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Incremental feed synchronizer.
pub mod sync;
