//! CLI module - Command-line interface for Trackarr
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

use crate::domain::EpisodeKey;

/// Trackarr - Anime Episode Tracker
/// Watches a torrent index for the episodes you still need
#[derive(Parser)]
#[command(name = "trackarr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run as background daemon with web API and scheduler
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Scan for needed episodes in the foreground (Ctrl+C stops)
    #[command(alias = "check", alias = "c")]
    Scan {
        /// Only scan the show at this index
        #[arg(long)]
        show: Option<usize>,
    },

    /// List tracked shows
    #[command(alias = "ls", alias = "l")]
    List,

    /// Track a new show
    #[command(alias = "a")]
    Add {
        /// Show name as it appears in release titles (repeat for aliases)
        #[arg(long = "name", required = true)]
        names: Vec<String>,
        /// First episode to track
        #[arg(long, default_value = "S1E1")]
        from: EpisodeKey,
        /// Last episode to track
        #[arg(long, default_value = "S1E12")]
        to: EpisodeKey,
        /// Resolution that must appear in the release
        #[arg(long, default_value = crate::constants::DEFAULT_QUALITY)]
        quality: String,
    },

    /// Change a tracked show; omitted options keep their value
    #[command(alias = "e")]
    Edit {
        /// Show index from `list`
        index: usize,
        /// Replaces every alias when given
        #[arg(long = "name")]
        names: Vec<String>,
        #[arg(long)]
        from: Option<EpisodeKey>,
        #[arg(long)]
        to: Option<EpisodeKey>,
        #[arg(long)]
        quality: Option<String>,
    },

    /// Stop tracking a show
    #[command(alias = "rm", alias = "r")]
    Remove {
        /// Show index from `list`
        index: usize,
    },

    /// Forget every downloaded episode of a show
    Reset {
        /// Show index from `list`
        index: usize,
    },

    /// List episodes of a show with their status
    Episodes {
        /// Show index from `list`
        index: usize,
    },

    /// Manage the known-shows catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List catalog entries
    #[command(alias = "ls")]
    List,
    /// Add or replace an entry
    Set {
        /// Canonical show name
        name: String,
        /// Episodes per season: `12` or `12,13,24`
        lengths: String,
    },
    /// Rename an entry
    Rename { from: String, to: String },
    /// Remove an entry
    #[command(alias = "rm")]
    Remove { name: String },
}

pub use commands::*;
