//! CLI module - Command-line interface for City Explorer
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// City Explorer - cached location, weather and meetup lookups
#[derive(Parser)]
#[command(name = "city-explorer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file and run database migrations
    #[command(alias = "--init")]
    Init,

    /// Resolve a location and its forecast and meetups through the cache
    #[command(alias = "l")]
    Lookup {
        /// Free-text location query
        #[arg(required = true)]
        query: Vec<String>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how many rows the cache holds
    Stats,
}

pub use commands::*;
