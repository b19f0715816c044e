//! Command-line arguments.

use std::path::PathBuf;

use bunny_core::models::{EventDetails, EventStatus};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bunny", about = "Bunny Babies back-office CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List event categories
    Categories,
    /// Log in with email and password and print the bearer token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Upload cover and gallery media, then create the event
    CreateEvent(CreateEventArgs),
    /// Check files against the upload rules without contacting the server
    Validate {
        /// Files to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct CreateEventArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Category id
    #[arg(long)]
    pub category: String,
    /// First day, YYYY-MM-DD
    #[arg(long)]
    pub start_date: NaiveDate,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<NaiveDate>,
    /// Time of day, free text
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub location: String,
    /// draft or published
    #[arg(long, default_value = "draft")]
    pub status: EventStatus,
    /// Feature the event on the public site
    #[arg(long)]
    pub featured: bool,
    /// Cover image
    #[arg(long)]
    pub cover: Option<PathBuf>,
    /// Gallery file as PATH or PATH::caption (repeatable)
    #[arg(long)]
    pub media: Vec<String>,
    /// Featured gallery file as PATH or PATH::caption (repeatable)
    #[arg(long)]
    pub featured_media: Vec<String>,
    /// Do not log per-file upload progress
    #[arg(long, short)]
    pub quiet: bool,
}

impl CreateEventArgs {
    /// Form fields with title and location trimmed.
    pub fn details(&self) -> EventDetails {
        EventDetails {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            category_id: self.category.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            time: self.time.clone(),
            location: self.location.trim().to_string(),
            status: self.status,
            featured: self.featured,
        }
    }
}
