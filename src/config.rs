// src/config.rs
//! Command line and environment configuration.

use crate::api::CollectionQuery;
use crate::constants::{COLLECTION_RESULT_LIMIT, DEFAULT_WARM_TARGETS};
use crate::content::ServiceOptions;
use crate::error::AppError;
use crate::types::{ApiKey, DatabaseId, ValidationError};
use clap::{Args, Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the content API
    Serve(ServeArgs),

    /// Run one cache-warming pass against Notion and report the outcome
    Warm {
        /// How many of the newest posts to warm
        #[arg(long, default_value_t = DEFAULT_WARM_TARGETS)]
        limit: usize,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Load one post through a running content API, showing progress
    Load {
        /// Notion page URL or ID
        page: String,

        /// Root URL of the content API
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        base_url: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Posts to warm in the background at startup (0 disables warming)
    #[arg(long, default_value_t = DEFAULT_WARM_TARGETS)]
    pub warm: usize,

    #[command(flatten)]
    pub query: QueryArgs,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        let ip: IpAddr = self.host.parse().map_err(|e| {
            AppError::InvalidConfiguration(format!("Invalid host '{}': {}", self.host, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Which database rows count as published posts.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Select property holding the publication status
    #[arg(long, default_value = "Status")]
    pub status_property: String,

    /// Status value that marks a post as published
    #[arg(long, default_value = "Blogs")]
    pub status_value: String,
}

impl QueryArgs {
    pub fn into_query(self) -> Result<CollectionQuery, ValidationError> {
        if self.status_property.trim().is_empty() {
            return Err(ValidationError::EmptyField("status_property"));
        }
        if self.status_value.trim().is_empty() {
            return Err(ValidationError::EmptyField("status_value"));
        }
        Ok(CollectionQuery {
            status_property: self.status_property,
            status_value: self.status_value,
            page_size: COLLECTION_RESULT_LIMIT,
        })
    }
}

/// Everything needed to build a [`ContentService`](crate::content::ContentService)
/// against the live Notion API.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: ApiKey,
    pub database_id: DatabaseId,
    pub options: ServiceOptions,
}

impl ServerConfig {
    /// Reads `NOTION_API_KEY` and `NOTION_DATABASE_ID` from the environment.
    pub fn resolve(query: QueryArgs) -> Result<Self, AppError> {
        let api_key = require_env("NOTION_API_KEY")?;
        let database_id = require_env("NOTION_DATABASE_ID")?;
        Self::from_values(&api_key, &database_id, query.into_query()?)
    }

    pub fn from_values(
        api_key: &str,
        database_id: &str,
        query: CollectionQuery,
    ) -> Result<Self, AppError> {
        Ok(Self {
            api_key: ApiKey::new(api_key)?,
            database_id: DatabaseId::parse(database_id)?,
            options: ServiceOptions {
                query,
                ..ServiceOptions::default()
            },
        })
    }
}

fn require_env(name: &str) -> Result<String, AppError> {
    std::env::var(name)
        .map_err(|_| AppError::MissingConfiguration(format!("{} environment variable not set", name)))
}
