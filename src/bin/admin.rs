//! CLI administration tool for linkstats.
//!
//! Manages API tokens, prints owner reports and runs maintenance tasks
//! directly against the database.
//!
//! # Usage
//!
//! ```bash
//! # Create a token for owner 42
//! cargo run --bin admin -- token create --owner 42 --name "Dashboard"
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token by name or id
//! cargo run --bin admin -- token revoke "Dashboard"
//!
//! # Print the last 30 days of analytics for owner 42
//! cargo run --bin admin -- stats 42 --days 30
//!
//! # Purge events older than 365 days
//! cargo run --bin admin -- events purge --days 365
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` components: PostgreSQL connection
//! - `TOKEN_SIGNING_SECRET`: required by `token create`

use linkstats::application::services::analytics_service::{
    DEFAULT_RETENTION_DAYS, DEFAULT_WINDOW_DAYS,
};
use linkstats::application::services::auth_service::hash_token;
use linkstats::application::services::{AnalyticsService, StatsSummary};
use linkstats::config::Config;
use linkstats::domain::repositories::TokenRepository;
use linkstats::infrastructure::persistence::{
    PgEventRepository, PgLinkRepository, PgTokenRepository,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about = "CLI tool for managing linkstats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show the analytics report of an owner
    Stats {
        /// Owner id
        owner: i64,

        /// Lookback window in days (1..=365)
        #[arg(short, long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: i64,
    },

    /// Event log maintenance
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token for an owner
    Create {
        /// Owner the token authenticates as
        #[arg(short, long)]
        owner: i64,

        /// Token name (e.g., "Dashboard", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum EventsAction {
    /// Delete events older than the retention horizon
    Purge {
        /// Retention horizon in days
        #[arg(short, long, default_value_t = DEFAULT_RETENTION_DAYS)]
        days: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let pool = Arc::new(pool);

    match cli.command {
        Commands::Token { action } => handle_token_action(action, pool).await?,
        Commands::Stats { owner, days } => handle_stats(pool, owner, days).await?,
        Commands::Events { action } => handle_events_action(action, pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn analytics_service(pool: Arc<PgPool>) -> AnalyticsService<PgEventRepository, PgLinkRepository> {
    AnalyticsService::new(
        Arc::new(PgEventRepository::new(pool.clone())),
        Arc::new(PgLinkRepository::new(pool)),
    )
}

async fn handle_token_action(action: TokenAction, pool: Arc<PgPool>) -> Result<()> {
    let repo = PgTokenRepository::new(pool);

    match action {
        TokenAction::Create { owner, name, yes } => create_token(&repo, owner, name, yes).await,
        TokenAction::List => list_tokens(&repo).await,
        TokenAction::Revoke { name_or_id } => revoke_token(&repo, &name_or_id).await,
    }
}

/// Creates a token for `owner_id`.
///
/// Only the HMAC-SHA256 hash keyed by `TOKEN_SIGNING_SECRET` is stored, so the
/// raw value is shown exactly once.
async fn create_token(
    repo: &PgTokenRepository,
    owner_id: i64,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    if owner_id <= 0 {
        anyhow::bail!("Owner id must be positive, got {owner_id}");
    }

    let secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to create tokens")?;

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Dashboard")
            .interact_text()?,
    };

    let token_value = generate_token();

    println!("{}", "Token details:".bright_white().bold());
    println!("  Owner: {}", owner_id.to_string().cyan());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  Save this token now! It cannot be shown again.".red().bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(&secret, &token_value);
    repo.create_token(owner_id, &token_name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!("{}", "✅ Token created".green().bold());
    println!();
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/analytics/stats",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: &PgTokenRepository) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        return Ok(());
    }

    println!(
        "  {:<5} {:<8} {:<28} {:<17} {:<17} {}",
        "ID".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(88).bright_black());

    for token in &tokens {
        let status = if token.is_active() {
            "ACTIVE".green()
        } else {
            "REVOKED".red()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<5} {:<8} {:<28} {:<17} {:<17} {}",
            token.id.to_string().bright_black(),
            token.owner_id.to_string(),
            token.name.cyan(),
            token.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!("  Total: {}", tokens.len().to_string().bright_white().bold());

    Ok(())
}

/// Revokes a token looked up by numeric id or exact name.
async fn revoke_token(repo: &PgTokenRepository, name_or_id: &str) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if !token.is_active() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  Owner: {}", token.owner_id);
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!("{}", "✅ Token revoked".green().bold());

    Ok(())
}

async fn handle_stats(pool: Arc<PgPool>, owner_id: i64, days: i64) -> Result<()> {
    let service = analytics_service(pool);
    let stats = service
        .get_stats(owner_id, days)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build report: {}", e))?;

    print_report(owner_id, days, &stats);
    Ok(())
}

fn print_report(owner_id: i64, days: i64, stats: &StatsSummary) {
    println!(
        "{}",
        format!("📊 Owner {owner_id}, last {days} days").bright_blue().bold()
    );
    println!();
    println!("  Links:           {} ({} active)", stats.total_links, stats.active_links);
    println!("  Total clicks:    {}", stats.total_clicks.to_string().bright_green().bold());
    println!("  Profile views:   {}", stats.profile_views.to_string().bright_green().bold());
    println!("  Conversion rate: {}%", stats.conversion_rate);
    println!("  Monthly growth:  {}%", stats.monthly_growth);
    println!("  Top link:        {}", stats.top_link.cyan());

    if !stats.top_links.is_empty() {
        println!();
        println!("{}", "  Top links".bright_white().bold());
        for link in &stats.top_links {
            println!("    {:>6}  {} ({})", link.clicks, link.title.cyan(), link.url.bright_black());
        }
    }

    if !stats.daily_stats.is_empty() {
        println!();
        println!("{}", "  Daily events".bright_white().bold());
        for day in &stats.daily_stats {
            let breakdown = day
                .events
                .iter()
                .map(|e| format!("{}={}", e.kind, e.count))
                .collect::<Vec<_>>()
                .join(" ");
            println!("    {}  {:>6}  {}", day.date, day.total_events, breakdown.bright_black());
        }
    }

    if !stats.geo_stats.is_empty() {
        println!();
        println!("{}", "  Countries".bright_white().bold());
        for geo in &stats.geo_stats {
            println!(
                "    {:<20} {:>6} visits  {:>6} unique",
                geo.country, geo.visits, geo.unique_visitors
            );
        }
    }

    if !stats.device_stats.is_empty() {
        println!();
        println!("{}", "  Devices".bright_white().bold());
        for (name, count) in &stats.device_stats.device_types {
            println!("    {:<20} {:>6}", name, count);
        }
    }
    println!();
}

async fn handle_events_action(action: EventsAction, pool: Arc<PgPool>) -> Result<()> {
    match action {
        EventsAction::Purge { days, yes } => {
            println!("{}", "🧹 Purge expired events".bright_blue().bold());
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete all events older than {days} days?"))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let purged = analytics_service(pool)
                .purge_expired(days)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to purge events: {}", e))?;

            println!(
                "{} {}",
                "✅ Purged events:".green().bold(),
                purged.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let events: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events")
                .fetch_one(pool)
                .await?;
            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;
            let tokens: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL")
                    .fetch_one(pool)
                    .await?;

            println!("  PostgreSQL:    {}", version.bright_white());
            println!("  Events:        {}", events.to_string().bright_green());
            println!("  Links:         {}", links.to_string().bright_green());
            println!("  Active tokens: {}", tokens.to_string().bright_green());
            println!();
        }
    }

    Ok(())
}

/// Generates a 48-character alphanumeric token.
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
