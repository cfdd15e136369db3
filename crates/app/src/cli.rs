use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "famledger", about = "Household finance reports")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Override the output format.
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,
    /// Connect to this database instead of the configured one.
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct Range {
    /// First day included (YYYY-MM-DD).
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day included (YYYY-MM-DD).
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Earned, spent and transferred totals.
    Overview {
        #[arg(long)]
        group: Uuid,
        /// Restrict to the accounts and transactions of one user.
        #[arg(long)]
        user: Option<String>,
        #[command(flatten)]
        range: Range,
    },
    /// Flows per account type for each user.
    Flows {
        #[arg(long)]
        group: Uuid,
        /// Repeat for several users; defaults to every account owner.
        #[arg(long = "user")]
        users: Vec<String>,
        #[command(flatten)]
        range: Range,
    },
    /// Budget periods with start and end balances.
    Periods {
        #[arg(long)]
        user: String,
        #[command(flatten)]
        range: Range,
    },
    /// Income and expense totals per category.
    Categories {
        #[arg(long)]
        group: Uuid,
        #[command(flatten)]
        range: Range,
    },
    /// Next due dates and monthly projections of recurring series.
    Recurring {
        #[arg(long)]
        group: Uuid,
    },
    /// Spending against budgets in the current window.
    Budgets {
        #[arg(long)]
        group: Uuid,
        #[arg(long)]
        user: String,
    },
    /// Every report for one user.
    Dashboard {
        #[arg(long)]
        group: Uuid,
        #[arg(long)]
        user: String,
    },
}
