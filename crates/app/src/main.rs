use std::io::Write;

use clap::Parser;
use engine::{DateRange, Engine};
use migration::{Migrator, MigratorTrait};

use crate::{
    cli::{Cli, Command, OutputFormat, Range},
    export::View,
    settings::Settings,
};

mod cli;
mod error;
mod export;
mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "famledger={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let engine = match open_engine(&settings.connection_url()).await {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to initialize database: {err}");
            return Err(err.into());
        }
    };
    if let Err(err) = report(&engine, cli.command, settings.report.format).await {
        tracing::error!("report failed: {err}");
        return Err(err.into());
    }
    Ok(())
}

async fn open_engine(url: &str) -> error::Result<Engine> {
    tracing::info!("opening {} database", backend(url));
    let db = sea_orm::Database::connect(url).await?;
    Migrator::up(&db, None).await?;
    Ok(Engine::builder().database(db).build().await?)
}

/// Scheme of a connection url; the rest may carry credentials.
fn backend(url: &str) -> &str {
    url.split_once(':').map_or("unknown", |(scheme, _)| scheme)
}

async fn report(engine: &Engine, command: Command, format: OutputFormat) -> error::Result<()> {
    let rendered = run(engine, command).await?.render(format)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

fn range(range: Range) -> error::Result<Option<DateRange>> {
    if range.from.is_none() && range.to.is_none() {
        return Ok(None);
    }
    Ok(Some(DateRange::new(range.from, range.to)?))
}

async fn run(engine: &Engine, command: Command) -> error::Result<View> {
    let view = match command {
        Command::Overview {
            group,
            user,
            range: r,
        } => View::Overview(engine.overview(group, user.as_deref(), range(r)?).await?),
        Command::Flows {
            group,
            users,
            range: r,
        } => View::Flows(engine.user_flows(group, &users, range(r)?).await?),
        Command::Periods { user, range: r } => {
            View::Periods(engine.period_report(&user, range(r)?).await?)
        }
        Command::Categories { group, range: r } => {
            View::Categories(engine.category_report(group, range(r)?).await?)
        }
        Command::Recurring { group } => View::Recurring(engine.recurring_report(group).await?),
        Command::Budgets { group, user } => {
            View::Budgets(engine.budget_report(group, &user).await?)
        }
        Command::Dashboard { group, user } => {
            View::Dashboard(Box::new(engine.dashboard(group, &user).await?))
        }
    };
    Ok(view)
}
