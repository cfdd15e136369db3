use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./famledger.db?mode=rwc";
const USAGE: &str = "usage: migration [up|down|fresh|status] [steps]";

enum Command {
    Up(Option<u32>),
    Down(Option<u32>),
    Fresh,
    Status,
}

fn parse_command(mut args: impl Iterator<Item = String>) -> Option<Command> {
    let name = args.next().unwrap_or_else(|| "up".to_string());
    let steps = match args.next() {
        Some(raw) => Some(raw.parse().ok()?),
        None => None,
    };
    match (name.as_str(), steps) {
        ("up", steps) => Some(Command::Up(steps)),
        ("down", steps) => Some(Command::Down(steps)),
        ("fresh", None) => Some(Command::Fresh),
        ("status", None) => Some(Command::Status),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(command) = parse_command(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let db_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&db_url).await?;

    match command {
        Command::Up(steps) => migration::Migrator::up(&db, steps).await?,
        Command::Down(steps) => migration::Migrator::down(&db, steps).await?,
        Command::Fresh => migration::Migrator::fresh(&db).await?,
        Command::Status => migration::Migrator::status(&db).await?,
    }

    Ok(())
}
