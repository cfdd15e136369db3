use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod fetch;
mod reports;

pub use reports::{Dashboard, RecurringReport};

/// Which records a fetch returns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Everything recorded for a household group.
    Group(Uuid),
    /// Records attributed to, or owned by, one user.
    User(String),
}

impl Scope {
    pub fn user(user_id: &str) -> ResultEngine<Self> {
        Ok(Self::User(require_user(user_id)?))
    }
}

/// Inclusive date range. Either bound may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> ResultEngine<Self> {
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            return Err(EngineError::InvalidDate(format!(
                "invalid range: {from} is after {to}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Whether `[start, end]` shares at least one day with the range. An open
    /// `end` never finishes.
    pub fn overlaps(&self, start: NaiveDate, end: Option<NaiveDate>) -> bool {
        self.to.is_none_or(|to| start <= to)
            && self
                .from
                .is_none_or(|from| end.is_none_or(|end| end >= from))
    }
}

/// Read-side entry point: fetches records and runs the report calculators.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    today: Option<NaiveDate>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The date reports are computed for: the pinned date, or today in UTC.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

fn require_user(user_id: &str) -> ResultEngine<String> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingUser(
            "user id must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    today: Option<NaiveDate>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pin the report date instead of reading the clock.
    pub fn today(mut self, today: NaiveDate) -> EngineBuilder {
        self.today = Some(today);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            today: self.today,
        })
    }
}
