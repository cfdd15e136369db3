//! Aggregation and reporting engine for household finances.
//!
//! Records are fetched through [`Engine`] and decoded leniently; the pure
//! calculators in [`reports`] turn them into view models.

pub use accounts::{Account, AccountType};
pub use budgets::{Budget, BudgetKind, BudgetPeriod};
pub use categories::Category;
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{Dashboard, DateRange, Engine, EngineBuilder, RecurringReport, Scope};
pub use recurring_series::{Frequency, RecurringSeries};
pub use transactions::{Transaction, TransactionKind};

pub mod dates;
pub mod reports;

mod account_users;
mod accounts;
mod budget_categories;
mod budgets;
mod categories;
mod error;
mod money;
mod ops;
mod recurring_series;
mod recurring_series_users;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
