//! Initial schema: the read model the reporting engine queries.
//!
//! - `groups`: households sharing accounts and categories
//! - `accounts` and `account_users`: money containers and their owners
//! - `categories`: the category registry
//! - `recurring_series` and `recurring_series_users`: recurring templates
//! - `transactions`: financial events, optionally generated by a series
//! - `budgets` and `budget_categories`: spending envelopes
//! - `budget_periods`: per-user tracking windows
//!
//! Dates are stored as text: rows come from several writers that do not agree
//! on a format. Transaction account references carry no foreign key because a
//! transfer may point at an account outside the group.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    AccountType,
    BalanceMinor,
    GroupId,
}

#[derive(Iden)]
enum AccountUsers {
    Table,
    AccountId,
    UserId,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Key,
    Label,
    Icon,
    Color,
    GroupId,
}

#[derive(Iden)]
enum RecurringSeries {
    Table,
    Id,
    Description,
    AmountMinor,
    Kind,
    AccountId,
    Frequency,
    DueDay,
    StartDate,
    EndDate,
    IsActive,
    TotalExecutions,
    FailedExecutions,
    GroupId,
}

#[derive(Iden)]
enum RecurringSeriesUsers {
    Table,
    SeriesId,
    UserId,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Description,
    AmountMinor,
    Kind,
    Category,
    Date,
    AccountId,
    ToAccountId,
    UserId,
    GroupId,
    RecurringSeriesId,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    Description,
    AmountMinor,
    Kind,
    UserId,
    GroupId,
}

#[derive(Iden)]
enum BudgetCategories {
    Table,
    BudgetId,
    CategoryKey,
}

#[derive(Iden)]
enum BudgetPeriods {
    Table,
    Id,
    StartDate,
    EndDate,
    UserId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Accounts
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::AccountType)
                            .string()
                            .not_null()
                            .default("other"),
                    )
                    .col(
                        ColumnDef::new(Accounts::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::GroupId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-group_id")
                            .from(Accounts::Table, Accounts::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-group_id")
                    .table(Accounts::Table)
                    .col(Accounts::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccountUsers::AccountId).string().not_null())
                    .col(ColumnDef::new(AccountUsers::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(AccountUsers::AccountId)
                            .col(AccountUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_users-account_id")
                            .from(AccountUsers::Table, AccountUsers::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-account_users-user_id")
                    .table(AccountUsers::Table)
                    .col(AccountUsers::UserId)
                    .to_owned(),
            )
            .await?;

        // Categories
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Key).string().not_null())
                    .col(ColumnDef::new(Categories::Label).string().not_null())
                    .col(ColumnDef::new(Categories::Icon).string())
                    .col(ColumnDef::new(Categories::Color).string())
                    .col(ColumnDef::new(Categories::GroupId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-group_id")
                            .from(Categories::Table, Categories::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-group_id-key-unique")
                    .table(Categories::Table)
                    .col(Categories::GroupId)
                    .col(Categories::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Recurring series
        manager
            .create_table(
                Table::create()
                    .table(RecurringSeries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringSeries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecurringSeries::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringSeries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecurringSeries::Kind).string().not_null())
                    .col(ColumnDef::new(RecurringSeries::AccountId).string().not_null())
                    .col(ColumnDef::new(RecurringSeries::Frequency).string().not_null())
                    .col(ColumnDef::new(RecurringSeries::DueDay).integer().not_null())
                    .col(ColumnDef::new(RecurringSeries::StartDate).string().not_null())
                    .col(ColumnDef::new(RecurringSeries::EndDate).string())
                    .col(
                        ColumnDef::new(RecurringSeries::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RecurringSeries::TotalExecutions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RecurringSeries::FailedExecutions)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RecurringSeries::GroupId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurring_series-group_id")
                            .from(RecurringSeries::Table, RecurringSeries::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecurringSeriesUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringSeriesUsers::SeriesId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringSeriesUsers::UserId)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(RecurringSeriesUsers::SeriesId)
                            .col(RecurringSeriesUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurring_series_users-series_id")
                            .from(RecurringSeriesUsers::Table, RecurringSeriesUsers::SeriesId)
                            .to(RecurringSeries::Table, RecurringSeries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Transactions
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Description)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Category)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Transactions::Date).string().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(ColumnDef::new(Transactions::ToAccountId).string())
                    .col(ColumnDef::new(Transactions::UserId).string())
                    .col(ColumnDef::new(Transactions::GroupId).string().not_null())
                    .col(ColumnDef::new(Transactions::RecurringSeriesId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-group_id")
                            .from(Transactions::Table, Transactions::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-recurring_series_id")
                            .from(Transactions::Table, Transactions::RecurringSeriesId)
                            .to(RecurringSeries::Table, RecurringSeries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-group_id")
                    .table(Transactions::Table)
                    .col(Transactions::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-recurring_series_id")
                    .table(Transactions::Table)
                    .col(Transactions::RecurringSeriesId)
                    .to_owned(),
            )
            .await?;

        // Budgets
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::Description).string().not_null())
                    .col(ColumnDef::new(Budgets::AmountMinor).big_integer().not_null())
                    .col(
                        ColumnDef::new(Budgets::Kind)
                            .string()
                            .not_null()
                            .default("monthly"),
                    )
                    .col(ColumnDef::new(Budgets::UserId).string().not_null())
                    .col(ColumnDef::new(Budgets::GroupId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-group_id")
                            .from(Budgets::Table, Budgets::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BudgetCategories::BudgetId).string().not_null())
                    .col(
                        ColumnDef::new(BudgetCategories::CategoryKey)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BudgetCategories::BudgetId)
                            .col(BudgetCategories::CategoryKey),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_categories-budget_id")
                            .from(BudgetCategories::Table, BudgetCategories::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BudgetPeriods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetPeriods::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetPeriods::StartDate).string().not_null())
                    .col(ColumnDef::new(BudgetPeriods::EndDate).string())
                    .col(ColumnDef::new(BudgetPeriods::UserId).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_periods-user_id")
                    .table(BudgetPeriods::Table)
                    .col(BudgetPeriods::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order (foreign keys).
        manager
            .drop_table(Table::drop().table(BudgetPeriods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringSeriesUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringSeries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        Ok(())
    }
}
