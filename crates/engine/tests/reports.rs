use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement, Value};

use engine::{
    AccountType, BudgetKind, DateRange, Engine, EngineError, MoneyCents,
    reports::SeriesStatus,
};
use migration::MigratorTrait;
use uuid::Uuid;

const GROUP: &str = "a0000000-0000-4000-8000-000000000001";
const CASH: &str = "c0000000-0000-4000-8000-000000000001";
const SAVINGS: &str = "c0000000-0000-4000-8000-000000000002";
const BOB_CASH: &str = "c0000000-0000-4000-8000-000000000003";
const SALARY: &str = "e0000000-0000-4000-8000-000000000001";
const LUNCH: &str = "e0000000-0000-4000-8000-000000000002";
const TO_SAVINGS: &str = "e0000000-0000-4000-8000-000000000003";
const BOB_LUNCH: &str = "e0000000-0000-4000-8000-000000000004";
const JANUARY: &str = "d0000000-0000-4000-8000-000000000001";
const FEBRUARY: &str = "d0000000-0000-4000-8000-000000000002";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn group_id() -> Uuid {
    Uuid::parse_str(GROUP).unwrap()
}

async fn exec(db: &DatabaseConnection, sql: &str, values: Vec<Value>) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(backend, sql, values))
        .await
        .unwrap();
}

async fn insert_account(db: &DatabaseConnection, id: &str, kind: &str, balance: i64, owners: &[&str]) {
    exec(
        db,
        "INSERT INTO accounts (id, name, account_type, balance_minor, group_id) VALUES (?, ?, ?, ?, ?)",
        vec![id.into(), kind.into(), kind.into(), balance.into(), GROUP.into()],
    )
    .await;
    for owner in owners {
        exec(
            db,
            "INSERT INTO account_users (account_id, user_id) VALUES (?, ?)",
            vec![id.into(), (*owner).into()],
        )
        .await;
    }
}

#[allow(clippy::too_many_arguments)]
async fn insert_transaction(
    db: &DatabaseConnection,
    id: &str,
    kind: &str,
    amount: i64,
    category: &str,
    date: &str,
    account: &str,
    to_account: Option<&str>,
    user: &str,
    series: Option<&str>,
) {
    exec(
        db,
        "INSERT INTO transactions (id, description, amount_minor, kind, category, date, account_id, to_account_id, user_id, group_id, recurring_series_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        vec![
            id.into(),
            "".into(),
            amount.into(),
            kind.into(),
            category.into(),
            date.into(),
            account.into(),
            to_account.map(str::to_string).into(),
            user.into(),
            GROUP.into(),
            series.map(str::to_string).into(),
        ],
    )
    .await;
}

/// Alice owns cash (500.00) and savings (1000.00); Bob owns cash (80.00).
/// January: salary 200.00 and lunch 50.00. February: 30.00 moved to savings
/// and a lunch for Bob. Alice tracks January (closed) and February (open).
async fn household(today: NaiveDate) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    exec(
        &db,
        "INSERT INTO groups (id, name) VALUES (?, ?)",
        vec![GROUP.into(), "home".into()],
    )
    .await;
    insert_account(&db, CASH, "cash", 500_00, &["alice"]).await;
    insert_account(&db, SAVINGS, "Savings", 1_000_00, &["alice"]).await;
    insert_account(&db, BOB_CASH, "cash", 80_00, &["bob"]).await;

    for (id, key, label) in [
        ("f0000000-0000-4000-8000-000000000001", "salary", "Salary"),
        ("f0000000-0000-4000-8000-000000000002", "food", "Food"),
    ] {
        exec(
            &db,
            "INSERT INTO categories (id, key, label, group_id) VALUES (?, ?, ?, ?)",
            vec![id.into(), key.into(), label.into(), GROUP.into()],
        )
        .await;
    }

    insert_transaction(&db, SALARY, "income", 200_00, "salary", "2024-01-15", CASH, None, "alice", None).await;
    insert_transaction(&db, LUNCH, "expense", 50_00, "Food", "2024-01-20T12:30:00Z", CASH, None, "alice", None).await;
    insert_transaction(&db, TO_SAVINGS, "transfer", 30_00, "", "2024-02-02", CASH, Some(SAVINGS), "alice", None).await;
    insert_transaction(&db, BOB_LUNCH, "expense", 20_00, "food", "2024-02-03", BOB_CASH, None, "bob", None).await;
    // Unreadable date: skipped by every report.
    insert_transaction(
        &db,
        "e0000000-0000-4000-8000-0000000000ff",
        "income",
        9_999_00,
        "salary",
        "someday",
        CASH,
        None,
        "alice",
        None,
    )
    .await;

    for (id, start, end) in [
        (JANUARY, "2024-01-01", Some("2024-01-31")),
        (FEBRUARY, "2024-02-01", None),
    ] {
        exec(
            &db,
            "INSERT INTO budget_periods (id, start_date, end_date, user_id) VALUES (?, ?, ?, ?)",
            vec![id.into(), start.into(), end.map(str::to_string).into(), "alice".into()],
        )
        .await;
    }

    let engine = Engine::builder()
        .database(db.clone())
        .today(today)
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn group_overview_nets_out_internal_transfers() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let overview = engine.overview(group_id(), None, None).await.unwrap();
    assert_eq!(overview.total_earned, MoneyCents::new(200_00));
    assert_eq!(overview.total_spent, MoneyCents::new(70_00));
    assert_eq!(overview.total_transferred, MoneyCents::new(30_00));
    assert_eq!(overview.total_balance, MoneyCents::new(130_00));
}

#[tokio::test]
async fn user_overview_respects_date_range() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let alice = engine.overview(group_id(), Some("alice"), None).await.unwrap();
    assert_eq!(alice.total_earned, MoneyCents::new(200_00));
    assert_eq!(alice.total_spent, MoneyCents::new(50_00));

    let february = DateRange::new(Some(ymd(2024, 2, 1)), Some(ymd(2024, 2, 29))).unwrap();
    let alice = engine
        .overview(group_id(), Some("alice"), Some(february))
        .await
        .unwrap();
    assert_eq!(alice.total_earned, MoneyCents::ZERO);
    assert_eq!(alice.total_spent, MoneyCents::ZERO);
    assert_eq!(alice.total_transferred, MoneyCents::new(30_00));
}

#[tokio::test]
async fn flows_default_to_every_account_owner() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let summaries = engine.user_flows(group_id(), &[], None).await.unwrap();
    let users: Vec<_> = summaries.iter().map(|s| s.user_id.as_str()).collect();
    assert_eq!(users, vec!["alice", "bob"]);

    let alice = &summaries[0];
    assert_eq!(alice.buckets[0].account_type, AccountType::Savings);
    assert_eq!(alice.buckets[0].earned, MoneyCents::new(30_00));
    assert_eq!(alice.buckets[0].balance, MoneyCents::new(1_000_00));
    let cash = &alice.buckets[1];
    assert_eq!(cash.account_type, AccountType::Cash);
    assert_eq!(cash.earned, MoneyCents::new(200_00));
    assert_eq!(cash.spent, MoneyCents::new(80_00));
    assert_eq!(cash.net, MoneyCents::new(120_00));
    assert_eq!(alice.total_balance, MoneyCents::new(1_500_00));
}

#[tokio::test]
async fn periods_roll_balances_back_newest_first() {
    let today = ymd(2024, 2, 10);
    let (engine, _db) = household(today).await;

    let periods = engine.period_report("alice", None).await.unwrap();
    assert_eq!(periods.len(), 2);

    let february = &periods[0];
    assert!(february.is_open);
    assert_eq!(february.label, "2024-02-01 - now");
    assert_eq!(february.end_date, today);
    assert_eq!(february.end_balance, MoneyCents::new(1_500_00));
    assert_eq!(february.start_balance, MoneyCents::new(1_500_00));
    assert_eq!(
        february.metrics_by_account_type[&AccountType::Cash].start_balance,
        MoneyCents::new(530_00)
    );
    assert_eq!(february.total_earned, MoneyCents::ZERO);

    let january = &periods[1];
    assert_eq!(january.label, "2024-01-01 - 2024-01-31");
    let cash = january.metrics_by_account_type[&AccountType::Cash];
    assert_eq!(cash.end_balance, MoneyCents::new(530_00));
    assert_eq!(cash.start_balance, MoneyCents::new(380_00));
    assert_eq!(january.total_earned, MoneyCents::new(200_00));
    assert_eq!(january.total_spent, MoneyCents::new(50_00));
}

#[tokio::test]
async fn period_range_keeps_overlapping_periods() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let range = DateRange::new(Some(ymd(2024, 1, 31)), Some(ymd(2024, 1, 31))).unwrap();
    let periods = engine.period_report("alice", Some(range)).await.unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].id, Uuid::parse_str(JANUARY).unwrap());

    // February's flows are still rolled back before January is reported.
    let full = engine.period_report("alice", None).await.unwrap();
    assert_eq!(periods[0], full[1]);
    let cash = periods[0].metrics_by_account_type[&AccountType::Cash];
    assert_eq!(cash.end_balance, MoneyCents::new(530_00));
    assert_eq!(cash.start_balance, MoneyCents::new(380_00));
    let savings = periods[0].metrics_by_account_type[&AccountType::Savings];
    assert_eq!(savings.end_balance, MoneyCents::new(970_00));
}

#[tokio::test]
async fn period_range_keeps_the_open_period() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let range = DateRange::new(Some(ymd(2024, 3, 1)), None).unwrap();
    let periods = engine.period_report("alice", Some(range)).await.unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!(periods[0].id, Uuid::parse_str(FEBRUARY).unwrap());
}

#[tokio::test]
async fn malformed_period_is_skipped() {
    let (engine, db) = household(ymd(2024, 2, 10)).await;
    exec(
        &db,
        "INSERT INTO budget_periods (id, start_date, end_date, user_id) VALUES (?, ?, ?, ?)",
        vec![
            "d0000000-0000-4000-8000-0000000000ff".into(),
            "garbage".into(),
            Some("2023-12-31".to_string()).into(),
            "alice".into(),
        ],
    )
    .await;

    let periods = engine.period_report("alice", None).await.unwrap();
    let ids: Vec<_> = periods.iter().map(|p| p.id).collect();
    assert_eq!(
        ids,
        vec![
            Uuid::parse_str(FEBRUARY).unwrap(),
            Uuid::parse_str(JANUARY).unwrap(),
        ]
    );
    assert_eq!(
        periods[1].metrics_by_account_type[&AccountType::Cash].start_balance,
        MoneyCents::new(380_00)
    );
}

#[tokio::test]
async fn transfer_from_partner_account_reaches_every_view() {
    let (engine, db) = household(ymd(2024, 2, 10)).await;
    // Bob's account is not one of Alice's, so her period report never loads it.
    insert_transaction(
        &db,
        "e0000000-0000-4000-8000-000000000030",
        "transfer",
        40_00,
        "",
        "2024-02-04",
        BOB_CASH,
        Some(SAVINGS),
        "alice",
        None,
    )
    .await;

    let overview = engine.overview(group_id(), Some("alice"), None).await.unwrap();
    assert_eq!(overview.total_earned, MoneyCents::new(240_00));
    let flows = engine
        .user_flows(group_id(), &["alice".to_string()], None)
        .await
        .unwrap();
    assert_eq!(flows[0].total_earned, MoneyCents::new(200_00 + 30_00 + 40_00));

    let periods = engine.period_report("alice", None).await.unwrap();
    let savings = periods[0].metrics_by_account_type[&AccountType::Savings];
    assert_eq!(savings.earned, MoneyCents::new(70_00));
    assert_eq!(savings.start_balance, MoneyCents::new(930_00));
}

#[tokio::test]
async fn category_report_resolves_keys_case_insensitively() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let stats = engine.category_report(group_id(), None).await.unwrap();
    assert_eq!(stats.income.len(), 1);
    assert_eq!(stats.income[0].label, "Salary");
    assert_eq!(stats.income[0].total, MoneyCents::new(200_00));

    assert_eq!(stats.expense.len(), 1);
    let food = &stats.expense[0];
    assert_eq!(food.key, "food");
    assert_eq!(food.total, MoneyCents::new(70_00));
    assert_eq!(food.count, 2);
    assert!(!food.unresolved);
}

#[tokio::test]
async fn recurring_report_schedules_and_reconciles() {
    let (engine, db) = household(ymd(2024, 2, 10)).await;
    let rent = "b0000000-0000-4000-8000-000000000001";
    let gym = "b0000000-0000-4000-8000-000000000002";
    for (id, description, amount, frequency, due_day, active, executions) in [
        (rent, "Rent", 800_00_i64, "monthly", 5_i32, true, 1_i32),
        (gym, "Gym", 30_00, "weekly", 1, false, 0),
    ] {
        exec(
            &db,
            "INSERT INTO recurring_series (id, description, amount_minor, kind, account_id, frequency, due_day, start_date, is_active, total_executions, failed_executions, group_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                id.into(),
                description.into(),
                amount.into(),
                "expense".into(),
                CASH.into(),
                frequency.into(),
                due_day.into(),
                "2024-01-01".into(),
                active.into(),
                executions.into(),
                0_i32.into(),
                GROUP.into(),
            ],
        )
        .await;
    }
    let paid = "e0000000-0000-4000-8000-000000000010";
    insert_transaction(&db, paid, "expense", 800_00, "rent", "2024-01-05", CASH, None, "alice", Some(rent)).await;

    let report = engine.recurring_report(group_id()).await.unwrap();

    let order: Vec<_> = report.schedules.iter().map(|s| s.description.as_str()).collect();
    assert_eq!(order, vec!["Gym", "Rent"]);
    assert_eq!(report.schedules[0].status, SeriesStatus::Paused);
    assert_eq!(report.schedules[0].next_due_date, ymd(2024, 2, 12));
    let rent_schedule = &report.schedules[1];
    assert_eq!(rent_schedule.next_due_date, ymd(2024, 3, 5));
    assert_eq!(rent_schedule.days_until_due, 24);
    assert!(!rent_schedule.is_due);

    assert_eq!(report.totals.monthly_expense, MoneyCents::new(800_00));
    assert_eq!(report.totals.monthly_net, MoneyCents::new(-800_00));
    assert_eq!(report.totals.active_count, 1);
    assert_eq!(report.totals.paused_count, 1);

    let history = report
        .histories
        .iter()
        .find(|h| h.series_id == Uuid::parse_str(rent).unwrap())
        .unwrap();
    assert_eq!(history.executed, vec![Uuid::parse_str(paid).unwrap()]);
    assert_eq!(history.last_executed_on, Some(ymd(2024, 1, 5)));
    assert!(history.counters_consistent);
}

async fn insert_budgets(db: &DatabaseConnection) {
    for (id, description, amount, kind, key) in [
        ("00000000-0000-4000-8000-0000000000b1", "Groceries", 100_00_i64, "monthly", "food"),
        ("00000000-0000-4000-8000-0000000000b2", "Travel", 1_200_00, "annually", "travel"),
    ] {
        exec(
            db,
            "INSERT INTO budgets (id, description, amount_minor, kind, user_id, group_id) VALUES (?, ?, ?, ?, ?, ?)",
            vec![id.into(), description.into(), amount.into(), kind.into(), "alice".into(), GROUP.into()],
        )
        .await;
        exec(
            db,
            "INSERT INTO budget_categories (budget_id, category_key) VALUES (?, ?)",
            vec![id.into(), key.into()],
        )
        .await;
    }
    insert_transaction(
        db,
        "e0000000-0000-4000-8000-000000000020",
        "expense",
        75_00,
        "food",
        "2024-02-05",
        CASH,
        None,
        "alice",
        None,
    )
    .await;
}

#[tokio::test]
async fn budgets_track_the_open_period() {
    let (engine, db) = household(ymd(2024, 2, 10)).await;
    insert_budgets(&db).await;

    let progress = engine.budget_report(group_id(), "alice").await.unwrap();
    assert_eq!(progress.len(), 2);

    let groceries = &progress[0];
    assert_eq!(groceries.description, "Groceries");
    assert_eq!(groceries.window.start, ymd(2024, 2, 1));
    assert_eq!(groceries.window.end, ymd(2024, 2, 10));
    // January's lunch falls outside the window.
    assert_eq!(groceries.spent, MoneyCents::new(75_00));
    assert_eq!(groceries.remaining, MoneyCents::new(25_00));
    assert_eq!(groceries.used_basis_points, 7_500);
    assert!(!groceries.over_budget);

    let travel = &progress[1];
    assert_eq!(travel.kind, BudgetKind::Annually);
    assert_eq!(travel.limit, MoneyCents::new(100_00));
    assert_eq!(travel.spent, MoneyCents::ZERO);
}

#[tokio::test]
async fn dashboard_matches_individual_reports() {
    let (engine, db) = household(ymd(2024, 2, 10)).await;
    insert_budgets(&db).await;

    let dashboard = engine.dashboard(group_id(), "alice").await.unwrap();
    assert_eq!(dashboard.generated_on, ymd(2024, 2, 10));
    assert_eq!(
        dashboard.overview,
        engine.overview(group_id(), Some("alice"), None).await.unwrap()
    );
    assert_eq!(
        dashboard.periods,
        engine.period_report("alice", None).await.unwrap()
    );
    assert_eq!(
        dashboard.budgets,
        engine.budget_report(group_id(), "alice").await.unwrap()
    );
    assert_eq!(dashboard.flows.as_ref().map(|f| f.user_id.as_str()), Some("alice"));

    // Bob's lunch stays out of Alice's categories.
    let food = &dashboard.categories.expense[0];
    assert_eq!(food.total, MoneyCents::new(125_00));
}

#[tokio::test]
async fn blank_user_is_rejected() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let err = engine.period_report("  ", None).await.unwrap_err();
    assert!(matches!(err, EngineError::MissingUser(_)));
    let err = engine.dashboard(group_id(), "").await.unwrap_err();
    assert!(matches!(err, EngineError::MissingUser(_)));
}

#[tokio::test]
async fn unknown_group_yields_empty_reports() {
    let (engine, _db) = household(ymd(2024, 2, 10)).await;

    let other = Uuid::new_v4();
    let overview = engine.overview(other, None, None).await.unwrap();
    assert_eq!(overview.total_balance, MoneyCents::ZERO);
    assert!(engine.user_flows(other, &[], None).await.unwrap().is_empty());
    assert!(engine.recurring_report(other).await.unwrap().schedules.is_empty());
}
