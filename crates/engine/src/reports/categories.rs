//! Category statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Category, MoneyCents, Transaction, TransactionKind};

/// Key and label used for transactions without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Outcome of resolving a transaction's raw category string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryResolution<'a> {
    /// The raw string is a category id.
    ById(&'a Category),
    /// The raw string matches a category key, ignoring case.
    ByKey(&'a Category),
    /// Unknown category: the raw string serves as id, key and label.
    Raw(&'a str),
}

impl CategoryResolution<'_> {
    pub fn category(&self) -> Option<&Category> {
        match self {
            Self::ById(category) | Self::ByKey(category) => Some(*category),
            Self::Raw(_) => None,
        }
    }

    /// Stable identity used to group transactions.
    pub fn id(&self) -> String {
        match self {
            Self::ById(category) | Self::ByKey(category) => category.id.to_string(),
            Self::Raw(raw) => (*raw).to_string(),
        }
    }

    /// Lowercase key, matched against budget categories.
    pub fn key(&self) -> String {
        match self {
            Self::ById(category) | Self::ByKey(category) => category.key.clone(),
            Self::Raw(raw) => raw.to_lowercase(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::ById(category) | Self::ByKey(category) => category.label.clone(),
            Self::Raw(raw) if *raw == UNCATEGORIZED => "Uncategorized".to_string(),
            Self::Raw(raw) => (*raw).to_string(),
        }
    }
}

/// Lookup over the known categories.
pub struct CategoryIndex<'a> {
    by_id: HashMap<String, &'a Category>,
    by_key: HashMap<String, &'a Category>,
}

impl<'a> CategoryIndex<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        Self {
            by_id: categories
                .iter()
                .map(|category| (category.id.to_string(), category))
                .collect(),
            by_key: categories
                .iter()
                .map(|category| (category.key.to_lowercase(), category))
                .collect(),
        }
    }

    /// Id match first, then key match ignoring case, then the raw string.
    ///
    /// A blank raw string resolves to [`UNCATEGORIZED`].
    pub fn resolve<'r>(&self, raw: &'r str) -> CategoryResolution<'r>
    where
        'a: 'r,
    {
        let raw = raw.trim();
        if raw.is_empty() {
            return CategoryResolution::Raw(UNCATEGORIZED);
        }
        if let Some(category) = self.by_id.get(raw).copied() {
            return CategoryResolution::ById(category);
        }
        if let Some(category) = self.by_key.get(&raw.to_lowercase()).copied() {
            return CategoryResolution::ByKey(category);
        }
        CategoryResolution::Raw(raw)
    }
}

pub fn resolve_category<'a>(raw: &'a str, categories: &'a [Category]) -> CategoryResolution<'a> {
    CategoryIndex::new(categories).resolve(raw)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub category_id: String,
    pub key: String,
    pub label: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub total: MoneyCents,
    pub count: usize,
    /// No known category matched the raw string.
    pub unresolved: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Highest total first.
    pub income: Vec<CategoryStat>,
    /// Highest total first.
    pub expense: Vec<CategoryStat>,
}

/// Income and expense totals per resolved category. Transfers are skipped.
pub fn calculate_category_stats(
    transactions: &[Transaction],
    categories: &[Category],
) -> CategoryStats {
    let index = CategoryIndex::new(categories);
    let mut income: HashMap<String, CategoryStat> = HashMap::new();
    let mut expense: HashMap<String, CategoryStat> = HashMap::new();

    for transaction in transactions {
        let bucket = match transaction.kind {
            TransactionKind::Income => &mut income,
            TransactionKind::Expense => &mut expense,
            TransactionKind::Transfer => continue,
        };
        let resolution = index.resolve(&transaction.category);
        let stat = bucket.entry(resolution.id()).or_insert_with(|| {
            let category = resolution.category();
            CategoryStat {
                category_id: resolution.id(),
                key: resolution.key(),
                label: resolution.label(),
                icon: category.and_then(|c| c.icon.clone()),
                color: category.and_then(|c| c.color.clone()),
                total: MoneyCents::ZERO,
                count: 0,
                unresolved: category.is_none(),
            }
        });
        stat.total += transaction.amount;
        stat.count += 1;
    }

    CategoryStats {
        income: sorted(income),
        expense: sorted(expense),
    }
}

fn sorted(stats: HashMap<String, CategoryStat>) -> Vec<CategoryStat> {
    let mut stats: Vec<CategoryStat> = stats.into_values().collect();
    stats.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    stats
}
