//! Summary calculations over a user's expenses.
//!
//! This module turns typed expense rows into the aggregates the presentation
//! layer charts: per-category totals, percentage shares, and a comparison of the
//! latest month against the monthly average. Everything here is pure; the only
//! database-backed aggregate, [`MonthlyTotal`], is produced by
//! [`crate::core::expense::monthly_totals`].

use crate::entities::expense;
use sea_orm::FromQueryResult;
use std::collections::BTreeMap;

/// Total spent in one calendar month.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct MonthlyTotal {
    /// Month as `YYYY-MM`
    pub month: String,
    /// Sum of expense values in that month
    pub total: f64,
}

/// Total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// Category name as stored
    pub category: String,
    /// Sum of expense values in that category
    pub total: f64,
}

/// A category's share of total spending, for pie charts.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    /// Category name as stored
    pub category: String,
    /// Sum of expense values in that category
    pub total: f64,
    /// Share of overall spending, 0-100
    pub percent: f64,
}

/// How the most recent month compares with the monthly average.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetInsight {
    /// Latest month with any spending, `YYYY-MM`
    pub latest_month: String,
    /// Spending in that month
    pub latest_total: f64,
    /// Mean of all monthly totals, latest included
    pub average_monthly: f64,
    /// Whether the latest month is strictly above the average
    pub above_average: bool,
    /// Category with the highest total, if any
    pub top_category: Option<String>,
}

/// Totals expenses per category, largest first. Ties keep alphabetical order.
#[must_use]
pub fn category_breakdown(expenses: &[expense::Model]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.category.as_str()).or_default() += expense.value;
    }

    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    // Stable sort, so equal totals stay in name order
    breakdown.sort_by(|a, b| b.total.total_cmp(&a.total));
    breakdown
}

/// Converts category totals into percentage shares of overall spending.
///
/// When nothing has been spent every share is 0%.
#[must_use]
pub fn expense_distribution(expenses: &[expense::Model]) -> Vec<CategoryShare> {
    let breakdown = category_breakdown(expenses);
    let grand_total: f64 = breakdown.iter().map(|c| c.total).sum();

    breakdown
        .into_iter()
        .map(|CategoryTotal { category, total }| CategoryShare {
            percent: if grand_total > 0.0 {
                total * 100.0 / grand_total
            } else {
                0.0
            },
            category,
            total,
        })
        .collect()
}

/// Compares the latest month against the average of all months.
///
/// `monthly` must be in ascending month order, as returned by the store.
/// Returns `None` when there is no spending at all.
#[must_use]
pub fn budget_insight(
    monthly: &[MonthlyTotal],
    categories: &[CategoryTotal],
) -> Option<BudgetInsight> {
    let latest = monthly.last()?;

    // Cast safety: month counts are tiny
    #[allow(clippy::cast_precision_loss)]
    let average_monthly = monthly.iter().map(|m| m.total).sum::<f64>() / monthly.len() as f64;

    Some(BudgetInsight {
        latest_month: latest.month.clone(),
        latest_total: latest.total,
        average_monthly,
        above_average: latest.total > average_monthly,
        top_category: categories.first().map(|c| c.category.clone()),
    })
}
