//! Derived views of a project's expenses: the months on offer and the per-month summary.
//!
//! Everything here is a pure function of the expense list and is recomputed on every call.

use crate::model::{Amount, Category, Entry, Expense, Month};
use serde::Serialize;
use std::collections::BTreeSet;

/// The months that can be selected for `expenses`, most recent first.
///
/// `current` is always offered first, even if it has no expenses, and is never listed twice.
pub fn months_of<'a>(expenses: impl IntoIterator<Item = &'a Expense>, current: Month) -> Vec<Month> {
    let distinct: BTreeSet<Month> = expenses.into_iter().map(Expense::month).collect();
    std::iter::once(current)
        .chain(distinct.into_iter().rev().filter(|m| *m != current))
        .collect()
}

/// The expenses of one month with their total and per-category totals.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: Month,
    pub total: Amount,
    /// One entry per requested category, in the requested order, zero when there is no spending.
    pub by_category: Vec<(Category, Amount)>,
}

impl MonthSummary {
    pub fn category_total(&self, category: &Category) -> Option<Amount> {
        self.by_category
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, amount)| *amount)
    }
}

/// Sums the expenses that fall in `month`.
///
/// Expenses whose category is not one of `categories` count toward `total` but do not appear in
/// `by_category`.
pub fn aggregate<'a>(
    expenses: impl IntoIterator<Item = &'a Expense>,
    month: Month,
    categories: &[Category],
) -> MonthSummary {
    let mut total = Amount::ZERO;
    let mut by_category: Vec<(Category, Amount)> =
        categories.iter().map(|c| (c.clone(), Amount::ZERO)).collect();

    for expense in expenses.into_iter().filter(|e| e.month() == month) {
        total += expense.amount;
        if let Some((_, sum)) = by_category.iter_mut().find(|(c, _)| *c == expense.category) {
            *sum += expense.amount;
        }
    }

    MonthSummary {
        month,
        total,
        by_category,
    }
}

/// The entries of `month` in storage order. The position of an entry in this list is what a user
/// sees; its id is what an edit or delete acts on.
pub fn entries_in(entries: &[Entry], month: Month) -> Vec<&Entry> {
    entries
        .iter()
        .filter(|e| e.expense().month() == month)
        .collect()
}
