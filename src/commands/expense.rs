use crate::args::ExpenseFields;
use crate::commands::{resolve_position, Out, CANCELLED};
use crate::confirm::Confirm;
use crate::model::{Amount, Category, Entry, ExpenseForm, ExpenseId, ProjectId};
use crate::persist::KeyValueStore;
use crate::session::Tracker;
use crate::store::Action;
use crate::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::trace;

/// One line of `expense list`. `n` is the number used by `expense edit` and `expense delete`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ExpenseRow {
    pub n: usize,
    pub amount: Amount,
    pub category: Category,
    pub description: String,
    pub date: NaiveDate,
}

impl ExpenseRow {
    fn new(n: usize, entry: &Entry) -> Self {
        let expense = entry.expense();
        Self {
            n,
            amount: expense.amount,
            category: expense.category.clone(),
            description: expense.description.clone(),
            date: expense.date,
        }
    }

    fn line(&self, currency: &str) -> String {
        format!(
            "{:>3}  {}  {:>10} {currency}  {:<13}  {}",
            self.n,
            self.date,
            self.amount.to_string(),
            self.category.as_str(),
            self.description
        )
    }
}

fn fill(form: &mut ExpenseForm, fields: &ExpenseFields) {
    if let Some(amount) = &fields.amount {
        form.amount = amount.clone();
    }
    if let Some(category) = &fields.category {
        form.category = category.clone();
    }
    if let Some(description) = &fields.description {
        form.description = description.clone();
    }
    if let Some(date) = &fields.date {
        form.date = date.clone();
    }
}

/// Finds the row for `id` in the selected month, if the expense falls in it.
fn find_row<S>(tracker: &Tracker<S>, project: Option<&ProjectId>, id: ExpenseId) -> Option<ExpenseRow>
where
    S: KeyValueStore,
{
    let entries = tracker.month_entries(project).ok()?;
    entries
        .iter()
        .position(|e| e.id() == id)
        .map(|ix| ExpenseRow::new(ix + 1, entries[ix]))
}

/// Adds an expense. Fields that are not given start from the defaults of a new expense: the
/// first category and today's date.
pub async fn expense_add<S>(
    tracker: &mut Tracker<S>,
    project: Option<&ProjectId>,
    fields: &ExpenseFields,
    currency: &str,
) -> Result<Out<()>>
where
    S: KeyValueStore,
{
    let mut form = ExpenseForm::default();
    fill(&mut form, fields);
    trace!("Adding {form:?}");
    tracker.cancel_edit();
    tracker.save_expense(project, &form).await?;
    let project = tracker.project(project)?;
    Ok(format!(
        "Added {} {currency} to {} in '{}'",
        form.parse()?.amount,
        form.category,
        project.name()
    )
    .into())
}

/// Changes the `n`th expense of the selected month. Its position in the project is kept.
pub async fn expense_edit<S>(
    tracker: &mut Tracker<S>,
    project: Option<&ProjectId>,
    n: usize,
    fields: &ExpenseFields,
    currency: &str,
) -> Result<Out<Option<ExpenseRow>>>
where
    S: KeyValueStore,
{
    let id = resolve_position(tracker, project, n)?;
    let mut form = tracker.start_edit(id)?;
    fill(&mut form, fields);
    trace!("Editing {id} to {form:?}");
    let saved = tracker.save_expense(project, &form).await;
    tracker.cancel_edit();
    if !saved? {
        return Ok(format!("Expense #{n} is unchanged").into());
    }

    // The new date may move the expense out of the selected month.
    match find_row(tracker, project, id) {
        Some(row) => Ok(Out::new(
            format!("Updated expense\n{}", row.line(currency)),
            Some(row),
        )),
        None => Ok(Out::new(
            format!("Updated expense #{n}, it is no longer in {}", tracker.session().month()),
            None,
        )),
    }
}

/// Deletes the `n`th expense of the selected month after asking for confirmation.
pub async fn expense_delete<S>(
    tracker: &mut Tracker<S>,
    project: Option<&ProjectId>,
    n: usize,
    confirm: &dyn Confirm,
    currency: &str,
) -> Result<Out<ExpenseRow>>
where
    S: KeyValueStore,
{
    let id = resolve_position(tracker, project, n)?;
    let project_id = tracker.project(project)?.id().clone();
    let row = find_row(tracker, project, id);
    let prompt = match &row {
        Some(row) => format!("Delete expense\n{}\n?", row.line(currency)),
        None => format!("Delete expense #{n}?"),
    };
    if !confirm.confirm(&prompt).await {
        return Ok(CANCELLED.into());
    }
    tracker
        .dispatch(Action::DeleteExpense {
            project: project_id,
            expense: id,
        })
        .await?;
    let message = format!("Deleted expense #{n} from {}", tracker.session().month());
    Ok(match row {
        Some(row) => Out::new(message, row),
        None => message.into(),
    })
}

/// Lists the expenses of the selected month in the order they were added.
pub fn expense_list<S>(
    tracker: &Tracker<S>,
    project: Option<&ProjectId>,
    currency: &str,
) -> Result<Out<Vec<ExpenseRow>>>
where
    S: KeyValueStore,
{
    let name = tracker.project(project)?.name().to_string();
    let month = tracker.session().month();
    let rows: Vec<ExpenseRow> = tracker
        .month_entries(project)?
        .into_iter()
        .enumerate()
        .map(|(ix, entry)| ExpenseRow::new(ix + 1, entry))
        .collect();
    if rows.is_empty() {
        return Ok(Out::new(format!("'{name}' has no expenses in {month}"), rows));
    }
    let mut lines = vec![format!("'{name}', {month}")];
    lines.extend(rows.iter().map(|r| r.line(currency)));
    Ok(Out::new(lines.join("\n"), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AssumeYes;
    use crate::error::error_type;
    use crate::test::TestEnv;
    use crate::ErrorType;
    use std::str::FromStr;

    fn fields(amount: Option<&str>, description: Option<&str>, date: Option<&str>) -> ExpenseFields {
        ExpenseFields {
            amount: amount.map(str::to_string),
            category: None,
            description: description.map(str::to_string),
            date: date.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_list_march() {
        let env = TestEnv::with_trip().await;
        let tracker = env.tracker().await;
        let out = expense_list(&tracker, None, "CHF").unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].n, 1);
        assert_eq!(rows[0].description, "lunch");
        assert!(out.message().contains("10.00 CHF"));
    }

    #[tokio::test]
    async fn test_add_persists() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let out = expense_add(
            &mut tracker,
            None,
            &fields(Some("4.5"), Some("coffee"), Some("2024-03-20")),
            "CHF",
        )
        .await
        .unwrap();
        assert_eq!(out.message(), "Added 4.50 CHF to Food in 'Trip'");

        let tracker = env.tracker().await;
        let rows = expense_list(&tracker, None, "CHF").unwrap();
        let rows = rows.structure().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].amount, Amount::from_str("4.5").unwrap());
    }

    #[tokio::test]
    async fn test_add_invalid_amount() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        for amount in [None, Some("ten"), Some("NaN")] {
            let e = expense_add(&mut tracker, None, &fields(amount, None, None), "CHF")
                .await
                .unwrap_err();
            assert_eq!(error_type(&e), Some(ErrorType::InvalidAmount), "{amount:?}");
        }
        assert_eq!(env.tracker().await.project(None).unwrap().entries().len(), 2);
    }

    #[tokio::test]
    async fn test_edit_in_filtered_view_targets_the_right_expense() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        tracker.select_month(crate::model::Month::new(2024, 4).unwrap());

        // The taxi is #1 in April but second in storage.
        let out = expense_edit(
            &mut tracker,
            None,
            1,
            &fields(Some("25"), Some("train"), None),
            "CHF",
        )
        .await
        .unwrap();
        let row = out.structure().unwrap().clone().unwrap();
        assert_eq!(row.description, "train");

        let project = env.tracker().await;
        let project = project.project(None).unwrap();
        let entries = project.entries();
        assert_eq!(entries[0].expense().description, "lunch");
        assert_eq!(entries[0].expense().amount, Amount::from_str("10").unwrap());
        assert_eq!(entries[1].expense().description, "train");
        assert_eq!(entries[1].expense().amount, Amount::from_str("25").unwrap());
    }

    #[tokio::test]
    async fn test_edit_moving_out_of_month() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let out = expense_edit(
            &mut tracker,
            None,
            1,
            &fields(None, None, Some("2024-05-01")),
            "CHF",
        )
        .await
        .unwrap();
        assert!(out.structure().unwrap().is_none());
        assert!(out.message().contains("no longer in 2024-03"));
        assert_eq!(tracker.session().cursor(), None);
    }

    #[tokio::test]
    async fn test_edit_bad_number() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        for n in [0, 2] {
            let e = expense_edit(&mut tracker, None, n, &ExpenseFields::default(), "CHF")
                .await
                .unwrap_err();
            assert_eq!(error_type(&e), Some(ErrorType::NotFound));
        }
    }

    #[tokio::test]
    async fn test_delete() {
        let env = TestEnv::with_trip().await;
        let mut tracker = env.tracker().await;
        let out = expense_delete(&mut tracker, None, 1, &AssumeYes, "CHF")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().description, "lunch");

        let tracker = env.tracker().await;
        let entries = tracker.project(None).unwrap().expenses();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].description, "taxi");
    }
}
