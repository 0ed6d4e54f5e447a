use crate::commands::Out;
use crate::model::{Category, Month, ProjectId};
use crate::persist::KeyValueStore;
use crate::session::Tracker;
use crate::view::{self, MonthSummary};
use crate::Result;

/// Lists the months that can be chosen with `--month`: the current month, then every month that
/// has expenses, most recent first.
pub fn months<S>(tracker: &Tracker<S>, project: Option<&ProjectId>) -> Result<Out<Vec<Month>>>
where
    S: KeyValueStore,
{
    let project = tracker.project(project)?;
    let expenses = project.expenses();
    let months = view::months_of(&expenses, Month::current());
    let lines: Vec<String> = months.iter().map(Month::to_string).collect();
    Ok(Out::new(lines.join("\n"), months))
}

/// Totals the selected month, overall and per category.
pub fn summary<S>(
    tracker: &Tracker<S>,
    project: Option<&ProjectId>,
    currency: &str,
) -> Result<Out<MonthSummary>>
where
    S: KeyValueStore,
{
    let project = tracker.project(project)?;
    let expenses = project.expenses();
    let summary = view::aggregate(&expenses, tracker.session().month(), &Category::ALL);

    let mut lines = vec![format!("'{}', {}", project.name(), summary.month)];
    for (category, amount) in &summary.by_category {
        lines.push(format!(
            "  {:<13}  {:>10} {currency}",
            category.as_str(),
            amount.to_string()
        ));
    }
    lines.push(format!(
        "  {:<13}  {:>10} {currency}",
        "Total",
        summary.total.to_string()
    ));
    Ok(Out::new(lines.join("\n"), summary))
}
