//! Types that represent the core data model, such as `Expense` and `Project`.
mod amount;
mod category;
mod expense;
mod month;
mod project;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use expense::{parse_date, Entry, Expense, ExpenseForm, ExpenseId, DATE_FORMAT};
pub use month::Month;
pub use project::{Project, ProjectId};
