//! Running costs of the business that are not tied to a transaction.

mod db;
mod domain;
mod handlers;

pub use db::{
    create_expense, create_expense_table, delete_expense, get_all_expenses, get_expense,
    update_expense,
};
pub use domain::{Expense, ExpenseDraft, ExpenseForm, ExpenseId, NewExpense};
pub use handlers::{
    create_expense_endpoint, delete_expense_endpoint, get_expense_endpoint,
    list_expenses_endpoint, patch_expense_endpoint, replace_expense_endpoint,
};
