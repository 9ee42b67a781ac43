//! The funds the business started trading with.

mod db;
mod domain;
mod handlers;

pub use db::{
    create_starting_capital, create_starting_capital_table, delete_starting_capital,
    get_all_starting_capital, get_starting_capital, update_starting_capital,
};
pub use domain::{
    NewStartingCapital, StartingCapital, StartingCapitalDraft, StartingCapitalForm,
    StartingCapitalId,
};
pub use handlers::{
    create_starting_capital_endpoint, delete_starting_capital_endpoint,
    get_starting_capital_endpoint, list_starting_capital_endpoint,
    patch_starting_capital_endpoint, replace_starting_capital_endpoint,
};
