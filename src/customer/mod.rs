//! The parties that buy materials and pay for them.

mod db;
mod domain;
mod handlers;

pub use db::{
    create_customer, create_customer_table, delete_customer, get_all_customers, get_customer,
    update_customer,
};
pub use domain::{Customer, CustomerDraft, CustomerForm, CustomerId, NewCustomer};
pub use handlers::{
    create_customer_endpoint, delete_customer_endpoint, get_customer_endpoint,
    list_customers_endpoint, patch_customer_endpoint, replace_customer_endpoint,
};
