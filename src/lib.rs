//! Group expense splitting for travel groups.
//!
//! Members share expenses, each paid by one person and split equally among
//! some of the group. From those, [`compute_balances`] works out who is up
//! and who is down, and [`compute_settlements`] proposes the payments that
//! square everyone. [`Group`] bundles the roster and expenses as an
//! immutable state value; the `routes` and `store` modules serve it over
//! HTTP.

pub mod balance;
pub mod config;
pub mod error;
pub mod roster;
pub mod routes;
pub mod schemas;
pub mod settlement;
pub mod store;

pub use balance::{compute_balances, PersonalBalance};
pub use error::SplitError;
pub use roster::{add_expense, add_member, remove_expense, remove_member};
pub use schemas::{Category, Expense, ExpenseDraft, ExpenseId, Group, GroupSummary, Member};
pub use settlement::{compute_settlements, Settlement, EPSILON};
