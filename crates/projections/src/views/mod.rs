//! Read model views for the query side.

pub mod catalog;
pub mod ledger;

pub use catalog::CatalogView;
pub use ledger::LedgerView;
