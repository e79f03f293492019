//! File loaders for startup lookup tables.

mod identity_table;
mod labels;

pub use identity_table::IdentityTable;
pub use labels::read_labels;
