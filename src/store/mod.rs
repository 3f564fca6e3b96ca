//! Package storage.
//!
//! A generic chained [`HashTable`] and the [`PackageStore`] built on it.

mod packages;
mod table;

pub use packages::PackageStore;
pub use table::HashTable;
