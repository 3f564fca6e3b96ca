//! Package records keyed by id.

use super::HashTable;
use crate::error::StoreError;
use crate::models::{Package, PackageId};

/// All package records of a delivery day.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{Address, Deadline, Package};
/// use u_dispatch::store::PackageStore;
///
/// let mut store = PackageStore::new();
/// store.put(Package::new(1, Address::street("195 W Oakland Ave"), Deadline::EndOfDay, 21)).unwrap();
/// assert!(store.put(Package::new(1, Address::street("elsewhere"), Deadline::EndOfDay, 1)).is_err());
/// assert_eq!(store.get(1).unwrap().weight(), 21);
/// assert!(store.get(2).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageStore {
    table: HashTable<PackageId, Package>,
}

impl PackageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store sized for `capacity` packages.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
        }
    }

    /// Builds a store from records, failing on the first duplicate id.
    pub fn from_packages(packages: impl IntoIterator<Item = Package>) -> Result<Self, StoreError> {
        let mut store = Self::new();
        for package in packages {
            store.put(package)?;
        }
        Ok(store)
    }

    /// Inserts a record under its own id.
    pub fn put(&mut self, package: Package) -> Result<(), StoreError> {
        let id = package.id();
        self.table
            .try_insert(id, package)
            .map_err(|(id, _)| StoreError::DuplicateKey(id))
    }

    /// Returns the record for `id`.
    pub fn get(&self, id: PackageId) -> Result<&Package, StoreError> {
        self.table.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Returns the record for `id` for update.
    pub fn get_mut(&mut self, id: PackageId) -> Result<&mut Package, StoreError> {
        self.table.get_mut(&id).ok_or(StoreError::NotFound(id))
    }

    /// Returns `true` if a record with `id` exists.
    pub fn contains(&self, id: PackageId) -> bool {
        self.table.contains_key(&id)
    }

    /// All records in insertion order. Each call starts a fresh pass.
    pub fn all(&self) -> impl Iterator<Item = &Package> + '_ {
        self.table.values()
    }

    /// All ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = PackageId> + '_ {
        self.table.keys().copied()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
