//! # Item manager contract.

/// Manager of a set of items that can be added and removed in batches.
///
/// Implementations ignore items that are already present on `add` and items
/// that are absent on `remove`; an empty batch is a no-op.
pub trait ItemManager<T> {
    /// Error raised while removing items.
    type Error;

    /// Snapshot of the items currently managed.
    fn items(&self) -> Vec<T>;

    /// Installs `items`.
    fn add(&mut self, items: &[T]);

    /// Uninstalls `items`. Every item is processed; the first failure is returned.
    fn remove(&mut self, items: &[T]) -> Result<(), Self::Error>;
}
