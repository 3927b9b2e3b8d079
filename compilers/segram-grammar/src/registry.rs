use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Values with a canonical identity inside a [`Registry`].
pub trait Canonical {
    type Key: Ord + Copy + Debug;

    fn key(&self) -> Self::Key;

    /// Absorbs a newer build of the same entity.
    fn update(&mut self, newer: Self)
    where
        Self: Sized,
    {
        *self = newer;
    }
}

/// Keyed store that keeps exactly one instance per identity. Repeated
/// construction updates the stored instance in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<T: Canonical> {
    items: BTreeMap<T::Key, T>,
}

impl<T: Canonical> Default for Registry<T> {
    fn default() -> Self {
        Self { items: BTreeMap::new() }
    }
}

impl<T: Canonical> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, key: T::Key, ctor: impl FnOnce() -> T) -> &mut T {
        match self.items.entry(key) {
            Entry::Occupied(entry) => {
                let current = entry.into_mut();
                current.update(ctor());
                current
            }
            Entry::Vacant(entry) => entry.insert(ctor()),
        }
    }

    pub fn insert(&mut self, item: T) -> &mut T {
        let key = item.key();
        self.get_or_create(key, || item)
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.items.keys().copied()
    }

    pub fn values(&self) -> btree_map::Values<'_, T::Key, T> {
        self.items.values()
    }

    pub fn values_mut(&mut self) -> btree_map::ValuesMut<'_, T::Key, T> {
        self.items.values_mut()
    }
}

impl<T: Canonical> FromIterator<T> for Registry<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut registry = Self::new();
        for item in iter {
            registry.insert(item);
        }
        registry
    }
}
