use serde::{Deserialize, Serialize};

/// A set of options that remembers the order in which they were picked.
///
/// Every mutation returns a fresh snapshot; the receiver is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet<T> {
    items: Vec<T>,
}

impl<T> Default for SelectionSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Copy + PartialEq> SelectionSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `value` if present (keeping the order of the rest),
    /// otherwise appends it.
    #[must_use]
    pub fn toggle(&self, value: T) -> Self {
        let items = if self.contains(value) {
            self.items.iter().copied().filter(|item| *item != value).collect()
        } else {
            let mut items = Vec::with_capacity(self.items.len() + 1);
            items.extend_from_slice(&self.items);
            items.push(value);
            items
        };
        Self { items }
    }

    pub fn contains(&self, value: T) -> bool {
        self.items.contains(&value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<T: Copy + PartialEq> FromIterator<T> for SelectionSet<T> {
    /// Builds a set by toggling each value in turn, so repeated values cancel.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::default(), |set, value| set.toggle(value))
    }
}
