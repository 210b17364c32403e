// Utility functions for recommendation-service

use std::collections::HashSet;
use std::hash::Hash;

/// Keep the first occurrence of every value, preserving the order in which
/// values were first seen.
pub fn unique_in_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen: HashSet<T> = HashSet::new();
    let mut unique: Vec<T> = Vec::new();

    for item in items {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }

    unique
}
