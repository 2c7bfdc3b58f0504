//! Query functions, one module per table.
//!
//! Functions that take a `scope: Option<Uuid>` restrict rows to that company
//! (through the parent chain where the table has no company column). `None`
//! means unscoped.

pub mod audit;
pub mod companies;
pub mod condominiums;
pub mod documents;
pub mod email_messages;
pub mod expenses;
pub mod inbox_items;
pub mod owners;
pub mod payments;
pub mod refresh_tokens;
pub mod unit_owners;
pub mod units;
pub mod users;

use std::collections::HashMap;
use std::hash::Hash;

/// Bucket rows by a key, keeping their order within each bucket.
pub fn group_by<K, T, F>(rows: Vec<T>, key: F) -> HashMap<K, Vec<T>>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut map: HashMap<K, Vec<T>> = HashMap::new();
    for row in rows {
        map.entry(key(&row)).or_default().push(row);
    }
    map
}

/// Index rows by a unique key.
pub fn index_by<K, T, F>(rows: Vec<T>, key: F) -> HashMap<K, T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    rows.into_iter().map(|row| (key(&row), row)).collect()
}
