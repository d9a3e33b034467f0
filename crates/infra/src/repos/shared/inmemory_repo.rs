use econ_calendar_domain::Entity;
use std::sync::Mutex;

/// Useful functions for creating inmemory repositories

/// Inserts the value unless a value with the same key is already stored.
/// Returns whether the value was inserted.
pub fn insert_if_absent<T: Clone + Entity>(
    val: &T,
    collection: &Mutex<Vec<T>>,
) -> bool {
    let mut collection = collection.lock().unwrap();
    let key = val.key();
    if collection.iter().any(|item| item.key() == key) {
        return false;
    }
    collection.push(val.clone());
    true
}

pub fn find<T: Clone + Entity>(key: &T::Key, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = collection.lock().unwrap();
    collection.iter().find(|item| item.key() == *key).cloned()
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(collection: &Mutex<Vec<T>>, mut compare: F) -> Vec<T> {
    let collection = collection.lock().unwrap();
    collection
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect()
}

pub fn delete<T: Clone + Entity>(
    key: &T::Key,
    collection: &Mutex<Vec<T>>,
) -> Option<T> {
    let mut collection = collection.lock().unwrap();
    let index = collection.iter().position(|item| item.key() == *key)?;
    Some(collection.remove(index))
}

pub fn delete_by<T: Clone, F: Fn(&T) -> bool>(collection: &Mutex<Vec<T>>, compare: F) -> u64 {
    let mut collection = collection.lock().unwrap();
    let before = collection.len();
    collection.retain(|item| !compare(item));
    (before - collection.len()) as u64
}

/// Runs `update` on the value stored under `key` while holding the lock, so that
/// the read-modify-write is atomic. Returns `None` if no such value exists.
pub fn update<T: Clone + Entity, R, U: FnOnce(&mut T) -> R>(
    key: &T::Key,
    collection: &Mutex<Vec<T>>,
    update: U,
) -> Option<R> {
    let mut collection = collection.lock().unwrap();
    collection
        .iter_mut()
        .find(|item| item.key() == *key)
        .map(update)
}
