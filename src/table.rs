// File: src/table.rs
//
// Open-addressed hash table keyed by interned-string identity, used for the
// VM's global-variable table and the string intern set (spec.md §4.4).
// Deliberately hand-rolled rather than std::collections::HashMap: the
// bucket-state machine (empty / tombstone / occupied) and the
// `find_string` interning probe are part of the system this crate models.

use std::rc::Rc;

use crate::value::{ObjString, Value};

const MAX_LOAD_FACTOR: f64 = 0.75;

#[derive(Clone)]
enum Entry {
    Empty,
    Tombstone,
    Occupied { key: Rc<ObjString>, value: Value },
}

/// A table of `Rc<ObjString>` key to `Value`, used for both the globals
/// table and the string intern set (where the value is always `Value::Nil`).
pub struct Table {
    entries: Vec<Entry>,
    count: usize, // occupied + tombstones, used against the load factor
    len: usize,   // occupied only
}

impl Table {
    pub fn new() -> Self {
        Self { entries: Vec::new(), count: 0, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: &Rc<ObjString>) -> Option<Value> {
        if self.entries.is_empty() {
            return None;
        }
        let index = self.find_entry(key);
        match &self.entries[index] {
            Entry::Occupied { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns true iff the key is new (not a replace).
    pub fn set(&mut self, key: Rc<ObjString>, value: Value) -> bool {
        if (self.count + 1) as f64 > self.entries.len() as f64 * MAX_LOAD_FACTOR {
            self.grow();
        }

        let index = self.find_entry(&key);
        let is_new = !matches!(self.entries[index], Entry::Occupied { .. });
        if is_new && !matches!(self.entries[index], Entry::Tombstone) {
            self.count += 1;
        }
        if is_new {
            self.len += 1;
        }
        self.entries[index] = Entry::Occupied { key, value };
        is_new
    }

    /// Replaces the bucket with a tombstone. Returns true iff a key was present.
    pub fn delete(&mut self, key: &Rc<ObjString>) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let index = self.find_entry(key);
        if matches!(self.entries[index], Entry::Occupied { .. }) {
            self.entries[index] = Entry::Tombstone;
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// The interning probe: compares length, hash, then bytes, to collapse
    /// duplicate strings before they become `Value`s.
    pub fn find_string(&self, chars: &str, hash: u32) -> Option<Rc<ObjString>> {
        if self.entries.is_empty() {
            return None;
        }

        let capacity = self.entries.len();
        let mut index = (hash as usize) % capacity;
        loop {
            match &self.entries[index] {
                Entry::Empty => return None,
                Entry::Tombstone => {}
                Entry::Occupied { key, .. } => {
                    if key.hash == hash && key.chars.len() == chars.len() && key.chars == chars {
                        return Some(Rc::clone(key));
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }

    /// Linear probe from `hash % capacity`; stops at the first empty bucket
    /// but skips tombstones, reusing the first tombstone seen for inserts.
    fn find_entry(&self, key: &Rc<ObjString>) -> usize {
        let capacity = self.entries.len();
        let mut index = (key.hash as usize) % capacity;
        let mut tombstone: Option<usize> = None;

        loop {
            match &self.entries[index] {
                Entry::Empty => return tombstone.unwrap_or(index),
                Entry::Tombstone => {
                    if tombstone.is_none() {
                        tombstone = Some(index);
                    }
                }
                Entry::Occupied { key: entry_key, .. } => {
                    if Rc::ptr_eq(entry_key, key) || entry_key.as_ref() == key.as_ref() {
                        return index;
                    }
                }
            }
            index = (index + 1) % capacity;
        }
    }

    fn grow(&mut self) {
        let new_capacity = if self.entries.is_empty() { 8 } else { self.entries.len() * 2 };
        let old = std::mem::replace(&mut self.entries, vec_of_empty(new_capacity));
        self.count = 0;
        self.len = 0;

        for entry in old {
            if let Entry::Occupied { key, value } = entry {
                self.set(key, value);
            }
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

fn vec_of_empty(capacity: usize) -> Vec<Entry> {
    let mut v = Vec::with_capacity(capacity);
    v.resize_with(capacity, || Entry::Empty);
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> Rc<ObjString> {
        Rc::new(ObjString::new(name.to_string()))
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut table = Table::new();
        let k = key("x");
        assert!(table.set(Rc::clone(&k), Value::Number(1.0)));
        assert!(matches!(table.get(&k), Some(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn set_on_existing_key_returns_false_and_replaces() {
        let mut table = Table::new();
        let k = key("x");
        table.set(Rc::clone(&k), Value::Number(1.0));
        let is_new = table.set(Rc::clone(&k), Value::Number(2.0));
        assert!(!is_new);
        assert!(matches!(table.get(&k), Some(Value::Number(n)) if n == 2.0));
    }

    #[test]
    fn delete_then_get_is_none() {
        let mut table = Table::new();
        let k = key("x");
        table.set(Rc::clone(&k), Value::Bool(true));
        assert!(table.delete(&k));
        assert!(table.get(&k).is_none());
    }

    #[test]
    fn delete_missing_key_returns_false() {
        let mut table = Table::new();
        assert!(!table.delete(&key("missing")));
    }

    #[test]
    fn grows_past_load_factor_and_keeps_all_entries() {
        let mut table = Table::new();
        let keys: Vec<_> = (0..100).map(|i| key(&format!("k{i}"))).collect();
        for (i, k) in keys.iter().enumerate() {
            table.set(Rc::clone(k), Value::Number(i as f64));
        }
        assert_eq!(table.len(), 100);
        for (i, k) in keys.iter().enumerate() {
            assert!(matches!(table.get(k), Some(Value::Number(n)) if n == i as f64));
        }
    }

    #[test]
    fn find_string_collapses_equal_bytes() {
        let mut table = Table::new();
        let k = key("hello");
        table.set(Rc::clone(&k), Value::Nil);
        let found = table.find_string("hello", k.hash).expect("interned");
        assert!(Rc::ptr_eq(&found, &k));
    }

    #[test]
    fn find_string_misses_on_different_bytes() {
        let mut table = Table::new();
        table.set(key("hello"), Value::Nil);
        assert!(table.find_string("goodbye", key("goodbye").hash).is_none());
    }

    #[test]
    fn tombstones_do_not_stop_probing() {
        let mut table = Table::new();
        // Force several entries into the same small table, then delete one
        // and confirm a later one with the same starting probe is still
        // reachable (probing must skip the tombstone, not stop at it).
        let a = key("a");
        let b = key("b");
        table.set(Rc::clone(&a), Value::Number(1.0));
        table.set(Rc::clone(&b), Value::Number(2.0));
        table.delete(&a);
        assert!(matches!(table.get(&b), Some(Value::Number(n)) if n == 2.0));
    }
}
