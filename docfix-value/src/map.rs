use crate::Value;
use im::Vector;
use std::fmt;
use std::sync::Arc;

/// Insertion-ordered map with unique keys.
///
/// Entries live in a persistent vector, so cloning is O(1) and [`Map::with`] /
/// [`Map::without`] share every untouched entry with the receiver. Lookups are linear, which
/// is the right trade-off for the small records that make up save documents.
///
/// Equality ignores key order: two maps are equal when they hold the same keys bound to equal
/// values. Order is still preserved by every operation so re-encoded documents keep their
/// original layout.
#[derive(Clone, Default)]
pub struct Map {
    entries: Vector<(Arc<str>, Value)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Index of `key` in insertion order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.as_ref() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Inserts or replaces in place. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, value: Value) {
        let key = key.into();
        match self.position(&key) {
            Some(i) => {
                self.entries.set(i, (key, value));
            }
            None => self.entries.push_back((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.position(key)?;
        Some(self.entries.remove(i).1)
    }

    /// Persistent insert: returns a new map, leaving `self` untouched.
    pub fn with(&self, key: impl Into<Arc<str>>, value: Value) -> Map {
        let mut out = self.clone();
        out.insert(key, value);
        out
    }

    /// Persistent remove. Absent keys are not an error.
    pub fn without(&self, key: &str) -> Map {
        match self.position(key) {
            Some(i) => {
                let mut entries = self.entries.clone();
                entries.remove(i);
                Map { entries }
            }
            None => self.clone(),
        }
    }

    /// Renames `old` to `new`, keeping the entry's position. A pre-existing `new` entry is
    /// dropped in favour of the renamed one.
    pub fn renamed(&self, old: &str, new: &str) -> Map {
        if old == new {
            return self.clone();
        }
        let Some(i) = self.position(old) else {
            return self.clone();
        };
        let mut entries = self.entries.clone();
        let (_, value) = entries[i].clone();
        entries.set(i, (Arc::from(new), value));
        if let Some(j) = entries
            .iter()
            .enumerate()
            .position(|(j, (k, _))| j != i && k.as_ref() == new)
        {
            entries.remove(j);
        }
        Map { entries }
    }

    /// Right-biased merge: keys of `other` overwrite ours in place, new keys are appended.
    pub fn merged(&self, other: &Map) -> Map {
        let mut out = self.clone();
        for (k, v) in other.entries.iter() {
            out.insert(k.clone(), v.clone());
        }
        out
    }

    /// Keeps only entries for which `keep` returns true, preserving order.
    pub fn filtered(&self, mut keep: impl FnMut(&str, &Value) -> bool) -> Map {
        let mut entries = self.entries.clone();
        entries.retain(|(k, v)| keep(k, v));
        Map { entries }
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| o == v))
    }
}

impl Eq for Map {}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<Arc<str>>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::Map;
    use crate::Value;

    fn sample() -> Map {
        [("a", Value::from(1)), ("b", Value::from(2)), ("c", Value::from(3))]
            .into_iter()
            .collect()
    }

    #[test]
    fn insert_existing_keeps_position() {
        let map = sample().with("b", Value::from(20));
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(map.get("b"), Some(&Value::from(20)));
    }

    #[test]
    fn with_leaves_receiver_untouched() {
        let base = sample();
        let _ = base.with("d", Value::from(4));
        assert_eq!(base.len(), 3);
        assert!(!base.contains_key("d"));
    }

    #[test]
    fn renamed_keeps_slot_and_drops_collision() {
        let map = sample().renamed("a", "c");
        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, ["c", "b"]);
        assert_eq!(map.get("c"), Some(&Value::from(1)));
    }

    #[test]
    fn equality_ignores_order() {
        let left: Map = [("x", Value::from(1)), ("y", Value::from(2))]
            .into_iter()
            .collect();
        let right: Map = [("y", Value::from(2)), ("x", Value::from(1))]
            .into_iter()
            .collect();
        assert_eq!(left, right);
        assert_ne!(left, right.with("z", Value::Null));
    }

    #[test]
    fn without_absent_key_is_noop() {
        assert_eq!(sample().without("zzz"), sample());
    }
}
