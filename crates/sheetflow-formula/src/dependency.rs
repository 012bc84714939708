use std::collections::{HashMap, HashSet};

/// A set of ordered pairs `(s, t)` meaning "t depends on s".
///
/// `t` is a *dependent* of `s` and `s` is a *dependee* of `t`. Both
/// directions are indexed so either can be enumerated in O(k).
///
/// Invariants:
/// - `(s, t)` is in `dependents[s]` iff it is in `dependees[t]`
/// - no adjacency entry is ever empty
/// - `size` equals the number of distinct pairs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    /// s -> {t : (s, t)}
    /// e.g., if A1 = B1 + C1, then dependents[B1] contains A1
    dependents: HashMap<String, HashSet<String>>,

    /// t -> {s : (s, t)}
    /// e.g., if A1 = B1 + C1, then dependees[A1] = {B1, C1}
    dependees: HashMap<String, HashSet<String>>,

    size: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ordered pairs in the graph
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of dependees of `t`
    pub fn dependee_count(&self, t: &str) -> usize {
        self.dependees.get(t).map_or(0, HashSet::len)
    }

    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependents.contains_key(s)
    }

    pub fn has_dependees(&self, t: &str) -> bool {
        self.dependees.contains_key(t)
    }

    /// Snapshot of the cells that depend on `s`
    pub fn dependents(&self, s: &str) -> Vec<String> {
        self.dependents
            .get(s)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the cells `t` depends on
    pub fn dependees(&self, t: &str) -> Vec<String> {
        self.dependees
            .get(t)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if `(s, t)` is in the graph
    pub fn contains(&self, s: &str, t: &str) -> bool {
        self.dependents.get(s).is_some_and(|set| set.contains(t))
    }

    /// Add `(s, t)`. No effect if it is already present.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        let inserted = self
            .dependents
            .entry(s.to_string())
            .or_default()
            .insert(t.to_string());

        if inserted {
            self.dependees
                .entry(t.to_string())
                .or_default()
                .insert(s.to_string());
            self.size += 1;
        }
    }

    /// Remove `(s, t)`. No effect if it is absent.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        let removed = match self.dependents.get_mut(s) {
            Some(set) => {
                let removed = set.remove(t);
                if set.is_empty() {
                    self.dependents.remove(s);
                }
                removed
            }
            None => false,
        };

        if !removed {
            return;
        }

        if let Some(set) = self.dependees.get_mut(t) {
            set.remove(s);
            if set.is_empty() {
                self.dependees.remove(t);
            }
        }
        self.size -= 1;
    }

    /// Replace every `(s, r)` with `(s, t)` for each `t` in `new_dependents`
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for old in self.dependents(s) {
            self.remove_dependency(s, &old);
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Replace every `(r, s)` with `(t, s)` for each `t` in `new_dependees`
    pub fn replace_dependees<I, S>(&mut self, s: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for old in self.dependees(s) {
            self.remove_dependency(&old, s);
        }
        for t in new_dependees {
            self.add_dependency(t.as_ref(), s);
        }
    }
}
