//! Insertion-ordered store of named simulation runs.
//!
//! Runs are additive: inserting under an existing name replaces the run but
//! keeps its position in the selector order. There is no removal.

use crate::model::Run;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct RunStore {
    runs: Vec<Arc<Run>>,
}

impl RunStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the run under its name. New names append; an
    /// existing name keeps its original position. Returns true exactly when
    /// the store transitioned from empty to non-empty, so the caller can
    /// auto-select the first run once.
    pub fn add(&mut self, run: Run) -> bool {
        let became_non_empty = self.runs.is_empty();
        let run = Arc::new(run);
        match self.runs.iter_mut().find(|r| r.name == run.name) {
            Some(slot) => *slot = run,
            None => self.runs.push(run),
        }
        became_non_empty
    }

    /// Lookup by name. An absent key is "not found", never an error; callers
    /// treat it as a no-op trigger.
    pub fn get(&self, name: &str) -> Option<Arc<Run>> {
        self.runs.iter().find(|r| r.name == name).cloned()
    }

    /// Run names in insertion order; drives the run selector.
    pub fn names(&self) -> Vec<String> {
        self.runs.iter().map(|r| r.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SampleSequence, JOINTS};

    fn run(name: &str, n: usize) -> Run {
        Run {
            name: name.into(),
            samples: SampleSequence {
                configurations: vec![[0.0; JOINTS]; n],
                torques: vec![[0.0; JOINTS]; n],
                errors: vec![[0.0; 2]; n],
                timestamps: (0..n).map(|i| i as f64 * 0.1).collect(),
            },
        }
    }

    #[test]
    fn first_add_signals_non_empty_once() {
        let mut store = RunStore::new();
        assert!(store.add(run("a", 3)));
        assert!(!store.add(run("b", 3)));
        assert!(!store.add(run("a", 5)));
    }

    #[test]
    fn names_preserve_insertion_order() {
        let mut store = RunStore::new();
        store.add(run("pd", 3));
        store.add(run("ctc", 3));
        store.add(run("lqr", 3));
        assert_eq!(store.names(), vec!["pd", "ctc", "lqr"]);
    }

    #[test]
    fn replacement_keeps_position() {
        let mut store = RunStore::new();
        store.add(run("pd", 3));
        store.add(run("ctc", 3));
        store.add(run("pd", 7));
        assert_eq!(store.names(), vec!["pd", "ctc"]);
        assert_eq!(store.len(), 2);
        let got = store.get("pd").unwrap();
        assert_eq!(got.samples.len(), 7);
    }

    #[test]
    fn get_missing_is_none() {
        let store = RunStore::new();
        assert!(store.get("nope").is_none());
    }
}
