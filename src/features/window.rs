//! Bounded trailing windows
//!
//! One window per team (or team pair) holds the most recent K values seen so
//! far in a pass. The oldest value is evicted on each push once full.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::{FootyError, Result, TeamId};

/// Fixed-capacity ring buffer of the K most recent values
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingWindow<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> TrailingWindow<T> {
    /// Create an empty window holding at most `capacity` values
    pub fn new(capacity: usize) -> Self {
        TrailingWindow {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a value, evicting the oldest once the window is full
    pub fn push(&mut self, value: T) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values from oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }

    /// Values from newest to oldest
    pub fn iter_recent(&self) -> impl Iterator<Item = &T> {
        self.values.iter().rev()
    }
}

/// One trailing window per key, created empty on first push
#[derive(Debug, Clone)]
pub struct KeyedWindows<K, T> {
    windows: HashMap<K, TrailingWindow<T>>,
}

impl<K, T> Default for KeyedWindows<K, T> {
    fn default() -> Self {
        KeyedWindows {
            windows: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, T> KeyedWindows<K, T> {
    pub fn get(&self, key: &K) -> Option<&TrailingWindow<T>> {
        self.windows.get(key)
    }

    pub fn push(&mut self, key: K, value: T, capacity: usize) {
        self.windows
            .entry(key)
            .or_insert_with(|| TrailingWindow::new(capacity))
            .push(value);
    }
}

/// Per-team windows
pub type TeamWindows<T> = KeyedWindows<TeamId, T>;

/// Validate a window size against its minimum history requirement
pub fn check_window(name: &str, window: usize, min_history: usize) -> Result<()> {
    if window == 0 || min_history > window {
        return Err(FootyError::InvalidWindow {
            name: name.to_string(),
            window,
            min_history,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_then_evicts_oldest() {
        let mut window = TrailingWindow::new(3);
        assert!(window.is_empty());

        window.push(1);
        window.push(2);
        assert_eq!(window.len(), 2);

        window.push(3);
        window.push(4);
        assert_eq!(window.len(), 3);
        assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4]);
        assert_eq!(window.iter_recent().copied().collect::<Vec<_>>(), vec![4, 3, 2]);
    }

    #[test]
    fn test_keyed_windows() {
        let mut windows: TeamWindows<u8> = TeamWindows::default();
        assert!(windows.get(&TeamId(1)).is_none());
        windows.push(TeamId(1), 4, 2);
        windows.push(TeamId(1), 5, 2);
        windows.push(TeamId(1), 6, 2);
        windows.push(TeamId(2), 1, 2);
        let team1 = windows.get(&TeamId(1)).unwrap();
        assert_eq!(team1.iter().copied().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(windows.get(&TeamId(2)).unwrap().len(), 1);
    }

    #[test]
    fn test_check_window() {
        assert!(check_window("form", 5, 5).is_ok());
        assert!(check_window("form", 0, 0).is_err());
        assert!(check_window("variance", 5, 6).is_err());
    }
}
