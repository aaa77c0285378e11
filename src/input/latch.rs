use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Terminals only report key presses, never releases. The latch treats a key
/// as held for `hold_window` after its latest press; keyboard auto-repeat keeps
/// refreshing it while the key stays down.
#[derive(Debug, Clone)]
pub struct KeyLatch {
    hold_window: Duration,
    last_pressed: HashMap<String, Instant>,
}

impl KeyLatch {
    pub fn new(hold_window: Duration) -> Self {
        Self {
            hold_window,
            last_pressed: HashMap::new(),
        }
    }

    pub fn press<S: Into<String>>(&mut self, input: S, at: Instant) {
        self.last_pressed.insert(input.into(), at);
    }

    pub fn is_held(&self, input: &str, now: Instant) -> bool {
        self.last_pressed
            .get(input)
            .map(|pressed| now.saturating_duration_since(*pressed) <= self.hold_window)
            .unwrap_or(false)
    }

    pub fn held(&self, now: Instant) -> HashSet<&str> {
        self.last_pressed
            .keys()
            .filter(|input| self.is_held(input, now))
            .map(String::as_str)
            .collect()
    }

    /// Drops expired presses so the map does not grow with every key ever hit.
    pub fn prune(&mut self, now: Instant) {
        let window = self.hold_window;
        self.last_pressed
            .retain(|_, pressed| now.saturating_duration_since(*pressed) <= window);
    }

    pub fn clear(&mut self) {
        self.last_pressed.clear();
    }
}
