//! Flip-now, confirm-later boolean controls.
//!
//! Used for vendor online status, rider availability, and favourites. The
//! control shows the new value immediately and stays disabled until the
//! remote write settles; a failure restores the old value.

#[cfg(test)]
#[path = "optimistic_test.rs"]
mod optimistic_test;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimisticToggle {
    value: bool,
    previous: Option<bool>,
}

impl OptimisticToggle {
    pub fn new(value: bool) -> Self {
        Self { value, previous: None }
    }

    pub fn value(self) -> bool {
        self.value
    }

    pub fn is_pending(self) -> bool {
        self.previous.is_some()
    }

    /// Flip locally and return the value to write, or `None` while a write
    /// is already in flight.
    pub fn begin(&mut self) -> Option<bool> {
        if self.is_pending() {
            return None;
        }
        self.previous = Some(self.value);
        self.value = !self.value;
        Some(self.value)
    }

    /// The write succeeded.
    pub fn settle(&mut self) {
        self.previous = None;
    }

    /// The write failed; restore the value from before `begin`.
    pub fn revert(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.value = previous;
        }
    }

    /// Replace the value from a fresh load. Ignored while a write is pending.
    pub fn sync(&mut self, value: bool) {
        if !self.is_pending() {
            self.value = value;
        }
    }
}
