// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Edge-triggered boundary signal gating infinite scroll.
//!
//! The trigger consumes raw "sentinel in view" observations from an
//! injected event source and converts them into at-most-one crossing per
//! entry into view. It never fires while a fetch is outstanding or the
//! feed is exhausted, and re-arms once the boundary leaves view.

/// Debounced boundary-crossing detector.
#[derive(Debug, Default)]
pub struct ScrollTrigger {
    in_view: bool,
}

impl ScrollTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation and returns whether a page load should be
    /// requested. Fires only on the out-of-view to in-view transition.
    pub fn observe(&mut self, in_view: bool, busy: bool, exhausted: bool) -> bool {
        let crossed = in_view && !self.in_view;
        self.in_view = in_view;
        crossed && !busy && !exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_crossing() {
        let mut t = ScrollTrigger::new();
        assert!(t.observe(true, false, false));
        // Still in view: no re-fire without a state change.
        assert!(!t.observe(true, false, false));
        assert!(!t.observe(false, false, false));
        assert!(t.observe(true, false, false), "re-armed after leaving view");
    }

    #[test]
    fn suppressed_while_busy_or_exhausted() {
        let mut t = ScrollTrigger::new();
        assert!(!t.observe(true, true, false));
        t.observe(false, false, false);
        assert!(!t.observe(true, false, true));
    }
}
