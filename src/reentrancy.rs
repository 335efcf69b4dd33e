//! Debug-only reentrancy detection for the ordered table.
//!
//! `OrderedTable` runs user code (`K: Hash`, `K: Eq`) while probing its
//! index, at a point where links or slots may be half-updated. A key whose
//! `Eq` reaches back into the same table would observe that state. In debug
//! builds the flag below turns such a nested call into a panic; release
//! builds compile it away.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table flag. Each public table method starts with
/// `let _g = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct ReentrancyFlag {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Same auto traits in every profile: Send, never Sync.
    _unsync: PhantomData<Cell<()>>,
}

impl ReentrancyFlag {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _unsync: PhantomData,
        }
    }

    /// Marks the table busy until the returned guard drops.
    ///
    /// Panics in debug builds when the table is already busy.
    #[inline]
    pub(crate) fn enter(&self) -> Entered<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrant access to an ordered table while it was being probed"
            );
            Entered { flag: self }
        }

        #[cfg(not(debug_assertions))]
        {
            Entered { _flag: PhantomData }
        }
    }
}

impl Default for ReentrancyFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ReentrancyFlag {
    // A cloned table starts idle regardless of the source's state.
    fn clone(&self) -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`ReentrancyFlag::enter`].
pub(crate) struct Entered<'a> {
    #[cfg(debug_assertions)]
    flag: &'a ReentrancyFlag,
    #[cfg(not(debug_assertions))]
    _flag: PhantomData<&'a ()>,
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let was_busy = self.flag.busy.replace(false);
            debug_assert!(was_busy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReentrancyFlag;

    #[test]
    fn sequential_entries_are_fine() {
        let flag = ReentrancyFlag::new();
        {
            let _g = flag.enter();
        }
        let _g = flag.enter();
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_in_debug() {
        let flag = ReentrancyFlag::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = flag.enter();
            let _inner = flag.enter();
        }));
        assert!(res.is_err(), "nested entry must panic in debug builds");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn clone_of_busy_flag_is_idle() {
        let flag = ReentrancyFlag::new();
        let _g = flag.enter();
        let copy = flag.clone();
        let _g2 = copy.enter();
    }
}
