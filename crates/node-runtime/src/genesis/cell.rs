//! # Compute-Once Cell
//!
//! Holds a lazily computed value with two explicit states:
//!
//! ```text
//!   NotComputed ──first get_or_try_init──→ Computed
//!        ↑                                     │
//!        └──────────────── reset ──────────────┘
//! ```
//!
//! Readers of a computed value share the read lock. The first reader of an
//! uncomputed value takes the write lock, re-checks the state and computes;
//! concurrent readers wait for it and then see the same `Arc`.

use std::sync::Arc;

use parking_lot::RwLock;

/// State of a [`GenesisCell`].
#[derive(Debug)]
pub enum CellState<T> {
    NotComputed,
    Computed(Arc<T>),
}

impl<T> CellState<T> {
    pub fn is_computed(&self) -> bool {
        matches!(self, CellState::Computed(_))
    }
}

#[derive(Debug)]
pub struct GenesisCell<T> {
    state: RwLock<CellState<T>>,
}

impl<T> Default for GenesisCell<T> {
    fn default() -> Self {
        Self {
            state: RwLock::new(CellState::NotComputed),
        }
    }
}

impl<T> GenesisCell<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the computed value, computing it with `init` if the cell is
    /// empty. A failed `init` leaves the cell empty.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        if let CellState::Computed(value) = &*self.state.read() {
            return Ok(Arc::clone(value));
        }

        let mut state = self.state.write();
        if let CellState::Computed(value) = &*state {
            return Ok(Arc::clone(value));
        }

        let value = Arc::new(init()?);
        *state = CellState::Computed(Arc::clone(&value));
        Ok(value)
    }

    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.state.read() {
            CellState::Computed(value) => Some(Arc::clone(value)),
            CellState::NotComputed => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.state.read().is_computed()
    }

    /// Return the cell to `NotComputed`. Returns whether a value was
    /// dropped.
    pub fn reset(&self) -> bool {
        self.reset_with(|| ())
    }

    /// Like [`reset`](Self::reset), running `on_reset` under the same write
    /// lock that guards initialization.
    pub fn reset_with(&self, on_reset: impl FnOnce()) -> bool {
        let mut state = self.state.write();
        on_reset();
        std::mem::replace(&mut *state, CellState::NotComputed).is_computed()
    }
}
