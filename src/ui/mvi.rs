//! Model-View-Intent primitives.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ View
//!    ↑                              │
//!    └──────────────────────────────┘
//! ```

/// Marker trait for UI state objects.
///
/// States are cloned to produce new states and compared to detect changes.
pub trait UiState: Clone + PartialEq + Default + Send + 'static {}

/// Marker trait for user actions and system events fed to a reducer.
pub trait Intent: Send + 'static {}

/// The only place where state transitions happen.
///
/// Must be a pure function: (State, Intent) -> State
pub trait Reducer {
    type State: UiState;
    type Intent: Intent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}
