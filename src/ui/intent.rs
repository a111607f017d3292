use std::time::Instant;

use super::mvi::Intent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenIntent {
    NameChanged(String),
    VipChanged(bool),
    FocusNext,
    FocusPrev,
    /// A save flow read the stored user back.
    ResponseLoaded(String),
    ShowToast {
        message: String,
        expires_at: Instant,
    },
    /// Clock tick; hides an expired toast.
    Tick { now: Instant },
}

impl Intent for ScreenIntent {}
