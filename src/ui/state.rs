use std::time::Instant;

use super::mvi::UiState;

/// Control that receives keyboard input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Name,
    Vip,
    Save,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Name => Focus::Vip,
            Focus::Vip => Focus::Save,
            Focus::Save => Focus::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Name => Focus::Save,
            Focus::Vip => Focus::Name,
            Focus::Save => Focus::Vip,
        }
    }
}

/// Transient notification shown over the form until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// Everything the screen shows. Lives only as long as the screen; the stored
/// user is the source of truth for `response`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState {
    /// Draft name in the text field.
    pub name: String,
    /// Draft VIP switch.
    pub vip: bool,
    /// Name most recently read back from the store.
    pub response: String,
    pub focus: Focus,
    pub toast: Option<Toast>,
}

impl UiState for ScreenState {}
