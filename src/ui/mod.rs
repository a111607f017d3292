//! Single-screen terminal UI for editing and saving the user.

pub mod app;
pub mod form;
pub mod intent;
pub mod mvi;
pub mod reducer;
pub mod state;
pub mod terminal_guard;

pub use app::{run, AppConfig};
pub use form::{FormAction, FormProps};
pub use intent::ScreenIntent;
pub use reducer::ScreenReducer;
pub use state::{Focus, ScreenState, Toast};
