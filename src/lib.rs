//! # datastore_prefs
//!
//! A small, typed, observable preference store, and the single-screen example
//! built on top of it: edit a user's name and VIP flag, save them, and watch the
//! stored values come back.
//!
//! The store keeps one preference group per file (`<name>.toml`). Design
//! priorities:
//!
//! - **Safety:** Writes go to a temporary file that is renamed into place, so a
//!   crash mid-write never leaves a half-written group behind.
//! - **Observability:** Reads are subscriptions. A subscriber gets the current
//!   values right away and again after every committed write.
//! - **Typed access:** Keys carry the type stored under them, and records are
//!   declared with [`preference_record!`].
//! - **Easy Unit Testing:** [`DataStore::open_testing`] gives every test its own
//!   throwaway file.
//!
//! **Note:** Not intended for large quantities of data. The whole group is held
//! in memory and rewritten on every change.
//!
//! ## Example
//!
//! ```rust
//! use datastore_prefs::{preference_record, DataStore};
//!
//! preference_record! {
//!     /// Application preferences.
//!     pub struct AppPreferences {
//!         /// Whether notifications are enabled.
//!         pub notifications: bool = true => "notifications",
//!         /// The default username.
//!         pub username: String = "guest".to_string() => "username",
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DataStore::open_testing("app-preferences")?;
//! assert!(AppPreferences::load(&store).notifications);
//!
//! let prefs = AppPreferences { notifications: false, ..AppPreferences::default() };
//! prefs.save(&store).await?;
//!
//! let mut updates = AppPreferences::observe(&store);
//! assert_eq!(updates.next().await, Some(prefs));
//! # Ok(())
//! # }
//! ```

// Re-export dependencies used by the macro and the public error types
pub use paste;
pub use toml;

pub mod datastore;
pub mod error;
pub mod flow;
pub mod logging;
pub mod preferences;
pub mod storage;
pub mod subscription;
pub mod ui;
pub mod user;

pub use datastore::{CorruptionPolicy, DataStore, StoreOptions};
pub use error::{LoadError, StoreError};
pub use flow::{FlowError, FlowHandle, FlowUpdate, SaveFlow};
pub use preferences::{MutablePreferences, PrefKey, PrefType, PrefValue, Preferences};
pub use subscription::Subscription;
pub use user::User;

/// Declares a record whose fields are stored as individual preference keys.
///
/// # Overview
/// The macro generates a plain value struct plus:
///
/// - a `KEY_<FIELD>` constant of type [`PrefKey`] for every field;
/// - `from_preferences`, which builds the record from a snapshot, falling back
///   to the declared default for absent (or mistyped) keys;
/// - `write_to`, which stores every field into an edit transaction;
/// - `load`, `save` and `observe` shortcuts against a [`DataStore`].
///
/// The record itself is never stored as a unit; only its fields are.
///
/// # Example
///
/// ```rust
/// use datastore_prefs::preference_record;
///
/// preference_record! {
///     /// Example preferences for an application.
///     pub struct AppPreferences {
///         /// Whether dark mode is enabled.
///         pub dark_mode: bool = false => "dark_mode",
///         /// Preferred language.
///         pub language: String = "en".to_string() => "language",
///     }
/// }
///
/// assert_eq!(AppPreferences::KEY_DARK_MODE.name(), "dark_mode");
/// assert_eq!(AppPreferences::default().language, "en");
/// ```
#[macro_export]
macro_rules! preference_record {
    (
        $(#[$outer:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$inner:meta])*
                $field_vis:vis $field:ident: $type:ty = $default:expr => $saved_name:expr,
            )*
        }
    ) => {
        $crate::paste::paste! {
            $(#[$outer])*
            #[derive(Debug, Clone, PartialEq)]
            $vis struct $name {
                $(
                    $(#[$inner])*
                    $field_vis $field: $type,
                )*
            }

            impl ::std::default::Default for $name {
                fn default() -> Self {
                    $name {
                        $(
                            $field: $default,
                        )*
                    }
                }
            }

            impl $name {
                $(
                    /// Preference key backing this field.
                    pub const [<KEY_ $field:upper>]: $crate::PrefKey<$type> =
                        $crate::PrefKey::new($saved_name);
                )*

                /// Builds the record from a snapshot. Absent keys take the field default.
                pub fn from_preferences(prefs: &$crate::Preferences) -> Self {
                    $name {
                        $(
                            $field: prefs
                                .get(&Self::[<KEY_ $field:upper>])
                                .unwrap_or_else(|| $default),
                        )*
                    }
                }

                /// Stores every field into an edit transaction.
                pub fn write_to(&self, prefs: &mut $crate::MutablePreferences) {
                    $(
                        prefs.set(
                            &Self::[<KEY_ $field:upper>],
                            ::std::clone::Clone::clone(&self.$field),
                        );
                    )*
                }

                /// Reads the record from the store's current snapshot.
                pub fn load(store: &$crate::DataStore) -> Self {
                    Self::from_preferences(&store.snapshot())
                }

                /// Writes all fields in a single atomic edit.
                pub async fn save(&self, store: &$crate::DataStore) -> ::std::result::Result<(), $crate::StoreError> {
                    store.edit(|prefs| self.write_to(prefs)).await.map(|_| ())
                }

                /// Subscribes to the record as stored.
                pub fn observe(store: &$crate::DataStore) -> $crate::Subscription<Self> {
                    store.observe(Self::from_preferences)
                }
            }
        }
    };
}
