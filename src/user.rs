//! The user record edited by the example screen.

use crate::datastore::DataStore;
use crate::error::StoreError;
use crate::preference_record;
use crate::subscription::Subscription;

/// Name of the preference group (and file) holding the user.
pub const PREFERENCES_NAME: &str = "prefs_user";

preference_record! {
    /// A user as persisted in the `prefs_user` group.
    pub struct User {
        pub name: String = String::new() => "key_name",
        pub vip: bool = false => "key_vip",
    }
}

impl User {
    pub fn new(name: impl Into<String>, vip: bool) -> Self {
        Self {
            name: name.into(),
            vip,
        }
    }
}

/// Stores both fields in one atomic edit.
pub async fn save_user(store: &DataStore, name: &str, vip: bool) -> Result<(), StoreError> {
    store
        .edit(|prefs| {
            prefs.set(&User::KEY_NAME, name.to_string());
            prefs.set(&User::KEY_VIP, vip);
        })
        .await?;
    Ok(())
}

pub fn user_stream(store: &DataStore) -> Subscription<User> {
    User::observe(store)
}
