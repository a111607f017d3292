//! Save-and-reload: the work done each time the user presses Save.
//!
//! 1. Write the name and VIP flag to the store.
//! 2. Wait a fixed delay.
//! 3. Follow the stored user: every emission updates the displayed response,
//!    and every emission with the VIP flag set raises a notification.
//!
//! Step 3 never finishes on its own. It keeps reporting later writes, including
//! ones made elsewhere, until the flow is cancelled or the screen stops
//! listening. Overlapping flows (a double press) are not serialized against
//! each other.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::datastore::DataStore;
use crate::error::StoreError;
use crate::user::{save_user, user_stream};

/// Text of the notification shown for a VIP user.
pub const VIP_MESSAGE: &str = "is VIP";

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Display update sent from a flow to the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowUpdate {
    Response(String),
    Notify(&'static str),
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("save flow was cancelled")]
    Cancelled,

    #[error("save flow panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone)]
pub struct SaveFlow {
    store: DataStore,
    delay: Duration,
    updates: mpsc::UnboundedSender<FlowUpdate>,
}

impl SaveFlow {
    pub fn new(store: DataStore, updates: mpsc::UnboundedSender<FlowUpdate>) -> Self {
        Self {
            store,
            delay: DEFAULT_DELAY,
            updates,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Runs the flow on a background task.
    pub fn launch(&self, name: String, vip: bool) -> FlowHandle {
        let flow = self.clone();
        FlowHandle {
            task: tokio::spawn(async move { flow.run(&name, vip).await }),
        }
    }

    /// Runs the flow in place. Returns only on a store error or once the
    /// receiving end of the update channel is gone.
    pub async fn run(&self, name: &str, vip: bool) -> Result<(), FlowError> {
        tracing::info!(name_len = name.len(), vip, "saving user");
        save_user(&self.store, name, vip).await?;

        tokio::time::sleep(self.delay).await;

        let mut users = user_stream(&self.store);
        while let Some(user) = users.next().await {
            tracing::debug!(vip = user.vip, "stored user emitted");
            if self.updates.send(FlowUpdate::Response(user.name)).is_err() {
                break;
            }
            if user.vip && self.updates.send(FlowUpdate::Notify(VIP_MESSAGE)).is_err() {
                break;
            }
        }
        tracing::debug!("save flow stopped listening");
        Ok(())
    }
}

/// Handle to a launched flow. Dropping it leaves the flow running.
#[derive(Debug)]
pub struct FlowHandle {
    task: JoinHandle<Result<(), FlowError>>,
}

impl FlowHandle {
    /// Stops the flow, dropping its store subscription.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the flow to end and surfaces its outcome.
    pub async fn join(self) -> Result<(), FlowError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(FlowError::Cancelled),
            Err(e) => Err(FlowError::Panicked(e.to_string())),
        }
    }
}
