//! Observable reads over the store's current snapshot.

use tokio::sync::watch;

use crate::preferences::Preferences;

type Mapper<T> = Box<dyn Fn(&Preferences) -> T + Send + Sync>;

/// Live view of a [`DataStore`](crate::DataStore).
///
/// The first call to [`next`](Self::next) yields the snapshot current at that
/// moment. Every later call waits for the next committed write. Writes that
/// land while nobody is polling are coalesced into the latest snapshot.
///
/// The subscription ends only when every handle to the store is gone; drop it
/// (or call [`unsubscribe`](Self::unsubscribe)) to stop listening earlier.
pub struct Subscription<T> {
    rx: watch::Receiver<Preferences>,
    map: Mapper<T>,
    primed: bool,
}

impl<T> Subscription<T> {
    pub(crate) fn new<F>(rx: watch::Receiver<Preferences>, map: F) -> Self
    where
        F: Fn(&Preferences) -> T + Send + Sync + 'static,
    {
        Self {
            rx,
            map: Box::new(map),
            primed: false,
        }
    }

    /// Waits for the next value. `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<T> {
        if self.primed {
            self.rx.changed().await.ok()?;
        } else {
            self.primed = true;
        }
        let value = (self.map)(&*self.rx.borrow_and_update());
        Some(value)
    }

    /// Transforms every emitted value.
    pub fn map<U, F>(self, f: F) -> Subscription<U>
    where
        T: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let inner = self.map;
        Subscription {
            rx: self.rx,
            map: Box::new(move |prefs| f(inner(prefs))),
            primed: self.primed,
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("primed", &self.primed)
            .finish_non_exhaustive()
    }
}
