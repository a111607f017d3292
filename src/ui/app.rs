//! Event loop tying the form, the reducer and the save flow together.
//!
//! All state changes happen on the loop task. Save flows run in the background
//! and report back through a channel, so they never touch the screen state
//! directly.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc;

use super::form::{self, FormAction, FormProps};
use super::intent::ScreenIntent;
use super::mvi::Reducer;
use super::reducer::ScreenReducer;
use super::state::ScreenState;
use super::terminal_guard::setup_terminal;
use crate::datastore::DataStore;
use crate::flow::{FlowHandle, FlowUpdate, SaveFlow, DEFAULT_DELAY};

const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Pause between the write and the read-back.
    pub delay: Duration,
    /// How long a toast stays visible.
    pub toast_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            toast_duration: Duration::from_millis(2000),
        }
    }
}

/// Screen controller: owns the state and the flows started from it.
pub struct Screen {
    state: ScreenState,
    flow: SaveFlow,
    flows: Vec<FlowHandle>,
    toast_duration: Duration,
}

impl Screen {
    pub fn new(flow: SaveFlow, toast_duration: Duration) -> Self {
        Self {
            state: ScreenState::default(),
            flow,
            flows: Vec::new(),
            toast_duration,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    fn apply(&mut self, intent: ScreenIntent) {
        let state = std::mem::take(&mut self.state);
        self.state = ScreenReducer::reduce(state, intent);
    }

    /// Handles a key press. `Break` means the user asked to leave.
    pub fn on_key(&mut self, key: KeyEvent) -> ControlFlow<()> {
        let Some(action) = form::handle_key(&FormProps::from(&self.state), key) else {
            return ControlFlow::Continue(());
        };
        match action {
            FormAction::Quit => return ControlFlow::Break(()),
            FormAction::SaveRequested => {
                // Presses are not debounced; each one starts its own flow.
                let handle = self.flow.launch(self.state.name.clone(), self.state.vip);
                self.flows.push(handle);
            }
            other => {
                if let Some(intent) = other.into_intent() {
                    self.apply(intent);
                }
            }
        }
        ControlFlow::Continue(())
    }

    pub fn on_flow_update(&mut self, update: FlowUpdate, now: Instant) {
        let intent = match update {
            FlowUpdate::Response(name) => ScreenIntent::ResponseLoaded(name),
            FlowUpdate::Notify(message) => ScreenIntent::ShowToast {
                message: message.to_string(),
                expires_at: now + self.toast_duration,
            },
        };
        self.apply(intent);
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.apply(ScreenIntent::Tick { now });
    }

    /// Number of flows still following the store.
    pub fn live_flows(&self) -> usize {
        self.flows.iter().filter(|h| !h.is_finished()).count()
    }

    /// Collects flows that ended and logs the ones that failed.
    pub async fn reap_finished(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) =
            self.flows.drain(..).partition(FlowHandle::is_finished);
        self.flows = running;
        for handle in done {
            if let Err(e) = handle.join().await {
                tracing::error!(error = %e, "save flow failed");
            }
        }
    }

    /// Cancels every flow started from this screen.
    pub fn close(self) {
        for handle in &self.flows {
            handle.cancel();
        }
        tracing::debug!(flows = self.flows.len(), "screen closed");
    }
}

/// Reads terminal events on a plain thread until `stop` is set or the
/// receiver goes away.
fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>, stop: Arc<AtomicBool>) {
    thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(TICK_RATE) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "terminal read failed");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, "terminal poll failed");
                    break;
                }
            }
        }
    });
}

/// Runs the form until the user quits.
pub async fn run(store: DataStore, config: AppConfig) -> anyhow::Result<()> {
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let flow = SaveFlow::new(store, update_tx).with_delay(config.delay);
    let mut screen = Screen::new(flow, config.toast_duration);

    let (mut terminal, _guard) = setup_terminal()?;

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let stop = Arc::new(AtomicBool::new(false));
    spawn_input_reader(input_tx, Arc::clone(&stop));

    let mut ticker = tokio::time::interval(TICK_RATE);
    loop {
        terminal.draw(|frame| form::render(frame, &FormProps::from(screen.state())))?;

        tokio::select! {
            input = input_rx.recv() => match input {
                Some(Event::Key(key)) => {
                    if screen.on_key(key).is_break() {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            },
            Some(update) = update_rx.recv() => {
                screen.on_flow_update(update, Instant::now());
            }
            _ = ticker.tick() => {
                screen.on_tick(Instant::now());
                screen.reap_finished().await;
            }
        }
    }

    stop.store(true, Ordering::Relaxed);
    screen.close();
    Ok(())
}
