use axum::http::StatusCode;
use bustrack::prelude::*;
use crossbeam_queue::SegQueue;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{
    runtime::Handle,
    task::AbortHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info};

struct Timer {
    generation: u64,
    handle: AbortHandle,
}

pub struct AppState {
    session: Mutex<Session<MbtaGateway>>,
    /// Lines spoken by tracking polls, waiting for `GET /speech`.
    pub speech: SegQueue<Dialog>,
    timers: Mutex<HashMap<String, Timer>>,
    generation: AtomicU64,
    runtime: Handle,
}

impl AppState {
    pub fn new(session: Session<MbtaGateway>, runtime: Handle) -> Self {
        Self {
            session: Mutex::new(session),
            speech: SegQueue::new(),
            timers: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            runtime,
        }
    }

    /// Runs `f` on the blocking pool with exclusive access to the session.
    /// Returns its result along with every line spoken meanwhile.
    pub async fn converse<F, R>(self: &Arc<Self>, f: F) -> Result<(R, Vec<Dialog>), StatusCode>
    where
        F: FnOnce(&mut Session<MbtaGateway>, &mut ServerHost) -> R + Send + 'static,
        R: Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut session = state.session.lock().map_err(|_| {
                error!("Session lock poisoned");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
            let mut host = ServerHost::new(state.clone());
            let result = f(&mut *session, &mut host);
            Ok((result, host.spoken))
        })
        .await
        .map_err(|err| {
            error!("Session task failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
    }

    fn schedule(self: &Arc<Self>, name: &str, interval: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let state = self.clone();
        let event = name.to_string();
        let task = self.runtime.spawn(async move {
            let mut ticks = time::interval(interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let state = state.clone();
                let event = event.clone();
                if let Err(err) =
                    tokio::task::spawn_blocking(move || state.tick(&event, generation)).await
                {
                    error!("Tracking tick failed: {err}");
                }
            }
        });

        let Ok(mut timers) = self.timers.lock() else {
            error!("Timer lock poisoned");
            task.abort();
            return;
        };
        let timer = Timer {
            generation,
            handle: task.abort_handle(),
        };
        if let Some(previous) = timers.insert(name.to_string(), timer) {
            previous.handle.abort();
        }
        info!("Scheduled {name} every {interval:?}");
    }

    fn cancel(&self, name: &str) {
        let Ok(mut timers) = self.timers.lock() else {
            error!("Timer lock poisoned");
            return;
        };
        if let Some(timer) = timers.remove(name) {
            timer.handle.abort();
            info!("Cancelled {name}");
        }
    }

    fn is_current(&self, name: &str, generation: u64) -> bool {
        self.timers
            .lock()
            .map(|timers| timers.get(name).is_some_and(|t| t.generation == generation))
            .unwrap_or(false)
    }

    /// One tracking poll. A tick that lost the race against a cancel or a
    /// newer schedule of the same event does nothing.
    fn tick(self: &Arc<Self>, name: &str, generation: u64) {
        let Ok(mut session) = self.session.lock() else {
            error!("Session lock poisoned");
            return;
        };
        if !self.is_current(name, generation) {
            debug!("Dropping stale {name} tick");
            return;
        }
        let mut host = ServerHost::new(self.clone());
        session.tracking_tick(&mut host);
        for line in host.spoken {
            self.speech.push(line);
        }
    }
}

/// [`Host`] backed by the server state. Spoken lines are buffered on the host
/// and handed to whoever drove the session.
pub struct ServerHost {
    state: Arc<AppState>,
    spoken: Vec<Dialog>,
}

impl ServerHost {
    fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            spoken: Vec::new(),
        }
    }
}

impl Host for ServerHost {
    fn speak(&mut self, dialog: Dialog) {
        debug!("Speaking: {dialog}");
        self.spoken.push(dialog);
    }

    fn schedule_repeating(&mut self, name: &str, interval: Duration) {
        self.state.schedule(name, interval);
    }

    fn cancel_scheduled(&mut self, name: &str) {
        self.state.cancel(name);
    }

    fn register_vocabulary(&mut self, term: &str, kind: &str) {
        info!("Vocabulary {kind}: {term}");
    }
}
