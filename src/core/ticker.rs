// src/core/ticker.rs — Wall-clock tick source driving a call session

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::meter::CallSession;
use super::types::{EndReason, FinalizedSession, MeterEvent, TickResult};

fn lock(session: &Mutex<CallSession>) -> MutexGuard<'_, CallSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Control side of a running session.
///
/// `end` may race with a tick already in flight; the session's own
/// idempotent `end` settles the race, so no tick is billed after the
/// record is finalized.
pub struct SessionHandle {
    session_id: String,
    session: Arc<Mutex<CallSession>>,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Start ticking `session` once per `period`. Events stream on the returned
/// receiver and always finish with `MeterEvent::Ended`.
pub fn spawn_session(
    session: CallSession,
    period: Duration,
) -> (SessionHandle, mpsc::UnboundedReceiver<MeterEvent>) {
    let session_id = session.id().to_string();
    let session = Arc::new(Mutex::new(session));
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let task = tokio::spawn(run_ticks(session.clone(), period, cancel_rx, event_tx));

    let handle = SessionHandle {
        session_id,
        session,
        cancel: cancel_tx,
        task,
    };
    (handle, event_rx)
}

async fn run_ticks(
    session: Arc<Mutex<CallSession>>,
    period: Duration,
    mut cancel: watch::Receiver<bool>,
    events: mpsc::UnboundedSender<MeterEvent>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Consume the immediate first tick
    interval.tick().await;

    let mut low_balance_sent = false;

    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => {
                // Handle dropped or `end` called: make sure the session is closed.
                lock(&session).end(EndReason::User);
                break;
            }
            _ = interval.tick() => {
                let result = lock(&session).tick();
                let Ok(result) = result else {
                    // Ended by the handle between two ticks.
                    break;
                };
                let _ = events.send(MeterEvent::Tick(result.clone()));
                if result.low_balance && !low_balance_sent {
                    low_balance_sent = true;
                    tracing::warn!(
                        remaining = result.projected_remaining,
                        "low balance"
                    );
                    let _ = events.send(MeterEvent::LowBalance(result.clone()));
                }
                if result.should_terminate {
                    break;
                }
            }
        }
    }

    if let Some(finalized) = lock(&session).finalized().cloned() {
        let _ = events.send(MeterEvent::Ended(finalized));
    }
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn snapshot(&self) -> TickResult {
        lock(&self.session).snapshot()
    }

    pub fn is_active(&self) -> bool {
        lock(&self.session).is_active()
    }

    /// End the call and stop the timer. Returns the same record on every
    /// call, including after the session ran out of funds on its own.
    pub fn end(&self, reason: EndReason) -> FinalizedSession {
        let finalized = lock(&self.session).end(reason);
        let _ = self.cancel.send(true);
        finalized
    }

    /// Wait for the tick task to finish and return the final record.
    pub async fn wait(self) -> FinalizedSession {
        let SessionHandle {
            session,
            cancel,
            task,
            ..
        } = self;
        if let Err(e) = task.await {
            tracing::error!("tick task failed: {}", e);
        }
        drop(cancel);
        let finalized = lock(&session).end(EndReason::User);
        finalized
    }
}
