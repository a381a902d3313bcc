//! Channel-driven reducer/effect runtime.
//!
//! A [`Feature`] describes a state machine: `reduce` applies an action to the
//! state and returns effects. A [`Store`] owns one running instance. Actions
//! go through an unbounded channel to a single consumer task, so the state is
//! only ever touched by one reducer at a time. Effects run concurrently on
//! the tokio runtime through an [`EffectHandler`]; the actions they produce
//! are fed back into the same channel. State snapshots are published on a
//! `watch` channel.

pub mod activity;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Notify};
use tracing::{debug, trace};

pub trait Feature: Send + 'static {
    type State: Clone + Send + Sync + 'static;
    type Action: std::fmt::Debug + Send + 'static;
    type Effect: std::fmt::Debug + Send + 'static;

    fn reduce(state: &mut Self::State, action: Self::Action) -> Vec<Self::Effect>;
}

/// Runs effects. Returned actions are dispatched back to the store.
pub trait EffectHandler<F: Feature>: Send + Sync + 'static {
    fn handle(&self, effect: F::Effect) -> impl Future<Output = Vec<F::Action>> + Send;
}

pub struct Store<F: Feature> {
    actions: mpsc::UnboundedSender<F::Action>,
    state: watch::Receiver<F::State>,
    tracker: Arc<Tracker>,
}

/// Counts actions queued plus effects in flight.
#[derive(Default)]
struct Tracker {
    pending: AtomicUsize,
    idle: Notify,
}

impl Tracker {
    fn begin(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl<F: Feature> Store<F> {
    /// Start the consumer loop. Must be called inside a tokio runtime.
    /// The loop stops once the store is dropped and in-flight effects finish.
    pub fn spawn<H: EffectHandler<F>>(initial: F::State, handler: H) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let tracker = Arc::new(Tracker::default());

        tokio::spawn(run_loop::<F, H>(
            initial,
            rx,
            tx.downgrade(),
            state_tx,
            Arc::new(handler),
            Arc::clone(&tracker),
        ));

        Self {
            actions: tx,
            state: state_rx,
            tracker,
        }
    }

    pub fn send(&self, action: F::Action) {
        self.tracker.begin();
        if self.actions.send(action).is_err() {
            self.tracker.finish();
        }
    }

    /// Latest published state.
    pub fn state(&self) -> F::State {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<F::State> {
        self.state.clone()
    }

    /// Wait until no action is queued and no effect is running, then return
    /// the state at that point.
    pub async fn settle(&self) -> F::State {
        loop {
            let notified = self.tracker.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.tracker.pending.load(Ordering::SeqCst) == 0 {
                return self.state();
            }
            notified.await;
        }
    }
}

async fn run_loop<F, H>(
    mut state: F::State,
    mut rx: mpsc::UnboundedReceiver<F::Action>,
    feedback: mpsc::WeakUnboundedSender<F::Action>,
    state_tx: watch::Sender<F::State>,
    handler: Arc<H>,
    tracker: Arc<Tracker>,
) where
    F: Feature,
    H: EffectHandler<F>,
{
    while let Some(action) = rx.recv().await {
        trace!(?action, "reducing");
        let effects = F::reduce(&mut state, action);
        state_tx.send_replace(state.clone());

        for effect in effects {
            debug!(?effect, "running effect");
            // counted before this action finishes so settle() never sees a gap
            tracker.begin();

            let handler = Arc::clone(&handler);
            let feedback = feedback.clone();
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move {
                let actions = handler.handle(effect).await;
                if let Some(tx) = feedback.upgrade() {
                    for action in actions {
                        tracker.begin();
                        if tx.send(action).is_err() {
                            tracker.finish();
                        }
                    }
                }
                tracker.finish();
            });
        }

        tracker.finish();
    }
    debug!("store loop stopped");
}
