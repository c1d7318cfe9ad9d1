//! Runs a [`WindowStore`] on its own task.
//!
//! The driver is the single writer: events from handles, fetch results
//! and debounce deadlines are serialized through one `select!` loop.
//! Fetches run as separate tasks and report back through a channel.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, trace};
use wincache_core::{Effect, Event, FetchRequest, Filter, WindowState, WindowStore};
use wincache_model::{Entity, LoadStatus};

use crate::error::{Result, RuntimeError, SourceError};
use crate::source::EntitySource;

const COMMAND_BUFFER: usize = 256;

type Query<T, F> = Box<dyn FnOnce(&WindowState<T, F>) + Send>;

enum Command<T: Entity, F: Filter> {
    Dispatch(Event<T, F>),
    Query(Query<T, F>),
    Settled(oneshot::Sender<std::result::Result<(), SourceError>>),
    Shutdown,
}

/// Cloneable handle to a running store.
#[derive(Clone)]
pub struct StoreHandle<T: Entity, F: Filter> {
    commands: mpsc::Sender<Command<T, F>>,
}

impl<T, F> StoreHandle<T, F>
where
    T: Entity + Send + 'static,
    T::Delta: Send,
    F: Filter + Send + 'static,
    F::Patch: Send,
{
    /// Queue an event.
    pub async fn dispatch(&self, event: Event<T, F>) -> Result<()> {
        self.send(Command::Dispatch(event)).await
    }

    /// Run `query` against the current state.
    pub async fn query<R>(
        &self,
        query: impl FnOnce(&WindowState<T, F>) -> R + Send + 'static,
    ) -> Result<R>
    where
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let query: Query<T, F> = Box::new(move |state: &WindowState<T, F>| {
            let _ = tx.send(query(state));
        });
        self.send(Command::Query(query)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)
    }

    /// Wait until no fetch is outstanding and no filter change is pending.
    ///
    /// Fails when the store ends up in the failed state.
    pub async fn settled(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Settled(tx)).await?;
        rx.await.map_err(|_| RuntimeError::Closed)??;
        Ok(())
    }

    /// Stop the driver. Queued commands ahead of this one still run.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command<T, F>) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RuntimeError::Closed)
    }
}

impl<T: Entity, F: Filter> std::fmt::Debug for StoreHandle<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("closed", &self.commands.is_closed())
            .finish()
    }
}

/// Move `store` onto a new task that fetches through `source`.
///
/// The join handle yields the store back once the driver stops.
pub fn spawn_store<T, F, S>(
    store: WindowStore<T, F>,
    source: Arc<S>,
) -> (StoreHandle<T, F>, JoinHandle<WindowStore<T, F>>)
where
    T: Entity + Send + 'static,
    T::Delta: Send,
    F: Filter + Send + 'static,
    F::Patch: Send,
    S: EntitySource<T, F>,
{
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let (results_tx, results_rx) = mpsc::unbounded_channel();
    let driver = Driver {
        store,
        source,
        commands: commands_rx,
        results_tx,
        results_rx,
        waiters: Vec::new(),
    };
    let task = tokio::spawn(driver.run());
    (
        StoreHandle {
            commands: commands_tx,
        },
        task,
    )
}

struct Driver<T: Entity, F: Filter, S> {
    store: WindowStore<T, F>,
    source: Arc<S>,
    commands: mpsc::Receiver<Command<T, F>>,
    results_tx: mpsc::UnboundedSender<Event<T, F>>,
    results_rx: mpsc::UnboundedReceiver<Event<T, F>>,
    waiters: Vec<oneshot::Sender<std::result::Result<(), SourceError>>>,
}

impl<T, F, S> Driver<T, F, S>
where
    T: Entity + Send + 'static,
    T::Delta: Send,
    F: Filter + Send + 'static,
    F::Patch: Send,
    S: EntitySource<T, F>,
{
    async fn run(mut self) -> WindowStore<T, F> {
        debug!("store driver started");
        loop {
            let deadline = self.store.next_deadline().map(Instant::from_std);
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Dispatch(event)) => self.dispatch(event),
                    Some(Command::Query(query)) => query(self.store.state()),
                    Some(Command::Settled(waiter)) => self.waiters.push(waiter),
                    Some(Command::Shutdown) | None => break,
                },
                Some(event) = self.results_rx.recv() => self.dispatch(event),
                () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    let effects = self.store.tick(now());
                    self.run_effects(effects);
                }
            }
            self.notify_settled();
        }
        debug!("store driver stopped");
        self.store
    }

    fn dispatch(&mut self, event: Event<T, F>) {
        let effects = self.store.dispatch(event, now());
        self.run_effects(effects);
    }

    fn run_effects(&self, effects: Vec<Effect<F>>) {
        for effect in effects {
            match effect {
                Effect::Fetch(request) => self.spawn_fetch(request),
                Effect::PageSatisfied { page } => trace!(page, "page served from cache"),
            }
        }
    }

    fn spawn_fetch(&self, request: FetchRequest<F>) {
        let source = Arc::clone(&self.source);
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let ticket = request.ticket;
            let kind = request.kind;
            let event = match source.fetch(request).await {
                Ok(result) => Event::LoadSuccess {
                    ticket,
                    entities: result.entities,
                    total: result.total,
                    has_more: result.has_more,
                },
                Err(err) => {
                    debug!(ticket = ticket.0, kind = kind.as_str(), error = %err, "source fetch failed");
                    Event::LoadFail {
                        ticket,
                        error: Some(err.to_string()),
                    }
                }
            };
            // The driver may already have stopped.
            let _ = results.send(event);
        });
    }

    fn notify_settled(&mut self) {
        if self.waiters.is_empty()
            || self.store.state().pending.is_some()
            || self.store.next_deadline().is_some()
        {
            return;
        }
        let outcome = match &self.store.state().status {
            LoadStatus::Fail { error } => Err(SourceError::new(
                error.clone().unwrap_or_else(|| "fetch failed".to_string()),
            )),
            _ => Ok(()),
        };
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}
