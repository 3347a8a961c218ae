//! Async driver for one search session.
//!
//! A session is a single tokio task that owns the [`CriteriaStore`], the
//! [`QueryCoalescer`] and the [`ResultsController`]. Callers talk to it through
//! a cloneable [`SessionHandle`]. Fetches run in spawned tasks and report back
//! over a channel, so every state transition happens on the session task.

use crate::core::coalescer::{
    OutboundQuery, QueryCoalescer, QueryKind, QuerySeq, ResponseDisposition, TimerToken,
};
use crate::core::criteria::{CriteriaChanged, CriteriaStore, CriteriaUpdate, FeeBounds, FilterCriteria};
use crate::core::results::{ResultsController, ResultsView};
use crate::domain::model::CatalogItem;
use crate::domain::ports::CatalogService;
use crate::utils::error::{FinderError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Delay after the last edit before a query is sent.
    pub quiescence: Duration,
    /// Hard-abort superseded fetches. Stale responses are discarded either way.
    pub abort_superseded: bool,
    pub fee_bounds: FeeBounds,
    /// Issue the unfiltered listing as soon as the session starts.
    pub load_listing_on_start: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            quiescence: Duration::from_millis(300),
            abort_superseded: true,
            fee_bounds: FeeBounds::default(),
            load_listing_on_start: true,
        }
    }
}

enum Command {
    Update {
        update: CriteriaUpdate,
        applied: oneshot::Sender<CriteriaChanged>,
    },
    Shutdown,
}

struct Fetched {
    seq: QuerySeq,
    outcome: Result<Vec<CatalogItem>>,
}

#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    results: watch::Receiver<ResultsView>,
    criteria: watch::Receiver<FilterCriteria>,
}

impl SessionHandle {
    /// Sends one edit and waits until the session has applied it.
    pub async fn update(&self, update: CriteriaUpdate) -> Result<CriteriaChanged> {
        let (applied, confirmation) = oneshot::channel();
        self.commands
            .send(Command::Update { update, applied })
            .await
            .map_err(|_| FinderError::SessionClosed)?;
        confirmation.await.map_err(|_| FinderError::SessionClosed)
    }

    pub fn results(&self) -> watch::Receiver<ResultsView> {
        self.results.clone()
    }

    pub fn criteria(&self) -> watch::Receiver<FilterCriteria> {
        self.criteria.clone()
    }

    pub fn current_results(&self) -> ResultsView {
        self.results.borrow().clone()
    }

    /// Waits until no query is loading and some result or error is shown.
    pub async fn settled(&self) -> Result<ResultsView> {
        let mut results = self.results.clone();
        let view = results
            .wait_for(ResultsView::is_settled)
            .await
            .map_err(|_| FinderError::SessionClosed)?;
        Ok(view.clone())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| FinderError::SessionClosed)
    }
}

pub struct FinderSession {
    service: Arc<dyn CatalogService>,
    options: SessionOptions,
    store: CriteriaStore,
    coalescer: QueryCoalescer,
    results: ResultsController,
    criteria_tx: watch::Sender<FilterCriteria>,
    commands: mpsc::Receiver<Command>,
    fetched_tx: mpsc::UnboundedSender<Fetched>,
    fetched_rx: mpsc::UnboundedReceiver<Fetched>,
    in_flight: HashMap<QuerySeq, JoinHandle<()>>,
}

impl FinderSession {
    /// Starts a session on the current tokio runtime.
    pub fn spawn(
        service: Arc<dyn CatalogService>,
        options: SessionOptions,
    ) -> (SessionHandle, JoinHandle<()>) {
        let store = CriteriaStore::new(options.fee_bounds);
        let (criteria_tx, criteria_rx) = watch::channel(store.current().clone());
        let (results, results_rx) = ResultsController::new();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (fetched_tx, fetched_rx) = mpsc::unbounded_channel();

        let session = Self {
            service,
            options,
            store,
            coalescer: QueryCoalescer::new(),
            results,
            criteria_tx,
            commands: commands_rx,
            fetched_tx,
            fetched_rx,
            in_flight: HashMap::new(),
        };

        let handle = SessionHandle {
            commands: commands_tx,
            results: results_rx,
            criteria: criteria_rx,
        };
        (handle, tokio::spawn(session.run()))
    }

    async fn run(mut self) {
        tracing::info!(
            "🔎 Search session started (quiescence: {:?}, abort superseded: {})",
            self.options.quiescence,
            self.options.abort_superseded
        );

        let timer = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(timer);
        let mut armed: Option<TimerToken> = None;

        if self.options.load_listing_on_start {
            if let Some(query) = self.coalescer.issue_listing() {
                self.dispatch(query);
            }
        }

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Update { update, applied }) => {
                        let changed = self.store.update(update);
                        self.criteria_tx.send_replace(changed.criteria.clone());
                        if let Some(rearmed) = self.coalescer.on_criteria_changed(changed.criteria.clone()) {
                            timer.as_mut().reset(Instant::now() + self.options.quiescence);
                            armed = Some(rearmed.token);
                            if let Some(seq) = rearmed.superseded {
                                self.supersede(seq);
                            }
                            self.results.mark_loading();
                        }
                        // The caller may have stopped waiting.
                        let _ = applied.send(changed);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                () = &mut timer, if armed.is_some() => {
                    if let Some(query) = armed.take().and_then(|token| self.coalescer.on_timer_fired(token)) {
                        self.dispatch(query);
                    }
                }
                Some(fetched) = self.fetched_rx.recv() => {
                    self.in_flight.remove(&fetched.seq);
                    match self.coalescer.on_response(fetched.seq) {
                        ResponseDisposition::Publish => {
                            self.results.apply(fetched.seq, fetched.outcome, self.store.current());
                        }
                        ResponseDisposition::Discard => {}
                    }
                }
            }
        }

        self.teardown();
    }

    fn dispatch(&mut self, query: OutboundQuery) {
        self.results.mark_loading();

        let service = Arc::clone(&self.service);
        let fetched_tx = self.fetched_tx.clone();
        let seq = query.seq;
        tracing::debug!("📡 Dispatching query {}", seq);

        let task = tokio::spawn(async move {
            let outcome = match &query.kind {
                QueryKind::Listing => service.list_all().await,
                QueryKind::Filtered(criteria) => service.query(criteria).await,
            };
            // A closed channel means the session is gone; the response is dropped.
            let _ = fetched_tx.send(Fetched { seq, outcome });
        });
        self.in_flight.insert(seq, task);
    }

    fn supersede(&mut self, seq: QuerySeq) {
        if !self.options.abort_superseded {
            return;
        }
        if let Some(task) = self.in_flight.remove(&seq) {
            task.abort();
            tracing::debug!("🛑 Aborted superseded query {}", seq);
        }
    }

    fn teardown(&mut self) {
        let abandoned = self.coalescer.teardown();
        if self.options.abort_superseded {
            for (_, task) in self.in_flight.drain() {
                task.abort();
            }
        } else {
            self.in_flight.clear();
        }
        tracing::info!(
            "👋 Search session closed (abandoned query: {:?}, last issued: {:?})",
            abandoned,
            self.coalescer.last_issued()
        );
    }
}
