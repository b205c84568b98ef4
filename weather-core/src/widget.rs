//! Runs the store's effects: spawns fetches, feeds their outcomes back in and
//! forwards notifications and failures to the observer.
//!
//! All state lives with the `Widget` owner. Fetch tasks only return their
//! tagged [`Outcome`]; nothing else touches the state concurrently.

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::{
    model::UnitSystem,
    observer::WidgetObserver,
    provider::WeatherProvider,
    store::{Action, Effect, Outcome, Request, Store, WidgetState},
};

pub struct Widget {
    provider: Arc<dyn WeatherProvider>,
    observer: Arc<dyn WidgetObserver>,
    store: Store,
    tasks: JoinSet<Outcome>,
}

impl Widget {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        observer: Arc<dyn WidgetObserver>,
        location: impl Into<String>,
        units: UnitSystem,
    ) -> Self {
        Self {
            provider,
            observer,
            store: Store::new(WidgetState::new(location, units)),
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &WidgetState {
        self.store.state()
    }

    /// Number of fetches started but not yet applied.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Must be called from within a tokio runtime; fetches are spawned onto it.
    pub fn dispatch(&mut self, action: Action) {
        for effect in self.store.dispatch(action) {
            match effect {
                Effect::Fetch(request) => self.spawn(request),
                Effect::Notify(notification) => self.observer.notify(&notification),
                Effect::Report { endpoint, error } => self.observer.fetch_failed(endpoint, &error),
            }
        }
    }

    pub fn load(&mut self) {
        self.dispatch(Action::Load);
    }

    pub fn edit_location(&mut self, text: impl Into<String>) {
        self.dispatch(Action::EditLocation(text.into()));
    }

    pub fn search(&mut self) {
        self.dispatch(Action::Search);
    }

    pub fn toggle_units(&mut self) {
        self.dispatch(Action::ToggleUnits);
    }

    fn spawn(&mut self, request: Request) {
        tracing::debug!(endpoint = %request.endpoint(), token = ?request.token(), "issuing fetch");
        let provider = Arc::clone(&self.provider);

        self.tasks.spawn(async move {
            match request {
                Request::Current { token, location, units } => Outcome::Current {
                    token,
                    result: provider.current(&location, units).await,
                },
                Request::Hourly { token, coordinates, units } => Outcome::Hourly {
                    token,
                    result: provider.hourly(coordinates, units).await,
                },
                Request::Daily { token, coordinates, units } => Outcome::Daily {
                    token,
                    result: provider.daily(coordinates, units).await,
                },
            }
        });
    }

    /// Wait for the next fetch to finish and apply it. Returns `false` when
    /// nothing is in flight.
    pub async fn step(&mut self) -> bool {
        match self.tasks.join_next().await {
            Some(Ok(outcome)) => {
                self.dispatch(Action::Resolved(outcome));
                true
            }
            Some(Err(err)) => {
                tracing::error!(error = %err, "fetch task did not complete");
                true
            }
            None => false,
        }
    }

    /// Apply outcomes until no fetch is left, including the forecast fetches
    /// a current-weather update cascades into.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }
}

impl std::fmt::Debug for Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("provider", &self.provider)
            .field("state", self.store.state())
            .field("in_flight", &self.tasks.len())
            .finish()
    }
}
