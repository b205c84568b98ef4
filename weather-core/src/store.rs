//! Widget state and the rules that keep it consistent.
//!
//! [`Store::dispatch`] is the single entry point for every change. It never
//! performs I/O: it mutates [`WidgetState`] and returns the [`Effect`]s the
//! caller must carry out (fetches to start, notifications to show, failures to
//! report). Fetch results come back in as [`Action::Resolved`].
//!
//! Dependency graph:
//! - search / load / unit toggle -> current weather fetch
//! - current weather update -> hourly fetch + daily fetch
//!
//! Every field owns a request token. Results carrying a token older than the
//! latest one issued for their field are dropped.

use std::time::Duration;

use crate::{
    error::{Endpoint, FetchError},
    model::{
        Coordinates, CurrentLookup, CurrentWeather, DailyEntry, HourlyEntry, MinMaxTemp,
        UnitSystem,
    },
};

pub const MAX_HOURLY: usize = 6;
pub const MAX_DAILY: usize = 7;

pub const NOT_FOUND_NOTICE: &str = "City not found.";
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    /// Search-box text. Edited freely, only read when a search is submitted.
    pub location: String,
    /// Query of the last successful lookup; reused by load and unit toggle.
    pub query: String,
    /// Canonical name from the last successful lookup.
    pub display_location: String,
    pub units: UnitSystem,
    pub current: Option<CurrentWeather>,
    pub hourly: Option<Vec<HourlyEntry>>,
    pub daily: Option<Vec<DailyEntry>>,
    pub min_max: Option<MinMaxTemp>,
}

impl WidgetState {
    pub fn new(location: impl Into<String>, units: UnitSystem) -> Self {
        let location = location.into();
        Self {
            query: location.clone(),
            display_location: location.clone(),
            location,
            units,
            current: None,
            hourly: None,
            daily: None,
            min_max: None,
        }
    }
}

/// Identifies one issued fetch. Only the latest token per field is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
struct Tokens {
    current: u64,
    hourly: u64,
    daily: u64,
}

impl Tokens {
    fn slot(&mut self, endpoint: Endpoint) -> &mut u64 {
        match endpoint {
            Endpoint::Current => &mut self.current,
            Endpoint::Hourly => &mut self.hourly,
            Endpoint::Daily => &mut self.daily,
        }
    }

    fn issue(&mut self, endpoint: Endpoint) -> RequestToken {
        let slot = self.slot(endpoint);
        *slot += 1;
        RequestToken(*slot)
    }

    fn is_latest(&mut self, endpoint: Endpoint, token: RequestToken) -> bool {
        *self.slot(endpoint) == token.0
    }
}

/// A fetch the runner must start.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Current {
        token: RequestToken,
        location: String,
        units: UnitSystem,
    },
    Hourly {
        token: RequestToken,
        coordinates: Coordinates,
        units: UnitSystem,
    },
    Daily {
        token: RequestToken,
        coordinates: Coordinates,
        units: UnitSystem,
    },
}

impl Request {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Request::Current { .. } => Endpoint::Current,
            Request::Hourly { .. } => Endpoint::Hourly,
            Request::Daily { .. } => Endpoint::Daily,
        }
    }

    pub fn token(&self) -> RequestToken {
        match self {
            Request::Current { token, .. }
            | Request::Hourly { token, .. }
            | Request::Daily { token, .. } => *token,
        }
    }
}

/// The result of a [`Request`], tagged with the token it was issued under.
#[derive(Debug)]
pub enum Outcome {
    Current {
        token: RequestToken,
        result: Result<CurrentLookup, FetchError>,
    },
    Hourly {
        token: RequestToken,
        result: Result<Vec<HourlyEntry>, FetchError>,
    },
    Daily {
        token: RequestToken,
        result: Result<Vec<DailyEntry>, FetchError>,
    },
}

impl Outcome {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Outcome::Current { .. } => Endpoint::Current,
            Outcome::Hourly { .. } => Endpoint::Hourly,
            Outcome::Daily { .. } => Endpoint::Daily,
        }
    }

    pub fn token(&self) -> RequestToken {
        match self {
            Outcome::Current { token, .. }
            | Outcome::Hourly { token, .. }
            | Outcome::Daily { token, .. } => *token,
        }
    }
}

/// Transient, auto-dismissed error message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub ttl: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ttl: NOTICE_TTL }
    }
}

#[derive(Debug)]
pub enum Action {
    /// Fetch current weather for the committed query (startup, manual refresh).
    Load,
    /// The search box text changed. No fetch.
    EditLocation(String),
    /// Look up the search box text. It becomes the query once found.
    Search,
    ToggleUnits,
    Resolved(Outcome),
}

#[derive(Debug)]
pub enum Effect {
    Fetch(Request),
    Notify(Notification),
    Report {
        endpoint: Endpoint,
        error: FetchError,
    },
}

#[derive(Debug)]
pub struct Store {
    state: WidgetState,
    tokens: Tokens,
    /// Location of the latest current-weather request.
    pending_query: String,
}

impl Store {
    pub fn new(state: WidgetState) -> Self {
        Self {
            pending_query: state.query.clone(),
            state,
            tokens: Tokens::default(),
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Load => vec![self.fetch_current(self.state.query.clone())],
            Action::EditLocation(text) => {
                self.state.location = text;
                Vec::new()
            }
            Action::Search => vec![self.fetch_current(self.state.location.clone())],
            Action::ToggleUnits => {
                self.state.units = self.state.units.toggled();
                // Forecasts in flight were requested in the old units.
                self.tokens.issue(Endpoint::Hourly);
                self.tokens.issue(Endpoint::Daily);
                vec![self.fetch_current(self.state.query.clone())]
            }
            Action::Resolved(outcome) => self.resolve(outcome),
        }
    }

    fn fetch_current(&mut self, location: String) -> Effect {
        self.pending_query.clone_from(&location);
        Effect::Fetch(Request::Current {
            token: self.tokens.issue(Endpoint::Current),
            location,
            units: self.state.units,
        })
    }

    fn fetch_forecasts(&mut self) -> Vec<Effect> {
        let Some(coordinates) = self.state.current.as_ref().and_then(|c| c.coordinates) else {
            tracing::debug!("no coordinates yet, skipping forecast fetch");
            return Vec::new();
        };
        let units = self.state.units;

        vec![
            Effect::Fetch(Request::Hourly {
                token: self.tokens.issue(Endpoint::Hourly),
                coordinates,
                units,
            }),
            Effect::Fetch(Request::Daily {
                token: self.tokens.issue(Endpoint::Daily),
                coordinates,
                units,
            }),
        ]
    }

    fn resolve(&mut self, outcome: Outcome) -> Vec<Effect> {
        let endpoint = outcome.endpoint();
        if !self.tokens.is_latest(endpoint, outcome.token()) {
            tracing::debug!(%endpoint, token = ?outcome.token(), "discarding superseded response");
            return Vec::new();
        }

        match outcome {
            Outcome::Current { result, .. } => match result {
                Ok(CurrentLookup::Found(current)) => {
                    self.state.query = std::mem::take(&mut self.pending_query);
                    self.state.display_location = current.name.clone();
                    self.state.current = Some(current);
                    self.fetch_forecasts()
                }
                Ok(CurrentLookup::NotFound) => {
                    vec![Effect::Notify(Notification::new(NOT_FOUND_NOTICE))]
                }
                Err(error) => {
                    self.state.current = None;
                    vec![Effect::Report { endpoint, error }]
                }
            },
            Outcome::Hourly { result, .. } => match result {
                Ok(mut hourly) => {
                    hourly.truncate(MAX_HOURLY);
                    self.state.hourly = Some(hourly);
                    Vec::new()
                }
                Err(error) => vec![Effect::Report { endpoint, error }],
            },
            Outcome::Daily { result, .. } => match result {
                Ok(mut daily) => {
                    daily.truncate(MAX_DAILY);
                    self.state.min_max = daily.first().map(MinMaxTemp::from);
                    self.state.daily = Some(daily);
                    Vec::new()
                }
                Err(error) => vec![Effect::Report { endpoint, error }],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn weather(name: &str, coordinates: Option<Coordinates>) -> CurrentWeather {
        CurrentWeather {
            name: name.to_string(),
            temperature: 25.0,
            description: Some("clear sky".into()),
            icon: Some("01d".into()),
            humidity: Some(40),
            wind_speed: Some(3.1),
            wind_deg: Some(180.0),
            coordinates,
        }
    }

    const DELHI: Coordinates = Coordinates { lat: 28.66, lon: 77.23 };

    fn status_error(endpoint: Endpoint) -> FetchError {
        FetchError::Status {
            endpoint,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        }
    }

    fn requests(effects: &[Effect]) -> Vec<&Request> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Fetch(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    fn single_request(effects: Vec<Effect>) -> Request {
        let mut effects = effects.into_iter();
        match (effects.next(), effects.next()) {
            (Some(Effect::Fetch(r)), None) => r,
            other => panic!("expected exactly one fetch, got {other:?}"),
        }
    }

    fn hourly(n: usize) -> Vec<HourlyEntry> {
        (0..n)
            .map(|i| HourlyEntry { dt: i as i64 * 3600, temperature: i as f64, icon: None })
            .collect()
    }

    fn daily(n: usize) -> Vec<DailyEntry> {
        (0..n)
            .map(|i| DailyEntry {
                dt: i as i64 * 86_400,
                min: 10.0 + i as f64,
                max: 20.0 + i as f64,
                description: None,
                icon: None,
            })
            .collect()
    }

    /// Loads Delhi and resolves the cascade, returning the forecast requests.
    fn loaded_store() -> (Store, Request, Request) {
        let mut store = Store::new(WidgetState::new("Delhi", UnitSystem::Metric));
        let current = single_request(store.dispatch(Action::Load));
        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: current.token(),
            result: Ok(CurrentLookup::Found(weather("Delhi", Some(DELHI)))),
        }));
        let mut fetches = effects.into_iter().filter_map(|e| match e {
            Effect::Fetch(r) => Some(r),
            _ => None,
        });
        let h = fetches.next().expect("hourly");
        let d = fetches.next().expect("daily");
        (store, h, d)
    }

    #[test]
    fn editing_location_does_not_fetch() {
        let mut store = Store::new(WidgetState::new("Delhi", UnitSystem::Metric));
        let effects = store.dispatch(Action::EditLocation("Par".into()));
        assert!(effects.is_empty());
        assert_eq!(store.state().location, "Par");
        assert_eq!(store.state().query, "Delhi");
    }

    #[test]
    fn search_fetches_typed_location() {
        let mut store = Store::new(WidgetState::new("Delhi", UnitSystem::Imperial));
        store.dispatch(Action::EditLocation("paris".into()));

        let request = single_request(store.dispatch(Action::Search));
        assert_eq!(
            request,
            Request::Current {
                token: request.token(),
                location: "paris".into(),
                units: UnitSystem::Imperial,
            }
        );
        // Not committed until the lookup succeeds.
        assert_eq!(store.state().query, "Delhi");

        store.dispatch(Action::Resolved(Outcome::Current {
            token: request.token(),
            result: Ok(CurrentLookup::Found(weather("Paris", Some(DELHI)))),
        }));
        assert_eq!(store.state().query, "paris");
    }

    #[test]
    fn found_sets_canonical_name_and_requests_both_forecasts() {
        let mut store = Store::new(WidgetState::new("Delhi", UnitSystem::Metric));
        store.dispatch(Action::EditLocation("new delhi".into()));
        let request = single_request(store.dispatch(Action::Search));

        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: request.token(),
            result: Ok(CurrentLookup::Found(weather("New Delhi", Some(DELHI)))),
        }));

        assert_eq!(store.state().display_location, "New Delhi");
        let reqs = requests(&effects);
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].endpoint(), Endpoint::Hourly);
        assert_eq!(reqs[1].endpoint(), Endpoint::Daily);
    }

    #[test]
    fn same_coordinates_still_refetch_forecasts() {
        let (mut store, _, _) = loaded_store();
        let request = single_request(store.dispatch(Action::Load));

        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: request.token(),
            result: Ok(CurrentLookup::Found(weather("Delhi", Some(DELHI)))),
        }));
        assert_eq!(requests(&effects).len(), 2);
    }

    #[test]
    fn missing_coordinates_skip_forecasts() {
        let mut store = Store::new(WidgetState::new("Delhi", UnitSystem::Metric));
        let request = single_request(store.dispatch(Action::Load));

        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: request.token(),
            result: Ok(CurrentLookup::Found(weather("Delhi", None))),
        }));
        assert!(effects.is_empty());
        assert!(store.state().hourly.is_none());
        assert!(store.state().daily.is_none());
    }

    #[test]
    fn not_found_keeps_state_and_notifies_once() {
        let (mut store, _, _) = loaded_store();
        let before = store.state().clone();

        store.dispatch(Action::EditLocation("atlantis".into()));
        let request = single_request(store.dispatch(Action::Search));
        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: request.token(),
            result: Ok(CurrentLookup::NotFound),
        }));

        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Notify(n) => assert_eq!(n.message, NOT_FOUND_NOTICE),
            other => panic!("expected notification, got {other:?}"),
        }
        assert_eq!(store.state().current, before.current);
        assert_eq!(store.state().display_location, before.display_location);
        assert_eq!(store.state().query, "Delhi");
    }

    #[test]
    fn toggle_after_miss_requeries_last_found_location() {
        let (mut store, _, _) = loaded_store();
        store.dispatch(Action::EditLocation("atlantis".into()));
        let miss = single_request(store.dispatch(Action::Search));
        store.dispatch(Action::Resolved(Outcome::Current {
            token: miss.token(),
            result: Ok(CurrentLookup::NotFound),
        }));

        match single_request(store.dispatch(Action::ToggleUnits)) {
            Request::Current { location, units, .. } => {
                assert_eq!(location, "Delhi");
                assert_eq!(units, UnitSystem::Imperial);
            }
            other => panic!("expected current request, got {other:?}"),
        }
    }

    #[test]
    fn current_failure_clears_current_and_reports() {
        let (mut store, _, _) = loaded_store();
        let request = single_request(store.dispatch(Action::Load));

        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: request.token(),
            result: Err(status_error(Endpoint::Current)),
        }));

        assert!(store.state().current.is_none());
        assert!(matches!(
            effects.as_slice(),
            [Effect::Report { endpoint: Endpoint::Current, .. }]
        ));
    }

    #[test]
    fn forecasts_are_truncated() {
        let (mut store, h, d) = loaded_store();
        store.dispatch(Action::Resolved(Outcome::Hourly { token: h.token(), result: Ok(hourly(48)) }));
        store.dispatch(Action::Resolved(Outcome::Daily { token: d.token(), result: Ok(daily(8)) }));

        assert_eq!(store.state().hourly.as_ref().map(Vec::len), Some(MAX_HOURLY));
        assert_eq!(store.state().daily.as_ref().map(Vec::len), Some(MAX_DAILY));
        assert_eq!(store.state().min_max, Some(MinMaxTemp { min: 10.0, max: 20.0 }));
    }

    #[test]
    fn short_series_are_kept_whole() {
        let (mut store, h, d) = loaded_store();
        store.dispatch(Action::Resolved(Outcome::Hourly { token: h.token(), result: Ok(hourly(2)) }));
        store.dispatch(Action::Resolved(Outcome::Daily { token: d.token(), result: Ok(daily(0)) }));

        assert_eq!(store.state().hourly.as_ref().map(Vec::len), Some(2));
        assert_eq!(store.state().daily.as_ref().map(Vec::len), Some(0));
        assert_eq!(store.state().min_max, None);
    }

    #[test]
    fn forecast_failure_leaves_stale_data() {
        let (mut store, h, d) = loaded_store();
        store.dispatch(Action::Resolved(Outcome::Hourly { token: h.token(), result: Ok(hourly(6)) }));
        store.dispatch(Action::Resolved(Outcome::Daily { token: d.token(), result: Ok(daily(7)) }));
        let before = store.state().clone();

        let reload = single_request(store.dispatch(Action::Load));
        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: reload.token(),
            result: Ok(CurrentLookup::Found(weather("Delhi", Some(DELHI)))),
        }));
        let reqs = requests(&effects);

        let effects = store.dispatch(Action::Resolved(Outcome::Hourly {
            token: reqs[0].token(),
            result: Err(status_error(Endpoint::Hourly)),
        }));
        assert!(matches!(effects.as_slice(), [Effect::Report { endpoint: Endpoint::Hourly, .. }]));

        store.dispatch(Action::Resolved(Outcome::Daily {
            token: reqs[1].token(),
            result: Err(status_error(Endpoint::Daily)),
        }));

        assert_eq!(store.state().hourly, before.hourly);
        assert_eq!(store.state().daily, before.daily);
        assert_eq!(store.state().min_max, before.min_max);
    }

    #[test]
    fn stale_current_response_is_discarded() {
        let mut store = Store::new(WidgetState::new("Delhi", UnitSystem::Metric));
        store.dispatch(Action::EditLocation("slow town".into()));
        let slow = single_request(store.dispatch(Action::Search));
        store.dispatch(Action::EditLocation("fast city".into()));
        let fast = single_request(store.dispatch(Action::Search));

        store.dispatch(Action::Resolved(Outcome::Current {
            token: fast.token(),
            result: Ok(CurrentLookup::Found(weather("Fast City", Some(DELHI)))),
        }));
        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: slow.token(),
            result: Ok(CurrentLookup::Found(weather("Slow Town", Some(DELHI)))),
        }));

        assert!(effects.is_empty());
        assert_eq!(store.state().display_location, "Fast City");
    }

    #[test]
    fn stale_failure_is_not_reported() {
        let mut store = Store::new(WidgetState::new("Delhi", UnitSystem::Metric));
        let first = single_request(store.dispatch(Action::Load));
        let second = single_request(store.dispatch(Action::Load));
        store.dispatch(Action::Resolved(Outcome::Current {
            token: second.token(),
            result: Ok(CurrentLookup::Found(weather("Delhi", None))),
        }));

        let effects = store.dispatch(Action::Resolved(Outcome::Current {
            token: first.token(),
            result: Err(status_error(Endpoint::Current)),
        }));
        assert!(effects.is_empty());
        assert!(store.state().current.is_some());
    }

    #[test]
    fn toggle_refetches_only_current_with_committed_query() {
        let (mut store, _, _) = loaded_store();
        store.dispatch(Action::EditLocation("half-typ".into()));

        let request = single_request(store.dispatch(Action::ToggleUnits));
        assert_eq!(store.state().units, UnitSystem::Imperial);
        match request {
            Request::Current { location, units, .. } => {
                assert_eq!(location, "Delhi");
                assert_eq!(units, UnitSystem::Imperial);
            }
            other => panic!("expected current request, got {other:?}"),
        }
    }

    #[test]
    fn toggle_discards_forecasts_in_old_units() {
        let (mut store, h, d) = loaded_store();
        store.dispatch(Action::ToggleUnits);

        let e1 = store.dispatch(Action::Resolved(Outcome::Hourly { token: h.token(), result: Ok(hourly(6)) }));
        let e2 = store.dispatch(Action::Resolved(Outcome::Daily { token: d.token(), result: Ok(daily(7)) }));

        assert!(e1.is_empty() && e2.is_empty());
        assert!(store.state().hourly.is_none());
        assert!(store.state().daily.is_none());
    }

    #[test]
    fn tokens_increase_per_field() {
        let mut tokens = Tokens::default();
        let a = tokens.issue(Endpoint::Current);
        let b = tokens.issue(Endpoint::Current);
        let h = tokens.issue(Endpoint::Hourly);
        assert!(b > a);
        assert!(tokens.is_latest(Endpoint::Current, b));
        assert!(!tokens.is_latest(Endpoint::Current, a));
        assert!(tokens.is_latest(Endpoint::Hourly, h));
    }
}
