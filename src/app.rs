//! Application state management for the agricultural dashboard
//!
//! This module owns all session state: the selected location and crops, the
//! last weather report, the on-disk cache and the bookkeeping that keeps
//! late fetch results from overwriting newer ones. Network calls never happen
//! here; the controller only issues [`FetchRequest`]s and commits results.

use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cache::LocationCache;
use crate::cli::StartupConfig;
use crate::data::{
    normalize_location, CropProfile, CropSelection, GatewayError, Location, LocationError,
    WeatherReport,
};
use crate::harvest::{evaluate, recommend, HarvestStatus, HarvestTier, Recommendation};
use crate::outlook::{project_tomorrow, TomorrowOutlook};
use crate::refresh::FetchRequest;

/// Appended to fetch failure notices when the user can press keys
const RETRY_HINT: &str = " Press r to retry.";

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the first report of the current location
    Loading,
    /// Main dashboard view
    Dashboard,
    /// Location prompt holding the text typed so far
    EditingLocation(String),
}

/// Evaluation of one crop, ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct CropAssessment {
    pub crop: &'static CropProfile,
    /// Status under today's conditions
    pub status: HarvestStatus,
    /// `None` when the status could not be turned into a recommendation
    pub recommendation: Option<Recommendation>,
    /// Tier under tomorrow's outlook
    pub tomorrow: Option<HarvestTier>,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// Currently selected location
    pub location: Location,
    /// Crops shown on the dashboard
    pub selection: CropSelection,
    /// Last committed weather report for `location`
    pub report: Option<WeatherReport>,
    /// Tomorrow's outlook derived from `report`
    pub tomorrow: Option<TomorrowOutlook>,
    /// Dismissible message shown above the dashboard
    pub notice: Option<String>,
    /// Timestamp of the last successful fetch
    pub last_refresh: Option<DateTime<Local>>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    cache: LocationCache,
    cache_ttl: Duration,
    /// Generation of the most recently issued request
    generation: u64,
    /// Generation of the most recently committed result
    committed_generation: u64,
    pending_fetch: Option<FetchRequest>,
    rng: StdRng,
    /// False in one-shot mode, where no keys are read
    interactive: bool,
}

impl App {
    /// Creates an App from the startup configuration with the default cache
    pub fn new(config: &StartupConfig) -> Self {
        Self::with_parts(config, LocationCache::new(), StdRng::from_entropy())
    }

    /// Creates an App with an explicit cache and random source
    pub fn with_parts(config: &StartupConfig, cache: LocationCache, rng: StdRng) -> Self {
        Self {
            state: AppState::Loading,
            location: config.location.clone(),
            selection: config.selection,
            report: None,
            tomorrow: None,
            notice: None,
            last_refresh: None,
            should_quit: false,
            show_help: false,
            cache,
            cache_ttl: config.cache_ttl,
            generation: 0,
            committed_generation: 0,
            pending_fetch: None,
            rng,
            interactive: !config.once,
        }
    }

    /// Whether a request has been issued that has not been answered yet
    pub fn is_fetching(&self) -> bool {
        self.committed_generation < self.generation
    }

    /// Serves the current location from cache or issues a fetch
    ///
    /// Without `force`, a fresh cache entry is shown immediately and no
    /// request is issued. With `force` the cache read is skipped.
    ///
    /// # Returns
    /// * `Some(FetchRequest)` that the caller must dispatch
    /// * `None` if the cache satisfied the load
    pub fn request_load(&mut self, force: bool) -> Option<FetchRequest> {
        if !force {
            if let Some(report) = self.cache.get(&self.location.key, self.cache_ttl) {
                tracing::debug!(location = %self.location.key, "serving weather from cache");
                self.show_report(report);
                return None;
            }
        }

        self.generation += 1;
        Some(FetchRequest {
            location: self.location.clone(),
            generation: self.generation,
        })
    }

    /// Queues a load for the main loop to dispatch
    pub fn reload(&mut self, force: bool) {
        if let Some(request) = self.request_load(force) {
            self.pending_fetch = Some(request);
        }
    }

    /// Takes the queued fetch, if any
    pub fn take_pending_fetch(&mut self) -> Option<FetchRequest> {
        self.pending_fetch.take()
    }

    /// Handles an auto-refresh tick; goes through the same TTL gate as `r`
    pub fn on_auto_refresh(&mut self) {
        self.reload(false);
    }

    /// Commits a fetch result
    ///
    /// Results for another location, or older than a result already
    /// committed, are discarded.
    ///
    /// # Returns
    /// `true` if the result was applied
    pub fn apply_fetch(
        &mut self,
        request: FetchRequest,
        result: Result<WeatherReport, GatewayError>,
    ) -> bool {
        if request.location.key != self.location.key {
            tracing::debug!(
                stale = %request.location.key,
                current = %self.location.key,
                "discarding result for previous location"
            );
            return false;
        }
        if request.generation <= self.committed_generation {
            tracing::debug!(
                generation = request.generation,
                committed = self.committed_generation,
                "discarding superseded result"
            );
            return false;
        }
        self.committed_generation = request.generation;

        match result {
            Ok(report) => {
                if let Err(e) = self.cache.put(&self.location.key, &report) {
                    tracing::warn!(error = %e, "failed to write weather cache");
                }
                tracing::info!(location = %self.location.key, "weather updated");
                self.show_report(report);
                self.last_refresh = Some(Local::now());
                self.notice = None;
            }
            Err(e) => {
                match &e {
                    GatewayError::Malformed { reason, raw } => {
                        tracing::warn!(%reason, %raw, "malformed weather response");
                    }
                    other => {
                        tracing::warn!(
                            error = %other,
                            transport = other.is_transport(),
                            "weather fetch failed"
                        );
                    }
                }
                let mut notice = GatewayError::user_message(&self.location.label);
                if self.interactive {
                    notice.push_str(RETRY_HINT);
                }
                self.notice = Some(notice);
                if self.state == AppState::Loading {
                    self.state = AppState::Dashboard;
                }
            }
        }
        true
    }

    fn show_report(&mut self, report: WeatherReport) {
        self.tomorrow = Some(project_tomorrow(&report, &mut self.rng));
        self.report = Some(report);
        if self.state == AppState::Loading {
            self.state = AppState::Dashboard;
        }
    }

    /// Switches to a new location and queues its load
    ///
    /// Entering the current location again only closes the prompt.
    pub fn change_location(&mut self, input: &str) -> Result<(), LocationError> {
        let location = normalize_location(input)?;

        if location.key == self.location.key {
            self.state = self.resume_state();
            return Ok(());
        }

        if let Err(e) = self.cache.invalidate(&self.location.key) {
            tracing::warn!(error = %e, "failed to clear weather cache");
        }
        tracing::info!(from = %self.location.key, to = %location.key, "location changed");

        self.location = location;
        self.report = None;
        self.tomorrow = None;
        self.notice = None;
        self.last_refresh = None;
        self.state = AppState::Loading;
        // Anything still in flight belongs to the previous location
        self.committed_generation = self.generation;
        self.reload(false);
        Ok(())
    }

    fn resume_state(&self) -> AppState {
        if self.report.is_none() && self.is_fetching() {
            AppState::Loading
        } else {
            AppState::Dashboard
        }
    }

    /// Evaluates every selected crop against the current report
    ///
    /// Empty when no report is available.
    pub fn assessments(&self) -> Vec<CropAssessment> {
        let Some(report) = &self.report else {
            return Vec::new();
        };
        let tomorrow = self
            .tomorrow
            .as_ref()
            .map(|outlook| outlook.as_observation(&report.current));

        self.selection
            .crops()
            .into_iter()
            .map(|crop| {
                let status = evaluate(&report.current, crop);
                let recommendation = match recommend(&status) {
                    Ok(recommendation) => Some(recommendation),
                    Err(e) => {
                        if cfg!(debug_assertions) {
                            panic!("{} for crop {}", e, crop.id);
                        }
                        tracing::error!(error = %e, crop = crop.id, "recommendation unavailable");
                        None
                    }
                };
                CropAssessment {
                    crop,
                    tomorrow: tomorrow.as_ref().map(|obs| evaluate(obs, crop).tier),
                    status,
                    recommendation,
                }
            })
            .collect()
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit (outside the location prompt)
    /// - `Esc`: Dismiss the notice, or quit when there is none
    /// - `r`: Reload, served from cache while fresh
    /// - `R`: Force reload from the weather service
    /// - `l`: Change location
    /// - `Tab`/`Right`, `Shift-Tab`/`Left`: Cycle crop selection
    /// - `a`: Show all crops
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        if let AppState::EditingLocation(buffer) = &mut self.state {
            match key_event.code {
                KeyCode::Char(c) => buffer.push(c),
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Esc => {
                    self.state = self.resume_state();
                }
                KeyCode::Enter => {
                    let input = buffer.clone();
                    if let Err(e) = self.change_location(&input) {
                        self.notice = Some(e.to_string());
                    }
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.notice.take().is_none() {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char('l') => {
                self.notice = None;
                self.state = AppState::EditingLocation(String::new());
            }
            _ if self.state == AppState::Loading => {}
            KeyCode::Char('r') => {
                self.reload(false);
            }
            KeyCode::Char('R') => {
                self.reload(true);
            }
            KeyCode::Tab | KeyCode::Right => {
                self.selection = self.selection.next();
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.selection = self.selection.previous();
            }
            KeyCode::Char('a') => {
                self.selection = CropSelection::All;
            }
            _ => {}
        }
    }
}
