//! The station's single-threaded tick.
//!
//! All mutable state lives in [`Dashboard`] and is only touched from [`Dashboard::tick`].
//! Time is injected as monotonic milliseconds so cycles and retry gates are deterministic.

use crate::{
    Config,
    error::{FetchError, StartupError, TimeSyncError},
    history::TemperatureHistory,
    model::{Coordinates, WeatherSnapshot},
    provider::{TimeSource, WeatherSource, clock::SyncedClock},
    retry::{RetryPhase, RetryPolicy, RetryState, SyncKind},
    view::{DashboardView, FrameTiming, Renderer},
};

/// The update counter is shown with at most three digits.
const COUNTER_LIMIT: u16 = 1000;

pub const WAITING_FOR_WEATHER: &str = "Waiting for weather data";

/// One sync attempt made during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub kind: SyncKind,
    pub ok: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub cycle_started: bool,
    pub attempts: Vec<Attempt>,
}

impl TickReport {
    fn record(&mut self, kind: SyncKind, ok: bool) {
        self.attempts.push(Attempt { kind, ok });
    }
}

#[derive(Debug)]
pub struct Dashboard {
    weather_source: Box<dyn WeatherSource>,
    time_source: Box<dyn TimeSource>,

    location: String,
    coordinates: Coordinates,
    utc_offset_hours: i32,
    period_ms: u64,
    policy: RetryPolicy,

    snapshot: Option<WeatherSnapshot>,
    history: TemperatureHistory,
    clock: SyncedClock,
    status: String,
    frames: FrameTiming,

    last_cycle_ms: u64,
    update_counter: u16,
    time_retry: RetryState,
    weather_retry: RetryState,
}

impl Dashboard {
    /// Resolve the location and synchronise the clock, both fatal on failure, then make
    /// the opening weather fetch. A failed opening fetch is left to the retry scheduler.
    pub async fn start(
        config: &Config,
        mut weather_source: Box<dyn WeatherSource>,
        time_source: Box<dyn TimeSource>,
        now_ms: u64,
    ) -> Result<Self, StartupError> {
        let coordinates = weather_source
            .resolve(&config.location, &config.country_code)
            .await?;
        let synced = time_source.sync().await?;
        tracing::info!(time = %synced, "clock synchronised");

        let mut dashboard = Self {
            weather_source,
            time_source,
            location: config.location.clone(),
            coordinates,
            utc_offset_hours: config.utc_offset_hours,
            period_ms: config.period_ms,
            policy: RetryPolicy::from(config),
            snapshot: None,
            history: TemperatureHistory::new(config.history_len, config.graph_levels),
            clock: SyncedClock::new(synced, now_ms),
            status: WAITING_FOR_WEATHER.to_string(),
            frames: FrameTiming::new(now_ms),
            last_cycle_ms: now_ms,
            update_counter: 0,
            time_retry: RetryState::default(),
            weather_retry: RetryState::default(),
        };

        // The window only moves on periodic cycles; the opening reading seeds min/max.
        match dashboard.weather_source.fetch_current(coordinates).await {
            Ok(snapshot) => dashboard.apply_snapshot(snapshot),
            Err(err) => dashboard.weather_failed_at_cycle(err, now_ms),
        }

        Ok(dashboard)
    }

    /// Advance the station to `now_ms`.
    ///
    /// A periodic cycle, when due, attempts both kinds and supersedes any retries for
    /// this tick. Otherwise due retries run, time sync before weather.
    pub async fn tick(&mut self, now_ms: u64) -> TickReport {
        let mut report = TickReport::default();
        self.frames.advance(now_ms);

        if now_ms >= self.last_cycle_ms.saturating_add(self.period_ms) {
            self.run_cycle(now_ms, &mut report).await;
            return report;
        }

        if self.time_retry.is_due(now_ms, &self.policy) {
            tracing::debug!(
                kind = %SyncKind::TimeSync,
                attempt = self.time_retry.attempt_count() + 1,
                "retrying"
            );
            let ok = match self.time_source.sync().await {
                Ok(synced) => {
                    self.adopt_time(synced, now_ms);
                    self.time_retry.record_success();
                    true
                }
                Err(err) => {
                    self.time_retry_failed(&err, now_ms);
                    false
                }
            };
            report.record(SyncKind::TimeSync, ok);
        }

        if self.weather_retry.is_due(now_ms, &self.policy) {
            tracing::debug!(
                kind = %SyncKind::Weather,
                attempt = self.weather_retry.attempt_count() + 1,
                "retrying"
            );
            let ok = match self.weather_source.fetch_current(self.coordinates).await {
                Ok(snapshot) => {
                    self.apply_snapshot(snapshot);
                    self.weather_retry.record_success();
                    true
                }
                Err(err) => {
                    self.weather_retry_failed(&err, now_ms);
                    false
                }
            };
            report.record(SyncKind::Weather, ok);
        }

        report
    }

    /// Tick, then draw whatever state is current.
    pub async fn step(
        &mut self,
        now_ms: u64,
        renderer: &mut dyn Renderer,
    ) -> anyhow::Result<TickReport> {
        let report = self.tick(now_ms).await;
        renderer.render(&self.view(now_ms))?;
        Ok(report)
    }

    pub fn view(&self, now_ms: u64) -> DashboardView<'_> {
        DashboardView {
            location: &self.location,
            snapshot: self.snapshot.as_ref(),
            min: self.history.min(),
            max: self.history.max(),
            graph: self.history.graph(),
            graph_levels: self.history.levels(),
            local_time: self.clock.local_at(now_ms, self.utc_offset_hours),
            status: &self.status,
            status_scroll: self.frames.scroll(),
            fps: self.frames.fps(),
            update_counter: self.update_counter,
            time_sync: self.time_retry.phase(),
            weather: self.weather_retry.phase(),
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn history(&self) -> &TemperatureHistory {
        &self.history
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn update_counter(&self) -> u16 {
        self.update_counter
    }

    pub fn retry_state(&self, kind: SyncKind) -> &RetryState {
        match kind {
            SyncKind::TimeSync => &self.time_retry,
            SyncKind::Weather => &self.weather_retry,
        }
    }

    async fn run_cycle(&mut self, now_ms: u64, report: &mut TickReport) {
        self.last_cycle_ms = now_ms;
        self.update_counter = next_update_counter(self.update_counter);
        self.time_retry.reset();
        self.weather_retry.reset();
        report.cycle_started = true;
        tracing::debug!(counter = self.update_counter, "periodic cycle");

        let ok = match self.time_source.sync().await {
            Ok(synced) => {
                self.adopt_time(synced, now_ms);
                true
            }
            Err(err) => {
                tracing::warn!(
                    kind = %SyncKind::TimeSync,
                    error = %err,
                    "failed, scheduling retries"
                );
                self.time_retry.seed(now_ms, &self.policy);
                if self.time_retry.phase() == RetryPhase::Exhausted {
                    self.status = time_sync_failed(&err);
                }
                false
            }
        };
        report.record(SyncKind::TimeSync, ok);

        let ok = match self.weather_source.fetch_current(self.coordinates).await {
            Ok(snapshot) => {
                self.history.push(snapshot.temperature);
                self.apply_snapshot(snapshot);
                true
            }
            Err(err) => {
                self.weather_failed_at_cycle(err, now_ms);
                false
            }
        };
        report.record(SyncKind::Weather, ok);
    }

    fn adopt_time(&mut self, synced: chrono::DateTime<chrono::Utc>, now_ms: u64) {
        self.clock = SyncedClock::new(synced, now_ms);
    }

    fn apply_snapshot(&mut self, snapshot: WeatherSnapshot) {
        tracing::info!(
            place = %snapshot.place,
            temperature = snapshot.temperature,
            "weather updated"
        );
        self.history.seed(snapshot.temperature);
        self.status = snapshot.status_message();
        self.snapshot = Some(snapshot);
    }

    fn weather_failed_at_cycle(&mut self, err: FetchError, now_ms: u64) {
        tracing::warn!(kind = %SyncKind::Weather, error = %err, "failed, scheduling retries");
        self.weather_retry.seed(now_ms, &self.policy);
        if self.weather_retry.phase() == RetryPhase::Exhausted {
            self.status = weather_failed(&err);
        }
    }

    fn time_retry_failed(&mut self, err: &TimeSyncError, now_ms: u64) {
        if self.time_retry.record_failure(now_ms, &self.policy) {
            tracing::warn!(
                kind = %SyncKind::TimeSync,
                error = %err,
                "retries exhausted until next cycle"
            );
            self.status = time_sync_failed(err);
        } else {
            tracing::warn!(
                kind = %SyncKind::TimeSync,
                error = %err,
                attempt = self.time_retry.attempt_count(),
                "retry failed"
            );
        }
    }

    fn weather_retry_failed(&mut self, err: &FetchError, now_ms: u64) {
        if self.weather_retry.record_failure(now_ms, &self.policy) {
            tracing::warn!(
                kind = %SyncKind::Weather,
                error = %err,
                "retries exhausted until next cycle"
            );
            self.status = weather_failed(err);
        } else {
            tracing::warn!(
                kind = %SyncKind::Weather,
                error = %err,
                attempt = self.weather_retry.attempt_count(),
                "retry failed"
            );
        }
    }
}

/// 1, 2, ..., 999, 1, ... (never 0 once started).
pub fn next_update_counter(current: u16) -> u16 {
    let next = current.saturating_add(1);
    if next >= COUNTER_LIMIT { 1 } else { next }
}

fn weather_failed(err: &FetchError) -> String {
    format!("Weather update failed ({})", err.short_reason())
}

fn time_sync_failed(err: &TimeSyncError) -> String {
    match err {
        TimeSyncError::Status(code) => format!("Time sync failed (HTTP {code})"),
        _ => "Time sync failed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ResolutionError, model::Units};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    const SEC: u64 = 1_000;
    const PERIOD: u64 = 300 * SEC;

    /// Call log shared between the fakes, to check ordering.
    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    #[derive(Debug)]
    struct FakeWeather {
        resolve_ok: bool,
        replies: Arc<Mutex<VecDeque<Result<f64, u16>>>>,
        log: CallLog,
    }

    fn snapshot(temperature: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            place: "Bristol".into(),
            units: Units::Metric,
            temperature,
            feels_like: temperature - 1.0,
            humidity: 70.0,
            pressure: 1010.0,
            wind_speed: 3.0,
            condition: "Clear sky".into(),
            sunrise: "07:00".into(),
            sunset: "19:00".into(),
        }
    }

    #[async_trait]
    impl WeatherSource for FakeWeather {
        async fn resolve(
            &mut self,
            location: &str,
            country_code: &str,
        ) -> Result<Coordinates, ResolutionError> {
            self.log.lock().unwrap().push("resolve");
            if self.resolve_ok {
                Ok(Coordinates {
                    latitude: 51.45,
                    longitude: -2.58,
                })
            } else {
                Err(ResolutionError::NotFound(format!("{location},{country_code}")))
            }
        }

        async fn fetch_current(&self, _at: Coordinates) -> Result<WeatherSnapshot, FetchError> {
            self.log.lock().unwrap().push("weather");
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(t)) => Ok(snapshot(t)),
                Some(Err(code)) => Err(FetchError::Status(code)),
                None => Err(FetchError::Status(599)),
            }
        }
    }

    #[derive(Debug)]
    struct FakeTime {
        replies: Arc<Mutex<VecDeque<Result<(), TimeSyncError>>>>,
        log: CallLog,
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 18, 9, 0, 0).unwrap()
    }

    #[async_trait]
    impl TimeSource for FakeTime {
        async fn sync(&self) -> Result<DateTime<Utc>, TimeSyncError> {
            self.log.lock().unwrap().push("time");
            match self.replies.lock().unwrap().pop_front() {
                Some(Err(err)) => Err(err),
                _ => Ok(base_time()),
            }
        }
    }

    struct Harness {
        weather: Arc<Mutex<VecDeque<Result<f64, u16>>>>,
        time: Arc<Mutex<VecDeque<Result<(), TimeSyncError>>>>,
        log: CallLog,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                weather: Arc::default(),
                time: Arc::default(),
                log: Arc::default(),
            }
        }

        fn weather(&self, replies: &[Result<f64, u16>]) -> &Self {
            self.weather.lock().unwrap().extend(replies.iter().copied());
            self
        }

        fn time(&self, replies: impl IntoIterator<Item = Result<(), TimeSyncError>>) -> &Self {
            self.time.lock().unwrap().extend(replies);
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.log.lock().unwrap().clone()
        }

        fn clear(&self) {
            self.log.lock().unwrap().clear();
        }

        fn count(&self, name: &str) -> usize {
            self.calls().iter().filter(|c| **c == name).count()
        }

        async fn start(&self) -> Result<Dashboard, StartupError> {
            self.start_with(true).await
        }

        async fn start_with(&self, resolve_ok: bool) -> Result<Dashboard, StartupError> {
            let config = Config {
                location: "Bristol".into(),
                country_code: "GB".into(),
                api_key: "KEY".into(),
                ..Config::default()
            };
            let weather = FakeWeather {
                resolve_ok,
                replies: self.weather.clone(),
                log: self.log.clone(),
            };
            let time = FakeTime {
                replies: self.time.clone(),
                log: self.log.clone(),
            };
            Dashboard::start(&config, Box::new(weather), Box::new(time), 0).await
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        last_status: String,
    }

    impl Renderer for CountingRenderer {
        fn render(&mut self, view: &DashboardView<'_>) -> anyhow::Result<()> {
            self.frames += 1;
            self.last_status = view.status.to_string();
            Ok(())
        }
    }

    #[test]
    fn update_counter_wraps_to_one() {
        assert_eq!(next_update_counter(0), 1);
        assert_eq!(next_update_counter(998), 999);
        assert_eq!(next_update_counter(999), 1);
    }

    #[tokio::test]
    async fn startup_resolution_failure_is_fatal() {
        let h = Harness::new();
        let err = h.start_with(false).await.unwrap_err();
        assert!(matches!(err, StartupError::Resolution(_)));
        assert_eq!(h.calls(), vec!["resolve"]);
    }

    #[tokio::test]
    async fn startup_time_sync_failure_is_fatal() {
        let h = Harness::new();
        h.time([Err(TimeSyncError::MissingDate)]);
        let err = h.start().await.unwrap_err();
        assert!(matches!(err, StartupError::TimeSync(_)));
    }

    #[tokio::test]
    async fn startup_fetch_seeds_range_without_advancing_window() {
        let h = Harness::new();
        h.weather(&[Ok(20.0)]);
        let dash = h.start().await.expect("starts");

        assert_eq!(h.calls(), vec!["resolve", "time", "weather"]);
        assert_eq!(dash.history().min(), Some(20.0));
        assert_eq!(dash.history().max(), Some(20.0));
        assert_eq!(dash.history().latest(), None);
        assert!(dash.history().samples().all(|t| t == 0.0));
        assert_eq!(dash.history().graph(), &[0; 24]);
        assert_eq!(dash.update_counter(), 0);
        assert!(dash.status().starts_with("#Conditions: Clear sky"));
    }

    #[tokio::test]
    async fn startup_fetch_failure_is_queued_for_retry() {
        let h = Harness::new();
        h.weather(&[Err(503), Ok(18.5)]);
        let mut dash = h.start().await.expect("starts");

        assert_eq!(dash.retry_state(SyncKind::Weather).phase(), RetryPhase::PendingRetry);
        assert_eq!(dash.status(), WAITING_FOR_WEATHER);

        let report = dash.tick(10 * SEC).await;
        assert_eq!(
            report.attempts,
            vec![Attempt {
                kind: SyncKind::Weather,
                ok: true
            }]
        );
        assert_eq!(dash.snapshot().map(|s| s.temperature), Some(18.5));
        // The first reading seeds min/max; only cycles move the window.
        assert_eq!(dash.history().min(), Some(18.5));
        assert_eq!(dash.history().max(), Some(18.5));
        assert_eq!(dash.history().latest(), None);
    }

    #[tokio::test]
    async fn retry_success_keeps_seeded_range() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Err(500), Ok(31.0)]);
        let mut dash = h.start().await.expect("starts");

        dash.tick(PERIOD).await;
        dash.tick(PERIOD + 10 * SEC).await;

        assert_eq!(dash.snapshot().map(|s| s.temperature), Some(31.0));
        assert_eq!(dash.history().min(), Some(20.0));
        assert_eq!(dash.history().max(), Some(20.0));
        assert_eq!(dash.history().latest(), None);
    }

    #[tokio::test]
    async fn no_network_between_cycles_when_healthy() {
        let h = Harness::new();
        h.weather(&[Ok(20.0)]);
        let mut dash = h.start().await.expect("starts");
        h.clear();

        for t in (1..300).map(|s| s * SEC) {
            let report = dash.tick(t).await;
            assert!(!report.cycle_started);
            assert!(report.attempts.is_empty());
        }
        assert!(h.calls().is_empty());
    }

    #[tokio::test]
    async fn cycle_syncs_time_before_weather_and_advances_history() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Ok(25.0)]);
        let mut dash = h.start().await.expect("starts");
        h.clear();

        let report = dash.tick(PERIOD).await;

        assert!(report.cycle_started);
        assert_eq!(h.calls(), vec!["time", "weather"]);
        assert_eq!(dash.update_counter(), 1);
        assert_eq!(dash.history().max(), Some(25.0));
        let graph = dash.history().graph();
        assert_eq!(graph[23], 12);
        assert_eq!(graph[22], 0);
    }

    #[tokio::test]
    async fn failed_cycle_leaves_history_untouched() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Err(500)]);
        let mut dash = h.start().await.expect("starts");
        let before: Vec<f64> = dash.history().samples().collect();

        dash.tick(PERIOD).await;

        assert_eq!(dash.history().samples().collect::<Vec<_>>(), before);
        assert_eq!(dash.snapshot().map(|s| s.temperature), Some(20.0));
        let state = dash.retry_state(SyncKind::Weather);
        assert_eq!(state.phase(), RetryPhase::PendingRetry);
        assert_eq!(state.attempt_count(), 0);
        assert_eq!(state.last_attempt_ms(), PERIOD);
    }

    #[tokio::test]
    async fn retry_gate_spaces_attempts() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Err(500), Err(500), Err(500)]);
        let mut dash = h.start().await.expect("starts");

        dash.tick(PERIOD).await;
        // First retry once the gate has elapsed.
        let t1 = PERIOD + 10 * SEC;
        assert_eq!(dash.tick(t1).await.attempts.len(), 1);
        assert_eq!(dash.retry_state(SyncKind::Weather).attempt_count(), 1);

        // 3 s later the gate has not elapsed.
        assert!(dash.tick(t1 + 3 * SEC).await.attempts.is_empty());
        assert_eq!(dash.retry_state(SyncKind::Weather).attempt_count(), 1);

        // 11 s after the previous attempt it fires again.
        assert_eq!(dash.tick(t1 + 11 * SEC).await.attempts.len(), 1);
        assert_eq!(dash.retry_state(SyncKind::Weather).attempt_count(), 2);
    }

    #[tokio::test]
    async fn exhaustion_stops_retries_until_next_cycle() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Err(401), Err(401), Err(401), Err(401), Ok(22.0)]);
        let mut dash = h.start().await.expect("starts");

        dash.tick(PERIOD).await;
        h.clear();

        let mut t = PERIOD;
        while t < 2 * PERIOD - SEC {
            t += SEC;
            dash.tick(t).await;
            assert!(dash.retry_state(SyncKind::Weather).attempt_count() <= 3);
        }

        assert_eq!(h.count("weather"), 3);
        assert_eq!(dash.retry_state(SyncKind::Weather).phase(), RetryPhase::Exhausted);
        assert_eq!(dash.status(), "Weather update failed (HTTP 401)");

        // The next cycle resets the kind and tries again.
        let report = dash.tick(2 * PERIOD).await;
        assert!(report.cycle_started);
        assert_eq!(dash.retry_state(SyncKind::Weather).phase(), RetryPhase::Idle);
        assert_eq!(dash.history().latest(), Some(22.0));
        assert!(dash.status().starts_with("#Conditions"));
    }

    #[tokio::test]
    async fn time_sync_exhaustion_reports_http_status() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Ok(21.0)]);
        // startup ok, then the cycle and all three retries get a 503
        h.time([
            Ok(()),
            Err(TimeSyncError::Status(503)),
            Err(TimeSyncError::Status(503)),
            Err(TimeSyncError::Status(503)),
            Err(TimeSyncError::Status(503)),
        ]);
        let mut dash = h.start().await.expect("starts");

        dash.tick(PERIOD).await;
        assert_eq!(dash.retry_state(SyncKind::TimeSync).phase(), RetryPhase::PendingRetry);
        assert!(dash.status().starts_with("#Conditions"));
        h.clear();

        let mut t = PERIOD;
        while t < 2 * PERIOD - SEC {
            t += SEC;
            dash.tick(t).await;
            assert!(dash.retry_state(SyncKind::TimeSync).attempt_count() <= 3);
        }

        assert_eq!(h.calls(), vec!["time", "time", "time"]);
        assert_eq!(dash.retry_state(SyncKind::TimeSync).phase(), RetryPhase::Exhausted);
        assert_eq!(dash.retry_state(SyncKind::Weather).phase(), RetryPhase::Idle);
        assert_eq!(dash.status(), "Time sync failed (HTTP 503)");

        let report = dash.tick(2 * PERIOD).await;
        assert!(report.cycle_started);
        assert_eq!(dash.retry_state(SyncKind::TimeSync).phase(), RetryPhase::Idle);
    }

    #[tokio::test]
    async fn time_sync_exhaustion_without_status_code() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Ok(21.0)]);
        h.time([
            Ok(()),
            Err(TimeSyncError::MissingDate),
            Err(TimeSyncError::MissingDate),
            Err(TimeSyncError::MissingDate),
            Err(TimeSyncError::MissingDate),
        ]);
        let mut dash = h.start().await.expect("starts");

        dash.tick(PERIOD).await;
        for n in 1..=3 {
            let report = dash.tick(PERIOD + n * 10 * SEC).await;
            assert_eq!(
                report.attempts,
                vec![Attempt {
                    kind: SyncKind::TimeSync,
                    ok: false
                }]
            );
        }

        assert_eq!(dash.retry_state(SyncKind::TimeSync).phase(), RetryPhase::Exhausted);
        assert_eq!(dash.status(), "Time sync failed");
        assert!(dash.tick(PERIOD + 40 * SEC).await.attempts.is_empty());
    }

    #[tokio::test]
    async fn kinds_retry_independently() {
        let h = Harness::new();
        h.weather(&[Ok(20.0), Err(500), Ok(21.0)]);
        // startup ok, cycle fails, first retry fails, second retry succeeds
        h.time([
            Ok(()),
            Err(TimeSyncError::MissingDate),
            Err(TimeSyncError::MissingDate),
            Ok(()),
        ]);
        let mut dash = h.start().await.expect("starts");

        dash.tick(PERIOD).await;
        assert!(dash.retry_state(SyncKind::TimeSync).is_needed());
        assert!(dash.retry_state(SyncKind::Weather).is_needed());
        h.clear();

        // Both due: time sync goes first.
        let report = dash.tick(PERIOD + 10 * SEC).await;
        assert_eq!(h.calls(), vec!["time", "weather"]);
        assert_eq!(
            report.attempts,
            vec![
                Attempt {
                    kind: SyncKind::TimeSync,
                    ok: false
                },
                Attempt {
                    kind: SyncKind::Weather,
                    ok: true
                },
            ]
        );
        assert_eq!(dash.retry_state(SyncKind::Weather).phase(), RetryPhase::Idle);
        assert_eq!(dash.retry_state(SyncKind::TimeSync).attempt_count(), 1);
        h.clear();

        let report = dash.tick(PERIOD + 20 * SEC).await;
        assert_eq!(h.calls(), vec!["time"]);
        assert_eq!(report.attempts.len(), 1);
        assert_eq!(dash.retry_state(SyncKind::TimeSync).phase(), RetryPhase::Idle);
    }

    #[tokio::test]
    async fn step_renders_every_tick() {
        let h = Harness::new();
        h.weather(&[Ok(20.0)]);
        let mut dash = h.start().await.expect("starts");
        let mut renderer = CountingRenderer::default();

        for t in 1..=5 {
            dash.step(t * SEC, &mut renderer).await.expect("renders");
        }

        assert_eq!(renderer.frames, 5);
        assert!(renderer.last_status.contains("#Sunrise: 07:00"));
    }

    #[tokio::test]
    async fn view_projects_local_time_from_last_sync() {
        let h = Harness::new();
        h.weather(&[Ok(20.0)]);
        let dash = h.start().await.expect("starts");

        let view = dash.view(90 * SEC);
        assert_eq!(view.local_time.to_rfc3339(), "2025-10-18T09:01:30+00:00");
        assert_eq!(view.graph.len(), 24);
        assert_eq!(view.graph_levels, 12);
        assert_eq!(view.location, "Bristol");
        assert_eq!(view.fps, 0);
        assert_eq!(view.status_scroll, 0);
    }

    #[tokio::test]
    async fn every_tick_advances_frame_timing() {
        let h = Harness::new();
        h.weather(&[Ok(20.0)]);
        let mut dash = h.start().await.expect("starts");

        dash.tick(500).await;
        dash.tick(750).await;

        let view = dash.view(750);
        assert_eq!(view.fps, 4);
        assert_eq!(view.status_scroll, 2);
    }
}
