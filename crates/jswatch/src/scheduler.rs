//! Daily scheduling of snapshot runs.
//!
//! The driver runs once at startup, then polls a [`DailyTrigger`] at a fixed
//! interval and runs again whenever it is due. Time comes from a [`Clock`]
//! so the trigger logic can be exercised without waiting.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tokio::sync::Notify;

use crate::acquisition::http_client::HttpClient;
use crate::config::{WatchConfig, DEFAULT_POLL_SECS};
use crate::history::HistorySink;
use crate::pipeline::run_once;
use crate::types::RunReport;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The real local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Fires once per day at a fixed local time.
#[derive(Debug, Clone)]
pub struct DailyTrigger {
    at: NaiveTime,
    next_run: NaiveDateTime,
}

impl DailyTrigger {
    /// Trigger whose first firing is the next `at` strictly after `now`.
    pub fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        Self {
            at,
            next_run: next_occurrence(at, now),
        }
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }

    /// Reschedule after a run finished at `now`.
    ///
    /// Missed days are not replayed: a late wake-up runs once and then
    /// waits for the next occurrence.
    pub fn mark_ran(&mut self, now: NaiveDateTime) {
        self.next_run = next_occurrence(self.at, now);
    }
}

fn next_occurrence(at: NaiveTime, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

/// What the driver is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Starting,
    Idle,
    Executing,
}

/// Owns everything a run needs and decides when runs happen.
pub struct Driver<C: Clock> {
    cfg: WatchConfig,
    client: HttpClient,
    history: Box<dyn HistorySink>,
    clock: C,
    trigger: DailyTrigger,
    state: DriverState,
}

impl<C: Clock> Driver<C> {
    pub fn new(
        mut cfg: WatchConfig,
        client: HttpClient,
        history: Box<dyn HistorySink>,
        clock: C,
    ) -> Self {
        if cfg.poll_interval.is_zero() {
            tracing::warn!("zero poll interval, using {DEFAULT_POLL_SECS}s");
            cfg.poll_interval = Duration::from_secs(DEFAULT_POLL_SECS);
        }
        let trigger = DailyTrigger::new(cfg.daily_at, clock.now());
        Self {
            cfg,
            client,
            history,
            clock,
            trigger,
            state: DriverState::Starting,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn next_run(&self) -> NaiveDateTime {
        self.trigger.next_run()
    }

    pub fn config(&self) -> &WatchConfig {
        &self.cfg
    }

    /// Run the pipeline immediately, regardless of the trigger.
    pub async fn run_now(&mut self) -> RunReport {
        self.state = DriverState::Executing;
        let now = self.clock.now();
        let report = run_once(&self.cfg, &self.client, self.history.as_ref(), now).await;
        self.state = DriverState::Idle;
        report
    }

    /// Check the trigger once; run and reschedule if it is due.
    pub async fn poll(&mut self) -> Option<RunReport> {
        if !self.trigger.is_due(self.clock.now()) {
            return None;
        }
        let report = self.run_now().await;
        self.trigger.mark_ran(self.clock.now());
        tracing::info!("next run at {}", self.trigger.next_run());
        Some(report)
    }

    /// Initial run, then poll every `poll_interval` until `shutdown` fires.
    ///
    /// Shutdown also abandons a run in progress, so a stalled request
    /// cannot keep the process alive.
    pub async fn run_forever(mut self, shutdown: Arc<Notify>) {
        tracing::info!(
            "watching {} daily at {} (poll every {}s)",
            self.cfg.base_url,
            self.cfg.daily_at.format("%H:%M"),
            self.cfg.poll_interval.as_secs()
        );

        let stopped = tokio::select! {
            _ = shutdown.notified() => true,
            _ = self.run_now() => false,
        };
        if stopped {
            self.stop();
            return;
        }
        // Scheduled relative to when the startup run finished.
        self.trigger = DailyTrigger::new(self.cfg.daily_at, self.clock.now());
        tracing::info!("next run at {}", self.trigger.next_run());

        let mut ticker = tokio::time::interval(self.cfg.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.notified() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                _ = shutdown.notified() => break,
                _ = self.poll() => {}
            }
        }
        self.stop();
    }

    fn stop(&mut self) {
        if self.state == DriverState::Executing {
            tracing::warn!("run interrupted by shutdown");
        }
        self.state = DriverState::Idle;
        tracing::info!("watcher stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn midnight() -> NaiveTime {
        NaiveTime::from_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_first_run_is_next_midnight() {
        let trigger = DailyTrigger::new(midnight(), dt(9, 14, 30, 0));
        assert_eq!(trigger.next_run(), dt(10, 0, 0, 0));
        assert!(!trigger.is_due(dt(9, 23, 59, 59)));
        assert!(trigger.is_due(dt(10, 0, 0, 0)));
    }

    #[test]
    fn test_later_today() {
        let at = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        let trigger = DailyTrigger::new(at, dt(9, 14, 30, 0));
        assert_eq!(trigger.next_run(), dt(9, 18, 0, 0));
    }

    #[test]
    fn test_exactly_at_time_waits_a_day() {
        let trigger = DailyTrigger::new(midnight(), dt(9, 0, 0, 0));
        assert_eq!(trigger.next_run(), dt(10, 0, 0, 0));
    }

    #[test]
    fn test_mark_ran_moves_to_next_day() {
        let mut trigger = DailyTrigger::new(midnight(), dt(9, 12, 0, 0));
        assert!(trigger.is_due(dt(10, 0, 0, 30)));
        trigger.mark_ran(dt(10, 0, 1, 0));
        assert_eq!(trigger.next_run(), dt(11, 0, 0, 0));
        assert!(!trigger.is_due(dt(10, 0, 2, 0)));
    }

    #[test]
    fn test_missed_days_run_once() {
        let mut trigger = DailyTrigger::new(midnight(), dt(1, 12, 0, 0));
        // Machine slept for a week.
        assert!(trigger.is_due(dt(8, 9, 0, 0)));
        trigger.mark_ran(dt(8, 9, 0, 5));
        assert_eq!(trigger.next_run(), dt(9, 0, 0, 0));
    }

    #[test]
    fn test_zero_poll_interval_falls_back_to_default() {
        let cfg = WatchConfig {
            poll_interval: Duration::ZERO,
            ..WatchConfig::default()
        };
        let client = HttpClient::new(None).unwrap();
        let driver = Driver::new(
            cfg,
            client,
            Box::new(crate::history::NoopHistory),
            SystemClock,
        );
        assert_eq!(
            driver.config().poll_interval,
            Duration::from_secs(DEFAULT_POLL_SECS)
        );
    }

    #[test]
    fn test_month_rollover() {
        let trigger = DailyTrigger::new(midnight(), dt(31, 8, 0, 0));
        assert_eq!(
            trigger.next_run(),
            NaiveDate::from_ymd_opt(2024, 4, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }
}
