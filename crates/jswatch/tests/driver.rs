//! Driver scheduling against a simulated clock.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;
use tokio::sync::Notify;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jswatch::{Clock, Driver, DriverState, HttpClient, NoopHistory, WatchConfig};

#[derive(Clone)]
struct FakeClock(Arc<Mutex<NaiveDateTime>>);

impl FakeClock {
    fn at(now: NaiveDateTime) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    fn set(&self, now: NaiveDateTime) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        *self.0.lock().unwrap()
    }
}

fn snapshot_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.file_name().to_string_lossy().starts_with("starbucks_js_"))
                .count()
        })
        .unwrap_or(0)
}

/// Wait (in real time) until `dir` holds `n` snapshots.
async fn wait_for_snapshots(dir: &Path, n: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while snapshot_count(dir) < n {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("expected {n} snapshot(s) in {}", dir.display()));
}

async fn serve_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<script src="/a.js"></script>"#))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a()"))
        .mount(server)
        .await;
}

fn dt(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[tokio::test]
async fn test_driver_runs_once_per_day() {
    let server = MockServer::start().await;
    serve_page(&server).await;

    let out = TempDir::new().unwrap();
    let cfg = WatchConfig {
        base_url: server.uri(),
        output_dir: out.path().join("snaps"),
        request_timeout: Some(Duration::from_secs(5)),
        ..WatchConfig::default()
    };
    let client = HttpClient::new(cfg.request_timeout).unwrap();
    let clock = FakeClock::at(dt(9, 15, 0, 0));
    let mut driver = Driver::new(cfg, client, Box::new(NoopHistory), clock.clone());

    assert_eq!(driver.state(), DriverState::Starting);
    assert_eq!(driver.next_run(), dt(10, 0, 0, 0));

    // Startup run happens regardless of the trigger.
    let startup = driver.run_now().await;
    assert_eq!(startup.timestamp, "20240309_150000");
    assert_eq!(driver.state(), DriverState::Idle);

    // Polls before midnight do nothing.
    clock.set(dt(9, 23, 59, 0));
    assert!(driver.poll().await.is_none());

    // First poll after midnight runs.
    clock.set(dt(10, 0, 0, 30));
    let report = driver.poll().await.expect("scheduled run");
    assert_eq!(report.timestamp, "20240310_000030");
    assert_eq!(report.downloaded.len(), 1);
    assert_eq!(driver.next_run(), dt(11, 0, 0, 0));

    // Later the same day: nothing.
    clock.set(dt(10, 0, 1, 30));
    assert!(driver.poll().await.is_none());

    assert_eq!(snapshot_count(&out.path().join("snaps")), 2);
}

#[tokio::test]
async fn test_run_forever_runs_at_startup_then_daily_until_shutdown() {
    let server = MockServer::start().await;
    serve_page(&server).await;

    let out = TempDir::new().unwrap();
    let snaps = out.path().join("snaps");
    let cfg = WatchConfig {
        base_url: server.uri(),
        output_dir: snaps.clone(),
        poll_interval: Duration::from_millis(20),
        request_timeout: Some(Duration::from_secs(5)),
        ..WatchConfig::default()
    };
    let client = HttpClient::new(cfg.request_timeout).unwrap();
    let clock = FakeClock::at(dt(9, 15, 0, 0));
    let driver = Driver::new(cfg, client, Box::new(NoopHistory), clock.clone());

    let shutdown = Arc::new(Notify::new());
    let handle = tokio::spawn(driver.run_forever(Arc::clone(&shutdown)));

    wait_for_snapshots(&snaps, 1).await;
    assert!(snaps.join("starbucks_js_20240309_150000.js").exists());

    // Several polls before midnight: nothing new.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(snapshot_count(&snaps), 1);

    clock.set(dt(10, 0, 0, 30));
    wait_for_snapshots(&snaps, 2).await;
    assert!(snaps.join("starbucks_js_20240310_000030.js").exists());

    // Still the same day: the trigger has moved on to tomorrow.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(snapshot_count(&snaps), 2);

    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop stops on shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_shutdown_interrupts_stalled_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3600)))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    // No request timeout: only shutdown can end the stalled fetch.
    let cfg = WatchConfig {
        base_url: server.uri(),
        output_dir: out.path().join("snaps"),
        ..WatchConfig::default()
    };
    let client = HttpClient::new(cfg.request_timeout).unwrap();
    let driver = Driver::new(
        cfg,
        client,
        Box::new(NoopHistory),
        FakeClock::at(dt(9, 15, 0, 0)),
    );

    let shutdown = Arc::new(Notify::new());
    let handle = tokio::spawn(driver.run_forever(Arc::clone(&shutdown)));

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(3), handle)
        .await
        .expect("stalled run abandoned on shutdown")
        .unwrap();
    assert_eq!(snapshot_count(&out.path().join("snaps")), 0);
}
