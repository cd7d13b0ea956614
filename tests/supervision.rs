use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use appvisor::{
    Ambient, AppBuilder, AppError, AppState, Application, Supervisor, SupervisorConfig,
    SupervisorStatus,
};

/// Returns from `run` immediately, like a test application without a loop.
struct Oneshot;

#[async_trait]
impl Application for Oneshot {
    async fn run(&self, _state: AppState) -> Result<(), AppError> {
        Ok(())
    }
}

/// Loops until its running flag is cleared.
struct Looper;

#[async_trait]
impl Application for Looper {
    fn kind(&self) -> &'static str {
        "Looper"
    }

    async fn run(&self, state: AppState) -> Result<(), AppError> {
        while state.is_running() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(())
    }
}

/// Fails with a two-level error chain.
struct Broken;

#[async_trait]
impl Application for Broken {
    async fn run(&self, _state: AppState) -> Result<(), AppError> {
        let err = anyhow::anyhow!("socket closed").context("reading sensor frame");
        Err(err.into())
    }
}

fn supervisor(name: &str) -> Arc<Supervisor> {
    let cfg = SupervisorConfig {
        workers: 2,
        catch_signals: false,
        poll_interval: Duration::from_millis(10),
        ..SupervisorConfig::named(name)
    };
    Supervisor::builder(cfg).build().expect("supervisor")
}

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes log output of the current thread (and of work submitted from it) into a buffer.
fn capture_logs() -> (Capture, DefaultGuard) {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}

#[tokio::test]
async fn finished_app_is_reported_then_removed() {
    let sup = supervisor("DS Application Server");
    let app = AppBuilder::new("Test Application", Oneshot)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&Ambient::lookup_only())
        .await
        .expect("launch");

    assert!(app.is_running());
    assert_eq!(app.name(), "Test Application");
    assert!(Arc::ptr_eq(app.supervisor(), &sup));

    tokio::time::timeout(Duration::from_secs(2), app.handle().finished())
        .await
        .expect("oneshot finished");

    let dead = sup.application_check(None).await;
    assert_eq!(dead.len(), 1);

    sup.remove_application(&dead[0]).await.expect("remove");
    assert!(sup.application_check(None).await.is_empty());
    assert!(!app.is_running());
}

#[tokio::test]
async fn implicit_binding_reuses_the_default_supervisor() {
    static AMBIENT: Ambient = Ambient::new();
    assert!(AMBIENT.get().is_none());

    // The default autostarts, so launching B blocks until its run loop exits.
    let b = tokio::spawn(AppBuilder::new("B", Looper).launch_in(&AMBIENT));

    let default = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Some(sup) = AMBIENT.get() {
                if sup.len().await == 1 {
                    return sup;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("default supervisor with B registered");
    assert!(default.config().autostart);

    let c = AppBuilder::new("C", Looper)
        .launch_in(&AMBIENT)
        .await
        .expect("launch C");
    assert!(Arc::ptr_eq(c.supervisor(), &default));
    assert_eq!(default.len().await, 2);

    default.interrupt();
    let b = tokio::time::timeout(Duration::from_secs(5), b)
        .await
        .expect("run loop exited")
        .expect("join")
        .expect("launch B");

    assert!(Arc::ptr_eq(b.supervisor(), &default));
    assert!(!b.is_running());
    assert!(!c.is_running());
    assert!(default.is_empty().await);
    assert_eq!(default.status(), SupervisorStatus::Stopped);
}

#[tokio::test]
async fn failure_is_logged_line_by_line() {
    let (capture, _guard) = capture_logs();

    let sup = supervisor("failures");
    let app = AppBuilder::new("sensor", Broken)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&Ambient::lookup_only())
        .await
        .expect("launch");
    tokio::time::timeout(Duration::from_secs(2), app.handle().finished())
        .await
        .expect("broken finished");

    let dead = sup.application_check(None).await;
    assert_eq!(dead.len(), 1);

    let id = app.handle().id().to_string();
    let logs = capture.contents();
    assert!(logs.contains(&format!("Application at {id} has thrown an unhandled error")));

    let trace: Vec<&str> = logs
        .lines()
        .filter(|l| l.contains("ERROR") && l.contains(&format!("{id}: ")))
        .collect();
    assert!(trace.len() >= 3, "expected one line per trace line: {trace:?}");
    assert!(trace.iter().any(|l| l.contains("reading sensor frame")));
    assert!(trace.iter().any(|l| l.contains("socket closed")));
}

#[tokio::test]
async fn shutdown_stops_every_app() {
    let sup = supervisor("shutdown");
    let mut apps = Vec::new();
    for name in ["clock", "status-bar", "poller"] {
        let app = AppBuilder::new(name, Looper)
            .with_supervisor(Arc::clone(&sup))
            .launch_in(&Ambient::lookup_only())
            .await
            .expect("launch");
        apps.push(app);
    }
    assert_eq!(sup.len().await, 3);

    sup.shutdown().await;

    assert_eq!(sup.len().await, 0);
    assert!(apps.iter().all(|a| !a.is_running()));
}

#[tokio::test]
async fn run_loop_removes_self_stopped_apps() {
    let sup = supervisor("self-stop");
    let app = AppBuilder::new("wizard", Looper)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&Ambient::lookup_only())
        .await
        .expect("launch");

    let runner = Arc::clone(&sup);
    let run = tokio::spawn(async move { runner.run().await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    app.stop();

    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run loop exited")
        .expect("join");
    assert!(sup.is_empty().await);
    assert_eq!(sup.status(), SupervisorStatus::Stopped);
}

#[tokio::test]
async fn returning_without_stop_request_is_warned() {
    let (capture, _guard) = capture_logs();

    let sup = supervisor("contract");
    let quick = AppBuilder::new("quick", Oneshot)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&Ambient::lookup_only())
        .await
        .expect("launch quick");
    let polite = AppBuilder::new("polite", Looper)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&Ambient::lookup_only())
        .await
        .expect("launch polite");

    polite.stop();
    for app in [&quick, &polite] {
        tokio::time::timeout(Duration::from_secs(2), app.handle().finished())
            .await
            .expect("finished");
    }

    let logs = capture.contents();
    assert!(
        logs.contains("Application 'quick' returned from run() without a stop request"),
        "{logs}"
    );
    assert!(!logs.contains("Application 'polite' returned from run()"), "{logs}");
}

#[tokio::test]
async fn removal_log_names_the_application_class() {
    let (capture, _guard) = capture_logs();

    let sup = supervisor("removal");
    let app = AppBuilder::new("clock", Looper)
        .with_supervisor(Arc::clone(&sup))
        .launch_in(&Ambient::lookup_only())
        .await
        .expect("launch");

    sup.remove_application(app.handle()).await.expect("remove");

    let id = app.handle().id();
    let logs = capture.contents();
    assert!(
        logs.contains(&format!("Application {id} Looper(name: 'clock') terminated")),
        "{logs}"
    );
}
