//! End-to-end pipeline tests against a scripted runner and a loopback
//! report server

use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::time::Duration;

use fnship_core::config::Config;
use fnship_core::pipeline::Pipeline;
use fnship_core::poll::{Poller, ReportClient, SystemClock};
use fnship_core::process::CommandRunner;
use fnship_core::state::DeployRecord;
use fnship_core::{Error, Result};

const REPORT_HTML: &str = "<!DOCTYPE html><html><body><h1>Environment report</h1></body></html>";

/// Runner that records invocations, materializes a fake checkout on
/// `git clone`, and answers `gcloud functions describe` with a fixed URL.
struct FakeRunner {
    calls: RefCell<Vec<Vec<String>>>,
    describe_url: String,
    /// Entry file written into the fake checkout, if any
    entry_file: Option<&'static str>,
}

impl FakeRunner {
    fn new(describe_url: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            describe_url: describe_url.to_string(),
            entry_file: Some("main.py"),
        }
    }

    fn without_entry_file(mut self) -> Self {
        self.entry_file = None;
        self
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    fn has_call_containing(&self, needle: &str) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|argv| argv.join(" ").contains(needle))
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, argv: &[String], _cwd: Option<&Utf8Path>) -> Result<()> {
        self.calls.borrow_mut().push(argv.to_vec());

        if argv.get(1).map(String::as_str) == Some("clone") {
            let target = Utf8PathBuf::from(&argv[3]);
            let source_dir = target.join("backend/pythonver");
            std::fs::create_dir_all(&source_dir).unwrap();
            if let Some(entry) = self.entry_file {
                std::fs::write(source_dir.join(entry), "def handler(request): pass\n").unwrap();
            }
        }

        Ok(())
    }

    fn output(&self, argv: &[String], _cwd: Option<&Utf8Path>) -> Result<String> {
        self.calls.borrow_mut().push(argv.to_vec());

        let line = argv.join(" ");
        if line.contains("--version") {
            Ok("Python 3.12.1\n".to_string())
        } else if line.contains("describe") {
            Ok(format!("{}\n", self.describe_url))
        } else {
            Ok(String::new())
        }
    }
}

/// Serve the given (status, body) responses on a loopback port, one
/// connection each, then exit.
fn spawn_report_server(responses: Vec<(u16, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    std::thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);

            let reason = if status == 200 { "OK" } else { "Service Unavailable" };
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://127.0.0.1:{}", port)
}

fn test_config() -> Config {
    Config::parse(
        r#"
[tools]
python = "/fake/python3"
git = "/fake/git"
gcloud = "/fake/gcloud"

[poll]
timeout_secs = 30
interval_secs = 0
request_timeout_secs = 2
"#,
    )
    .unwrap()
}

#[test]
fn pipeline_deploys_and_fetches_report() {
    let base_url = spawn_report_server(vec![
        (503, "not ready".to_string()),
        (200, REPORT_HTML.to_string()),
    ]);

    let state_dir = tempfile::tempdir().unwrap();
    let state_path = Utf8Path::from_path(state_dir.path())
        .unwrap()
        .join("last_deploy.json");

    let config = test_config();
    let runner = FakeRunner::new(&base_url);
    let clock = SystemClock;

    let outcome = Pipeline::new(&config, &runner, &clock)
        .show_progress(false)
        .state_path(Some(state_path.clone()))
        .run()
        .unwrap();

    assert_eq!(outcome.function_url, base_url);

    // The report was saved and contains the served HTML
    let report_path = outcome.report_path.expect("report should have been saved");
    assert!(report_path.as_str().ends_with(".html"));
    assert_eq!(std::fs::read_to_string(&report_path).unwrap(), REPORT_HTML);
    std::fs::remove_file(&report_path).unwrap();

    // The deployment was recorded
    let record = DeployRecord::load(&state_path).unwrap().unwrap();
    assert_eq!(record.function, "pythonver");
    assert_eq!(record.url, base_url);

    // External calls ran in pipeline order
    let calls = runner.calls();
    let joined: Vec<String> = calls.iter().map(|argv| argv.join(" ")).collect();

    // Four import probes, then the interpreter version
    assert_eq!(joined.iter().filter(|l| l.contains("-c import")).count(), 4);
    let clone_pos = joined.iter().position(|l| l.contains("clone")).unwrap();
    let upgrade_pos = joined.iter().position(|l| l.contains("--upgrade")).unwrap();
    let deploy_pos = joined
        .iter()
        .position(|l| l.contains("functions deploy"))
        .unwrap();
    let describe_pos = joined
        .iter()
        .position(|l| l.contains("functions describe"))
        .unwrap();
    assert!(clone_pos < upgrade_pos);
    assert!(upgrade_pos < deploy_pos);
    assert!(deploy_pos < describe_pos);

    // No manifest in the fake checkout: the skip is silent, not a failure
    assert!(!runner.has_call_containing("install -r"));

    // The opener was the last call and points at the saved report
    let opener = calls.last().unwrap();
    assert!(opener.last().unwrap().ends_with(".html"));
}

#[test]
fn pipeline_missing_entry_point_skips_deploy() {
    let config = test_config();
    let runner = FakeRunner::new("https://unused.example").without_entry_file();
    let clock = SystemClock;

    let err = Pipeline::new(&config, &runner, &clock)
        .show_progress(false)
        .state_path(None)
        .run()
        .unwrap_err();

    assert!(matches!(err, Error::Precondition { .. }));
    assert!(!runner.has_call_containing("functions deploy"));
}

#[test]
fn report_only_prefers_recorded_url() {
    let base_url = spawn_report_server(vec![(200, REPORT_HTML.to_string())]);

    let state_dir = tempfile::tempdir().unwrap();
    let state_path = Utf8Path::from_path(state_dir.path())
        .unwrap()
        .join("last_deploy.json");
    DeployRecord::new("pythonver", "europe-central2", &base_url)
        .save(&state_path)
        .unwrap();

    let config = test_config();
    let runner = FakeRunner::new("https://unused.example");
    let clock = SystemClock;

    let outcome = Pipeline::new(&config, &runner, &clock)
        .show_progress(false)
        .open_browser(false)
        .state_path(Some(state_path))
        .report_only()
        .unwrap();

    assert_eq!(outcome.function_url, base_url);
    // The URL came from the record, never from gcloud
    assert!(!runner.has_call_containing("describe"));

    if let Some(path) = outcome.report_path {
        std::fs::remove_file(path).unwrap();
    }
}

#[test]
fn polling_tolerates_connection_refused_until_timeout() {
    // Bind then drop to obtain a port that refuses connections
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = format!("http://127.0.0.1:{}/?action=report", port);

    let clock = SystemClock;
    let client = ReportClient::new(Duration::from_secs(1)).unwrap();
    let poller = Poller::new(&clock, Duration::from_millis(100), Duration::from_secs(1));

    let err = fnship_core::poll::wait_for_report(&client, &poller, &url).unwrap_err();

    // Refused connections are absorbed; only the deadline surfaces
    assert!(matches!(err, Error::Timeout { .. }));
}
