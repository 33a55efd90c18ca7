/// HTTP client tests against a throwaway `tiny_http` backend.
///
/// Each test binds its own server on an ephemeral port, answers a fixed
/// list of responses, and hands back what the client actually sent.
use std::io::Read;
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use repcoach::api::{ClientError, CoachApi, HttpClient, RequestInit};
use repcoach::cli;
use repcoach::config::CoachConfig;
use repcoach::journal::{Journal, Outcome};
use repcoach::schema::{
    AnalyticsResponse, DashboardResponse, ExerciseLog, ProfileUpdate, SessionInput,
    SessionLogged, SessionMetrics,
};
use tiny_http::{Header, Response, Server};

// ---------------------------------------------------------------------------
// Mock backend
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct MockBackend {
    base_url: String,
    requests: Receiver<Captured>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Serve `responses` in order, one per incoming request, then stop.
    fn serve(responses: Vec<(u16, &'static str)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("bind mock backend");
        let addr = server.server_addr().to_ip().expect("ip listener");
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let Ok(mut request) = server.recv() else {
                    return;
                };
                let mut received = String::new();
                let _ = request.as_reader().read_to_string(&mut received);
                let _ = tx.send(Captured {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    headers: request
                        .headers()
                        .iter()
                        .map(|h| (h.field.as_str().to_string(), h.value.as_str().to_string()))
                        .collect(),
                    body: received,
                });
                let content_type =
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("static header");
                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(content_type);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url: format!("http://{addr}/api"),
            requests: rx,
            handle,
        }
    }

    fn client(&self) -> HttpClient {
        HttpClient::new(&self.base_url)
    }

    /// Config pointing the CLI at this backend, with journaling off.
    fn config(&self) -> CoachConfig {
        let mut config = CoachConfig::default();
        config.api.base_url = self.base_url.clone();
        config.logging.enabled = false;
        config
    }

    fn finish(self) -> Vec<Captured> {
        let _ = self.handle.join();
        self.requests.try_iter().collect()
    }
}

const DASHBOARD: &str = r#"{
    "next_workout": {
        "target_date": "2024-06-04",
        "exercise": "Squat",
        "sets": 4,
        "reps": 5,
        "load_kg": 100,
        "deload": false,
        "rationale": {"readiness": 0.82, "phase": "accumulation"}
    },
    "latest_metrics": {
        "date": "2024-06-03",
        "sleep_hours": 7.5,
        "resting_hr": 52,
        "hrv_rmssd": 61.2,
        "soreness": 3,
        "motivation": 7,
        "rpe_session": 7.5,
        "duration_min": 60
    },
    "recent_sessions": [
        {"date": "2024-06-03", "exercise_count": 3, "tonnage": 5400.0, "avg_rir": 2.0}
    ]
}"#;

fn session_input() -> SessionInput {
    SessionInput {
        user_id: 1,
        metrics: SessionMetrics::defaults_for(chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
        exercises: vec![ExerciseLog::seed()],
    }
}

// ---------------------------------------------------------------------------
// Success path
// ---------------------------------------------------------------------------

#[test]
fn success_body_is_returned_unmodified() {
    let backend = MockBackend::serve(vec![(200, DASHBOARD)]);
    let dashboard = backend.client().get_dashboard(1).unwrap();

    let expected: DashboardResponse = serde_json::from_str(DASHBOARD).unwrap();
    assert_eq!(dashboard, expected);
    assert_eq!(dashboard.next_workout.load_kg, 100.0);
    assert_eq!(
        serde_json::to_value(&dashboard).unwrap(),
        serde_json::to_value(&expected).unwrap()
    );

    let requests = backend.finish();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].url, "/api/dashboard?user_id=1");
}

#[test]
fn post_sends_json_body_with_content_type() {
    let backend = MockBackend::serve(vec![(200, r#"{"session_id": 42}"#)]);
    let payload = session_input();
    let logged = backend.client().log_session(&payload).unwrap();
    assert_eq!(logged, SessionLogged { session_id: 42 });

    let requests = backend.finish();
    let sent = &requests[0];
    assert_eq!(sent.method, "POST");
    assert_eq!(sent.url, "/api/log-session");
    assert_eq!(sent.header("Content-Type"), Some("application/json"));
    let body: SessionInput = serde_json::from_str(&sent.body).unwrap();
    assert_eq!(body, payload);
}

#[test]
fn profile_update_uses_put_without_user_id() {
    let stored = r#"{"user_id": 1, "age": 30, "bodyweight_kg": 80.0,
        "training_age_years": 2.0, "goal": "hypertrophy", "mrv_baseline_sets": 14}"#;
    let backend = MockBackend::serve(vec![(200, stored)]);
    let profile = backend
        .client()
        .update_profile(&ProfileUpdate::default())
        .unwrap();
    assert_eq!(profile.user_id, 1);

    let requests = backend.finish();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].url, "/api/profile");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert!(body.get("user_id").is_none());
}

#[test]
fn caller_headers_are_merged_with_content_type() {
    let backend = MockBackend::serve(vec![(200, r#"{"session_id": 1}"#)]);
    let init = RequestInit::get().header("X-Request-Source", "shell");
    let _: SessionLogged = backend.client().request("/ping", init).unwrap();

    let requests = backend.finish();
    assert_eq!(requests[0].header("Content-Type"), Some("application/json"));
    assert_eq!(requests[0].header("X-Request-Source"), Some("shell"));
}

#[test]
fn analytics_exercise_is_url_encoded() {
    let body = r#"{"sessions": 0, "fatigue_mean": 0, "stimulus_mean": 0,
        "readiness_mean": 0, "weekly_volume": [], "e1rm_trend": []}"#;
    let backend = MockBackend::serve(vec![(200, body)]);
    let analytics: AnalyticsResponse = backend
        .client()
        .get_analytics(3, "Bench Press & Dips")
        .unwrap();
    assert_eq!(analytics.sessions, 0);

    let requests = backend.finish();
    assert_eq!(
        requests[0].url,
        "/api/analytics?user_id=3&exercise=Bench+Press+%26+Dips"
    );
}

// ---------------------------------------------------------------------------
// Error path
// ---------------------------------------------------------------------------

#[test]
fn detail_becomes_error_message() {
    let backend = MockBackend::serve(vec![(404, r#"{"detail":"no data"}"#)]);
    let err = backend.client().get_analytics(1, "Squat").unwrap_err();
    backend.finish();

    let api = err.api().expect("typed API error");
    assert_eq!(api.status, 404);
    assert_eq!(api.message, "no data");
    assert_eq!(err.user_message("Failed to load analytics"), "no data");
}

#[test]
fn non_json_error_body_falls_back_to_status_text() {
    let backend = MockBackend::serve(vec![(404, "nothing here")]);
    let err = backend.client().get_profile().unwrap_err();
    backend.finish();

    let api = err.api().expect("typed API error");
    assert_eq!(api.status, 404);
    assert_eq!(api.message, "Not Found");
}

#[test]
fn malformed_success_body_is_an_api_error() {
    let backend = MockBackend::serve(vec![(200, r#"{"sessionId": 42}"#)]);
    let err = backend.client().log_session(&session_input()).unwrap_err();
    backend.finish();

    let api = err.api().expect("typed API error");
    assert_eq!(api.status, 200);
    assert!(api.message.starts_with("malformed response"), "{}", api.message);
}

#[test]
fn connection_refused_is_a_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = HttpClient::new(&format!("http://127.0.0.1:{port}/api"));

    let err = client.get_dashboard(1).unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
    assert!(err.api().is_none());
    assert_eq!(
        err.user_message("Failed to load dashboard"),
        "Failed to load dashboard"
    );
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

#[test]
fn every_call_is_journaled() {
    let path = std::env::temp_dir().join(format!(
        "repcoach-client-journal-{}.jsonl",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let backend = MockBackend::serve(vec![(200, DASHBOARD), (404, r#"{"detail":"no data"}"#)]);
    let client = backend.client().with_journal(Journal::at(&path));
    client.get_dashboard(1).unwrap();
    client.get_analytics(1, "Squat").unwrap_err();
    backend.finish();

    let entries = Journal::at(&path).read_all();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].outcome, Outcome::Ok);
    assert_eq!(entries[0].status, Some(200));
    assert_eq!(entries[0].path, "/dashboard?user_id=1");
    assert_eq!(entries[1].outcome, Outcome::ApiError);
    assert_eq!(entries[1].message.as_deref(), Some("no data"));

    let _ = std::fs::remove_file(&path);
}

// ---------------------------------------------------------------------------
// CLI submissions
// ---------------------------------------------------------------------------

const STORED_PROFILE: &str = r#"{"user_id": 1, "age": 50, "bodyweight_kg": 92.0,
    "training_age_years": 12.0, "goal": "powerlifting", "mrv_baseline_sets": 18}"#;

#[test]
fn profile_update_applies_edits_over_the_stored_profile() {
    let backend = MockBackend::serve(vec![(200, STORED_PROFILE), (200, STORED_PROFILE)]);
    cli::run_profile_update(&backend.config(), &["age=51".to_string()]).unwrap();

    let requests = backend.finish();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].method, "PUT");
    let body: ProfileUpdate = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body.age, 51);
    assert_eq!(body.goal, "powerlifting");
    assert_eq!(body.mrv_baseline_sets, 18);
}

#[test]
fn profile_update_refuses_to_save_when_the_load_fails() {
    let backend = MockBackend::serve(vec![(503, r#"{"detail":"database unavailable"}"#)]);
    let err = cli::run_profile_update(&backend.config(), &["age=51".to_string()]).unwrap_err();

    let requests = backend.finish();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert!(err.to_string().contains("database unavailable"), "{err}");
}

#[test]
fn failed_write_makes_the_command_fail() {
    let backend = MockBackend::serve(vec![(422, r#"{"detail":"date is in the future"}"#)]);
    let err = cli::run_metrics(&backend.config(), &["date=2024-06-01".to_string()]).unwrap_err();
    backend.finish();

    assert!(err.to_string().contains("date is in the future"), "{err}");
}

#[test]
fn successful_write_exits_cleanly() {
    let backend = MockBackend::serve(vec![(200, r#"{"session_id": 7}"#)]);
    cli::run_log_session(&backend.config(), &[], &[]).unwrap();

    let requests = backend.finish();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].url, "/api/log-session");
}
