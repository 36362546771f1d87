use std::sync::{Arc, Mutex, OnceLock};

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use guessshot_core::{
  catalog::MemoryCatalog,
  config::QuizConfig,
  profile::{UserHandle, UserProfile},
  question::Question,
  transport::{ChatTransport, DeliveryFailure, Notice},
};
use guessshot_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::{AppState, AuthConfig, api_router};

// ─── Fixture ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingTransport {
  questions: Mutex<Vec<(UserHandle, u32)>>,
  notices:   Mutex<Vec<UserHandle>>,
}

impl ChatTransport for RecordingTransport {
  async fn send_question(
    &self,
    recipient: &UserProfile,
    _topic: &str,
    question: &Question,
  ) -> Result<(), DeliveryFailure> {
    self.questions.lock().unwrap().push((recipient.handle, question.id));
    Ok(())
  }

  async fn send_notice(&self, recipient: &UserProfile, _notice: Notice) -> Result<(), DeliveryFailure> {
    self.notices.lock().unwrap().push(recipient.handle);
    Ok(())
  }
}

fn question(id: u32) -> Question {
  Question {
    id,
    question: format!("Which city is this? #{id}"),
    options:  vec!["Kazan".into(), "Tver".into()],
    answer:   "Kazan".into(),
    image:    None,
    fact:     None,
  }
}

fn password_hash() -> String {
  static HASH: OnceLock<String> = OnceLock::new();
  HASH
    .get_or_init(|| {
      let salt = SaltString::generate(&mut OsRng);
      Argon2::default()
        .hash_password(b"secret", &salt)
        .unwrap()
        .to_string()
    })
    .clone()
}

async fn app() -> (Router, Arc<RecordingTransport>) {
  let transport = Arc::new(RecordingTransport::default());
  let state = AppState {
    store:     Arc::new(SqliteStore::open_in_memory().await.unwrap()),
    catalog:   Arc::new(
      MemoryCatalog::new()
        .with_topic("cities", "ru", vec![question(1), question(2)])
        .with_topic("cities", "en", vec![question(1)]),
    ),
    transport: Arc::clone(&transport),
    config:    Arc::new(QuizConfig::default()),
    auth:      Arc::new(AuthConfig {
      username:      "operator".into(),
      password_hash: password_hash(),
    }),
  };
  (api_router(state), transport)
}

fn basic(user: &str, pass: &str) -> String {
  format!("Basic {}", B64.encode(format!("{user}:{pass}")))
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  auth: Option<String>,
  body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(auth) = auth {
    builder = builder.header(header::AUTHORIZATION, auth);
  }
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };

  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, headers, json)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let (status, _, json) = send(app, method, uri, Some(basic("operator", "secret")), body).await;
  (status, json)
}

async fn register(app: &Router, id: i64) {
  let (status, _) = call(app, "POST", &format!("/users/{id}/contact"), Some(json!({}))).await;
  assert_eq!(status, StatusCode::CREATED);
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_are_challenged() {
  let (app, _) = app().await;
  let (status, headers, body) = send(&app, "GET", "/users/1", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert!(headers.contains_key(header::WWW_AUTHENTICATE));
  assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn wrong_password_is_rejected() {
  let (app, _) = app().await;
  let (status, ..) =
    send(&app, "GET", "/users/1", Some(basic("operator", "guess")), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn invalid_base64_is_rejected() {
  let (app, _) = app().await;
  let (status, ..) =
    send(&app, "GET", "/users/1", Some("Basic !!!".into()), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Users ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_contact_creates_then_returns_existing() {
  let (app, _) = app().await;
  let body = json!({ "display_name": "anya" });

  let (status, first) = call(&app, "POST", "/users/10/contact", Some(body.clone())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(first["created"], true);
  assert_eq!(first["profile"]["locale"], "ru");

  let (status, second) = call(&app, "POST", "/users/10/contact", Some(body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(second["created"], false);
}

#[tokio::test]
async fn referral_payload_credits_referrer() {
  let (app, _) = app().await;
  register(&app, 1).await;

  let (_, reg) =
    call(&app, "POST", "/users/2/contact", Some(json!({ "payload": "ref_1" }))).await;
  assert_eq!(reg["referral_credited"], true);

  let (_, host) = call(&app, "GET", "/users/1", None).await;
  assert_eq!(host["referral_count"], 1);
}

#[tokio::test]
async fn unknown_profile_is_404() {
  let (app, _) = app().await;
  let (status, body) = call(&app, "GET", "/users/404", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn locale_is_validated() {
  let (app, _) = app().await;
  register(&app, 1).await;

  let (status, _) = call(&app, "PUT", "/users/1/locale", Some(json!({ "locale": "de" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, profile) =
    call(&app, "PUT", "/users/1/locale", Some(json!({ "locale": "en" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(profile["locale"], "en");
}

#[tokio::test]
async fn next_question_until_exhausted() {
  let (app, _) = app().await;
  register(&app, 1).await;

  for _ in 0..2 {
    let (status, sel) = call(&app, "POST", "/users/1/next/cities", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sel["status"], "question");
  }
  let (_, sel) = call(&app, "POST", "/users/1/next/cities", None).await;
  assert_eq!(sel["status"], "exhausted");

  let (status, _) = call(&app, "POST", "/users/1/next/paintings", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn next_question_honours_locale_override() {
  let (app, _) = app().await;
  register(&app, 1).await;

  let (_, sel) = call(&app, "POST", "/users/1/next/cities?locale=en", None).await;
  assert_eq!(sel["question"]["id"], 1);
  let (_, sel) = call(&app, "POST", "/users/1/next/cities?locale=en", None).await;
  assert_eq!(sel["status"], "exhausted");
}

// ─── Answers ──────────────────────────────────────────────────────────────────

fn answer(user: i64, question_id: u32, option: &str) -> Value {
  json!({
    "user": user,
    "question_id": question_id,
    "topic": "cities",
    "chosen_option": option,
  })
}

#[tokio::test]
async fn answer_is_scored_once_per_day() {
  let (app, _) = app().await;
  register(&app, 1).await;

  let (status, outcome) = call(&app, "POST", "/answers", Some(answer(1, 1, "Kazan"))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(outcome["correct"], true);
  assert_eq!(outcome["score"], 1);
  assert_eq!(outcome["unlocked"], json!([]));

  let (status, body) = call(&app, "POST", "/answers", Some(answer(1, 1, "Tver"))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].is_string());

  let (_, profile) = call(&app, "GET", "/users/1", None).await;
  assert_eq!(profile["games_played"], 1);
}

#[tokio::test]
async fn client_timestamp_cannot_move_answer_to_another_day() {
  let (app, _) = app().await;
  register(&app, 1).await;

  let mut past = answer(1, 1, "Kazan");
  past["submitted_at"] = json!("2020-01-01T09:00:00Z");
  let (status, _) = call(&app, "POST", "/answers", Some(past)).await;
  assert_eq!(status, StatusCode::OK);

  let mut future = answer(1, 1, "Kazan");
  future["submitted_at"] = json!("2099-01-01T09:00:00Z");
  let (status, _) = call(&app, "POST", "/answers", Some(future)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, profile) = call(&app, "GET", "/users/1", None).await;
  assert_eq!((profile["score"].as_u64(), profile["games_played"].as_u64()), (Some(1), Some(1)));
}

#[tokio::test]
async fn wrong_answer_reveals_canonical_one() {
  let (app, _) = app().await;
  register(&app, 1).await;

  let (_, outcome) = call(&app, "POST", "/answers", Some(answer(1, 2, "Tver"))).await;
  assert_eq!(outcome["correct"], false);
  assert_eq!(outcome["canonical_answer"], "Kazan");
  assert_eq!(outcome["streak"], 0);
}

#[tokio::test]
async fn unknown_question_is_404() {
  let (app, _) = app().await;
  register(&app, 1).await;

  let (status, _) = call(&app, "POST", "/answers", Some(answer(1, 77, "Kazan"))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_answer_body_is_400() {
  let (app, _) = app().await;
  let (status, body) =
    call(&app, "POST", "/answers", Some(json!({ "user": "not a number" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn stats_reports_losses() {
  let (app, _) = app().await;
  register(&app, 1).await;
  call(&app, "POST", "/answers", Some(answer(1, 1, "Tver"))).await;
  call(&app, "POST", "/answers", Some(answer(1, 2, "Kazan"))).await;

  let (status, stats) = call(&app, "GET", "/users/1/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["losses"], 1);
  assert_eq!(stats["profile"]["score"], 1);
}

// ─── Leaderboard ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn leaderboard_reports_no_activity_then_ranks() {
  let (app, _) = app().await;

  let (status, board) = call(&app, "GET", "/leaderboard/day", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(board["status"], "no_activity");

  register(&app, 1).await;
  register(&app, 2).await;
  call(&app, "POST", "/answers", Some(answer(2, 1, "Kazan"))).await;
  call(&app, "POST", "/answers", Some(answer(2, 2, "Kazan"))).await;
  call(&app, "POST", "/answers", Some(answer(1, 1, "Kazan"))).await;

  let (_, board) = call(&app, "GET", "/leaderboard/day?view=menu", None).await;
  assert_eq!(board["status"], "ranked");
  assert_eq!(board["standings"][0]["user"], 2);
  assert_eq!(board["standings"][0]["correct"], 2);
  assert_eq!(board["awarded"][0]["badge"], "🥇");

  let (_, again) = call(&app, "GET", "/leaderboard/day", None).await;
  assert_eq!(again["awarded"], json!([]));
}

#[tokio::test]
async fn unknown_window_is_400() {
  let (app, _) = app().await;
  let (status, _) = call(&app, "GET", "/leaderboard/year", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Broadcast ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn broadcasts_reach_every_profile() {
  let (app, transport) = app().await;
  for id in 1..=3 {
    register(&app, id).await;
  }

  let (status, report) = call(&app, "POST", "/broadcast/topic/cities", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report, json!({ "delivered": 3, "exhausted": 0, "failed": 0 }));
  assert_eq!(transport.questions.lock().unwrap().len(), 3);

  let (_, report) = call(&app, "POST", "/broadcast/reminder", None).await;
  assert_eq!(report["delivered"], 3);
  assert_eq!(transport.notices.lock().unwrap().len(), 3);
}
