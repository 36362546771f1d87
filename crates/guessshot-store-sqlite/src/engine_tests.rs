//! Engine scenarios run end to end against an in-memory `SqliteStore`.

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use guessshot_core::{
  Error,
  badge::BadgeId,
  catalog::MemoryCatalog,
  config::QuizConfig,
  delivery::Selection,
  engine::{
    Context,
    achievements::{evaluate, stats},
    broadcast::{BroadcastReport, send_quiz_reminder, send_topic_question},
    contact::{Contact, register_contact, set_locale},
    delivery::{play, select_next},
    leaderboard::rank,
    scoring::{Submission, submit_answer},
  },
  profile::{UserHandle, UserProfile},
  question::Question,
  ranking::{Leaderboard, View, Window},
  store::QuizStore,
  transport::{ChatTransport, DeliveryFailure, Notice},
};

use crate::SqliteStore;

// ─── Fixture ─────────────────────────────────────────────────────────────────

fn question(id: u32) -> Question {
  Question {
    id,
    question: format!("Which film is shown in still #{id}?"),
    options:  vec!["Solaris".into(), "Stalker".into(), "Mirror".into()],
    answer:   "Stalker".into(),
    image:    Some(format!("{id}.jpg")),
    fact:     Some(format!("Fact #{id}")),
  }
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap()
}

struct Fixture {
  store:   SqliteStore,
  catalog: MemoryCatalog,
  config:  QuizConfig,
}

impl Fixture {
  async fn new() -> Self {
    Self {
      store:   SqliteStore::open_in_memory().await.expect("in-memory store"),
      catalog: MemoryCatalog::new()
        .with_topic("movies", "ru", (1..=8).map(question).collect())
        .with_topic("cities", "ru", vec![question(1), question(2)]),
      config:  QuizConfig::default(),
    }
  }

  fn ctx(&self) -> Context<'_, SqliteStore, MemoryCatalog> {
    Context::new(&self.store, &self.catalog, &self.config)
  }

  async fn user(&self, id: i64) -> UserHandle {
    let contact = Contact {
      user:         UserHandle(id),
      display_name: Some(format!("player{id}")),
      payload:      None,
    };
    register_contact(self.ctx(), contact).await.unwrap().profile.handle
  }

  async fn answer(
    &self,
    user: UserHandle,
    question_id: u32,
    option: &str,
    submitted_at: DateTime<Utc>,
  ) -> Result<guessshot_core::answer::Outcome, Error> {
    submit_answer(
      self.ctx(),
      Submission {
        user,
        question_id,
        topic: "movies".into(),
        chosen_option: option.into(),
        submitted_at,
      },
    )
    .await
  }

  async fn profile(&self, user: UserHandle) -> UserProfile {
    self.store.get_profile(user).await.unwrap().unwrap()
  }
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn correct_answer_scores_and_returns_fact() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;

  let outcome = fx.answer(u, 3, "Stalker", at(10, 9)).await.unwrap();
  assert!(outcome.correct);
  assert_eq!(outcome.canonical_answer, "Stalker");
  assert_eq!(outcome.fact.as_deref(), Some("Fact #3"));
  assert_eq!((outcome.score, outcome.streak), (1, 1));
}

#[tokio::test]
async fn second_submission_same_day_is_rejected_without_mutation() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;

  fx.answer(u, 1, "Stalker", at(10, 9)).await.unwrap();
  let again = fx.answer(u, 1, "Solaris", at(10, 15)).await;
  assert!(matches!(again, Err(Error::AlreadyAnswered { question_id: 1, .. })));

  let p = fx.profile(u).await;
  assert_eq!((p.score, p.streak, p.games_played), (1, 1, 1));
  assert_eq!(fx.store.attempts_for(u).await.unwrap().len(), 1);
}

#[tokio::test]
async fn day_boundary_follows_user_offset() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;

  // 20:30 UTC is 23:30 in Moscow; 21:30 UTC is already the next day there.
  let before = Utc.with_ymd_and_hms(2026, 10, 10, 20, 30, 0).unwrap();
  let after = Utc.with_ymd_and_hms(2026, 10, 10, 21, 30, 0).unwrap();
  fx.answer(u, 1, "Stalker", before).await.unwrap();
  fx.answer(u, 1, "Stalker", after).await.unwrap();

  assert_eq!(fx.profile(u).await.games_played, 2);
}

#[tokio::test]
async fn streak_counts_consecutive_correct_and_resets_on_miss() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;

  for qid in 1..=4 {
    fx.answer(u, qid, "Stalker", at(10, 9)).await.unwrap();
  }
  assert_eq!(fx.profile(u).await.streak, 4);

  let miss = fx.answer(u, 5, "Mirror", at(10, 10)).await.unwrap();
  assert!(!miss.correct);
  assert_eq!(miss.canonical_answer, "Stalker");

  let p = fx.profile(u).await;
  assert_eq!((p.score, p.streak, p.games_played), (4, 0, 5));
  assert!(p.games_played >= p.score);
  assert_eq!(p.losses(), 1);
}

#[tokio::test]
async fn unknown_question_or_option_is_not_found() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;

  let missing = fx.answer(u, 99, "Stalker", at(10, 9)).await;
  assert!(matches!(missing, Err(Error::QuestionNotFound { question_id: 99, .. })));

  let bad_option = fx.answer(u, 1, "Andrei Rublev", at(10, 9)).await;
  assert!(matches!(bad_option, Err(Error::QuestionNotFound { .. })));

  assert_eq!(fx.profile(u).await.games_played, 0);
}

#[tokio::test]
async fn unavailable_catalog_degrades_to_not_found() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  set_locale(fx.ctx(), u, "en").await.unwrap();

  let result = fx.answer(u, 1, "Stalker", at(10, 9)).await;
  assert!(matches!(result, Err(Error::QuestionNotFound { .. })));
}

#[tokio::test]
async fn unregistered_user_cannot_answer() {
  let fx = Fixture::new().await;
  let result = fx.answer(UserHandle(5), 1, "Stalker", at(10, 9)).await;
  assert!(matches!(result, Err(Error::ProfileNotFound(UserHandle(5)))));
}

// ─── Delivery ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_question_catalog_exhausts_after_two_selections() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;

  let Selection::Question(first) = select_next(fx.ctx(), u, "cities", "ru").await.unwrap() else {
    panic!("expected a question");
  };
  let Selection::Question(second) = select_next(fx.ctx(), u, "cities", "ru").await.unwrap() else {
    panic!("expected a question");
  };
  let mut ids = vec![first.id, second.id];
  ids.sort();
  assert_eq!(ids, vec![1, 2]);

  let third = select_next(fx.ctx(), u, "cities", "ru").await.unwrap();
  assert_eq!(third, Selection::Exhausted);
}

#[tokio::test]
async fn concurrent_selections_never_share_a_question() {
  for _ in 0..50 {
    let fx = Fixture::new().await;
    let u = fx.user(1).await;

    let (a, b) = tokio::join!(
      select_next(fx.ctx(), u, "cities", "ru"),
      select_next(fx.ctx(), u, "cities", "ru"),
    );
    let (Selection::Question(a), Selection::Question(b)) = (a.unwrap(), b.unwrap()) else {
      panic!("both selections should find a question");
    };
    assert_ne!(a.id, b.id);
    assert_eq!(select_next(fx.ctx(), u, "cities", "ru").await.unwrap(), Selection::Exhausted);
  }
}

#[tokio::test]
async fn delivery_history_is_per_user() {
  let fx = Fixture::new().await;
  let a = fx.user(1).await;
  let b = fx.user(2).await;

  for _ in 0..2 {
    select_next(fx.ctx(), a, "cities", "ru").await.unwrap();
  }
  assert_eq!(select_next(fx.ctx(), a, "cities", "ru").await.unwrap(), Selection::Exhausted);
  assert!(matches!(
    select_next(fx.ctx(), b, "cities", "ru").await.unwrap(),
    Selection::Question(_)
  ));
}

#[tokio::test]
async fn missing_catalog_selects_nothing() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  assert_eq!(select_next(fx.ctx(), u, "movies", "en").await.unwrap(), Selection::Exhausted);
}

#[tokio::test]
async fn unconfigured_topic_is_rejected() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  let result = select_next(fx.ctx(), u, "paintings", "ru").await;
  assert!(matches!(result, Err(Error::UnknownTopic(_))));
}

#[tokio::test]
async fn play_picks_a_configured_topic() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;

  let round = play(fx.ctx(), u).await.unwrap();
  let topic = round.topic.expect("a configured topic");
  assert!(fx.config.supports_topic(&topic));
  assert!(matches!(round.selection, Selection::Question(_)));
}

#[tokio::test]
async fn play_without_topics_has_no_topic() {
  let mut fx = Fixture::new().await;
  let u = fx.user(1).await;
  fx.config.topics.clear();

  let round = play(fx.ctx(), u).await.unwrap();
  assert_eq!(round.topic, None);
  assert_eq!(round.selection, Selection::Exhausted);
}

// ─── Achievements ────────────────────────────────────────────────────────────

#[tokio::test]
async fn brain_badge_unlocks_on_fifth_daily_correct_answer() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  let brain = BadgeId::from("🧠");

  for d in 10..=13 {
    fx.answer(u, d - 9, "Stalker", at(d, 9)).await.unwrap();
    let eval = evaluate(fx.ctx(), u, at(d, 10)).await.unwrap();
    assert!(!eval.profile.has_badge(&brain), "unlocked too early on day {d}");
  }

  fx.answer(u, 5, "Stalker", at(14, 9)).await.unwrap();
  let eval = evaluate(fx.ctx(), u, at(14, 10)).await.unwrap();
  assert_eq!(eval.profile.streak, 5);
  assert_eq!(eval.unlocked, vec![brain.clone()]);
  assert_eq!(eval.metrics.answer_streak_days, 5);
}

#[tokio::test]
async fn seven_daily_answers_unlock_regular_badge() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  let regular = BadgeId::from("🔥");

  for d in 1..=6 {
    fx.answer(u, 1, "Mirror", at(d, 9)).await.unwrap();
    let eval = evaluate(fx.ctx(), u, at(d, 10)).await.unwrap();
    assert!(!eval.profile.has_badge(&regular), "unlocked too early on day {d}");
  }

  fx.answer(u, 1, "Stalker", at(7, 9)).await.unwrap();
  let eval = evaluate(fx.ctx(), u, at(7, 10)).await.unwrap();
  assert_eq!(eval.metrics.answer_streak_days, 7);
  assert!(eval.unlocked.contains(&regular));
}

#[tokio::test]
async fn evaluate_twice_adds_nothing_the_second_time() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  for qid in 1..=5 {
    fx.answer(u, qid, "Stalker", at(10, 9)).await.unwrap();
  }

  let first = evaluate(fx.ctx(), u, at(10, 12)).await.unwrap();
  assert!(!first.unlocked.is_empty());
  let second = evaluate(fx.ctx(), u, at(10, 12)).await.unwrap();
  assert!(second.unlocked.is_empty());
  assert_eq!(second.profile.badges, first.profile.badges);
}

#[tokio::test]
async fn badges_survive_a_streak_reset() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  for qid in 1..=5 {
    fx.answer(u, qid, "Stalker", at(10, 9)).await.unwrap();
  }
  evaluate(fx.ctx(), u, at(10, 12)).await.unwrap();

  fx.answer(u, 6, "Solaris", at(10, 13)).await.unwrap();
  let eval = evaluate(fx.ctx(), u, at(10, 14)).await.unwrap();
  assert_eq!(eval.profile.streak, 0);
  assert!(eval.profile.has_badge(&BadgeId::from("🧠")));
}

#[tokio::test]
async fn three_losing_days_unlock_persistence_badge() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  for (qid, d) in [(1, 10), (2, 11), (3, 12)] {
    fx.answer(u, qid, "Mirror", at(d, 9)).await.unwrap();
  }

  let eval = evaluate(fx.ctx(), u, at(12, 10)).await.unwrap();
  assert_eq!(eval.metrics.no_win_streak_days, 3);
  assert!(eval.unlocked.contains(&BadgeId::from("🌧️")));
}

#[tokio::test]
async fn referral_badge_follows_referral_count() {
  let fx = Fixture::new().await;
  let host = fx.user(1).await;
  for id in 2..=4 {
    let contact = Contact {
      user:         UserHandle(id),
      display_name: None,
      payload:      Some("ref_1".into()),
    };
    register_contact(fx.ctx(), contact).await.unwrap();
  }

  let eval = evaluate(fx.ctx(), host, at(10, 9)).await.unwrap();
  assert_eq!(eval.profile.referral_count, 3);
  assert_eq!(eval.unlocked, vec![BadgeId::from("🤝")]);
}

#[tokio::test]
async fn stats_reports_losses_and_badge_names() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  for qid in 1..=5 {
    fx.answer(u, qid, "Stalker", at(10, 9)).await.unwrap();
  }
  evaluate(fx.ctx(), u, at(10, 10)).await.unwrap();
  for qid in 6..=8 {
    fx.answer(u, qid, "Mirror", at(10, 9)).await.unwrap();
  }

  let s = stats(fx.ctx(), u, at(10, 12)).await.unwrap();
  assert_eq!(s.losses, 3);
  assert_eq!(s.profile.streak, 0);
  let brain = s.badges.iter().find(|b| b.badge == BadgeId::from("🧠")).unwrap();
  assert_eq!(brain.name_key.as_deref(), Some("ach_brain"));
}

// ─── Leaderboard ─────────────────────────────────────────────────────────────

async fn seed_scores(fx: &Fixture, scores: &[(i64, u32)], when: DateTime<Utc>) {
  for &(id, correct) in scores {
    let u = fx.user(id).await;
    for qid in 1..=correct {
      fx.answer(u, qid, "Stalker", when).await.unwrap();
    }
  }
}

#[tokio::test]
async fn daily_rating_orders_and_awards_winner_once() {
  let fx = Fixture::new().await;
  seed_scores(&fx, &[(3, 2), (1, 4), (2, 2)], at(14, 9)).await;
  let now = at(14, 12);

  let first = rank(fx.ctx(), Window::Day, View::Command, now).await.unwrap();
  let rows: Vec<(i64, u32)> = first.standings().iter().map(|s| (s.user.0, s.correct)).collect();
  assert_eq!(rows, vec![(1, 4), (2, 2), (3, 2)]);
  let Leaderboard::Ranked { awarded, .. } = &first else { panic!("expected standings") };
  assert_eq!(awarded.len(), 1);

  for _ in 0..4 {
    let again = rank(fx.ctx(), Window::Day, View::Command, now).await.unwrap();
    assert_eq!(again.standings(), first.standings());
    let Leaderboard::Ranked { awarded, .. } = again else { panic!("expected standings") };
    assert!(awarded.is_empty());
  }

  let winner = fx.profile(UserHandle(1)).await;
  let medals = winner.badges.iter().filter(|b| b.as_str() == "🥇").count();
  assert_eq!(medals, 1);
  assert_eq!(winner.score, 4);
  assert!(fx.profile(UserHandle(2)).await.badges.is_empty());
}

#[tokio::test]
async fn weekly_rating_awards_three_distinct_places() {
  let fx = Fixture::new().await;
  seed_scores(&fx, &[(1, 3), (2, 2), (3, 1), (4, 1)], at(13, 9)).await;

  rank(fx.ctx(), Window::Week, View::Command, at(14, 12)).await.unwrap();

  assert!(fx.profile(UserHandle(1)).await.has_badge(&BadgeId::from("🏆")));
  assert!(fx.profile(UserHandle(2)).await.has_badge(&BadgeId::from("🥈")));
  assert!(fx.profile(UserHandle(3)).await.has_badge(&BadgeId::from("🥉")));
  assert!(fx.profile(UserHandle(4)).await.badges.is_empty());
}

#[tokio::test]
async fn monthly_rating_awards_three_distinct_places() {
  let fx = Fixture::new().await;
  seed_scores(&fx, &[(4, 1), (1, 3), (3, 1), (2, 2)], at(2, 9)).await;

  let board = rank(fx.ctx(), Window::Month, View::Command, at(14, 12)).await.unwrap();
  let order: Vec<i64> = board.standings().iter().map(|s| s.user.0).collect();
  assert_eq!(order, vec![1, 2, 3, 4]);

  assert_eq!(fx.profile(UserHandle(1)).await.badges, vec![BadgeId::from("👑")]);
  assert_eq!(fx.profile(UserHandle(2)).await.badges, vec![BadgeId::from("💎")]);
  assert_eq!(fx.profile(UserHandle(3)).await.badges, vec![BadgeId::from("🌟")]);
  assert!(fx.profile(UserHandle(4)).await.badges.is_empty());
}

#[tokio::test]
async fn menu_view_truncates_to_five() {
  let fx = Fixture::new().await;
  let scores: Vec<(i64, u32)> = (1..=7).map(|id| (id, 1)).collect();
  seed_scores(&fx, &scores, at(14, 9)).await;

  let menu = rank(fx.ctx(), Window::Day, View::Menu, at(14, 12)).await.unwrap();
  assert_eq!(menu.standings().len(), 5);
  let command = rank(fx.ctx(), Window::Day, View::Command, at(14, 12)).await.unwrap();
  assert_eq!(command.standings().len(), 7);
}

#[tokio::test]
async fn empty_window_reports_no_activity() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  fx.answer(u, 1, "Mirror", at(14, 9)).await.unwrap();
  seed_scores(&fx, &[(2, 1)], at(12, 9)).await;

  let board = rank(fx.ctx(), Window::Day, View::Command, at(14, 12)).await.unwrap();
  assert!(matches!(board, Leaderboard::NoActivity { window: Window::Day, .. }));
}

// ─── Broadcast ───────────────────────────────────────────────────────────────

/// Records deliveries and fails for one chosen recipient.
struct FlakyTransport {
  fail_for:  UserHandle,
  questions: Mutex<Vec<(UserHandle, u32)>>,
  notices:   Mutex<Vec<UserHandle>>,
}

impl FlakyTransport {
  fn new(fail_for: i64) -> Self {
    Self {
      fail_for:  UserHandle(fail_for),
      questions: Mutex::new(Vec::new()),
      notices:   Mutex::new(Vec::new()),
    }
  }

  fn check(&self, recipient: &UserProfile) -> Result<(), DeliveryFailure> {
    if recipient.handle == self.fail_for {
      return Err(DeliveryFailure {
        recipient: recipient.handle,
        reason:    "chat not found".into(),
      });
    }
    Ok(())
  }
}

impl ChatTransport for FlakyTransport {
  async fn send_question(
    &self,
    recipient: &UserProfile,
    _topic: &str,
    question: &Question,
  ) -> Result<(), DeliveryFailure> {
    self.check(recipient)?;
    self.questions.lock().unwrap().push((recipient.handle, question.id));
    Ok(())
  }

  async fn send_notice(&self, recipient: &UserProfile, _notice: Notice) -> Result<(), DeliveryFailure> {
    self.check(recipient)?;
    self.notices.lock().unwrap().push(recipient.handle);
    Ok(())
  }
}

#[tokio::test]
async fn broadcast_isolates_failing_user() {
  let fx = Fixture::new().await;
  for id in 1..=3 {
    fx.user(id).await;
  }
  let transport = FlakyTransport::new(2);

  let report = send_topic_question(fx.ctx(), &transport, "movies").await.unwrap();
  assert_eq!(report, BroadcastReport { delivered: 2, exhausted: 0, failed: 1 });

  let sent = transport.questions.lock().unwrap().clone();
  let recipients: Vec<i64> = sent.iter().map(|(u, _)| u.0).collect();
  assert_eq!(recipients, vec![1, 3]);
}

#[tokio::test]
async fn broadcast_counts_exhausted_users() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  fx.user(2).await;
  for _ in 0..2 {
    select_next(fx.ctx(), u, "cities", "ru").await.unwrap();
  }
  let transport = FlakyTransport::new(0);

  let report = send_topic_question(fx.ctx(), &transport, "cities").await.unwrap();
  assert_eq!(report, BroadcastReport { delivered: 1, exhausted: 1, failed: 0 });
}

#[tokio::test]
async fn reminder_reaches_everyone_but_the_failure() {
  let fx = Fixture::new().await;
  for id in 1..=4 {
    fx.user(id).await;
  }
  let transport = FlakyTransport::new(4);

  let report = send_quiz_reminder(fx.ctx(), &transport).await.unwrap();
  assert_eq!(report.delivered, 3);
  assert_eq!(report.failed, 1);
  assert_eq!(transport.notices.lock().unwrap().len(), 3);
}

// ─── Contact ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn self_referral_is_ignored() {
  let fx = Fixture::new().await;
  let contact = Contact {
    user:         UserHandle(7),
    display_name: None,
    payload:      Some("ref_7".into()),
  };
  let reg = register_contact(fx.ctx(), contact).await.unwrap();
  assert!(reg.created);
  assert!(!reg.referral_credited);
  assert_eq!(reg.profile.referrer, None);
}

#[tokio::test]
async fn unsupported_locale_is_rejected() {
  let fx = Fixture::new().await;
  let u = fx.user(1).await;
  assert!(matches!(set_locale(fx.ctx(), u, "de").await, Err(Error::UnknownLocale(_))));
}
