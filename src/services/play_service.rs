use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::services::quiz_engine::{EngineView, Phase, PlayableQuiz, QuizEngine, QuizResults};
use crate::utils::{crypto, time::elapsed_seconds, token::generate_access_token};

const SESSION_TOKEN_LEN: usize = 32;
pub const RESULTS_PATH: &str = "/results";

#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        crate::utils::time::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayAction {
    Begin,
    Select,
    Confirm,
    Decline,
    Advance,
    Retry,
    SpendLife,
}

impl std::str::FromStr for PlayAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let action = match s {
            "begin" => PlayAction::Begin,
            "select" => PlayAction::Select,
            "confirm" => PlayAction::Confirm,
            "decline" => PlayAction::Decline,
            "advance" => PlayAction::Advance,
            "retry" => PlayAction::Retry,
            "spend-life" => PlayAction::SpendLife,
            other => return Err(Error::NotFound(format!("Unknown play action: {}", other))),
        };
        Ok(action)
    }
}

struct PlaySession {
    engine: QuizEngine,
    user_id: Uuid,
    started_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
    /// Set once, on the action that reaches `Finished`.
    finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub token: String,
    pub started_at: DateTime<Utc>,
    pub view: EngineView,
    pub results: Option<ResultsHandoff>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsHandoff {
    #[serde(flatten)]
    pub results: QuizResults,
    pub url: String,
}

/// Running attempts, held in memory only. Sessions disappear on restart or
/// once idle for longer than the configured TTL.
#[derive(Clone)]
pub struct PlaySessionStore {
    sessions: Arc<Mutex<HashMap<String, PlaySession>>>,
    clock: Arc<dyn Clock>,
    signing_secret: String,
    ttl: Duration,
}

impl PlaySessionStore {
    pub fn new(clock: Arc<dyn Clock>, signing_secret: String, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            clock,
            signing_secret,
            ttl,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, PlaySession>>> {
        self.sessions
            .lock()
            .map_err(|_| Error::Internal("play session registry poisoned".to_string()))
    }

    pub fn start(&self, user_id: Uuid, quiz: PlayableQuiz) -> Result<SessionSnapshot> {
        let quiz_id = quiz.quiz_id;
        let engine = QuizEngine::new(quiz)?;
        let now = self.clock.now();
        let token = generate_access_token(SESSION_TOKEN_LEN);
        let session = PlaySession {
            engine,
            user_id,
            started_at: now,
            last_seen_at: now,
            finished_at: None,
        };
        let snapshot = self.snapshot_of(&token, &session)?;
        self.lock()?.insert(token, session);
        tracing::info!(%user_id, %quiz_id, "play session started");
        Ok(snapshot)
    }

    pub fn get(&self, token: &str, user_id: Uuid) -> Result<SessionSnapshot> {
        let now = self.clock.now();
        let mut sessions = self.lock()?;
        let session = owned_session(&mut sessions, token, user_id)?;
        session.last_seen_at = now;
        self.snapshot_of(token, session)
    }

    /// `selection` is only read for [`PlayAction::Select`].
    pub fn apply(
        &self,
        token: &str,
        user_id: Uuid,
        action: PlayAction,
        selection: &[usize],
    ) -> Result<SessionSnapshot> {
        let now = self.clock.now();
        let mut sessions = self.lock()?;
        let session = owned_session(&mut sessions, token, user_id)?;
        let engine = &mut session.engine;
        match action {
            PlayAction::Begin => engine.begin_mission(),
            PlayAction::Select => engine.select(selection),
            PlayAction::Confirm => engine.confirm(),
            PlayAction::Decline => engine.decline(),
            PlayAction::Advance => engine.advance(),
            PlayAction::Retry => engine.retry_mission(),
            PlayAction::SpendLife => engine.spend_life(),
        }?;
        session.last_seen_at = now;
        let just_finished =
            session.finished_at.is_none() && session.engine.phase() == Phase::Finished;
        if just_finished {
            session.finished_at = Some(now);
        }
        let snapshot = self.snapshot_of(token, session)?;
        if let (true, Some(handoff)) = (just_finished, &snapshot.results) {
            tracing::info!(
                %user_id,
                quiz_id = %snapshot.view.quiz_id,
                score = handoff.results.score,
                total = handoff.results.total_questions,
                "quiz finished"
            );
        }
        Ok(snapshot)
    }

    pub fn discard(&self, token: &str, user_id: Uuid) -> Result<()> {
        let mut sessions = self.lock()?;
        owned_session(&mut sessions, token, user_id)?;
        sessions.remove(token);
        Ok(())
    }

    /// Drops sessions idle for longer than the TTL; returns how many went.
    pub fn sweep_expired(&self) -> Result<usize> {
        let cutoff = self.clock.now() - self.ttl;
        let mut sessions = self.lock()?;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_seen_at >= cutoff);
        Ok(before - sessions.len())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn snapshot_of(
        &self,
        token: &str,
        session: &PlaySession,
    ) -> Result<SessionSnapshot> {
        let results = match session
            .finished_at
            .and_then(|at| session.engine.results(elapsed_seconds(session.started_at, at)))
        {
            Some(results) => {
                let query = crypto::results_query(&results);
                let sig = crypto::sign(&self.signing_secret, &query)?;
                Some(ResultsHandoff {
                    results,
                    url: format!("{}?{}&sig={}", RESULTS_PATH, query, sig),
                })
            }
            None => None,
        };
        Ok(SessionSnapshot {
            token: token.to_string(),
            started_at: session.started_at,
            view: session.engine.view(),
            results,
        })
    }
}

/// Someone else's token looks exactly like an unknown one.
fn owned_session<'a>(
    sessions: &'a mut HashMap<String, PlaySession>,
    token: &str,
    user_id: Uuid,
) -> Result<&'a mut PlaySession> {
    sessions
        .get_mut(token)
        .filter(|s| s.user_id == user_id)
        .ok_or_else(|| Error::NotFound("Play session not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;
    use crate::services::quiz_engine::tests::{mission, question, quiz};
    use std::sync::atomic::{AtomicI64, Ordering};

    fn store_with_ticking_clock(step_seconds: i64) -> PlaySessionStore {
        let base = Utc::now();
        let ticks = Arc::new(AtomicI64::new(0));
        let mut clock = MockClock::new();
        clock.expect_now().returning(move || {
            let n = ticks.fetch_add(1, Ordering::SeqCst);
            base + Duration::seconds(n * step_seconds)
        });
        PlaySessionStore::new(Arc::new(clock), "test-secret".into(), Duration::minutes(30))
    }

    fn two_by_two() -> PlayableQuiz {
        let q = || question(QuestionType::SingleChoice, &[0]);
        quiz(vec![mission(vec![q(), q()]), mission(vec![q(), q()])])
    }

    #[test]
    fn perfect_run_hands_off_signed_results() {
        let store = store_with_ticking_clock(3);
        let user = Uuid::new_v4();
        let token = store.start(user, two_by_two()).unwrap().token;

        let mut last = None;
        for _ in 0..2 {
            store.apply(&token, user, PlayAction::Begin, &[]).unwrap();
            for _ in 0..2 {
                store.apply(&token, user, PlayAction::Select, &[0]).unwrap();
                last = Some(store.apply(&token, user, PlayAction::Advance, &[]).unwrap());
            }
        }

        let snapshot = last.unwrap();
        assert_eq!(snapshot.view.phase, Phase::Finished);
        let handoff = snapshot.results.unwrap();
        assert_eq!(handoff.results.score, 4);
        assert!(handoff.url.starts_with("/results?score=4&totalQuestions=4&"));
        assert!(handoff.results.elapsed_seconds > 0);

        let (path_and_query, sig) = handoff.url.rsplit_once("&sig=").unwrap();
        let query = path_and_query.trim_start_matches("/results?");
        assert!(crypto::verify("test-secret", query, sig));
    }

    #[test]
    fn results_are_frozen_at_the_finishing_action() {
        let store = store_with_ticking_clock(10);
        let user = Uuid::new_v4();
        let one = quiz(vec![mission(vec![question(QuestionType::SingleChoice, &[0])])]);
        let token = store.start(user, one).unwrap().token;
        store.apply(&token, user, PlayAction::Begin, &[]).unwrap();
        store.apply(&token, user, PlayAction::Select, &[0]).unwrap();
        let finished = store.apply(&token, user, PlayAction::Advance, &[]).unwrap();
        let handoff = finished.results.unwrap();
        assert_eq!(handoff.results.elapsed_seconds, 30);

        let first = store.get(&token, user).unwrap().results.unwrap();
        let second = store.get(&token, user).unwrap().results.unwrap();
        assert_eq!(first.results.elapsed_seconds, 30);
        assert_eq!(second.results.elapsed_seconds, 30);
        assert_eq!(first.url, handoff.url);
        assert_eq!(second.url, handoff.url);
    }

    #[test]
    fn sessions_are_private_to_their_player() {
        let store = store_with_ticking_clock(1);
        let owner = Uuid::new_v4();
        let token = store.start(owner, two_by_two()).unwrap().token;

        let intruder = Uuid::new_v4();
        assert!(matches!(store.get(&token, intruder), Err(Error::NotFound(_))));
        assert!(matches!(
            store.apply(&token, intruder, PlayAction::Begin, &[]),
            Err(Error::NotFound(_))
        ));
        assert!(store.get(&token, owner).is_ok());
    }

    #[test]
    fn engine_errors_surface_and_keep_state() {
        let store = store_with_ticking_clock(1);
        let user = Uuid::new_v4();
        let token = store.start(user, two_by_two()).unwrap().token;
        let err = store.apply(&token, user, PlayAction::Confirm, &[]).unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert_eq!(store.get(&token, user).unwrap().view.phase, Phase::MissionIntro);
    }

    #[test]
    fn sweep_drops_idle_sessions() {
        // Each clock read moves 20 minutes; the TTL is 30.
        let store = store_with_ticking_clock(20 * 60);
        let user = Uuid::new_v4();
        store.start(user, two_by_two()).unwrap();
        assert_eq!(store.sweep_expired().unwrap(), 0);
        assert_eq!(store.sweep_expired().unwrap(), 1);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn poisoned_registry_is_reported() {
        let store = store_with_ticking_clock(1);
        let sessions = store.sessions.clone();
        let _ = std::thread::spawn(move || {
            let _guard = sessions.lock().unwrap();
            panic!("poison the registry");
        })
        .join();
        assert!(matches!(store.len(), Err(Error::Internal(_))));
        assert!(store.is_empty().is_err());
    }

    #[test]
    fn discard_removes_the_session() {
        let store = store_with_ticking_clock(1);
        let user = Uuid::new_v4();
        let token = store.start(user, two_by_two()).unwrap().token;
        store.discard(&token, user).unwrap();
        assert!(store.get(&token, user).is_err());
    }

    #[test]
    fn empty_quiz_cannot_be_played() {
        let store = store_with_ticking_clock(1);
        let err = store.start(Uuid::new_v4(), quiz(vec![])).unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
    }

    #[test]
    fn actions_parse_from_path_segments() {
        assert_eq!("spend-life".parse::<PlayAction>().unwrap(), PlayAction::SpendLife);
        assert_eq!("retry".parse::<PlayAction>().unwrap(), PlayAction::Retry);
        assert!(matches!("skip".parse::<PlayAction>(), Err(Error::NotFound(_))));
    }
}
