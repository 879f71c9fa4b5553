//! Attempt state machine for a single player going through a quiz.
//!
//! The engine is pure: it owns the flattened quiz and the running tallies,
//! and every player action is a method returning `Result<(), EngineError>`.
//! Nothing here touches storage or the clock; [`super::play_service`] wraps
//! it with sessions, timing and the results handoff.
//!
//! ```text
//! MissionIntro -> Answering -> (Confirming)? -> Answered -> Answering      (next question)
//!                                                        -> MissionIntro   (next mission)
//!                                                        -> Finished
//!                                      \-> MissionFailed -> Answering      (retry mission)
//!                                                        -> Answered       (spend a bonus life)
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::models::question::{Question, QuestionOption, QuestionType};
use crate::models::quiz::Quiz;
use crate::services::grading_service::GradingService;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("quiz has no playable questions")]
    EmptyQuiz,
    #[error("action `{action}` is not allowed while {phase:?}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("no bonus life available")]
    NoBonusLife,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    MissionIntro,
    Answering,
    Confirming,
    Answered,
    MissionFailed,
    Finished,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayableQuestion {
    pub id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub options: Vec<QuestionOption>,
    pub explanation: Option<String>,
    pub tricky_hint: Option<String>,
}

impl From<&Question> for PlayableQuestion {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            question_type: q.question_type,
            options: q.options.0.clone(),
            explanation: q.explanation.clone(),
            tricky_hint: q.tricky_hint.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayableMission {
    pub id: String,
    pub title: String,
    pub narrative: String,
    pub max_mistakes: u32,
    pub bonus_points: u32,
    pub questions: Vec<PlayableQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayableQuiz {
    pub quiz_id: Uuid,
    pub title: String,
    pub missions: Vec<PlayableMission>,
}

impl PlayableQuiz {
    /// Resolves every mission's question references against the bank.
    /// Unknown references are skipped and missions left empty are dropped.
    pub fn assemble(quiz: &Quiz, bank: &[Question]) -> Self {
        let by_id: HashMap<Uuid, &Question> = bank.iter().map(|q| (q.id, q)).collect();
        let missions = quiz
            .missions
            .0
            .iter()
            .filter_map(|m| {
                let questions: Vec<PlayableQuestion> = m
                    .question_ids
                    .iter()
                    .filter_map(|id| match by_id.get(id) {
                        Some(q) => Some(PlayableQuestion::from(*q)),
                        None => {
                            tracing::warn!(quiz_id = %quiz.id, mission = %m.id, question_id = %id, "mission references unknown question");
                            None
                        }
                    })
                    .collect();
                (!questions.is_empty()).then(|| PlayableMission {
                    id: m.id.clone(),
                    title: m.title.clone(),
                    narrative: m.narrative.clone(),
                    max_mistakes: m.max_mistakes,
                    bonus_points: m.bonus_points,
                    questions,
                })
            })
            .collect();

        Self {
            quiz_id: quiz.id,
            title: quiz.title.clone(),
            missions,
        }
    }

    pub fn total_questions(&self) -> usize {
        self.missions.iter().map(|m| m.questions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub correct: bool,
    pub selected: Vec<usize>,
    pub correct_options: Vec<usize>,
    pub explanation: Option<String>,
    pub life_awarded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResults {
    pub score: u32,
    pub total_questions: u32,
    pub elapsed_seconds: u64,
    pub bonus_lives: u32,
    pub bonus_points: u32,
}

#[derive(Debug, Clone)]
pub struct QuizEngine {
    quiz: PlayableQuiz,
    phase: Phase,
    mission_index: usize,
    question_index: usize,
    score: u32,
    mission_score: u32,
    mission_mistakes: u32,
    /// Cleared by any wrong answer in the mission; a spent life does not restore it.
    mission_flawless: bool,
    bonus_lives: u32,
    bonus_points: u32,
    pending: Vec<usize>,
    reconsidered: bool,
    lives_granted: HashSet<Uuid>,
    feedback: Option<Feedback>,
}

impl QuizEngine {
    pub fn new(quiz: PlayableQuiz) -> Result<Self, EngineError> {
        if quiz.total_questions() == 0 {
            return Err(EngineError::EmptyQuiz);
        }
        Ok(Self {
            quiz,
            phase: Phase::MissionIntro,
            mission_index: 0,
            question_index: 0,
            score: 0,
            mission_score: 0,
            mission_mistakes: 0,
            mission_flawless: true,
            bonus_lives: 0,
            bonus_points: 0,
            pending: Vec::new(),
            reconsidered: false,
            lives_granted: HashSet::new(),
            feedback: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn bonus_lives(&self) -> u32 {
        self.bonus_lives
    }

    pub fn bonus_points(&self) -> u32 {
        self.bonus_points
    }

    pub fn mission_mistakes(&self) -> u32 {
        self.mission_mistakes
    }

    pub fn position(&self) -> (usize, usize) {
        (self.mission_index, self.question_index)
    }

    pub fn total_questions(&self) -> u32 {
        self.quiz.total_questions() as u32
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    fn mission(&self) -> &PlayableMission {
        &self.quiz.missions[self.mission_index]
    }

    fn question(&self) -> &PlayableQuestion {
        &self.mission().questions[self.question_index]
    }

    fn expect_phase(&self, expected: Phase, action: &'static str) -> Result<(), EngineError> {
        if self.phase != expected {
            return Err(EngineError::InvalidTransition {
                action,
                phase: self.phase,
            });
        }
        Ok(())
    }

    pub fn begin_mission(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::MissionIntro, "begin")?;
        self.phase = Phase::Answering;
        Ok(())
    }

    /// Non-tricky questions are scored immediately; tricky questions wait for
    /// [`confirm`](Self::confirm) or [`decline`](Self::decline).
    pub fn select(&mut self, indices: &[usize]) -> Result<(), EngineError> {
        self.expect_phase(Phase::Answering, "select")?;
        let question = self.question();
        let selection: BTreeSet<usize> = indices.iter().copied().collect();

        if selection.is_empty() {
            return Err(EngineError::InvalidSelection("no option selected".into()));
        }
        if selection.len() != indices.len() {
            return Err(EngineError::InvalidSelection("duplicate option".into()));
        }
        if let Some(bad) = selection.iter().find(|i| **i >= question.options.len()) {
            return Err(EngineError::InvalidSelection(format!(
                "option {} does not exist",
                bad
            )));
        }
        if question.question_type.is_single_answer() && selection.len() != 1 {
            return Err(EngineError::InvalidSelection(
                "exactly one option must be selected".into(),
            ));
        }

        let selection: Vec<usize> = selection.into_iter().collect();
        if question.question_type == QuestionType::Tricky {
            self.pending = selection;
            self.phase = Phase::Confirming;
            return Ok(());
        }
        self.score_answer(selection);
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::Confirming, "confirm")?;
        let selection = std::mem::take(&mut self.pending);
        self.score_answer(selection);
        Ok(())
    }

    pub fn decline(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::Confirming, "decline")?;
        self.pending.clear();
        self.reconsidered = true;
        self.phase = Phase::Answering;
        Ok(())
    }

    fn score_answer(&mut self, selected: Vec<usize>) {
        let (question_id, question_type, correct, correct_options, explanation) = {
            let q = self.question();
            (
                q.id,
                q.question_type,
                GradingService::is_correct(q.question_type, &q.options, &selected),
                GradingService::correct_indices(&q.options),
                q.explanation.clone(),
            )
        };

        let mut life_awarded = false;
        if correct {
            self.score += 1;
            self.mission_score += 1;
            if question_type == QuestionType::Tricky && self.lives_granted.insert(question_id) {
                self.bonus_lives += 1;
                life_awarded = true;
            }
        } else {
            self.mission_mistakes += 1;
            self.mission_flawless = false;
        }

        tracing::debug!(
            %question_id,
            correct,
            reconsidered = self.reconsidered,
            mistakes = self.mission_mistakes,
            "answer scored"
        );

        self.reconsidered = false;
        self.feedback = Some(Feedback {
            correct,
            selected,
            correct_options,
            explanation,
            life_awarded,
        });
        self.phase = if !correct && self.mission_mistakes > self.mission().max_mistakes {
            Phase::MissionFailed
        } else {
            Phase::Answered
        };
    }

    pub fn advance(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::Answered, "advance")?;
        self.feedback = None;

        if self.question_index + 1 < self.mission().questions.len() {
            self.question_index += 1;
            self.phase = Phase::Answering;
            return Ok(());
        }

        if self.mission_flawless {
            self.bonus_points += self.mission().bonus_points;
        }
        if self.mission_index + 1 < self.quiz.missions.len() {
            self.mission_index += 1;
            self.question_index = 0;
            self.mission_score = 0;
            self.mission_mistakes = 0;
            self.mission_flawless = true;
            self.phase = Phase::MissionIntro;
        } else {
            self.phase = Phase::Finished;
        }
        Ok(())
    }

    /// Restarts the failed mission from its first question, taking back the
    /// points earned in it.
    pub fn retry_mission(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::MissionFailed, "retry")?;
        self.score -= self.mission_score;
        self.mission_score = 0;
        self.mission_mistakes = 0;
        self.mission_flawless = true;
        self.question_index = 0;
        self.feedback = None;
        self.phase = Phase::Answering;
        Ok(())
    }

    /// Forgives the failing mistake and lets the player carry on.
    pub fn spend_life(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::MissionFailed, "spend_life")?;
        if self.bonus_lives == 0 {
            return Err(EngineError::NoBonusLife);
        }
        self.bonus_lives -= 1;
        self.mission_mistakes = self.mission().max_mistakes;
        self.phase = Phase::Answered;
        Ok(())
    }

    pub fn results(&self, elapsed_seconds: u64) -> Option<QuizResults> {
        (self.phase == Phase::Finished).then(|| QuizResults {
            score: self.score,
            total_questions: self.total_questions(),
            elapsed_seconds,
            bonus_lives: self.bonus_lives,
            bonus_points: self.bonus_points,
        })
    }

    /// What the player is allowed to see right now. Option correctness is
    /// only revealed through the feedback of an answered question.
    pub fn view(&self) -> EngineView {
        let mission = self.mission();
        let question = (!matches!(self.phase, Phase::MissionIntro | Phase::Finished)).then(|| {
            let q = self.question();
            QuestionView {
                id: q.id,
                index: self.question_index,
                text: q.text.clone(),
                question_type: q.question_type,
                options: q.options.iter().map(|o| o.text.clone()).collect(),
                tricky_hint: (self.phase == Phase::Confirming)
                    .then(|| q.tricky_hint.clone())
                    .flatten(),
            }
        });

        EngineView {
            quiz_id: self.quiz.quiz_id,
            quiz_title: self.quiz.title.clone(),
            phase: self.phase,
            mission: MissionView {
                index: self.mission_index,
                id: mission.id.clone(),
                title: mission.title.clone(),
                narrative: mission.narrative.clone(),
                question_count: mission.questions.len(),
                max_mistakes: mission.max_mistakes,
            },
            mission_count: self.quiz.missions.len(),
            question,
            pending_selection: self.pending.clone(),
            feedback: self.feedback.clone(),
            score: self.score,
            total_questions: self.total_questions(),
            mission_mistakes: self.mission_mistakes,
            bonus_lives: self.bonus_lives,
            bonus_points: self.bonus_points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineView {
    pub quiz_id: Uuid,
    pub quiz_title: String,
    pub phase: Phase,
    pub mission: MissionView,
    pub mission_count: usize,
    pub question: Option<QuestionView>,
    pub pending_selection: Vec<usize>,
    pub feedback: Option<Feedback>,
    pub score: u32,
    pub total_questions: u32,
    pub mission_mistakes: u32,
    pub bonus_lives: u32,
    pub bonus_points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissionView {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub narrative: String,
    pub question_count: usize,
    pub max_mistakes: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub id: Uuid,
    pub index: usize,
    pub text: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub tricky_hint: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn question(question_type: QuestionType, correct: &[usize]) -> PlayableQuestion {
        PlayableQuestion {
            id: Uuid::new_v4(),
            text: "¿Cuál es la tasa?".into(),
            question_type,
            options: (0..4)
                .map(|i| QuestionOption {
                    text: format!("opción {}", i),
                    is_correct: correct.contains(&i),
                })
                .collect(),
            explanation: Some("Porque sí".into()),
            tricky_hint: Some("Piénsalo dos veces".into()),
        }
    }

    pub(crate) fn mission(questions: Vec<PlayableQuestion>) -> PlayableMission {
        PlayableMission {
            id: Uuid::new_v4().to_string(),
            title: "Misión".into(),
            narrative: "Había una vez".into(),
            max_mistakes: 1,
            bonus_points: 0,
            questions,
        }
    }

    pub(crate) fn quiz(missions: Vec<PlayableMission>) -> PlayableQuiz {
        PlayableQuiz {
            quiz_id: Uuid::new_v4(),
            title: "Desafío".into(),
            missions,
        }
    }

    fn single() -> PlayableQuestion {
        question(QuestionType::SingleChoice, &[0])
    }

    fn tricky() -> PlayableQuestion {
        question(QuestionType::Tricky, &[1])
    }

    #[test]
    fn empty_quiz_is_rejected() {
        assert_eq!(QuizEngine::new(quiz(vec![])).unwrap_err(), EngineError::EmptyQuiz);
    }

    #[test]
    fn all_correct_two_by_two_finishes_with_full_score() {
        let mut engine = QuizEngine::new(quiz(vec![
            mission(vec![single(), single()]),
            mission(vec![single(), single()]),
        ]))
        .unwrap();

        for _ in 0..2 {
            engine.begin_mission().unwrap();
            for _ in 0..2 {
                engine.select(&[0]).unwrap();
                assert_eq!(engine.phase(), Phase::Answered);
                engine.advance().unwrap();
            }
        }

        assert_eq!(engine.phase(), Phase::Finished);
        let results = engine.results(42).unwrap();
        assert_eq!(results.score, 4);
        assert_eq!(results.total_questions, 4);
        assert_eq!(results.elapsed_seconds, 42);
    }

    #[test]
    fn second_mistake_fails_the_mission() {
        let mut engine =
            QuizEngine::new(quiz(vec![mission(vec![single(), single(), single()])])).unwrap();
        engine.begin_mission().unwrap();

        engine.select(&[2]).unwrap();
        assert_eq!(engine.phase(), Phase::Answered);
        engine.advance().unwrap();

        engine.select(&[3]).unwrap();
        assert_eq!(engine.phase(), Phase::MissionFailed);
        assert_eq!(engine.spend_life(), Err(EngineError::NoBonusLife));
        assert!(matches!(
            engine.advance(),
            Err(EngineError::InvalidTransition { action: "advance", .. })
        ));
    }

    #[test]
    fn retry_subtracts_only_the_mission_score() {
        let mut engine = QuizEngine::new(quiz(vec![
            mission(vec![single()]),
            mission(vec![single(), single(), single()]),
        ]))
        .unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[0]).unwrap();
        engine.advance().unwrap();

        engine.begin_mission().unwrap();
        engine.select(&[0]).unwrap();
        engine.advance().unwrap();
        engine.select(&[1]).unwrap();
        engine.advance().unwrap();
        engine.select(&[1]).unwrap();
        assert_eq!(engine.phase(), Phase::MissionFailed);
        assert_eq!(engine.score(), 2);

        engine.retry_mission().unwrap();
        assert_eq!(engine.score(), 1);
        assert_eq!(engine.mission_mistakes(), 0);
        assert_eq!(engine.position(), (1, 0));
        assert_eq!(engine.phase(), Phase::Answering);
    }

    #[test]
    fn spent_life_does_not_earn_the_flawless_bonus() {
        let mut strict = mission(vec![tricky(), single()]);
        strict.max_mistakes = 0;
        strict.bonus_points = 10;
        let mut engine = QuizEngine::new(quiz(vec![strict])).unwrap();
        engine.begin_mission().unwrap();

        engine.select(&[1]).unwrap();
        engine.confirm().unwrap();
        assert_eq!(engine.bonus_lives(), 1);
        engine.advance().unwrap();

        engine.select(&[3]).unwrap();
        assert_eq!(engine.phase(), Phase::MissionFailed);
        engine.spend_life().unwrap();
        engine.advance().unwrap();

        assert_eq!(engine.phase(), Phase::Finished);
        assert_eq!(engine.bonus_points(), 0);
    }

    #[test]
    fn retried_mission_can_still_be_flawless() {
        let mut strict = mission(vec![single()]);
        strict.max_mistakes = 0;
        strict.bonus_points = 5;
        let mut engine = QuizEngine::new(quiz(vec![strict])).unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[2]).unwrap();
        assert_eq!(engine.phase(), Phase::MissionFailed);

        engine.retry_mission().unwrap();
        engine.select(&[0]).unwrap();
        engine.advance().unwrap();
        assert_eq!(engine.results(0).unwrap().bonus_points, 5);
    }

    #[test]
    fn tricky_question_waits_for_confirmation() {
        let mut engine = QuizEngine::new(quiz(vec![mission(vec![tricky(), single()])])).unwrap();
        engine.begin_mission().unwrap();

        engine.select(&[1]).unwrap();
        assert_eq!(engine.phase(), Phase::Confirming);
        assert_eq!(engine.score(), 0);
        assert_eq!(
            engine.view().question.unwrap().tricky_hint.as_deref(),
            Some("Piénsalo dos veces")
        );

        engine.decline().unwrap();
        assert_eq!(engine.phase(), Phase::Answering);
        assert!(engine.view().pending_selection.is_empty());
    }

    #[test]
    fn wrong_then_correct_tricky_grants_one_life() {
        let mut engine = QuizEngine::new(quiz(vec![mission(vec![tricky()])])).unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[0]).unwrap();
        engine.decline().unwrap();
        engine.select(&[1]).unwrap();
        engine.confirm().unwrap();

        assert_eq!(engine.bonus_lives(), 1);
        assert!(engine.feedback().unwrap().life_awarded);
        assert_eq!(engine.score(), 1);
    }

    #[test]
    fn correct_then_correct_tricky_grants_one_life() {
        let mut engine = QuizEngine::new(quiz(vec![mission(vec![tricky()])])).unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[1]).unwrap();
        engine.decline().unwrap();
        engine.select(&[1]).unwrap();
        engine.confirm().unwrap();
        assert_eq!(engine.bonus_lives(), 1);
    }

    #[test]
    fn correct_then_wrong_tricky_grants_nothing() {
        let mut engine = QuizEngine::new(quiz(vec![mission(vec![tricky(), single()])])).unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[1]).unwrap();
        engine.decline().unwrap();
        engine.select(&[2]).unwrap();
        engine.confirm().unwrap();

        assert_eq!(engine.bonus_lives(), 0);
        assert_eq!(engine.mission_mistakes(), 1);
        assert!(!engine.feedback().unwrap().life_awarded);
    }

    #[test]
    fn retrying_a_mission_never_regrants_a_life() {
        let mut engine =
            QuizEngine::new(quiz(vec![mission(vec![tricky(), single(), single()])])).unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[1]).unwrap();
        engine.confirm().unwrap();
        engine.advance().unwrap();
        engine.select(&[3]).unwrap();
        engine.advance().unwrap();
        engine.select(&[3]).unwrap();
        assert_eq!(engine.phase(), Phase::MissionFailed);

        engine.retry_mission().unwrap();
        engine.select(&[1]).unwrap();
        engine.confirm().unwrap();
        assert_eq!(engine.bonus_lives(), 1);
    }

    #[test]
    fn bonus_life_bypasses_a_mission_failure() {
        let mut engine =
            QuizEngine::new(quiz(vec![mission(vec![tricky(), single(), single(), single()])]))
                .unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[1]).unwrap();
        engine.confirm().unwrap();
        engine.advance().unwrap();
        engine.select(&[2]).unwrap();
        engine.advance().unwrap();
        engine.select(&[2]).unwrap();
        assert_eq!(engine.phase(), Phase::MissionFailed);

        engine.spend_life().unwrap();
        assert_eq!(engine.bonus_lives(), 0);
        assert_eq!(engine.phase(), Phase::Answered);
        engine.advance().unwrap();

        // Still on the edge: one more mistake fails again.
        engine.select(&[2]).unwrap();
        assert_eq!(engine.phase(), Phase::MissionFailed);
    }

    #[test]
    fn flawless_mission_earns_its_bonus_points() {
        let mut first = mission(vec![single()]);
        first.bonus_points = 5;
        let mut second = mission(vec![single(), single()]);
        second.bonus_points = 7;
        let mut engine = QuizEngine::new(quiz(vec![first, second])).unwrap();

        engine.begin_mission().unwrap();
        engine.select(&[0]).unwrap();
        engine.advance().unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[1]).unwrap();
        engine.advance().unwrap();
        engine.select(&[0]).unwrap();
        engine.advance().unwrap();

        assert_eq!(engine.bonus_points(), 5);
        assert_eq!(engine.score(), 2);
    }

    #[test]
    fn multiple_choice_gets_no_partial_credit() {
        let mut engine = QuizEngine::new(quiz(vec![mission(vec![
            question(QuestionType::MultipleChoice, &[0, 2]),
            question(QuestionType::MultipleChoice, &[0, 2]),
        ])]))
        .unwrap();
        engine.begin_mission().unwrap();
        engine.select(&[0]).unwrap();
        assert!(!engine.feedback().unwrap().correct);
        engine.advance().unwrap();
        engine.select(&[2, 0]).unwrap();
        assert!(engine.feedback().unwrap().correct);
        assert_eq!(engine.score(), 1);
    }

    #[test]
    fn invalid_selections_are_refused_without_state_change() {
        let mut engine = QuizEngine::new(quiz(vec![mission(vec![single()])])).unwrap();
        assert!(matches!(
            engine.select(&[0]),
            Err(EngineError::InvalidTransition { .. })
        ));
        engine.begin_mission().unwrap();
        assert!(matches!(engine.select(&[]), Err(EngineError::InvalidSelection(_))));
        assert!(matches!(engine.select(&[9]), Err(EngineError::InvalidSelection(_))));
        assert!(matches!(engine.select(&[0, 1]), Err(EngineError::InvalidSelection(_))));
        assert!(matches!(engine.select(&[0, 0]), Err(EngineError::InvalidSelection(_))));
        assert_eq!(engine.phase(), Phase::Answering);
    }

    #[test]
    fn view_hides_correctness_until_answered() {
        let mut engine = QuizEngine::new(quiz(vec![mission(vec![single()])])).unwrap();
        assert!(engine.view().question.is_none());
        engine.begin_mission().unwrap();
        let view = serde_json::to_value(engine.view()).unwrap();
        assert!(!view.to_string().contains("is_correct"));
        assert!(view["feedback"].is_null());
        engine.select(&[0]).unwrap();
        assert_eq!(engine.view().feedback.unwrap().correct_options, vec![0]);
    }
}
