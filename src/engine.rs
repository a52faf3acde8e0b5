//! The answer engine: one drill session's question list and per-question
//! state machine.
//!
//! A question moves `unanswered -> partially answered -> complete`, one hidden
//! position at a time and always lowest index first. Only `submit_answer`
//! drives that transition; everything else moves the pointer or edits the
//! pending selection. A `Session` is a plain owned value: the service keeps
//! one per connection/id and runs each intent to completion under its lock.

use rand::Rng;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::catalog::Catalog;
use crate::domain::{
  Accidental, AnswerStatus, LevelConfig, MixedLevelConfig, Note, NoteName, Question, ScaleDefinition, SCALE_LEN,
};
use crate::questions::{build_mixed_questions, build_questions};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionMode {
  #[default]
  Uninitialized,
  Single { scale: ScaleDefinition, level: LevelConfig },
  Mixed { level: MixedLevelConfig },
}

/// What a submit did, so the caller can choose its feedback cue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
  /// Precondition not met (no selection, no question, question already complete).
  Ignored,
  Incorrect,
  /// Accepted, more hidden positions remain.
  Partial { position: usize, note: Note },
  /// Accepted, question is now complete.
  Completed { position: usize, note: Note },
}

/// One of the eight slots of the current question, as a display layer sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotView {
  pub position: usize,
  pub note: Option<Note>,
  pub locked: bool,
  pub active: bool,
  pub user_answer: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
  mode: SessionMode,
  questions: Vec<Question>,
  current_index: usize,
  selected_note: Option<NoteName>,
  selected_accidental: Accidental,
  answer_status: AnswerStatus,
  last_correct_note: Option<Note>,
}

impl Session {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start a single-scale session. Unknown ids are logged and leave the
  /// session exactly as it was.
  #[instrument(level = "info", skip(self, catalog, rng))]
  pub fn init_session<R: Rng + ?Sized>(
    &mut self,
    catalog: &Catalog,
    scale_id: &str,
    level: u32,
    rng: &mut R,
  ) -> Result<(), String> {
    let (Some(scale), Some(level_cfg)) = (catalog.find_scale(scale_id), catalog.find_level(level)) else {
      let msg = format!("Invalid scale or level: scale_id='{}', level={}", scale_id, level);
      error!(target: "session", %scale_id, level, "Invalid scale or level; session unchanged");
      return Err(msg);
    };

    let questions = build_questions(scale, level_cfg, rng);
    if questions.is_empty() {
      error!(target: "session", %scale_id, level, "Level produced no questions; session unchanged");
      return Err(format!("Level {} produced no questions", level));
    }

    info!(target: "session", %scale_id, level, questions = questions.len(), "Session started");
    self.start(SessionMode::Single { scale: scale.clone(), level: level_cfg.clone() }, questions);
    Ok(())
  }

  /// Start a mixed-practice session drawing from the whole scale catalog.
  #[instrument(level = "info", skip(self, catalog, rng))]
  pub fn init_mixed_session<R: Rng + ?Sized>(&mut self, catalog: &Catalog, level: u32, rng: &mut R) -> Result<(), String> {
    let Some(level_cfg) = catalog.find_mixed_level(level) else {
      error!(target: "session", level, "Invalid mixed level; session unchanged");
      return Err(format!("Invalid mixed level: {}", level));
    };

    let questions = build_mixed_questions(&catalog.scales, level_cfg, rng);
    if questions.is_empty() {
      error!(target: "session", level, "Mixed level produced no questions; session unchanged");
      return Err(format!("Mixed level {} produced no questions", level));
    }

    info!(target: "session", level, questions = questions.len(), "Mixed session started");
    self.start(SessionMode::Mixed { level: level_cfg.clone() }, questions);
    Ok(())
  }

  fn start(&mut self, mode: SessionMode, questions: Vec<Question>) {
    *self = Session { mode, questions, ..Session::default() };
  }

  /// Re-run the current tier with freshly generated questions.
  pub fn restart_level<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) -> Result<(), String> {
    match self.mode.clone() {
      SessionMode::Single { scale, level } => self.init_session(catalog, &scale.id, level.level, rng),
      SessionMode::Mixed { level } => self.init_mixed_session(catalog, level.base.level, rng),
      SessionMode::Uninitialized => Err("No active session to restart".into()),
    }
  }

  /// Move on to the next tier of the same kind.
  pub fn advance_level<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) -> Result<(), String> {
    match self.mode.clone() {
      SessionMode::Single { scale, level } => {
        let next = level.level.checked_add(1).filter(|_| catalog.has_next_level(level.level));
        let Some(next) = next else {
          return Err(format!("No level after {}", level.level));
        };
        self.init_session(catalog, &scale.id, next, rng)
      }
      SessionMode::Mixed { level } => {
        let next = level.base.level.checked_add(1).filter(|_| catalog.has_next_mixed_level(level.base.level));
        let Some(next) = next else {
          return Err(format!("No mixed level after {}", level.base.level));
        };
        self.init_mixed_session(catalog, next, rng)
      }
      SessionMode::Uninitialized => Err("No active session".into()),
    }
  }

  /// Pick a letter. Clears an `incorrect` indicator, nothing else.
  pub fn select_note(&mut self, name: NoteName) {
    self.selected_note = Some(name);
    self.clear_incorrect();
  }

  pub fn select_accidental(&mut self, accidental: Accidental) {
    self.selected_accidental = accidental;
    self.clear_incorrect();
  }

  fn clear_incorrect(&mut self) {
    if self.answer_status == AnswerStatus::Incorrect {
      self.answer_status = AnswerStatus::Pending;
    }
  }

  /// Check the pending selection against the active position of the current question.
  #[instrument(level = "debug", skip(self), fields(index = self.current_index))]
  pub fn submit_answer(&mut self) -> SubmitOutcome {
    let Some(name) = self.selected_note else {
      return SubmitOutcome::Ignored;
    };
    let index = self.current_index;
    let Some(question) = self.questions.get(index) else {
      return SubmitOutcome::Ignored;
    };
    if question.is_complete() {
      return SubmitOutcome::Ignored;
    }
    let Some(position) = question.active_position() else {
      return SubmitOutcome::Ignored;
    };

    let accidental = self.selected_accidental;
    if !question.scale_notes[position].matches(name, accidental) {
      debug!(target: "session", position, expected = %question.scale_notes[position], "Incorrect answer");
      self.answer_status = AnswerStatus::Incorrect;
      return SubmitOutcome::Incorrect;
    }

    let note = Note::new(name, accidental);
    let updated = question.with_answer(position, note.clone());
    let complete = updated.is_complete();
    self.questions[index] = updated;
    self.last_correct_note = Some(note.clone());

    if complete {
      // The winning selection stays visible until the caller navigates.
      self.answer_status = AnswerStatus::Correct;
      debug!(target: "session", position, %note, "Question complete");
      SubmitOutcome::Completed { position, note }
    } else {
      self.answer_status = AnswerStatus::Pending;
      self.selected_note = None;
      self.selected_accidental = Accidental::Natural;
      debug!(target: "session", position, %note, "Partial answer accepted");
      SubmitOutcome::Partial { position, note }
    }
  }

  pub fn next_question(&mut self) {
    if self.current_index + 1 < self.questions.len() {
      self.go_to(self.current_index + 1);
    }
  }

  pub fn previous_question(&mut self) {
    if self.current_index > 0 && !self.questions.is_empty() {
      self.go_to(self.current_index - 1);
    }
  }

  fn go_to(&mut self, index: usize) {
    self.current_index = index;
    self.selected_note = None;
    self.selected_accidental = Accidental::Natural;
    self.last_correct_note = None;
    self.answer_status = if self.questions[index].is_complete() {
      AnswerStatus::Correct
    } else {
      AnswerStatus::Pending
    };
  }

  /// Idempotent; used by the display layer after its incorrect-flash timer.
  pub fn reset_selection(&mut self) {
    self.selected_note = None;
    self.selected_accidental = Accidental::Natural;
    self.answer_status = AnswerStatus::Pending;
  }

  pub fn reset_session(&mut self) {
    *self = Session::default();
  }

  pub fn clear_last_correct_note(&mut self) {
    self.last_correct_note = None;
  }

  // -------- Read accessors --------

  pub fn is_initialized(&self) -> bool {
    !matches!(self.mode, SessionMode::Uninitialized)
  }

  pub fn is_mixed(&self) -> bool {
    matches!(self.mode, SessionMode::Mixed { .. })
  }

  pub fn mode(&self) -> &SessionMode {
    &self.mode
  }

  pub fn active_scale(&self) -> Option<&ScaleDefinition> {
    match &self.mode {
      SessionMode::Single { scale, .. } => Some(scale),
      _ => None,
    }
  }

  /// Tier number of the running level, single or mixed.
  pub fn active_level(&self) -> Option<u32> {
    match &self.mode {
      SessionMode::Single { level, .. } => Some(level.level),
      SessionMode::Mixed { level } => Some(level.base.level),
      SessionMode::Uninitialized => None,
    }
  }

  pub fn questions(&self) -> &[Question] {
    &self.questions
  }

  pub fn current_question(&self) -> Option<&Question> {
    self.questions.get(self.current_index)
  }

  pub fn current_index(&self) -> usize {
    self.current_index
  }

  pub fn total_questions(&self) -> usize {
    self.questions.len()
  }

  pub fn answer_status(&self) -> AnswerStatus {
    self.answer_status
  }

  pub fn selected_note(&self) -> Option<NoteName> {
    self.selected_note
  }

  pub fn selected_accidental(&self) -> Accidental {
    self.selected_accidental
  }

  pub fn last_correct_note(&self) -> Option<&Note> {
    self.last_correct_note.as_ref()
  }

  /// Name of the scale the current question belongs to.
  pub fn current_scale_name(&self) -> Option<&str> {
    if let Some(tag) = self.current_question().and_then(|q| q.scale.as_ref()) {
      return Some(&tag.name);
    }
    self.active_scale().map(|s| s.name.as_str())
  }

  pub fn solved_count(&self) -> usize {
    self.questions.iter().filter(|q| q.is_complete()).count()
  }

  pub fn can_submit(&self) -> bool {
    self.selected_note.is_some() && self.current_question().is_some_and(|q| !q.is_complete())
  }

  /// The last question is current and solved.
  pub fn is_level_complete(&self) -> bool {
    !self.questions.is_empty()
      && self.current_index == self.questions.len() - 1
      && self.current_question().is_some_and(Question::is_complete)
  }

  /// Per-slot projection of the current question for rendering.
  pub fn slots(&self) -> Vec<SlotView> {
    let Some(q) = self.current_question() else {
      return Vec::new();
    };
    let active = q.active_position();
    (0..SCALE_LEN)
      .map(|position| {
        if !q.is_hidden(position) {
          return SlotView {
            position,
            note: Some(q.scale_notes[position].clone()),
            locked: true,
            active: false,
            user_answer: false,
          };
        }
        if let Some(answer) = q.user_answers.get(&position) {
          return SlotView { position, note: Some(answer.clone()), locked: true, active: false, user_answer: true };
        }
        let is_active = active == Some(position);
        let note = if is_active {
          self.selected_note.map(|name| Note::new(name, self.selected_accidental))
        } else {
          None
        };
        SlotView { position, note, locked: false, active: is_active, user_answer: false }
      })
      .collect()
  }

  #[cfg(test)]
  pub(crate) fn from_questions(mode: SessionMode, questions: Vec<Question>) -> Self {
    Session { mode, questions, ..Session::default() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ScaleCategory;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn c_major() -> ScaleDefinition {
    Catalog::builtin().find_scale("c-major").cloned().expect("c-major")
  }

  fn single_mode() -> SessionMode {
    SessionMode::Single { scale: c_major(), level: Catalog::builtin().find_level(1).cloned().expect("level") }
  }

  fn session_with_hidden(hidden: &[&[usize]]) -> Session {
    let scale = c_major();
    let questions = hidden.iter().map(|h| Question::new(scale.notes.clone(), h.to_vec(), None)).collect();
    Session::from_questions(single_mode(), questions)
  }

  fn answer(s: &mut Session, name: NoteName, acc: Accidental) -> SubmitOutcome {
    s.select_note(name);
    s.select_accidental(acc);
    s.submit_answer()
  }

  #[test]
  fn single_hidden_note_correct_answer_completes_question() {
    let mut s = session_with_hidden(&[&[1]]);
    let out = answer(&mut s, NoteName::D, Accidental::Natural);

    assert_eq!(out, SubmitOutcome::Completed { position: 1, note: Note::new(NoteName::D, Accidental::Natural) });
    let q = s.current_question().expect("question");
    assert_eq!(q.correct, Some(true));
    assert!(q.answered);
    assert_eq!(s.answer_status(), AnswerStatus::Correct);
    // Winning selection retained for the final cue.
    assert_eq!(s.selected_note(), Some(NoteName::D));
    assert_eq!(s.last_correct_note(), Some(&Note::new(NoteName::D, Accidental::Natural)));
  }

  #[test]
  fn single_hidden_note_wrong_answer_is_incorrect() {
    let mut s = session_with_hidden(&[&[1]]);
    let out = answer(&mut s, NoteName::E, Accidental::Natural);

    assert_eq!(out, SubmitOutcome::Incorrect);
    let q = s.current_question().expect("question");
    assert!(q.user_answers.is_empty());
    assert_eq!(q.correct, None);
    assert_eq!(s.answer_status(), AnswerStatus::Incorrect);
    assert!(s.last_correct_note().is_none());
  }

  #[test]
  fn hidden_positions_resolve_lowest_index_first() {
    // Hidden {2, 5} = E, A. A first is rejected even though it is correct for 5.
    let mut s = session_with_hidden(&[&[2, 5]]);
    assert_eq!(answer(&mut s, NoteName::A, Accidental::Natural), SubmitOutcome::Incorrect);
    assert!(s.current_question().expect("q").user_answers.is_empty());

    s.reset_selection();
    let out = answer(&mut s, NoteName::E, Accidental::Natural);
    assert_eq!(out, SubmitOutcome::Partial { position: 2, note: Note::new(NoteName::E, Accidental::Natural) });
    assert_eq!(s.answer_status(), AnswerStatus::Pending);
    assert_eq!(s.selected_note(), None);
    assert_eq!(s.selected_accidental(), Accidental::Natural);
    let q = s.current_question().expect("q");
    assert_eq!(q.correct, None);
    assert!(!q.answered);

    let out = answer(&mut s, NoteName::A, Accidental::Natural);
    assert_eq!(out, SubmitOutcome::Completed { position: 5, note: Note::new(NoteName::A, Accidental::Natural) });
    assert!(s.current_question().expect("q").is_complete());
  }

  #[test]
  fn duplicate_true_notes_still_fill_lowest_position() {
    let scale =
      ScaleDefinition::from_spelled("odd", "Odd", ScaleCategory::Other, &["C", "D", "E", "F", "G", "E", "B", "C"])
        .expect("scale");
    let mut s = Session::from_questions(single_mode(), vec![Question::new(scale.notes.clone(), vec![2, 5], None)]);
    assert!(matches!(answer(&mut s, NoteName::E, Accidental::Natural), SubmitOutcome::Partial { position: 2, .. }));
    let q = s.current_question().expect("q");
    assert!(q.user_answers.contains_key(&2));
    assert!(!q.user_answers.contains_key(&5));
  }

  #[test]
  fn enharmonic_equivalent_is_rejected() {
    let scale = Catalog::builtin().find_scale("e-flat-major").cloned().expect("scale");
    let mut s = Session::from_questions(single_mode(), vec![Question::new(scale.notes.clone(), vec![3], None)]);
    // Position 3 is Ab; G# is the same pitch but a different spelling.
    assert_eq!(answer(&mut s, NoteName::G, Accidental::Sharp), SubmitOutcome::Incorrect);
    s.reset_selection();
    assert!(matches!(answer(&mut s, NoteName::A, Accidental::Flat), SubmitOutcome::Completed { .. }));
  }

  #[test]
  fn completed_question_ignores_further_submits() {
    let mut s = session_with_hidden(&[&[1], &[2]]);
    answer(&mut s, NoteName::D, Accidental::Natural);
    let before = s.clone();

    assert_eq!(s.submit_answer(), SubmitOutcome::Ignored);
    assert_eq!(s, before);
    s.select_note(NoteName::E);
    assert_eq!(s.submit_answer(), SubmitOutcome::Ignored);
    assert_eq!(s.questions(), before.questions());
  }

  #[test]
  fn submit_without_selection_or_session_is_a_no_op() {
    let mut s = session_with_hidden(&[&[1]]);
    let before = s.clone();
    assert_eq!(s.submit_answer(), SubmitOutcome::Ignored);
    assert_eq!(s, before);

    let mut empty = Session::new();
    empty.select_note(NoteName::C);
    assert_eq!(empty.submit_answer(), SubmitOutcome::Ignored);
  }

  #[test]
  fn reselect_after_incorrect_only_clears_status() {
    let mut s = session_with_hidden(&[&[2, 5]]);
    answer(&mut s, NoteName::G, Accidental::Natural);
    assert_eq!(s.answer_status(), AnswerStatus::Incorrect);

    let mut expected = s.clone();
    s.select_note(NoteName::B);
    assert_eq!(s.answer_status(), AnswerStatus::Pending);
    assert_eq!(s.selected_note(), Some(NoteName::B));
    assert_eq!(s.questions(), expected.questions());
    assert_eq!(s.current_index(), expected.current_index());

    answer(&mut expected, NoteName::G, Accidental::Natural);
    expected.select_accidental(Accidental::Flat);
    assert_eq!(expected.answer_status(), AnswerStatus::Pending);
    assert_eq!(expected.selected_accidental(), Accidental::Flat);
    assert_eq!(expected.selected_note(), Some(NoteName::G));
  }

  #[test]
  fn selecting_while_pending_or_correct_keeps_status() {
    let mut s = session_with_hidden(&[&[1]]);
    s.select_note(NoteName::C);
    assert_eq!(s.answer_status(), AnswerStatus::Pending);
    answer(&mut s, NoteName::D, Accidental::Natural);
    s.select_note(NoteName::F);
    assert_eq!(s.answer_status(), AnswerStatus::Correct);
  }

  #[test]
  fn navigation_clamps_and_recomputes_status() {
    let mut s = session_with_hidden(&[&[1], &[2], &[3]]);
    s.previous_question();
    assert_eq!(s.current_index(), 0);

    answer(&mut s, NoteName::D, Accidental::Natural);
    s.next_question();
    assert_eq!(s.current_index(), 1);
    assert_eq!(s.answer_status(), AnswerStatus::Pending);
    assert_eq!(s.selected_note(), None);
    assert!(s.last_correct_note().is_none());

    s.select_note(NoteName::B);
    s.select_accidental(Accidental::Sharp);
    s.previous_question();
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.answer_status(), AnswerStatus::Correct);
    assert_eq!(s.selected_note(), None);
    assert_eq!(s.selected_accidental(), Accidental::Natural);

    s.next_question();
    s.next_question();
    s.next_question();
    assert_eq!(s.current_index(), 2);
  }

  #[test]
  fn reset_selection_is_idempotent() {
    let mut s = session_with_hidden(&[&[1]]);
    answer(&mut s, NoteName::E, Accidental::Sharp);
    s.reset_selection();
    let once = s.clone();
    s.reset_selection();
    assert_eq!(s, once);
    assert_eq!(s.answer_status(), AnswerStatus::Pending);
    assert_eq!(s.selected_note(), None);
  }

  #[test]
  fn level_completes_on_last_solved_question() {
    let mut s = session_with_hidden(&[&[1], &[2]]);
    answer(&mut s, NoteName::D, Accidental::Natural);
    assert!(!s.is_level_complete());
    s.next_question();
    answer(&mut s, NoteName::E, Accidental::Natural);
    assert!(s.is_level_complete());
    assert_eq!(s.solved_count(), 2);
  }

  #[test]
  fn slots_project_locked_answered_and_active_positions() {
    let mut s = session_with_hidden(&[&[2, 5]]);
    answer(&mut s, NoteName::E, Accidental::Natural);
    s.select_note(NoteName::A);

    let slots = s.slots();
    assert_eq!(slots.len(), SCALE_LEN);
    assert!(slots[0].locked && !slots[0].user_answer);
    assert_eq!(slots[0].note.as_ref().map(|n| n.display.as_str()), Some("C"));
    assert!(slots[2].locked && slots[2].user_answer);
    assert!(slots[5].active && !slots[5].locked);
    assert_eq!(slots[5].note.as_ref().map(|n| n.display.as_str()), Some("A"));

    s.reset_selection();
    assert!(s.slots()[5].note.is_none());
  }

  #[test]
  fn init_with_unknown_ids_leaves_state_untouched() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(1);

    let mut s = Session::new();
    assert!(s.init_session(&catalog, "h-major", 1, &mut rng).is_err());
    assert!(s.init_session(&catalog, "c-major", 42, &mut rng).is_err());
    assert!(s.init_mixed_session(&catalog, 0, &mut rng).is_err());
    assert_eq!(s, Session::new());

    s.init_session(&catalog, "g-major", 2, &mut rng).expect("init");
    s.select_note(NoteName::F);
    let before = s.clone();
    assert!(s.init_session(&catalog, "nope", 2, &mut rng).is_err());
    assert_eq!(s, before);
  }

  #[test]
  fn init_single_session_populates_defaults() {
    let catalog = Catalog::builtin();
    let mut s = Session::new();
    s.init_session(&catalog, "d-major", 3, &mut StdRng::seed_from_u64(2)).expect("init");

    assert!(s.is_initialized());
    assert!(!s.is_mixed());
    assert_eq!(s.total_questions(), 8);
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.answer_status(), AnswerStatus::Pending);
    assert_eq!(s.active_level(), Some(3));
    assert_eq!(s.current_scale_name(), Some("D Major"));
    assert!(s.questions().iter().all(|q| q.hidden_positions.len() == 2));
  }

  #[test]
  fn mixed_session_reports_scale_of_current_question() {
    let catalog = Catalog::builtin();
    let mut s = Session::new();
    s.init_mixed_session(&catalog, 2, &mut StdRng::seed_from_u64(3)).expect("init");

    assert!(s.is_mixed());
    assert_eq!(s.total_questions(), 10);
    for _ in 0..s.total_questions() {
      let tag = s.current_question().and_then(|q| q.scale.clone()).expect("tag");
      assert_eq!(s.current_scale_name(), Some(tag.name.as_str()));
      s.next_question();
    }
  }

  #[test]
  fn restart_and_advance_level() {
    let catalog = Catalog::builtin();
    let mut rng = StdRng::seed_from_u64(4);
    let mut s = Session::new();
    assert!(s.restart_level(&catalog, &mut rng).is_err());

    s.init_session(&catalog, "f-major", 4, &mut rng).expect("init");
    s.next_question();
    s.restart_level(&catalog, &mut rng).expect("restart");
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.active_level(), Some(4));

    s.advance_level(&catalog, &mut rng).expect("advance");
    assert_eq!(s.active_level(), Some(5));
    assert!(s.advance_level(&catalog, &mut rng).is_err());
    assert_eq!(s.active_level(), Some(5));

    s.init_mixed_session(&catalog, 4, &mut rng).expect("mixed");
    s.advance_level(&catalog, &mut rng).expect("advance mixed");
    assert_eq!(s.active_level(), Some(5));
    assert!(s.is_mixed());
  }

  #[test]
  fn reset_session_returns_to_defaults() {
    let catalog = Catalog::builtin();
    let mut s = Session::new();
    s.init_session(&catalog, "c-major", 1, &mut StdRng::seed_from_u64(5)).expect("init");
    s.select_note(NoteName::D);
    s.reset_session();
    assert_eq!(s, Session::new());
    assert!(s.current_question().is_none());
    assert!(s.slots().is_empty());
    assert!(!s.is_level_complete());
  }

  #[test]
  fn advancing_past_the_highest_tier_number_is_an_error() {
    let cfg = crate::config::parse_catalog_config(
      r#"
      [[levels]]
      level = 4294967295
      missing_notes = 1
      questions_count = 2

      [[mixed_levels]]
      level = 4294967295
      missing_notes = 1
      questions_count = 2
      scale_count = 2
      "#,
    )
    .expect("config");
    let catalog = Catalog::with_config(Some(&cfg));
    let mut rng = StdRng::seed_from_u64(6);

    let mut s = Session::new();
    s.init_session(&catalog, "c-major", u32::MAX, &mut rng).expect("init");
    assert!(s.advance_level(&catalog, &mut rng).is_err());
    assert_eq!(s.active_level(), Some(u32::MAX));

    s.init_mixed_session(&catalog, u32::MAX, &mut rng).expect("mixed");
    assert!(s.advance_level(&catalog, &mut rng).is_err());
    assert_eq!(s.active_level(), Some(u32::MAX));
  }
}
