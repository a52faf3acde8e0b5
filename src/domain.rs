//! Domain models for the scale drill: notes, scales, level tiers, and questions.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of notes in a scale, root through octave.
pub const SCALE_LEN: usize = 8;
/// Lowest and highest scale positions that may ever be hidden (root and octave never are).
pub const FIRST_HIDEABLE: usize = 1;
pub const LAST_HIDEABLE: usize = 6;

/// One of the seven letter names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NoteName { C, D, E, F, G, A, B }

impl NoteName {
  pub const ALL: [NoteName; 7] = [
    NoteName::C, NoteName::D, NoteName::E, NoteName::F, NoteName::G, NoteName::A, NoteName::B,
  ];

  pub fn letter(self) -> &'static str {
    match self {
      NoteName::C => "C",
      NoteName::D => "D",
      NoteName::E => "E",
      NoteName::F => "F",
      NoteName::G => "G",
      NoteName::A => "A",
      NoteName::B => "B",
    }
  }

  pub fn from_letter(ch: char) -> Option<Self> {
    match ch.to_ascii_uppercase() {
      'C' => Some(NoteName::C),
      'D' => Some(NoteName::D),
      'E' => Some(NoteName::E),
      'F' => Some(NoteName::F),
      'G' => Some(NoteName::G),
      'A' => Some(NoteName::A),
      'B' => Some(NoteName::B),
      _ => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accidental {
  #[default]
  Natural,
  Sharp,
  Flat,
}

impl Accidental {
  pub fn symbol(self) -> &'static str {
    match self {
      Accidental::Natural => "",
      Accidental::Sharp => "#",
      Accidental::Flat => "b",
    }
  }
}

/// A spelled note. Equality ignores `display`: two notes are equal when
/// letter and accidental match, so `D#` and `Eb` are different notes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Note {
  pub name: NoteName,
  pub accidental: Accidental,
  pub display: String,
}

impl Note {
  pub fn new(name: NoteName, accidental: Accidental) -> Self {
    Self { name, accidental, display: format!("{}{}", name.letter(), accidental.symbol()) }
  }

  /// Strict match against a (letter, accidental) selection.
  pub fn matches(&self, name: NoteName, accidental: Accidental) -> bool {
    self.name == name && self.accidental == accidental
  }
}

impl PartialEq for Note {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name && self.accidental == other.accidental
  }
}
impl Eq for Note {}

impl Hash for Note {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.name.hash(state);
    self.accidental.hash(state);
  }
}

impl fmt::Display for Note {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.display)
  }
}

impl FromStr for Note {
  type Err = String;

  /// Parses spellings such as `C`, `F#`, `Bb`, `e♭`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let mut chars = trimmed.chars();
    let name = chars
      .next()
      .and_then(NoteName::from_letter)
      .ok_or_else(|| format!("Invalid note spelling '{}': expected a letter A-G", trimmed))?;
    let rest: String = chars.collect();
    let accidental = match rest.as_str() {
      "" => Accidental::Natural,
      "#" | "♯" => Accidental::Sharp,
      "b" | "♭" => Accidental::Flat,
      other => return Err(format!("Invalid accidental '{}' in note '{}'", other, trimmed)),
    };
    Ok(Note::new(name, accidental))
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleCategory {
  #[default]
  Major,
  Minor,
  Modal,
  Pentatonic,
  Other,
}

/// A catalog scale: exactly eight notes, position 0 the root and 7 its octave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleDefinition {
  pub id: String,
  pub name: String,
  pub category: ScaleCategory,
  pub notes: [Note; SCALE_LEN],
}

impl ScaleDefinition {
  /// Build a scale from eight spelled notes (e.g. `["G","A","B","C","D","E","F#","G"]`).
  pub fn from_spelled<S: AsRef<str>>(
    id: &str,
    name: &str,
    category: ScaleCategory,
    spelled: &[S],
  ) -> Result<Self, String> {
    let parsed = spelled
      .iter()
      .map(|s| s.as_ref().parse::<Note>())
      .collect::<Result<Vec<Note>, String>>()
      .map_err(|e| format!("Scale '{}': {}", id, e))?;
    let count = parsed.len();
    let notes: [Note; SCALE_LEN] = parsed
      .try_into()
      .map_err(|_| format!("Scale '{}' has {} notes; expected {}", id, count, SCALE_LEN))?;
    if id.trim().is_empty() {
      return Err("Scale id must not be empty".into());
    }
    Ok(Self { id: id.to_string(), name: name.to_string(), category, notes })
  }

  pub fn tag(&self) -> ScaleTag {
    ScaleTag { id: self.id.clone(), name: self.name.clone() }
  }
}

/// One difficulty tier of single-scale practice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
  pub level: u32,
  pub missing_notes: usize,
  pub questions_count: usize,
  pub allowed_positions: Vec<usize>,
}

impl LevelConfig {
  pub fn validate(&self) -> Result<(), String> {
    if self.level == 0 {
      return Err("level must be >= 1".into());
    }
    if self.questions_count == 0 {
      return Err(format!("level {}: questions_count must be >= 1", self.level));
    }
    if self.missing_notes == 0 {
      return Err(format!("level {}: missing_notes must be >= 1", self.level));
    }
    if let Some(p) = self
      .allowed_positions
      .iter()
      .find(|p| !(FIRST_HIDEABLE..=LAST_HIDEABLE).contains(*p))
    {
      return Err(format!(
        "level {}: position {} is outside {}..={} (root and octave are never hidden)",
        self.level, p, FIRST_HIDEABLE, LAST_HIDEABLE
      ));
    }
    let mut distinct = self.allowed_positions.clone();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() != self.allowed_positions.len() {
      return Err(format!("level {}: allowed_positions contains duplicates", self.level));
    }
    if distinct.len() < self.missing_notes {
      return Err(format!(
        "level {}: {} allowed positions cannot hide {} notes",
        self.level,
        distinct.len(),
        self.missing_notes
      ));
    }
    Ok(())
  }
}

/// A tier of mixed practice: a level plus how many distinct scales take part.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixedLevelConfig {
  #[serde(flatten)]
  pub base: LevelConfig,
  pub scale_count: usize,
}

impl MixedLevelConfig {
  pub fn validate(&self) -> Result<(), String> {
    self.base.validate()?;
    if self.scale_count == 0 {
      return Err(format!("mixed level {}: scale_count must be >= 1", self.base.level));
    }
    Ok(())
  }
}

/// Identity of the scale a mixed-practice question was drawn from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleTag {
  pub id: String,
  pub name: String,
}

/// One drill question. Only `answered`, `correct` and `user_answers` change
/// after creation, and only through `with_answer`, which yields a new value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub scale_notes: [Note; SCALE_LEN],
  /// Ascending.
  pub hidden_positions: Vec<usize>,
  pub answered: bool,
  pub correct: Option<bool>,
  pub user_answers: BTreeMap<usize, Note>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scale: Option<ScaleTag>,
}

impl Question {
  pub fn new(scale_notes: [Note; SCALE_LEN], hidden_positions: Vec<usize>, scale: Option<ScaleTag>) -> Self {
    let mut hidden_positions = hidden_positions;
    hidden_positions.sort_unstable();
    Self {
      scale_notes,
      hidden_positions,
      answered: false,
      correct: None,
      user_answers: BTreeMap::new(),
      scale,
    }
  }

  pub fn is_complete(&self) -> bool {
    self.correct == Some(true)
  }

  pub fn is_hidden(&self, position: usize) -> bool {
    self.hidden_positions.contains(&position)
  }

  /// Lowest hidden position that has no accepted answer yet.
  pub fn active_position(&self) -> Option<usize> {
    self.hidden_positions
      .iter()
      .copied()
      .find(|p| !self.user_answers.contains_key(p))
  }

  /// Copy of this question with `note` accepted at `position`. Completion
  /// flags are recomputed from the resulting answer set.
  pub fn with_answer(&self, position: usize, note: Note) -> Question {
    let mut next = self.clone();
    next.user_answers.insert(position, note);
    let all_answered = next.hidden_positions.iter().all(|p| next.user_answers.contains_key(p));
    next.answered = all_answered;
    next.correct = if all_answered { Some(true) } else { None };
    next
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
  #[default]
  Pending,
  Correct,
  Incorrect,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn c_major_notes() -> [Note; SCALE_LEN] {
    ScaleDefinition::from_spelled("c-major", "C Major", ScaleCategory::Major, &["C", "D", "E", "F", "G", "A", "B", "C"])
      .expect("scale")
      .notes
  }

  #[test]
  fn note_equality_ignores_display() {
    let a = Note::new(NoteName::F, Accidental::Sharp);
    let b = Note { name: NoteName::F, accidental: Accidental::Sharp, display: "F♯".into() };
    assert_eq!(a, b);
    assert_eq!(a.display, "F#");
  }

  #[test]
  fn enharmonic_spellings_are_different_notes() {
    let d_sharp: Note = "D#".parse().expect("note");
    let e_flat: Note = "Eb".parse().expect("note");
    assert_ne!(d_sharp, e_flat);
  }

  #[test]
  fn parses_symbols_and_rejects_garbage() {
    assert_eq!("e♭".parse::<Note>().expect("note"), Note::new(NoteName::E, Accidental::Flat));
    assert!("H".parse::<Note>().is_err());
    assert!("C##".parse::<Note>().is_err());
    assert!("".parse::<Note>().is_err());
  }

  #[test]
  fn scale_requires_eight_notes() {
    let err = ScaleDefinition::from_spelled("short", "Short", ScaleCategory::Other, &["C", "D", "E"]).unwrap_err();
    assert!(err.contains("3 notes"), "{err}");
  }

  #[test]
  fn level_validation_rejects_root_and_octave() {
    let mut lvl = LevelConfig { level: 1, missing_notes: 1, questions_count: 8, allowed_positions: vec![0, 1, 2] };
    assert!(lvl.validate().is_err());
    lvl.allowed_positions = vec![1, 2, 7];
    assert!(lvl.validate().is_err());
    lvl.allowed_positions = vec![1, 2];
    assert!(lvl.validate().is_ok());
    lvl.missing_notes = 3;
    assert!(lvl.validate().is_err());
  }

  #[test]
  fn with_answer_produces_new_value_and_tracks_completion() {
    let q = Question::new(c_major_notes(), vec![5, 2], None);
    assert_eq!(q.hidden_positions, vec![2, 5]);
    assert_eq!(q.active_position(), Some(2));

    let q1 = q.with_answer(2, "E".parse().expect("note"));
    assert!(q.user_answers.is_empty());
    assert_eq!(q1.correct, None);
    assert!(!q1.answered);
    assert_eq!(q1.active_position(), Some(5));

    let q2 = q1.with_answer(5, "A".parse().expect("note"));
    assert!(q2.is_complete());
    assert!(q2.answered);
    assert_eq!(q2.active_position(), None);
  }
}
