//! Rendering notes for display in letter or solfège notation.

use serde::{Deserialize, Serialize};

use crate::domain::{Note, NoteName};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteNotation {
  #[default]
  Standard,
  Solfege,
}

fn solfege(name: NoteName) -> &'static str {
  match name {
    NoteName::C => "Do",
    NoteName::D => "Re",
    NoteName::E => "Mi",
    NoteName::F => "Fa",
    NoteName::G => "Sol",
    NoteName::A => "La",
    NoteName::B => "Si",
  }
}

pub fn display_note_name(name: NoteName, notation: NoteNotation) -> &'static str {
  match notation {
    NoteNotation::Standard => name.letter(),
    NoteNotation::Solfege => solfege(name),
  }
}

pub fn display_note(note: &Note, notation: NoteNotation) -> String {
  match notation {
    NoteNotation::Standard => note.display.clone(),
    NoteNotation::Solfege => format!("{}{}", solfege(note.name), note.accidental.symbol()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Accidental;

  #[test]
  fn renders_both_notations() {
    let f_sharp = Note::new(NoteName::F, Accidental::Sharp);
    let b_flat = Note::new(NoteName::B, Accidental::Flat);
    assert_eq!(display_note(&f_sharp, NoteNotation::Standard), "F#");
    assert_eq!(display_note(&f_sharp, NoteNotation::Solfege), "Fa#");
    assert_eq!(display_note(&b_flat, NoteNotation::Solfege), "Sib");
    assert_eq!(display_note_name(NoteName::G, NoteNotation::Solfege), "Sol");
    assert_eq!(display_note_name(NoteName::G, NoteNotation::Standard), "G");
  }

  #[test]
  fn notation_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&NoteNotation::Solfege).expect("json"), "\"solfege\"");
  }
}
