//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::{Accidental, AnswerStatus, LevelConfig, MixedLevelConfig, Note, NoteName, ScaleCategory};
use crate::engine::{Session, SessionMode, SubmitOutcome};
use crate::notation::{display_note, display_note_name, NoteNotation};
use crate::settings::Settings;

/// A user intent applied to an existing session. Shared by HTTP and WebSocket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    SelectNote { note: NoteName },
    SelectAccidental { accidental: Accidental },
    Submit,
    Next,
    Previous,
    ResetSelection,
    ClearLastCorrect,
    RestartLevel,
    NextLevel,
}

/// How to start a session: one scale at a tier, or mixed practice at a tier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StartSessionIn {
    #[serde(default, rename = "scaleId")]
    pub scale_id: Option<String>,
    pub level: u32,
    #[serde(default)]
    pub mixed: bool,
}

/// Session lifecycle and settings messages over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    Ping,
    StartSession {
        #[serde(rename = "scaleId")]
        scale_id: String,
        level: u32,
    },
    StartMixedSession {
        level: u32,
    },
    GetSession,
    EndSession,
    GetSettings,
    SaveSettings {
        settings: Settings,
    },
    ToggleSound,
    SetVolume {
        volume: f32,
    },
    SetNotation {
        notation: NoteNotation,
    },
    ClearStorage,
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ClientWsMessage {
    Control(ControlMessage),
    Intent(Intent),
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        session: SessionSnapshot,
    },
    SubmitResult {
        result: SubmitOutcome,
        session: SessionSnapshot,
    },
    Settings {
        settings: Settings,
    },
    Ended,
    Error {
        message: String,
    },
}

/// One slot of the current question, rendered in the user's notation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOut {
    pub position: usize,
    pub display: Option<String>,
    pub locked: bool,
    pub active: bool,
    pub user_answer: bool,
}

/// Everything a display layer needs to draw the drill after one intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: String,
    pub mode: &'static str,
    pub level: Option<u32>,
    pub scale_id: Option<String>,
    pub scale_name: Option<String>,
    pub current_index: usize,
    pub total: usize,
    pub solved: usize,
    pub answer_status: AnswerStatus,
    pub selected_note: Option<NoteName>,
    pub selected_accidental: Accidental,
    pub can_submit: bool,
    pub slots: Vec<SlotOut>,
    /// Solved flag per question, in session order (progress dots).
    pub solved_flags: Vec<bool>,
    pub question_complete: bool,
    pub level_complete: bool,
    pub has_next_level: bool,
    pub last_correct_note: Option<Note>,
}

/// Project a `Session` onto the public DTO.
pub fn snapshot(session_id: &str, s: &Session, catalog: &Catalog, notation: NoteNotation) -> SessionSnapshot {
    let (mode, has_next_level) = match s.mode() {
        SessionMode::Uninitialized => ("none", false),
        SessionMode::Single { level, .. } => ("single", catalog.has_next_level(level.level)),
        SessionMode::Mixed { level } => ("mixed", catalog.has_next_mixed_level(level.base.level)),
    };
    let scale_id = s
        .current_question()
        .and_then(|q| q.scale.as_ref().map(|t| t.id.clone()))
        .or_else(|| s.active_scale().map(|sc| sc.id.clone()));

    SessionSnapshot {
        session_id: session_id.to_string(),
        mode,
        level: s.active_level(),
        scale_id,
        scale_name: s.current_scale_name().map(str::to_string),
        current_index: s.current_index(),
        total: s.total_questions(),
        solved: s.solved_count(),
        answer_status: s.answer_status(),
        selected_note: s.selected_note(),
        selected_accidental: s.selected_accidental(),
        can_submit: s.can_submit(),
        slots: s
            .slots()
            .into_iter()
            .map(|v| SlotOut {
                position: v.position,
                display: v.note.as_ref().map(|n| display_note(n, notation)),
                locked: v.locked,
                active: v.active,
                user_answer: v.user_answer,
            })
            .collect(),
        solved_flags: s.questions().iter().map(|q| q.is_complete()).collect(),
        question_complete: s.current_question().is_some_and(|q| q.is_complete()),
        level_complete: s.is_level_complete(),
        has_next_level,
        last_correct_note: s.last_correct_note().cloned(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleOut {
    pub id: String,
    pub name: String,
    pub category: ScaleCategory,
    pub notes: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOut {
    pub categories: Vec<ScaleCategory>,
    /// Letter buttons C..B in the user's notation.
    pub note_names: Vec<String>,
    pub scales: Vec<ScaleOut>,
    pub levels: Vec<LevelOut>,
    pub mixed_levels: Vec<MixedLevelOut>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelOut {
    pub level: u32,
    pub missing_notes: usize,
    pub questions_count: usize,
    pub allowed_positions: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedLevelOut {
    #[serde(flatten)]
    pub base: LevelOut,
    pub scale_count: usize,
}

impl From<&LevelConfig> for LevelOut {
    fn from(l: &LevelConfig) -> Self {
        Self {
            level: l.level,
            missing_notes: l.missing_notes,
            questions_count: l.questions_count,
            allowed_positions: l.allowed_positions.clone(),
        }
    }
}

impl From<&MixedLevelConfig> for MixedLevelOut {
    fn from(m: &MixedLevelConfig) -> Self {
        Self { base: LevelOut::from(&m.base), scale_count: m.scale_count }
    }
}

pub fn catalog_out(c: &Catalog, notation: NoteNotation) -> CatalogOut {
    CatalogOut {
        categories: c.categories(),
        note_names: NoteName::ALL
            .iter()
            .map(|n| display_note_name(*n, notation).to_string())
            .collect(),
        scales: c
            .scales
            .iter()
            .map(|s| ScaleOut {
                id: s.id.clone(),
                name: s.name.clone(),
                category: s.category,
                notes: s.notes.iter().map(|n| display_note(n, notation)).collect(),
            })
            .collect(),
        levels: c.levels.iter().map(LevelOut::from).collect(),
        mixed_levels: c.mixed_levels.iter().map(MixedLevelOut::from).collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct IntentOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SubmitOutcome>,
    pub session: SessionSnapshot,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
