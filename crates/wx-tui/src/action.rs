//! Action enum: all user-initiated intents.

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Controls,
    Frames,
}

impl ComponentId {
    pub fn toggle(self) -> Self {
        match self {
            ComponentId::Controls => ComponentId::Frames,
            ComponentId::Frames => ComponentId::Controls,
        }
    }
}

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Fetch ────────────────────────────────────────────────────────────────
    Fetch,
    SelectionChanged,

    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePlay,
    NextFrame,
    PrevFrame,
    FirstFrame,
    LastFrame,
    SeekFrame(usize),
    /// Jump to a tenth of the sequence (0 = start, 9 = 90%).
    SeekTenth(u8),

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
