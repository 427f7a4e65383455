use serde::{Deserialize, Serialize};

/// Execution variant of a catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    First,
    Second,
}

impl Variant {
    /// Variant numbered 1 or 2.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Variant::First),
            2 => Some(Variant::Second),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Variant::First => 1,
            Variant::Second => 2,
        }
    }
}

/// Selected catalog row and variant. `row == None` is the unconfigured state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    pub row: Option<usize>,
    pub variant: Variant,
}

impl SelectionState {
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn configured(row: usize, variant: Variant) -> Self {
        Self {
            row: Some(row),
            variant,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.row.is_some()
    }
}

/// An in-progress change to a selection.
///
/// Holds the state from before the edit so it can be rolled back. With
/// `preview` set, the owner rebuilds after every change; otherwise only on
/// commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEdit {
    snapshot: SelectionState,
    working: SelectionState,
    preview: bool,
}

impl SelectionEdit {
    pub fn begin(current: SelectionState, preview: bool) -> Self {
        Self {
            snapshot: current,
            working: current,
            preview,
        }
    }

    pub fn set_row(&mut self, row: usize) {
        self.working.row = Some(row);
    }

    /// Return the working state to unconfigured.
    pub fn clear_row(&mut self) {
        self.working.row = None;
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.working.variant = variant;
    }

    pub fn set_preview(&mut self, preview: bool) {
        self.preview = preview;
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn working(&self) -> SelectionState {
        self.working
    }

    pub fn snapshot(&self) -> SelectionState {
        self.snapshot
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.snapshot
    }

    /// Finish the edit, keeping the changes.
    pub fn commit(self) -> SelectionState {
        self.working
    }

    /// Abandon the edit, returning the state from before it began.
    pub fn rollback(self) -> SelectionState {
        self.snapshot
    }
}
