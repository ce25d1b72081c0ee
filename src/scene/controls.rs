use crate::foundation::core::RecorderId;

/// Label of the record button before a recording.
pub const RECORD_LABEL: &str = "Start recording";
/// Label of the preview (dry run) button.
pub const PREVIEW_LABEL: &str = "Preview recording";
/// Label of the record button once the recording is finalizing.
pub const PROCESSING_LABEL: &str = "Processing...";
/// Label of the record button after an encoder failure.
pub const FAILED_LABEL: &str = "Recording failed";

/// Identifier of a button in a [`ControlPanel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ButtonId(u32);

/// What a button triggers when clicked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// `start(dry_run)` on a recorder.
    Start {
        /// Target recorder.
        recorder: RecorderId,
        /// Preview instead of recording.
        dry_run: bool,
    },
}

/// A UI button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    /// Visible label.
    pub label: String,
    /// Disabled buttons ignore clicks.
    pub enabled: bool,
    /// Click action.
    pub action: ButtonAction,
}

/// Buttons injected by recorders with `show-controls`.
#[derive(Debug, Default)]
pub struct ControlPanel {
    next_id: u32,
    buttons: Vec<(ButtonId, Button)>,
}

impl ControlPanel {
    /// Add an enabled button.
    pub fn add_button(&mut self, label: impl Into<String>, action: ButtonAction) -> ButtonId {
        let id = ButtonId(self.next_id);
        self.next_id += 1;
        self.buttons.push((
            id,
            Button {
                label: label.into(),
                enabled: true,
                action,
            },
        ));
        id
    }

    /// Look a button up.
    pub fn button(&self, id: ButtonId) -> Option<&Button> {
        self.buttons.iter().find(|(b, _)| *b == id).map(|(_, b)| b)
    }

    /// Mutable access to a button.
    pub fn button_mut(&mut self, id: ButtonId) -> Option<&mut Button> {
        self.buttons
            .iter_mut()
            .find(|(b, _)| *b == id)
            .map(|(_, b)| b)
    }

    /// Remove a button.
    pub fn remove(&mut self, id: ButtonId) -> Option<Button> {
        let idx = self.buttons.iter().position(|(b, _)| *b == id)?;
        Some(self.buttons.remove(idx).1)
    }

    /// All buttons in creation order.
    pub fn buttons(&self) -> impl Iterator<Item = (ButtonId, &Button)> {
        self.buttons.iter().map(|(id, b)| (*id, b))
    }

    /// Find a button by its label.
    pub fn find_by_label(&self, label: &str) -> Option<ButtonId> {
        self.buttons
            .iter()
            .find(|(_, b)| b.label == label)
            .map(|(id, _)| *id)
    }
}
