use tokio::sync::mpsc;

use super::error::SessionError;
use crate::actions::{ActionOutcome, ButtonConfig};
use crate::autosave::AutosaveStatus;
use crate::model::{FieldValue, FormSnapshot};
use crate::wizard::{WizardEvent, WizardView};

/// An input to the [`SessionEngine`](super::SessionEngine), translated from
/// raw page interaction by a UI adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A field was edited. Counts as a change notification.
    Edit {
        form_id: String,
        name: String,
        value: FieldValue,
    },
    /// Something in the form changed (input, change or blur).
    ChangeNotified(String),
    /// Save the form now, skipping the debounce.
    ForceSave(String),
    /// Clear a failed status indicator.
    DismissStatus(String),
    /// An action button was pressed.
    ActionTriggered(ButtonConfig),
    /// Open the wizard with defaults read from `host_form_id`.
    OpenWizard {
        host_form_id: String,
        first_session: bool,
    },
    Wizard(WizardEvent),
    /// Stop accepting commands; saves in flight still complete.
    Shutdown,
}

/// An output of the engine for the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StatusChanged {
        form_id: String,
        status: AutosaveStatus,
    },
    /// Result of a manual action.
    Feedback(ActionOutcome),
    WizardChanged(WizardView),
    /// Submit the form as a full page navigation.
    FullSubmit {
        form_id: String,
        snapshot: FormSnapshot,
    },
}

/// Cloneable sender side of an engine's command channel.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Creates a handle and the receiver to pass to
    /// [`SessionEngine::run`](super::SessionEngine::run).
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }

    pub async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| SessionError::ChannelClosed)
    }

    pub async fn change(&self, form_id: &str) -> Result<(), SessionError> {
        let command = Command::ChangeNotified(form_id.to_string());
        self.send(command).await
    }

    pub async fn trigger(&self, button: ButtonConfig) -> Result<(), SessionError> {
        self.send(Command::ActionTriggered(button)).await
    }

    pub async fn wizard(&self, event: WizardEvent) -> Result<(), SessionError> {
        self.send(Command::Wizard(event)).await
    }
}
