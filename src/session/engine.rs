use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Local;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use url::Url;

use super::command::{Command, EngineEvent};
use super::error::SessionError;
use crate::actions::{
    ActionDispatcher, ActionOutcome, ButtonConfig, PendingAction, Prepared, UserAction,
};
use crate::autosave::{AutosaveScheduler, AutosaveStatus};
use crate::config::EngineConfig;
use crate::model::{FormSnapshot, HostForm};
use crate::save::{SaveResult, Saver, TransportError};
use crate::wizard::{Wizard, WizardDefaults, WizardEffect, WizardEvent};

/// Who asked for a save.
enum SaveKind {
    Autosave,
    Manual(PendingAction),
}

/// A save that has come back from the server.
struct Completed {
    form_id: String,
    kind: SaveKind,
    outcome: Result<SaveResult, TransportError>,
}

/// Owns every form of one page and runs autosave, manual actions and the
/// wizard on a single task.
///
/// Commands, debounce deadlines and completed saves are multiplexed in
/// [`run`](Self::run). Saves in flight are futures owned by that task, so
/// the per-form in-flight flag is the only guard needed.
pub struct SessionEngine<S> {
    endpoint: Url,
    saver: Arc<S>,
    forms: BTreeMap<String, HostForm>,
    scheduler: AutosaveScheduler,
    actions: ActionDispatcher,
    wizard: Wizard,
    wizard_form: Option<String>,
    events: mpsc::UnboundedSender<EngineEvent>,
    in_flight: FuturesUnordered<BoxFuture<'static, Completed>>,
    stopping: bool,
}

impl<S> SessionEngine<S>
where
    S: Saver + Send + Sync + 'static,
{
    /// Creates an engine saving to `endpoint`, the URL of the current page.
    pub fn new(
        config: &EngineConfig,
        endpoint: Url,
        saver: S,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self {
            actions: ActionDispatcher::new(endpoint.clone(), config),
            scheduler: AutosaveScheduler::from_config(config),
            endpoint,
            saver: Arc::new(saver),
            forms: BTreeMap::new(),
            wizard: Wizard::new(),
            wizard_form: None,
            events,
            in_flight: FuturesUnordered::new(),
            stopping: false,
        }
    }

    /// Adds a form to the page. A form that opted out of autosave is only
    /// saved by explicit actions.
    pub fn register_form(&mut self, form: HostForm) {
        if !form.autosave_enabled() {
            self.scheduler.disable(form.id());
        }
        self.forms.insert(form.id().to_string(), form);
    }

    pub fn form(&self, form_id: &str) -> Option<&HostForm> {
        self.forms.get(form_id)
    }

    pub fn status(&self, form_id: &str) -> AutosaveStatus {
        self.scheduler.status(form_id)
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Number of saves currently awaiting a response.
    pub fn saves_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Runs until [`Command::Shutdown`] (or the sender is dropped) and every
    /// in-flight save has completed. Returns the engine for inspection.
    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Self {
        loop {
            if self.stopping && self.in_flight.is_empty() {
                break;
            }
            let wakeup = self.scheduler.next_wakeup();
            let sleeping = wakeup.is_some() && !self.stopping;
            tokio::select! {
                command = commands.recv(), if !self.stopping => match command {
                    Some(command) => {
                        if let Err(e) = self.handle(command) {
                            tracing::warn!(error = %e, "command rejected");
                        }
                    }
                    None => self.stopping = true,
                },
                Some(done) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    self.complete(done);
                }
                () = sleep_until(wakeup.unwrap_or_else(Instant::now)), if sleeping => {
                    self.tick(Instant::now());
                }
            }
        }
        tracing::debug!("session engine stopped");
        self
    }

    /// Applies one command.
    pub fn handle(&mut self, command: Command) -> Result<(), SessionError> {
        let now = Instant::now();
        match command {
            Command::Edit {
                form_id,
                name,
                value,
            } => {
                let form = self.form_mut(&form_id)?;
                if !form.apply(&name, value) {
                    return Err(SessionError::UnknownField {
                        form_id,
                        field: name,
                    });
                }
                self.scheduler.notify_change(&form_id, now);
            }
            Command::ChangeNotified(form_id) => {
                self.form_mut(&form_id)?;
                if !self.scheduler.notify_change(&form_id, now) {
                    tracing::debug!(%form_id, "autosave disabled, change ignored");
                }
            }
            Command::ForceSave(form_id) => {
                self.form_mut(&form_id)?;
                self.scheduler.force_save(&form_id, now);
            }
            Command::DismissStatus(form_id) => {
                if self.scheduler.dismiss(&form_id) {
                    self.emit_status(&form_id, AutosaveStatus::Idle);
                }
            }
            Command::ActionTriggered(button) => {
                self.trigger(&button)?;
            }
            Command::OpenWizard {
                host_form_id,
                first_session,
            } => {
                let form = self.form_mut(&host_form_id)?;
                let defaults =
                    WizardDefaults::from_host_form(form, Local::now().date_naive(), first_session);
                self.wizard_form = Some(host_form_id);
                self.reduce_wizard(WizardEvent::Open(defaults))?;
            }
            Command::Wizard(event) => self.reduce_wizard(event)?,
            Command::Shutdown => self.stopping = true,
        }
        Ok(())
    }

    /// Expires "saved" indicators and starts every autosave that is due.
    fn tick(&mut self, now: Instant) {
        for form_id in self.scheduler.expire_saved(now) {
            self.emit_status(&form_id, AutosaveStatus::Idle);
        }
        for form_id in self.scheduler.take_due(now) {
            self.autosave(&form_id);
        }
    }

    fn autosave(&mut self, form_id: &str) {
        let Some(form) = self.forms.get(form_id) else {
            return;
        };
        match self.scheduler.begin(form) {
            Ok(snapshot) => {
                self.emit_status(form_id, AutosaveStatus::Saving);
                self.spawn_save(form_id, snapshot, SaveKind::Autosave);
            }
            Err(reason) => tracing::debug!(%form_id, ?reason, "autosave skipped"),
        }
    }

    /// Runs a button action. Returns the outcome when it was settled without
    /// sending a save.
    fn trigger(&mut self, button: &ButtonConfig) -> Result<Option<ActionOutcome>, SessionError> {
        let companion = button
            .docs_form_id
            .as_deref()
            .and_then(|id| self.forms.get(id));
        let print = self.actions.print_target(button, companion);

        let form = self
            .forms
            .get_mut(&button.form_id)
            .ok_or_else(|| SessionError::UnknownForm(button.form_id.clone()))?;
        let pending = match self.actions.prepare(button, form, print) {
            Prepared::Done(outcome) => {
                self.emit(EngineEvent::Feedback(outcome.clone()));
                return Ok(Some(outcome));
            }
            Prepared::Save(pending) => pending,
        };

        if !self.scheduler.begin_manual(&button.form_id) {
            let outcome = pending.resolve(Ok(SaveResult::SkippedConcurrent));
            self.emit(EngineEvent::Feedback(outcome.clone()));
            return Ok(Some(outcome));
        }
        self.emit_status(&button.form_id, AutosaveStatus::Saving);
        let snapshot = pending.snapshot().clone();
        self.spawn_save(&button.form_id, snapshot, SaveKind::Manual(pending));
        Ok(None)
    }

    fn spawn_save(&mut self, form_id: &str, snapshot: FormSnapshot, kind: SaveKind) {
        let saver = Arc::clone(&self.saver);
        let endpoint = self.endpoint.clone();
        let form_id = form_id.to_string();
        self.in_flight.push(
            async move {
                let outcome = saver.save(snapshot, &endpoint).await;
                Completed {
                    form_id,
                    kind,
                    outcome,
                }
            }
            .boxed(),
        );
    }

    fn complete(&mut self, done: Completed) {
        let Completed {
            form_id,
            kind,
            outcome,
        } = done;
        let status = self.scheduler.finish(&form_id, &outcome, Instant::now());
        self.emit_status(&form_id, status);

        match kind {
            SaveKind::Autosave => log_autosave(&form_id, &outcome),
            SaveKind::Manual(pending) => {
                if let Some(form) = self.forms.get_mut(&form_id) {
                    match &outcome {
                        Ok(SaveResult::ValidationError { field_errors }) => {
                            form.apply_server_errors(field_errors);
                        }
                        Ok(SaveResult::Success { .. }) => form.clear_errors(),
                        _ => {}
                    }
                }
                match pending.resolve(outcome) {
                    ActionOutcome::FullSubmit { form_id, snapshot } => {
                        self.emit(EngineEvent::FullSubmit { form_id, snapshot });
                    }
                    outcome => self.emit(EngineEvent::Feedback(outcome)),
                }
            }
        }
    }

    fn reduce_wizard(&mut self, event: WizardEvent) -> Result<(), SessionError> {
        let (wizard, effect) = std::mem::take(&mut self.wizard).reduce(event);
        self.wizard = wizard;
        match effect {
            WizardEffect::Ignored => return Ok(()),
            WizardEffect::None | WizardEffect::Blocked(_) => {}
            WizardEffect::Completed(submission) => {
                let host = self
                    .wizard_form
                    .clone()
                    .ok_or(SessionError::WizardNotBound)?;
                submission.apply_to(self.form_mut(&host)?);
                let button = ButtonConfig::new(UserAction::SaveFromWizard, host);
                if let Some(outcome) = self.trigger(&button)? {
                    let wizard = std::mem::take(&mut self.wizard);
                    self.wizard = wizard.reject_completion(refusal_message(&outcome));
                }
            }
        }
        self.emit(EngineEvent::WizardChanged(self.wizard.view()));
        Ok(())
    }

    fn form_mut(&mut self, form_id: &str) -> Result<&mut HostForm, SessionError> {
        self.forms
            .get_mut(form_id)
            .ok_or_else(|| SessionError::UnknownForm(form_id.to_string()))
    }

    fn emit_status(&self, form_id: &str, status: AutosaveStatus) {
        self.emit(EngineEvent::StatusChanged {
            form_id: form_id.to_string(),
            status,
        });
    }

    fn emit(&self, event: EngineEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}

/// Inline wizard message for a completion whose save was never sent.
fn refusal_message(outcome: &ActionOutcome) -> String {
    match outcome {
        ActionOutcome::Aborted { errors, .. } => errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other
            .toast()
            .map(|toast| toast.message.clone())
            .unwrap_or_default(),
    }
}

/// Autosave never interrupts the user; failures are only logged.
fn log_autosave(form_id: &str, outcome: &Result<SaveResult, TransportError>) {
    match outcome {
        Ok(SaveResult::Success { .. }) => tracing::debug!(%form_id, "autosaved"),
        Ok(SaveResult::ValidationError { field_errors }) => {
            let fields: Vec<&String> = field_errors.keys().collect();
            tracing::warn!(%form_id, ?fields, "autosave rejected by server");
        }
        Ok(SaveResult::ServerError {
            http_status,
            message,
        }) => tracing::warn!(%form_id, http_status, %message, "autosave server error"),
        Ok(other) => tracing::debug!(%form_id, result = ?other, "autosave response ignored"),
        Err(e) => tracing::warn!(%form_id, error = %e, "autosave transport failure"),
    }
}
