use std::time::Duration;

use url::Url;

use super::action::{ButtonConfig, UserAction};
use super::error::PrintUrlError;
use super::outcome::{ActionOutcome, Toast};
use super::print_url::PrintUrlBuilder;
use crate::config::EngineConfig;
use crate::model::{ACTION_FIELD, FormMethod, FormSnapshot, HostForm};
use crate::save::{SaveResult, TransportError};

const SAVED_MESSAGE: &str = "✓ Saved";
const OPENING_PRINT_MESSAGE: &str = "✓ Opening print view";

/// First half of a manual action: either finished already, or a save to issue.
#[derive(Debug)]
pub enum Prepared {
    Done(ActionOutcome),
    Save(PendingAction),
}

/// A manual save waiting for its result.
#[derive(Debug)]
pub struct PendingAction {
    button: ButtonConfig,
    snapshot: FormSnapshot,
    print: Option<Result<Url, PrintUrlError>>,
    current_page: Url,
    redirect_delay: Duration,
}

impl PendingAction {
    pub fn form_id(&self) -> &str {
        &self.button.form_id
    }

    pub fn action(&self) -> UserAction {
        self.button.action
    }

    /// The snapshot to send.
    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    /// Turns the save result into the action's single outcome.
    pub fn resolve(self, outcome: Result<SaveResult, TransportError>) -> ActionOutcome {
        let form_id = self.button.form_id.clone();
        let action = self.button.action;
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%form_id, %action, error = %e, "manual save failed");
                return ActionOutcome::Notified(Toast::error(format!("Error: {e}")));
            }
        };

        match result {
            SaveResult::Success { redirect_url, .. } => self.on_success(redirect_url),
            SaveResult::ValidationError { field_errors } => {
                let fields: Vec<&String> = field_errors.keys().collect();
                tracing::warn!(%form_id, %action, ?fields, "manual save rejected");
                ActionOutcome::Notified(Toast::validation(&field_errors))
            }
            SaveResult::ServerError {
                http_status,
                message,
            } => {
                tracing::warn!(%form_id, %action, http_status, %message, "manual save failed");
                ActionOutcome::Notified(Toast::error(format!(
                    "Error: {message} (HTTP {http_status})"
                )))
            }
            SaveResult::NonStructuredResponse => {
                tracing::warn!(%form_id, %action, "falling back to full submit");
                ActionOutcome::FullSubmit {
                    form_id,
                    snapshot: self.snapshot,
                }
            }
            SaveResult::SkippedConcurrent => {
                tracing::warn!(%form_id, %action, "save already in flight");
                ActionOutcome::Notified(Toast::error("A save is already in progress."))
            }
            SaveResult::SkippedClientInvalid => {
                ActionOutcome::Notified(Toast::error("There are input errors."))
            }
        }
    }

    fn on_success(self, redirect_url: Option<String>) -> ActionOutcome {
        let redirect = match redirect_url.as_deref().map(|u| self.current_page.join(u)) {
            Some(Ok(url)) => Some(url),
            Some(Err(e)) => {
                tracing::warn!(redirect = ?redirect_url, error = %e, "bad redirect ignored");
                None
            }
            None => None,
        };

        if self.button.action.is_print() {
            let url = match (redirect, self.print) {
                (Some(url), _) | (None, Some(Ok(url))) => url,
                (None, Some(Err(e))) => {
                    return ActionOutcome::Notified(Toast::error(format!("Saved, but {e}")));
                }
                (None, None) => {
                    return ActionOutcome::Notified(Toast::error(format!(
                        "Saved, but {}",
                        PrintUrlError::NotConfigured
                    )));
                }
            };
            return ActionOutcome::OpenPrintView {
                toast: Toast::success(SAVED_MESSAGE),
                url,
                target: self.button.target,
            };
        }

        match redirect {
            Some(url) => ActionOutcome::Redirect {
                toast: Toast::success(SAVED_MESSAGE),
                url,
                delay: self.redirect_delay,
            },
            None => ActionOutcome::Notified(Toast::success(SAVED_MESSAGE)),
        }
    }
}

/// Binds button presses to saves, print views and navigation.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    current_page: Url,
    redirect_delay: Duration,
}

impl ActionDispatcher {
    pub fn new(current_page: Url, config: &EngineConfig) -> Self {
        Self {
            current_page,
            redirect_delay: config.redirect_delay(),
        }
    }

    /// Builds the print URL for `button`, or `None` if the action does not print.
    pub fn print_target(
        &self,
        button: &ButtonConfig,
        companion: Option<&HostForm>,
    ) -> Option<Result<Url, PrintUrlError>> {
        if !button.action.is_print() {
            return None;
        }
        let builder = PrintUrlBuilder::new(&self.current_page);
        Some(builder.build(button.print_url.as_deref(), companion))
    }

    /// Runs the form's validation display and decides what the action needs.
    ///
    /// A print action on a GET form opens the print view without saving.
    /// Otherwise the button's action is written into the form's `action`
    /// field and the resulting snapshot is returned for saving.
    pub fn prepare(
        &self,
        button: &ButtonConfig,
        form: &mut HostForm,
        print: Option<Result<Url, PrintUrlError>>,
    ) -> Prepared {
        if let Err(errors) = form.report_validity() {
            tracing::debug!(form_id = %button.form_id, count = errors.len(), "action aborted");
            return Prepared::Done(ActionOutcome::Aborted {
                form_id: button.form_id.clone(),
                errors,
            });
        }

        if button.action.is_print() && form.method() == FormMethod::Get {
            let outcome = match print.unwrap_or(Err(PrintUrlError::NotConfigured)) {
                Ok(url) => ActionOutcome::OpenPrintView {
                    toast: Toast::success(OPENING_PRINT_MESSAGE),
                    url,
                    target: button.target.clone(),
                },
                Err(e) => ActionOutcome::Notified(Toast::error(e.to_string())),
            };
            return Prepared::Done(outcome);
        }

        form.ensure_hidden(ACTION_FIELD, button.action.as_str());
        let snapshot = form.snapshot();
        tracing::info!(form_id = %button.form_id, action = %button.action, "manual save issued");
        Prepared::Save(PendingAction {
            button: button.clone(),
            snapshot,
            print,
            current_page: self.current_page.clone(),
            redirect_delay: self.redirect_delay,
        })
    }
}
