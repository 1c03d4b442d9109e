//! Per-form debounce, in-flight guard and status projection.
//!
//! The scheduler owns no timers and performs no I/O. The caller feeds it the
//! current time and asks for the next instant it needs to be woken at; this
//! keeps every timing rule testable with plain [`Instant`] arithmetic.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tokio::time::Instant;

use super::status::AutosaveStatus;
use crate::config::EngineConfig;
use crate::model::{FormSnapshot, HostForm};
use crate::save::{SaveResult, TransportError};

/// Why an attempt did not issue a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A save for the same form is still in flight.
    Concurrent,
    /// The form's own required/format constraints failed.
    ClientInvalid,
}

impl SkipReason {
    /// The [`SaveResult`] reported for a skipped attempt.
    pub fn into_result(self) -> SaveResult {
        match self {
            Self::Concurrent => SaveResult::SkippedConcurrent,
            Self::ClientInvalid => SaveResult::SkippedClientInvalid,
        }
    }
}

/// Autosave state of one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutosaveEntry {
    /// When the pending debounce expires, if a save is scheduled.
    pub deadline: Option<Instant>,
    pub in_flight: bool,
    pub status: AutosaveStatus,
    /// When a `Saved` status reverts to `Idle`.
    pub saved_until: Option<Instant>,
}

/// Debounces change notifications per form and tracks in-flight saves.
#[derive(Debug, Clone)]
pub struct AutosaveScheduler {
    debounce: Duration,
    saved_display: Duration,
    entries: HashMap<String, AutosaveEntry>,
    disabled: BTreeSet<String>,
}

impl AutosaveScheduler {
    pub fn new(debounce: Duration, saved_display: Duration) -> Self {
        Self {
            debounce,
            saved_display,
            entries: HashMap::new(),
            disabled: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.debounce(), config.saved_display())
    }

    /// Opts `form_id` out of autosave. Later notifications for it are ignored.
    pub fn disable(&mut self, form_id: &str) {
        self.disabled.insert(form_id.to_string());
        if let Some(entry) = self.entries.get_mut(form_id) {
            entry.deadline = None;
        }
    }

    /// Returns `false` if `form_id` opted out of autosave.
    pub fn is_enabled(&self, form_id: &str) -> bool {
        !self.disabled.contains(form_id)
    }

    /// Records an input change, restarting the form's debounce window.
    ///
    /// Returns `false` if the form opted out and nothing was scheduled.
    pub fn notify_change(&mut self, form_id: &str, now: Instant) -> bool {
        if !self.is_enabled(form_id) {
            return false;
        }
        let deadline = now + self.debounce;
        self.entry_mut(form_id).deadline = Some(deadline);
        true
    }

    /// Makes the form's save due immediately, bypassing the debounce.
    pub fn force_save(&mut self, form_id: &str, now: Instant) {
        self.entry_mut(form_id).deadline = Some(now);
    }

    /// The earliest instant at which [`take_due`](Self::take_due) or
    /// [`expire_saved`](Self::expire_saved) has work to do.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.entries
            .values()
            .flat_map(|e| [e.deadline, e.saved_until])
            .flatten()
            .min()
    }

    /// Removes and returns every form whose debounce has expired, sorted by id.
    pub fn take_due(&mut self, now: Instant) -> Vec<String> {
        let mut due: Vec<String> = self
            .entries
            .iter_mut()
            .filter(|(_, e)| e.deadline.is_some_and(|d| d <= now))
            .map(|(id, e)| {
                e.deadline = None;
                id.clone()
            })
            .collect();
        due.sort();
        due
    }

    /// Reverts expired `Saved` statuses to `Idle`. Returns the changed forms, sorted.
    pub fn expire_saved(&mut self, now: Instant) -> Vec<String> {
        let mut expired: Vec<String> = self
            .entries
            .iter_mut()
            .filter(|(_, e)| e.saved_until.is_some_and(|t| t <= now))
            .map(|(id, e)| {
                e.saved_until = None;
                e.status = AutosaveStatus::Idle;
                id.clone()
            })
            .collect();
        expired.sort();
        expired
    }

    /// Starts an autosave for `form`.
    ///
    /// Checks the in-flight guard first, then the form's own constraints. A
    /// skipped attempt changes nothing; an issued one marks the form in
    /// flight and returns the snapshot to send (with no action tag).
    pub fn begin(&mut self, form: &HostForm) -> Result<FormSnapshot, SkipReason> {
        if self.is_in_flight(form.id()) {
            return Err(SkipReason::Concurrent);
        }
        if !form.check_validity() {
            return Err(SkipReason::ClientInvalid);
        }
        self.mark_in_flight(form.id());
        Ok(form.snapshot_with_action(None))
    }

    /// Claims the in-flight slot for a manual save.
    ///
    /// Returns `false` if a save for the form is already in flight.
    pub fn begin_manual(&mut self, form_id: &str) -> bool {
        if self.is_in_flight(form_id) {
            return false;
        }
        self.mark_in_flight(form_id);
        true
    }

    fn mark_in_flight(&mut self, form_id: &str) {
        let entry = self.entry_mut(form_id);
        entry.in_flight = true;
        entry.status = AutosaveStatus::Saving;
        entry.saved_until = None;
    }

    /// Releases the in-flight slot and projects the outcome onto the status.
    pub fn finish(
        &mut self,
        form_id: &str,
        outcome: &Result<SaveResult, TransportError>,
        now: Instant,
    ) -> AutosaveStatus {
        let saved_display = self.saved_display;
        let entry = self.entry_mut(form_id);
        entry.in_flight = false;
        entry.status = match outcome {
            Ok(SaveResult::Success { .. }) => {
                entry.saved_until = Some(now + saved_display);
                AutosaveStatus::Saved
            }
            Ok(SaveResult::ValidationError { .. }) => AutosaveStatus::Failed,
            Ok(SaveResult::ServerError { .. }) | Err(_) => AutosaveStatus::Failed,
            Ok(SaveResult::NonStructuredResponse) => AutosaveStatus::Idle,
            Ok(SaveResult::SkippedClientInvalid) => AutosaveStatus::Idle,
            Ok(SaveResult::SkippedConcurrent) => AutosaveStatus::Idle,
        };
        entry.status
    }

    /// Clears a `Failed` status. Returns `true` if the status changed.
    pub fn dismiss(&mut self, form_id: &str) -> bool {
        match self.entries.get_mut(form_id) {
            Some(entry) if entry.status == AutosaveStatus::Failed => {
                entry.status = AutosaveStatus::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn status(&self, form_id: &str) -> AutosaveStatus {
        self.entries
            .get(form_id)
            .map(|e| e.status)
            .unwrap_or_default()
    }

    pub fn is_in_flight(&self, form_id: &str) -> bool {
        self.entries.get(form_id).is_some_and(|e| e.in_flight)
    }

    pub fn entry(&self, form_id: &str) -> Option<&AutosaveEntry> {
        self.entries.get(form_id)
    }

    fn entry_mut(&mut self, form_id: &str) -> &mut AutosaveEntry {
        self.entries.entry(form_id.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::model::{FieldKind, FormField, FormMethod};

    const DEBOUNCE: Duration = Duration::from_millis(1200);
    const SAVED: Duration = Duration::from_millis(2000);

    fn make_scheduler() -> AutosaveScheduler {
        AutosaveScheduler::new(DEBOUNCE, SAVED)
    }

    fn make_form(id: &str) -> HostForm {
        HostForm::new(
            id,
            FormMethod::Post,
            vec![FormField::new("note", FieldKind::TextArea).with_value("ok")],
        )
    }

    fn success() -> Result<SaveResult, TransportError> {
        Ok(SaveResult::Success {
            redirect_url: None,
            payload: serde_json::Map::new(),
        })
    }

    // --- Debounce ---

    #[test]
    fn save_due_after_quiet_period() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.notify_change("a", t0);
        let just_before = t0 + DEBOUNCE - Duration::from_millis(1);
        assert!(s.take_due(just_before).is_empty());
        assert_eq!(s.take_due(t0 + DEBOUNCE), vec!["a"]);
        assert!(s.take_due(t0 + DEBOUNCE * 3).is_empty());
    }

    #[test]
    fn new_notification_restarts_window() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.notify_change("a", t0);
        s.notify_change("a", t0 + Duration::from_millis(1000));
        assert!(s.take_due(t0 + DEBOUNCE).is_empty());
        assert_eq!(s.take_due(t0 + Duration::from_millis(2200)), vec!["a"]);
    }

    #[test]
    fn forms_debounce_independently() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.notify_change("a", t0);
        s.notify_change("b", t0 + Duration::from_millis(600));
        assert_eq!(s.take_due(t0 + DEBOUNCE), vec!["a"]);
        assert_eq!(s.take_due(t0 + Duration::from_millis(1800)), vec!["b"]);
    }

    #[test]
    fn take_due_is_sorted() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        for id in ["c", "a", "b"] {
            s.notify_change(id, t0);
        }
        assert_eq!(s.take_due(t0 + DEBOUNCE), vec!["a", "b", "c"]);
    }

    #[test]
    fn force_save_is_due_now() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.notify_change("a", t0);
        s.force_save("a", t0);
        assert_eq!(s.next_wakeup(), Some(t0));
        assert_eq!(s.take_due(t0), vec!["a"]);
    }

    #[test]
    fn disabled_form_never_schedules() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.disable("a");
        assert!(!s.notify_change("a", t0));
        assert_eq!(s.next_wakeup(), None);
        assert!(s.take_due(t0 + DEBOUNCE).is_empty());
    }

    #[quickcheck]
    fn notifications_within_window_collapse(gaps_ms: Vec<u16>) -> bool {
        let mut s = make_scheduler();
        let mut t = Instant::now();
        s.notify_change("f", t);
        for gap in gaps_ms {
            t += Duration::from_millis(u64::from(gap) % 1200);
            if !s.take_due(t).is_empty() {
                return false;
            }
            s.notify_change("f", t);
        }
        let just_before = t + DEBOUNCE - Duration::from_millis(1);
        s.take_due(just_before).is_empty()
            && s.take_due(t + DEBOUNCE) == vec!["f".to_string()]
            && s.take_due(t + DEBOUNCE * 2).is_empty()
    }

    // --- In-flight guard ---

    #[test]
    fn begin_marks_saving_and_blocks_second_attempt() {
        let mut s = make_scheduler();
        let form = make_form("a");
        let snap = s.begin(&form).unwrap();
        assert_eq!(snap.action(), None);
        assert_eq!(s.status("a"), AutosaveStatus::Saving);
        assert_eq!(s.begin(&form), Err(SkipReason::Concurrent));
        assert!(!s.begin_manual("a"));
    }

    #[test]
    fn finish_releases_slot() {
        let mut s = make_scheduler();
        let form = make_form("a");
        s.begin(&form).unwrap();
        s.finish("a", &success(), Instant::now());
        assert!(!s.is_in_flight("a"));
        assert!(s.begin(&form).is_ok());
    }

    #[test]
    fn invalid_form_is_skipped_without_status_change() {
        let mut s = make_scheduler();
        let form = HostForm::new(
            "a",
            FormMethod::Post,
            vec![FormField::new("date", FieldKind::Date).required()],
        );
        assert_eq!(s.begin(&form), Err(SkipReason::ClientInvalid));
        assert_eq!(s.status("a"), AutosaveStatus::Idle);
        assert!(!s.is_in_flight("a"));
    }

    #[test]
    fn in_flight_checked_before_validity() {
        let mut s = make_scheduler();
        assert!(s.begin_manual("a"));
        let invalid = HostForm::new(
            "a",
            FormMethod::Post,
            vec![FormField::new("date", FieldKind::Date).required()],
        );
        assert_eq!(s.begin(&invalid), Err(SkipReason::Concurrent));
    }

    #[test]
    fn skip_reason_results() {
        assert_eq!(
            SkipReason::Concurrent.into_result(),
            SaveResult::SkippedConcurrent
        );
        assert_eq!(
            SkipReason::ClientInvalid.into_result(),
            SaveResult::SkippedClientInvalid
        );
    }

    // --- Status projection ---

    #[test]
    fn success_shows_saved_then_idle() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.begin(&make_form("a")).unwrap();
        assert_eq!(s.finish("a", &success(), t0), AutosaveStatus::Saved);
        assert_eq!(s.next_wakeup(), Some(t0 + SAVED));
        let just_before = t0 + SAVED - Duration::from_millis(1);
        assert!(s.expire_saved(just_before).is_empty());
        assert_eq!(s.expire_saved(t0 + SAVED), vec!["a"]);
        assert_eq!(s.status("a"), AutosaveStatus::Idle);
        assert_eq!(s.next_wakeup(), None);
    }

    #[test]
    fn validation_error_fails_until_dismissed() {
        let mut s = make_scheduler();
        let mut errors = BTreeMap::new();
        errors.insert("name".to_string(), vec!["required".to_string()]);
        s.begin(&make_form("a")).unwrap();
        let outcome = Ok(SaveResult::ValidationError {
            field_errors: errors,
        });
        assert_eq!(
            s.finish("a", &outcome, Instant::now()),
            AutosaveStatus::Failed
        );
        assert!(s.dismiss("a"));
        assert_eq!(s.status("a"), AutosaveStatus::Idle);
        assert!(!s.dismiss("a"));
    }

    #[test]
    fn failed_persists_until_next_success() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.begin(&make_form("a")).unwrap();
        s.finish("a", &Ok(SaveResult::timed_out()), t0);
        assert_eq!(s.expire_saved(t0 + SAVED * 10), Vec::<String>::new());
        assert_eq!(s.status("a"), AutosaveStatus::Failed);
        s.begin(&make_form("a")).unwrap();
        assert_eq!(s.finish("a", &success(), t0), AutosaveStatus::Saved);
    }

    #[test]
    fn non_structured_reverts_to_idle() {
        let mut s = make_scheduler();
        s.begin(&make_form("a")).unwrap();
        assert_eq!(
            s.finish("a", &Ok(SaveResult::NonStructuredResponse), Instant::now()),
            AutosaveStatus::Idle
        );
    }

    #[test]
    fn new_save_cancels_pending_saved_expiry() {
        let mut s = make_scheduler();
        let t0 = Instant::now();
        s.begin(&make_form("a")).unwrap();
        s.finish("a", &success(), t0);
        s.begin(&make_form("a")).unwrap();
        assert!(s.expire_saved(t0 + SAVED).is_empty());
        assert_eq!(s.status("a"), AutosaveStatus::Saving);
    }

    #[test]
    fn unknown_form_is_idle() {
        let s = make_scheduler();
        assert_eq!(s.status("ghost"), AutosaveStatus::Idle);
        assert!(s.entry("ghost").is_none());
    }
}
