/// Errors returned while handling session commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No form with this identity was registered.
    #[error("unknown form {0:?}")]
    UnknownForm(String),

    /// The form has no field with this name.
    #[error("form {form_id:?} has no field {field:?}")]
    UnknownField { form_id: String, field: String },

    /// The wizard completed without a host form to write into.
    #[error("the wizard is not bound to a host form")]
    WizardNotBound,

    /// The engine stopped and no longer accepts commands.
    #[error("session engine has stopped")]
    ChannelClosed,
}
