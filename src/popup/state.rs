use std::fmt;

/// The two forms hosted by one popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
}

impl FormKind {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }

    /// Label of the toggle link while this form is shown.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Login => "Register",
            Self::Register => "Return to Login",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Hidden,
    LoginForm,
    RegisterForm,
    /// A request started from the given form is in flight.
    Submitting(FormKind),
}

impl PopupState {
    #[must_use]
    pub const fn form(form: FormKind) -> Self {
        match form {
            FormKind::Login => Self::LoginForm,
            FormKind::Register => Self::RegisterForm,
        }
    }

    /// Form currently on screen, if any.
    #[must_use]
    pub const fn visible_form(self) -> Option<FormKind> {
        match self {
            Self::LoginForm => Some(FormKind::Login),
            Self::RegisterForm => Some(FormKind::Register),
            Self::Hidden | Self::Submitting(_) => None,
        }
    }

    #[must_use]
    pub const fn is_submitting(self) -> bool {
        matches!(self, Self::Submitting(_))
    }
}

impl fmt::Display for PopupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hidden => write!(f, "hidden"),
            Self::LoginForm => write!(f, "login form"),
            Self::RegisterForm => write!(f, "register form"),
            Self::Submitting(FormKind::Login) => write!(f, "submitting login"),
            Self::Submitting(FormKind::Register) => write!(f, "submitting registration"),
        }
    }
}
