//! What the popup and its trigger look like after each event.

use super::state::FormKind;

/// DOM ids of one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupElements {
    pub wrapper: String,
    pub trigger: String,
    pub popup: String,
    pub login_form: String,
    pub register_form: String,
    pub loading: String,
    pub login_error: String,
    pub register_error: String,
    pub login_cancel: String,
    pub register_cancel: String,
}

impl PopupElements {
    #[must_use]
    pub fn for_instance(instance_id: &str) -> Self {
        Self {
            wrapper: format!("menu-login-wrapper-{instance_id}"),
            trigger: format!("menu-login-ajax-trigger-{instance_id}"),
            popup: format!("menu-login-ajax-popup-{instance_id}"),
            login_form: format!("menu-login-form-container-{instance_id}"),
            register_form: format!("menu-register-form-container-{instance_id}"),
            loading: format!("menu-login-loading-{instance_id}"),
            login_error: format!("menu-login-error-msg-{instance_id}"),
            register_error: format!("menu-register-error-msg-{instance_id}"),
            login_cancel: format!("menu-login-ajax-cancel-{instance_id}"),
            register_cancel: format!("menu-register-ajax-cancel-{instance_id}"),
        }
    }

    /// Every id above, wrapper class first.
    #[must_use]
    pub fn all(&self) -> [&str; 10] {
        [
            &self.wrapper,
            &self.trigger,
            &self.popup,
            &self.login_form,
            &self.register_form,
            &self.loading,
            &self.login_error,
            &self.register_error,
            &self.login_cancel,
            &self.register_cancel,
        ]
    }
}

/// Visible state of the popup and trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub popup_visible: bool,
    pub login_visible: bool,
    pub register_visible: bool,
    pub loading_visible: bool,
    pub login_error: String,
    pub register_error: String,
    pub toggle_text: &'static str,
    /// Replacement trigger content; `None` keeps the server-rendered markup.
    pub trigger_html: Option<String>,
    pub trigger_href: String,
    pub trigger_unlogged: bool,
    /// Whether clicking the trigger still opens the popup.
    pub trigger_bound: bool,
}

impl Default for PopupView {
    fn default() -> Self {
        Self {
            popup_visible: false,
            login_visible: false,
            register_visible: false,
            loading_visible: false,
            login_error: String::new(),
            register_error: String::new(),
            toggle_text: FormKind::Login.toggle_label(),
            trigger_html: None,
            trigger_href: "#".to_string(),
            trigger_unlogged: true,
            trigger_bound: true,
        }
    }
}

impl PopupView {
    pub(crate) fn show_form(&mut self, form: FormKind) {
        self.login_visible = form == FormKind::Login;
        self.register_visible = form == FormKind::Register;
    }

    pub(crate) fn hide_forms(&mut self) {
        self.login_visible = false;
        self.register_visible = false;
    }

    pub(crate) fn error_slot(&mut self, form: FormKind) -> &mut String {
        match form {
            FormKind::Login => &mut self.login_error,
            FormKind::Register => &mut self.register_error,
        }
    }

    pub(crate) fn clear_errors(&mut self) {
        self.login_error.clear();
        self.register_error.clear();
    }

    #[must_use]
    pub fn error(&self, form: FormKind) -> &str {
        match form {
            FormKind::Login => &self.login_error,
            FormKind::Register => &self.register_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_follow_instance() {
        let ids = PopupElements::for_instance("42");
        assert_eq!(ids.trigger, "menu-login-ajax-trigger-42");
        assert_eq!(ids.popup, "menu-login-ajax-popup-42");
        assert_eq!(ids.login_form, "menu-login-form-container-42");
        assert_eq!(ids.register_form, "menu-register-form-container-42");
        assert_eq!(ids.loading, "menu-login-loading-42");
        assert_eq!(ids.login_error, "menu-login-error-msg-42");
        assert_eq!(ids.register_error, "menu-register-error-msg-42");
        assert_eq!(ids.wrapper, "menu-login-wrapper-42");
        assert_eq!(ids.login_cancel, "menu-login-ajax-cancel-42");
        assert_eq!(ids.register_cancel, "menu-register-ajax-cancel-42");
        assert!(ids.all().iter().all(|id| id.ends_with("-42")));
    }

    #[test]
    fn starts_logged_out_and_hidden() {
        let view = PopupView::default();
        assert!(!view.popup_visible);
        assert!(view.trigger_unlogged);
        assert!(view.trigger_bound);
        assert_eq!(view.trigger_href, "#");
        assert_eq!(view.toggle_text, "Register");
    }
}
