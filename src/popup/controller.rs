use super::{
    state::{FormKind, PopupState},
    transport::{ActionRequest, Transport, TransportError},
    view::{PopupElements, PopupView},
};
use crate::protocol::AuthResult;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_ACCOUNT_URL: &str = "/my-account/";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-page settings for a popup controller.
#[derive(Clone, Debug)]
pub struct PopupSettings {
    account_url: String,
    page_url: String,
    request_timeout: Duration,
}

impl Default for PopupSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl PopupSettings {
    #[must_use]
    pub fn new() -> Self {
        Self {
            account_url: DEFAULT_ACCOUNT_URL.to_string(),
            page_url: "/".to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_account_url(mut self, url: String) -> Self {
        self.account_url = url;
        self
    }

    /// URL of the page hosting the widget.
    #[must_use]
    pub fn with_page_url(mut self, url: String) -> Self {
        self.page_url = url;
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// A successful submit on the account page reloads it instead of patching
    /// the trigger.
    #[must_use]
    pub fn on_account_page(&self) -> bool {
        self.page_url.contains(&self.account_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("cannot submit the {form:?} form while {state}")]
    FormNotShown { form: FormKind, state: PopupState },
    #[error("current user info is not a form submission")]
    NotAForm,
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Trigger now shows the user; popup hidden.
    LoggedIn,
    /// The host page must reload.
    Reload,
    /// The originating form is back on screen with `message` in its error slot.
    Failed { form: FormKind, message: String },
}

/// What to do after the first response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Ask the server for the logged-in trigger markup.
    RefreshUser,
    Finished(Outcome),
}

/// Popup state machine for one widget instance.
///
/// Every event takes `&mut self`, so at most one submission is in flight.
#[derive(Debug)]
pub struct PopupController {
    elements: PopupElements,
    settings: PopupSettings,
    state: PopupState,
    view: PopupView,
}

impl PopupController {
    #[must_use]
    pub fn new(instance_id: &str, settings: PopupSettings) -> Self {
        Self {
            elements: PopupElements::for_instance(instance_id),
            settings,
            state: PopupState::Hidden,
            view: PopupView::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> PopupState {
        self.state
    }

    #[must_use]
    pub const fn view(&self) -> &PopupView {
        &self.view
    }

    #[must_use]
    pub const fn elements(&self) -> &PopupElements {
        &self.elements
    }

    #[must_use]
    pub const fn settings(&self) -> &PopupSettings {
        &self.settings
    }

    /// Open the popup on the login form. Ignored once the trigger is detached
    /// or while a submission is pending.
    pub fn click_trigger(&mut self) -> bool {
        if !self.view.trigger_bound || self.state.is_submitting() {
            return false;
        }

        self.view.show_form(FormKind::Login);
        self.view.clear_errors();
        self.view.toggle_text = FormKind::Login.toggle_label();
        self.view.popup_visible = true;
        self.transition(PopupState::LoginForm);
        true
    }

    /// Switch between the login and register forms.
    pub fn click_toggle(&mut self) -> bool {
        let Some(current) = self.state.visible_form() else {
            return false;
        };

        let next = current.other();
        self.view.clear_errors();
        self.view.show_form(next);
        self.view.toggle_text = next.toggle_label();
        self.transition(PopupState::form(next));
        true
    }

    /// Close the popup unless a submission is pending.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_submitting() {
            return false;
        }

        self.view.popup_visible = false;
        self.transition(PopupState::Hidden);
        true
    }

    /// Clicks on the popup overlay close it only when the overlay itself is the
    /// target, not the form content inside it.
    pub fn click_backdrop(&mut self, target_id: &str) -> bool {
        if target_id != self.elements.popup {
            return false;
        }
        self.cancel()
    }

    /// Hide the form, show the spinner and hand back the request to send.
    ///
    /// # Errors
    /// [`SubmitRejected`] when the matching form is not the one on screen.
    pub fn begin_submit(&mut self, request: ActionRequest) -> Result<ActionRequest, SubmitRejected> {
        let form = match request {
            ActionRequest::Login { .. } => FormKind::Login,
            ActionRequest::Register { .. } => FormKind::Register,
            ActionRequest::CurrentUserInfo => return Err(SubmitRejected::NotAForm),
        };

        if self.state != PopupState::form(form) {
            return Err(SubmitRejected::FormNotShown {
                form,
                state: self.state,
            });
        }

        self.view.error_slot(form).clear();
        self.view.hide_forms();
        self.view.loading_visible = true;
        self.transition(PopupState::Submitting(form));
        Ok(request)
    }

    /// Apply the response to the form submission.
    pub fn on_response(&mut self, result: Result<AuthResult, TransportError>) -> Step {
        let PopupState::Submitting(form) = self.state else {
            warn!(state = %self.state, "Response without a pending submission");
            return Step::Finished(self.settled());
        };

        match result {
            Ok(AuthResult::Success { .. }) if self.settings.on_account_page() => {
                debug!("Submission succeeded on the account page");
                Step::Finished(Outcome::Reload)
            }
            Ok(AuthResult::Success { .. }) => Step::RefreshUser,
            Ok(AuthResult::Failure { message }) => Step::Finished(self.restore(form, message)),
            Err(e) => Step::Finished(self.restore(form, format!("AJAX Error: {e}"))),
        }
    }

    /// Apply the current-user-info response that follows a successful submit.
    pub fn on_user_info(&mut self, result: Result<AuthResult, TransportError>) -> Outcome {
        let PopupState::Submitting(form) = self.state else {
            warn!(state = %self.state, "User info without a pending submission");
            return self.settled();
        };

        match result {
            Ok(AuthResult::Success { html, .. }) => {
                if html.is_some() {
                    self.view.trigger_html = html;
                }
                self.view.trigger_href = self.settings.account_url.clone();
                self.view.trigger_unlogged = false;
                self.view.trigger_bound = false;
                self.view.loading_visible = false;
                self.view.popup_visible = false;
                self.transition(PopupState::Hidden);
                Outcome::LoggedIn
            }
            Ok(AuthResult::Failure { message }) => self.restore(form, message),
            Err(e) => self.restore(form, format!("AJAX Error (update): {e}")),
        }
    }

    /// Run a full submission through `transport`: the form request, then the
    /// trigger refresh when needed. Each request is bounded by the configured
    /// timeout and never retried.
    ///
    /// # Errors
    /// [`SubmitRejected`] when the form is not on screen; nothing is sent.
    pub async fn submit<T>(
        &mut self,
        transport: &T,
        request: ActionRequest,
    ) -> Result<Outcome, SubmitRejected>
    where
        T: Transport + ?Sized,
    {
        let request = self.begin_submit(request)?;
        let response = self.send(transport, request).await;

        Ok(match self.on_response(response) {
            Step::Finished(outcome) => outcome,
            Step::RefreshUser => {
                let response = self.send(transport, ActionRequest::CurrentUserInfo).await;
                self.on_user_info(response)
            }
        })
    }

    async fn send<T>(
        &self,
        transport: &T,
        request: ActionRequest,
    ) -> Result<AuthResult, TransportError>
    where
        T: Transport + ?Sized,
    {
        let action = request.action();
        debug!(?action, "Sending request");
        match tokio::time::timeout(self.settings.request_timeout, transport.send(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?action, "Request timed out");
                Err(TransportError::Timeout)
            }
        }
    }

    fn restore(&mut self, form: FormKind, message: String) -> Outcome {
        *self.view.error_slot(form) = message.clone();
        self.view.loading_visible = false;
        self.view.show_form(form);
        self.transition(PopupState::form(form));
        Outcome::Failed { form, message }
    }

    fn settled(&self) -> Outcome {
        match self.state.visible_form() {
            Some(form) => Outcome::Failed {
                form,
                message: self.view.error(form).to_string(),
            },
            None if !self.view.trigger_bound => Outcome::LoggedIn,
            None => Outcome::Failed {
                form: FormKind::Login,
                message: String::new(),
            },
        }
    }

    fn transition(&mut self, next: PopupState) {
        debug!(instance = %self.elements.popup, from = %self.state, to = %next, "Popup transition");
        self.state = next;
    }
}
