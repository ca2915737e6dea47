//! New-stream form state and what a finished registration does to it

use crate::api::{CreateStreamRequest, RegistrationOutcome};
use crate::error::{HubError, Result};
use crate::notify::Toasts;
use crate::session::WalletSession;

#[derive(Debug, Default)]
pub struct StreamForm {
    pub request: CreateStreamRequest,
    pub open: bool,
    pub error: Option<String>,
    pending: bool,
}

impl StreamForm {
    pub fn show(&mut self) {
        self.error = None;
        self.open = true;
    }

    pub fn hide(&mut self) {
        self.open = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Chain reads hold off while the form is up or a request is out
    pub fn is_writing(&self) -> bool {
        self.open || self.pending
    }

    /// Validate and mark the form pending. Returns the request to send.
    pub fn begin_submit(&mut self, session: &WalletSession) -> Result<CreateStreamRequest> {
        if self.pending {
            return Err(HubError::Rejected("A registration is already in progress".to_string()));
        }
        if !self.request.is_complete() {
            let err = HubError::Rejected("All fields are required".to_string());
            self.error = Some(err.to_string());
            return Err(err);
        }
        session.require_account()?;

        self.error = None;
        self.pending = true;
        Ok(self.request.clone())
    }

    /// Apply the backend's answer: toast it, and clear and close the form on
    /// success. On failure the fields stay for a resubmit.
    pub fn finish(
        &mut self,
        outcome: std::result::Result<RegistrationOutcome, String>,
        toasts: &mut Toasts,
    ) -> std::result::Result<(), String> {
        self.pending = false;

        let result = match outcome {
            Ok(RegistrationOutcome::Created) => Ok(()),
            Ok(RegistrationOutcome::Rejected(reason)) => Err(reason),
            Err(message) => Err(message),
        };

        match &result {
            Ok(()) => {
                toasts.success("Success!");
                self.request = CreateStreamRequest::default();
                self.error = None;
                self.open = false;
            }
            Err(message) => toasts.error(message.as_str()),
        }
        result
    }
}
