//! Account creation. A new account is not signed in; the caller sends the
//! user to the login view afterwards.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use crate::api::{ApiError, SignupRequest};
use crate::coordinator::Session;
use crate::error::SessionError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Raw input of the signup form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// `Some` when an admin account is requested.
    pub admin_code: Option<String>,
}

/// Check the signup form and build the request body.
///
/// # Errors
///
/// [`SessionError::InvalidInput`] for a blank field, mismatched or short
/// password, or an admin request without a code.
pub fn validate_signup_input(form: &SignupForm) -> Result<SignupRequest, SessionError> {
    let name = form.name.trim();
    let email = form.email.trim();
    if name.is_empty() || email.is_empty() || form.password.is_empty() {
        return Err(SessionError::InvalidInput("Fill in every field."));
    }
    if form.password != form.confirm_password {
        return Err(SessionError::InvalidInput("Passwords do not match"));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SessionError::InvalidInput("Password must be at least 8 characters long"));
    }
    let admin_code = match form.admin_code.as_deref().map(str::trim) {
        Some("") => return Err(SessionError::InvalidInput("Admin code is required for admin accounts")),
        Some(code) => code.to_owned(),
        None => String::new(),
    };
    Ok(SignupRequest { name: name.to_owned(), email: email.to_owned(), password: form.password.clone(), admin_code })
}

impl Session {
    /// Create an account from `form`.
    ///
    /// Leaves the current credential untouched.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidInput`] before any request,
    /// [`SessionError::Signup`] with the server's message on a rejection, and
    /// [`SessionError::Api`] for transport failures.
    pub async fn sign_up(&self, form: &SignupForm) -> Result<(), SessionError> {
        let request = validate_signup_input(form)?;
        self.inner.api.sign_up(&request).await.map_err(|err| match err {
            ApiError::Status { message, .. } => SessionError::Signup(message),
            other => SessionError::Api(other),
        })?;
        log::info!("account created");
        Ok(())
    }
}
