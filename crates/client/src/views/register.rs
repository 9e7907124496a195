//! Registration view.

use secrecy::SecretString;
use tracing::{error, info, instrument};

use pitii_core::{Email, User};

use crate::api::RegisterRequest;
use crate::error::AppError;
use crate::store::UserStore;

/// Shown to the user once registration succeeds.
pub const REGISTERED_ACKNOWLEDGEMENT: &str = "User registered successfully";

/// Registration form fields.
#[derive(Clone)]
pub struct RegistrationForm {
    /// Name field.
    pub name: String,
    /// Email field, as typed.
    pub email: String,
    /// Password field.
    pub password: SecretString,
}

impl RegistrationForm {
    /// Fill the form.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: SecretString) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password,
        }
    }
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    /// The user as the backend created it.
    pub user: User,
    /// Acknowledgement to show before continuing.
    pub acknowledgement: &'static str,
}

/// New-user sign-up.
#[derive(Debug)]
pub struct RegistrationView {
    users: UserStore,
    form: RegistrationForm,
}

impl RegistrationView {
    /// Create a view that appends registered users to `users`.
    #[must_use]
    pub fn new(users: &UserStore, form: RegistrationForm) -> Self {
        Self {
            users: users.clone(),
            form,
        }
    }

    /// Current form state.
    #[must_use]
    pub const fn form(&self) -> &RegistrationForm {
        &self.form
    }

    /// Mutable form state.
    pub const fn form_mut(&mut self) -> &mut RegistrationForm {
        &mut self.form
    }

    /// Submit the form to `/api/register`.
    ///
    /// On success the new user is appended to the shared user store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for a malformed email (nothing is
    /// sent), or the backend error.
    #[instrument(skip(self), fields(email = %self.form.email))]
    pub async fn submit(&mut self) -> Result<Registered, AppError> {
        let email = Email::parse(&self.form.email)?;
        let request = RegisterRequest {
            name: self.form.name.clone(),
            email,
            password: self.form.password.clone(),
        };

        match self.users.client().register(&request).await {
            Ok(user) => {
                info!(id = %user.id, "user registered");
                self.users.push(user.clone()).await;
                Ok(Registered {
                    user,
                    acknowledgement: REGISTERED_ACKNOWLEDGEMENT,
                })
            }
            Err(e) => {
                error!(error = %e, "Error registering user");
                Err(e.into())
            }
        }
    }
}
