//! Local checks run before anything is sent to the auth provider.

use crate::common::{Error, Result};

pub(crate) fn required(field: &'static str, label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(field, format!("{} is required", label)))
    } else {
        Ok(())
    }
}

pub(crate) fn email(value: &str) -> Result<()> {
    required("email", "Email", value)?;
    let value = value.trim();
    let well_formed = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !value.contains(' ')
        }
        None => false,
    };
    if well_formed {
        Ok(())
    } else {
        Err(Error::validation("email", "The email address is badly formatted."))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<()> {
        required("email", "Email", &self.email)?;
        required("password", "Password", &self.password)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub display_name: String,
}

impl SignUpForm {
    pub fn validate(&self, min_password_length: usize) -> Result<()> {
        email(&self.email)?;
        required("password", "Password", &self.password)?;
        if self.password != self.confirm_password {
            return Err(Error::validation("confirm_password", "Passwords do not match"));
        }
        if self.password.chars().count() < min_password_length {
            return Err(Error::validation(
                "password",
                format!(
                    "Password must be at least {} characters",
                    min_password_length
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResetForm {
    pub email: String,
}

impl ResetForm {
    pub fn validate(&self) -> Result<()> {
        email(&self.email)
    }
}
