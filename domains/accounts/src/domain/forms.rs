//! Account form payloads and their validation rules

use std::borrow::Cow;

use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

lazy_static::lazy_static! {
    static ref LOWERCASE_REGEX: Regex = Regex::new(r"[a-z]").unwrap();
    static ref UPPERCASE_REGEX: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref DIGIT_REGEX: Regex = Regex::new(r"[0-9]").unwrap();
}

/// Minimum length of a new password
pub const MIN_PASSWORD_LENGTH: u64 = 8;

const PASSWORD_STRENGTH_MESSAGE: &str =
    "Password must contain at least one uppercase letter, one lowercase letter, and one number";

/// New passwords need a lowercase letter, an uppercase letter and a digit
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let strong = LOWERCASE_REGEX.is_match(password)
        && UPPERCASE_REGEX.is_match(password)
        && DIGIT_REGEX.is_match(password);
    if strong {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength")
            .with_message(Cow::Borrowed(PASSWORD_STRENGTH_MESSAGE)))
    }
}

fn validate_terms_accepted(terms: &bool) -> Result<(), ValidationError> {
    if *terms {
        Ok(())
    } else {
        Err(ValidationError::new("terms")
            .with_message(Cow::Borrowed("You must accept the terms of service")))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Keep the session across browser restarts
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(
        email(message = "Invalid email address"),
        must_match(other = "email", message = "Email addresses do not match")
    )]
    pub email_confirm: String,

    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,

    #[serde(default)]
    #[validate(custom(function = "validate_terms_accepted"))]
    pub terms: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordForm {
    #[validate(
        length(min = 8, message = "Password must be at least 8 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
}

/// Query string of the email confirmation link
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmParams {
    pub token_hash: Option<String>,
    #[serde(rename = "type")]
    pub otp_type: Option<String>,
    pub next: Option<String>,
}
