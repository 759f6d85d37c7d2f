use crate::dto::RegistrationRequest;
use crate::error::LoadError;
use regex::Regex;
use std::sync::OnceLock;

pub const MIN_PASSWORD_LEN: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

pub fn validate_email(email: &str) -> Result<(), LoadError> {
    if email_regex().is_match(email.trim()) {
        Ok(())
    } else {
        Err(LoadError::Validation(
            "Please enter a valid email address".to_string(),
        ))
    }
}

pub fn validate_password(password: &str) -> Result<(), LoadError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(LoadError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )))
    }
}

/// Check every field and report all problems at once.
pub fn validate_registration(request: &RegistrationRequest) -> Result<(), LoadError> {
    let mut problems = Vec::new();

    if request.name.trim().is_empty() {
        problems.push("Name is required".to_string());
    }
    if let Err(err) = validate_email(&request.email) {
        problems.push(err.to_string());
    }
    if let Err(err) = validate_password(&request.password) {
        problems.push(err.to_string());
    }
    if request.password != request.confirm_password {
        problems.push("Passwords do not match".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(LoadError::Validation(problems.join("; ")))
    }
}
