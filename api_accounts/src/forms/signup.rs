use chrono::NaiveDate;
use common::{error::ValidationErrors, misc::normalize_email};
use validator::Validate;

use super::password::{UserAttributes, password_problems};
use crate::dtos::auth::SignupRequest;

/// A signup that passed every field rule. Email uniqueness is checked
/// against storage afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSignup {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub password: String,
}

/// Trims the names, normalises the email and drops it when blank.
pub fn normalized(req: &SignupRequest) -> SignupRequest {
    SignupRequest {
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        email: req
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(normalize_email),
        ..req.clone()
    }
}

pub fn clean_signup(req: &SignupRequest) -> Result<CleanedSignup, ValidationErrors> {
    let req = normalized(req);
    let mut errors = req
        .validate()
        .err()
        .map(ValidationErrors::from)
        .unwrap_or_default();

    let date_of_birth = match req.date_of_birth.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add("date_of_birth", "Enter a valid date.");
                None
            }
        },
    };

    // Strength is only checked on a confirmed password.
    if !errors.has("password_1") && !errors.has("password_2") {
        let attributes = UserAttributes {
            email: req.email.as_deref().unwrap_or_default(),
            first_name: &req.first_name,
            last_name: &req.last_name,
        };
        for problem in password_problems(&req.password_2, &attributes) {
            errors.add("password_2", problem);
        }
    }

    if !req.terms_agreed {
        errors.add("terms_agreed", "You must agree to the terms to sign up.");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(CleanedSignup {
        email: req.email.unwrap_or_default(),
        first_name: req.first_name,
        last_name: req.last_name,
        date_of_birth,
        password: req.password_1,
    })
}
