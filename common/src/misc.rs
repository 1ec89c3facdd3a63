use validator::ValidateEmail;

/// Lower-cases the domain part of an email address, leaving the local part
/// untouched since mailboxes may be case sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}
