use db::models::user::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup submission. Missing keys deserialize to empty values so that
/// they surface as field errors instead of a malformed body.
///
/// The field rules assume a trimmed copy with a blank email set to `None`;
/// `forms::signup::clean_signup` prepares it before validating.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[validate(
        required(message = "This field is required."),
        length(max = 254, message = "Ensure this value has at most 254 characters."),
        email(message = "Enter a valid email address.")
    )]
    pub email: Option<String>,
    pub date_of_birth: Option<String>,
    #[validate(length(min = 1, message = "This field is required."))]
    pub password_1: String,
    #[validate(
        length(min = 1, message = "This field is required."),
        must_match(other = "password_1", message = "The two password fields didn't match.")
    )]
    pub password_2: String,
    pub terms_agreed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct SignupFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
}

/// Description of the signup form for clients that render it.
#[derive(Debug, Serialize)]
pub struct SignupFormView {
    pub fields: Vec<SignupFieldView>,
}

impl SignupFormView {
    pub fn new() -> Self {
        let field = |name, label, kind, required, help_text| SignupFieldView {
            name,
            label,
            kind,
            required,
            help_text,
        };
        SignupFormView {
            fields: vec![
                field("first_name", "First name", "text", false, None),
                field("last_name", "Last name", "text", false, None),
                field("email", "Email address", "email", true, None),
                field("date_of_birth", "Date of birth", "date", false, Some("YYYY-MM-DD")),
                field(
                    "password_1",
                    "Password",
                    "password",
                    true,
                    Some(
                        "Your password must contain at least 8 characters, can't be a commonly \
                         used password and can't be entirely numeric.",
                    ),
                ),
                field("password_2", "Confirm Password", "password", true, None),
                field("terms_agreed", "I agree to the terms", "checkbox", true, None),
            ],
        }
    }
}

impl Default for SignupFormView {
    fn default() -> Self {
        Self::new()
    }
}
