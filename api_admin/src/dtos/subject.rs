use serde::Deserialize;
use validator::Validate;

/// Name of a new subject or subject level. Blank names are sent as `None`
/// by `SubjectCreateRequest::trimmed`.
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct SubjectCreateRequest {
    #[validate(
        required(message = "This field is required."),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    pub name: Option<String>,
}

impl SubjectCreateRequest {
    pub fn new(name: &str) -> Self {
        SubjectCreateRequest {
            name: Some(name.to_string()),
        }
    }

    pub fn trimmed(&self) -> Self {
        SubjectCreateRequest {
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }
}
