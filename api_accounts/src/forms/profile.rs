use std::{collections::BTreeSet, str::FromStr};

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use common::{error::ValidationErrors, misc::is_valid_email};
use db::{dtos::user::ProfileChanges, models::user::User};
use serde_json::{Map, Value};
use storage::Upload;

use super::fields::{ApprovalState, FieldKind, ProfileField, editable_fields};

const COST_MAX_DIGITS: usize = 6;
const COST_DECIMAL_PLACES: usize = 2;
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
const IMAGE_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Valid ids for the two multi-select fields.
#[derive(Debug, Clone, Default)]
pub struct Choices {
    pub subject_ids: BTreeSet<i32>,
    pub subject_level_ids: BTreeSet<i32>,
}

/// Output of a successful clean: column changes plus files still to store.
#[derive(Debug, Default)]
pub struct CleanedProfile {
    pub changes: ProfileChanges,
    pub uploads: Vec<(ProfileField, Upload)>,
}

impl CleanedProfile {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.uploads.is_empty()
    }
}

/// Profile edit form bound to one request's editable field set.
pub struct ProfileForm {
    editable: BTreeSet<ProfileField>,
    choices: Choices,
}

impl ProfileForm {
    pub fn new(editable: BTreeSet<ProfileField>, choices: Choices) -> Self {
        ProfileForm { editable, choices }
    }

    pub fn for_user(user: &User, choices: Choices) -> Self {
        Self::new(editable_fields(ApprovalState::of(user)), choices)
    }

    pub fn editable(&self) -> &BTreeSet<ProfileField> {
        &self.editable
    }

    /// Validates a (possibly partial) submission.
    ///
    /// Keys outside the editable set are dropped without an error. Absent
    /// keys leave the stored value unchanged.
    pub fn clean(&self, submission: &Map<String, Value>) -> Result<CleanedProfile, ValidationErrors> {
        let mut cleaned = CleanedProfile::default();
        let mut errors = ValidationErrors::new();
        let mut ignored = Vec::new();

        for (name, value) in submission {
            let field = match ProfileField::from_str(name) {
                Ok(field) if self.editable.contains(&field) => field,
                _ => {
                    ignored.push(name.as_str());
                    continue;
                }
            };

            if let Err(message) = self.clean_field(field, value, &mut cleaned) {
                errors.add(field.as_str(), message);
            }
        }

        if !ignored.is_empty() {
            log::debug!("Dropped fields outside the editable set: {}", ignored.join(", "));
        }

        if errors.is_empty() {
            Ok(cleaned)
        } else {
            Err(errors)
        }
    }

    fn clean_field(
        &self,
        field: ProfileField,
        value: &Value,
        cleaned: &mut CleanedProfile,
    ) -> Result<(), String> {
        let changes = &mut cleaned.changes;
        match field {
            ProfileField::FirstName => changes.first_name = Some(clean_text(field, value)?),
            ProfileField::LastName => changes.last_name = Some(clean_text(field, value)?),
            ProfileField::Referee1Name => changes.referee1_name = Some(clean_text(field, value)?),
            ProfileField::Referee2Name => changes.referee2_name = Some(clean_text(field, value)?),
            ProfileField::Referee1Email => changes.referee1_email = Some(clean_email(field, value)?),
            ProfileField::Referee2Email => changes.referee2_email = Some(clean_email(field, value)?),
            ProfileField::DateOfBirth => changes.date_of_birth = Some(clean_date(value)?),
            ProfileField::Cost => changes.cost = Some(clean_cost(value)?),
            ProfileField::Subjects => {
                changes.subject_ids = Some(clean_choices(value, &self.choices.subject_ids)?)
            }
            ProfileField::SubjectLevels => {
                changes.subject_level_ids =
                    Some(clean_choices(value, &self.choices.subject_level_ids)?)
            }
            ProfileField::ProfilePicture
            | ProfileField::QtsCertificate
            | ProfileField::DbsCertificate => {
                if let Some(upload) = clean_file(field.kind(), value)? {
                    cleaned.uploads.push((field, upload));
                }
            }
        }
        Ok(())
    }
}

fn clean_text(field: ProfileField, value: &Value) -> Result<String, String> {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err("Enter a valid value.".to_string()),
    };
    if let Some(max) = field.max_length() {
        let len = text.chars().count();
        if len > max {
            return Err(format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ));
        }
    }
    Ok(text)
}

fn clean_email(field: ProfileField, value: &Value) -> Result<String, String> {
    let email = clean_text(field, value)?;
    if !email.is_empty() && !is_valid_email(&email) {
        return Err("Enter a valid email address.".to_string());
    }
    Ok(email)
}

fn clean_date(value: &Value) -> Result<Option<NaiveDate>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| "Enter a valid date.".to_string()),
        _ => Err("Enter a valid date.".to_string()),
    }
}

fn clean_cost(value: &Value) -> Result<Option<BigDecimal>, String> {
    let raw = match value {
        Value::Null => return Ok(None),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err("Enter a number.".to_string()),
    };
    let cost = BigDecimal::from_str(&raw).map_err(|_| "Enter a number.".to_string())?;

    if cost < BigDecimal::from(0) {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    let (digits, decimals) = digit_counts(&cost);
    if digits > COST_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {} digits in total.",
            COST_MAX_DIGITS
        ));
    }
    if decimals > COST_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} decimal places.",
            COST_DECIMAL_PLACES
        ));
    }
    if digits - decimals > COST_MAX_DIGITS - COST_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            COST_MAX_DIGITS - COST_DECIMAL_PLACES
        ));
    }
    Ok(Some(cost))
}

/// Total significant digits and digits after the point, counting the
/// value as written (`20.50` has four digits, two decimals).
fn digit_counts(value: &BigDecimal) -> (usize, usize) {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    let mantissa_digits = mantissa.to_string().trim_start_matches('-').len();
    if scale <= 0 {
        (mantissa_digits + scale.unsigned_abs() as usize, 0)
    } else {
        let decimals = scale as usize;
        (mantissa_digits.max(decimals), decimals)
    }
}

fn clean_choices(value: &Value, valid: &BTreeSet<i32>) -> Result<Vec<i32>, String> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => return Err("Enter a list of values.".to_string()),
    };

    let mut ids = BTreeSet::new();
    for item in items {
        let id = match item {
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };
        match id {
            Some(id) if valid.contains(&id) => {
                ids.insert(id);
            }
            _ => {
                return Err(format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    item
                ));
            }
        }
    }
    Ok(ids.into_iter().collect())
}

/// `None` means no new file was submitted.
fn clean_file(kind: FieldKind, value: &Value) -> Result<Option<Upload>, String> {
    let object = match value {
        Value::Null => return Ok(None),
        Value::Object(object) => object,
        _ => return Err("No file was submitted. Check the encoding type on the form.".to_string()),
    };

    let filename = object
        .get("filename")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| "No file was submitted. Check the encoding type on the form.".to_string())?;
    let content = object
        .get("content_base64")
        .and_then(Value::as_str)
        .ok_or_else(|| "No file was submitted. Check the encoding type on the form.".to_string())?;

    let upload = Upload::from_base64(filename, content).map_err(|_| {
        "The submitted data was not a file. Check the encoding type on the form.".to_string()
    })?;
    if upload.content.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }

    if kind == FieldKind::Image {
        let has_image_extension = upload
            .extension()
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
        if !has_image_extension || !looks_like_image(&upload.content) {
            return Err("Upload a valid image. The file you uploaded was either not an image or a corrupted image.".to_string());
        }
    }
    Ok(Some(upload))
}

fn looks_like_image(bytes: &[u8]) -> bool {
    infer::get(bytes).is_some_and(|kind| {
        kind.matcher_type() == infer::MatcherType::Image
            && IMAGE_MIME_TYPES.contains(&kind.mime_type())
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    const PNG_BASE64: &str = "iVBORw0KGgo=";
    const PDF_BASE64: &str = "JVBERi0xLjQ=";

    fn choices() -> Choices {
        Choices {
            subject_ids: [1, 2].into_iter().collect(),
            subject_level_ids: [10].into_iter().collect(),
        }
    }

    fn form(documents_approved: bool, references_approved: bool) -> ProfileForm {
        ProfileForm::new(
            editable_fields(ApprovalState {
                documents_approved,
                references_approved,
            }),
            choices(),
        )
    }

    fn submit(form: &ProfileForm, body: Value) -> Result<CleanedProfile, ValidationErrors> {
        match body {
            Value::Object(map) => form.clean(&map),
            _ => unreachable!("test bodies are objects"),
        }
    }

    #[test]
    fn empty_submission_is_a_no_op() {
        let cleaned = submit(&form(false, false), json!({})).unwrap();
        assert!(cleaned.is_empty());
    }

    #[test]
    fn certificates_are_dropped_once_documents_are_approved() {
        let body = json!({
            "qts_certificate": { "filename": "qts.pdf", "content_base64": PDF_BASE64 },
            "first_name": "Ada",
        });

        let cleaned = submit(&form(true, false), body.clone()).unwrap();
        assert!(cleaned.uploads.is_empty());
        assert_eq!(cleaned.changes.first_name.as_deref(), Some("Ada"));

        let cleaned = submit(&form(false, false), body).unwrap();
        assert_eq!(cleaned.uploads.len(), 1);
        assert_eq!(cleaned.uploads[0].0, ProfileField::QtsCertificate);
    }

    #[test]
    fn referees_lock_together() {
        let body = json!({
            "referee1_name": "Grace",
            "referee1_email": "grace@example.com",
            "referee2_name": "Alan",
            "referee2_email": "alan@example.com",
        });

        let locked = submit(&form(false, true), body.clone()).unwrap();
        assert!(locked.changes.is_empty());

        let open = submit(&form(false, false), body).unwrap();
        assert_eq!(open.changes.referee1_name.as_deref(), Some("Grace"));
        assert_eq!(open.changes.referee1_email.as_deref(), Some("grace@example.com"));
        assert_eq!(open.changes.referee2_name.as_deref(), Some("Alan"));
        assert_eq!(open.changes.referee2_email.as_deref(), Some("alan@example.com"));
    }

    #[test]
    fn approval_flags_are_never_accepted() {
        let cleaned = submit(
            &form(false, false),
            json!({ "documents_approved": true, "id_check_completed": true }),
        )
        .unwrap();
        assert!(cleaned.is_empty());
    }

    #[test]
    fn all_field_errors_are_reported_together() {
        let errors = submit(
            &form(false, false),
            json!({
                "cost": "abc",
                "date_of_birth": "31/12/1990",
                "referee1_email": "nope",
                "subjects": [1, 99],
                "first_name": "Ada",
            }),
        )
        .unwrap_err();

        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(
            fields,
            vec!["cost", "date_of_birth", "referee1_email", "subjects"]
        );
    }

    #[rstest]
    #[case(json!("20.00"), Some("20.00"))]
    #[case(json!(35), Some("35"))]
    #[case(json!(null), None)]
    #[case(json!(""), None)]
    fn cost_accepts_numbers_and_clears(#[case] raw: Value, #[case] expected: Option<&str>) {
        let cleaned = submit(&form(false, false), json!({ "cost": raw })).unwrap();
        let expected = expected.map(|s| BigDecimal::from_str(s).unwrap());
        assert_eq!(cleaned.changes.cost, Some(expected));
    }

    #[rstest]
    #[case("-1", "greater than or equal to 0")]
    #[case("12.345", "2 decimal places")]
    #[case("12345.6", "4 digits before the decimal point")]
    #[case("1234567", "6 digits in total")]
    fn cost_limits(#[case] raw: &str, #[case] message: &str) {
        let errors = submit(&form(false, false), json!({ "cost": raw })).unwrap_err();
        let cost_errors = errors.get("cost").unwrap();
        assert!(cost_errors[0].contains(message), "{:?}", cost_errors);
    }

    #[test]
    fn subjects_are_deduplicated_and_can_be_cleared() {
        let cleaned = submit(
            &form(false, false),
            json!({ "subjects": [2, "1", 2], "subject_levels": null }),
        )
        .unwrap();
        assert_eq!(cleaned.changes.subject_ids, Some(vec![1, 2]));
        assert_eq!(cleaned.changes.subject_level_ids, Some(vec![]));
    }

    #[test]
    fn profile_picture_must_be_an_image() {
        let errors = submit(
            &form(false, false),
            json!({ "profile_picture": { "filename": "me.pdf", "content_base64": PDF_BASE64 } }),
        )
        .unwrap_err();
        assert!(errors.has("profile_picture"));

        let cleaned = submit(
            &form(false, false),
            json!({ "profile_picture": { "filename": "me.png", "content_base64": PNG_BASE64 } }),
        )
        .unwrap();
        assert_eq!(cleaned.uploads[0].0, ProfileField::ProfilePicture);
    }

    #[test]
    fn broken_uploads_are_field_errors() {
        let errors = submit(
            &form(false, false),
            json!({
                "qts_certificate": { "filename": "qts.pdf", "content_base64": "%%%" },
                "dbs_certificate": { "filename": "dbs.pdf", "content_base64": "" },
            }),
        )
        .unwrap_err();
        assert!(errors.has("qts_certificate"));
        assert_eq!(
            errors.get("dbs_certificate").unwrap()[0],
            "The submitted file is empty."
        );
    }

    #[test]
    fn null_file_keeps_the_current_one() {
        let cleaned = submit(&form(false, false), json!({ "qts_certificate": null })).unwrap();
        assert!(cleaned.is_empty());
    }

    #[test]
    fn long_names_are_rejected() {
        let errors = submit(
            &form(false, false),
            json!({ "first_name": "x".repeat(151) }),
        )
        .unwrap_err();
        assert_eq!(
            errors.get("first_name").unwrap()[0],
            "Ensure this value has at most 150 characters (it has 151)."
        );
    }

    #[rstest]
    #[case(b"\x89PNG\r\n\x1a\n".as_slice(), true)]
    #[case(b"\xFF\xD8\xFF\xE0\x00\x10JFIF".as_slice(), true)]
    #[case(b"GIF89a\x01\x00".as_slice(), true)]
    #[case(b"RIFF\x00\x00\x00\x00WEBPVP8 ".as_slice(), true)]
    #[case(b"%PDF-1.4".as_slice(), false)]
    #[case(b"BM\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00".as_slice(), false)]
    fn only_web_image_formats_are_accepted(#[case] bytes: &[u8], #[case] accepted: bool) {
        assert_eq!(looks_like_image(bytes), accepted);
    }
}
