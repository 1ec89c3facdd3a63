use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use db::models::{
    subject::{Subject, SubjectLevel},
    user::{User, VerificationStatus},
};
use serde::Serialize;
use serde_json::{Value, json};
use storage::{FileRef, FileStore};
use uuid::Uuid;

use crate::forms::{
    fields::{FieldKind, ProfileField},
    profile::Choices,
};

#[derive(Debug, Clone, Serialize)]
pub struct CatalogueResponse {
    pub subjects: Vec<Subject>,
    pub subject_levels: Vec<SubjectLevel>,
}

impl CatalogueResponse {
    pub fn choices(&self) -> Choices {
        Choices {
            subject_ids: self.subjects.iter().map(|s| s.id).collect(),
            subject_level_ids: self.subject_levels.iter().map(|l| l.id).collect(),
        }
    }
}

/// A user's own view of their profile.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_picture_url: Option<String>,
    pub cost: Option<BigDecimal>,
    pub subjects: Vec<Subject>,
    pub subject_levels: Vec<SubjectLevel>,
    pub qts_certificate_url: Option<String>,
    pub dbs_certificate_url: Option<String>,
    pub referee1_name: String,
    pub referee1_email: String,
    pub referee2_name: String,
    pub referee2_email: String,
    pub date_joined: NaiveDateTime,
    pub verification: VerificationStatus,
}

impl ProfileResponse {
    pub fn build(user: User, catalogue: &CatalogueResponse, files: &dyn FileStore) -> Self {
        let url = |file: &Option<String>| file_url(file, files);
        ProfileResponse {
            verification: VerificationStatus::of(&user),
            profile_picture_url: url(&user.profile_picture),
            qts_certificate_url: url(&user.qts_certificate),
            dbs_certificate_url: url(&user.dbs_certificate),
            subjects: catalogue
                .subjects
                .iter()
                .filter(|s| user.subject_ids.contains(&s.id))
                .cloned()
                .collect(),
            subject_levels: catalogue
                .subject_levels
                .iter()
                .filter(|l| user.subject_level_ids.contains(&l.id))
                .cloned()
                .collect(),
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_of_birth: user.date_of_birth,
            cost: user.cost,
            referee1_name: user.referee1_name,
            referee1_email: user.referee1_email,
            referee2_name: user.referee2_name,
            referee2_email: user.referee2_email,
            date_joined: user.date_joined,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub name: ProfileField,
    pub label: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    pub value: Value,
}

/// The edit form as the user may currently fill it in. Locked fields are
/// absent rather than disabled.
#[derive(Debug, Serialize)]
pub struct EditFormView {
    pub fields: Vec<FieldView>,
    pub choices: CatalogueResponse,
    pub verification: VerificationStatus,
}

impl EditFormView {
    pub fn build(
        user: &User,
        editable: impl IntoIterator<Item = ProfileField>,
        catalogue: CatalogueResponse,
        files: &dyn FileStore,
    ) -> Self {
        let fields = editable
            .into_iter()
            .map(|field| FieldView {
                name: field,
                label: field.label(),
                kind: field.kind(),
                max_length: field.max_length(),
                value: current_value(field, user, files),
            })
            .collect();
        EditFormView {
            fields,
            choices: catalogue,
            verification: VerificationStatus::of(user),
        }
    }
}

fn current_value(field: ProfileField, user: &User, files: &dyn FileStore) -> Value {
    match field {
        ProfileField::ProfilePicture => json!(file_url(&user.profile_picture, files)),
        ProfileField::QtsCertificate => json!(file_url(&user.qts_certificate, files)),
        ProfileField::DbsCertificate => json!(file_url(&user.dbs_certificate, files)),
        ProfileField::FirstName => json!(user.first_name),
        ProfileField::LastName => json!(user.last_name),
        ProfileField::DateOfBirth => json!(user.date_of_birth),
        ProfileField::Cost => json!(user.cost.as_ref().map(|c| c.to_string())),
        ProfileField::Subjects => json!(user.subject_ids),
        ProfileField::SubjectLevels => json!(user.subject_level_ids),
        ProfileField::Referee1Name => json!(user.referee1_name),
        ProfileField::Referee1Email => json!(user.referee1_email),
        ProfileField::Referee2Name => json!(user.referee2_name),
        ProfileField::Referee2Email => json!(user.referee2_email),
    }
}

pub fn file_url(file: &Option<String>, files: &dyn FileStore) -> Option<String> {
    file.as_ref()
        .filter(|path| !path.is_empty())
        .map(|path| files.url(&FileRef(path.clone())))
}
