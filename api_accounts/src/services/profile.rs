use common::error::Res;
use db::{SubjectStore, UserStore};
use serde_json::{Map, Value};
use storage::{FileStore, StorageCategory};
use uuid::Uuid;

use crate::{
    dtos::profile::{EditFormView, ProfileResponse},
    forms::{
        fields::ProfileField,
        profile::{CleanedProfile, ProfileForm},
    },
    services::subject::get_catalogue,
};

pub async fn get_profile(
    users: &dyn UserStore,
    subjects: &dyn SubjectStore,
    files: &dyn FileStore,
    user_id: Uuid,
) -> Res<ProfileResponse> {
    let user = users.get_user_by_id(user_id).await?;
    let catalogue = get_catalogue(subjects).await?;
    Ok(ProfileResponse::build(user, &catalogue, files))
}

pub async fn edit_form(
    users: &dyn UserStore,
    subjects: &dyn SubjectStore,
    files: &dyn FileStore,
    user_id: Uuid,
) -> Res<EditFormView> {
    let user = users.get_user_by_id(user_id).await?;
    let catalogue = get_catalogue(subjects).await?;
    let form = ProfileForm::for_user(&user, catalogue.choices());
    let editable = form.editable().clone();
    Ok(EditFormView::build(&user, editable, catalogue, files))
}

/// Validates and applies a profile edit.
///
/// Nothing is stored unless the whole submission is valid. Files are
/// written before the single profile update that references them.
pub async fn submit_edit(
    users: &dyn UserStore,
    subjects: &dyn SubjectStore,
    files: &dyn FileStore,
    user_id: Uuid,
    submission: &Map<String, Value>,
) -> Res<ProfileResponse> {
    let user = users.get_user_by_id(user_id).await?;
    let catalogue = get_catalogue(subjects).await?;
    let form = ProfileForm::for_user(&user, catalogue.choices());

    let CleanedProfile {
        mut changes,
        uploads,
    } = form.clean(submission)?;

    if changes.is_empty() && uploads.is_empty() {
        log::debug!("Empty profile submission from user {}", user_id);
        return Ok(ProfileResponse::build(user, &catalogue, files));
    }

    for (field, upload) in uploads {
        let category = match field {
            ProfileField::ProfilePicture => StorageCategory::ProfilePictures,
            _ => StorageCategory::Documents,
        };
        let stored = files.store(category, &upload).await?.0;
        match field {
            ProfileField::ProfilePicture => changes.profile_picture = Some(stored),
            ProfileField::QtsCertificate => changes.qts_certificate = Some(stored),
            ProfileField::DbsCertificate => changes.dbs_certificate = Some(stored),
            _ => {}
        }
    }

    let updated = users.apply_profile_changes(user_id, &changes).await?;
    log::info!("Profile updated for user {}", user_id);
    Ok(ProfileResponse::build(updated, &catalogue, files))
}
