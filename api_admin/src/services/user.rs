use common::error::{AppError, Res};
use db::{
    SubjectStore, UserStore,
    dtos::user::{UserFilter, VerificationUpdate},
    models::user::VerificationStatus,
};
use storage::FileStore;
use uuid::Uuid;

use crate::dtos::user::{FilePreview, FilePreviews, UserDetail, UserSummary};

pub async fn list_users(users: &dyn UserStore, filter: &UserFilter) -> Res<Vec<UserSummary>> {
    let users = users.list_users(filter).await?;
    Ok(users.into_iter().map(UserSummary::from).collect())
}

pub async fn get_user_detail(
    users: &dyn UserStore,
    subjects: &dyn SubjectStore,
    files: &dyn FileStore,
    user_id: Uuid,
) -> Res<UserDetail> {
    let user = users.get_user_by_id(user_id).await?;

    let subject_names = subjects
        .list_subjects()
        .await?
        .into_iter()
        .filter(|s| user.subject_ids.contains(&s.id))
        .map(|s| s.name)
        .collect();
    let level_names = subjects
        .list_subject_levels()
        .await?
        .into_iter()
        .filter(|l| user.subject_level_ids.contains(&l.id))
        .map(|l| l.name)
        .collect();

    Ok(UserDetail {
        previews: FilePreviews {
            profile_picture: FilePreview::of(&user.profile_picture, files),
            qts_certificate: FilePreview::of(&user.qts_certificate, files),
            dbs_certificate: FilePreview::of(&user.dbs_certificate, files),
        },
        verification: VerificationStatus::of(&user),
        subjects: subject_names,
        subject_levels: level_names,
        user,
    })
}

/// Sets or clears approval flags. Flags left out of the update keep their
/// current value.
pub async fn update_verification(
    users: &dyn UserStore,
    user_id: Uuid,
    update: &VerificationUpdate,
    reviewer: Uuid,
) -> Res<VerificationStatus> {
    if update.is_empty() {
        return Err(AppError::BadRequest(
            "No verification flags provided".to_string(),
        ));
    }

    let user = users.update_verification(user_id, update).await?;
    let status = VerificationStatus::of(&user);
    log::info!(
        "Verification for {} updated by {}: documents={} references={} id_check={} complete={}",
        user.email,
        reviewer,
        status.documents_approved,
        status.references_approved,
        status.id_check_completed,
        status.profile_complete
    );
    Ok(status)
}
