use db::models::user::{User, VerificationStatus};
use serde::Serialize;
use storage::{FileRef, FileStore, key::extension_of};
use uuid::Uuid;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// One row of the admin user list.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub documents_approved: bool,
    pub references_approved: bool,
    pub id_check_completed: bool,
    pub profile_complete: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            profile_complete: user.is_profile_complete(),
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            is_active: user.is_active,
            documents_approved: user.documents_approved,
            references_approved: user.references_approved,
            id_check_completed: user.id_check_completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Document,
}

/// How a stored file is shown to reviewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePreview {
    pub url: String,
    pub kind: PreviewKind,
}

impl FilePreview {
    pub fn of(file: &Option<String>, files: &dyn FileStore) -> Option<Self> {
        let path = file.as_deref().filter(|path| !path.is_empty())?;
        let is_image = extension_of(path)
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        Some(FilePreview {
            url: files.url(&FileRef(path.to_string())),
            kind: if is_image {
                PreviewKind::Image
            } else {
                PreviewKind::Document
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct FilePreviews {
    pub profile_picture: Option<FilePreview>,
    pub qts_certificate: Option<FilePreview>,
    pub dbs_certificate: Option<FilePreview>,
}

/// Everything a reviewer needs on one screen.
#[derive(Debug, Serialize)]
pub struct UserDetail {
    pub user: User,
    pub subjects: Vec<String>,
    pub subject_levels: Vec<String>,
    pub previews: FilePreviews,
    pub verification: VerificationStatus,
}
