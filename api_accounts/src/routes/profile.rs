use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use db::{SubjectStore, UserStore};
use serde_json::{Map, Value};
use storage::FileStore;

use crate::services;

/// Returns the current user's profile with file URLs and verification status.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/account/profile', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// const profile = await response.json();
/// console.log(profile.verification.profile_complete);
/// ```
#[get("/profile")]
pub async fn get_profile(
    claims: web::ReqData<JwtClaims>,
    users: web::Data<Arc<dyn UserStore>>,
    subjects: web::Data<Arc<dyn SubjectStore>>,
    files: web::Data<Arc<dyn FileStore>>,
) -> Res<impl Responder> {
    let profile = services::profile::get_profile(
        users.get_ref().as_ref(),
        subjects.get_ref().as_ref(),
        files.get_ref().as_ref(),
        claims.user_id,
    )
    .await?;
    Success::ok(profile)
}

/// Returns the fields the user may edit right now, with current values and
/// the subject choices.
#[get("/profile/edit")]
pub async fn get_profile_edit(
    claims: web::ReqData<JwtClaims>,
    users: web::Data<Arc<dyn UserStore>>,
    subjects: web::Data<Arc<dyn SubjectStore>>,
    files: web::Data<Arc<dyn FileStore>>,
) -> Res<impl Responder> {
    let form = services::profile::edit_form(
        users.get_ref().as_ref(),
        subjects.get_ref().as_ref(),
        files.get_ref().as_ref(),
        claims.user_id,
    )
    .await?;
    Success::ok(form)
}

/// Applies a partial profile update.
///
/// # Input
/// A JSON object with any subset of the editable fields. Files are sent as
/// `{ "filename": "...", "content_base64": "..." }`; `null` keeps the
/// current file. Fields that are locked or unknown are ignored.
///
/// # Output
/// - Success: the updated profile
/// - Error: 400 with every field error; nothing is saved
#[post("/profile/edit")]
pub async fn post_profile_edit(
    claims: web::ReqData<JwtClaims>,
    submission: web::Json<Map<String, Value>>,
    users: web::Data<Arc<dyn UserStore>>,
    subjects: web::Data<Arc<dyn SubjectStore>>,
    files: web::Data<Arc<dyn FileStore>>,
) -> Res<impl Responder> {
    let profile = services::profile::submit_edit(
        users.get_ref().as_ref(),
        subjects.get_ref().as_ref(),
        files.get_ref().as_ref(),
        claims.user_id,
        &submission,
    )
    .await?;
    Success::ok(profile)
}
