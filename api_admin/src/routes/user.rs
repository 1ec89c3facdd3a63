use std::sync::Arc;

use actix_web::{Responder, get, patch, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use db::{
    SubjectStore, UserStore,
    dtos::user::{UserFilter, VerificationUpdate},
};
use storage::FileStore;
use uuid::Uuid;

use crate::services;

/// Lists users ordered by email.
///
/// # Input
/// Optional query parameters: `search` (email, first or last name,
/// case-insensitive) and the boolean filters `is_staff`, `is_superuser`,
/// `is_active`, `documents_approved`, `references_approved`,
/// `id_check_completed`.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/admin/users?documents_approved=false&search=smith', {
///   headers: { 'Authorization': `Bearer ${localStorage.getItem('authToken')}` }
/// });
/// const users = await response.json();
/// ```
#[get("/users")]
pub async fn get_users(
    claims: web::ReqData<JwtClaims>,
    filter: web::Query<UserFilter>,
    users: web::Data<Arc<dyn UserStore>>,
) -> Res<impl Responder> {
    claims.require_staff()?;
    Success::ok(services::user::list_users(users.get_ref().as_ref(), &filter).await?)
}

/// Full profile of one user with previews of the uploaded files.
#[get("/users/{id}")]
pub async fn get_user(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    users: web::Data<Arc<dyn UserStore>>,
    subjects: web::Data<Arc<dyn SubjectStore>>,
    files: web::Data<Arc<dyn FileStore>>,
) -> Res<impl Responder> {
    claims.require_staff()?;
    let detail = services::user::get_user_detail(
        users.get_ref().as_ref(),
        subjects.get_ref().as_ref(),
        files.get_ref().as_ref(),
        path.into_inner(),
    )
    .await?;
    Success::ok(detail)
}

/// Sets approval flags. Any subset of `documents_approved`,
/// `references_approved` and `id_check_completed` may be sent, as `true` or
/// `false`.
#[patch("/users/{id}/verification")]
pub async fn patch_verification(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    update: web::Json<VerificationUpdate>,
    users: web::Data<Arc<dyn UserStore>>,
) -> Res<impl Responder> {
    claims.require_staff()?;
    let status = services::user::update_verification(
        users.get_ref().as_ref(),
        path.into_inner(),
        &update,
        claims.user_id,
    )
    .await?;
    Success::ok(status)
}
