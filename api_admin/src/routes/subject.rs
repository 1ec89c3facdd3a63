use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use db::SubjectStore;

use crate::{dtos::subject::SubjectCreateRequest, services};

#[post("/subjects")]
pub async fn post_subject(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<SubjectCreateRequest>,
    subjects: web::Data<Arc<dyn SubjectStore>>,
) -> Res<impl Responder> {
    claims.require_staff()?;
    let subject = services::subject::create_subject(subjects.get_ref().as_ref(), &req).await?;
    Success::created(subject)
}

#[post("/subject-levels")]
pub async fn post_subject_level(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<SubjectCreateRequest>,
    subjects: web::Data<Arc<dyn SubjectStore>>,
) -> Res<impl Responder> {
    claims.require_staff()?;
    let level =
        services::subject::create_subject_level(subjects.get_ref().as_ref(), &req).await?;
    Success::created(level)
}
