use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{error::Res, http::Success};
use db::SubjectStore;

use crate::services;

/// Lists every subject and subject level a tutor can choose from.
#[get("")]
pub async fn get_subjects(subjects: web::Data<Arc<dyn SubjectStore>>) -> Res<impl Responder> {
    Success::ok(services::subject::get_catalogue(subjects.get_ref().as_ref()).await?)
}
