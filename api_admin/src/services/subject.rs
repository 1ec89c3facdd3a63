use common::error::Res;
use db::{
    SubjectStore,
    models::subject::{Subject, SubjectLevel},
};
use validator::Validate;

use crate::dtos::subject::SubjectCreateRequest;

fn clean_name(req: &SubjectCreateRequest) -> Res<String> {
    let req = req.trimmed();
    req.validate()?;
    Ok(req.name.unwrap_or_default())
}

pub async fn create_subject(
    subjects: &dyn SubjectStore,
    req: &SubjectCreateRequest,
) -> Res<Subject> {
    let subject = subjects.create_subject(&clean_name(req)?).await?;
    log::info!("Subject added: {}", subject.name);
    Ok(subject)
}

pub async fn create_subject_level(
    subjects: &dyn SubjectStore,
    req: &SubjectCreateRequest,
) -> Res<SubjectLevel> {
    let level = subjects.create_subject_level(&clean_name(req)?).await?;
    log::info!("Subject level added: {}", level.name);
    Ok(level)
}
