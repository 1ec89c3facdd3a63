use common::error::Res;
use db::SubjectStore;

use crate::dtos::profile::CatalogueResponse;

pub async fn get_catalogue(subjects: &dyn SubjectStore) -> Res<CatalogueResponse> {
    Ok(CatalogueResponse {
        subjects: subjects.list_subjects().await?,
        subject_levels: subjects.list_subject_levels().await?,
    })
}
