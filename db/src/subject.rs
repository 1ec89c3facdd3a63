use common::error::{AppError, Res, ValidationErrors};
use sqlx::{Executor, Postgres};

use crate::models::subject::{Subject, SubjectLevel};

pub async fn list_subjects<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<Subject>> {
    sqlx::query_as::<_, Subject>("SELECT id, name FROM subjects ORDER BY name")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_subject_levels<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
) -> Res<Vec<SubjectLevel>> {
    sqlx::query_as::<_, SubjectLevel>("SELECT id, name FROM subject_levels ORDER BY name")
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_subject<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    name: &str,
) -> Res<Subject> {
    sqlx::query_as::<_, Subject>("INSERT INTO subjects (name) VALUES ($1) RETURNING id, name")
        .bind(name)
        .fetch_one(executor)
        .await
        .map_err(|err| duplicate_name(err, "Subject"))
}

pub async fn insert_subject_level<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    name: &str,
) -> Res<SubjectLevel> {
    sqlx::query_as::<_, SubjectLevel>(
        "INSERT INTO subject_levels (name) VALUES ($1) RETURNING id, name",
    )
    .bind(name)
    .fetch_one(executor)
    .await
    .map_err(|err| duplicate_name(err, "Subject level"))
}

fn duplicate_name(err: sqlx::Error, label: &str) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Validation(
            ValidationErrors::single("name", format!("{label} with this Name already exists.")),
        ),
        err => AppError::from(err),
    }
}
