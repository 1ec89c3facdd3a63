use common::{
    error::{AppError, Res, ValidationErrors},
    misc::normalize_email,
};
use sqlx::{Executor, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    dtos::user::{ProfileChanges, UserCreateRequest, UserFilter, VerificationUpdate},
    models::user::{AuthCredentials, User},
};

pub const DUPLICATE_EMAIL: &str = "User with this Email already exists.";

const SELECT_USER: &str = r#"
    SELECT u.*,
        ARRAY(SELECT s.subject_id FROM user_subjects s WHERE s.user_id = u.id ORDER BY s.subject_id) AS subject_ids,
        ARRAY(SELECT l.subject_level_id FROM user_subject_levels l WHERE l.user_id = u.id ORDER BY l.subject_level_id) AS subject_level_ids
    FROM users u
"#;

pub async fn exists_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: &str,
) -> Res<User> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.email = $1"))
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE u.id = $1"))
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn list_users<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    filter: &UserFilter,
) -> Res<Vec<User>> {
    let mut query = QueryBuilder::<Postgres>::new(SELECT_USER);
    query.push(" WHERE TRUE");

    let flags = [
        ("u.is_staff", filter.is_staff),
        ("u.is_superuser", filter.is_superuser),
        ("u.is_active", filter.is_active),
        ("u.documents_approved", filter.documents_approved),
        ("u.references_approved", filter.references_approved),
        ("u.id_check_completed", filter.id_check_completed),
    ];
    for (column, value) in flags {
        if let Some(value) = value {
            query.push(format!(" AND {column} = ")).push_bind(value);
        }
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        query
            .push(" AND (u.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.first_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.last_name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    query.push(" ORDER BY u.email");

    query
        .build_query_as::<User>()
        .fetch_all(executor)
        .await
        .map_err(AppError::from)
}

/// Inserts the user row and returns its id. Duplicate emails surface as a
/// field error rather than a database failure.
pub async fn insert_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: &UserCreateRequest,
) -> Res<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO users (email, first_name, last_name, date_of_birth, is_staff, is_superuser)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(normalize_email(&data.email))
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(data.date_of_birth)
    .bind(data.is_staff)
    .bind(data.is_superuser)
    .fetch_one(executor)
    .await
    .map_err(|err| match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Validation(
            ValidationErrors::single("email", DUPLICATE_EMAIL),
        ),
        err => AppError::from(err),
    })
}

pub async fn insert_user_with_credentials<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AuthCredentials,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO auth_credentials (user_id, password_hash)
        VALUES ($1, $2)
        "#,
    )
    .bind(data.user_id)
    .bind(data.password_hash)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_credentials<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<AuthCredentials> {
    sqlx::query_as::<_, AuthCredentials>(
        "SELECT user_id, password_hash FROM auth_credentials WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Writes the changed columns and replaces the subject associations that
/// were submitted. Callers run this inside one transaction.
pub async fn update_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
    changes: &ProfileChanges,
) -> Res<()> {
    if changes.touches_columns() {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE users SET ");
        let mut set = query.separated(", ");

        if let Some(value) = &changes.profile_picture {
            set.push("profile_picture = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.first_name {
            set.push("first_name = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.last_name {
            set.push("last_name = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.date_of_birth {
            set.push("date_of_birth = ").push_bind_unseparated(*value);
        }
        if let Some(value) = &changes.cost {
            set.push("cost = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.qts_certificate {
            set.push("qts_certificate = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.dbs_certificate {
            set.push("dbs_certificate = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.referee1_name {
            set.push("referee1_name = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.referee1_email {
            set.push("referee1_email = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.referee2_name {
            set.push("referee2_name = ").push_bind_unseparated(value.clone());
        }
        if let Some(value) = &changes.referee2_email {
            set.push("referee2_email = ").push_bind_unseparated(value.clone());
        }

        query.push(" WHERE id = ").push_bind(user_id);
        let result = query.build().execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
    }

    if let Some(ids) = &changes.subject_ids {
        sqlx::query("DELETE FROM user_subjects WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO user_subjects (user_id, subject_id) SELECT $1, UNNEST($2::int4[])",
        )
        .bind(user_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(ids) = &changes.subject_level_ids {
        sqlx::query("DELETE FROM user_subject_levels WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query(
            "INSERT INTO user_subject_levels (user_id, subject_level_id) SELECT $1, UNNEST($2::int4[])",
        )
        .bind(user_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn update_verification<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    update: &VerificationUpdate,
) -> Res<()> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            documents_approved = COALESCE($2, documents_approved),
            references_approved = COALESCE($3, references_approved),
            id_check_completed = COALESCE($4, id_check_completed)
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(update.documents_approved)
    .bind(update.references_approved)
    .bind(update.id_check_completed)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    Ok(())
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
