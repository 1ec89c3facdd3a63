use std::sync::Arc;

use async_trait::async_trait;
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::user::{ProfileChanges, UserCreateRequest, UserFilter, VerificationUpdate},
    models::{
        subject::{Subject, SubjectLevel},
        user::{AuthCredentials, User},
    },
};

/// Account persistence as seen by the services.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_user_by_email(&self, email: &str) -> Res<bool>;
    async fn get_user_by_email(&self, email: &str) -> Res<User>;
    async fn get_user_by_id(&self, user_id: Uuid) -> Res<User>;
    async fn get_user_with_credentials(&self, email: &str) -> Res<(User, AuthCredentials)>;

    /// Creates the user and its credentials atomically.
    async fn create_user(&self, data: UserCreateRequest) -> Res<User>;

    /// Applies a partial profile update as a single write and returns the
    /// stored result.
    async fn apply_profile_changes(&self, user_id: Uuid, changes: &ProfileChanges) -> Res<User>;

    async fn update_verification(&self, user_id: Uuid, update: &VerificationUpdate) -> Res<User>;

    async fn list_users(&self, filter: &UserFilter) -> Res<Vec<User>>;
}

#[async_trait]
pub trait SubjectStore: Send + Sync {
    async fn list_subjects(&self) -> Res<Vec<Subject>>;
    async fn list_subject_levels(&self) -> Res<Vec<SubjectLevel>>;
    async fn create_subject(&self, name: &str) -> Res<Subject>;
    async fn create_subject_level(&self, name: &str) -> Res<SubjectLevel>;
}

/// Postgres-backed implementation of both stores.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        PgStore { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn exists_user_by_email(&self, email: &str) -> Res<bool> {
        crate::user::exists_user_by_email(&*self.pool, email).await
    }

    async fn get_user_by_email(&self, email: &str) -> Res<User> {
        crate::user::get_user_by_email(&*self.pool, email).await
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Res<User> {
        crate::user::get_user_by_id(&*self.pool, user_id).await
    }

    async fn get_user_with_credentials(&self, email: &str) -> Res<(User, AuthCredentials)> {
        let user = crate::user::get_user_by_email(&*self.pool, email).await?;
        let credentials = crate::user::get_credentials(&*self.pool, user.id).await?;
        Ok((user, credentials))
    }

    async fn create_user(&self, data: UserCreateRequest) -> Res<User> {
        let mut tx = self.pool.begin().await?;

        let user_id = crate::user::insert_user(&mut *tx, &data).await?;
        crate::user::insert_user_with_credentials(
            &mut *tx,
            AuthCredentials {
                user_id,
                password_hash: data.password_hash,
            },
        )
        .await?;
        let user = crate::user::get_user_by_id(&mut *tx, user_id).await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn apply_profile_changes(&self, user_id: Uuid, changes: &ProfileChanges) -> Res<User> {
        let mut tx = self.pool.begin().await?;

        crate::user::update_profile(&mut *tx, user_id, changes).await?;
        let user = crate::user::get_user_by_id(&mut *tx, user_id).await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn update_verification(&self, user_id: Uuid, update: &VerificationUpdate) -> Res<User> {
        let mut tx = self.pool.begin().await?;

        crate::user::update_verification(&mut *tx, user_id, update).await?;
        let user = crate::user::get_user_by_id(&mut *tx, user_id).await?;

        tx.commit().await?;
        Ok(user)
    }

    async fn list_users(&self, filter: &UserFilter) -> Res<Vec<User>> {
        crate::user::list_users(&*self.pool, filter).await
    }
}

#[async_trait]
impl SubjectStore for PgStore {
    async fn list_subjects(&self) -> Res<Vec<Subject>> {
        crate::subject::list_subjects(&*self.pool).await
    }

    async fn list_subject_levels(&self) -> Res<Vec<SubjectLevel>> {
        crate::subject::list_subject_levels(&*self.pool).await
    }

    async fn create_subject(&self, name: &str) -> Res<Subject> {
        crate::subject::insert_subject(&*self.pool, name).await
    }

    async fn create_subject_level(&self, name: &str) -> Res<SubjectLevel> {
        crate::subject::insert_subject_level(&*self.pool, name).await
    }
}
