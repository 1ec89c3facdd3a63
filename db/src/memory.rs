//! In-memory stores used by handler and service tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use common::{
    error::{AppError, Res, ValidationErrors},
    misc::normalize_email,
};
use uuid::Uuid;

use crate::{
    dtos::user::{ProfileChanges, UserCreateRequest, UserFilter, VerificationUpdate},
    models::{
        subject::{Subject, SubjectLevel},
        user::{AuthCredentials, User},
    },
    store::{SubjectStore, UserStore},
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    credentials: HashMap<Uuid, AuthCredentials>,
    subjects: Vec<Subject>,
    subject_levels: Vec<SubjectLevel>,
    profile_writes: usize,
}

/// Mirrors `PgStore` semantics closely enough for request-level tests.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Res<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("memory store poisoned".to_string()))
    }

    /// Replaces a stored user wholesale, bypassing every rule. Tests use it
    /// to stage approval states.
    pub fn put_user(&self, user: User) -> Res<()> {
        self.lock()?.users.insert(user.id, user);
        Ok(())
    }

    pub fn user_count(&self) -> Res<usize> {
        Ok(self.lock()?.users.len())
    }

    /// Number of profile updates that reached storage.
    pub fn profile_writes(&self) -> Res<usize> {
        Ok(self.lock()?.profile_writes)
    }
}

fn not_found() -> AppError {
    AppError::Database(sqlx::Error::RowNotFound)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn exists_user_by_email(&self, email: &str) -> Res<bool> {
        Ok(self.lock()?.users.values().any(|u| u.email == email))
    }

    async fn get_user_by_email(&self, email: &str) -> Res<User> {
        self.lock()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> Res<User> {
        self.lock()?.users.get(&user_id).cloned().ok_or_else(not_found)
    }

    async fn get_user_with_credentials(&self, email: &str) -> Res<(User, AuthCredentials)> {
        let state = self.lock()?;
        let user = state
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(not_found)?;
        let credentials = state.credentials.get(&user.id).cloned().ok_or_else(not_found)?;
        Ok((user, credentials))
    }

    async fn create_user(&self, data: UserCreateRequest) -> Res<User> {
        let mut state = self.lock()?;
        let email = normalize_email(&data.email);
        if state.users.values().any(|u| u.email == email) {
            return Err(AppError::Validation(ValidationErrors::single(
                "email",
                crate::user::DUPLICATE_EMAIL,
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            first_name: data.first_name,
            last_name: data.last_name,
            date_of_birth: data.date_of_birth,
            profile_picture: None,
            cost: None,
            subject_ids: Vec::new(),
            subject_level_ids: Vec::new(),
            qts_certificate: None,
            dbs_certificate: None,
            documents_approved: false,
            referee1_name: String::new(),
            referee1_email: String::new(),
            referee2_name: String::new(),
            referee2_email: String::new(),
            references_approved: false,
            id_check_completed: false,
            is_staff: data.is_staff,
            is_active: true,
            is_superuser: data.is_superuser,
            date_joined: Utc::now().naive_utc(),
        };
        state.credentials.insert(
            user.id,
            AuthCredentials {
                user_id: user.id,
                password_hash: data.password_hash,
            },
        );
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn apply_profile_changes(&self, user_id: Uuid, changes: &ProfileChanges) -> Res<User> {
        let mut state = self.lock()?;
        let user = state.users.get_mut(&user_id).ok_or_else(not_found)?;

        if let Some(value) = &changes.profile_picture {
            user.profile_picture = Some(value.clone());
        }
        if let Some(value) = &changes.first_name {
            user.first_name = value.clone();
        }
        if let Some(value) = &changes.last_name {
            user.last_name = value.clone();
        }
        if let Some(value) = changes.date_of_birth {
            user.date_of_birth = value;
        }
        if let Some(value) = &changes.cost {
            user.cost = value.clone();
        }
        if let Some(value) = &changes.subject_ids {
            user.subject_ids = sorted(value);
        }
        if let Some(value) = &changes.subject_level_ids {
            user.subject_level_ids = sorted(value);
        }
        if let Some(value) = &changes.qts_certificate {
            user.qts_certificate = Some(value.clone());
        }
        if let Some(value) = &changes.dbs_certificate {
            user.dbs_certificate = Some(value.clone());
        }
        if let Some(value) = &changes.referee1_name {
            user.referee1_name = value.clone();
        }
        if let Some(value) = &changes.referee1_email {
            user.referee1_email = value.clone();
        }
        if let Some(value) = &changes.referee2_name {
            user.referee2_name = value.clone();
        }
        if let Some(value) = &changes.referee2_email {
            user.referee2_email = value.clone();
        }

        let user = user.clone();
        state.profile_writes += 1;
        Ok(user)
    }

    async fn update_verification(&self, user_id: Uuid, update: &VerificationUpdate) -> Res<User> {
        let mut state = self.lock()?;
        let user = state.users.get_mut(&user_id).ok_or_else(not_found)?;
        if let Some(value) = update.documents_approved {
            user.documents_approved = value;
        }
        if let Some(value) = update.references_approved {
            user.references_approved = value;
        }
        if let Some(value) = update.id_check_completed {
            user.id_check_completed = value;
        }
        Ok(user.clone())
    }

    async fn list_users(&self, filter: &UserFilter) -> Res<Vec<User>> {
        let state = self.lock()?;
        let search = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let flag_matches = |flag: Option<bool>, value: bool| flag.is_none_or(|f| f == value);

        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| flag_matches(filter.is_staff, u.is_staff))
            .filter(|u| flag_matches(filter.is_superuser, u.is_superuser))
            .filter(|u| flag_matches(filter.is_active, u.is_active))
            .filter(|u| flag_matches(filter.documents_approved, u.documents_approved))
            .filter(|u| flag_matches(filter.references_approved, u.references_approved))
            .filter(|u| flag_matches(filter.id_check_completed, u.id_check_completed))
            .filter(|u| match &search {
                Some(term) => [&u.email, &u.first_name, &u.last_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(term.as_str())),
                None => true,
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }
}

#[async_trait]
impl SubjectStore for MemoryStore {
    async fn list_subjects(&self) -> Res<Vec<Subject>> {
        let mut subjects = self.lock()?.subjects.clone();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn list_subject_levels(&self) -> Res<Vec<SubjectLevel>> {
        let mut levels = self.lock()?.subject_levels.clone();
        levels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(levels)
    }

    async fn create_subject(&self, name: &str) -> Res<Subject> {
        let mut state = self.lock()?;
        if state.subjects.iter().any(|s| s.name == name) {
            return Err(AppError::Validation(ValidationErrors::single(
                "name",
                "Subject with this Name already exists.",
            )));
        }
        let subject = Subject {
            id: state.subjects.len() as i32 + 1,
            name: name.to_string(),
        };
        state.subjects.push(subject.clone());
        Ok(subject)
    }

    async fn create_subject_level(&self, name: &str) -> Res<SubjectLevel> {
        let mut state = self.lock()?;
        if state.subject_levels.iter().any(|l| l.name == name) {
            return Err(AppError::Validation(ValidationErrors::single(
                "name",
                "Subject level with this Name already exists.",
            )));
        }
        let level = SubjectLevel {
            id: state.subject_levels.len() as i32 + 1,
            name: name.to_string(),
        };
        state.subject_levels.push(level.clone());
        Ok(level)
    }
}

fn sorted(ids: &[i32]) -> Vec<i32> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(email: &str) -> UserCreateRequest {
        UserCreateRequest {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            date_of_birth: None,
            password_hash: "hash".to_string(),
            is_staff: false,
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let store = MemoryStore::new();
        store.create_user(signup("ada@example.com")).await.unwrap();

        let err = store
            .create_user(signup("ada@EXAMPLE.com"))
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => assert!(errors.has("email")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn search_and_flags_filter_the_list() {
        let store = MemoryStore::new();
        let ada = store.create_user(signup("ada@example.com")).await.unwrap();
        store.create_user(signup("grace@example.com")).await.unwrap();
        store
            .update_verification(
                ada.id,
                &VerificationUpdate {
                    documents_approved: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let approved = store
            .list_users(&UserFilter {
                documents_approved: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].email, "ada@example.com");

        let searched = store
            .list_users(&UserFilter {
                search: Some("GRACE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].email, "grace@example.com");
    }
}
