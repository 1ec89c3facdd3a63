#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{App, web};
use api_accounts::auth_middleware;
use api_admin::mount_admin;
use common::{
    env_config::JwtConfig,
    jwt::{ClaimsSpec, generate_jwt},
};
use db::{
    SubjectStore, UserStore, dtos::user::UserCreateRequest, memory::MemoryStore,
    models::user::User,
};
use storage::{FileStore, memory::MemoryFileStore};

pub const SECRET: &str = "admin-secret";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub files: Arc<MemoryFileStore>,
}

impl Harness {
    pub fn new() -> Self {
        Harness {
            store: Arc::new(MemoryStore::new()),
            files: Arc::new(MemoryFileStore::default()),
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let users: Arc<dyn UserStore> = self.store.clone();
        let subjects: Arc<dyn SubjectStore> = self.store.clone();
        let files: Arc<dyn FileStore> = self.files.clone();
        App::new()
            .app_data(web::Data::new(users))
            .app_data(web::Data::new(subjects))
            .app_data(web::Data::new(files))
            .service(web::scope("/api").service(mount_admin().wrap(auth_middleware(SECRET))))
    }

    pub async fn user(&self, email: &str, is_staff: bool) -> (User, String) {
        let user = self
            .store
            .create_user(UserCreateRequest {
                email: email.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                date_of_birth: None,
                password_hash: "unused".to_string(),
                is_staff,
                is_superuser: false,
            })
            .await
            .unwrap();
        let token = generate_jwt(
            ClaimsSpec {
                user_id: user.id,
                is_staff,
            },
            &JwtConfig {
                secret: SECRET.to_string(),
                expiration_hours: 1,
            },
        )
        .unwrap();
        (user, token)
    }
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
