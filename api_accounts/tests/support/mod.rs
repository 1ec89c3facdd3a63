#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use actix_web::{App, web};
use api_accounts::{auth_middleware, mount_account, mount_auth, mount_subjects};
use common::{
    env_config::{Config, JwtConfig},
    jwt::{ClaimsSpec, generate_jwt},
};
use db::{
    SubjectStore, UserStore, dtos::user::UserCreateRequest, memory::MemoryStore,
    models::user::User,
};
use storage::{FileStore, memory::MemoryFileStore};

pub const SECRET: &str = "integration-secret";
pub const PNG_BASE64: &str = "iVBORw0KGgo=";
pub const PDF_BASE64: &str = "JVBERi0xLjQ=";

pub fn config() -> Arc<Config> {
    Arc::new(Config {
        environment: "development".to_string(),
        database_url: "postgres://unused".to_string(),
        jwt_config: JwtConfig {
            secret: SECRET.to_string(),
            expiration_hours: 1,
        },
        server_host: "127.0.0.1".to_string(),
        server_port: 8080,
        num_workers: 1,
        cors_allowed_origin: "http://localhost:3000".to_string(),
        console_logging_enabled: false,
        log_file: "test.log".to_string(),
        media_root: PathBuf::from("media"),
        media_url: "/media".to_string(),
        superuser: None,
    })
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub files: Arc<MemoryFileStore>,
    pub config: Arc<Config>,
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        store.create_subject("Maths").await.unwrap();
        store.create_subject("English").await.unwrap();
        store.create_subject_level("GCSE").await.unwrap();
        store.create_subject_level("A-Level").await.unwrap();
        Harness {
            store,
            files: Arc::new(MemoryFileStore::default()),
            config: config(),
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
            .app_data(web::Data::new(self.config.clone()))
            .service(
                web::scope("/api")
                    .service(mount_auth())
                    .service(mount_subjects())
                    .service(mount_account().wrap(auth_middleware(SECRET))),
            )
    }

    /// Creates a tutor, lets `stage` adjust the stored record, and returns
    /// it with a bearer token.
    pub async fn tutor(&self, stage: impl FnOnce(&mut User)) -> (User, String) {
        let mut user = self
            .store
            .create_user(UserCreateRequest {
                email: "tutor@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                date_of_birth: None,
                password_hash: "unused".to_string(),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        stage(&mut user);
        self.store.put_user(user.clone()).unwrap();
        let token = token_for(&user);
        (user, token)
    }

    pub async fn stored(&self, user: &User) -> User {
        self.store.get_user_by_id(user.id).await.unwrap()
    }
}

pub fn token_for(user: &User) -> String {
    generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            is_staff: user.is_staff,
        },
        &config().jwt_config,
    )
    .unwrap()
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", token),
    )
}
