use actix_web::web::{self};
use middleware::auth::AuthMiddleware;

pub mod routes {
    pub mod auth;
    pub mod profile;
    pub mod subject;
}

pub mod services {
    pub mod auth;
    pub mod profile;
    pub mod subject;
    pub mod user;
}

pub mod dtos {
    pub mod auth;
    pub mod profile;
}

pub mod forms {
    pub mod fields;
    pub mod password;
    pub mod profile;
    pub mod signup;
}

pub mod middleware {
    pub mod auth;
}

pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::get_signup)
        .service(routes::auth::post_signup)
        .service(routes::auth::post_login)
}

pub fn mount_subjects() -> actix_web::Scope {
    web::scope("/subjects").service(routes::subject::get_subjects)
}

/// Profile routes. Wrap the scope with `auth_middleware`.
pub fn mount_account() -> actix_web::Scope {
    web::scope("/account")
        .service(routes::profile::get_profile)
        .service(routes::profile::get_profile_edit)
        .service(routes::profile::post_profile_edit)
}

// Auth middleware
pub fn auth_middleware(secret: &str) -> AuthMiddleware {
    AuthMiddleware::new(secret.to_string())
}
