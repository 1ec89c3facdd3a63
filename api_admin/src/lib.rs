use actix_web::web::{self};

pub mod routes {
    pub mod subject;
    pub mod user;
}

pub mod services {
    pub mod subject;
    pub mod user;
}

pub mod dtos {
    pub mod subject;
    pub mod user;
}

/// Staff-only review routes. Wrap the scope with the accounts auth
/// middleware; handlers check `is_staff` themselves.
pub fn mount_admin() -> actix_web::Scope {
    web::scope("/admin")
        .service(routes::user::get_users)
        .service(routes::user::get_user)
        .service(routes::user::patch_verification)
        .service(routes::subject::post_subject)
        .service(routes::subject::post_subject_level)
}
