use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, password_hash::PasswordHasher};
use common::env_config::SuperuserConfig;
use common::error::{AppError, Res, ValidationErrors};
use common::misc::normalize_email;
use db::UserStore;
use db::dtos::user::UserCreateRequest;
use db::models::user::User;
use db::user::DUPLICATE_EMAIL;

use crate::dtos::auth::SignupRequest;
use crate::forms::signup::{clean_signup, normalized};

pub fn hash_password(password: &str) -> Res<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Validates a signup and creates the user with hashed credentials.
///
/// A taken email is reported alongside any other field errors and nothing
/// is written.
pub async fn signup(users: &dyn UserStore, req: &SignupRequest) -> Res<User> {
    let mut errors = ValidationErrors::new();
    if let Some(email) = normalized(req).email {
        if users.exists_user_by_email(&email).await? {
            errors.add("email", DUPLICATE_EMAIL);
        }
    }

    let cleaned = match clean_signup(req) {
        Ok(cleaned) => {
            errors.into_result()?;
            cleaned
        }
        Err(mut field_errors) => {
            field_errors.merge(errors);
            return Err(field_errors.into());
        }
    };

    let user = users
        .create_user(UserCreateRequest {
            email: cleaned.email,
            first_name: cleaned.first_name,
            last_name: cleaned.last_name,
            date_of_birth: cleaned.date_of_birth,
            password_hash: hash_password(&cleaned.password)?,
            is_staff: false,
            is_superuser: false,
        })
        .await?;

    log::info!("New tutor signed up: {}", user.id);
    Ok(user)
}

/// Creates the configured staff account unless it already exists.
pub async fn ensure_superuser(users: &dyn UserStore, superuser: &SuperuserConfig) -> Res<()> {
    let email = normalize_email(&superuser.email);
    if users.exists_user_by_email(&email).await? {
        log::debug!("Superuser {} already exists", email);
        return Ok(());
    }

    let user = users
        .create_user(UserCreateRequest {
            email,
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            password_hash: hash_password(&superuser.password)?,
            is_staff: true,
            is_superuser: true,
        })
        .await?;

    log::info!("Created superuser {}", user.email);
    Ok(())
}
