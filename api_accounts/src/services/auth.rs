use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use common::{
    env_config::JwtConfig,
    error::{AppError, Res},
    jwt::{self, ClaimsSpec},
    misc::normalize_email,
};
use db::{UserStore, models::user::User};

use crate::{
    dtos::auth::{AuthResponse, LoginRequest},
    forms::password::MAX_LENGTH,
};

/// Authenticates an existing user.
/// Unknown emails and wrong passwords both yield 401, as do inactive accounts.
pub async fn authenticate_user(users: &dyn UserStore, login_data: &LoginRequest) -> Res<User> {
    let invalid = || AppError::Unauthorized("Invalid credentials".to_string());
    if login_data.password.chars().count() > MAX_LENGTH {
        return Err(invalid());
    }

    let (user, credentials) = match users
        .get_user_with_credentials(&normalize_email(&login_data.email))
        .await
    {
        Ok(found) => found,
        Err(AppError::Database(sqlx::Error::RowNotFound)) => return Err(invalid()),
        Err(err) => return Err(err),
    };

    let parsed_hash = PasswordHash::new(&credentials.password_hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is malformed: {}", e)))?;
    let is_valid = Argon2::default()
        .verify_password(login_data.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !is_valid {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(AppError::Unauthorized("This account is inactive".to_string()));
    }
    Ok(user)
}

/// Signs a token for the user and pairs it with the user record.
pub fn issue_token(user: User, config: &JwtConfig) -> Res<AuthResponse> {
    let token = jwt::generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            is_staff: user.is_staff,
        },
        config,
    )?;
    Ok(AuthResponse { token, user })
}

#[cfg(test)]
mod tests {
    use db::{dtos::user::UserCreateRequest, memory::MemoryStore};

    use super::*;
    use crate::services::user::hash_password;

    async fn store_with_user(is_active: bool) -> MemoryStore {
        let store = MemoryStore::new();
        let mut user = store
            .create_user(UserCreateRequest {
                email: "ada@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                date_of_birth: None,
                password_hash: hash_password("violet-harbour-42").unwrap(),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        user.is_active = is_active;
        store.put_user(user).unwrap();
        store
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn correct_password_logs_in() {
        let store = store_with_user(true).await;
        let user = authenticate_user(&store, &login("ada@EXAMPLE.com", "violet-harbour-42"))
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");

        let config = JwtConfig {
            secret: "secret".to_string(),
            expiration_hours: 1,
        };
        let response = issue_token(user, &config).unwrap();
        let claims = jwt::validate_jwt(&response.token, "secret").unwrap();
        assert_eq!(claims.user_id, response.user.id);
        assert!(!claims.is_staff);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_unauthorized() {
        let store = store_with_user(true).await;
        for request in [
            login("ada@example.com", "wrong-password"),
            login("nobody@example.com", "violet-harbour-42"),
            login("ada@example.com", &"x".repeat(MAX_LENGTH + 1)),
        ] {
            let err = authenticate_user(&store, &request).await.unwrap_err();
            assert!(matches!(err, AppError::Unauthorized(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn inactive_accounts_cannot_log_in() {
        let store = store_with_user(false).await;
        let err = authenticate_user(&store, &login("ada@example.com", "violet-harbour-42"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
