use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::env_config::Config;
use common::error::Res;
use common::http::Success;
use db::UserStore;

use crate::dtos::auth::{LoginRequest, SignupFormView, SignupRequest};
use crate::services;

/// Describes the signup form fields for clients that build it dynamically.
#[get("/signup")]
pub async fn get_signup() -> Res<impl Responder> {
    Success::ok(SignupFormView::new())
}

/// Registers a new tutor account and logs it in.
///
/// # Input
/// - `req`: JSON payload with names, email, optional date of birth, both
///   password fields and `terms_agreed`
/// - `users`: Account store
/// - `config`: Application configuration for JWT generation
///
/// # Output
/// - Success: 201 Created with `{ token, user }`
/// - Error: 400 with every field error, e.g. a taken email or mismatched passwords
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/signup', {
///   method: 'POST',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({
///     first_name: 'Ada',
///     last_name: 'Lovelace',
///     email: 'ada@example.com',
///     date_of_birth: '1990-12-10',
///     password_1: 'violet-harbour-42',
///     password_2: 'violet-harbour-42',
///     terms_agreed: true
///   })
/// });
///
/// const data = await response.json();
/// if (response.ok) {
///   localStorage.setItem('authToken', data.token);
/// } else {
///   console.log(data.fields); // { email: ['User with this Email already exists.'] }
/// }
/// ```
#[post("/signup")]
pub async fn post_signup(
    req: web::Json<SignupRequest>,
    users: web::Data<Arc<dyn UserStore>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let user = services::user::signup(users.get_ref().as_ref(), &req.into_inner()).await?;
    let response = services::auth::issue_token(user, &config.jwt_config)?;
    Success::created(response)
}

/// Authenticates a user with email and password.
///
/// # Output
/// - Success: `{ token, user }`
/// - Error: 401 Unauthorized for invalid credentials or an inactive account
#[post("/login")]
pub async fn post_login(
    login_data: web::Json<LoginRequest>,
    users: web::Data<Arc<dyn UserStore>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let user =
        services::auth::authenticate_user(users.get_ref().as_ref(), &login_data.into_inner())
            .await?;
    Success::ok(services::auth::issue_token(user, &config.jwt_config)?)
}
