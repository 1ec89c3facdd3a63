mod cors;

use std::sync::Arc;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;
use db::{PgStore, SubjectStore, UserStore};
use storage::{FileStore, LocalFileStore, generate_storage_key};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env().expect("Failed to load configuration");
    let config_data = config.clone();
    let origin = config.cors_allowed_origin.clone();

    // init logger
    if config.console_logging_enabled {
        logger::setup(&config.log_file).expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, config.is_production())
        .await
        .expect("Failed to set up database");

    let store = Arc::new(PgStore::new(pool));
    let users: Arc<dyn UserStore> = store.clone();
    let subjects: Arc<dyn SubjectStore> = store;
    let files: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(
        config.media_root.clone(),
        &config.media_url,
        generate_storage_key,
    ));

    if let Some(superuser) = &config.superuser {
        api_accounts::services::user::ensure_superuser(&*users, superuser)
            .await
            .expect("Failed to create superuser");
    }

    log::info!(
        "Starting server on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        let secret = config_data.jwt_config.secret.as_str();
        App::new()
            .app_data(web::Data::new(users.clone()))
            .app_data(web::Data::new(subjects.clone()))
            .app_data(web::Data::new(files.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .wrap(logger::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    .service(api_accounts::mount_auth())
                    .service(api_accounts::mount_subjects())
                    .service(
                        api_accounts::mount_account()
                            .wrap(api_accounts::auth_middleware(secret)),
                    )
                    .service(
                        api_admin::mount_admin().wrap(api_accounts::auth_middleware(secret)),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
