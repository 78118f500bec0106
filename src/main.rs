use actix_cors::Cors;
use actix_files::Files;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use opto_server::auth::handlers::{login, me, signup};
use opto_server::profiles::handlers::{
    get_profile, list_profiles, update_my_profile, upload_avatar, upload_cover,
};
use opto_server::{health_check, AppError, AppState, Settings};
use std::net::TcpListener;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[actix_web::main]
async fn main() -> opto_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    if config.uses_dev_secret() {
        warn!("Running with the built-in development JWT secret; set APP_AUTH__JWT_SECRET before deploying");
    }

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);

    // Periodically drop idle rate-limit windows
    let limiter_state = state.clone();
    tokio::spawn(async move {
        loop {
            limiter_state.auth_limiter.cleanup().await;
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
    });

    std::fs::create_dir_all(&config.uploads.dir)?;

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let upload_dir = config.uploads.dir.clone();

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/auth/signup", web::post().to(signup))
                    .route("/auth/login", web::post().to(login))
                    .route("/auth/me", web::get().to(me))
                    .route("/profiles", web::get().to(list_profiles))
                    .route("/profiles/me", web::put().to(update_my_profile))
                    .route("/profiles/me/avatar", web::post().to(upload_avatar))
                    .route("/profiles/me/cover", web::post().to(upload_cover))
                    .route("/profiles/{id}", web::get().to(get_profile)),
            )
            .service(Files::new("/uploads", upload_dir.clone()))
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(())
}
