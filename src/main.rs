#![warn(clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::anyhow;
use hallpass::{
    build_cors, configure_services, handlers::BlogStore, security_headers, FirebaseProvider,
    HallpassSettings, IdentityGateway, IdentityProvider,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from Settings.toml and environment variables.
    // This also loads a .env file and initializes the logger.
    let settings =
        HallpassSettings::load().map_err(|e| anyhow!("Failed to load settings: {e}"))?;

    // Long-lived provider client; the gateway shares one handle per process
    let provider: Arc<dyn IdentityProvider> =
        Arc::new(FirebaseProvider::new(&settings.provider));
    let gateway = web::Data::new(IdentityGateway::new(provider));

    start_server(gateway, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    gateway: web::Data<IdentityGateway>,
    settings: HallpassSettings,
) -> anyhow::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let cors_origins = settings.get_cors_origins();
    let blog_store = web::Data::new(BlogStore::sample());
    let settings_data = web::Data::new(settings);

    HttpServer::new(move || {
        App::new()
            .app_data(settings_data.clone())
            .app_data(gateway.clone())
            .app_data(blog_store.clone())
            .wrap(build_cors(cors_origins.clone()))
            .wrap(security_headers())
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

fn print_startup_info(bind_address: &str, settings: &HallpassSettings) {
    println!("Starting hallpass v{} on http://{bind_address}", hallpass::VERSION);
    println!("Environment: {}", settings.application.environment);
    println!();
    println!("User endpoints:");
    println!("  POST /user/register         - Create an account");
    println!("  POST /user/sign-in          - Sign in with email/password");
    println!("  POST /user/validate-session - Validate a session token");
    println!();
    println!("Content endpoints:");
    println!("  GET  /blog                  - List blog posts");
    println!("  GET  /blog/{{id}}             - Fetch one blog post");
    println!();
    println!("System endpoints:");
    println!("  GET  /                      - Hello message");
}
