use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use diesel_migrations::MigrationHarness;
use dotenvy::dotenv;

use pushkind_blog::MIGRATIONS;
use pushkind_blog::db::establish_connection_pool;
use pushkind_blog::models::config::ServerConfig;
use pushkind_blog::repository::DieselRepository;
use pushkind_blog::routes::configure;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = conn.run_pending_migrations(MIGRATIONS) {
                log::error!("Failed to run database migrations: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Failed to get database connection: {e}");
            std::process::exit(1);
        }
    }

    let repo = web::Data::new(DieselRepository::new(pool));
    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Starting server on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(repo.clone())
            .configure(configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
