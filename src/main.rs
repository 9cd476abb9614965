use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::{error, info};

use auth::{PasswordHasher, TokenIssuer};
use config::Config;
use db::{Mongo, MongoProductStore, MongoUserStore};

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod store;


#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let mongo = Mongo::connect(&config).await.map_err(|e| {
        error!("Failed to connect to MongoDB: {e}");
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;

    let Mongo {
        client,
        users,
        products,
    } = mongo;
    let users = web::Data::new(users);
    let products = web::Data::new(products);
    let hasher = web::Data::new(PasswordHasher::default());
    let issuer = web::Data::new(TokenIssuer::new(&config.jwt_secret, config.token_ttl));

    info!("Server is running on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(users.clone())
            .app_data(products.clone())
            .app_data(hasher.clone())
            .app_data(issuer.clone())
            .configure(handlers::configure::<MongoUserStore, MongoProductStore>)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    db::shutdown(client).await;
    Ok(())
}
