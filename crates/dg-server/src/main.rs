mod config;
mod health;
mod ws;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use dg_gateway::Gateway;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dg_core::init_logging();
    dg_core::install_shutdown_handler();
    health::record_start_time();

    let config = config::ServerConfig::from_env();
    let store = config::build_store();
    let gateway = Gateway::new(store);
    let data = web::Data::new(gateway);
    let port = config.port;

    log::info!("starting dice room server on port {}", port);
    HttpServer::new(move || {
        let cors = if config.allow_any_origin() {
            Cors::default().allow_any_origin().allow_any_method().allow_any_header()
        } else {
            config
                .cors_origins
                .iter()
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
                .allow_any_method()
                .allow_any_header()
        };
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(cors)
            .app_data(data.clone())
            .route("/health", web::get().to(health::health))
            .route("/ready", web::get().to(health::ready))
            .route("/ws", web::get().to(ws::connect))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
