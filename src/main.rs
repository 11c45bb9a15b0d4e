use actix_web::{middleware, App, HttpServer};
use pptx_deck_renderer::{server, ServiceConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServiceConfig::from_env();
    let (host, port) = config.bind_address();

    log::info!("Starting pptx renderer at http://{}:{}", host, port);

    HttpServer::new(move || {
        let config = config.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(move |cfg| server::configure(cfg, &config))
    })
    .bind((host, port))?
    .run()
    .await
}
