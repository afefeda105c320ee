use actix_web::{middleware, App, HttpServer};
use actix_cors::Cors;
use mukku_server::api::{configure_routes, AppState};
use mukku_server::{banner, config, toolchain};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("ℹ️  No .env file loaded ({}), using process environment", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return Err(std::io::Error::other(e));
        }
    };

    // One-time init: a failure here is recorded, not fatal.
    let toolchain_status = toolchain::prepare(&app_config.toolchain).await;
    if !toolchain_status.is_ready() {
        eprintln!("⚠️  COMPILER UNAVAILABLE: every /compile request will fail until it is fixed");
    }

    let bind = (app_config.bind_address.clone(), app_config.port);
    let state = AppState::new(app_config, toolchain_status).map_err(std::io::Error::other)?;

    println!("🚀 Starting server on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(actix_web::web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
