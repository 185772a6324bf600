mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;
use plans::{PgSubscriptionFetcher, PgSubscriptionSource};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
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

    // one fetcher shared by every worker
    let fetcher = web::Data::new(PgSubscriptionFetcher::new(PgSubscriptionSource::new(
        pool.clone(),
    )));

    if config.stripe.pro_price_id.is_empty() {
        log::warn!("STRIPE_PRO_PRICE_ID is not set; no subscription will resolve to Pro");
    }
    log::info!(
        "Starting server on {}:{}",
        config.server_host,
        config.server_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(fetcher.clone())
            .wrap(logger::middleware()) // 3rd
            .wrap(extractor::middleware(config_data.jwt_config.clone())) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .service(
                web::scope("/api")
                    .service(api_subs::mount_webhook())
                    .service(api_sites::mount_public())
                    .service(
                        web::scope("/dashboard")
                            .wrap(extractor::auth_middleware())
                            .service(api_subs::mount_subs())
                            .service(api_sites::mount_projects())
                            .service(api_sites::mount_site()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
