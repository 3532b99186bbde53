use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use clap::Parser;
use lung_scan::{logger, AppConfig, AppState, Cli};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    let config = AppConfig::load(&cli).context("failed to load configuration")?;
    config.validate()?;
    tracing::debug!("configuration: {:?}", config);

    let state = web::Data::new(AppState::from_config(&config)?);
    let (host, port) = config.bind_addr();

    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(lung_scan::configure)
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    tracing::info!("Server running at http://{}:{}", host, port);
    server.bind((host.as_str(), port))?.run().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
