use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tera::Tera;
use tracing::{error, info};

mod config;
mod error;
mod message_database;
mod routes;

use config::Settings;
use error::AppError;
use message_database::{MessageStore, PgMessageStore};
use routes::AppState;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;

    let store = PgMessageStore::connect(&settings.database).await?;
    let store: Arc<dyn MessageStore> = Arc::new(store);
    info!(
        "Connected to database {} on {}:{}",
        settings.database.database, settings.database.host, settings.database.port
    );

    let tera = match Tera::new("templates/*.html") {
        Ok(t) => t,
        Err(e) => {
            error!("Template parsing error: {}", e);
            ::std::process::exit(1);
        }
    };

    let app_data = web::Data::new(AppState {
        tera,
        store: store.clone(),
    });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .configure(routes::configure)
    })
    .bind(("127.0.0.1", settings.http.port))?
    .disable_signals()
    .run();

    use futures::executor::block_on;
    let handle = server.handle();
    ctrlc::set_handler(move || {
        info!("Stopping server");
        block_on(handle.stop(true));
    })
    .expect("Could not setup ctrl-c handler");

    info!("Server running on http://localhost:{}", settings.http.port);
    server.await?;

    // Drain the pool once the last request has finished
    store.close().await;
    info!("Database connection closed. Bye!");

    Ok(())
}
