use std::{error::Error, sync::Arc};

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;
use vitalog_store::{FileRecordRepository, RecordRepository};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    log4rs::init_file("log4rs.yml", Default::default())?;

    info!("Opening record table");
    let repository: Arc<dyn RecordRepository> = Arc::new(FileRecordRepository::from_env()?);
    let repository = web::Data::from(repository);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(repository.clone())
            .configure(vitalog_api::configure)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await?;

    Ok(())
}
