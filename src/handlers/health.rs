use crate::models::HelloResponse;
use crate::settings::HallpassSettings;
use crate::utils::ResponseBuilder;
use actix_web::{web, HttpResponse};
use log::info;

/// Homepage hello route, echoing the configured environment name
pub async fn hello(settings: web::Data<HallpassSettings>) -> HttpResponse {
    info!("API homepage received a request");

    ResponseBuilder::ok().json(&HelloResponse {
        message: format!("Hello {} world!", settings.application.environment),
    })
}
