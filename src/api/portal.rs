use actix_web::{HttpResponse, Responder, get, http::header::ContentType, web};

use crate::config::Config;

const PORTAL_PAGE: &str = include_str!("../../static/portal.html");

/// The single page: email box, today's record and one action button.
#[get("/")]
pub async fn index(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(PORTAL_PAGE.replace("__API_PREFIX__", &config.api_prefix))
}
