use actix_cors::Cors;

use super::ADMIN_KEY_HEADER;

pub fn create_cors() -> Cors {
    Cors::default()
        .allowed_origin_fn(|_, _req_head| {
            // 活动页面可能部署在多个域名下
            true
        })
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .allowed_header(ADMIN_KEY_HEADER)
        .expose_headers(vec![actix_web::http::header::CONTENT_DISPOSITION])
        .max_age(3600)
}
