use actix_web::web;

use crate::handlers::uploads;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/uploads/{key:.*}")
            .route(web::get().to(uploads::serve_upload))
    );
}
