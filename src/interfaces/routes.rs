use actix_web::web;

use crate::handlers::home::home;

mod admin;
mod json_error;
mod projects;
mod uploads;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api/v1")
            .configure(projects::config_routes)
            .configure(admin::config_routes)
    );

    cfg.configure(uploads::config_routes);
    cfg.configure(json_error::config_routes);
}
