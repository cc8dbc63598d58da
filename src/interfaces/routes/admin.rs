use actix_web::web;

use crate::handlers::{admin, system, uploads};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(
                web::resource("/health")
                    .route(web::get().to(system::health_check))
            )
            .service(
                web::resource("/uploads")
                    .route(web::post().to(uploads::upload_images))
            )
            .service(
                web::scope("/projects")
                    .service(
                        web::resource("")
                            .route(web::get().to(admin::admin_list_projects))
                            .route(web::post().to(admin::create_project))
                    )
                    .service(
                        web::resource("/seed")
                            .route(web::post().to(admin::seed_demo_projects))
                    )
                    .service(
                        web::resource("/{project_id}")
                            .route(web::get().to(admin::admin_get_project))
                            .route(web::put().to(admin::update_project))
                            .route(web::delete().to(admin::delete_project))
                    )
            )
    );
}
