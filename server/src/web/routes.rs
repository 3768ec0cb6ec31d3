// tukangin_server/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{
  admin_handlers, health_check_handler, order_handlers, review_handlers, warranty_handlers,
};

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("/quote", web::post().to(order_handlers::quote_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/payment", web::post().to(order_handlers::pay_deposit_handler))
          .route("/{order_id}/status", web::patch().to(order_handlers::change_status_handler)),
      )
      .service(
        web::scope("/warranties")
          .route("", web::get().to(warranty_handlers::get_warranty_handler))
          .route("/{warranty_id}/claim", web::post().to(warranty_handlers::claim_warranty_handler)),
      )
      .service(web::scope("/reviews").route("", web::post().to(review_handlers::submit_review_handler)))
      .service(
        web::scope("/admin")
          .route("/orders/{order_id}", web::get().to(admin_handlers::get_order_handler))
          .route("/orders/{order_id}/assign", web::post().to(admin_handlers::assign_handler))
          .route("/orders/{order_id}/finish", web::post().to(admin_handlers::finish_handler))
          .route("/orders/{order_id}/cancel", web::post().to(admin_handlers::cancel_handler))
          .route("/broadcast", web::post().to(admin_handlers::broadcast_handler))
          .route("/warranties/reconcile", web::post().to(admin_handlers::reconcile_handler)),
      ),
  );
}
