// storefront/src/web/routes.rs

use crate::web::handlers::{cart_handlers, catalog_handlers, checkout_handlers, order_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/items")
          .route("", web::get().to(catalog_handlers::list_items_handler))
          .route("", web::post().to(catalog_handlers::create_item_handler))
          .route("/{item_id}", web::get().to(catalog_handlers::get_item_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart_handler))
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/{line_id}", web::delete().to(cart_handlers::remove_from_cart_handler)),
      )
      .route("/checkout", web::post().to(checkout_handlers::checkout_handler))
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler)),
      ),
  );
}
