//! Route table for the HTTP adapter.
//!
//! ```text
//! GET  /                      upload page
//! GET  /static/{file}         static assets
//! POST /api/add-note
//! POST /api/update-note
//! POST /api/regenerate-note
//! GET  /api/notes
//! ```
//!
//! Each path accepts exactly one method; anything else gets a JSON 405.

use actix_web::{FromRequest, Handler, HttpRequest, Resource, Responder, Route, web};

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::{notes, pages};

/// Default service for a known path hit with the wrong method.
pub async fn method_not_allowed(req: HttpRequest) -> ApiResult<&'static str> {
    Err(Error::method_not_allowed("Method not allowed")
        .with_details(serde_json::json!({ "method": req.method().as_str() })))
}

/// Default service for unknown paths.
pub async fn not_found() -> ApiResult<&'static str> {
    Err(Error::not_found("Not found"))
}

fn single_method<F, Args>(path: &str, route: Route, handler: F) -> Resource
where
    F: Handler<Args>,
    Args: FromRequest + 'static,
    F::Output: Responder + 'static,
{
    web::resource(path)
        .route(route.to(handler))
        .default_service(web::to(method_not_allowed))
}

/// Register every page and API endpoint.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use bookmd::inbound::http::routes;
///
/// let _app = App::new().configure(routes::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(notes::multipart_config())
        .app_data(notes::urlencoded_config())
        .service(single_method("/", web::get(), pages::index))
        .service(single_method(
            "/static/{file}",
            web::get(),
            pages::static_file,
        ))
        .service(single_method("/api/add-note", web::post(), notes::add_note))
        .service(single_method(
            "/api/update-note",
            web::post(),
            notes::update_note,
        ))
        .service(single_method(
            "/api/regenerate-note",
            web::post(),
            notes::regenerate_note,
        ))
        .service(single_method("/api/notes", web::get(), notes::list_notes));
}
