//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::BoxBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::health::{self, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::upload::UploadConfig;
use crate::inbound::http::{recipes, users};
use crate::middleware::Trace;

/// Assemble the application: trace middleware, the session-wrapped
/// `/api/v1` scope, and the health probes. Swagger UI is mounted in debug
/// builds only.
pub fn build_app(
    state: HttpState,
    uploads: UploadConfig,
    health_state: web::Data<HealthState>,
    session: SessionMiddleware<CookieSessionStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(users::login)
        .service(recipes::get_user_recipes)
        .service(recipes::get_recipe)
        .service(recipes::create_recipe)
        .service(recipes::update_recipe)
        .service(recipes::delete_recipe);

    let app = App::new()
        .app_data(web::Data::new(state))
        .app_data(web::Data::new(uploads))
        .app_data(health_state)
        .wrap(Trace)
        .service(api)
        .service(health::ready)
        .service(health::live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind and start the HTTP server described by `config`, serving `state`.
///
/// The readiness probe flips to 200 once the listener is bound.
pub fn run(config: ServerConfig, state: HttpState) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        upload_dir,
    } = config;
    let uploads = UploadConfig::new(upload_dir);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays accessible.
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(same_site)
            .build();
        build_app(
            state.clone(),
            uploads.clone(),
            server_health_state.clone(),
            session,
        )
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    Ok(server.run())
}
