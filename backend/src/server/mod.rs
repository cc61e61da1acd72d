//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::{build_pubsub_stack, spawn_background_tasks};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use pubsub_service::Trace;
#[cfg(debug_assertions)]
use pubsub_service::doc::ApiDoc;
use pubsub_service::inbound::http::api::PubsubApi;
use pubsub_service::inbound::http::health::{HealthState, live, ready};
use pubsub_service::inbound::http::router::routes;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    api: Arc<dyn PubsubApi>,
    base_path: String,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        api,
        base_path,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .wrap(Trace)
        .service(routes(&base_path, api))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Must be called from within a tokio runtime: once the listener is bound the
/// message delivery pump and the expiry sweeper are spawned onto it.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing binding, limits, and optional metrics settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let stack = build_pubsub_stack(&config);
    let api = stack.api();
    let server_health_state = health_state.clone();
    let base_path = config.base_path.clone();

    let server = HttpServer::new({
        let base_path = base_path.clone();
        #[cfg(feature = "metrics")]
        let metrics_layer = MetricsLayer::from_option(config.prometheus.clone());
        move || {
            let app = build_app(AppDependencies {
                health_state: server_health_state.clone(),
                api: api.clone(),
                base_path: base_path.clone(),
            });

            #[cfg(feature = "metrics")]
            let app = app.wrap(metrics_layer.clone());

            app
        }
    })
    .bind(config.bind_addr.clone())?
    .run();

    let _tasks = spawn_background_tasks(stack, &config, health_state.clone());
    info!(
        host = %config.bind_addr.0,
        port = config.bind_addr.1,
        %base_path,
        "pubsub service listening"
    );
    health_state.mark_ready();
    Ok(server)
}
