use actix_cors::Cors;
use actix_web::{middleware::Compress, web, App, HttpServer};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use otp_gate::openapi::ApiDoc;
use otp_gate::sweep::spawn_sweeper;
use otp_gate::{
    config, metrics_config, AppState, LogNotifier, Notifier, OtpConfig, OtpManager,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env automatically only in debug builds; production sets env externally.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let cfg = OtpConfig::from_env();
    info!(
        validity_secs = cfg.validity.as_secs(),
        sweep = cfg.sweep_interval.is_some(),
        "bootstrapping otp-gate"
    );

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let otp = OtpManager::new(cfg.validity);
    match cfg.sweep_interval {
        Some(every) => {
            spawn_sweeper(otp.clone(), every);
        }
        None => info!("otp expiry is lazy; stale codes go on validate or on the next request"),
    }

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    warn!("using log notifier; codes are written to the log, not delivered");

    let openapi = ApiDoc::openapi();
    let state = AppState { otp, notifier };
    let frontend_url = cfg.frontend_url.clone();

    let server = HttpServer::new(move || {
        let cors = {
            let mut c = Cors::default()
                .allowed_origin("http://localhost:5173")
                .allowed_origin("http://127.0.0.1:5173")
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allow_any_header()
                .allowed_methods(["GET", "POST", "OPTIONS"])
                .max_age(3600);
            if let Some(front) = &frontend_url {
                c = c.allowed_origin(front);
            }
            c
        };

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(prometheus.clone()))
            .configure(config)
            .configure(metrics_config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
    })
    .bind((cfg.bind_addr.as_str(), cfg.port))?;

    info!("Listening on http://{}:{}", cfg.bind_addr, cfg.port);

    server.run().await
}
