use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};

use switchd::{
    AppConfig, AppState, DriverRegistry, FileStateStore, HttpConfig, MemoryStateStore, StateStore,
    SwitchService, api_scope,
};

fn main() -> std::io::Result<()> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SWITCHD_CONFIG").ok())
        .unwrap_or_else(|| "config.json".to_string());
    let config = AppConfig::load_from_file(&config_path)
        .unwrap_or_else(|e| panic!("Failed to load config: {e}"));

    let store: Arc<dyn StateStore> = match &config.state_file {
        Some(path) => {
            let file_store = FileStateStore::new(path);
            match file_store.read_state() {
                Ok(Some(last)) => info!("Last persisted switch state: {last}"),
                Ok(None) => {}
                Err(e) => warn!("Ignoring persisted switch state: {e}"),
            }
            Arc::new(file_store)
        }
        None => Arc::new(MemoryStateStore::default()),
    };

    let registry = DriverRegistry::with_builtin();
    info!("Switch drivers available: {}", registry.names().join(", "));

    // built outside the async runtime, the http driver owns a blocking client
    let service = Arc::new(
        SwitchService::init(&registry, &config.driver_option(), store, &config.module)
            .unwrap_or_else(|e| panic!("Failed to init switch driver: {e}")),
    );
    info!("Switch driver {} ready", service.driver_name());

    let app_state = AppState {
        service: Arc::clone(&service),
    };

    actix_web::rt::System::new().block_on(serve(config.http.clone(), app_state))
}

async fn serve(http_cfg: HttpConfig, app_state: AppState) -> std::io::Result<()> {
    let scope_path = http_cfg.path.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .service(api_scope(&scope_path))
    });

    let bind_addrs: String;
    let server = match (&http_cfg.unix_socket, &http_cfg.host) {
        (Some(socket_path), Some(host)) => {
            if Path::new(socket_path).exists() {
                fs::remove_file(socket_path)?;
            }
            bind_addrs = format!("{} and {}", socket_path, host);

            server.bind_uds(socket_path)?.bind_auto_h2c(host)?
        }
        (Some(socket_path), None) => {
            if Path::new(socket_path).exists() {
                fs::remove_file(socket_path)?;
            }
            bind_addrs = socket_path.clone();

            server.bind_uds(socket_path)?
        }
        (None, Some(host)) => {
            bind_addrs = host.clone();

            server.bind_auto_h2c(host)?
        }
        _ => {
            panic!("Config error: either 'unix_socket' or 'host' must be specified")
        }
    };

    info!("Starting server on {}...", bind_addrs);

    server.run().await
}
