use std::sync::Arc;

use actix_web::{HttpResponse, Responder, guard, http::Method, web};
use serde::Serialize;

use crate::driver::SwitchState;
use crate::error::SwitchError;
use crate::service::SwitchService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SwitchService>,
}

#[derive(Serialize)]
struct StatePayload {
    state: SwitchState,
}

pub fn api_scope(base_path: &str) -> actix_web::Scope {
    web::scope(base_path)
        .service(
            web::resource("/switch/state")
                .route(web::get().to(get_state))
                .route(
                    web::route()
                        .guard(guard_not_methods(&[Method::GET]))
                        .to(method_not_allowed),
                ),
        )
        .service(
            web::resource("/switch/activate")
                .route(web::post().to(activate))
                .route(
                    web::route()
                        .guard(guard_not_methods(&[Method::POST]))
                        .to(method_not_allowed),
                ),
        )
        .service(
            web::resource("/switch/deactivate")
                .route(web::post().to(deactivate))
                .route(
                    web::route()
                        .guard(guard_not_methods(&[Method::POST]))
                        .to(method_not_allowed),
                ),
        )
}

// drivers block on hardware or network I/O, keep them off the async workers
async fn run_blocking<F>(state: &web::Data<AppState>, f: F) -> Result<SwitchState, SwitchError>
where
    F: FnOnce(&SwitchService) -> Result<SwitchState, SwitchError> + Send + 'static,
{
    let service = Arc::clone(&state.service);

    web::block(move || f(&service))
        .await
        .map_err(|e| SwitchError::Worker(e.to_string()))?
}

async fn get_state(state: web::Data<AppState>) -> Result<impl Responder, SwitchError> {
    let current = run_blocking(&state, |service| Ok(service.query())).await?;

    Ok(web::Json(StatePayload { state: current }))
}

async fn activate(state: web::Data<AppState>) -> Result<impl Responder, SwitchError> {
    let current = run_blocking(&state, SwitchService::activate).await?;

    Ok(web::Json(StatePayload { state: current }))
}

async fn deactivate(state: web::Data<AppState>) -> Result<impl Responder, SwitchError> {
    let current = run_blocking(&state, SwitchService::deactivate).await?;

    Ok(web::Json(StatePayload { state: current }))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().finish()
}

fn guard_not_methods(methods: &[Method]) -> impl guard::Guard {
    let allowed: Vec<Method> = methods.to_vec();
    guard::fn_guard(move |ctx| !allowed.iter().any(|m| m == ctx.head().method))
}
