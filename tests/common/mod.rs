#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use actix_web::{App, HttpResponse, HttpServer, http::StatusCode, web};
use parking_lot::Mutex;
use serde_json::{Value, json};
use switchd::SwitchState;

#[derive(Clone)]
pub enum Reply {
    /// Behave like a well-formed device.
    Normal,
    /// Answer every request with this status and an empty body.
    Status(u16),
    /// Answer `get_state` with this raw body, handle actions normally.
    StateBody(&'static str),
    /// Answer `on`/`off` with this raw body, handle `get_state` normally.
    ActionBody(&'static str),
}

pub struct FakeDevice {
    state: Mutex<SwitchState>,
    reply: Mutex<Reply>,
    delay: Mutex<Duration>,
    actions: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeDevice {
    pub fn new(state: SwitchState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
            reply: Mutex::new(Reply::Normal),
            delay: Mutex::new(Duration::ZERO),
            actions: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn state(&self) -> SwitchState {
        *self.state.lock()
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock() = reply;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }

    pub fn clear_actions(&self) {
        self.actions.lock().clear();
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, action: &str) -> HttpResponse {
        let reply = self.reply.lock().clone();
        match (reply, action) {
            (Reply::Status(code), _) => {
                HttpResponse::build(StatusCode::from_u16(code).unwrap()).finish()
            }
            (Reply::StateBody(body), "get_state") => HttpResponse::Ok()
                .content_type("application/json")
                .body(body),
            (Reply::ActionBody(body), "on" | "off") => HttpResponse::Ok()
                .content_type("application/json")
                .body(body),
            (_, "on") => {
                *self.state.lock() = SwitchState::On;
                HttpResponse::Ok().json(json!({}))
            }
            (_, "off") => {
                *self.state.lock() = SwitchState::Off;
                HttpResponse::Ok().json(json!({}))
            }
            (_, "get_state") => HttpResponse::Ok().json(json!({ "state": self.state() })),
            _ => HttpResponse::BadRequest().finish(),
        }
    }
}

async fn handle(device: web::Data<FakeDevice>, body: web::Json<Value>) -> HttpResponse {
    let action = body
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    device.actions.lock().push(action.clone());

    let now = device.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    device.max_in_flight.fetch_max(now, Ordering::SeqCst);

    let delay = *device.delay.lock();
    if !delay.is_zero() {
        actix_web::rt::time::sleep(delay).await;
    }
    let response = device.respond(&action);

    device.in_flight.fetch_sub(1, Ordering::SeqCst);
    response
}

/// Serves `device` on a loopback port and returns its target URL.
pub fn spawn_device(device: Arc<FakeDevice>) -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();

    thread::spawn(move || {
        actix_web::rt::System::new().block_on(async move {
            let data = web::Data::from(device);
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(data.clone())
                    .route("/switch", web::post().to(handle))
            })
            .workers(1)
            .bind(("127.0.0.1", 0))
            .expect("bind fake device");

            tx.send(server.addrs()[0]).expect("report fake device address");
            server.run().await
        })
    });

    let addr = rx.recv().expect("fake device address");
    format!("http://{addr}/switch")
}

/// URL of a loopback port nothing listens on.
pub fn dead_target() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback socket");
    let addr = listener.local_addr().expect("loopback address");
    drop(listener);
    format!("http://{addr}/switch")
}
