use log::{debug, info};
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::DriverOption;
use crate::driver::{DriverContext, SwitchDriver, SwitchState};
use crate::error::SwitchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    On,
    Off,
    GetState,
}

#[derive(Serialize)]
struct ActionRequest {
    action: Action,
}

struct Endpoint {
    client: Client,
    target: Url,
}

impl Endpoint {
    fn request(&self, action: Action) -> Result<Map<String, Value>, SwitchError> {
        let body = serde_json::to_vec(&ActionRequest { action })?;
        let res = self
            .client
            .post(self.target.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        if res.status() != StatusCode::OK {
            return Err(SwitchError::UnexpectedStatusCode(res.status().as_u16()));
        }

        let buf = res.bytes()?;
        Ok(serde_json::from_slice(&buf)?)
    }

    fn state(&self) -> SwitchState {
        let out = match self.request(Action::GetState) {
            Ok(out) => out,
            Err(e) => {
                debug!("get_state on {} failed, assuming off: {e}", self.target);
                return SwitchState::Off;
            }
        };

        match out.get("state") {
            Some(Value::String(s)) => SwitchState::from_remote(s),
            other => {
                debug!("get_state on {} returned {other:?}, assuming off", self.target);
                SwitchState::Off
            }
        }
    }
}

/// Switch living behind a remote JSON endpoint. State is never cached; every
/// call asks the device, and the lock is held across the round trip.
pub struct HttpSwitchDriver {
    module: String,
    endpoint: Mutex<Endpoint>,
}

impl HttpSwitchDriver {
    pub fn new(target: &str, ctx: &DriverContext) -> Result<Self, SwitchError> {
        let target = parse_target(target)?;
        let client = Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()?;

        Ok(Self {
            module: ctx.module().to_string(),
            endpoint: Mutex::new(Endpoint { client, target }),
        })
    }

    pub fn from_option(opt: &DriverOption, ctx: &DriverContext) -> Result<Self, SwitchError> {
        let target = opt.require_string("target")?;
        debug!("{}: http switch target {target}", ctx.module());
        Self::new(&target, ctx)
    }

    fn turn(&self, action: Action, wanted: SwitchState) -> Result<(), SwitchError> {
        let endpoint = self.endpoint.lock();

        if endpoint.state() == wanted {
            return Err(SwitchError::NotTurnable);
        }
        endpoint.request(action)?;

        info!("{}: http switch {} turned {wanted}", self.module, endpoint.target);
        Ok(())
    }
}

fn parse_target(target: &str) -> Result<Url, SwitchError> {
    let url = Url::parse(target).map_err(|_| SwitchError::InvalidConfig("target".into()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(SwitchError::InvalidConfig("target".into())),
    }
}

impl SwitchDriver for HttpSwitchDriver {
    fn name(&self) -> &'static str {
        "http"
    }

    fn activate(&self) -> Result<(), SwitchError> {
        self.turn(Action::On, SwitchState::On)
    }

    fn deactivate(&self) -> Result<(), SwitchError> {
        self.turn(Action::Off, SwitchState::Off)
    }

    fn query(&self) -> SwitchState {
        self.endpoint.lock().state()
    }
}

pub fn new_http_driver(
    opt: &DriverOption,
    ctx: &DriverContext,
) -> Result<Box<dyn SwitchDriver>, SwitchError> {
    Ok(Box::new(HttpSwitchDriver::from_option(opt, ctx)?))
}
