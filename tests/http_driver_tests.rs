mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::json;
use switchd::{
    DriverContext, DriverOption, DriverRegistry, HttpSwitchDriver, SwitchDriver, SwitchError,
    SwitchState,
};

use common::{FakeDevice, Reply, dead_target, spawn_device};

fn driver_for(device: &Arc<FakeDevice>) -> HttpSwitchDriver {
    let target = spawn_device(Arc::clone(device));
    HttpSwitchDriver::new(&target, &DriverContext::new()).unwrap()
}

#[test]
fn activate_then_query_round_trip() {
    let device = FakeDevice::new(SwitchState::Off);
    let drv = driver_for(&device);

    drv.activate().unwrap();
    assert_eq!(device.state(), SwitchState::On);
    assert_eq!(drv.query(), SwitchState::On);

    drv.deactivate().unwrap();
    assert_eq!(device.state(), SwitchState::Off);
    assert_eq!(drv.query(), SwitchState::Off);

    assert_eq!(
        device.actions(),
        vec!["get_state", "on", "get_state", "get_state", "off", "get_state"]
    );
}

#[test]
fn repeated_activate_is_rejected_without_sending() {
    let device = FakeDevice::new(SwitchState::Off);
    let drv = driver_for(&device);

    drv.activate().unwrap();
    device.clear_actions();

    let err = drv.activate().unwrap_err();
    assert!(matches!(err, SwitchError::NotTurnable));
    assert!(err.is_precondition());
    assert_eq!(device.actions(), vec!["get_state"]);
    assert_eq!(device.state(), SwitchState::On);
}

#[test]
fn repeated_deactivate_is_rejected_without_sending() {
    let device = FakeDevice::new(SwitchState::On);
    let drv = driver_for(&device);

    drv.deactivate().unwrap();
    device.clear_actions();

    assert!(matches!(drv.deactivate(), Err(SwitchError::NotTurnable)));
    assert_eq!(device.actions(), vec!["get_state"]);
    assert_eq!(device.state(), SwitchState::Off);
}

#[test]
fn query_resolves_malformed_state_to_off() {
    let device = FakeDevice::new(SwitchState::On);
    let drv = driver_for(&device);
    assert_eq!(drv.query(), SwitchState::On);

    for body in [
        "{}",
        r#"{"status": "on"}"#,
        r#"{"state": 1}"#,
        r#"{"state": true}"#,
        r#"{"state": null}"#,
        r#"{"state": ["on"]}"#,
        r#"{"state": "ON"}"#,
        r#"{"state": "enabled"}"#,
        r#""on""#,
        "[]",
        "not json",
        "",
    ] {
        device.set_reply(Reply::StateBody(body));
        assert_eq!(drv.query(), SwitchState::Off, "body {body:?}");
    }
}

#[test]
fn query_resolves_non_200_to_off() {
    let device = FakeDevice::new(SwitchState::On);
    let drv = driver_for(&device);

    for code in [201, 204, 404, 500, 503] {
        device.set_reply(Reply::Status(code));
        assert_eq!(drv.query(), SwitchState::Off, "status {code}");
    }
}

#[test]
fn unreachable_device_reads_as_off() {
    let drv = HttpSwitchDriver::new(&dead_target(), &DriverContext::new()).unwrap();

    assert_eq!(drv.query(), SwitchState::Off);
    assert!(matches!(drv.activate(), Err(SwitchError::Transport(_))));
    // an unreachable device already looks off
    assert!(matches!(drv.deactivate(), Err(SwitchError::NotTurnable)));
}

#[test]
fn write_with_non_200_reply_fails() {
    let device = FakeDevice::new(SwitchState::Off);
    let drv = driver_for(&device);
    device.set_reply(Reply::Status(503));

    let err = drv.activate().unwrap_err();
    assert!(matches!(err, SwitchError::UnexpectedStatusCode(503)));
    assert_eq!(device.actions(), vec!["get_state", "on"]);
    assert_eq!(device.state(), SwitchState::Off);
}

#[test]
fn write_with_malformed_reply_fails() {
    let device = FakeDevice::new(SwitchState::Off);
    let drv = driver_for(&device);
    device.set_reply(Reply::ActionBody("ok"));

    assert!(matches!(drv.activate(), Err(SwitchError::Decode(_))));
    device.set_reply(Reply::ActionBody("[]"));
    assert!(matches!(drv.activate(), Err(SwitchError::Decode(_))));

    // any JSON object is an acceptable acknowledgement
    device.set_reply(Reply::ActionBody(r#"{"result": "done"}"#));
    drv.activate().unwrap();
}

#[test]
fn concurrent_callers_never_overlap_on_the_wire() {
    let device = FakeDevice::new(SwitchState::Off);
    let drv = Arc::new(driver_for(&device));
    device.set_delay(Duration::from_millis(10));

    let workers: Vec<_> = (0..4)
        .map(|i| {
            let drv = Arc::clone(&drv);
            thread::spawn(move || {
                for n in 0..4 {
                    let _ = match (i + n) % 3 {
                        0 => drv.activate(),
                        1 => drv.deactivate(),
                        _ => Ok(()),
                    };
                    let _ = drv.query();
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    assert_eq!(device.max_in_flight(), 1);
    assert_eq!(drv.query(), device.state());
}

#[test]
fn registry_builds_http_driver_from_options() {
    let device = FakeDevice::new(SwitchState::Off);
    let target = spawn_device(Arc::clone(&device));
    let option = DriverOption::new(json!({ "name": "http", "target": target }));

    let drv = DriverRegistry::with_builtin()
        .resolve("http", &option, &DriverContext::new().with_module("porch"))
        .unwrap();
    assert_eq!(drv.name(), "http");
    assert_eq!(drv.query(), SwitchState::Off);
    drv.activate().unwrap();
    assert_eq!(drv.query(), SwitchState::On);
}

#[test]
fn malformed_target_fails_construction() {
    let option = DriverOption::new(json!({ "name": "http", "target": "not a url" }));
    let err = DriverRegistry::with_builtin()
        .resolve("http", &option, &DriverContext::new())
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "invalid config: target");
}
