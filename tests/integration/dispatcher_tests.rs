//! Named operations through the single dispatcher.

use futures_lite::future::block_on;

use beanlink::Error;
use beanlink::app::commands::Operation;
use beanlink::app::events::LinkEvent;
use beanlink::config::LinkConfig;
use beanlink::rpc::correlator::Correlator;
use beanlink::rpc::engine::{Dispatcher, OperationResult};
use beanlink::rpc::transport::Characteristic;

use crate::mock_peripheral::{MemorySinks, MockPeripheral, RecordingEvents};

fn fast_config() -> LinkConfig {
    LinkConfig {
        stats_timeout_ms: 100,
        chunk_timeout_ms: 100,
        command_timeout_ms: 100,
        ..LinkConfig::default()
    }
}

fn run(peripheral: MockPeripheral, op: Operation) -> (Result<OperationResult, Error>, Vec<String>, RecordingEvents) {
    let config = fast_config();
    let mut link = Correlator::new(
        peripheral,
        Characteristic::new(config.command_uuid.as_str()),
        Characteristic::new(config.reply_uuid.as_str()),
    );
    block_on(link.subscribe()).unwrap();

    let mut events = RecordingEvents::default();
    let result = block_on(Dispatcher::new(&mut link, &config).run(op, &mut MemorySinks::default(), &mut events));
    (result, link.transport().writes(), events)
}

#[test]
fn height_query_returns_text() {
    let peripheral = MockPeripheral::new(|cmd| match cmd {
        "req_height" => Some(b"123.5\n".to_vec()),
        _ => None,
    });
    let (result, writes, events) = run(peripheral, Operation::ReqHeight);

    assert_eq!(result.unwrap(), OperationResult::Text("123.5".into()));
    assert_eq!(writes, ["req_height"]);
    assert_eq!(
        events.0,
        [LinkEvent::CommandReply {
            verb: "req_height",
            reply: Some("123.5".into())
        }]
    );
}

#[test]
fn unanswered_query_times_out() {
    let (result, writes, _) = run(MockPeripheral::new(|_| None), Operation::GetMaxHeight);
    assert_eq!(result.unwrap_err(), Error::TimedOut);
    assert_eq!(writes, ["get_max_height"]);
}

#[test]
fn empty_answer_to_query_is_no_response() {
    let (result, _, _) = run(MockPeripheral::new(|_| Some(b" \n".to_vec())), Operation::ReqHeight);
    assert_eq!(result.unwrap_err(), Error::NoResponse);
}

#[test]
fn metrics_toggle_is_fire_and_forget() {
    let (result, writes, events) = run(MockPeripheral::new(|_| None), Operation::EnableMetrics);
    assert_eq!(result.unwrap(), OperationResult::Ack(None));
    assert_eq!(writes, ["enable_metrics"]);
    assert_eq!(
        events.0,
        [LinkEvent::CommandReply {
            verb: "enable_metrics",
            reply: None
        }]
    );
}

#[test]
fn metrics_ack_is_consumed() {
    let (result, _, _) = run(MockPeripheral::new(|_| Some(b"OK disable_metrics\n".to_vec())), Operation::DisableMetrics);
    assert_eq!(result.unwrap(), OperationResult::Ack(Some("OK disable_metrics".into())));
}

#[test]
fn error_reply_is_peripheral_error() {
    let (result, _, events) = run(MockPeripheral::new(|_| Some(b"error: altimeter offline".to_vec())), Operation::ReqHeight);
    assert_eq!(result.unwrap_err(), Error::Peripheral("error: altimeter offline".into()));
    assert!(events.0.is_empty());
}

#[test]
fn store_file_runs_a_download() {
    let data = vec![0xC3; 700];
    let (result, writes, _) = run(MockPeripheral::serving("alt.bin", data, 512), Operation::StoreFile);

    let OperationResult::Transfer(report) = result.unwrap() else {
        panic!("expected a transfer report");
    };
    assert!(report.is_complete());
    assert_eq!(report.bytes_written, 700);
    assert_eq!(writes, ["data_stats", "data_bytes,0", "data_bytes,512"]);
}
