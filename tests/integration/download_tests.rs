//! Chunked download driver against a scripted peripheral.

use std::time::Duration;

use futures_lite::future::block_on;

use beanlink::Error;
use beanlink::app::events::LinkEvent;
use beanlink::rpc::chunked::{ChunkedDownload, TransferStatus};
use beanlink::rpc::correlator::Correlator;
use beanlink::rpc::transport::Characteristic;

use crate::mock_peripheral::{MemorySinks, MockPeripheral, RecordingEvents, file_server, writes};

const FAST: Duration = Duration::from_millis(100);

fn link(peripheral: MockPeripheral) -> Correlator<MockPeripheral> {
    let mut link = Correlator::new(
        peripheral,
        Characteristic::new("ctrl-rx"),
        Characteristic::new("ctrl-tx"),
    );
    block_on(link.subscribe()).unwrap();
    link
}

fn driver() -> ChunkedDownload {
    ChunkedDownload::new(FAST, FAST)
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

#[test]
fn full_file_reconstructed() {
    let data = pattern(1300);
    let mut link = link(MockPeripheral::serving("flight.bin", data.clone(), 512));
    let mut sinks = MemorySinks::default();
    let mut events = RecordingEvents::default();

    let report = block_on(driver().run(&mut link, &mut sinks, &mut events)).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.filename, "flight.bin");
    assert_eq!(report.bytes_written, 1300);
    assert_eq!(sinks.contents("flight.bin").unwrap(), data);
    assert_eq!(
        link.transport().writes(),
        ["data_stats", "data_bytes,0", "data_bytes,512", "data_bytes,1024"]
    );

    let progress: Vec<u64> = events
        .0
        .iter()
        .filter_map(|e| match e {
            LinkEvent::TransferProgress { written, .. } => Some(*written),
            _ => None,
        })
        .collect();
    assert_eq!(progress, [512, 1024, 1300]);
    assert!(matches!(
        events.0.last(),
        Some(LinkEvent::TransferComplete { bytes: 1300, .. })
    ));
}

#[test]
fn padding_beyond_declared_size_truncated() {
    // Peripheral declares 10 bytes but answers with a full 512-byte chunk.
    let chunk = hex::encode([0x5Au8; 512]).into_bytes();
    let peripheral = MockPeripheral::new(move |cmd| match cmd {
        "data_stats" => Some(b"short.bin,10".to_vec()),
        _ => Some(chunk.clone()),
    });
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert!(report.is_complete());
    assert_eq!(sinks.contents("short.bin").unwrap(), vec![0x5A; 10]);
    assert_eq!(link.transport().writes(), ["data_stats", "data_bytes,0"]);
}

#[test]
fn empty_file_needs_no_chunks() {
    let mut link = link(MockPeripheral::serving("empty.bin", Vec::new(), 512));
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert!(report.is_complete());
    assert_eq!(sinks.contents("empty.bin").unwrap(), Vec::<u8>::new());
    assert_eq!(link.transport().writes(), ["data_stats"]);
}

#[test]
fn malformed_stats_abort_before_any_chunk() {
    for reply in ["onlyonefield", "name,notanumber"] {
        let peripheral = MockPeripheral::new(move |_| Some(reply.as_bytes().to_vec()));
        let mut link = link(peripheral);
        let mut sinks = MemorySinks::default();

        let err = block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default()))
            .unwrap_err();

        assert_eq!(err, Error::Protocol("bad stats reply"));
        assert!(sinks.files.is_empty(), "no output for {reply:?}");
        assert_eq!(link.transport().writes(), ["data_stats"]);
    }
}

#[test]
fn silent_stats_is_no_response() {
    let mut link = link(MockPeripheral::new(|_| None));
    let mut sinks = MemorySinks::default();

    let err =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap_err();

    assert_eq!(err, Error::NoResponse);
    assert!(sinks.files.is_empty());
}

#[test]
fn memory_error_keeps_partial_file() {
    let data = pattern(2048);
    let mut serve = file_server("log.bin", data.clone(), 512);
    let peripheral = MockPeripheral::new(move |cmd| {
        if cmd == "data_bytes,1024" {
            Some(b"memory_error".to_vec())
        } else {
            serve(cmd)
        }
    });
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();
    let mut events = RecordingEvents::default();

    let report = block_on(driver().run(&mut link, &mut sinks, &mut events)).unwrap();

    assert_eq!(
        report.status,
        TransferStatus::Incomplete(Error::Peripheral("memory_error".into()))
    );
    assert_eq!(report.bytes_written, 1024);
    assert_eq!(sinks.contents("log.bin").unwrap(), data[..1024]);
    // The failed offset is not retried.
    assert_eq!(writes(&link.transport().log).len(), 4);
    assert!(matches!(
        events.0.last(),
        Some(LinkEvent::TransferAborted { written: 1024, total: 2048, .. })
    ));
}

#[test]
fn empty_chunk_reply_is_incomplete() {
    let mut serve = file_server("log.bin", pattern(1000), 512);
    let peripheral = MockPeripheral::new(move |cmd| {
        if cmd == "data_bytes,512" {
            Some(b"\r\n".to_vec())
        } else {
            serve(cmd)
        }
    });
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert_eq!(
        report.status,
        TransferStatus::Incomplete(Error::IncompleteTransfer {
            offset: 512,
            total: 1000
        })
    );
    assert_eq!(sinks.contents("log.bin").unwrap().len(), 512);
}

#[test]
fn chunk_timeout_is_incomplete() {
    let mut serve = file_server("log.bin", pattern(600), 512);
    let peripheral = MockPeripheral::new(move |cmd| {
        if cmd == "data_bytes,512" { None } else { serve(cmd) }
    });
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert_eq!(report.bytes_written, 512);
    assert!(matches!(
        report.status,
        TransferStatus::Incomplete(Error::IncompleteTransfer { offset: 512, .. })
    ));
}

#[test]
fn bad_hex_aborts() {
    let mut serve = file_server("log.bin", pattern(600), 512);
    let peripheral = MockPeripheral::new(move |cmd| {
        if cmd == "data_bytes,0" {
            Some(b"abc".to_vec())
        } else {
            serve(cmd)
        }
    });
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert_eq!(report.status, TransferStatus::Incomplete(Error::MalformedHex));
    assert_eq!(report.bytes_written, 0);
    assert_eq!(sinks.contents("log.bin").unwrap(), Vec::<u8>::new());
}

#[test]
fn peripheral_serving_less_than_declared_terminates() {
    // Stats claim 200 bytes but the file ends at 100: the next request gets
    // an empty hex line and the loop must stop rather than spin.
    let mut serve = file_server("log.bin", pattern(100), 64);
    let peripheral = MockPeripheral::new(move |cmd| match cmd {
        "data_stats" => Some(b"log.bin,200".to_vec()),
        _ => serve(cmd),
    });
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert_eq!(report.bytes_written, 100);
    assert_eq!(
        report.status,
        TransferStatus::Incomplete(Error::IncompleteTransfer {
            offset: 100,
            total: 200
        })
    );
    assert_eq!(
        link.transport().writes(),
        ["data_stats", "data_bytes,0", "data_bytes,64", "data_bytes,100"]
    );
}

#[test]
fn dead_link_fails_before_sink_is_opened() {
    // A fresh run restarts at the stats query, so a link that stopped
    // accepting writes fails there rather than producing a partial file.
    let mut link = link(MockPeripheral::serving("log.bin", pattern(1024), 512));
    let mut sinks = MemorySinks::default();
    let download = driver();

    let stats = block_on(download.query_stats(&mut link)).unwrap();
    assert_eq!(stats.total_bytes, 1024);

    let mut peripheral = link.into_transport();
    peripheral.fail_writes = true;
    let mut link = Correlator::new(
        peripheral,
        Characteristic::new("ctrl-rx"),
        Characteristic::new("ctrl-tx"),
    );
    block_on(link.subscribe()).unwrap();

    let err =
        block_on(download.run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap_err();
    assert_eq!(err, Error::Transport("write failed".into()));
    assert!(sinks.files.is_empty());
}

#[test]
fn transport_failure_mid_transfer_is_incomplete() {
    let mut peripheral = MockPeripheral::serving("log.bin", pattern(1024), 512);
    peripheral.fail_after = Some(2);
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert_eq!(report.bytes_written, 512);
    assert_eq!(
        report.status,
        TransferStatus::Incomplete(Error::Transport("write failed".into()))
    );
    assert_eq!(sinks.contents("log.bin").unwrap().len(), 512);
}

#[test]
fn filename_starting_with_error_is_downloaded() {
    let mut link = link(MockPeripheral::serving("errors_flight.bin", vec![1, 2, 3, 4], 512));
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.filename, "errors_flight.bin");
    assert_eq!(sinks.contents("errors_flight.bin").unwrap(), [1, 2, 3, 4]);
    assert_eq!(link.transport().writes(), ["data_stats", "data_bytes,0"]);
}

#[test]
fn invalid_utf8_chunk_is_incomplete() {
    let mut serve = file_server("log.bin", pattern(2048), 512);
    let peripheral = MockPeripheral::new(move |cmd| {
        if cmd == "data_bytes,512" {
            Some(vec![0xc3, 0x28])
        } else {
            serve(cmd)
        }
    });
    let mut link = link(peripheral);
    let mut sinks = MemorySinks::default();

    let report =
        block_on(driver().run(&mut link, &mut sinks, &mut RecordingEvents::default())).unwrap();

    assert_eq!(report.status, TransferStatus::Incomplete(Error::Encoding));
    assert_eq!(report.bytes_written, 512);
    assert_eq!(sinks.contents("log.bin").unwrap().len(), 512);
    assert_eq!(
        link.transport().writes(),
        ["data_stats", "data_bytes,0", "data_bytes,512"]
    );
}

#[test]
fn peripheral_error_on_stats() {
    let mut link = link(MockPeripheral::new(|_| Some(b"error: no file".to_vec())));
    let err = block_on(driver().query_stats(&mut link)).unwrap_err();
    assert_eq!(err, Error::Peripheral("error: no file".into()));
}
