//! Fuzz target: notification payload decoding
//!
//! Feeds arbitrary bytes through the same path a chunk or stats reply
//! takes: UTF-8 decode and trim, error classification, hex decode and
//! stats parsing. None of it may panic.
//!
//! cargo fuzz run fuzz_reply_decoder

#![no_main]

use beanlink::rpc::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = codec::decode_text(data) else {
        return;
    };
    assert_eq!(text.trim(), text);

    if codec::is_error_reply(&text) {
        return;
    }

    if let Ok(bytes) = codec::decode_hex(&text) {
        assert_eq!(bytes.len() * 2, text.len());
    }

    if let Ok(stats) = codec::parse_stats(&text) {
        assert!(!stats.filename.is_empty());
        assert!(!stats.filename.contains(['/', '\\']));
    }
});
