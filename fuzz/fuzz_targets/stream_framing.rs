//! Fuzz target for the length-prefixed stream framing used over QUIC
//! streams.
//!
//! Feeds arbitrary bytes to `read_framed` as if they came straight off the
//! wire. A malicious or truncated length prefix must produce an error, not
//! a panic or an unbounded allocation.

#![no_main]

use std::io::Cursor;

use framecore_transport::framing::read_framed;
use libfuzzer_sys::fuzz_target;

const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

fuzz_target!(|data: &[u8]| {
    let rt = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
    rt.block_on(async {
        let mut cursor = Cursor::new(data);
        let _ = read_framed(&mut cursor, MAX_FRAME_BYTES).await;
    });
});
