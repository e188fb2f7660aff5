#![no_main]

use std::io::Read;
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use streamtap::{HashObserver, ObservedReader, Pipeline, SizeObserver, TapConfig};

fuzz_target!(|input: (u8, u8, Vec<u8>)| {
    let (buffer_size, read_size, data) = input;
    let buffer_size = usize::from(buffer_size).max(1);
    let read_size = usize::from(read_size).max(1);

    let size = Arc::new(SizeObserver::new());
    let sha = Arc::new(HashObserver::new("sha256"));
    let mut sink = Vec::new();
    let mut reader = ObservedReader::with_config(
        &data[..],
        Pipeline::new().with(size.clone()).with(sha.clone()),
        TapConfig::new(buffer_size).unwrap(),
    )
    .unwrap();

    let mut buf = vec![0u8; read_size];
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        assert!(n <= read_size);
        sink.extend_from_slice(&buf[..n]);
    }

    // Verify: every byte delivered once, in order
    assert_eq!(sink, data);
    assert_eq!(size.size(), data.len() as u64);

    // Verify: the digest does not depend on how the data was chunked
    let whole = HashObserver::new("sha256");
    streamtap::Observer::on_data(&whole, &data).unwrap();
    assert_eq!(sha.digest(), whole.digest());
});
