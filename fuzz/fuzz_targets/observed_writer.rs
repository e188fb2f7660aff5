#![no_main]

use std::io::Write;
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use streamtap::{ObservedWriter, Pipeline, SizeObserver, TapConfig};

fuzz_target!(|input: (u8, Vec<u16>, Vec<u8>)| {
    let (buffer_size, cuts, data) = input;
    let buffer_size = usize::from(buffer_size).max(1);

    let size = Arc::new(SizeObserver::new());
    let mut writer = ObservedWriter::with_config(
        Vec::new(),
        Pipeline::new().with(size.clone()),
        TapConfig::new(buffer_size).unwrap(),
    )
    .unwrap();

    // Split the input at arbitrary points
    let mut rest = &data[..];
    for cut in cuts {
        if rest.is_empty() {
            break;
        }
        let take = usize::from(cut) % (rest.len() + 1);
        writer.write_all(&rest[..take]).unwrap();
        rest = &rest[take..];
    }
    writer.write_all(rest).unwrap();
    writer.close().unwrap();

    // Verify: the sink and the observer saw every byte
    assert_eq!(writer.get_ref(), &data);
    assert_eq!(size.size(), data.len() as u64);
    assert_eq!(writer.buffered(), 0);

    // Verify: a closed writer refuses more data
    assert!(writer.write(b"x").is_err());
});
