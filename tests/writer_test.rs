// Integration tests for the write engine
// Tests cover: buffering, sticky errors, close semantics, positional writes

mod common;

use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use common::{Failing, PanicWith, Panicking, Recorder, SharedSink, Sink};
use streamtap::{ObservedWriter, Pipeline, TapConfig, TapError, TappedWriter, Transfer};

fn recorded(sink: Sink) -> (ObservedWriter<Sink>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::new("rec"));
    let writer = ObservedWriter::new(sink, Pipeline::new().with(recorder.clone()));
    (writer, recorder)
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_write_flush_delivers_bytes() {
    let (mut writer, recorder) = recorded(Sink::default());

    writer.write_all(b"hello ").unwrap();
    writer.write_all(b"world").unwrap();
    assert!(writer.get_ref().data.is_empty(), "Small writes stay buffered");

    Write::flush(&mut writer).unwrap();
    assert_eq!(writer.get_ref().data, b"hello world");
    assert_eq!(writer.get_ref().writes, 1, "Buffered bytes go out in one write");
    assert_eq!(writer.get_ref().flushes, 1, "Flush reaches the sink");
    assert_eq!(recorder.chunks(), vec![b"hello ".to_vec(), b"world".to_vec()]);
}

#[test]
fn test_large_write_bypasses_buffer() {
    let (sink, recorder) = (Sink::default(), Arc::new(Recorder::new("rec")));
    let mut writer = ObservedWriter::with_config(
        sink,
        Pipeline::new().with(recorder.clone()),
        TapConfig::new(4).unwrap(),
    )
    .unwrap();

    assert_eq!(writer.write_chunk(b"0123456789"), Transfer { len: 10, error: None });
    assert_eq!(writer.buffered(), 0);
    assert_eq!(writer.get_ref().data, b"0123456789");
    assert_eq!(recorder.concat(), b"0123456789");
}

#[test]
fn test_zero_length_write_never_dispatches() {
    let (mut writer, recorder) = recorded(Sink::default());

    assert_eq!(writer.write_chunk(b""), Transfer { len: 0, error: None });
    writer.flush().unwrap();
    assert_eq!(recorder.calls(), 0);
    assert_eq!(writer.get_ref().writes, 0, "Nothing to push to the sink");
}

#[test]
fn test_drop_does_not_flush() {
    let sink = SharedSink::default();
    {
        let mut writer = ObservedWriter::new(sink.clone(), Pipeline::new().with(Recorder::new("rec")));
        writer.write_all(b"pending").unwrap();
    }
    assert!(sink.contents().is_empty(), "Dropping the engine must not write");
    assert_eq!(sink.writes(), 0);
}

#[test]
fn test_into_inner_discards_buffer() {
    let (mut writer, _) = recorded(Sink::default());
    writer.write_all(b"pending").unwrap();
    assert_eq!(writer.buffered(), 7);

    let sink = writer.into_inner();
    assert!(sink.data.is_empty());
}

// ============================================================================
// Sticky Error Tests
// ============================================================================

#[test]
fn test_observer_failure_accepts_bytes_then_sticks() {
    let failing = Arc::new(Failing::new("oops"));
    let mut writer = ObservedWriter::new(Sink::default(), Pipeline::new().with(failing.clone()));

    let first = writer.write_chunk(b"abc");
    assert_eq!(first.len, 3, "Accepted bytes are reported");
    let err = first.error.expect("observer failure should be reported");
    assert_eq!(err.to_string(), "oops");

    let second = writer.write_chunk(b"def");
    assert_eq!(second, Transfer { len: 0, error: Some(err.clone()) });
    assert_eq!(failing.calls(), 1, "Observers are not called after a failure");
    assert_eq!(writer.get_ref().writes, 0, "No sink I/O after a failure");

    assert_eq!(writer.flush(), Err(err.clone()));
    assert_eq!(writer.get_ref().writes, 0, "Flush does not touch the sink either");
    assert_eq!(writer.sticky_error(), Some(&err));
}

#[test]
fn test_io_trait_surfaces_failure_on_next_call() {
    let mut writer = ObservedWriter::new(Sink::default(), Pipeline::new().with(Failing::new("oops")));

    assert_eq!(writer.write(b"abc").unwrap(), 3);
    let err = writer.write(b"def").unwrap_err();
    assert_eq!(TapError::from_io(&err), writer.sticky_error());

    let err = writer.write_all(b"ghi").unwrap_err();
    assert_eq!(TapError::from_io(&err).map(ToString::to_string), Some("oops".to_string()));
}

#[test]
fn test_sink_failure_is_sticky() {
    let mut writer = ObservedWriter::with_config(
        Sink { fail_writes: true, ..Sink::default() },
        Pipeline::new().with(Recorder::new("rec")),
        TapConfig::new(4).unwrap(),
    )
    .unwrap();

    let first = writer.write_chunk(b"too large").error.unwrap();
    assert!(matches!(first, TapError::Io(_)));
    assert_eq!(first.to_string(), "sink failure");

    let second = writer.write_chunk(b"more data").error.unwrap();
    assert_eq!(first, second);
    assert_eq!(writer.get_ref().writes, 1);
}

#[test]
fn test_observer_retryable_error_is_sticky() {
    for kind in [ErrorKind::WouldBlock, ErrorKind::Interrupted] {
        let failing = Arc::new(Failing::with_kind(kind));
        let mut writer = ObservedWriter::new(Sink::default(), Pipeline::new().with(failing.clone()));

        assert_eq!(writer.write(b"abc").unwrap(), 3, "Accepted bytes are reported first");
        let err = writer.sticky_error().cloned().unwrap();
        assert_eq!(err.kind(), ErrorKind::Other);

        let io_err = writer.write_all(b"def").unwrap_err();
        assert_eq!(io_err.kind(), ErrorKind::Other, "write_all must not retry a rejection");
        assert_eq!(TapError::from_io(&io_err), Some(&err));
        assert_eq!(writer.flush(), Err(err));
        assert_eq!(failing.calls(), 1);
        assert_eq!(writer.get_ref().writes, 0);
    }
}

#[test]
fn test_panicking_observer_becomes_error() {
    let mut writer = ObservedWriter::new(
        Sink::default(),
        Pipeline::new().with(Panicking(PanicWith::Text("boom"))),
    );

    let t = writer.write_chunk(b"abc");
    assert_eq!(t.len, 3);
    let err = t.error.unwrap();
    assert_eq!(err.to_string(), "callback panic: boom");
    assert_eq!(writer.write_chunk(b"def").error, Some(err));
}

/// Sink that refuses writes until unblocked.
#[derive(Default)]
struct Blocking {
    blocked: bool,
    data: Vec<u8>,
}

impl Write for Blocking {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.blocked {
            return Err(io::Error::from(ErrorKind::WouldBlock));
        }
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_transient_sink_error_is_retried() {
    let mut writer = ObservedWriter::new(
        Blocking { blocked: true, ..Blocking::default() },
        Pipeline::new().with(Recorder::new("rec")),
    );
    writer.write_all(b"abc").unwrap();

    assert_eq!(writer.flush().unwrap_err().kind(), ErrorKind::WouldBlock);
    assert!(writer.sticky_error().is_none());
    assert_eq!(writer.buffered(), 3, "Unwritten bytes stay buffered");

    assert!(writer.write_chunk(b"def").is_ok(), "The engine stays usable");
    assert_eq!(writer.flush().unwrap_err().kind(), ErrorKind::WouldBlock);
    assert_eq!(writer.buffered(), 6);
    assert!(writer.get_ref().data.is_empty());
}

// ============================================================================
// Close Tests
// ============================================================================

#[test]
fn test_close_flushes_and_closes_once() {
    let (writer, _) = recorded(Sink::default());
    let mut writer = writer.with_close();
    assert!(writer.supports_close());

    writer.write_all(b"payload").unwrap();
    writer.close().unwrap();
    assert_eq!(writer.get_ref().data, b"payload");
    assert_eq!(writer.get_ref().closes, 1);

    writer.close().unwrap();
    writer.close().unwrap();
    assert_eq!(writer.get_ref().closes, 1, "Only the first close reaches the sink");
    assert_eq!(writer.get_ref().flushes, 1);
}

#[test]
fn test_close_without_capability_only_flushes() {
    let (mut writer, _) = recorded(Sink::default());
    assert!(!writer.supports_close());

    writer.write_all(b"abc").unwrap();
    writer.close().unwrap();
    assert_eq!(writer.get_ref().data, b"abc");
    assert_eq!(writer.get_ref().closes, 0);
}

#[test]
fn test_flush_failure_skips_sink_close() {
    let (writer, _) = recorded(Sink { fail_writes: true, ..Sink::default() });
    let mut writer = writer.with_close();

    writer.write_all(b"abc").unwrap();
    let err = writer.close().unwrap_err();
    assert_eq!(err.to_string(), "sink failure");
    assert_eq!(writer.get_ref().closes, 0, "A failed flush leaves the sink open");
    assert_eq!(writer.sticky_error(), Some(&err));

    assert_eq!(writer.close(), Ok(()), "Later closes are no-ops");
}

#[test]
fn test_close_failure_is_reported() {
    let (writer, _) = recorded(Sink { fail_close: true, ..Sink::default() });
    let mut writer = writer.with_close();

    writer.write_all(b"abc").unwrap();
    let err = writer.close().unwrap_err();
    assert_eq!(err.to_string(), "close failure");
    assert_eq!(writer.get_ref().data, b"abc", "Flush happened before close");
    assert_eq!(writer.get_ref().closes, 1);
    assert_eq!(writer.close(), Ok(()));
}

#[test]
fn test_write_after_close() {
    let (mut writer, recorder) = recorded(Sink::default());
    writer.close().unwrap();

    assert_eq!(writer.write_chunk(b"late"), Transfer { len: 0, error: Some(TapError::Closed) });
    assert_eq!(writer.write(b"late").unwrap_err().kind(), ErrorKind::Other);
    assert_eq!(writer.flush(), Err(TapError::Closed));
    assert_eq!(recorder.calls(), 0);
}

#[test]
fn test_sticky_error_wins_over_closed() {
    let mut writer = ObservedWriter::new(Sink::default(), Pipeline::new().with(Failing::new("oops")));

    let err = writer.write_chunk(b"abc").error.unwrap();
    assert_eq!(writer.close(), Err(err.clone()), "Close reports the sticky error");
    assert!(writer.is_closed());
    assert_eq!(writer.write_chunk(b"def").error, Some(err));
    assert_eq!(writer.get_ref().writes, 0);
}

#[test]
fn test_closed_state_visible_through_shared_reference() {
    let (mut writer, _) = recorded(Sink::default());
    writer.close().unwrap();

    let writer = &writer;
    std::thread::scope(|s| {
        s.spawn(|| assert!(writer.is_closed()));
    });
}

#[test]
fn test_close_through_trait() {
    use streamtap::Close;

    let (writer, _) = recorded(Sink::default());
    let mut writer = writer.with_close();
    writer.write_all(b"abc").unwrap();
    Close::close(&mut writer).unwrap();
    assert_eq!(writer.get_ref().closes, 1);
}

// ============================================================================
// Positional Write Tests
// ============================================================================

#[test]
fn test_write_at_unsupported_is_not_sticky() {
    let (mut writer, recorder) = recorded(Sink::default());

    let t = writer.write_chunk_at(b"abc", 0);
    assert_eq!(t, Transfer { len: 0, error: Some(TapError::Unsupported("write_at")) });
    assert!(writer.sticky_error().is_none());
    assert_eq!(recorder.calls(), 0);

    writer.write_all(b"abc").unwrap();
    writer.flush().unwrap();
    assert_eq!(writer.get_ref().data, b"abc");
}

#[test]
fn test_write_at_goes_straight_to_sink() {
    let (writer, recorder) = recorded(Sink::default());
    let mut writer = writer.with_write_at();

    assert_eq!(writer.write_chunk_at(b"xyz", 2), Transfer { len: 3, error: None });
    assert_eq!(writer.get_ref().data, b"\0\0xyz");
    assert_eq!(recorder.concat(), b"xyz");
}

#[test]
fn test_write_at_trait_surfaces_sticky_failure() {
    use streamtap::WriteAt;

    let failing = Arc::new(Failing::new("oops"));
    let mut writer =
        ObservedWriter::new(Sink::default(), Pipeline::new().with(failing.clone())).with_write_at();

    assert_eq!(writer.write_at(b"abc", 0).unwrap(), 3, "Written bytes are reported first");
    assert_eq!(writer.get_ref().data, b"abc");

    let err = writer.write_at(b"def", 3).unwrap_err();
    let tap = TapError::from_io(&err).unwrap();
    assert_eq!(Some(tap), writer.sticky_error());
    assert_eq!(tap.to_string(), "oops");
    assert_eq!(writer.get_ref().writes, 1, "The sink is not written after the rejection");

    assert!(writer.write(b"ghi").is_err(), "Sequential writes share the sticky error");
    assert_eq!(failing.calls(), 1);
}

#[test]
fn test_write_at_on_file() {
    use streamtap::WriteAt;

    let file = tempfile::tempfile().unwrap();
    let recorder = Arc::new(Recorder::new("rec"));
    let mut writer = streamtap::writer_at(file, Pipeline::new().with(recorder.clone()));

    assert_eq!(writer.write_at(b"tail", 4).unwrap(), 4);
    assert_eq!(writer.write_at(b"head", 0).unwrap(), 4);

    let mut file = writer.into_inner();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();
    assert_eq!(contents, "headtail");
    assert_eq!(recorder.concat(), b"tailhead");
}

// ============================================================================
// Facade Tests
// ============================================================================

#[test]
fn test_empty_pipeline_returns_same_sink() {
    let mut sink = Sink::default();
    let addr: *const Sink = &sink;

    match streamtap::writer(&mut sink, Pipeline::new()) {
        TappedWriter::Passthrough(inner) => assert!(std::ptr::eq(&*inner, addr)),
        TappedWriter::Observed(_) => panic!("empty pipeline must not wrap"),
    }
}

#[test]
fn test_facade_observes_with_pipeline() {
    let recorder = Arc::new(Recorder::new("rec"));
    let mut tapped = streamtap::writer(Vec::new(), Pipeline::new().with(recorder.clone()));
    assert!(tapped.is_observed());

    tapped.write_all(b"abc").unwrap();
    tapped.flush().unwrap();
    assert_eq!(tapped.get_ref(), b"abc");
    assert_eq!(recorder.concat(), b"abc");
}

#[test]
fn test_facade_close_reaches_sink() {
    let recorder = Arc::new(Recorder::new("rec"));
    let mut tapped = streamtap::writer(Sink::default(), Pipeline::new().with(recorder.clone()));

    tapped.write_all(b"abc").unwrap();
    tapped.close().unwrap();
    assert_eq!(tapped.get_ref().data, b"abc", "Buffered bytes are flushed first");
    assert_eq!(tapped.get_ref().closes, 1);

    tapped.close().unwrap();
    assert_eq!(tapped.get_ref().closes, 1, "An engine closes the sink once");
    assert_eq!(tapped.write(b"late").unwrap_err().kind(), ErrorKind::Other);
}

#[test]
fn test_facade_close_passthrough() {
    let mut tapped = streamtap::writer(Sink::default(), Pipeline::new());
    assert!(!tapped.is_observed());

    tapped.write_all(b"abc").unwrap();
    streamtap::Close::close(&mut tapped).unwrap();
    assert_eq!(tapped.get_ref().closes, 1);

    let mut failing = streamtap::writer(Sink { fail_close: true, ..Sink::default() }, Pipeline::new());
    let err = failing.close().unwrap_err();
    assert_eq!(err.to_string(), "close failure");
}
