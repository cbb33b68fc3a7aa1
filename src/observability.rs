use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("achuan.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("achuan.client.request_errors");

pub(crate) static STREAM_STARTS: Counter = Counter::new("achuan.stream.starts");
pub(crate) static STREAM_FRAMES: Counter = Counter::new("achuan.stream.frames");
pub(crate) static STREAM_CHUNKS: Counter = Counter::new("achuan.stream.text_chunks");
pub(crate) static STREAM_SKIPPED_LINES: Counter = Counter::new("achuan.stream.skipped_lines");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("achuan.stream.errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_STARTS);
    collector.register_counter(&STREAM_FRAMES);
    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_SKIPPED_LINES);
    collector.register_counter(&STREAM_ERRORS);
}
