use super::cancel::CancelToken;
use super::framer::LineFramer;
use super::record::{self, LineKind, Record};
use futures::{Stream, StreamExt};
use std::fmt::Display;

/// Receiver of reassembled output.
pub trait DeltaSink {
    /// Called synchronously, in arrival order, once per non-empty delta.
    fn on_delta(&mut self, delta: &str);
    /// Called exactly once when reading ends, however it ends.
    fn on_done(&mut self);
}

/// Adapts a pair of closures to `DeltaSink`.
pub struct Callbacks<D, F>
where
    D: FnMut(&str),
    F: FnOnce(),
{
    on_delta: D,
    on_done: Option<F>,
}

impl<D, F> Callbacks<D, F>
where
    D: FnMut(&str),
    F: FnOnce(),
{
    pub fn new(on_delta: D, on_done: F) -> Self {
        Self {
            on_delta,
            on_done: Some(on_done),
        }
    }
}

impl<D, F> DeltaSink for Callbacks<D, F>
where
    D: FnMut(&str),
    F: FnOnce(),
{
    fn on_delta(&mut self, delta: &str) {
        (self.on_delta)(delta)
    }

    fn on_done(&mut self) {
        if let Some(done) = self.on_done.take() {
            done()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// `[DONE]` was received.
    Done,
    /// The input ended without a sentinel.
    Closed,
    /// A read failed; everything delivered before it stands.
    Interrupted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub outcome: StreamOutcome,
    pub deltas: usize,
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    /// Record did not parse; wait for more bytes before going further.
    Held,
    Done,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Progress {
    NeedMore,
    Done,
    Cancelled,
}

/// Push-style decoder: feed byte chunks, get deltas delivered to a sink.
///
/// A complete `data:` line whose JSON does not parse becomes the held
/// record. Lines that follow it without a record prefix are treated as its
/// continuation; the next record boundary discards it as malformed.
#[derive(Debug, Default)]
pub struct Reassembler {
    framer: LineFramer,
    held: Option<String>,
    flushing: bool,
    delivered: usize,
}

impl Reassembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn feed<S: DeltaSink>(
        &mut self,
        chunk: &[u8],
        sink: &mut S,
        cancel: &CancelToken,
    ) -> Progress {
        self.framer.push(chunk);

        while let Some(line) = self.framer.next_line() {
            match self.accept(&line, sink) {
                Step::Continue => {}
                Step::Held => return Progress::NeedMore,
                Step::Done => return Progress::Done,
            }
            if cancel.is_cancelled() {
                return Progress::Cancelled;
            }
        }
        Progress::NeedMore
    }

    /// Best-effort parse of whatever is still buffered once input has ended.
    /// Returns true when the sentinel was among it.
    pub fn finish<S: DeltaSink>(&mut self, sink: &mut S) -> bool {
        self.flushing = true;

        while let Some(line) = self.framer.next_line() {
            if self.accept(&line, sink) == Step::Done {
                return true;
            }
        }
        if let Some(tail) = self.framer.take_tail() {
            if self.accept(&tail, sink) == Step::Done {
                return true;
            }
        }
        if let Some(held) = self.held.take() {
            tracing::debug!(record = %held, "Dropping malformed trailing record");
        }
        false
    }

    fn accept<S: DeltaSink>(&mut self, line: &str, sink: &mut S) -> Step {
        let kind = record::classify(line);

        if let Some(held) = self.held.take() {
            if let LineKind::Other(continuation) = kind {
                let joined = format!("{}\n{}", held, continuation);
                return self.decode(joined, sink);
            }
            tracing::debug!(record = %held, "Dropping malformed stream record");
        }

        match kind {
            LineKind::Data(payload) => self.decode(payload.to_string(), sink),
            LineKind::Blank | LineKind::Comment | LineKind::Other(_) => Step::Continue,
        }
    }

    fn decode<S: DeltaSink>(&mut self, payload: String, sink: &mut S) -> Step {
        match record::decode(&payload) {
            Ok(Record::Done) => Step::Done,
            Ok(Record::Delta(text)) => {
                self.delivered += 1;
                sink.on_delta(&text);
                Step::Continue
            }
            Ok(Record::Empty) => Step::Continue,
            Err(_) if self.flushing => {
                tracing::debug!(record = %payload, "Dropping malformed trailing record");
                Step::Continue
            }
            Err(_) => {
                self.held = Some(payload);
                Step::Held
            }
        }
    }
}

/// Drive `stream` to completion, delivering deltas to `sink`.
///
/// Read errors and cancellation end the loop without an error; `on_done`
/// is invoked exactly once before returning and the stream is dropped.
pub async fn reassemble<St, B, E, S>(stream: St, sink: &mut S, cancel: &CancelToken) -> StreamSummary
where
    St: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
    S: DeltaSink,
{
    let mut reassembler = Reassembler::new();
    let outcome = {
        futures::pin_mut!(stream);
        loop {
            if cancel.is_cancelled() {
                break StreamOutcome::Cancelled;
            }

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break StreamOutcome::Cancelled,
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => match reassembler.feed(chunk.as_ref(), sink, cancel) {
                    Progress::NeedMore => continue,
                    Progress::Done => break StreamOutcome::Done,
                    Progress::Cancelled => break StreamOutcome::Cancelled,
                },
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "Stream read failed, ending stream");
                    reassembler.finish(sink);
                    break StreamOutcome::Interrupted;
                }
                None => {
                    break if reassembler.finish(sink) {
                        StreamOutcome::Done
                    } else {
                        StreamOutcome::Closed
                    };
                }
            }
        }
    };

    sink.on_done();

    StreamSummary {
        outcome,
        deltas: reassembler.delivered(),
    }
}
