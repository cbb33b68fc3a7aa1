//! Splitting streamed replies into reasoning and answer views.
//!
//! Models served through the completion endpoint interleave intermediate
//! reasoning into the reply, delimited by `<think>`/`</think>` markers. This
//! module derives three views over a raw reply buffer: the answer text with
//! every reasoning span removed, the reasoning text itself, and whether the
//! buffer currently ends inside an unterminated reasoning span.
//!
//! [`split_thinking`] is the reference implementation: pure, deterministic,
//! and recomputed from the full buffer each call. [`ThinkingScanner`] derives
//! the same views incrementally, paying only for each appended chunk instead
//! of rescanning the whole buffer per chunk; the two agree on every prefix of
//! every buffer.
//!
//! Markers are matched flat and first-come: a `</think>` with no open span is
//! ordinary answer text, and a `<think>` inside an open span is ordinary
//! reasoning content. Nested spans are not recognized.

/// Start marker of a reasoning span.
pub const THINK_OPEN: &str = "<think>";

/// End marker of a reasoning span.
pub const THINK_CLOSE: &str = "</think>";

/// Derived views over a raw reply buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingSplit {
    /// The reply with every reasoning span (markers included) removed.
    pub answer: String,

    /// All reasoning spans, trimmed and joined by blank lines. `None` when
    /// the buffer contains no start marker at all.
    pub thinking: Option<String>,

    /// True when the buffer ends inside an unterminated reasoning span.
    pub is_open: bool,
}

impl ThinkingSplit {
    /// The reasoning text, or empty when there is none.
    pub fn thinking_text(&self) -> &str {
        self.thinking.as_deref().unwrap_or("")
    }
}

/// Splits a raw reply buffer into its answer and reasoning views.
///
/// Pure and deterministic: the same buffer always produces the same split,
/// and no characters are dropped beyond the markers themselves and the
/// trimming of reasoning spans.
pub fn split_thinking(raw: &str) -> ThinkingSplit {
    let mut answer = String::new();
    let mut segments: Vec<&str> = Vec::new();
    let mut seen_marker = false;
    let mut is_open = false;

    let mut rest = raw;
    loop {
        match rest.find(THINK_OPEN) {
            None => {
                answer.push_str(rest);
                break;
            }
            Some(start) => {
                seen_marker = true;
                answer.push_str(&rest[..start]);
                let inner = &rest[start + THINK_OPEN.len()..];
                match inner.find(THINK_CLOSE) {
                    Some(end) => {
                        let segment = inner[..end].trim();
                        if !segment.is_empty() {
                            segments.push(segment);
                        }
                        rest = &inner[end + THINK_CLOSE.len()..];
                    }
                    None => {
                        // Unterminated span: the tail is in-progress reasoning.
                        let segment = inner.trim();
                        if !segment.is_empty() {
                            segments.push(segment);
                        }
                        is_open = true;
                        break;
                    }
                }
            }
        }
    }

    let thinking = seen_marker.then(|| segments.join("\n\n"));
    ThinkingSplit {
        answer,
        thinking,
        is_open,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    Inside,
}

/// Incremental counterpart of [`split_thinking`].
///
/// Chunks are appended with [`push`](Self::push); [`view`](Self::view)
/// produces the current split. A marker arriving split across chunks is held
/// back in a small carry buffer until it can be disambiguated, so the cost of
/// a push is proportional to the chunk, not to everything streamed so far.
///
/// [`committed`](Self::committed) exposes the stable portion of the views,
/// the text that cannot be retracted by a later chunk completing a marker,
/// which is what an incremental renderer should print. Call
/// [`finish`](Self::finish) once the stream ends to fold any held-back marker
/// prefix into the views as literal text.
#[derive(Debug, Clone)]
pub struct ThinkingScanner {
    state: ScanState,
    answer: String,
    thinking: String,
    segment: String,
    carry: String,
    seen_marker: bool,
}

impl ThinkingScanner {
    /// Creates an empty scanner.
    pub fn new() -> Self {
        Self {
            state: ScanState::Outside,
            answer: String::new(),
            thinking: String::new(),
            segment: String::new(),
            carry: String::new(),
            seen_marker: false,
        }
    }

    /// Appends a chunk of raw reply text.
    pub fn push(&mut self, chunk: &str) {
        let mut work = std::mem::take(&mut self.carry);
        work.push_str(chunk);
        let mut rest = work.as_str();

        loop {
            match self.state {
                ScanState::Outside => match rest.find(THINK_OPEN) {
                    Some(at) => {
                        self.answer.push_str(&rest[..at]);
                        rest = &rest[at + THINK_OPEN.len()..];
                        self.state = ScanState::Inside;
                        self.seen_marker = true;
                    }
                    None => {
                        let keep = marker_prefix_overlap(rest, THINK_OPEN);
                        let cut = rest.len() - keep;
                        self.answer.push_str(&rest[..cut]);
                        self.carry = rest[cut..].to_string();
                        break;
                    }
                },
                ScanState::Inside => match rest.find(THINK_CLOSE) {
                    Some(at) => {
                        self.segment.push_str(&rest[..at]);
                        self.close_segment();
                        rest = &rest[at + THINK_CLOSE.len()..];
                        self.state = ScanState::Outside;
                    }
                    None => {
                        let keep = marker_prefix_overlap(rest, THINK_CLOSE);
                        let cut = rest.len() - keep;
                        self.segment.push_str(&rest[..cut]);
                        self.carry = rest[cut..].to_string();
                        break;
                    }
                },
            }
        }
    }

    /// Folds any held-back marker prefix into the views as literal text.
    ///
    /// Once the stream has ended, a partial marker at the tail can never be
    /// completed, so it counts as plain content of whichever view the scanner
    /// is currently in.
    pub fn finish(&mut self) {
        let carry = std::mem::take(&mut self.carry);
        match self.state {
            ScanState::Outside => self.answer.push_str(&carry),
            ScanState::Inside => self.segment.push_str(&carry),
        }
    }

    /// The current split, treating any held-back tail as literal text.
    ///
    /// For any sequence of pushes, this equals
    /// `split_thinking(concatenation of all pushed chunks)`.
    pub fn view(&self) -> ThinkingSplit {
        self.assemble(true)
    }

    /// The stable split: everything except text still held back because it
    /// may turn out to be the start of a marker.
    pub fn committed(&self) -> ThinkingSplit {
        self.assemble(false)
    }

    /// True when the scanner is currently inside a reasoning span.
    pub fn is_open(&self) -> bool {
        self.state == ScanState::Inside
    }

    fn close_segment(&mut self) {
        let segment = self.segment.trim();
        if !segment.is_empty() {
            if !self.thinking.is_empty() {
                self.thinking.push_str("\n\n");
            }
            self.thinking.push_str(segment);
        }
        self.segment.clear();
    }

    fn assemble(&self, include_carry: bool) -> ThinkingSplit {
        match self.state {
            ScanState::Outside => {
                let mut answer = self.answer.clone();
                if include_carry {
                    answer.push_str(&self.carry);
                }
                ThinkingSplit {
                    answer,
                    thinking: self.seen_marker.then(|| self.thinking.clone()),
                    is_open: false,
                }
            }
            ScanState::Inside => {
                let mut open = self.segment.clone();
                if include_carry {
                    open.push_str(&self.carry);
                }
                let open = open.trim();
                let mut thinking = self.thinking.clone();
                if !open.is_empty() {
                    if !thinking.is_empty() {
                        thinking.push_str("\n\n");
                    }
                    thinking.push_str(open);
                }
                ThinkingSplit {
                    answer: self.answer.clone(),
                    thinking: Some(thinking),
                    is_open: true,
                }
            }
        }
    }
}

impl Default for ThinkingScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the longest suffix of `text` that is a proper prefix of
/// `marker`. Both markers are ASCII, so the returned length always falls on a
/// character boundary of `text`.
fn marker_prefix_overlap(text: &str, marker: &str) -> usize {
    let max = marker.len().saturating_sub(1).min(text.len());
    for len in (1..=max).rev() {
        if text.ends_with(&marker[..len]) {
            return len;
        }
    }
    0
}
