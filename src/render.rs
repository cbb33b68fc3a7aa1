//! Output rendering for streamed chat responses.
//!
//! This module provides the renderer trait and a plain-text implementation
//! used by the terminal binaries.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// ANSI escape code for dim text (used for reasoning output).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for italic text (used for reasoning output).
const ANSI_ITALIC: &str = "\x1b[3m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Trait for rendering streaming output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Alternative front-ends that want the same event surface
pub trait Renderer: Send {
    /// Print a chunk of answer text.
    ///
    /// Called incrementally as tokens are streamed from the API.
    fn print_text(&mut self, text: &str);

    /// Print a chunk of reasoning text.
    ///
    /// Reasoning output is displayed differently (dim/italic) to distinguish
    /// it from the answer.
    fn print_thinking(&mut self, text: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when a response is complete.
    ///
    /// Used to ensure proper newlines and cleanup after streaming.
    fn finish_response(&mut self);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self) {}

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// Outputs directly to stdout, styling reasoning chunks dim and italic when
/// color is enabled and prefixing them with a `[thinking]` tag when it is
/// not.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    in_thinking: bool,
    show_thinking: bool,
    interrupted: Option<Arc<AtomicBool>>,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            use_color: true,
            in_thinking: false,
            show_thinking: true,
            interrupted: None,
        }
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            use_color,
            ..Self::new()
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Controls whether reasoning output is printed at all.
    pub fn set_show_thinking(&mut self, show: bool) {
        self.show_thinking = show;
    }

    /// Flushes stdout to ensure immediate display of streamed content.
    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn reset_thinking(&mut self) {
        if self.in_thinking {
            if self.use_color {
                print!("{ANSI_RESET}");
            }
            println!();
            self.in_thinking = false;
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_text(&mut self, text: &str) {
        self.reset_thinking();
        print!("{text}");
        self.flush();
    }

    fn print_thinking(&mut self, text: &str) {
        if !self.show_thinking {
            return;
        }
        if !self.in_thinking {
            if self.use_color {
                print!("{ANSI_DIM}{ANSI_ITALIC}");
            } else {
                print!("[thinking] ");
            }
            self.in_thinking = true;
        }
        print!("{text}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        self.reset_thinking();
        eprintln!("\nError: {error}");
    }

    fn print_info(&mut self, info: &str) {
        self.reset_thinking();
        println!("{info}");
        self.flush();
    }

    fn finish_response(&mut self) {
        self.reset_thinking();
        println!();
        self.flush();
    }

    fn print_interrupted(&mut self) {
        self.reset_thinking();
        println!("\n[interrupted]");
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
        assert!(renderer.show_thinking);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn interrupt_flag_is_observed() {
        let flag = Arc::new(AtomicBool::new(false));
        let renderer = PlainTextRenderer::new().with_interrupt(flag.clone());
        assert!(!renderer.should_interrupt());
        flag.store(true, Ordering::Relaxed);
        assert!(renderer.should_interrupt());
    }
}
