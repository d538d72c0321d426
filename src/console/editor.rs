//! Line editor state machine.
//!
//! Fed one received byte at a time. Printable bytes accumulate into the
//! line buffer (with local echo), control bytes edit or abort the line,
//! `CR` commits it to the line callback.
//!
//! | Byte            | Action                                             |
//! |-----------------|----------------------------------------------------|
//! | `CR`            | commit line, or report a pending receive error     |
//! | `DEL`, `BS`     | erase last character (echo on only)                |
//! | `^R`            | turn echo back on                                  |
//! | `^C`            | abort line, print `<ETX>`                          |
//! | `ESC`, `0x9B`   | stored and echoed as `^`                           |
//! | `FF`            | clear screen and redraw the line (echo on only)    |
//! | other control   | abort line, "input not 7-bit ASCII"                |
//! | printable       | append, or abort with "exceeded max line length"   |

use crate::config::InputConfig;
use crate::output::{TermOut, CLEAR_SCREEN};

use super::line_buffer::LineBuffer;

/// Echo sequence that erases the character left of the cursor.
pub const ERASE: &str = "\x08 \x08";

const CR: u8 = b'\r';
const BS: u8 = 0x08;
const DEL: u8 = 0x7F;
const CTRL_C: u8 = 0x03;
const CTRL_R: u8 = 0x12;
const FF: u8 = 0x0C;
const ESC: u8 = 0x1B;
const CSI: u8 = 0x9B;

/// Callback receiving each committed line.
pub type LineFn = Box<dyn FnMut(&str) + Send>;

/// Where the editor sends echo and diagnostics.
pub trait EchoSink {
    fn put(&mut self, text: &str);
}

impl EchoSink for &TermOut {
    fn put(&mut self, text: &str) {
        let _ = self.add_str(text);
    }
}

/// Receive-error tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorState {
    /// No receive error since the last line end.
    Accumulating,
    /// The receiver reported a fault; reported at the next `CR`.
    ErrorPending,
}

/// Byte-driven line editor.
pub struct LineEditor {
    line: LineBuffer,
    echo: bool,
    state: EditorState,
    on_line: Option<LineFn>,
}

impl LineEditor {
    pub fn new(config: &InputConfig, on_line: Option<LineFn>) -> Self {
        Self {
            line: LineBuffer::new(config.max_row_len),
            echo: config.echo_on_start,
            state: EditorState::Accumulating,
            on_line,
        }
    }

    pub fn echo_enabled(&self) -> bool {
        self.echo
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Current (uncommitted) line.
    pub fn line(&self) -> &str {
        self.line.as_str()
    }

    pub fn pos(&self) -> usize {
        self.line.len()
    }

    /// Line buffer backing store, for checking it was wiped.
    pub fn raw_line(&self) -> &[u8] {
        self.line.raw()
    }

    /// The byte source reported a framing/line error.
    pub fn receive_fault(&mut self) {
        self.state = EditorState::ErrorPending;
    }

    /// Drop the line and any pending receive error.
    fn abort(&mut self) {
        self.state = EditorState::Accumulating;
        self.line.clear();
    }

    /// Diagnostic on its own row: after echoed input, start a new one first.
    fn report(&self, sink: &mut dyn EchoSink, msg: &str) {
        if self.echo {
            sink.put("\r\n");
        }
        sink.put(msg);
    }

    /// Process a single received byte.
    pub fn process_byte(&mut self, byte: u8, sink: &mut dyn EchoSink) {
        let byte = match byte {
            CR => {
                self.commit(sink);
                return;
            }
            DEL | BS => {
                if self.echo && self.line.backspace() {
                    sink.put(ERASE);
                }
                return;
            }
            CTRL_R => {
                if !self.echo {
                    self.echo = true;
                    self.abort();
                    sink.put("echo on\n");
                }
                return;
            }
            CTRL_C => {
                self.abort();
                sink.put("<ETX>\n");
                return;
            }
            ESC | CSI => b'^',
            FF => {
                if self.echo {
                    sink.put(CLEAR_SCREEN);
                    if !self.line.is_empty() {
                        sink.put(self.line.as_str());
                    }
                }
                return;
            }
            0x20..=0x7E => byte,
            _ => {
                self.abort();
                self.report(sink, "input not 7-bit ASCII\n");
                return;
            }
        };

        if self.line.push(byte) {
            if self.echo {
                let c = [byte];
                // Printable ASCII, always valid UTF-8
                sink.put(core::str::from_utf8(&c).unwrap_or("^"));
            }
        } else {
            self.abort();
            self.report(sink, "exceeded max line length\n");
        }
    }

    fn commit(&mut self, sink: &mut dyn EchoSink) {
        match self.state {
            EditorState::ErrorPending => {
                self.report(sink, "serial line error\n");
                self.state = EditorState::Accumulating;
            }
            EditorState::Accumulating => {
                if self.echo {
                    sink.put("\n");
                }
                if let Some(on_line) = self.on_line.as_mut() {
                    on_line(self.line.as_str());
                }
            }
        }
        self.line.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    impl EchoSink for Vec<String> {
        fn put(&mut self, text: &str) {
            self.push(text.to_string());
        }
    }

    fn config(max: usize, echo: bool) -> InputConfig {
        InputConfig {
            max_row_len: max,
            echo_on_start: echo,
            ..InputConfig::default()
        }
    }

    fn editor_with_lines(max: usize, echo: bool) -> (LineEditor, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let editor = LineEditor::new(
            &config(max, echo),
            Some(Box::new(move |l: &str| sink.lock().unwrap().push(l.to_string()))),
        );
        (editor, lines)
    }

    fn feed(editor: &mut LineEditor, bytes: &[u8]) -> Vec<String> {
        let mut echo = Vec::new();
        for &b in bytes {
            editor.process_byte(b, &mut echo);
        }
        echo
    }

    #[test]
    fn test_edit_and_commit() {
        let (mut ed, lines) = editor_with_lines(16, true);
        let echo = feed(&mut ed, &[b'h', b'i', DEL, b'i', CR]);

        assert_eq!(*lines.lock().unwrap(), ["hi"]);
        assert_eq!(echo, ["h", "i", ERASE, "i", "\n"]);
        assert_eq!(ed.pos(), 0);
    }

    #[test]
    fn test_empty_line_still_committed() {
        let (mut ed, lines) = editor_with_lines(16, true);
        feed(&mut ed, &[CR]);
        assert_eq!(*lines.lock().unwrap(), [""]);
    }

    #[test]
    fn test_backspace_ignored_without_echo() {
        let (mut ed, lines) = editor_with_lines(16, false);
        let echo = feed(&mut ed, &[b'a', b'b', BS, CR]);

        assert!(echo.is_empty());
        assert_eq!(*lines.lock().unwrap(), ["ab"]);
    }

    #[test]
    fn test_non_ascii_aborts() {
        let (mut ed, lines) = editor_with_lines(16, true);
        let echo = feed(&mut ed, &[b'a', 0x01]);

        assert_eq!(ed.pos(), 0);
        assert!(ed.raw_line().iter().all(|&b| b == 0));
        assert_eq!(echo, ["a", "\r\n", "input not 7-bit ASCII\n"]);
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn test_high_byte_aborts_without_echo_prefix() {
        let (mut ed, _) = editor_with_lines(16, false);
        let echo = feed(&mut ed, &[0x80]);
        assert_eq!(echo, ["input not 7-bit ASCII\n"]);
    }

    #[test]
    fn test_escape_becomes_caret() {
        let (mut ed, lines) = editor_with_lines(16, true);
        let echo = feed(&mut ed, &[ESC, b'x', CSI, CR]);

        assert_eq!(echo, ["^", "x", "^", "\n"]);
        assert_eq!(*lines.lock().unwrap(), ["^x^"]);
    }

    #[test]
    fn test_overflow_aborts_line() {
        let (mut ed, lines) = editor_with_lines(3, true);
        let echo = feed(&mut ed, b"abcd");

        assert_eq!(ed.pos(), 0);
        assert_eq!(echo[3..], ["\r\n", "exceeded max line length\n"]);

        feed(&mut ed, &[CR]);
        assert_eq!(*lines.lock().unwrap(), [""]);
    }

    #[test]
    fn test_ctrl_c_aborts() {
        let (mut ed, lines) = editor_with_lines(16, true);
        ed.receive_fault();
        let echo = feed(&mut ed, &[b'x', CTRL_C]);

        assert_eq!(echo, ["x", "<ETX>\n"]);
        assert_eq!(ed.state(), EditorState::Accumulating);
        assert_eq!(ed.pos(), 0);
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn test_fault_reported_at_cr() {
        let (mut ed, lines) = editor_with_lines(16, true);
        feed(&mut ed, b"ab");
        ed.receive_fault();
        assert_eq!(ed.state(), EditorState::ErrorPending);

        let echo = feed(&mut ed, b"c\r");
        assert_eq!(echo, ["c", "\r\n", "serial line error\n"]);
        assert!(lines.lock().unwrap().is_empty());
        assert_eq!(ed.state(), EditorState::Accumulating);
        assert_eq!(ed.pos(), 0);
    }

    #[test]
    fn test_ctrl_r_reenables_echo() {
        let (mut ed, _) = editor_with_lines(16, false);
        feed(&mut ed, b"ab");
        ed.receive_fault();

        let echo = feed(&mut ed, &[CTRL_R]);
        assert_eq!(echo, ["echo on\n"]);
        assert!(ed.echo_enabled());
        assert_eq!(ed.state(), EditorState::Accumulating);
        assert_eq!(ed.pos(), 0);

        // Already on: no effect
        assert!(feed(&mut ed, &[CTRL_R]).is_empty());
    }

    #[test]
    fn test_form_feed_redraws() {
        let (mut ed, _) = editor_with_lines(16, true);
        feed(&mut ed, b"ls");
        let echo = feed(&mut ed, &[FF]);

        assert_eq!(echo, [CLEAR_SCREEN, "ls"]);
        assert_eq!(ed.line(), "ls");
        assert_eq!(ed.pos(), 2);
    }

    #[test]
    fn test_no_callback_still_resets() {
        let mut ed = LineEditor::new(&config(8, true), None);
        feed(&mut ed, b"abc\r");
        assert_eq!(ed.pos(), 0);
    }
}
