//! Best-effort repair of JSON-ish text into strict JSON.
//!
//! A single forward pass over the input with a small state record: a string
//! scanner (quote kind + escape flag), a stack of open containers, and a
//! side buffer holding the current run of unquoted token characters. The
//! buffer is flushed when the next structural character arrives -- quoted
//! when it sits in key position, quoted-unless-literal in value position.
//! Buffering forward avoids rewriting already-emitted output, which breaks
//! down once emitted string values contain structural characters.
//!
//! The rewriter is total: it always returns a string. On pathological input
//! the result may still be invalid JSON; the downstream strict parse is the
//! truth-teller, and callers drop candidates whose repaired form does not
//! parse.

use crate::number::parse_number;

/// Rewrite `input` into the closest strictly-valid JSON the single-pass
/// rules can produce.
///
/// Handled repairs: single/backtick-quoted strings, unquoted keys and
/// values, trailing commas, line and block comments, missing closing
/// brackets, stray and mismatched closers.
pub fn repair_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut r = Repairer::new(input.len());
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        if r.in_string {
            r.string_char(c);
            pos += 1;
            continue;
        }

        // Line comment: consume through end of line.
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            pos += 1;
            continue;
        }

        // Block comment: consume through the terminator, or to end of input
        // when unterminated.
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '*' {
            pos += 2;
            while pos < chars.len() {
                if chars[pos] == '*' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
                    pos += 2;
                    break;
                }
                pos += 1;
            }
            continue;
        }

        r.plain_char(c);
        pos += 1;
    }

    r.finish()
}

struct Repairer {
    out: String,
    /// Unquoted run of token characters not yet committed to the output.
    pending: String,
    /// Whitespace was seen since the last pending character; the next
    /// pending character gets a single space prefix.
    pending_space: bool,
    in_string: bool,
    /// Opening quote kind; only this character closes the current string.
    quote: char,
    escaped: bool,
    /// Last significant character emitted to the output.
    last: char,
    stack: Vec<char>,
}

impl Repairer {
    fn new(capacity: usize) -> Repairer {
        Repairer {
            out: String::with_capacity(capacity),
            pending: String::new(),
            pending_space: false,
            in_string: false,
            quote: '"',
            escaped: false,
            last: '\0',
            stack: Vec::new(),
        }
    }

    fn string_char(&mut self, c: char) {
        if self.escaped {
            self.out.push(c);
            self.escaped = false;
            return;
        }
        if c == '\\' {
            self.out.push('\\');
            self.escaped = true;
            return;
        }
        if c == self.quote {
            // Close with a double quote regardless of the source kind.
            self.out.push('"');
            self.in_string = false;
            self.last = '"';
            return;
        }
        // Other quote kinds inside the string are literal content.
        self.out.push(c);
    }

    fn plain_char(&mut self, c: char) {
        match c {
            '"' | '\'' | '`' => {
                self.flush_raw();
                self.out.push('"');
                self.in_string = true;
                self.quote = c;
                self.last = '"';
            }
            '{' | '[' => {
                self.flush_raw();
                self.emit(c);
                self.stack.push(c);
            }
            '}' | ']' => self.close_bracket(c),
            ':' => {
                self.flush_key();
                self.emit(':');
            }
            ',' => {
                self.flush_value();
                self.emit(',');
            }
            c if c.is_whitespace() => {
                if !self.pending.is_empty() {
                    self.pending_space = true;
                } else if !self.out.is_empty()
                    && !self.out.ends_with(' ')
                    && !matches!(self.last, '{' | '[' | ',' | ':')
                {
                    self.out.push(' ');
                }
            }
            c if is_token_char(c) => {
                if self.pending_space && !self.pending.is_empty() {
                    self.pending.push(' ');
                }
                self.pending_space = false;
                self.pending.push(c);
            }
            // Everything else is dropped.
            _ => {}
        }
    }

    fn close_bracket(&mut self, c: char) {
        // Stray closer with nothing open: dropped.
        let Some(&open) = self.stack.last() else {
            return;
        };
        let expected = if open == '{' { '}' } else { ']' };
        if c != expected {
            // Mismatched closer: dropped, stack untouched.
            return;
        }
        if c == '}' {
            self.flush_value();
        } else {
            self.flush_raw();
        }
        self.stack.pop();
        self.strip_trailing_comma();
        self.emit(c);
    }

    /// Drain unclosed containers in LIFO order.
    fn finish(mut self) -> String {
        while let Some(open) = self.stack.pop() {
            if open == '{' {
                self.flush_value();
            } else {
                self.flush_raw();
            }
            self.strip_trailing_comma();
            self.out.push(if open == '{' { '}' } else { ']' });
        }
        // A stray token outside any container is emitted as-is; the strict
        // parse decides whether it survives.
        self.flush_raw();
        self.out
    }

    fn emit(&mut self, c: char) {
        self.out.push(c);
        self.last = c;
    }

    /// Commit the pending token verbatim.
    fn flush_raw(&mut self) {
        if self.pending.is_empty() {
            self.pending_space = false;
            return;
        }
        self.out.push_str(&self.pending);
        if let Some(l) = self.pending.chars().next_back() {
            self.last = l;
        }
        self.pending.clear();
        self.pending_space = false;
    }

    /// Commit the pending token as a quoted object key.
    fn flush_key(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.out.push('"');
        self.out.push_str(&self.pending);
        self.out.push('"');
        self.last = '"';
        self.pending.clear();
        self.pending_space = false;
    }

    /// Commit the pending token in value position: reserved words and
    /// parseable numbers stay bare, everything else is quoted.
    fn flush_value(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if is_literal_token(&self.pending) {
            self.flush_raw();
        } else {
            self.flush_key();
        }
    }

    fn strip_trailing_comma(&mut self) {
        let kept = self.out.trim_end().len();
        if self.out[..kept].ends_with(',') {
            self.out.truncate(kept - 1);
        }
    }
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '+' | '.' | '_')
}

/// A token that must not be quoted in value position. The reserved-word
/// check is case-insensitive, but the token itself is left unmodified; a
/// `True` therefore stays bare and fails the downstream strict parse.
fn is_literal_token(token: &str) -> bool {
    let lower = token.to_lowercase();
    if lower == "true" || lower == "false" || lower == "null" {
        return true;
    }
    parse_number(token).is_ok()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
