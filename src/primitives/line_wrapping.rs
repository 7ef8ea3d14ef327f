//! Soft line wrapping for the multi-line field editor
//!
//! `wrap` turns content into the display lines shown in the editor panel.
//! Wrapping is greedy and word based:
//! - Raw lines (split on `'\n'`) that fit in `width` are kept unchanged
//! - Longer lines are packed word by word; a word moves to the next display
//!   line when appending it (plus its separating whitespace) would exceed `width`
//! - Words longer than `width` are hard-split every `width` characters
//! - Empty raw lines produce one empty display line
//!
//! All lengths are counted in chars (code points), never bytes.
//!
//! Every char of the input ends up either inside a display line or in the
//! `gap` that follows one (the newline or the whitespace swallowed at a soft
//! break), so summing `len() + gap()` over all lines gives the input length.
//! The cursor mapper in `display_map` relies on this.

/// One soft-wrapped visual row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    text: String,
    len: usize,
    gap: usize,
}

impl DisplayLine {
    fn from_chars(chars: &[char], gap: usize) -> Self {
        Self {
            text: chars.iter().collect(),
            len: chars.len(),
            gap,
        }
    }

    /// The visible text of this row
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of input chars consumed between this row and the next
    /// (1 for a newline, the whitespace run at a soft break, 0 for a hard split)
    pub fn gap(&self) -> usize {
        self.gap
    }
}

/// Wrap `content` into display lines no wider than `width` chars.
///
/// A `width` of zero is treated as one char per line. Always returns at
/// least one line.
pub fn wrap(content: &str, width: usize) -> Vec<DisplayLine> {
    let width = width.max(1);
    let mut lines = Vec::new();

    let mut raw_lines = content.split('\n').peekable();
    while let Some(raw) = raw_lines.next() {
        wrap_raw_line(raw, width, &mut lines);
        if raw_lines.peek().is_some() {
            if let Some(last) = lines.last_mut() {
                last.gap += 1;
            }
        }
    }

    lines
}

fn wrap_raw_line(raw: &str, width: usize, out: &mut Vec<DisplayLine>) {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= width {
        out.push(DisplayLine::from_chars(&chars, 0));
        return;
    }

    let mut packer = Packer {
        width,
        current: Vec::with_capacity(width),
        out,
    };

    for token in tokenize(&chars) {
        if token.word.is_empty() {
            // Trailing whitespace stays visible; only overflow moves down
            packer.current.extend_from_slice(token.sep);
            packer.split_overflow();
        } else if packer.current.is_empty() {
            packer.place_word(token.word);
        } else if packer.current.len() + token.sep.len() + token.word.len() <= width {
            packer.current.extend_from_slice(token.sep);
            packer.current.extend_from_slice(token.word);
        } else {
            packer.flush(token.sep.len());
            packer.place_word(token.word);
        }
    }

    packer.flush(0);
}

/// A word and the whitespace run in front of it
struct Token<'a> {
    sep: &'a [char],
    word: &'a [char],
}

/// Split a raw line into tokens. Leading whitespace is folded into the first
/// word (indentation is kept), trailing whitespace becomes a token with an
/// empty word.
fn tokenize(chars: &[char]) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();

    let lead = chars.iter().take_while(|c| c.is_whitespace()).count();
    let first_end = lead
        + chars[lead..]
            .iter()
            .take_while(|c| !c.is_whitespace())
            .count();
    tokens.push(Token {
        sep: &[],
        word: &chars[..first_end],
    });

    let mut i = first_end;
    while i < chars.len() {
        let sep_len = chars[i..].iter().take_while(|c| c.is_whitespace()).count();
        let word_start = i + sep_len;
        let word_len = chars[word_start..]
            .iter()
            .take_while(|c| !c.is_whitespace())
            .count();
        tokens.push(Token {
            sep: &chars[i..word_start],
            word: &chars[word_start..word_start + word_len],
        });
        i = word_start + word_len;
    }

    tokens
}

struct Packer<'a> {
    width: usize,
    current: Vec<char>,
    out: &'a mut Vec<DisplayLine>,
}

impl Packer<'_> {
    fn flush(&mut self, gap: usize) {
        self.out.push(DisplayLine::from_chars(&self.current, gap));
        self.current.clear();
    }

    /// Start a fresh row with `word`, hard-splitting it if it is too long
    fn place_word(&mut self, word: &[char]) {
        debug_assert!(self.current.is_empty());
        self.current.extend_from_slice(word);
        self.split_overflow();
    }

    fn split_overflow(&mut self) {
        while self.current.len() > self.width {
            let rest = self.current.split_off(self.width);
            self.flush(0);
            self.current = rest;
        }
    }
}
