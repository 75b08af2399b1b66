//! Greedy line filling for explanation text.
//!
//! Chunks are whitespace runs and words. A word may also end right after a
//! hyphen between letters (`first-` `in`) or before a `--` dash, so lines can
//! break there. Whitespace inside a line is kept; it is dropped only at line
//! edges.

const TAB_SIZE: usize = 8;

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_letter(c: char) -> bool {
    is_word_char(c) && !c.is_numeric()
}

fn is_word_punct(c: char) -> bool {
    is_word_char(c) || matches!(c, '!' | '"' | '\'' | '&' | '.' | ',' | '?')
}

/// Tabs expand to the next multiple of 8 columns, then every whitespace
/// character becomes one space.
fn normalize_whitespace(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                out.push(' ');
                column = 0;
            }
            c if is_space(c) => {
                out.push(' ');
                column += 1;
            }
            c => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

fn at(s: &[char], i: usize, test: fn(char) -> bool) -> bool {
    s.get(i).is_some_and(|&c| test(c))
}

fn is_char(s: &[char], i: usize, wanted: char) -> bool {
    s.get(i) == Some(&wanted)
}

/// Length of a `--...` run at `i` when a word character follows it.
fn dash_run(s: &[char], i: usize) -> Option<usize> {
    let n = s[i..].iter().take_while(|&&c| c == '-').count();
    (n >= 2 && at(s, i + n, is_word_char)).then_some(n)
}

/// The hyphen at `j` can end a chunk: two letters (or letter-hyphen-letter)
/// before it and a letter pair (optionally hyphen-joined) after it.
fn breakable_hyphen(s: &[char], j: usize) -> bool {
    let before = (j >= 2 && at(s, j - 1, is_letter) && at(s, j - 2, is_letter))
        || (j >= 3 && at(s, j - 1, is_letter) && is_char(s, j - 2, '-') && at(s, j - 3, is_letter));
    let after = at(s, j + 1, is_letter)
        && (at(s, j + 2, is_letter) || (is_char(s, j + 2, '-') && at(s, j + 3, is_letter)));
    before && after
}

/// End (exclusive) of the word chunk starting at `start` in a run without
/// whitespace.
fn word_end(run: &[char], start: usize) -> usize {
    if start > 0 && is_word_punct(run[start - 1]) {
        if let Some(n) = dash_run(run, start) {
            return start + n;
        }
    }

    for i in start + 1..run.len() {
        if run[i] == '-' && breakable_hyphen(run, i) {
            return i + 1;
        }
        if is_word_punct(run[i - 1]) && dash_run(run, i).is_some() {
            return i;
        }
    }
    run.len()
}

fn split_chunks(text: &[char]) -> Vec<&[char]> {
    let mut chunks = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let space = text[pos] == ' ';
        let run_len = text[pos..].iter().take_while(|&&c| (c == ' ') == space).count();
        let run = &text[pos..pos + run_len];
        if space {
            chunks.push(run);
        } else {
            let mut start = 0;
            while start < run.len() {
                let end = word_end(run, start);
                chunks.push(&run[start..end]);
                start = end;
            }
        }
        pos += run_len;
    }
    chunks
}

fn is_blank(chunk: &[char]) -> bool {
    chunk.iter().all(|&c| c == ' ')
}

/// Splits a chunk too wide for any line, preferring to cut after its last
/// hyphen that fits.
fn split_long_chunk<'a>(chunk: &'a [char], room: usize) -> (&'a [char], &'a [char]) {
    let mut end = room;
    if chunk.len() > room {
        if let Some(hyphen) = chunk[..room].iter().rposition(|&c| c == '-') {
            if hyphen > 0 && chunk[..hyphen].iter().any(|&c| c != '-') {
                end = hyphen + 1;
            }
        }
    }
    chunk.split_at(end.min(chunk.len()))
}

/// Fills lines of at most `width` characters. Words wider than a line are
/// cut to fit.
pub fn wrap_text(text: &str, width: usize) -> String {
    let width = width.max(1);
    let normalized = normalize_whitespace(text);
    let mut pending: Vec<&[char]> = split_chunks(&normalized);
    pending.reverse();

    let mut lines: Vec<String> = Vec::new();
    while !pending.is_empty() {
        if !lines.is_empty() && pending.last().is_some_and(|c| is_blank(c)) {
            pending.pop();
        }

        let mut line: Vec<&[char]> = Vec::new();
        let mut line_len = 0;
        while let Some(&chunk) = pending.last() {
            if line_len + chunk.len() > width {
                break;
            }
            line_len += chunk.len();
            line.push(chunk);
            pending.pop();
        }

        if let Some(chunk) = pending.pop() {
            if chunk.len() > width {
                let (head, tail) = split_long_chunk(chunk, width - line_len);
                line.push(head);
                pending.push(tail);
            } else {
                pending.push(chunk);
            }
        }

        if line.last().is_some_and(|c| is_blank(c)) {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line.concat().into_iter().collect());
        }
    }

    lines.join("\n")
}
