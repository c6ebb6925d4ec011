//! Small text utilities shared by the extractors

/// Maps byte offsets to 1-based line numbers.
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(content.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> u32 {
        self.starts.partition_point(|&start| start <= offset) as u32
    }
}

/// The text between the `{` at `open` and its matching `}`.
pub fn block_body(content: &str, open: usize) -> Option<&str> {
    let bytes = content.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[open + 1..i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// The body of the first `{ … }` block after `from`, unless a `;` ends the statement first.
pub fn next_block(content: &str, from: usize) -> Option<&str> {
    let rest = content.get(from..)?;
    let brace = rest.find('{')?;
    if rest[..brace].contains(';') {
        return None;
    }
    block_body(content, from + brace)
}

/// Split a block body into members at nesting depth zero.
///
/// Members are separated by `;`, `,` or newlines outside any braces,
/// brackets, parentheses or generic arguments.
pub fn split_members(body: &str) -> Vec<&str> {
    let mut members = Vec::new();
    let mut depth = 0i32;
    let mut angle = 0i32;
    let mut start = 0;
    let mut prev = '\0';

    for (i, c) in body.char_indices() {
        match c {
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            '<' if prev.is_alphanumeric() => angle += 1,
            '>' if angle > 0 && prev != '=' => angle -= 1,
            ';' | ',' | '\n' if depth <= 0 && angle == 0 => {
                push_member(&mut members, &body[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
        prev = c;
    }
    push_member(&mut members, &body[start..]);
    members
}

fn push_member<'a>(members: &mut Vec<&'a str>, raw: &'a str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
        return;
    }
    members.push(trimmed);
}
