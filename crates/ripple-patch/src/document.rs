//! In-memory line buffer for one file

/// A file split into lines, remembering its line ending and trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    newline: &'static str,
    trailing_newline: bool,
}

impl Document {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
            newline: if content.contains("\r\n") { "\r\n" } else { "\n" },
            // An empty file gains a newline if lines are inserted
            trailing_newline: content.is_empty() || content.ends_with('\n'),
        }
    }

    pub fn render(&self) -> String {
        let mut out = self.lines.join(self.newline);
        if self.trailing_newline && !self.lines.is_empty() {
            out.push_str(self.newline);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Index of the line whose trimmed text equals trimmed `expected`.
    ///
    /// Checks `index` first, then searches outwards up to `window` lines, nearest first.
    pub fn find(&self, index: usize, expected: &str, window: usize) -> Option<usize> {
        let expected = expected.trim();
        let matches = |i: usize| self.lines.get(i).is_some_and(|l| l.trim() == expected);

        if matches(index) {
            return Some(index);
        }
        (1..=window).find_map(|distance| {
            let above = index.checked_sub(distance).filter(|&i| matches(i));
            above.or_else(|| Some(index + distance).filter(|&i| matches(i)))
        })
    }

    pub fn replace(&mut self, index: usize, text: String) {
        if let Some(line) = self.lines.get_mut(index) {
            *line = text;
        }
    }

    pub fn delete(&mut self, index: usize) {
        if index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    /// Insert before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: usize, text: String) {
        let index = index.min(self.lines.len());
        self.lines.insert(index, text);
    }
}

/// Leading whitespace of a line.
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}
