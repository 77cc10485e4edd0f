pub const LOOP_HEADER: &str = "forever:";

/// Indentation that marks a line as part of the loop block: a fixed number
/// of spaces, or a single tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentUnit {
    pub spaces: usize,
}

impl Default for IndentUnit {
    fn default() -> Self {
        Self { spaces: 4 }
    }
}

impl IndentUnit {
    pub fn is_indented(&self, line: &str) -> bool {
        if line.starts_with('\t') {
            return true;
        }
        self.spaces > 0
            && line.len() >= self.spaces
            && line.bytes().take(self.spaces).all(|byte| byte == b' ')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based.
    pub number: usize,
    pub text: &'a str,
}

impl SourceLine<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

pub fn is_loop_header(line: &str) -> bool {
    line.trim() == LOOP_HEADER
}

pub fn scan_lines(source: &str) -> Vec<SourceLine<'_>> {
    source
        .split('\n')
        .enumerate()
        .map(|(index, text)| SourceLine {
            number: index + 1,
            text: text.strip_suffix('\r').unwrap_or(text),
        })
        .collect()
}
