use std::fmt;

/// Location of a character in the source text.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct CodePosition {
    pub byte_pos: usize,
    pub line_no: usize,
    pub column_no: usize,
}

/// Source range covered by a token, expression or statement.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Span {
    pub start_pos: CodePosition,
    pub end_pos: CodePosition,
}

impl CodePosition {
    pub fn new(byte_pos: usize, line_no: usize, column_no: usize) -> Self {
        CodePosition {
            byte_pos,
            line_no,
            column_no,
        }
    }
}

impl fmt::Display for CodePosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line_no, self.column_no)
    }
}

impl Span {
    pub fn new(start_pos: CodePosition, end_pos: CodePosition) -> Self {
        Span { start_pos, end_pos }
    }

    pub fn at(pos: CodePosition) -> Self {
        Span::new(pos, pos)
    }

    pub fn extend(&self, other: Self) -> Self {
        Span {
            start_pos: std::cmp::min(self.start_pos, other.start_pos),
            end_pos: std::cmp::max(self.end_pos, other.end_pos),
        }
    }

    pub fn extract_string<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start_pos.byte_pos..self.end_pos.byte_pos)
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::at(CodePosition::new(0, 0, 0))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.start_pos.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::more_asserts::*;

    #[test]
    fn test_extend_covers_both_spans() {
        let a = Span::new(CodePosition::new(0, 1, 1), CodePosition::new(3, 1, 4));
        let b = Span::new(CodePosition::new(6, 1, 7), CodePosition::new(9, 1, 10));
        let joined = b.extend(a);

        assert_eq!(joined.start_pos, a.start_pos);
        assert_eq!(joined.end_pos, b.end_pos);
        assert_lt!(joined.start_pos, joined.end_pos);
    }

    #[test]
    fn test_extract_string() {
        let source = "x = 10";
        let span = Span::new(CodePosition::new(4, 1, 5), CodePosition::new(6, 1, 7));
        assert_eq!(span.extract_string(source), Some("10"));
        assert_eq!(span.to_string(), "1:5");
    }
}
