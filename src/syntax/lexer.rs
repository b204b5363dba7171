//! Token scanner for Go source.
//!
//! Only as much of the lexical grammar as the top-level parser needs:
//! identifiers, literals (so brackets inside strings are not counted),
//! comments, brackets, and automatic semicolon insertion at line ends.

/// Keywords after which a newline does *not* insert a semicolon.
const NON_TERMINATING_KEYWORDS: &[&str] = &[
    "case", "chan", "const", "default", "defer", "else", "for", "func", "go", "goto", "if",
    "import", "interface", "map", "package", "range", "select", "struct", "switch", "type", "var",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident,
    Number,
    String,
    Rune,
    Comment,
    Open(char),
    Close(char),
    /// Explicit `;` or one inserted at a line break.
    Semi,
    Op,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub fn is_ident(&self, src: &str, word: &str) -> bool {
        self.kind == TokenKind::Ident && self.text(src) == word
    }
}

/// Lexical error with a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

pub(crate) struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    /// Last non-comment token, for semicolon insertion.
    last: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            last: None,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(c) = self.peek(0) {
            match c {
                '\n' => {
                    self.insert_semi();
                    self.bump();
                }
                ' ' | '\t' | '\r' | '\u{feff}' => {
                    self.bump();
                }
                '/' if self.peek(1) == Some('/') => self.line_comment(),
                '/' if self.peek(1) == Some('*') => self.block_comment()?,
                '"' => self.quoted('"', TokenKind::String, "string literal not terminated")?,
                '\'' => self.quoted('\'', TokenKind::Rune, "rune literal not terminated")?,
                '`' => self.raw_string()?,
                c if is_letter(c) => self.ident(),
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                '(' | '[' | '{' => self.single(TokenKind::Open(c)),
                ')' | ']' | '}' => self.single(TokenKind::Close(c)),
                ';' => self.single(TokenKind::Semi),
                '+' | '-' if self.peek(1) == Some(c) => {
                    let (start, line, column) = self.mark();
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Op, start, line, column);
                }
                _ => self.single(TokenKind::Op),
            }
        }
        self.insert_semi();
        Ok(self.tokens)
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(o, _)| o)
            .unwrap_or(self.src.len())
    }

    fn mark(&self) -> (usize, usize, usize) {
        (self.offset(), self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: &str) -> LexError {
        LexError {
            line,
            column,
            message: message.to_string(),
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let token = Token {
            kind,
            start,
            end: self.offset(),
            line,
            column,
        };
        if kind != TokenKind::Comment {
            self.last = Some(token);
        }
        self.tokens.push(token);
    }

    fn single(&mut self, kind: TokenKind) {
        let (start, line, column) = self.mark();
        self.bump();
        self.push(kind, start, line, column);
    }

    /// Insert a semicolon at the current position if the previous token can
    /// end a statement.
    fn insert_semi(&mut self) {
        let Some(last) = self.last else { return };
        let terminates = match last.kind {
            TokenKind::Ident => !NON_TERMINATING_KEYWORDS.contains(&last.text(self.src)),
            TokenKind::Number | TokenKind::String | TokenKind::Rune | TokenKind::Close(_) => true,
            TokenKind::Op => matches!(last.text(self.src), "++" | "--"),
            TokenKind::Open(_) | TokenKind::Semi | TokenKind::Comment => false,
        };
        if terminates {
            let (start, line, column) = self.mark();
            self.push(TokenKind::Semi, start, line, column);
        }
    }

    fn line_comment(&mut self) {
        let (start, line, column) = self.mark();
        while self.peek(0).is_some_and(|c| c != '\n') {
            self.bump();
        }
        self.push(TokenKind::Comment, start, line, column);
    }

    fn block_comment(&mut self) -> Result<(), LexError> {
        let (start, line, column) = self.mark();
        self.bump();
        self.bump();
        let mut spans_lines = false;
        loop {
            match self.peek(0) {
                None => return Err(self.error(line, column, "comment not terminated")),
                Some('*') if self.peek(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(c) => {
                    spans_lines |= c == '\n';
                    self.bump();
                }
            }
        }
        // A general comment containing newlines acts like a newline.
        if spans_lines {
            let end = self.offset();
            self.insert_semi_at(start, line, column);
            self.tokens.push(Token {
                kind: TokenKind::Comment,
                start,
                end,
                line,
                column,
            });
        } else {
            self.push(TokenKind::Comment, start, line, column);
        }
        Ok(())
    }

    fn insert_semi_at(&mut self, start: usize, line: usize, column: usize) {
        let before = self.tokens.len();
        self.insert_semi();
        if let Some(token) = self.tokens.get_mut(before) {
            token.start = start;
            token.end = start;
            token.line = line;
            token.column = column;
        }
    }

    fn quoted(&mut self, quote: char, kind: TokenKind, unterminated: &str) -> Result<(), LexError> {
        let (start, line, column) = self.mark();
        self.bump();
        loop {
            match self.peek(0) {
                None | Some('\n') => return Err(self.error(line, column, unterminated)),
                Some('\\') => {
                    self.bump();
                    if self.bump().is_none() {
                        return Err(self.error(line, column, unterminated));
                    }
                }
                Some(c) => {
                    self.bump();
                    if c == quote {
                        break;
                    }
                }
            }
        }
        self.push(kind, start, line, column);
        Ok(())
    }

    fn raw_string(&mut self) -> Result<(), LexError> {
        let (start, line, column) = self.mark();
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.error(line, column, "raw string literal not terminated")),
                Some('`') => break,
                Some(_) => {}
            }
        }
        self.push(TokenKind::String, start, line, column);
        Ok(())
    }

    fn ident(&mut self) {
        let (start, line, column) = self.mark();
        while self.peek(0).is_some_and(|c| is_letter(c) || c.is_ascii_digit()) {
            self.bump();
        }
        self.push(TokenKind::Ident, start, line, column);
    }

    fn number(&mut self) {
        let (start, line, column) = self.mark();
        let hex = self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X'));
        while let Some(c) = self.peek(0) {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.bump();
                let exponent = if hex {
                    matches!(c, 'p' | 'P')
                } else {
                    matches!(c, 'e' | 'E' | 'p' | 'P')
                };
                if exponent && matches!(self.peek(0), Some('+' | '-')) {
                    self.bump();
                }
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start, line, column);
    }
}

fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_semicolon_inserted_after_identifier_at_line_end() {
        assert_eq!(
            kinds("package main\n"),
            vec![TokenKind::Ident, TokenKind::Ident, TokenKind::Semi]
        );
    }

    #[test]
    fn test_no_semicolon_after_open_brace() {
        let tokens = kinds("func f() {\n}\n");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Open('('),
                TokenKind::Close(')'),
                TokenKind::Open('{'),
                TokenKind::Close('}'),
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn test_brackets_inside_literals_are_not_tokens() {
        let tokens = kinds("x := \"{(\" + `)\n}` + '}'\n");
        assert!(!tokens.iter().any(|k| matches!(k, TokenKind::Open(_) | TokenKind::Close(_))));
    }

    #[test]
    fn test_multiline_block_comment_acts_as_newline() {
        let src = "x /* a\nb */ y";
        let tokens = Lexer::new(src).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Semi);
        assert_eq!(tokens[2].kind, TokenKind::Comment);
    }

    #[test]
    fn test_increment_terminates_statement() {
        let tokens = kinds("i++\n");
        assert_eq!(tokens, vec![TokenKind::Ident, TokenKind::Op, TokenKind::Semi]);
    }

    #[test]
    fn test_float_exponent_is_one_token() {
        let src = "1e+10 0x1p-2 0x1e+2";
        let tokens = Lexer::new(src).tokenize().unwrap();
        let texts: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Semi)
            .map(|t| t.text(src))
            .collect();
        assert_eq!(texts, vec!["1e+10", "0x1p-2", "0x1e", "+", "2"]);
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let err = Lexer::new("package main\nvar s = \"abc\n").tokenize().unwrap_err();
        assert_eq!((err.line, err.column), (2, 9));
        assert_eq!(err.message, "string literal not terminated");
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("/* open").tokenize().unwrap_err();
        assert_eq!(err.message, "comment not terminated");
    }
}
