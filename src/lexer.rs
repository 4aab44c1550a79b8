// File: src/lexer.rs
//
// Scanner for the Ruff programming language.
// Turns source text into a lazy stream of tokens with line numbers.
// Tokens borrow slices of the source buffer; the caller must keep the
// source alive for as long as tokens from this scanner are in use.

/// The closed set of token kinds the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Single-character punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character operators
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    For,
    Fun,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Error,
    Eof,
}

/// A token: its kind, a byte-range view into the source, and a 1-based line.
#[derive(Debug, Clone, Copy)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub line: usize,
}

impl<'src> Token<'src> {
    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }
}

/// Single forward cursor over source text.
pub struct Scanner<'src> {
    source: &'src str,
    bytes: &'src [u8],
    start: usize,
    current: usize,
    line: usize,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self { source, bytes: source.as_bytes(), start: 0, current: 0, line: 1 }
    }

    /// Yield the next token, or an `Error` token carrying a message as its
    /// lexeme for unterminated strings and unknown characters.
    pub fn scan_token(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;

        if self.is_at_end() {
            return self.make_token(TokenKind::Eof);
        }

        let c = self.advance();

        if is_alpha(c) {
            return self.identifier();
        }
        if c.is_ascii_digit() {
            return self.number();
        }

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '{' => self.make_token(TokenKind::LeftBrace),
            '}' => self.make_token(TokenKind::RightBrace),
            ';' => self.make_token(TokenKind::Semicolon),
            ',' => self.make_token(TokenKind::Comma),
            '.' => self.make_token(TokenKind::Dot),
            '-' => self.make_token(TokenKind::Minus),
            '+' => self.make_token(TokenKind::Plus),
            '/' => self.make_token(TokenKind::Slash),
            '*' => self.make_token(TokenKind::Star),
            '!' => {
                let kind = if self.match_char('=') { TokenKind::BangEqual } else { TokenKind::Bang };
                self.make_token(kind)
            }
            '=' => {
                let kind = if self.match_char('=') { TokenKind::EqualEqual } else { TokenKind::Equal };
                self.make_token(kind)
            }
            '<' => {
                let kind = if self.match_char('=') { TokenKind::LessEqual } else { TokenKind::Less };
                self.make_token(kind)
            }
            '>' => {
                let kind =
                    if self.match_char('=') { TokenKind::GreaterEqual } else { TokenKind::Greater };
                self.make_token(kind)
            }
            '"' => self.string(),
            _ => self.error_token("Unexpected character."),
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.bytes.len()
    }

    fn advance(&mut self) -> char {
        let c = self.bytes[self.current] as char;
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.bytes[self.current] as char
        }
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.bytes.len() {
            '\0'
        } else {
            self.bytes[self.current + 1] as char
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                ' ' | '\r' | '\t' => {
                    self.advance();
                }
                '\n' => {
                    self.line += 1;
                    self.advance();
                }
                '/' => {
                    if self.peek_next() == '/' {
                        while self.peek() != '\n' && !self.is_at_end() {
                            self.advance();
                        }
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token<'src> {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            return self.error_token("Unterminated string.");
        }

        self.advance(); // closing quote
        self.make_token(TokenKind::String)
    }

    fn number(&mut self) -> Token<'src> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.make_token(TokenKind::Number)
    }

    fn identifier(&mut self) -> Token<'src> {
        while is_alpha(self.peek()) || self.peek().is_ascii_digit() {
            self.advance();
        }
        self.make_token(self.identifier_kind())
    }

    /// Hand-coded trie on the first 1-2 letters, matching the book's approach
    /// of avoiding a hash lookup for keyword recognition.
    fn identifier_kind(&self) -> TokenKind {
        let text = &self.source[self.start..self.current];
        let bytes = text.as_bytes();

        let rest_matches = |start: usize, rest: &str| -> bool {
            bytes.len() == start + rest.len() && &text[start..] == rest
        };

        match bytes.first() {
            Some(b'a') if rest_matches(1, "nd") => TokenKind::And,
            Some(b'c') if rest_matches(1, "lass") => TokenKind::Class,
            Some(b'e') if rest_matches(1, "lse") => TokenKind::Else,
            Some(b'i') if rest_matches(1, "f") => TokenKind::If,
            Some(b'n') if rest_matches(1, "il") => TokenKind::Nil,
            Some(b'o') if rest_matches(1, "r") => TokenKind::Or,
            Some(b'p') if rest_matches(1, "rint") => TokenKind::Print,
            Some(b'r') if rest_matches(1, "eturn") => TokenKind::Return,
            Some(b's') if rest_matches(1, "uper") => TokenKind::Super,
            Some(b'v') if rest_matches(1, "ar") => TokenKind::Var,
            Some(b'w') if rest_matches(1, "hile") => TokenKind::While,
            Some(b'f') if bytes.len() > 1 => match bytes[1] {
                b'a' if rest_matches(2, "lse") => TokenKind::False,
                b'o' if rest_matches(2, "r") => TokenKind::For,
                b'u' if rest_matches(2, "n") => TokenKind::Fun,
                _ => TokenKind::Identifier,
            },
            Some(b't') if bytes.len() > 1 => match bytes[1] {
                b'h' if rest_matches(2, "is") => TokenKind::This,
                b'r' if rest_matches(2, "ue") => TokenKind::True,
                _ => TokenKind::Identifier,
            },
            _ => TokenKind::Identifier,
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token<'src> {
        Token { kind, lexeme: &self.source[self.start..self.current], line: self.line }
    }

    fn error_token(&self, message: &'static str) -> Token<'src> {
        Token { kind: TokenKind::Error, lexeme: message, line: self.line }
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let token = scanner.scan_token();
            let done = token.kind == TokenKind::Eof;
            out.push(token.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn scans_punctuation_and_operators() {
        assert_eq!(
            kinds("() {} , . - + ; / * ! != = == < <= > >="),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Minus,
                TokenKind::Plus,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        assert_eq!(
            kinds("and class else false for fun if nil or print return super this true var while foo"),
            vec![
                TokenKind::And,
                TokenKind::Class,
                TokenKind::Else,
                TokenKind::False,
                TokenKind::For,
                TokenKind::Fun,
                TokenKind::If,
                TokenKind::Nil,
                TokenKind::Or,
                TokenKind::Print,
                TokenKind::Return,
                TokenKind::Super,
                TokenKind::This,
                TokenKind::True,
                TokenKind::Var,
                TokenKind::While,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn identifier_prefix_of_keyword_is_not_a_keyword() {
        assert_eq!(kinds("andy forest classy"), vec![
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::Eof,
        ]);
    }

    #[test]
    fn tracks_line_numbers_across_newlines_in_strings() {
        let mut scanner = Scanner::new("\"a\nb\"\n1");
        let string_tok = scanner.scan_token();
        assert_eq!(string_tok.kind, TokenKind::String);
        assert_eq!(string_tok.line, 1);
        let number_tok = scanner.scan_token();
        assert_eq!(number_tok.line, 3);
    }

    #[test]
    fn unterminated_string_is_an_error_token() {
        let mut scanner = Scanner::new("\"oops");
        let tok = scanner.scan_token();
        assert!(tok.is_error());
        assert_eq!(tok.lexeme, "Unterminated string.");
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(kinds("1 // comment\n2"), vec![TokenKind::Number, TokenKind::Number, TokenKind::Eof]);
    }

    #[test]
    fn numbers_with_fractional_part() {
        let mut scanner = Scanner::new("3.14");
        let tok = scanner.scan_token();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.lexeme, "3.14");
    }
}
