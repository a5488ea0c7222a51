// ===============================================
// Metadata — tokenizer v0.1.0
// ===============================================
// _component_:     lexical analyzer
// _description_:   Strips comments and walks one Jack source file
//                  character-by-character, producing a fully materialized
//                  token stream with two-token lookahead.
//
// _notes_:
// - Block comments (`/* ... */`) and line comments (`// ...`) are skipped
//   inline during the same scan that produces tokens, rather than as a
//   separate textual pass; the effect on the resulting token stream is
//   identical, but line/column bookkeeping stays exact.
// - Unlike the reference implementation this tokenizer does not silently
//   drop unrecognized characters: those, and unterminated string literals,
//   are reported as lexical errors (spec §4.1 "Failure" recommends this
//   for a reimplementation).
// ===============================================

use crate::error::{CompileError, CompileResult, Position};
use crate::token::{Keyword, Symbol, Token};

/// A materialized, restartable-free sequence of tokens with the two-token
/// lookahead the translator's grammar needs (only ever used to
/// disambiguate a `term` starting with an identifier).
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        TokenStream { tokens, cursor: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Consumes and returns the front token.
    pub fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    /// The front token, without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// The second token from the front, without consuming either.
    pub fn peek_second(&self) -> Option<&Token> {
        self.tokens.get(self.cursor + 1)
    }
}

/// Scans `source` into a [`TokenStream`]. Reads the whole file's text up
/// front, per spec §5 ("Input files are read fully into memory at open").
pub fn tokenize(source: &str) -> CompileResult<TokenStream> {
    let mut scanner = Scanner {
        chars: source.chars().collect(),
        position: 0,
        line: 1,
        column: 0,
    };

    let tokens = scanner.scan()?;
    Ok(TokenStream::new(tokens))
}

struct Scanner {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    fn scan(&mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    self.line += 1;
                    self.column = 0;
                }
                '/' if self.peek_at(1) == Some('/') => self.skip_line_comment(),
                '/' if self.peek_at(1) == Some('*') => self.skip_block_comment()?,
                '"' => tokens.push(self.scan_string()?),
                c if c.is_ascii_digit() => tokens.push(self.scan_int()),
                c if is_identifier_start(c) => tokens.push(self.scan_identifier_or_keyword()),
                c if Symbol::from_char(c).is_some() => tokens.push(self.scan_symbol()),
                _ => {
                    let at = self.here();
                    let bad = ch;
                    self.advance();
                    return Err(CompileError::lexical(
                        format!("unrecognized character '{bad}'"),
                        at,
                    ));
                }
            }
        }

        Ok(tokens)
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> CompileResult<()> {
        let start = self.here();
        self.advance(); // '/'
        self.advance(); // '*'

        loop {
            match self.peek() {
                None => {
                    return Err(CompileError::lexical("unterminated block comment", start));
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    return Ok(());
                }
                Some('\n') => {
                    self.advance();
                    self.line += 1;
                    self.column = 0;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn scan_string(&mut self) -> CompileResult<Token> {
        let at = self.here();
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(CompileError::lexical("unterminated string literal", at));
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }

        Ok(Token::StringConst(value, at))
    }

    fn scan_int(&mut self) -> Token {
        let at = self.here();
        let mut digits = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // Out-of-range literals are not validated here (spec §9 Open
        // Question (a) leaves this undefined); values that don't fit a
        // u16 saturate rather than panicking.
        let value: u16 = digits.parse().unwrap_or(u16::MAX);
        Token::IntConst(value, at)
    }

    fn scan_identifier_or_keyword(&mut self) -> Token {
        let at = self.here();
        let mut lexeme = String::new();
        while let Some(c) = self.peek() {
            if is_identifier_continue(c) {
                lexeme.push(c);
                self.advance();
            } else {
                break;
            }
        }

        match Keyword::from_str(&lexeme) {
            Some(kw) => Token::Keyword(kw, at),
            None => Token::Identifier(lexeme, at),
        }
    }

    fn scan_symbol(&mut self) -> Token {
        let at = self.here();
        let ch = self.peek().expect("caller already confirmed a symbol char");
        self.advance();
        Token::Symbol(
            Symbol::from_char(ch).expect("caller already confirmed this is a symbol"),
            at,
        )
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.position).copied();
        if ch.is_some() {
            self.position += 1;
            self.column += 1;
        }
        ch
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        let stream = tokenize(src).unwrap();
        let mut tokens = Vec::new();
        let mut stream = stream;
        while let Some(t) = stream.advance() {
            tokens.push(t);
        }
        tokens
    }

    #[test]
    fn strips_line_and_block_comments() {
        let src = "// leading comment\nlet x = 1; /* trailing\nmulti-line */ let y = 2;";
        let tokens = kinds(src);
        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[0].as_keyword(), Some(Keyword::Let));
    }

    #[test]
    fn classifies_int_string_symbol_identifier() {
        let tokens = kinds(r#"foo(42, "bar")"#);
        assert_eq!(tokens[0].as_identifier(), Some("foo"));
        assert_eq!(tokens[1].as_symbol(), Some(Symbol::ParenL));
        match &tokens[2] {
            Token::IntConst(v, _) => assert_eq!(*v, 42),
            other => panic!("expected int const, got {other:?}"),
        }
        assert_eq!(tokens[3].as_symbol(), Some(Symbol::Comma));
        match &tokens[4] {
            Token::StringConst(s, _) => assert_eq!(s, "bar"),
            other => panic!("expected string const, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_a_lexical_error() {
        let err = tokenize("\"never closes").unwrap_err();
        assert!(matches!(err, CompileError::Lexical { .. }));
    }

    #[test]
    fn unterminated_block_comment_is_a_lexical_error() {
        let err = tokenize("let x = 1; /* oops").unwrap_err();
        assert!(matches!(err, CompileError::Lexical { .. }));
    }

    #[test]
    fn peek_second_distinguishes_call_from_index_from_scalar() {
        let mut stream = tokenize("a[0] a.f() a").unwrap();
        assert_eq!(stream.peek().unwrap().as_identifier(), Some("a"));
        assert_eq!(stream.peek_second().unwrap().as_symbol(), Some(Symbol::SquareL));
    }
}
