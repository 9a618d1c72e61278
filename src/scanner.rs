//! Streaming lexer for Lox source text.
//!
//! [`Scanner`] walks the source bytes once and yields `Result<Token>` items,
//! ending with exactly one `EOF` token.  A lexical error is yielded in place
//! of the offending lexeme and scanning carries on with the next byte, so a
//! single pass surfaces every bad character and every unterminated string.
//!
//! Recognised lexemes:
//!
//! - punctuation `( ) { } , . - + ; * /`
//! - one- or two-byte operators, longest match first: `! != = == < <= > >=`
//! - `//` line comments (skipped with `memchr`)
//! - string literals, which may span lines and have no escapes
//! - number literals: digits with an optional `.digits` fraction
//! - identifiers, reclassified through the perfect-hash [`KEYWORDS`] map
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! for result in Scanner::new("print 1; // done") {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use std::iter::FusedIterator;

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};

/// Reserved words, keyed by their source bytes.
static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Single-pass lexer over a borrowed source string.
pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],

    /// First byte of the lexeme being scanned.
    start: usize,

    /// Next byte to examine.
    cursor: usize,

    /// 1-based line of `cursor`.
    line: usize,

    /// Set once the EOF token has been handed out.
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        info!("Scanner created over {} bytes", text.len());

        Self {
            text,
            bytes: text.as_bytes(),
            start: 0,
            cursor: 0,
            line: 1,
            done: false,
        }
    }

    // ─────────────────────────── byte cursor ───────────────────────────

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    /// Byte `offset` positions ahead of the cursor, `0` past the end.
    #[inline(always)]
    fn look(&self, offset: usize) -> u8 {
        self.bytes.get(self.cursor + offset).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let b: u8 = self.bytes[self.cursor];
        self.cursor += 1;

        if b == b'\n' {
            self.line += 1;
        }

        b
    }

    /// Consumes the next byte only when it is `expected`.
    #[inline(always)]
    fn eat(&mut self, expected: u8) -> bool {
        let hit: bool = !self.is_at_end() && self.look(0) == expected;

        if hit {
            self.cursor += 1;
        }

        hit
    }

    /// `paired` when the next byte is `=`, otherwise `single`.
    #[inline(always)]
    fn with_equals(&mut self, paired: TokenType, single: TokenType) -> TokenType {
        if self.eat(b'=') {
            paired
        } else {
            single
        }
    }

    #[inline(always)]
    fn lexeme(&self) -> &'a str {
        &self.text[self.start..self.cursor]
    }

    // ───────────────────────────── lexemes ─────────────────────────────

    /// Scans one lexeme starting at `self.start`.  `Ok(None)` means the
    /// lexeme was whitespace or a comment and produced no token.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let kind: TokenType = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.with_equals(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.with_equals(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.with_equals(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.with_equals(TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.eat(b'/') => {
                // Stop on the newline so `bump` counts it.
                self.cursor = memchr(b'\n', &self.bytes[self.cursor..])
                    .map_or(self.bytes.len(), |pos| self.cursor + pos);

                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' | b'\n' => return Ok(None),

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Take the whole UTF-8 sequence so it is reported once.
                while self.look(0) & 0b1100_0000 == 0b1000_0000 {
                    self.cursor += 1;
                }

                let c: char = self.lexeme().chars().next().unwrap_or('\u{FFFD}');

                return Err(LoxError::lex(
                    self.line,
                    format!("Unexpected character: {}", c),
                ));
            }
        };

        Ok(Some(kind))
    }

    /// The opening quote is already consumed; reads through the closing one.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.look(0) != b'"' {
            self.bump();
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.bump();

        let contents: &str = &self.text[self.start + 1..self.cursor - 1];

        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn skip_digits(&mut self) {
        while self.look(0).is_ascii_digit() {
            self.cursor += 1;
        }
    }

    fn number(&mut self) -> TokenType {
        self.skip_digits();

        // A trailing `.` with no digit after it is left for the DOT token.
        if self.look(0) == b'.' && self.look(1).is_ascii_digit() {
            self.cursor += 1;
            self.skip_digits();
        }

        TokenType::NUMBER(self.lexeme().parse::<f64>().unwrap_or(0.0))
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.look(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.cursor += 1;
        }

        KEYWORDS
            .get(&self.bytes[self.start..self.cursor])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.cursor;

            // A string's line is where it ends, so read the line afterwards.
            match self.scan_token() {
                Ok(Some(kind)) => {
                    debug!("Scanned {:?} on line {}", kind, self.line);
                    return Some(Ok(Token::new(kind, self.lexeme(), self.line)));
                }
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Drains a scanner over `source`, splitting tokens (always ending in `EOF`)
/// from lexical errors.
pub fn scan_tokens(source: &str) -> (Vec<Token>, Vec<LoxError>) {
    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for result in Scanner::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scanned {} token(s) with {} error(s)",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}
