//! DDL tokenizer shared by the table, column and relationship scanners.
//!
//! Every token carries its byte span in the scanned text so callers can slice
//! the source spelling back out (raw column types, clause text).

use std::iter::Peekable;
use std::ops::Range;
use std::str::CharIndices;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Alter,
    Table,
    If,
    Not,
    Exists,
    Null,
    Primary,
    Key,
    Foreign,
    References,
    Constraint,
    Unique,
    Check,
    Index,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    // End of input
    Eof,
}

impl Token {
    /// True for bare or quoted identifiers and for keywords, which may also
    /// name columns (`key`, `index`, ...).
    pub fn is_word(&self) -> bool {
        !matches!(
            self,
            Token::Str(_)
                | Token::Num(_)
                | Token::LParen
                | Token::RParen
                | Token::Comma
                | Token::Semicolon
                | Token::Dot
                | Token::Eof
        )
    }
}

/// A token and the byte range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// SQL lexer.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.char_indices().peekable();
        let current = chars.next();
        Self {
            input,
            chars,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn current_char(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Byte offset of the current character, or end of input.
    fn offset(&self) -> usize {
        self.current.map_or(self.input.len(), |(i, _)| i)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip /
        self.advance(); // skip *
        while let Some(c) = self.current_char() {
            self.advance();
            if c == '*' && self.current_char() == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        word
    }

    fn read_quoted(&mut self, close: char) -> String {
        self.advance(); // skip opening quote
        let mut text = String::new();
        while let Some(c) = self.current_char() {
            if c == close {
                // Doubled quote is an escaped quote
                if self.peek() == Some(close) && close != ']' {
                    text.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else {
                text.push(c);
                self.advance();
            }
        }
        text
    }

    fn keyword_or_ident(word: String) -> Token {
        match word.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "ALTER" => Token::Alter,
            "TABLE" => Token::Table,
            "IF" => Token::If,
            "NOT" => Token::Not,
            "EXISTS" => Token::Exists,
            "NULL" => Token::Null,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "CONSTRAINT" => Token::Constraint,
            "UNIQUE" => Token::Unique,
            "CHECK" => Token::Check,
            "INDEX" => Token::Index,
            _ => Token::Ident(word),
        }
    }

    pub fn next_token(&mut self) -> Spanned {
        loop {
            self.skip_whitespace();
            let start = self.offset();

            let token = match self.current_char() {
                None => Token::Eof,

                Some('-') if self.peek() == Some('-') => {
                    self.skip_line_comment();
                    continue;
                }
                Some('/') if self.peek() == Some('*') => {
                    self.skip_block_comment();
                    continue;
                }

                Some('(') => {
                    self.advance();
                    Token::LParen
                }
                Some(')') => {
                    self.advance();
                    Token::RParen
                }
                Some(',') => {
                    self.advance();
                    Token::Comma
                }
                Some(';') => {
                    self.advance();
                    Token::Semicolon
                }
                Some('.') => {
                    self.advance();
                    Token::Dot
                }

                Some('"') => Token::Ident(self.read_quoted('"')),
                Some('`') => Token::Ident(self.read_quoted('`')),
                Some('[') => Token::Ident(self.read_quoted(']')),
                Some('\'') => Token::Str(self.read_quoted('\'')),

                Some(c) if c.is_alphanumeric() || c == '_' => {
                    let word = self.read_word();
                    if word.chars().all(|c| c.is_ascii_digit()) {
                        Token::Num(word)
                    } else {
                        Self::keyword_or_ident(word)
                    }
                }

                Some(_) => {
                    // Operators and other punctuation carry no structure here
                    self.advance();
                    continue;
                }
            };

            return Spanned {
                token,
                span: start..self.offset(),
            };
        }
    }

    /// Collect all tokens, terminated by `Eof`.
    pub fn tokenize(mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token();
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                break;
            }
        }
        tokens
    }
}

/// Returns the identifier spelled by a word token: the unquoted text for
/// identifiers, the source spelling for keywords.
pub fn word_text(spanned: &Spanned, source: &str) -> Option<String> {
    match &spanned.token {
        Token::Ident(name) => Some(name.clone()),
        t if t.is_word() => source.get(spanned.span.clone()).map(str::to_string),
        _ => None,
    }
}

/// Reads `name` or `schema.name` at the start of `tokens`, returning the last
/// segment and the number of tokens consumed.
pub fn qualified_name(tokens: &[Spanned], source: &str) -> Option<(String, usize)> {
    let mut name = word_text(tokens.first()?, source)?;
    let mut used = 1;
    while let (Some(dot), Some(next)) = (tokens.get(used), tokens.get(used + 1)) {
        if dot.token != Token::Dot {
            break;
        }
        match word_text(next, source) {
            Some(segment) => {
                name = segment;
                used += 2;
            }
            None => break,
        }
    }
    Some((name, used))
}

/// Index of the `RParen` closing the `LParen` at `open`, scanning past nested
/// parentheses.
pub fn matching_paren(tokens: &[Spanned], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, spanned) in tokens.iter().enumerate().skip(open) {
        match spanned.token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            Token::Eof => return None,
            _ => {}
        }
    }
    None
}
