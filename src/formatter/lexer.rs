use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::emitter::Emitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    StartExpr,
    EndExpr,
    StartBlock,
    EndBlock,
    Word,
    Semicolon,
    StringLiteral,
    Operator,
    Comment,
    BlockComment,
    Unknown,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) text: String,
    pub(crate) kind: TokenKind,
}

impl Token {
    fn new(text: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    fn eof() -> Self {
        Self::new("", TokenKind::Eof)
    }
}

/// Streaming tokenizer over the source text. It is pull-driven by the
/// engine and deliberately not self-contained: regex-vs-division needs the
/// kind of the last *emitted* token, and blank-line preservation writes
/// straight through the printer before the next token is returned.
pub(crate) struct Tokenizer {
    input: Vec<char>,
    pos: usize,
    preserve_newlines: bool,
}

impl Tokenizer {
    pub(crate) fn new(source: &str, preserve_newlines: bool) -> Self {
        Self {
            input: source.chars().collect(),
            pos: 0,
            preserve_newlines,
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.input.get(self.pos + ahead).copied()
    }

    fn looking_at(&self, text: &str) -> bool {
        text.chars().enumerate().all(|(i, ch)| self.peek(i) == Some(ch))
    }

    pub(crate) fn next_token(
        &mut self,
        printer: &mut Emitter,
        last_kind: TokenKind,
        last_text: &str,
    ) -> Token {
        let mut newline_count = 0usize;

        if self.pos >= self.input.len() {
            return Token::eof();
        }
        let mut c = self.input[self.pos];
        self.pos += 1;
        while is_whitespace(c) {
            if self.pos >= self.input.len() {
                return Token::eof();
            }
            if c == '\n' {
                newline_count += 1;
            }
            c = self.input[self.pos];
            self.pos += 1;
        }

        if self.preserve_newlines && newline_count > 1 {
            // two newlines make one preserved blank line
            printer.print_newline(true);
            printer.print_newline(false);
        }
        let wanted_newline = newline_count == 1;

        if is_wordchar(c) {
            let mut text = c.to_string();
            while let Some(next) = self.peek(0) {
                if !is_wordchar(next) {
                    break;
                }
                text.push(next);
                self.pos += 1;
            }

            // 1E-10 style exponents: glue the sign and the next token on
            if matches!(self.peek(0), Some('+') | Some('-')) && is_bare_exponent(&text) {
                let sign = self.input[self.pos];
                self.pos += 1;
                let tail = self.next_token(printer, last_kind, last_text);
                text.push(sign);
                text.push_str(&tail.text);
                return Token::new(text, TokenKind::Word);
            }

            if text == "in" {
                return Token::new(text, TokenKind::Operator);
            }
            if wanted_newline && last_kind != TokenKind::Operator && !printer.if_line_flag() {
                printer.print_newline(true);
            }
            return Token::new(text, TokenKind::Word);
        }

        match c {
            '(' | '[' => return Token::new(c.to_string(), TokenKind::StartExpr),
            ')' | ']' => return Token::new(c.to_string(), TokenKind::EndExpr),
            '{' => return Token::new(c.to_string(), TokenKind::StartBlock),
            '}' => return Token::new(c.to_string(), TokenKind::EndBlock),
            ';' => return Token::new(c.to_string(), TokenKind::Semicolon),
            _ => {}
        }

        if c == '/' {
            if self.peek(0) == Some('*') {
                self.pos += 1;
                let mut comment = String::from("/*");
                while self.pos < self.input.len() {
                    if self.looking_at("*/") {
                        comment.push_str("*/");
                        self.pos += 2;
                        return Token::new(comment, TokenKind::BlockComment);
                    }
                    comment.push(self.input[self.pos]);
                    self.pos += 1;
                }
                // unterminated comment: keep what was read
                return Token::new(comment, TokenKind::BlockComment);
            }
            if self.peek(0) == Some('/') {
                let mut comment = String::from("/");
                while let Some(next) = self.peek(0) {
                    if next == '\r' || next == '\n' {
                        break;
                    }
                    comment.push(next);
                    self.pos += 1;
                }
                if self.pos < self.input.len() {
                    self.pos += 1;
                }
                if wanted_newline {
                    printer.print_newline(true);
                }
                return Token::new(comment, TokenKind::Comment);
            }
        }

        if c == '$' {
            // jQuery-style call heads such as $( and $A.
            if let Some(next) = self.peek(0) {
                if next == '(' {
                    self.pos += 1;
                    return Token::new("$(", TokenKind::StartExpr);
                }
                if self.peek(1) == Some('.') {
                    let mut text = String::from("$");
                    text.push(next);
                    self.pos += 1;
                    return Token::new(text, TokenKind::StartExpr);
                }
            }
            // otherwise $ behaves as a word character
            let mut text = String::from("$");
            while let Some(follow) = self.peek(0) {
                if !is_wordchar(follow) {
                    break;
                }
                text.push(follow);
                self.pos += 1;
            }
            return Token::new(text, TokenKind::Word);
        }

        let regex_allowed = c == '/'
            && ((last_kind == TokenKind::Word && last_text == "return")
                || matches!(
                    last_kind,
                    TokenKind::StartExpr
                        | TokenKind::StartBlock
                        | TokenKind::EndBlock
                        | TokenKind::Operator
                        | TokenKind::Eof
                        | TokenKind::Semicolon
                ));

        if c == '\'' || c == '"' || regex_allowed {
            let sep = c;
            let mut text = sep.to_string();
            let mut escaped = false;
            let mut in_char_class = false;
            while let Some(next) = self.peek(0) {
                if !escaped && !in_char_class && next == sep {
                    break;
                }
                text.push(next);
                if escaped {
                    escaped = false;
                } else {
                    escaped = next == '\\';
                    if sep == '/' {
                        // a slash inside [...] does not end the regex
                        if next == '[' {
                            in_char_class = true;
                        } else if next == ']' {
                            in_char_class = false;
                        }
                    }
                }
                self.pos += 1;
            }
            if self.pos >= self.input.len() {
                // unterminated literal: return the partial contents
                return Token::new(text, TokenKind::StringLiteral);
            }
            self.pos += 1;
            text.push(sep);
            if sep == '/' {
                while let Some(flag) = self.peek(0) {
                    if !is_wordchar(flag) {
                        break;
                    }
                    text.push(flag);
                    self.pos += 1;
                }
            }
            return Token::new(text, TokenKind::StringLiteral);
        }

        if c == '#' && matches!(self.peek(0), Some(digit) if digit.is_ascii_digit()) {
            // Spidermonkey sharp variables: #1# references, #1= definitions
            let mut text = String::from("#");
            loop {
                let ch = self.input[self.pos];
                text.push(ch);
                self.pos += 1;
                if self.pos >= self.input.len() || ch == '#' || ch == '=' {
                    let kind = if ch == '#' {
                        TokenKind::Word
                    } else {
                        TokenKind::Operator
                    };
                    return Token::new(text, kind);
                }
            }
        }

        if c == '<' && self.looking_at("!--") {
            self.pos += 3;
            return Token::new("<!--", TokenKind::Comment);
        }
        if c == '-' && self.looking_at("->") {
            self.pos += 2;
            if wanted_newline {
                printer.print_newline(true);
            }
            return Token::new("-->", TokenKind::Comment);
        }

        let mut op = c.to_string();
        if PUNCT.contains(op.as_str()) {
            while let Some(next) = self.peek(0) {
                let mut extended = op.clone();
                extended.push(next);
                if !PUNCT.contains(extended.as_str()) {
                    break;
                }
                op = extended;
                self.pos += 1;
            }
            return Token::new(op, TokenKind::Operator);
        }

        Token::new(op, TokenKind::Unknown)
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\t' | ' ')
}

fn is_wordchar(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_bare_exponent(text: &str) -> bool {
    let mut chars = text.chars();
    if !matches!(chars.next_back(), Some('e') | Some('E')) {
        return false;
    }
    let mut saw_digit = false;
    for ch in chars {
        if !ch.is_ascii_digit() {
            return false;
        }
        saw_digit = true;
    }
    saw_digit
}

pub(crate) fn is_line_starter(word: &str) -> bool {
    LINE_STARTERS.contains(word)
}

static LINE_STARTERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "continue", "try", "throw", "return", "var", "if", "switch", "case", "default", "for",
        "while", "break",
    ]
    .into_iter()
    .collect()
});

static PUNCT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "+", "-", "*", "/", "%", "&", "++", "--", "=", "+=", "-=", "*=", "/=", "%=", "==", "===",
        "!=", "!==", ">", "<", ">=", "<=", ">>", "<<", ">>>", ">>>=", ">>=", "<<=", "&&", "&=",
        "|", "||", "!", "!!", ",", ":", "?", "^", "^=", "|=", "::",
    ]
    .into_iter()
    .collect()
});
