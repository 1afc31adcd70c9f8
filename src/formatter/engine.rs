use super::{
    emitter::Emitter,
    lexer::{is_line_starter, Token, TokenKind, Tokenizer},
};
use crate::config::FormatConfig;

const SCRIPT_OPEN: &str = "<script type=\"text/javascript\">";
const SCRIPT_CLOSE: &str = "</script>";

/// Reformats a JavaScript source string. Total: malformed input is
/// formatted on a best-effort basis instead of being rejected.
pub fn format_text(input: &str, config: &FormatConfig) -> String {
    let (source, add_script_tags) = strip_script_tags(input);
    let mut formatter = Formatter::new(&source, config);
    let body = formatter.format();
    if add_script_tags {
        let mut framed =
            String::with_capacity(SCRIPT_OPEN.len() + body.len() + SCRIPT_CLOSE.len());
        framed.push_str(SCRIPT_OPEN);
        framed.push_str(&body);
        framed.push_str(SCRIPT_CLOSE);
        framed
    } else {
        body
    }
}

/// One-shot formatter handle: captures the source and options, formats on
/// the first `result` call and hands back the same cached string after
/// that.
pub struct Beautifier {
    source: String,
    config: FormatConfig,
    result: Option<String>,
}

impl Beautifier {
    pub fn new(source: impl Into<String>, config: &FormatConfig) -> Self {
        Self {
            source: source.into(),
            config: config.clone(),
            result: None,
        }
    }

    pub fn result(&mut self) -> &str {
        if self.result.is_none() {
            self.result = Some(format_text(&self.source, &self.config));
        }
        self.result.as_deref().unwrap_or_default()
    }
}

fn strip_script_tags(input: &str) -> (String, bool) {
    let stripped = input.replacen(SCRIPT_OPEN, "", 1).replacen(SCRIPT_CLOSE, "", 1);
    let both_removed = input
        .len()
        .checked_sub(SCRIPT_OPEN.len() + SCRIPT_CLOSE.len())
        .map(|expected| stripped.len() == expected)
        .unwrap_or(false);
    if both_removed {
        (stripped, true)
    } else {
        (input.to_string(), false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Block,
    Expression,
    DoBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    None,
    Newline,
    Space,
}

struct Formatter {
    tokenizer: Tokenizer,
    printer: Emitter,
    modes: Vec<Mode>,
    last_kind: TokenKind,
    last_text: String,
    last_word: String,
    var_line: bool,
    var_line_tainted: bool,
    in_case: bool,
    do_block_just_closed: bool,
}

impl Formatter {
    fn new(source: &str, config: &FormatConfig) -> Self {
        let indent_string = config.indent_char.to_string().repeat(config.indent_size);
        Self {
            tokenizer: Tokenizer::new(source, config.preserve_newlines),
            printer: Emitter::new(indent_string, config.indent_level),
            modes: vec![Mode::Block],
            last_kind: TokenKind::StartExpr,
            last_text: String::new(),
            last_word: String::new(),
            var_line: false,
            var_line_tainted: false,
            in_case: false,
            do_block_just_closed: false,
        }
    }

    fn format(&mut self) -> String {
        loop {
            let token = self
                .tokenizer
                .next_token(&mut self.printer, self.last_kind, &self.last_text);
            if token.kind == TokenKind::Eof {
                break;
            }
            self.handle_token(&token);
            self.last_kind = token.kind;
            self.last_text = token.text;
        }
        self.printer.take_output()
    }

    fn handle_token(&mut self, token: &Token) {
        match token.kind {
            TokenKind::StartExpr => self.handle_start_expr(token),
            TokenKind::EndExpr => self.handle_end_expr(token),
            TokenKind::StartBlock => self.handle_start_block(token),
            TokenKind::EndBlock => self.handle_end_block(token),
            TokenKind::Word => self.handle_word(token),
            TokenKind::Semicolon => self.handle_semicolon(token),
            TokenKind::StringLiteral => self.handle_string(token),
            TokenKind::Operator => self.handle_operator(token),
            TokenKind::BlockComment => self.handle_block_comment(token),
            TokenKind::Comment => self.handle_comment(token),
            TokenKind::Unknown => self.handle_unknown(token),
            TokenKind::Eof => {}
        }
    }

    fn current_mode(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Block)
    }

    fn set_mode(&mut self, mode: Mode) {
        self.modes.push(mode);
    }

    fn restore_mode(&mut self) {
        self.do_block_just_closed = false;
        // the bottom Block entry stays even when closers are unmatched
        if self.modes.len() > 1 {
            if let Some(popped) = self.modes.pop() {
                self.do_block_just_closed = popped == Mode::DoBlock;
            }
        }
    }

    fn handle_start_expr(&mut self, token: &Token) {
        self.set_mode(Mode::Expression);
        if self.last_text == ";"
            || matches!(
                self.last_kind,
                TokenKind::StartBlock | TokenKind::EndExpr | TokenKind::StartExpr
            )
        {
            self.printer.print_newline(true);
        } else if !matches!(self.last_kind, TokenKind::Word | TokenKind::Operator) {
            self.printer.print_space();
        } else if is_line_starter(&self.last_word) {
            self.printer.print_space();
        }
        self.printer.print_token(&token.text);
    }

    fn handle_end_expr(&mut self, token: &Token) {
        self.printer.print_token(&token.text);
        self.restore_mode();
    }

    fn handle_start_block(&mut self, token: &Token) {
        if self.last_word == "do" {
            self.set_mode(Mode::DoBlock);
        } else {
            self.set_mode(Mode::Block);
        }
        if !matches!(self.last_kind, TokenKind::Operator | TokenKind::StartExpr) {
            if self.last_kind == TokenKind::StartBlock {
                self.printer.print_newline(true);
            } else {
                self.printer.print_space();
            }
        }
        self.printer.print_token(&token.text);
        self.printer.indent();
    }

    fn handle_end_block(&mut self, token: &Token) {
        if self.last_kind == TokenKind::StartBlock {
            // nothing between the braces: keep {} on one line
            self.printer.trim_output();
            self.printer.unindent();
        } else {
            self.printer.unindent();
            self.printer.print_newline(true);
        }
        self.printer.print_token(&token.text);
        self.restore_mode();
    }

    fn handle_word(&mut self, token: &Token) {
        if self.do_block_just_closed {
            // do { ... } while: the word lands between the braces' line
            self.printer.print_space();
            self.printer.print_token(&token.text);
            self.printer.print_space();
            self.do_block_just_closed = false;
            return;
        }

        if token.text == "case" || token.text == "default" {
            if self.last_text == ":" {
                self.printer.remove_indent();
            } else {
                self.printer.unindent();
                self.printer.print_newline(true);
                self.printer.indent();
            }
            self.printer.print_token(&token.text);
            self.in_case = true;
            return;
        }

        let mut prefix = Prefix::None;
        match self.last_kind {
            TokenKind::EndBlock => {
                if matches!(token.text.as_str(), "else" | "catch" | "finally") {
                    prefix = Prefix::Space;
                    self.printer.print_space();
                } else {
                    prefix = Prefix::Newline;
                }
            }
            TokenKind::Semicolon => {
                prefix = if self.current_mode() == Mode::Expression {
                    Prefix::Space
                } else {
                    Prefix::Newline
                };
            }
            TokenKind::StringLiteral => prefix = Prefix::Newline,
            TokenKind::Word => prefix = Prefix::Space,
            TokenKind::StartBlock => prefix = Prefix::Newline,
            TokenKind::EndExpr => {
                self.printer.print_space();
                prefix = Prefix::Newline;
            }
            _ => {}
        }

        if self.last_kind != TokenKind::EndBlock
            && matches!(token.text.as_str(), "else" | "catch" | "finally")
        {
            self.printer.print_newline(true);
        } else if is_line_starter(&token.text) || prefix == Prefix::Newline {
            if self.last_text == "else" {
                self.printer.print_space();
            } else if (self.last_kind == TokenKind::StartExpr
                || self.last_text == "="
                || self.last_text == ",")
                && token.text == "function"
            {
                // function expressions stay glued to (, = and ,
            } else if self.last_kind == TokenKind::Word
                && (self.last_text == "return" || self.last_text == "throw")
            {
                self.printer.print_space();
            } else if self.last_kind != TokenKind::EndExpr {
                if (self.last_kind != TokenKind::StartExpr || token.text != "var")
                    && self.last_text != ":"
                {
                    if token.text == "if" && self.last_word == "else" {
                        self.printer.print_space();
                    } else {
                        self.printer.print_newline(true);
                    }
                }
            } else if is_line_starter(&token.text) && self.last_text != ")" {
                self.printer.print_newline(true);
            }
        } else if prefix == Prefix::Space {
            self.printer.print_space();
        }

        self.printer.print_token(&token.text);
        self.last_word = token.text.clone();
        if token.text == "var" {
            self.var_line = true;
            self.var_line_tainted = false;
        }
        if token.text == "if" || token.text == "else" {
            self.printer.set_if_line_flag(true);
        }
    }

    fn handle_semicolon(&mut self, token: &Token) {
        self.printer.print_token(&token.text);
        self.var_line = false;
    }

    fn handle_string(&mut self, token: &Token) {
        if matches!(
            self.last_kind,
            TokenKind::StartBlock | TokenKind::EndBlock | TokenKind::Semicolon
        ) {
            self.printer.print_newline(true);
        } else if self.last_kind == TokenKind::Word {
            self.printer.print_space();
        }
        self.printer.print_token(&token.text);
    }

    fn handle_operator(&mut self, token: &Token) {
        let text = token.text.as_str();
        let mut start_delim = true;
        let mut end_delim = true;

        if self.var_line && text != "," {
            self.var_line_tainted = true;
            if text == ":" {
                self.var_line = false;
            }
        }
        if self.var_line && text == "," && self.current_mode() == Mode::Expression {
            // for (var a = 1, b = 2;;) keeps its commas in-line
            self.var_line_tainted = false;
        }

        if text == ":" && self.in_case {
            self.printer.print_token(text);
            self.printer.print_newline(true);
            self.in_case = false;
            return;
        }

        if text == "::" {
            self.printer.print_token(text);
            return;
        }

        if text == "," {
            if self.var_line {
                if self.var_line_tainted {
                    self.printer.print_token(text);
                    self.printer.print_newline(true);
                    self.var_line_tainted = false;
                } else {
                    self.printer.print_token(text);
                    self.printer.print_space();
                }
            } else if self.last_kind == TokenKind::EndBlock {
                self.printer.print_token(text);
                self.printer.print_newline(true);
            } else if self.current_mode() == Mode::Block {
                self.printer.print_token(text);
                self.printer.print_newline(true);
            } else {
                self.printer.print_token(text);
                self.printer.print_space();
            }
            return;
        }

        if text == "++" || text == "--" {
            if self.last_text == ";" {
                if self.current_mode() == Mode::Block {
                    // { foo; ++bar; }
                    self.printer.print_newline(true);
                }
                start_delim = true;
                end_delim = false;
            } else {
                if self.last_text == "{" {
                    self.printer.print_newline(true);
                }
                start_delim = false;
                end_delim = false;
            }
        } else if matches!(text, "!" | "+" | "-")
            && (self.last_text == "return" || self.last_text == "case")
        {
            start_delim = true;
            end_delim = false;
        } else if matches!(text, "!" | "+" | "-") && self.last_kind == TokenKind::StartExpr {
            start_delim = false;
            end_delim = false;
        } else if self.last_kind == TokenKind::Operator {
            start_delim = false;
            end_delim = false;
        } else if self.last_kind == TokenKind::EndExpr {
            start_delim = true;
            end_delim = true;
        } else if text == "." {
            start_delim = false;
            end_delim = false;
        } else if text == ":" {
            start_delim = self.printer.colon_is_ternary();
        }

        if start_delim {
            self.printer.print_space();
        }
        self.printer.print_token(text);
        if end_delim {
            self.printer.print_space();
        }
    }

    fn handle_block_comment(&mut self, token: &Token) {
        self.printer.print_newline(true);
        self.printer.print_token(&token.text);
        self.printer.print_newline(true);
    }

    fn handle_comment(&mut self, token: &Token) {
        self.printer.print_space();
        self.printer.print_token(&token.text);
        self.printer.print_newline(true);
    }

    fn handle_unknown(&mut self, token: &Token) {
        if self.last_text != token.text
            && matches!(self.last_kind, TokenKind::Semicolon | TokenKind::StartBlock)
        {
            self.printer.print_newline(true);
        }
        self.printer.print_token(&token.text);
    }
}
