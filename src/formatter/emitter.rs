pub(crate) struct Emitter {
    output: String,
    indent_string: String,
    indent_level: usize,
    if_line_flag: bool,
}

impl Emitter {
    pub(crate) fn new(indent_string: String, indent_level: usize) -> Self {
        Self {
            output: String::new(),
            indent_string,
            indent_level,
            if_line_flag: false,
        }
    }

    pub(crate) fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    pub(crate) fn if_line_flag(&self) -> bool {
        self.if_line_flag
    }

    pub(crate) fn set_if_line_flag(&mut self, value: bool) {
        self.if_line_flag = value;
    }

    pub(crate) fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub(crate) fn unindent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Strips one trailing indent unit, if present. Used to pull a `case`
    /// label back when it directly follows another label's colon.
    pub(crate) fn remove_indent(&mut self) {
        if !self.indent_string.is_empty() && self.output.ends_with(self.indent_string.as_str()) {
            let keep = self.output.len() - self.indent_string.len();
            self.output.truncate(keep);
        }
    }

    pub(crate) fn print_token(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub(crate) fn print_space(&mut self) {
        if self.output.is_empty() {
            return;
        }
        if self.output.ends_with(' ') || self.output.ends_with('\n') {
            return;
        }
        if !self.indent_string.is_empty() && self.output.ends_with(self.indent_string.as_str()) {
            return;
        }
        self.output.push(' ');
    }

    /// Terminates the current line and writes the indentation for the next
    /// one. With `ignore_repeat` set, a line that already ended stays as it
    /// is; passing `false` forces an extra newline (one preserved blank
    /// line). No newline is ever written at the very start of the output.
    pub(crate) fn print_newline(&mut self, ignore_repeat: bool) {
        self.if_line_flag = false;
        self.trim_output();
        if self.output.is_empty() {
            return;
        }
        if !ignore_repeat || !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        for _ in 0..self.indent_level {
            self.output.push_str(&self.indent_string);
        }
    }

    pub(crate) fn trim_output(&mut self) {
        loop {
            if self.output.ends_with(' ') {
                self.output.pop();
            } else if !self.indent_string.is_empty()
                && self.output.ends_with(self.indent_string.as_str())
            {
                let keep = self.output.len() - self.indent_string.len();
                self.output.truncate(keep);
            } else {
                break;
            }
        }
    }

    /// Decides whether the colon about to be printed belongs to a ternary.
    /// Walks the buffer backwards, balancing brackets: an unanswered `?`
    /// at level zero means ternary, an enclosing `{` means an object
    /// literal or label.
    pub(crate) fn colon_is_ternary(&self) -> bool {
        let mut level = 0i32;
        let mut colon_count = 0i32;
        for byte in self.output.bytes().rev() {
            match byte {
                b':' if level == 0 => colon_count += 1,
                b'?' if level == 0 => {
                    if colon_count == 0 {
                        return true;
                    }
                    colon_count -= 1;
                }
                b'{' => {
                    if level == 0 {
                        return false;
                    }
                    level -= 1;
                }
                b'(' | b'[' => level -= 1,
                b')' | b']' | b'}' => level += 1,
                _ => {}
            }
        }
        false
    }
}
