use ropey::Rope;

/// Cursor position in a [`TextArea`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, in chars.
    pub col: usize,
    /// Column to return to when moving vertically through shorter lines.
    goal_col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            goal_col: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.goal_col = col;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Plain-text editing area for the source and markdown modes.
#[derive(Debug, Clone, Default)]
pub struct TextArea {
    rope: Rope,
    cursor: Cursor,
}

impl TextArea {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
        }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Replace the whole text, keeping the cursor where it still fits.
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        let line = self.cursor.line.min(self.last_line());
        let col = self.cursor.col.min(self.line_len(line));
        self.cursor = Cursor::at(line, col);
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line content without its line ending.
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx).to_string();
        Some(line.trim_end_matches(['\n', '\r']).to_string())
    }

    /// Line length in chars, without its line ending.
    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx).map_or(0, |l| l.chars().count())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.split_line();
            return;
        }
        self.rope.insert_char(self.char_idx(), ch);
        self.cursor.set_col(self.cursor.col + 1);
    }

    /// Insert a line break at the cursor.
    pub fn split_line(&mut self) {
        self.rope.insert_char(self.char_idx(), '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
    }

    /// Backspace. Returns true when something was removed.
    pub fn delete_back(&mut self) -> bool {
        let idx = self.char_idx();
        if idx == 0 {
            return false;
        }
        if self.cursor.col == 0 {
            let prev_len = self.line_len(self.cursor.line - 1);
            // A CRLF ending is removed as one break.
            let start = if idx >= 2 && self.rope.char(idx - 2) == '\r' {
                idx - 2
            } else {
                idx - 1
            };
            self.rope.remove(start..idx);
            self.cursor.line -= 1;
            self.cursor.set_col(prev_len);
        } else {
            self.rope.remove(idx - 1..idx);
            self.cursor.set_col(self.cursor.col - 1);
        }
        true
    }

    /// Delete the char under the cursor. Returns true when something was removed.
    pub fn delete_forward(&mut self) -> bool {
        let idx = self.char_idx();
        if idx >= self.rope.len_chars() {
            return false;
        }
        let end = if self.rope.char(idx) == '\r'
            && idx + 1 < self.rope.len_chars()
            && self.rope.char(idx + 1) == '\n'
        {
            idx + 2
        } else {
            idx + 1
        };
        self.rope.remove(idx..end);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.cursor.col > 0 {
                    self.cursor.set_col(self.cursor.col - 1);
                } else if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.set_col(self.line_len(self.cursor.line));
                }
            }
            Direction::Right => {
                if self.cursor.col < self.line_len(self.cursor.line) {
                    self.cursor.set_col(self.cursor.col + 1);
                } else if self.cursor.line < self.last_line() {
                    self.cursor.line += 1;
                    self.cursor.set_col(0);
                }
            }
            Direction::Up => {
                if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.col = self.cursor.goal_col.min(self.line_len(self.cursor.line));
                }
            }
            Direction::Down => {
                if self.cursor.line < self.last_line() {
                    self.cursor.line += 1;
                    self.cursor.col = self.cursor.goal_col.min(self.line_len(self.cursor.line));
                }
            }
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    fn last_line(&self) -> usize {
        self.rope.len_lines().saturating_sub(1)
    }

    fn char_idx(&self) -> usize {
        self.rope.line_to_char(self.cursor.line) + self.cursor.col
    }
}
