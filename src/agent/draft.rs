/// Unsent chat text of one agent card, with a byte-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDraft {
    buffer: String,
    cursor: usize,
}

impl TextDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replaces the whole draft and puts the cursor at the end.
    pub fn set(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.buffer.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.buffer.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    pub fn delete(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            let end = self.cursor + ch.len_utf8();
            self.buffer.drain(self.cursor..end);
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.buffer[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.buffer[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor = self.buffer[..self.cursor]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
    }

    pub fn move_to_line_end(&mut self) {
        self.cursor = self.buffer[self.cursor..]
            .find('\n')
            .map(|pos| self.cursor + pos)
            .unwrap_or(self.buffer.len());
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// (col, row) of the cursor once the text is wrapped at `width` cells.
    pub fn cursor_display_position(&self, width: usize) -> (u16, u16) {
        if width == 0 {
            return (0, 0);
        }
        let mut col = 0usize;
        let mut row = 0usize;
        for ch in self.buffer[..self.cursor].chars() {
            if ch == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            let char_width = unicode_width::UnicodeWidthChar::width(ch)
                .unwrap_or(1)
                .max(1);
            if col + char_width > width {
                row += 1;
                col = 0;
            }
            col += char_width;
            if col >= width {
                row += 1;
                col = 0;
            }
        }
        (col as u16, row as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_multibyte_text() {
        let mut draft = TextDraft::new();
        for ch in "héllo".chars() {
            draft.insert_char(ch);
        }
        draft.move_left();
        draft.move_left();
        draft.move_left();
        draft.backspace();
        assert_eq!(draft.text(), "hllo");
        draft.delete();
        assert_eq!(draft.text(), "hlo");
        draft.move_to_line_end();
        draft.insert_newline();
        draft.insert_char('x');
        assert_eq!(draft.text(), "hlo\nx");
        assert_eq!(draft.cursor_display_position(10), (1, 1));
        draft.move_to_line_start();
        assert_eq!(draft.cursor_display_position(10), (0, 1));
    }

    #[test]
    fn blank_detection() {
        let mut draft = TextDraft::new();
        draft.set("  \n ");
        assert!(draft.is_blank());
        assert!(!draft.is_empty());
        draft.clear();
        assert!(draft.is_empty());
    }
}
