use std::fmt;

/// Single-line text input used by the task form.
///
/// The cursor is a character index, so multi-byte text (Cyrillic, emoji)
/// is edited per character, never per byte.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    text: String,
    cursor: usize,
    /// First visible character when the text is wider than the field
    scroll: usize,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_string(content: impl Into<String>) -> Self {
        let text: String = content.into();
        let cursor = text.chars().count();
        Self { text, cursor, scroll: 0 }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' || ch == '\r' {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor (Backspace)
    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    /// Delete the character under the cursor (Delete)
    pub fn delete_forward(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Keep the cursor inside a field `width` characters wide
    pub fn update_horizontal_scroll(&mut self, width: usize) {
        if width == 0 {
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + width {
            self.scroll = self.cursor + 1 - width;
        }
    }

    /// Visible slice of the text and the cursor column inside it
    pub fn visible(&self, width: usize) -> (String, usize) {
        let shown = self.text.chars().skip(self.scroll).take(width).collect();
        (shown, self.cursor.saturating_sub(self.scroll))
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
