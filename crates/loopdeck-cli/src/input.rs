//! Input mode handling for the TUI.
//!
//! Normal mode maps keys to player actions; command mode edits a slash
//! command in an [`InputBuffer`].


/// Current input mode of the application.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
pub enum InputMode {
    /// Keyboard shortcuts active.
    #[default]
    Normal,

    /// Typing a slash command.
    Command,
}


/// Single-line text buffer with a cursor.
#[derive( Debug, Default )]
pub struct InputBuffer {
    content: String,
    /// Byte offset, always on a char boundary
    cursor: usize,
}


impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }


    pub fn insert( &mut self, c: char ) {
        self.content.insert( self.cursor, c );
        self.cursor += c.len_utf8();
    }


    /// Deletes the character before the cursor.
    pub fn backspace( &mut self ) {
        if let Some( prev ) = self.prev_boundary() {
            self.content.remove( prev );
            self.cursor = prev;
        }
    }


    /// Deletes the character under the cursor.
    pub fn delete( &mut self ) {
        if self.cursor < self.content.len() {
            self.content.remove( self.cursor );
        }
    }


    pub fn clear( &mut self ) {
        self.content.clear();
        self.cursor = 0;
    }


    pub fn content( &self ) -> &str {
        &self.content
    }


    /// Cursor position in characters, for display.
    pub fn cursor_char_pos( &self ) -> usize {
        self.content[ ..self.cursor ].chars().count()
    }


    pub fn move_left( &mut self ) {
        if let Some( prev ) = self.prev_boundary() {
            self.cursor = prev;
        }
    }


    pub fn move_right( &mut self ) {
        if let Some( c ) = self.content[ self.cursor.. ].chars().next() {
            self.cursor += c.len_utf8();
        }
    }


    pub fn move_home( &mut self ) {
        self.cursor = 0;
    }


    pub fn move_end( &mut self ) {
        self.cursor = self.content.len();
    }


    pub fn is_empty( &self ) -> bool {
        self.content.is_empty()
    }


    fn prev_boundary( &self ) -> Option<usize> {
        self.content[ ..self.cursor ].char_indices().last().map( |( i, _ )| i )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_edit_in_middle() {
        let mut buf = InputBuffer::new();
        for c in "sek 10".chars() {
            buf.insert( c );
        }
        buf.move_home();
        buf.move_right();
        buf.move_right();
        buf.insert( 'e' );
        assert_eq!( buf.content(), "seek 10" );
        assert_eq!( buf.cursor_char_pos(), 3 );
    }


    #[test]
    fn test_multibyte_cursor() {
        let mut buf = InputBuffer::new();
        buf.insert( 'é' );
        buf.insert( 'x' );
        buf.move_left();
        buf.move_left();
        assert_eq!( buf.cursor_char_pos(), 0 );
        buf.delete();
        assert_eq!( buf.content(), "x" );
        buf.move_end();
        buf.backspace();
        assert!( buf.is_empty() );
    }
}
