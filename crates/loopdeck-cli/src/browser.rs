//! File picker for choosing the practice track.
//!
//! Lists directories and audio files of one directory at a time. Other
//! files are left out since they can't be opened anyway.

use std::fs;
use std::path::{ Path, PathBuf };

use anyhow::{ Context, Result };

use loopdeck_core::resource::is_audio_path;


/// A directory or audio file in the picker.
#[derive( Debug, Clone, PartialEq )]
pub struct BrowserEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
}


/// File picker state.
#[derive( Debug )]
pub struct FileBrowser {
    current_dir: PathBuf,
    entries: Vec<BrowserEntry>,
    selected: usize,
}


impl FileBrowser {
    /// Opens the picker at `path`.
    pub fn new( path: PathBuf ) -> Result<Self> {
        let mut browser = Self {
            current_dir: path,
            entries: Vec::new(),
            selected: 0,
        };
        browser.refresh()?;
        Ok( browser )
    }


    /// Opens the picker at the home directory, or the working directory.
    pub fn at_home() -> Result<Self> {
        let start = dirs::home_dir()
            .or_else( || std::env::current_dir().ok() )
            .unwrap_or_else( || PathBuf::from( "/" ) );
        Self::new( start )
    }


    /// Re-reads the current directory.
    pub fn refresh( &mut self ) -> Result<()> {
        let listing = fs::read_dir( &self.current_dir )
            .with_context( || format!( "Cannot read {}", self.current_dir.display() ) )?;

        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for entry in listing.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with( '.' ) {
                continue;
            }

            if path.is_dir() {
                dirs.push( BrowserEntry { path, name, is_dir: true } );
            } else if is_audio_path( &path ) {
                files.push( BrowserEntry { path, name, is_dir: false } );
            }
        }

        dirs.sort_by_key( |e| e.name.to_lowercase() );
        files.sort_by_key( |e| e.name.to_lowercase() );

        self.entries.clear();
        if let Some( parent ) = self.current_dir.parent() {
            self.entries.push( BrowserEntry {
                path: parent.to_path_buf(),
                name: "..".to_string(),
                is_dir: true,
            });
        }
        self.entries.extend( dirs );
        self.entries.extend( files );
        self.selected = 0;

        Ok(())
    }


    /// Changes to `path`, relative to the current directory if needed.
    /// The listing is unchanged if `path` can't be read.
    pub fn navigate_to( &mut self, path: &Path ) -> Result<()> {
        let target = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.current_dir.join( path )
        };

        let previous = std::mem::replace( &mut self.current_dir, target );
        if let Err( e ) = self.refresh() {
            self.current_dir = previous;
            return Err( e );
        }
        Ok(())
    }


    /// Enters the selected directory, or returns the selected file.
    pub fn enter_selected( &mut self ) -> Result<Option<PathBuf>> {
        let Some( entry ) = self.selected_entry().cloned() else {
            return Ok( None );
        };

        if entry.is_dir {
            self.navigate_to( &entry.path )?;
            Ok( None )
        } else {
            Ok( Some( entry.path ) )
        }
    }


    pub fn go_up( &mut self ) -> Result<()> {
        if let Some( parent ) = self.current_dir.parent().map( Path::to_path_buf ) {
            self.navigate_to( &parent )?;
        }
        Ok(())
    }


    pub fn select_next( &mut self ) {
        if !self.entries.is_empty() {
            self.selected = ( self.selected + 1 ) % self.entries.len();
        }
    }


    pub fn select_previous( &mut self ) {
        if !self.entries.is_empty() {
            self.selected = self.selected.checked_sub( 1 ).unwrap_or( self.entries.len() - 1 );
        }
    }


    pub fn select_first( &mut self ) {
        self.selected = 0;
    }


    pub fn select_last( &mut self ) {
        self.selected = self.entries.len().saturating_sub( 1 );
    }


    pub fn selected_entry( &self ) -> Option<&BrowserEntry> {
        self.entries.get( self.selected )
    }


    pub fn entries( &self ) -> &[BrowserEntry] {
        &self.entries
    }


    pub fn selected_index( &self ) -> usize {
        self.selected
    }


    pub fn current_dir( &self ) -> &Path {
        &self.current_dir
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    fn scratch_tree( name: &str ) -> PathBuf {
        let root = std::env::temp_dir().join( format!( "loopdeck-browser-{}-{}", name, std::process::id() ) );
        let _ = fs::remove_dir_all( &root );
        fs::create_dir_all( root.join( "Scales" ) ).unwrap();
        fs::create_dir_all( root.join( ".hidden" ) ).unwrap();
        fs::write( root.join( "b-take.mp3" ), b"" ).unwrap();
        fs::write( root.join( "A-take.FLAC" ), b"" ).unwrap();
        fs::write( root.join( "notes.txt" ), b"" ).unwrap();
        root
    }


    #[test]
    fn test_lists_dirs_then_audio() {
        let root = scratch_tree( "list" );
        let browser = FileBrowser::new( root.clone() ).unwrap();

        let names: Vec<&str> = browser.entries().iter().map( |e| e.name.as_str() ).collect();
        assert_eq!( names, vec![ "..", "Scales", "A-take.FLAC", "b-take.mp3" ] );

        let _ = fs::remove_dir_all( &root );
    }


    #[test]
    fn test_enter_directory_and_pick_file() {
        let root = scratch_tree( "enter" );
        fs::write( root.join( "Scales" ).join( "c-major.wav" ), b"" ).unwrap();
        let mut browser = FileBrowser::new( root.clone() ).unwrap();

        browser.select_next();
        assert_eq!( browser.enter_selected().unwrap(), None );
        assert_eq!( browser.current_dir(), root.join( "Scales" ) );

        browser.select_last();
        assert_eq!( browser.enter_selected().unwrap(), Some( root.join( "Scales" ).join( "c-major.wav" ) ) );

        browser.go_up().unwrap();
        assert_eq!( browser.current_dir(), root );

        let _ = fs::remove_dir_all( &root );
    }


    #[test]
    fn test_selection_wraps() {
        let root = scratch_tree( "wrap" );
        let mut browser = FileBrowser::new( root.clone() ).unwrap();

        browser.select_previous();
        assert_eq!( browser.selected_index(), browser.entries().len() - 1 );
        browser.select_next();
        assert_eq!( browser.selected_index(), 0 );

        let _ = fs::remove_dir_all( &root );
    }


    #[test]
    fn test_bad_directory_keeps_listing() {
        let root = scratch_tree( "bad" );
        let mut browser = FileBrowser::new( root.clone() ).unwrap();

        assert!( browser.navigate_to( Path::new( "does-not-exist" ) ).is_err() );
        assert_eq!( browser.current_dir(), root );
        assert_eq!( browser.entries().len(), 4 );

        let _ = fs::remove_dir_all( &root );
    }
}
