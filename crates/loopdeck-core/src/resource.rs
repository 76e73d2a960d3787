//! Local audio resources
//!
//! A [`Resource`] is the playable handle for a user-selected file. The
//! controller owns exactly one at a time; replacing it drops (releases) the
//! previous one.

use std::path::{ Path, PathBuf };
use std::sync::atomic::{ AtomicU64, Ordering };

use thiserror::Error;


/// Extensions highlighted as audio in the file browser.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "wav", "m4a", "aac", "opus", "aiff", "alac", "mp4",
];


static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new( 1 );


/// Errors that can occur when resolving a resource.
#[derive( Debug, Error )]
pub enum ResourceError {
    #[error( "File not found: {0}" )]
    NotFound( PathBuf ),

    #[error( "Not a file: {0}" )]
    NotAFile( PathBuf ),

    #[error( "IO error: {0}" )]
    Io( #[from] std::io::Error ),
}


/// Playable reference to a local audio file plus its display name.
#[derive( Debug )]
pub struct Resource {
    id: u64,
    path: PathBuf,
    name: String,
}


impl Resource {
    /// Opens a user-selected file.
    ///
    /// Only existence is checked; whether the file decodes is up to the
    /// media element.
    pub fn open( path: impl Into<PathBuf> ) -> Result<Self, ResourceError> {
        let path = path.into();
        let meta = match std::fs::metadata( &path ) {
            Ok( m ) => m,
            Err( e ) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err( ResourceError::NotFound( path ) );
            }
            Err( e ) => return Err( ResourceError::Io( e ) ),
        };

        if !meta.is_file() {
            return Err( ResourceError::NotAFile( path ) );
        }

        Ok( Self::new( path ) )
    }


    /// Wraps a path without touching the filesystem.
    pub fn new( path: impl Into<PathBuf> ) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map( |n| n.to_string_lossy().to_string() )
            .unwrap_or_else( || path.display().to_string() );
        let id = NEXT_RESOURCE_ID.fetch_add( 1, Ordering::Relaxed );

        tracing::debug!( "Acquired resource #{}: {:?}", id, path );
        Self { id, path, name }
    }


    /// Unique id of this handle. Two opens of the same file differ.
    pub fn id( &self ) -> u64 {
        self.id
    }


    pub fn path( &self ) -> &Path {
        &self.path
    }


    /// File name shown in the UI.
    pub fn name( &self ) -> &str {
        &self.name
    }
}


impl Drop for Resource {
    fn drop( &mut self ) {
        tracing::debug!( "Released resource #{}: {}", self.id, self.name );
    }
}


/// Checks if a path has an audio extension.
pub fn is_audio_path( path: &Path ) -> bool {
    path.extension()
        .and_then( |e| e.to_str() )
        .map( |e| AUDIO_EXTENSIONS.contains( &e.to_lowercase().as_str() ) )
        .unwrap_or( false )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_name_from_path() {
        let res = Resource::new( "/music/etudes/op10.flac" );
        assert_eq!( res.name(), "op10.flac" );
        assert_eq!( res.path(), Path::new( "/music/etudes/op10.flac" ) );
    }


    #[test]
    fn test_ids_are_unique() {
        let a = Resource::new( "/a.mp3" );
        let b = Resource::new( "/a.mp3" );
        assert_ne!( a.id(), b.id() );
    }


    #[test]
    fn test_open_missing_file() {
        let result = Resource::open( "/definitely/not/here.wav" );
        assert!( matches!( result, Err( ResourceError::NotFound( _ ) ) ) );
    }


    #[test]
    fn test_open_directory() {
        let result = Resource::open( std::env::temp_dir() );
        assert!( matches!( result, Err( ResourceError::NotAFile( _ ) ) ) );
    }


    #[test]
    fn test_audio_extensions() {
        assert!( is_audio_path( Path::new( "song.MP3" ) ) );
        assert!( is_audio_path( Path::new( "take.wav" ) ) );
        assert!( !is_audio_path( Path::new( "notes.txt" ) ) );
        assert!( !is_audio_path( Path::new( "README" ) ) );
    }
}
