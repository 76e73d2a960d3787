//! Application settings management
//!
//! Key step sizes and logging preferences, persisted as JSON. Player state
//! itself is never written back.

use std::fs;
use std::path::{ Path, PathBuf };
use std::time::Duration;

use serde::{ Deserialize, Serialize };

use loopdeck_core::state::POSITION_STEP;


/// Application settings.
#[derive( Debug, Clone, PartialEq, Serialize, Deserialize )]
#[serde( default )]
pub struct Settings {
    /// Seconds moved by the skip keys
    pub skip_seconds: f64,

    /// Volume change per key press (0.0 to 1.0)
    pub volume_step: f64,

    /// Seconds moved by the fine seek and loop nudge keys
    pub nudge_seconds: f64,

    /// Log filter used when RUST_LOG is not set
    pub log_level: String,

    /// Time notification cadence while playing
    pub notify_interval_ms: u64,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            skip_seconds: 10.0,
            volume_step: 0.05,
            nudge_seconds: POSITION_STEP,
            log_level: "info".to_string(),
            notify_interval_ms: 250,
        }
    }
}


impl Settings {
    /// Returns the path to the settings file.
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map( |p| p.join( "loopdeck" ).join( "settings.json" ) )
    }


    /// Loads settings from disk. A missing file is created with defaults;
    /// an unreadable one falls back to defaults.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some( path ) => Self::load_from( &path ),
            None => Self::default(),
        }
    }


    fn load_from( path: &Path ) -> Self {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to( path );
            return settings;
        }

        match fs::read_to_string( path ) {
            Ok( contents ) => match serde_json::from_str( &contents ) {
                Ok( settings ) => settings,
                Err( e ) => {
                    tracing::warn!( "Ignoring malformed settings {:?}: {}", path, e );
                    Self::default()
                }
            },
            Err( e ) => {
                tracing::warn!( "Failed to read settings: {}", e );
                Self::default()
            }
        }
    }


    fn save_to( &self, path: &Path ) {
        if let Some( parent ) = path.parent() {
            if !parent.exists() {
                if let Err( e ) = fs::create_dir_all( parent ) {
                    tracing::warn!( "Failed to create settings directory: {}", e );
                    return;
                }
            }
        }

        match serde_json::to_string_pretty( self ) {
            Ok( json ) => {
                if let Err( e ) = fs::write( path, json ) {
                    tracing::warn!( "Failed to save settings: {}", e );
                }
            }
            Err( e ) => {
                tracing::warn!( "Failed to serialize settings: {}", e );
            }
        }
    }


    pub fn notify_interval( &self ) -> Duration {
        Duration::from_millis( self.notify_interval_ms.max( 10 ) )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    fn scratch_dir( name: &str ) -> PathBuf {
        let dir = std::env::temp_dir().join( format!( "loopdeck-settings-{}-{}", name, std::process::id() ) );
        let _ = fs::remove_dir_all( &dir );
        dir
    }


    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = scratch_dir( "missing" );
        let path = dir.join( "settings.json" );

        assert_eq!( Settings::load_from( &path ), Settings::default() );
        assert!( path.exists() );

        let _ = fs::remove_dir_all( &dir );
    }


    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = scratch_dir( "partial" );
        fs::create_dir_all( &dir ).unwrap();
        let path = dir.join( "settings.json" );
        fs::write( &path, r#"{ "skip_seconds": 5.0 }"# ).unwrap();

        let settings = Settings::load_from( &path );
        assert_eq!( settings.skip_seconds, 5.0 );
        assert_eq!( settings.volume_step, 0.05 );
        assert_eq!( settings.log_level, "info" );

        let _ = fs::remove_dir_all( &dir );
    }


    #[test]
    fn test_malformed_file_falls_back() {
        let dir = scratch_dir( "malformed" );
        fs::create_dir_all( &dir ).unwrap();
        let path = dir.join( "settings.json" );
        fs::write( &path, "not json" ).unwrap();

        assert_eq!( Settings::load_from( &path ), Settings::default() );

        let _ = fs::remove_dir_all( &dir );
    }


    #[test]
    fn test_notify_interval_has_floor() {
        let settings = Settings { notify_interval_ms: 0, ..Settings::default() };
        assert_eq!( settings.notify_interval(), Duration::from_millis( 10 ) );
    }
}
