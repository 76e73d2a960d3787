//! Log file setup.
//!
//! The terminal belongs to the TUI, so tracing output goes to
//! `<data_local_dir>/loopdeck/loopdeck.log`.

use std::fs::{ self, OpenOptions };
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{ Context, Result };
use tracing_subscriber::EnvFilter;


/// Returns the log file location.
pub fn log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map( |p| p.join( "loopdeck" ).join( "loopdeck.log" ) )
}


/// Installs the global subscriber. `RUST_LOG` wins over `level`.
///
/// Returns the log path, or None when there is nowhere to write.
pub fn init( level: &str ) -> Result<Option<PathBuf>> {
    let Some( path ) = log_path() else {
        return Ok( None );
    };

    if let Some( parent ) = path.parent() {
        fs::create_dir_all( parent )
            .with_context( || format!( "Failed to create log directory {:?}", parent ) )?;
    }

    let file = OpenOptions::new()
        .create( true )
        .append( true )
        .open( &path )
        .with_context( || format!( "Failed to open log file {:?}", path ) )?;

    let filter = EnvFilter::try_from_default_env()
        .or_else( |_| EnvFilter::try_new( level ) )
        .unwrap_or_else( |_| EnvFilter::new( "info" ) );

    tracing_subscriber::fmt()
        .with_env_filter( filter )
        .with_writer( Mutex::new( file ) )
        .with_ansi( false )
        .with_target( false )
        .try_init()
        .map_err( |e| anyhow::anyhow!( "Failed to install logger: {}", e ) )?;

    Ok( Some( path ) )
}
