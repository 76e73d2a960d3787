//! Command-line argument parsing for Loopdeck.

use std::path::PathBuf;

use clap::Parser;


/// Loopdeck - A terminal practice player with speed control and A/B looping.
#[derive( Parser, Debug )]
#[command( name = "loopdeck" )]
#[command( version, about, long_about = None )]
pub struct Args {
    /// Audio file to open on startup.
    pub file: Option<PathBuf>,

    /// Directory the file browser starts in.
    #[arg( short, long )]
    pub path: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace). Overrides settings.
    #[arg( long )]
    pub log_level: Option<String>,

    /// Initial playback rate, e.g. 0.75.
    #[arg( short, long, value_parser = parse_rate )]
    pub rate: Option<f64>,

    /// Initial volume in percent.
    #[arg( short, long, value_parser = clap::value_parser!( u32 ).range( 0..=100 ) )]
    pub volume: Option<u32>,

    /// Loop window to enable once the file is ready, in seconds or M:SS.
    #[arg( short = 'l', long = "loop", num_args = 2, value_names = [ "START", "END" ], value_parser = parse_time )]
    pub loop_window: Option<Vec<f64>>,
}


fn parse_rate( s: &str ) -> Result<f64, String> {
    match s.trim_end_matches( 'x' ).parse::<f64>() {
        Ok( rate ) if rate.is_finite() && rate > 0.0 => Ok( rate ),
        _ => Err( format!( "invalid rate '{}'", s ) ),
    }
}


fn parse_time( s: &str ) -> Result<f64, String> {
    loopdeck_core::command::parse_time( s ).map_err( |e| e.to_string() )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_parse_full_args() {
        let args = Args::try_parse_from([
            "loopdeck", "take.flac", "--rate", "0.75x", "--volume", "80", "--loop", "0:12", "20.5",
        ]).unwrap();

        assert_eq!( args.file, Some( PathBuf::from( "take.flac" ) ) );
        assert_eq!( args.rate, Some( 0.75 ) );
        assert_eq!( args.volume, Some( 80 ) );
        assert_eq!( args.loop_window, Some( vec![ 12.0, 20.5 ] ) );
    }


    #[test]
    fn test_rejects_bad_values() {
        assert!( Args::try_parse_from([ "loopdeck", "--rate", "0" ]).is_err() );
        assert!( Args::try_parse_from([ "loopdeck", "--volume", "150" ]).is_err() );
        assert!( Args::try_parse_from([ "loopdeck", "--loop", "5" ]).is_err() );
    }
}
