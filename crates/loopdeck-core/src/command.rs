//! Slash command parsing.
//!
//! Commands are typed in the TUI after `/` and map one-to-one onto
//! controller intents.

use std::path::PathBuf;

use thiserror::Error;


/// Errors that can occur during command parsing or execution.
#[derive( Debug, Error )]
pub enum CommandError {
    #[error( "Unknown command: {0}" )]
    Unknown( String ),

    #[error( "Invalid argument: {0}" )]
    InvalidArgument( String ),

    #[error( "Missing argument: {0}" )]
    MissingArgument( String ),

    #[error( "Execution failed: {0}" )]
    ExecutionFailed( String ),
}


/// Parsed slash command.
#[derive( Debug, Clone, PartialEq )]
pub enum Command {
    // Source
    Open { path: PathBuf },

    // Transport
    Play,
    Pause,
    Seek { position: f64 },
    Skip { delta: f64 },
    Reset,

    // Speed and volume
    /// `None` goes back to 1x.
    Rate { rate: Option<f64> },
    /// Percent; `None` reports the current level.
    Volume { level: Option<u32> },

    // Loop
    /// Sets both bounds, or toggles the loop when `None`.
    Loop { bounds: Option<( f64, f64 )> },
    /// `None` captures the current position.
    LoopStart { at: Option<f64> },
    LoopEnd { at: Option<f64> },

    Help,
    Quit,
}


impl Command {
    /// Parses a command string (without the leading `/`).
    pub fn parse( input: &str ) -> Result<Self, CommandError> {
        let input = input.trim();
        let mut parts = input.splitn( 2, ' ' );
        let cmd = parts.next().unwrap_or( "" ).to_lowercase();
        let args = parts.next().map( |s| s.trim() ).filter( |s| !s.is_empty() );

        match cmd.as_str() {
            "open" | "o" | "load" => {
                let path = args
                    .ok_or_else( || CommandError::MissingArgument( "path".into() ) )?;
                Ok( Command::Open { path: expand_home( path ) } )
            }

            "play" | "p" => Ok( Command::Play ),
            "pause" | "pa" => Ok( Command::Pause ),
            "seek" | "sk" => {
                let time = args
                    .ok_or_else( || CommandError::MissingArgument( "time position".into() ) )?;
                Ok( Command::Seek { position: parse_time( time )? } )
            }
            "skip" | "ff" => {
                let delta = args
                    .ok_or_else( || CommandError::MissingArgument( "seconds".into() ) )?;
                Ok( Command::Skip { delta: parse_offset( delta )? } )
            }
            "reset" | "rw" => Ok( Command::Reset ),

            "rate" | "speed" | "r" => {
                let rate = args.map( parse_rate ).transpose()?;
                Ok( Command::Rate { rate } )
            }
            "vol" | "volume" => {
                let level = args
                    .map( |s| s.trim_end_matches( '%' ).parse::<u32>()
                        .map_err( |_| CommandError::InvalidArgument( format!( "Invalid volume: {}", s ) ) ) )
                    .transpose()?;
                if let Some( level ) = level {
                    if level > 100 {
                        return Err( CommandError::InvalidArgument( format!( "Volume out of range: {}", level ) ) );
                    }
                }
                Ok( Command::Volume { level } )
            }

            "loop" | "l" => {
                let bounds = match args {
                    None => None,
                    Some( args ) => {
                        let mut times = args.split_whitespace();
                        let start = times.next()
                            .ok_or_else( || CommandError::MissingArgument( "loop start".into() ) )?;
                        let end = times.next()
                            .ok_or_else( || CommandError::MissingArgument( "loop end".into() ) )?;
                        Some(( parse_time( start )?, parse_time( end )? ))
                    }
                };
                Ok( Command::Loop { bounds } )
            }
            "start" | "a" => Ok( Command::LoopStart { at: args.map( parse_time ).transpose()? } ),
            "end" | "b" => Ok( Command::LoopEnd { at: args.map( parse_time ).transpose()? } ),

            "help" | "h" => Ok( Command::Help ),
            "quit" | "q" | "exit" => Ok( Command::Quit ),

            "" => Err( CommandError::Unknown( "empty command".into() ) ),
            other => Err( CommandError::Unknown( other.to_string() ) ),
        }
    }


    /// Returns a brief description of the command for help text.
    pub fn description( &self ) -> &'static str {
        match self {
            Command::Open { .. } => "Open an audio file",
            Command::Play => "Start playback",
            Command::Pause => "Pause playback",
            Command::Seek { .. } => "Seek to position",
            Command::Skip { .. } => "Skip forward or back",
            Command::Reset => "Back to the start",
            Command::Rate { .. } => "Set playback speed",
            Command::Volume { .. } => "Set volume (0-100)",
            Command::Loop { .. } => "Set or toggle the A/B loop",
            Command::LoopStart { .. } => "Set loop start",
            Command::LoopEnd { .. } => "Set loop end",
            Command::Help => "Show help",
            Command::Quit => "Quit application",
        }
    }
}


/// Parses a time like "1:30", "1:05.5", "90" or "12.5" into seconds.
pub fn parse_time( s: &str ) -> Result<f64, CommandError> {
    let s = s.trim();
    let invalid = || CommandError::InvalidArgument( format!( "Invalid time: {}", s ) );

    let seconds = if let Some(( min, sec )) = s.split_once( ':' ) {
        let minutes: u64 = min.parse().map_err( |_| invalid() )?;
        let seconds: f64 = sec.parse().map_err( |_| invalid() )?;
        if !( 0.0..60.0 ).contains( &seconds ) {
            return Err( invalid() );
        }
        minutes as f64 * 60.0 + seconds
    } else {
        s.parse::<f64>().map_err( |_| invalid() )?
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err( invalid() );
    }
    Ok( seconds )
}


/// Parses a signed offset such as "+10", "-5" or "-1:00".
fn parse_offset( s: &str ) -> Result<f64, CommandError> {
    let s = s.trim();
    match s.strip_prefix( '-' ) {
        Some( rest ) => Ok( -parse_time( rest )? ),
        None => parse_time( s.strip_prefix( '+' ).unwrap_or( s ) ),
    }
}


/// Parses a rate like "0.75" or "0.75x".
fn parse_rate( s: &str ) -> Result<f64, CommandError> {
    let rate: f64 = s.trim_end_matches( [ 'x', 'X' ] )
        .parse()
        .map_err( |_| CommandError::InvalidArgument( format!( "Invalid rate: {}", s ) ) )?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err( CommandError::InvalidArgument( format!( "Rate must be positive: {}", s ) ) );
    }
    Ok( rate )
}


fn expand_home( path: &str ) -> PathBuf {
    if let Some( rest ) = path.strip_prefix( "~/" ) {
        if let Some( home ) = std::env::var_os( "HOME" ) {
            return PathBuf::from( home ).join( rest );
        }
    }
    PathBuf::from( path )
}


/// Returns help text listing all available commands.
pub fn help_text() -> &'static str {
    r#"Source:
  /open <path>        Open an audio file          [o]

Transport:
  /play  /pause       Start or pause              [Space]
  /seek <time>        Seek to position (1:30)     [, .]
  /skip <±secs>       Skip forward or back        [← →]
  /reset              Back to the start           [Home r]

Speed & volume:
  /rate [x]           Set speed, no value = 1x    [+ - p P]
  /vol [0-100]        Set volume                  [↑ ↓]

Loop:
  /loop [start end]   Set bounds, or toggle       [l]
  /start [time]       Loop start, default = now   [ [ ]
  /end [time]         Loop end, default = now     [ ] ]
                      Nudge start / end           [{ }] [< >]

Other:
  /help               Show this help              [?]
  /quit               Exit loopdeck               [q]"#
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_parse_open() {
        let cmd = Command::parse( "open /music/take 3.wav" ).unwrap();
        assert_eq!( cmd, Command::Open { path: PathBuf::from( "/music/take 3.wav" ) } );
    }


    #[test]
    fn test_parse_seek() {
        assert_eq!( Command::parse( "seek 1:30" ).unwrap(), Command::Seek { position: 90.0 } );
        assert_eq!( Command::parse( "seek 45" ).unwrap(), Command::Seek { position: 45.0 } );
        assert_eq!( Command::parse( "sk 1:05.5" ).unwrap(), Command::Seek { position: 65.5 } );
    }


    #[test]
    fn test_parse_skip_signed() {
        assert_eq!( Command::parse( "skip -5" ).unwrap(), Command::Skip { delta: -5.0 } );
        assert_eq!( Command::parse( "skip +10" ).unwrap(), Command::Skip { delta: 10.0 } );
        assert_eq!( Command::parse( "skip -1:00" ).unwrap(), Command::Skip { delta: -60.0 } );
    }


    #[test]
    fn test_parse_rate() {
        assert_eq!( Command::parse( "rate 0.75x" ).unwrap(), Command::Rate { rate: Some( 0.75 ) } );
        assert_eq!( Command::parse( "rate" ).unwrap(), Command::Rate { rate: None } );
        assert!( matches!( Command::parse( "rate 0" ), Err( CommandError::InvalidArgument( _ ) ) ) );
    }


    #[test]
    fn test_parse_volume() {
        assert_eq!( Command::parse( "vol 40%" ).unwrap(), Command::Volume { level: Some( 40 ) } );
        assert_eq!( Command::parse( "vol" ).unwrap(), Command::Volume { level: None } );
        assert!( Command::parse( "vol 140" ).is_err() );
        assert!( Command::parse( "vol loud" ).is_err() );
    }


    #[test]
    fn test_parse_loop() {
        assert_eq!(
            Command::parse( "loop 0:12 0:20.5" ).unwrap(),
            Command::Loop { bounds: Some(( 12.0, 20.5 )) }
        );
        assert_eq!( Command::parse( "loop" ).unwrap(), Command::Loop { bounds: None } );
        assert!( matches!( Command::parse( "loop 12" ), Err( CommandError::MissingArgument( _ ) ) ) );
    }


    #[test]
    fn test_parse_loop_bounds() {
        assert_eq!( Command::parse( "start" ).unwrap(), Command::LoopStart { at: None } );
        assert_eq!( Command::parse( "end 2:00" ).unwrap(), Command::LoopEnd { at: Some( 120.0 ) } );
    }


    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!( parse_time( "abc" ).is_err() );
        assert!( parse_time( "1:75" ).is_err() );
        assert!( parse_time( "-3" ).is_err() );
        assert!( parse_time( "inf" ).is_err() );
        assert_eq!( parse_time( "12.5" ).unwrap(), 12.5 );
    }


    #[test]
    fn test_parse_unknown() {
        let result = Command::parse( "foobar" );
        assert!( matches!( result, Err( CommandError::Unknown( _ ) ) ) );
        assert!( Command::parse( "" ).is_err() );
    }


    #[test]
    fn test_parse_missing_arg() {
        let result = Command::parse( "open" );
        assert!( matches!( result, Err( CommandError::MissingArgument( _ ) ) ) );
    }
}
