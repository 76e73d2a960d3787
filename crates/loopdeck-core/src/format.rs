//! Display formatting for times and progress.


/// Formats a position in seconds as `M:SS`.
///
/// Minutes are not wrapped into hours, so an hour-long track shows `60:00`.
/// Negative and non-finite input renders as `0:00`.
pub fn format_time( seconds: f64 ) -> String {
    let seconds = if seconds.is_finite() { seconds.max( 0.0 ) } else { 0.0 };
    let minutes = ( seconds / 60.0 ).floor() as u64;
    let secs = ( seconds % 60.0 ).floor() as u64;
    format!( "{}:{:02}", minutes, secs )
}


/// Returns playback progress as a percentage in `0.0..=100.0`.
///
/// A zero or unknown duration yields 0 regardless of position.
pub fn progress_percent( current_time: f64, duration: f64 ) -> f64 {
    if duration > 0.0 && current_time.is_finite() {
        ( 100.0 * current_time / duration ).clamp( 0.0, 100.0 )
    } else {
        0.0
    }
}


/// Formats a playback rate the way the speed readout shows it (`1.25x`).
pub fn format_rate( rate: f64 ) -> String {
    format!( "{:.2}x", rate )
}


/// Formats a preset label without trailing zeros (`0.75x`, `1x`, `2x`).
pub fn format_preset( rate: f64 ) -> String {
    let text = format!( "{:.2}", rate );
    let text = text.trim_end_matches( '0' ).trim_end_matches( '.' );
    format!( "{}x", text )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_format_time_zero() {
        assert_eq!( format_time( 0.0 ), "0:00" );
    }


    #[test]
    fn test_format_time_pads_seconds() {
        assert_eq!( format_time( 65.0 ), "1:05" );
        assert_eq!( format_time( 3599.0 ), "59:59" );
    }


    #[test]
    fn test_format_time_floors_fractions() {
        assert_eq!( format_time( 59.999 ), "0:59" );
        assert_eq!( format_time( 125.4 ), "2:05" );
    }


    #[test]
    fn test_format_time_does_not_wrap_hours() {
        assert_eq!( format_time( 3600.0 ), "60:00" );
    }


    #[test]
    fn test_format_time_degenerate_input() {
        assert_eq!( format_time( -4.0 ), "0:00" );
        assert_eq!( format_time( f64::NAN ), "0:00" );
        assert_eq!( format_time( f64::INFINITY ), "0:00" );
    }


    #[test]
    fn test_progress_without_duration() {
        assert_eq!( progress_percent( 0.0, 0.0 ), 0.0 );
        assert_eq!( progress_percent( 42.0, 0.0 ), 0.0 );
    }


    #[test]
    fn test_progress_midway() {
        assert_eq!( progress_percent( 30.0, 120.0 ), 25.0 );
        assert_eq!( progress_percent( 120.0, 120.0 ), 100.0 );
    }


    #[test]
    fn test_rate_labels() {
        assert_eq!( format_rate( 1.0 ), "1.00x" );
        assert_eq!( format_rate( 0.75 ), "0.75x" );
        assert_eq!( format_preset( 0.75 ), "0.75x" );
        assert_eq!( format_preset( 0.2 ), "0.2x" );
        assert_eq!( format_preset( 1.0 ), "1x" );
        assert_eq!( format_preset( 2.0 ), "2x" );
    }
}
