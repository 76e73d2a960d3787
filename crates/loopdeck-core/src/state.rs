//! Player state
//!
//! Everything the control surface renders lives in [`PlayerState`]. It is
//! owned and mutated only by the controller.

use crate::format;
use crate::resource::Resource;


/// Lower bound of the speed slider.
pub const RATE_SLIDER_MIN: f64 = 0.2;

/// Upper bound of the speed slider. Presets may go beyond it.
pub const RATE_SLIDER_MAX: f64 = 1.8;

/// Speed slider granularity.
pub const RATE_SLIDER_STEP: f64 = 0.05;

/// Speed presets offered next to the slider.
pub const RATE_PRESETS: [f64; 12] = [
    0.2, 0.3, 0.4, 0.5, 0.6, 0.75, 0.9, 1.0, 1.25, 1.5, 1.75, 2.0,
];

/// Granularity of the seek and loop sliders, in seconds.
pub const POSITION_STEP: f64 = 0.1;


/// An A/B loop window in seconds.
///
/// Bounds are kept as set; `start > end` is legal and yields a window that
/// sends every position at or past `end` back to `start`.
#[derive( Debug, Clone, Copy, PartialEq )]
pub struct LoopWindow {
    pub start: f64,
    pub end: f64,
}


impl LoopWindow {
    /// True when a playhead at `position` must be sent back to `start`.
    pub fn is_exceeded_by( &self, position: f64 ) -> bool {
        position >= self.end
    }
}


/// Observable state of the player.
#[derive( Debug )]
pub struct PlayerState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub playback_rate: f64,
    pub volume: f64,
    pub source: Option<Resource>,
    pub loop_start: f64,
    pub loop_end: f64,
    pub is_looping: bool,
    /// Set when the element reports the source can't be played.
    pub load_error: Option<String>,
}


impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            playback_rate: 1.0,
            volume: 1.0,
            source: None,
            loop_start: 0.0,
            loop_end: 0.0,
            is_looping: false,
            load_error: None,
        }
    }
}


impl PlayerState {
    pub fn has_source( &self ) -> bool {
        self.source.is_some()
    }


    /// Display name of the loaded source.
    pub fn source_name( &self ) -> Option<&str> {
        self.source.as_ref().map( |s| s.name() )
    }


    pub fn loop_window( &self ) -> LoopWindow {
        LoopWindow { start: self.loop_start, end: self.loop_end }
    }


    /// Playback progress in percent, see [`format::progress_percent`].
    pub fn progress_percent( &self ) -> f64 {
        format::progress_percent( self.current_time, self.duration )
    }


    /// Index into [`RATE_PRESETS`] of the preset equal to the current rate.
    pub fn active_preset( &self ) -> Option<usize> {
        RATE_PRESETS.iter().position( |p| *p == self.playback_rate )
    }


    /// Resets everything tied to the previous source. Rate and volume stay.
    pub(crate) fn reset_for_source( &mut self, source: Resource ) {
        self.source = Some( source );
        self.is_playing = false;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.loop_start = 0.0;
        self.loop_end = 0.0;
        self.load_error = None;
    }
}


/// Moves a slider rate by `steps` slider steps, staying on the slider grid.
pub fn step_rate( rate: f64, steps: i32 ) -> f64 {
    let stepped = rate + steps as f64 * RATE_SLIDER_STEP;
    let clamped = stepped.clamp( RATE_SLIDER_MIN, RATE_SLIDER_MAX );
    ( clamped * 100.0 ).round() / 100.0
}


/// Returns the preset after (or before, for negative `offset`) `rate`.
///
/// Rates between presets snap to the nearest preset in the direction of
/// travel. Saturates at both ends.
pub fn cycle_preset( rate: f64, offset: i32 ) -> f64 {
    if offset >= 0 {
        RATE_PRESETS.iter()
            .copied()
            .filter( |p| *p > rate )
            .nth( ( offset.max( 1 ) - 1 ) as usize )
            .unwrap_or( RATE_PRESETS[ RATE_PRESETS.len() - 1 ] )
    } else {
        RATE_PRESETS.iter()
            .rev()
            .copied()
            .filter( |p| *p < rate )
            .nth( ( -offset - 1 ) as usize )
            .unwrap_or( RATE_PRESETS[ 0 ] )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_defaults() {
        let state = PlayerState::default();
        assert!( !state.is_playing );
        assert!( !state.has_source() );
        assert_eq!( state.playback_rate, 1.0 );
        assert_eq!( state.volume, 1.0 );
        assert_eq!( state.loop_window(), LoopWindow { start: 0.0, end: 0.0 } );
        assert_eq!( state.progress_percent(), 0.0 );
    }


    #[test]
    fn test_reset_keeps_preferences() {
        let mut state = PlayerState {
            playback_rate: 0.75,
            volume: 0.4,
            current_time: 33.0,
            duration: 90.0,
            loop_start: 10.0,
            loop_end: 20.0,
            is_playing: true,
            load_error: Some( "bad".into() ),
            ..Default::default()
        };

        state.reset_for_source( Resource::new( "/tmp/b.ogg" ) );

        assert_eq!( state.source_name(), Some( "b.ogg" ) );
        assert_eq!( state.current_time, 0.0 );
        assert_eq!( state.duration, 0.0 );
        assert_eq!( state.loop_start, 0.0 );
        assert_eq!( state.loop_end, 0.0 );
        assert!( !state.is_playing );
        assert!( state.load_error.is_none() );
        assert_eq!( state.playback_rate, 0.75 );
        assert_eq!( state.volume, 0.4 );
    }


    #[test]
    fn test_window_uses_non_strict_end() {
        let window = LoopWindow { start: 5.0, end: 10.0 };
        assert!( !window.is_exceeded_by( 9.9 ) );
        assert!( window.is_exceeded_by( 10.0 ) );
        assert!( window.is_exceeded_by( 10.1 ) );
    }


    #[test]
    fn test_active_preset() {
        let mut state = PlayerState::default();
        assert_eq!( state.active_preset(), Some( 7 ) );
        state.playback_rate = 1.1;
        assert_eq!( state.active_preset(), None );
    }


    #[test]
    fn test_step_rate_stays_on_grid() {
        assert_eq!( step_rate( 1.0, 1 ), 1.05 );
        assert_eq!( step_rate( 1.0, -4 ), 0.8 );
        assert_eq!( step_rate( 0.2, -1 ), 0.2 );
        assert_eq!( step_rate( 1.8, 1 ), 1.8 );
        assert_eq!( step_rate( 2.0, -1 ), 1.8 );

        let mut rate = 0.2;
        for _ in 0..32 {
            rate = step_rate( rate, 1 );
        }
        assert_eq!( rate, 1.8 );
    }


    #[test]
    fn test_cycle_preset() {
        assert_eq!( cycle_preset( 1.0, 1 ), 1.25 );
        assert_eq!( cycle_preset( 1.0, -1 ), 0.9 );
        assert_eq!( cycle_preset( 1.1, 1 ), 1.25 );
        assert_eq!( cycle_preset( 1.1, -1 ), 1.0 );
        assert_eq!( cycle_preset( 2.0, 1 ), 2.0 );
        assert_eq!( cycle_preset( 0.2, -1 ), 0.2 );
        assert_eq!( cycle_preset( 0.5, 2 ), 0.75 );
    }
}
