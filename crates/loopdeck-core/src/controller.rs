//! Player controller
//!
//! [`PlayerController`] owns the [`PlayerState`] and the media element. The
//! control surface calls the intent methods; element notifications queue up
//! on an internal channel and are applied by [`PlayerController::pump`].
//! Every state change is published as a [`PlayerEvent`] to the receivers
//! handed out by [`PlayerController::watch`].

use std::sync::mpsc::{ self, Receiver, Sender };

use thiserror::Error;

use crate::media::{ Delivery, MediaElement, MediaError, Notification, NotificationSink };
use crate::monitor::{ LoopMonitor, TimeObserver };
use crate::resource::Resource;
use crate::state::{ self, PlayerState };


/// Errors returned by controller intents.
#[derive( Debug, Error )]
pub enum ControllerError {
    #[error( "No source loaded" )]
    NoSource,

    #[error( "Invalid playback rate: {0}" )]
    InvalidRate( f64 ),

    #[error( "Invalid volume: {0}" )]
    InvalidVolume( f64 ),

    #[error( "Invalid time: {0}" )]
    InvalidTime( f64 ),

    #[error( "Media element error: {0}" )]
    Media( #[from] MediaError ),
}


/// Change notifications for the control surface.
#[derive( Debug, Clone, PartialEq )]
pub enum PlayerEvent {
    SourceChanged { name: String },
    DurationKnown { duration: f64 },
    LoadFailed { message: String },
    PlaybackChanged { playing: bool },
    PositionChanged { position: f64 },
    RateChanged { rate: f64 },
    VolumeChanged { volume: f64 },
    LoopChanged { start: f64, end: f64, active: bool },
    /// The loop monitor sent the playhead back to the loop start.
    LoopedBack { to: f64 },
    Ended,
    Error { message: String },
}


/// Owns player state and keeps it consistent with the media element.
pub struct PlayerController<M: MediaElement> {
    media: M,
    state: PlayerState,
    sink: NotificationSink,
    inbox: Receiver<Delivery>,
    observer: TimeObserver,
    loop_monitor: LoopMonitor,
    watchers: Vec<Sender<PlayerEvent>>,
}


impl<M: MediaElement> PlayerController<M> {
    /// Creates a controller with default state.
    ///
    /// The element's rate and volume are aligned with the defaults.
    pub fn new( mut media: M ) -> Self {
        let ( sink, inbox ) = mpsc::channel();
        let state = PlayerState::default();
        media.set_playback_rate( state.playback_rate );
        media.set_volume( state.volume );

        Self {
            media,
            state,
            sink,
            inbox,
            observer: TimeObserver::new(),
            loop_monitor: LoopMonitor::Inactive,
            watchers: Vec::new(),
        }
    }


    /// Read model for the control surface.
    pub fn state( &self ) -> &PlayerState {
        &self.state
    }


    pub fn media( &self ) -> &M {
        &self.media
    }


    pub fn media_mut( &mut self ) -> &mut M {
        &mut self.media
    }


    /// Returns a receiver for state change events.
    pub fn watch( &mut self ) -> Receiver<PlayerEvent> {
        let ( tx, rx ) = mpsc::channel();
        self.watchers.push( tx );
        rx
    }


    /// Applies all queued element notifications. Returns how many were
    /// processed, including stale ones that were dropped.
    pub fn pump( &mut self ) -> usize {
        let mut handled = 0;
        while let Ok( delivery ) = self.inbox.try_recv() {
            self.dispatch( delivery );
            handled += 1;
        }
        handled
    }


    // ---------------------------------------------------------------------
    // Intents
    // ---------------------------------------------------------------------

    /// Replaces the current source.
    ///
    /// Position, play state and loop bounds reset; rate and volume carry
    /// over. The previous resource is released. Duration stays 0 until the
    /// element reports metadata.
    pub fn load_source( &mut self, resource: Resource ) {
        tracing::info!( "Loading source: {:?}", resource.path() );

        // Subscribe before loading so the metadata notification can't be missed.
        self.observer.reattach( &mut self.media, &self.sink );
        self.media.load( &resource );
        self.media.set_playback_rate( self.state.playback_rate );
        self.media.set_volume( self.state.volume );

        let name = resource.name().to_string();
        self.state.reset_for_source( resource );
        self.sync_loop_monitor();

        self.publish( PlayerEvent::SourceChanged { name } );
        self.publish( PlayerEvent::PlaybackChanged { playing: false } );
        self.publish( PlayerEvent::PositionChanged { position: 0.0 } );
        self.publish_loop();
    }


    /// Starts or pauses playback.
    pub fn toggle_play_pause( &mut self ) -> Result<(), ControllerError> {
        if !self.state.has_source() {
            return Err( ControllerError::NoSource );
        }

        if self.state.is_playing {
            self.media.pause();
            tracing::info!( "Paused" );
        } else if let Err( e ) = self.media.play() {
            tracing::warn!( "Play failed: {}", e );
            self.publish( PlayerEvent::Error { message: e.to_string() } );
            return Err( e.into() );
        } else {
            tracing::info!( "Playing" );
        }

        self.state.is_playing = !self.state.is_playing;
        self.publish( PlayerEvent::PlaybackChanged { playing: self.state.is_playing } );
        Ok(())
    }


    /// Moves the playhead to `seconds`.
    ///
    /// Out-of-range values are passed through; the element clamps them. The
    /// state takes the requested value until the next time notification.
    pub fn seek( &mut self, seconds: f64 ) -> Result<(), ControllerError> {
        if !seconds.is_finite() {
            return Err( ControllerError::InvalidTime( seconds ) );
        }

        tracing::debug!( "Seek to {:.2}s", seconds );
        self.media.set_position( seconds );
        self.state.current_time = seconds;
        self.publish( PlayerEvent::PositionChanged { position: seconds } );
        Ok(())
    }


    /// Seeks back to the start of the track.
    pub fn reset_position( &mut self ) -> Result<(), ControllerError> {
        self.seek( 0.0 )
    }


    /// Seeks relative to the current position, clamped to the track.
    pub fn skip_by( &mut self, delta: f64 ) -> Result<(), ControllerError> {
        if !delta.is_finite() {
            return Err( ControllerError::InvalidTime( delta ) );
        }
        let target = ( self.state.current_time + delta ).clamp( 0.0, self.state.duration.max( 0.0 ) );
        self.seek( target )
    }


    /// Sets the playback rate exactly as given.
    pub fn set_playback_rate( &mut self, rate: f64 ) -> Result<(), ControllerError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err( ControllerError::InvalidRate( rate ) );
        }

        tracing::info!( "Playback rate: {}", rate );
        self.media.set_playback_rate( rate );
        self.state.playback_rate = rate;
        self.publish( PlayerEvent::RateChanged { rate } );
        Ok(())
    }


    /// Moves the rate along the speed slider grid.
    pub fn step_playback_rate( &mut self, steps: i32 ) -> Result<(), ControllerError> {
        self.set_playback_rate( state::step_rate( self.state.playback_rate, steps ) )
    }


    /// Jumps to a neighbouring speed preset.
    pub fn cycle_preset( &mut self, offset: i32 ) -> Result<(), ControllerError> {
        self.set_playback_rate( state::cycle_preset( self.state.playback_rate, offset ) )
    }


    /// Sets the output gain, clamped to `[0, 1]`.
    pub fn set_volume( &mut self, level: f64 ) -> Result<(), ControllerError> {
        if !level.is_finite() {
            return Err( ControllerError::InvalidVolume( level ) );
        }

        let volume = level.clamp( 0.0, 1.0 );
        self.media.set_volume( volume );
        self.state.volume = volume;
        self.publish( PlayerEvent::VolumeChanged { volume } );
        Ok(())
    }


    /// Sets both loop bounds at once, as the range control does.
    ///
    /// Bounds are not reordered.
    pub fn set_loop_bounds( &mut self, start: f64, end: f64 ) -> Result<(), ControllerError> {
        for value in [ start, end ] {
            if !value.is_finite() {
                return Err( ControllerError::InvalidTime( value ) );
            }
        }

        self.state.loop_start = start;
        self.state.loop_end = end;
        self.loop_changed();
        Ok(())
    }


    pub fn set_loop_start( &mut self, start: f64 ) -> Result<(), ControllerError> {
        self.set_loop_bounds( start, self.state.loop_end )
    }


    pub fn set_loop_end( &mut self, end: f64 ) -> Result<(), ControllerError> {
        self.set_loop_bounds( self.state.loop_start, end )
    }


    /// Moves the loop start by `delta`, staying within the track.
    pub fn nudge_loop_start( &mut self, delta: f64 ) -> Result<(), ControllerError> {
        let start = self.nudged( self.state.loop_start, delta )?;
        self.set_loop_start( start )
    }


    /// Moves the loop end by `delta`, staying within the track.
    pub fn nudge_loop_end( &mut self, delta: f64 ) -> Result<(), ControllerError> {
        let end = self.nudged( self.state.loop_end, delta )?;
        self.set_loop_end( end )
    }


    fn nudged( &self, value: f64, delta: f64 ) -> Result<f64, ControllerError> {
        if !delta.is_finite() {
            return Err( ControllerError::InvalidTime( delta ) );
        }
        Ok( ( value + delta ).clamp( 0.0, self.state.duration.max( 0.0 ) ) )
    }


    /// Sets the loop start to the current position.
    pub fn capture_loop_start( &mut self ) {
        self.state.loop_start = self.state.current_time;
        self.loop_changed();
    }


    /// Sets the loop end to the current position.
    pub fn capture_loop_end( &mut self ) {
        self.state.loop_end = self.state.current_time;
        self.loop_changed();
    }


    /// Turns loop enforcement on or off.
    pub fn toggle_loop( &mut self ) {
        self.state.is_looping = !self.state.is_looping;
        tracing::info!( "Loop {}", if self.state.is_looping { "on" } else { "off" } );
        self.loop_changed();
    }


    // ---------------------------------------------------------------------
    // Notification handling
    // ---------------------------------------------------------------------

    fn dispatch( &mut self, delivery: Delivery ) {
        let Delivery { subscription, notification } = delivery;

        if self.observer.owns( subscription ) {
            match notification {
                Notification::TimeAdvanced => self.on_time_advanced(),
                Notification::MetadataReady => self.on_metadata_ready(),
                Notification::LoadFailed { message } => self.on_load_failed( message ),
                Notification::Ended => self.on_ended(),
            }
        } else if self.loop_monitor.owns( subscription ) {
            self.enforce_loop();
        } else {
            tracing::trace!( "Dropping stale {:?} for subscription {}", notification, subscription.id() );
        }
    }


    fn on_time_advanced( &mut self ) {
        self.state.current_time = self.media.position();
        self.publish( PlayerEvent::PositionChanged { position: self.state.current_time } );
    }


    fn on_metadata_ready( &mut self ) {
        let duration = self.media.duration();
        if duration <= 0.0 {
            // Metadata from a source replaced before this pump
            tracing::debug!( "Ignoring metadata-ready without a duration" );
            return;
        }
        tracing::info!( "Metadata ready: duration {:.2}s", duration );

        self.observer.load_settled( &mut self.media );
        self.state.duration = duration;
        self.state.loop_end = duration;
        self.sync_loop_monitor();

        self.publish( PlayerEvent::DurationKnown { duration } );
        self.publish_loop();
    }


    fn on_load_failed( &mut self, message: String ) {
        tracing::warn!( "Source failed to load: {}", message );

        self.observer.load_settled( &mut self.media );
        self.state.is_playing = false;
        self.state.load_error = Some( message.clone() );
        self.publish( PlayerEvent::LoadFailed { message } );
    }


    /// End of track. A running loop keeps going from its start; otherwise
    /// the transport stops, matching the element.
    fn on_ended( &mut self ) {
        self.state.current_time = self.media.position();

        if self.loop_monitor.is_active() && self.state.is_playing {
            let start = self.state.loop_start;
            tracing::debug!( "Track ended inside loop, restarting at {:.2}s", start );
            self.media.set_position( start );
            if let Err( e ) = self.media.play() {
                tracing::warn!( "Loop restart failed: {}", e );
                self.state.is_playing = false;
                self.publish( PlayerEvent::Error { message: e.to_string() } );
                self.publish( PlayerEvent::PlaybackChanged { playing: false } );
                return;
            }
            self.state.current_time = start;
            self.publish( PlayerEvent::LoopedBack { to: start } );
            return;
        }

        self.state.is_playing = false;
        self.publish( PlayerEvent::Ended );
        self.publish( PlayerEvent::PlaybackChanged { playing: false } );
    }


    fn enforce_loop( &mut self ) {
        let position = self.media.position();
        if let Some( start ) = self.loop_monitor.check( position ) {
            tracing::debug!( "Loop end reached at {:.2}s, back to {:.2}s", position, start );
            self.media.set_position( start );
            self.state.current_time = start;
            self.publish( PlayerEvent::LoopedBack { to: start } );
        }
    }


    fn loop_changed( &mut self ) {
        self.sync_loop_monitor();
        self.publish_loop();
    }


    fn sync_loop_monitor( &mut self ) {
        let window = self.state.loop_window();
        self.loop_monitor.sync( &mut self.media, &self.sink, self.state.is_looping, window );
    }


    fn publish_loop( &mut self ) {
        self.publish( PlayerEvent::LoopChanged {
            start: self.state.loop_start,
            end: self.state.loop_end,
            active: self.state.is_looping,
        });
    }


    fn publish( &mut self, event: PlayerEvent ) {
        self.watchers.retain( |w| w.send( event.clone() ).is_ok() );
    }
}


impl<M: MediaElement> Drop for PlayerController<M> {
    fn drop( &mut self ) {
        self.observer.detach( &mut self.media );
        if let LoopMonitor::Active { subscription, .. } = self.loop_monitor {
            self.media.unsubscribe( subscription );
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::media::fake::FakeElement;
    use crate::state::RATE_PRESETS;


    fn loaded( duration: f64 ) -> PlayerController<FakeElement> {
        let mut player = PlayerController::new( FakeElement::default() );
        player.load_source( Resource::new( "/music/take.wav" ) );
        player.media_mut().ready( duration );
        player.pump();
        player
    }


    fn drain( rx: &Receiver<PlayerEvent> ) -> Vec<PlayerEvent> {
        rx.try_iter().collect()
    }


    #[test]
    fn test_load_resets_position_and_loop() {
        let mut player = loaded( 120.0 );
        player.set_loop_bounds( 10.0, 20.0 ).unwrap();
        player.toggle_play_pause().unwrap();
        player.media_mut().advance_to( 42.0 );
        player.pump();

        player.load_source( Resource::new( "/music/other.mp3" ) );

        let state = player.state();
        assert_eq!( state.current_time, 0.0 );
        assert!( !state.is_playing );
        assert_eq!( state.loop_start, 0.0 );
        assert_eq!( state.loop_end, 0.0 );
        assert_eq!( state.duration, 0.0 );
        assert_eq!( state.source_name(), Some( "other.mp3" ) );
        assert_eq!( player.media().loads, 2 );
    }


    #[test]
    fn test_load_keeps_rate_and_volume() {
        let mut player = loaded( 60.0 );
        player.set_playback_rate( 0.75 ).unwrap();
        player.set_volume( 0.3 ).unwrap();

        player.load_source( Resource::new( "/music/next.flac" ) );

        assert_eq!( player.state().playback_rate, 0.75 );
        assert_eq!( player.state().volume, 0.3 );
        assert_eq!( player.media().rate, 0.75 );
        assert_eq!( player.media().volume, 0.3 );
    }


    #[test]
    fn test_metadata_sets_duration_and_loop_end_once() {
        let mut player = PlayerController::new( FakeElement::default() );
        player.load_source( Resource::new( "/music/take.wav" ) );
        assert_eq!( player.state().duration, 0.0 );

        player.media_mut().ready( 93.5 );
        player.pump();
        assert_eq!( player.state().duration, 93.5 );
        assert_eq!( player.state().loop_end, 93.5 );

        player.set_loop_end( 40.0 ).unwrap();
        for _ in 0..3 {
            assert_eq!( player.state().duration, 93.5 );
        }
        player.media_mut().repeat_metadata();
        player.pump();
        assert_eq!( player.state().loop_end, 40.0 );
    }


    #[test]
    fn test_time_advanced_tracks_element() {
        let mut player = loaded( 30.0 );
        player.media_mut().advance_to( 12.25 );
        player.pump();
        assert_eq!( player.state().current_time, 12.25 );
        assert!(( player.state().progress_percent() - 100.0 * 12.25 / 30.0 ).abs() < 1e-9 );
    }


    #[test]
    fn test_loop_seeks_once_at_end() {
        let mut player = loaded( 20.0 );
        player.set_loop_bounds( 5.0, 10.0 ).unwrap();
        player.toggle_loop();
        player.toggle_play_pause().unwrap();

        player.media_mut().advance_to( 9.0 );
        player.pump();
        player.media_mut().advance_to( 9.9 );
        player.pump();
        assert!( player.media().seeks.is_empty() );

        player.media_mut().advance_to( 10.0 );
        player.pump();
        assert_eq!( player.media().seeks, vec![ 5.0 ] );
        assert_eq!( player.state().current_time, 5.0 );

        // Playback continues from the loop start.
        player.media_mut().advance( 0.1 );
        player.pump();
        assert_eq!( player.media().seeks, vec![ 5.0 ] );
    }


    #[test]
    fn test_no_seek_while_loop_off() {
        let mut player = loaded( 20.0 );
        player.set_loop_bounds( 5.0, 10.0 ).unwrap();
        player.toggle_play_pause().unwrap();

        for t in [ 9.0, 9.9, 10.0, 10.1, 15.0 ] {
            player.media_mut().advance_to( t );
            player.pump();
        }
        assert!( player.media().seeks.is_empty() );
        assert_eq!( player.state().current_time, 15.0 );
    }


    #[test]
    fn test_bound_edit_applies_without_toggle() {
        let mut player = loaded( 60.0 );
        player.set_loop_bounds( 0.0, 30.0 ).unwrap();
        player.toggle_loop();

        player.media_mut().advance_to( 20.0 );
        player.pump();
        assert!( player.media().seeks.is_empty() );

        player.set_loop_end( 15.0 ).unwrap();
        player.media_mut().advance_to( 20.5 );
        player.pump();
        assert_eq!( player.media().seeks, vec![ 0.0 ] );
    }


    #[test]
    fn test_toggling_loop_off_stops_enforcement() {
        let mut player = loaded( 60.0 );
        player.set_loop_bounds( 2.0, 4.0 ).unwrap();
        player.toggle_loop();
        player.toggle_loop();

        player.media_mut().advance_to( 8.0 );
        player.pump();
        assert!( player.media().seeks.is_empty() );
        assert!( !player.state().is_looping );
    }


    #[test]
    fn test_nudge_loop_bounds_stay_in_track() {
        let mut player = loaded( 30.0 );
        player.set_loop_bounds( 0.05, 29.95 ).unwrap();

        player.nudge_loop_start( -0.1 ).unwrap();
        player.nudge_loop_end( 0.1 ).unwrap();
        assert_eq!( player.state().loop_start, 0.0 );
        assert_eq!( player.state().loop_end, 30.0 );

        player.nudge_loop_start( 2.5 ).unwrap();
        assert_eq!( player.state().loop_start, 2.5 );
        assert!( player.nudge_loop_end( f64::INFINITY ).is_err() );
    }


    #[test]
    fn test_inverted_window_is_kept() {
        let mut player = loaded( 60.0 );
        player.media_mut().advance_to( 30.0 );
        player.pump();
        player.capture_loop_start();
        player.media_mut().advance_to( 10.0 );
        player.pump();
        player.capture_loop_end();

        assert_eq!( player.state().loop_start, 30.0 );
        assert_eq!( player.state().loop_end, 10.0 );

        // Everything at or past the end goes back to the (later) start.
        player.toggle_loop();
        player.media_mut().advance_to( 12.0 );
        player.pump();
        assert_eq!( player.media().seeks, vec![ 30.0 ] );
    }


    #[test]
    fn test_stale_notifications_after_source_change_are_dropped() {
        let mut player = PlayerController::new( FakeElement::default() );
        player.load_source( Resource::new( "/music/one.wav" ) );

        // Queue a metadata delivery for the first source, then switch.
        player.media_mut().ready( 50.0 );
        player.load_source( Resource::new( "/music/two.wav" ) );
        player.pump();

        assert_eq!( player.state().duration, 0.0 );
        assert_eq!( player.state().loop_end, 0.0 );
    }


    #[test]
    fn test_metadata_without_duration_waits_for_next() {
        let mut player = PlayerController::new( FakeElement::default() );
        player.load_source( Resource::new( "/music/take.wav" ) );
        player.media_mut().repeat_metadata();
        player.pump();
        assert_eq!( player.state().duration, 0.0 );

        player.media_mut().ready( 42.0 );
        player.pump();
        assert_eq!( player.state().duration, 42.0 );
        assert_eq!( player.state().loop_end, 42.0 );
    }


    #[test]
    fn test_skip_back_clamps_at_zero() {
        let mut player = loaded( 100.0 );
        player.media_mut().advance_to( 3.0 );
        player.pump();

        player.skip_by( -10.0 ).unwrap();
        assert_eq!( player.state().current_time, 0.0 );
        assert_eq!( player.media().seeks, vec![ 0.0 ] );
    }


    #[test]
    fn test_skip_forward_clamps_at_duration() {
        let mut player = loaded( 100.0 );
        player.media_mut().advance_to( 97.0 );
        player.pump();

        player.skip_by( 10.0 ).unwrap();
        assert_eq!( player.state().current_time, 100.0 );
    }


    #[test]
    fn test_seek_is_optimistic_and_unclamped() {
        let mut player = loaded( 100.0 );
        player.seek( 250.0 ).unwrap();
        assert_eq!( player.state().current_time, 250.0 );
        assert_eq!( player.media().seeks, vec![ 250.0 ] );

        // The element clamps; the next notification reconciles.
        player.media_mut().advance( 0.0 );
        player.pump();
        assert_eq!( player.state().current_time, 100.0 );

        assert!( matches!( player.seek( f64::NAN ), Err( ControllerError::InvalidTime( _ ) ) ) );
    }


    #[test]
    fn test_reset_position() {
        let mut player = loaded( 100.0 );
        player.media_mut().advance_to( 40.0 );
        player.pump();
        player.reset_position().unwrap();
        assert_eq!( player.state().current_time, 0.0 );
        assert_eq!( player.media().position, 0.0 );
    }


    #[test]
    fn test_presets_reach_element_exactly() {
        let mut player = loaded( 10.0 );
        for preset in RATE_PRESETS {
            player.set_playback_rate( preset ).unwrap();
            assert_eq!( player.media().rate, preset );
            assert_eq!( player.state().playback_rate, preset );
            assert_eq!( player.state().active_preset().map( |i| RATE_PRESETS[ i ] ), Some( preset ) );
        }
    }


    #[test]
    fn test_rate_validation() {
        let mut player = loaded( 10.0 );
        assert!( matches!( player.set_playback_rate( 0.0 ), Err( ControllerError::InvalidRate( _ ) ) ) );
        assert!( matches!( player.set_playback_rate( -1.0 ), Err( ControllerError::InvalidRate( _ ) ) ) );
        assert_eq!( player.media().rate, 1.0 );
    }


    #[test]
    fn test_rate_stepping_and_presets() {
        let mut player = loaded( 10.0 );
        player.step_playback_rate( 2 ).unwrap();
        assert_eq!( player.media().rate, 1.1 );
        player.cycle_preset( 1 ).unwrap();
        assert_eq!( player.media().rate, 1.25 );
        player.cycle_preset( -3 ).unwrap();
        assert_eq!( player.media().rate, 0.75 );
    }


    #[test]
    fn test_volume_is_clamped() {
        let mut player = loaded( 10.0 );
        player.set_volume( 1.7 ).unwrap();
        assert_eq!( player.media().volume, 1.0 );
        player.set_volume( -0.5 ).unwrap();
        assert_eq!( player.state().volume, 0.0 );
        assert!( player.set_volume( f64::NAN ).is_err() );
    }


    #[test]
    fn test_play_without_source() {
        let mut player = PlayerController::new( FakeElement::default() );
        assert!( matches!( player.toggle_play_pause(), Err( ControllerError::NoSource ) ) );
        assert!( !player.state().is_playing );
    }


    #[test]
    fn test_toggle_play_pause_mirrors_element() {
        let mut player = loaded( 10.0 );
        player.toggle_play_pause().unwrap();
        assert!( player.state().is_playing );
        assert!( player.media().playing );
        player.toggle_play_pause().unwrap();
        assert!( !player.state().is_playing );
        assert!( !player.media().playing );
    }


    #[test]
    fn test_play_failure_is_soft() {
        let mut player = loaded( 10.0 );
        let rx = player.watch();
        player.media_mut().fail_play = true;

        assert!( matches!( player.toggle_play_pause(), Err( ControllerError::Media( _ ) ) ) );
        assert!( !player.state().is_playing );
        assert!( drain( &rx ).iter().any( |e| matches!( e, PlayerEvent::Error { .. } ) ) );
    }


    #[test]
    fn test_load_failure_sets_error() {
        let mut player = PlayerController::new( FakeElement::default() );
        let rx = player.watch();
        player.load_source( Resource::new( "/music/notes.txt" ) );
        player.media_mut().fail( "Unsupported format" );
        player.pump();

        assert_eq!( player.state().load_error.as_deref(), Some( "Unsupported format" ) );
        assert_eq!( player.state().duration, 0.0 );
        assert_eq!( player.state().progress_percent(), 0.0 );
        assert!( drain( &rx ).contains( &PlayerEvent::LoadFailed { message: "Unsupported format".into() } ) );

        player.load_source( Resource::new( "/music/take.wav" ) );
        assert!( player.state().load_error.is_none() );
    }


    #[test]
    fn test_end_of_track_stops_transport() {
        let mut player = loaded( 10.0 );
        player.toggle_play_pause().unwrap();
        player.media_mut().end();
        player.pump();

        assert!( !player.state().is_playing );
        assert_eq!( player.state().current_time, 10.0 );
    }


    #[test]
    fn test_end_of_track_inside_loop_restarts() {
        let mut player = loaded( 10.0 );
        player.set_loop_start( 4.0 ).unwrap();
        player.toggle_loop();
        player.toggle_play_pause().unwrap();
        player.media_mut().end();
        player.pump();

        assert!( player.state().is_playing );
        assert!( player.media().playing );
        assert_eq!( player.media().seeks, vec![ 4.0 ] );
        assert_eq!( player.state().current_time, 4.0 );
    }


    #[test]
    fn test_events_are_published() {
        let mut player = PlayerController::new( FakeElement::default() );
        let rx = player.watch();
        player.load_source( Resource::new( "/music/take.wav" ) );
        player.media_mut().ready( 12.0 );
        player.pump();
        player.toggle_loop();

        let events = drain( &rx );
        assert_eq!( events[ 0 ], PlayerEvent::SourceChanged { name: "take.wav".into() } );
        assert!( events.contains( &PlayerEvent::DurationKnown { duration: 12.0 } ) );
        assert_eq!(
            events.last(),
            Some( &PlayerEvent::LoopChanged { start: 0.0, end: 12.0, active: true } )
        );
    }


    #[test]
    fn test_dropped_watchers_are_pruned() {
        let mut player = loaded( 10.0 );
        drop( player.watch() );
        player.toggle_loop();
        assert!( player.watchers.is_empty() );
    }
}
