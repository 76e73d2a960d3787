//! Media element abstraction
//!
//! The controller commands playback through [`MediaElement`] and observes it
//! through subscriptions. A subscription hands the element a channel sender;
//! every notification is delivered tagged with the subscription it belongs
//! to, so the receiver can discard deliveries for subscriptions it has since
//! detached.

use std::sync::mpsc::Sender;

use thiserror::Error;

use crate::resource::Resource;


/// Errors reported by a media element command.
#[derive( Debug, Error )]
pub enum MediaError {
    #[error( "No source loaded" )]
    NoSource,

    #[error( "Source is not ready" )]
    NotReady,

    #[error( "Audio output error: {0}" )]
    Output( String ),
}


/// Notification classes a subscriber can register for.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum NotificationKind {
    /// Periodic, while playing and after every position change.
    TimeAdvanced,
    /// Once per load, when the duration becomes known.
    MetadataReady,
    /// Once per load, instead of `MetadataReady`, when the source can't be played.
    LoadFailed,
    /// Playback reached the end of the source.
    Ended,
}


/// A notification from the element.
///
/// Notifications carry no position or duration; handlers read the live
/// values from the element when they process the notification.
#[derive( Debug, Clone, PartialEq )]
pub enum Notification {
    TimeAdvanced,
    MetadataReady,
    LoadFailed { message: String },
    Ended,
}


impl Notification {
    pub fn kind( &self ) -> NotificationKind {
        match self {
            Notification::TimeAdvanced => NotificationKind::TimeAdvanced,
            Notification::MetadataReady => NotificationKind::MetadataReady,
            Notification::LoadFailed { .. } => NotificationKind::LoadFailed,
            Notification::Ended => NotificationKind::Ended,
        }
    }
}


/// Handle returned by [`MediaElement::subscribe`]; pass it to
/// [`MediaElement::unsubscribe`] to detach.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub struct Subscription( u64 );


impl Subscription {
    pub fn id( &self ) -> u64 {
        self.0
    }
}


/// A notification addressed to one subscription.
#[derive( Debug, Clone, PartialEq )]
pub struct Delivery {
    pub subscription: Subscription,
    pub notification: Notification,
}


/// Channel end a subscriber hands to the element.
pub type NotificationSink = Sender<Delivery>;


/// The playback primitive driven by the controller.
///
/// Positions, durations and rates are in seconds / multipliers as `f64`.
/// Implementations clamp seeks to `[0, duration]` themselves.
pub trait MediaElement {
    /// Replaces the current source. Returns immediately; readiness is
    /// signalled later through `MetadataReady` or `LoadFailed`.
    /// The element is paused after a load.
    fn load( &mut self, resource: &Resource );

    fn play( &mut self ) -> Result<(), MediaError>;

    fn pause( &mut self );

    /// Current playback position.
    fn position( &self ) -> f64;

    fn set_position( &mut self, seconds: f64 );

    /// Total length of the source; 0 until metadata is ready.
    fn duration( &self ) -> f64;

    fn playback_rate( &self ) -> f64;

    fn set_playback_rate( &mut self, rate: f64 );

    fn volume( &self ) -> f64;

    fn set_volume( &mut self, level: f64 );

    fn subscribe( &mut self, kind: NotificationKind, sink: NotificationSink ) -> Subscription;

    fn unsubscribe( &mut self, subscription: Subscription );
}


/// Subscription registry shared by element implementations.
#[derive( Debug, Default )]
pub struct Subscribers {
    entries: Vec<( Subscription, NotificationKind, NotificationSink )>,
    next_id: u64,
}


impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }


    /// Registers a sink for one notification kind.
    pub fn add( &mut self, kind: NotificationKind, sink: NotificationSink ) -> Subscription {
        self.next_id += 1;
        let subscription = Subscription( self.next_id );
        self.entries.push(( subscription, kind, sink ));
        subscription
    }


    /// Removes a subscription. Returns false if it was not registered.
    pub fn remove( &mut self, subscription: Subscription ) -> bool {
        let before = self.entries.len();
        self.entries.retain( |( s, _, _ )| *s != subscription );
        self.entries.len() != before
    }


    /// Delivers a notification to every matching subscriber, in subscription
    /// order. Subscribers whose receiver is gone are dropped.
    ///
    /// Returns the number of deliveries made.
    pub fn emit( &mut self, notification: &Notification ) -> usize {
        let kind = notification.kind();
        let mut delivered = 0;

        self.entries.retain( |( subscription, k, sink )| {
            if *k != kind {
                return true;
            }
            let sent = sink.send( Delivery {
                subscription: *subscription,
                notification: notification.clone(),
            }).is_ok();
            if sent {
                delivered += 1;
            }
            sent
        });

        delivered
    }


    pub fn len( &self ) -> usize {
        self.entries.len()
    }


    pub fn is_empty( &self ) -> bool {
        self.entries.is_empty()
    }
}


/// Scriptable in-memory element for controller tests.
#[cfg( test )]
pub mod fake {
    use std::path::PathBuf;

    use super::*;


    /// Records every command and emits notifications on demand.
    #[derive( Debug )]
    pub struct FakeElement {
        pub subscribers: Subscribers,
        pub loaded: Option<PathBuf>,
        pub loads: usize,
        pub playing: bool,
        pub position: f64,
        pub duration: f64,
        pub rate: f64,
        pub volume: f64,
        /// Every `set_position` argument, in order.
        pub seeks: Vec<f64>,
        pub fail_play: bool,
    }


    impl Default for FakeElement {
        fn default() -> Self {
            Self {
                subscribers: Subscribers::new(),
                loaded: None,
                loads: 0,
                playing: false,
                position: 0.0,
                duration: 0.0,
                rate: 1.0,
                volume: 1.0,
                seeks: Vec::new(),
                fail_play: false,
            }
        }
    }


    impl FakeElement {
        /// Finishes the pending load with the given duration.
        pub fn ready( &mut self, duration: f64 ) {
            self.duration = duration;
            self.subscribers.emit( &Notification::MetadataReady );
        }


        /// Re-emits metadata-ready without changing anything.
        pub fn repeat_metadata( &mut self ) {
            self.subscribers.emit( &Notification::MetadataReady );
        }


        pub fn fail( &mut self, message: &str ) {
            self.subscribers.emit( &Notification::LoadFailed { message: message.to_string() } );
        }


        /// Moves the playhead to `position` and emits time-advanced.
        pub fn advance_to( &mut self, position: f64 ) {
            self.position = position;
            self.subscribers.emit( &Notification::TimeAdvanced );
        }


        /// Moves the playhead forward by `delta` and emits time-advanced.
        pub fn advance( &mut self, delta: f64 ) {
            self.advance_to( self.position + delta );
        }


        pub fn end( &mut self ) {
            self.position = self.duration;
            self.playing = false;
            self.subscribers.emit( &Notification::Ended );
        }
    }


    impl MediaElement for FakeElement {
        fn load( &mut self, resource: &Resource ) {
            self.loaded = Some( resource.path().to_path_buf() );
            self.loads += 1;
            self.playing = false;
            self.position = 0.0;
            self.duration = 0.0;
        }

        fn play( &mut self ) -> Result<(), MediaError> {
            if self.fail_play {
                return Err( MediaError::Output( "device unplugged".into() ) );
            }
            if self.loaded.is_none() {
                return Err( MediaError::NoSource );
            }
            self.playing = true;
            Ok(())
        }

        fn pause( &mut self ) {
            self.playing = false;
        }

        fn position( &self ) -> f64 {
            self.position
        }

        fn set_position( &mut self, seconds: f64 ) {
            self.seeks.push( seconds );
            self.position = if self.duration > 0.0 {
                seconds.clamp( 0.0, self.duration )
            } else {
                seconds.max( 0.0 )
            };
        }

        fn duration( &self ) -> f64 {
            self.duration
        }

        fn playback_rate( &self ) -> f64 {
            self.rate
        }

        fn set_playback_rate( &mut self, rate: f64 ) {
            self.rate = rate;
        }

        fn volume( &self ) -> f64 {
            self.volume
        }

        fn set_volume( &mut self, level: f64 ) {
            self.volume = level;
        }

        fn subscribe( &mut self, kind: NotificationKind, sink: NotificationSink ) -> Subscription {
            self.subscribers.add( kind, sink )
        }

        fn unsubscribe( &mut self, subscription: Subscription ) {
            self.subscribers.remove( subscription );
        }
    }
}


#[cfg( test )]
mod tests {
    use std::sync::mpsc;

    use super::*;


    #[test]
    fn test_emit_only_matching_kind() {
        let ( tx, rx ) = mpsc::channel();
        let mut subs = Subscribers::new();
        let time = subs.add( NotificationKind::TimeAdvanced, tx.clone() );
        subs.add( NotificationKind::MetadataReady, tx );

        assert_eq!( subs.emit( &Notification::TimeAdvanced ), 1 );
        let delivery = rx.try_recv().unwrap();
        assert_eq!( delivery.subscription, time );
        assert_eq!( delivery.notification, Notification::TimeAdvanced );
        assert!( rx.try_recv().is_err() );
    }


    #[test]
    fn test_remove_stops_delivery() {
        let ( tx, rx ) = mpsc::channel();
        let mut subs = Subscribers::new();
        let sub = subs.add( NotificationKind::Ended, tx );

        assert!( subs.remove( sub ) );
        assert!( !subs.remove( sub ) );
        assert_eq!( subs.emit( &Notification::Ended ), 0 );
        assert!( rx.try_recv().is_err() );
    }


    #[test]
    fn test_dead_receivers_are_pruned() {
        let mut subs = Subscribers::new();
        {
            let ( tx, _rx ) = mpsc::channel();
            subs.add( NotificationKind::TimeAdvanced, tx );
        }
        assert_eq!( subs.len(), 1 );
        assert_eq!( subs.emit( &Notification::TimeAdvanced ), 0 );
        assert!( subs.is_empty() );
    }


    #[test]
    fn test_subscription_ids_increase() {
        let ( tx, _rx ) = mpsc::channel();
        let mut subs = Subscribers::new();
        let a = subs.add( NotificationKind::TimeAdvanced, tx.clone() );
        let b = subs.add( NotificationKind::TimeAdvanced, tx );
        assert!( b.id() > a.id() );
    }
}
