//! Element observers
//!
//! [`TimeObserver`] keeps position and duration in sync with the element for
//! the current source. [`LoopMonitor`] enforces the A/B loop window. Both
//! hold element subscriptions; the controller routes each delivery to the
//! observer owning its subscription and drops the rest as stale.

use crate::media::{ MediaElement, NotificationKind, NotificationSink, Subscription };
use crate::state::LoopWindow;


/// Subscriptions tied to the current source.
#[derive( Debug, Default )]
pub struct TimeObserver {
    time: Option<Subscription>,
    metadata: Option<Subscription>,
    failure: Option<Subscription>,
    ended: Option<Subscription>,
}


impl TimeObserver {
    pub fn new() -> Self {
        Self::default()
    }


    /// Drops the subscriptions for the previous source and subscribes anew.
    pub fn reattach<M: MediaElement>( &mut self, media: &mut M, sink: &NotificationSink ) {
        self.detach( media );
        self.time = Some( media.subscribe( NotificationKind::TimeAdvanced, sink.clone() ) );
        self.metadata = Some( media.subscribe( NotificationKind::MetadataReady, sink.clone() ) );
        self.failure = Some( media.subscribe( NotificationKind::LoadFailed, sink.clone() ) );
        self.ended = Some( media.subscribe( NotificationKind::Ended, sink.clone() ) );
    }


    pub fn detach<M: MediaElement>( &mut self, media: &mut M ) {
        for subscription in [ self.time, self.metadata, self.failure, self.ended ].into_iter().flatten() {
            media.unsubscribe( subscription );
        }
        *self = Self::default();
    }


    /// Detaches the one-shot load subscriptions once the load has settled.
    pub fn load_settled<M: MediaElement>( &mut self, media: &mut M ) {
        for subscription in [ self.metadata.take(), self.failure.take() ].into_iter().flatten() {
            media.unsubscribe( subscription );
        }
    }


    /// True if `subscription` is one of this observer's live subscriptions.
    pub fn owns( &self, subscription: Subscription ) -> bool {
        [ self.time, self.metadata, self.failure, self.ended ].contains( &Some( subscription ) )
    }


    pub fn is_attached( &self ) -> bool {
        self.time.is_some()
    }
}


/// A/B loop enforcement.
///
/// While active, the monitor holds a time-advanced subscription bound to
/// the window it was started with. Any change to the window or the enable
/// flag goes through [`LoopMonitor::sync`], which replaces the subscription
/// so the new window applies from the next notification.
#[derive( Debug, Clone, Copy, PartialEq, Default )]
pub enum LoopMonitor {
    #[default]
    Inactive,
    Active { subscription: Subscription, window: LoopWindow },
}


impl LoopMonitor {
    /// Brings the monitor in line with the loop flag and window.
    pub fn sync<M: MediaElement>(
        &mut self,
        media: &mut M,
        sink: &NotificationSink,
        enabled: bool,
        window: LoopWindow,
    ) {
        if let LoopMonitor::Active { subscription, .. } = *self {
            media.unsubscribe( subscription );
        }

        *self = if enabled {
            let subscription = media.subscribe( NotificationKind::TimeAdvanced, sink.clone() );
            tracing::debug!( "Loop monitor armed: {:.2}s -> {:.2}s", window.end, window.start );
            LoopMonitor::Active { subscription, window }
        } else {
            LoopMonitor::Inactive
        };
    }


    pub fn owns( &self, subscription: Subscription ) -> bool {
        matches!( self, LoopMonitor::Active { subscription: s, .. } if *s == subscription )
    }


    pub fn is_active( &self ) -> bool {
        matches!( self, LoopMonitor::Active { .. } )
    }


    /// Returns the corrective seek target for a playhead at `position`.
    pub fn check( &self, position: f64 ) -> Option<f64> {
        match self {
            LoopMonitor::Active { window, .. } if window.is_exceeded_by( position ) => Some( window.start ),
            _ => None,
        }
    }
}


#[cfg( test )]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::media::fake::FakeElement;


    #[test]
    fn test_reattach_replaces_subscriptions() {
        let ( tx, _rx ) = mpsc::channel();
        let mut media = FakeElement::default();
        let mut observer = TimeObserver::new();

        observer.reattach( &mut media, &tx );
        assert_eq!( media.subscribers.len(), 4 );
        observer.reattach( &mut media, &tx );
        assert_eq!( media.subscribers.len(), 4 );
        assert!( observer.is_attached() );

        observer.detach( &mut media );
        assert!( media.subscribers.is_empty() );
        assert!( !observer.is_attached() );
    }


    #[test]
    fn test_load_settled_keeps_time_and_end() {
        let ( tx, _rx ) = mpsc::channel();
        let mut media = FakeElement::default();
        let mut observer = TimeObserver::new();

        observer.reattach( &mut media, &tx );
        observer.load_settled( &mut media );
        assert_eq!( media.subscribers.len(), 2 );
        assert!( observer.is_attached() );
    }


    #[test]
    fn test_inactive_monitor_never_seeks() {
        let monitor = LoopMonitor::Inactive;
        assert_eq!( monitor.check( 0.0 ), None );
        assert_eq!( monitor.check( 1_000.0 ), None );
    }


    #[test]
    fn test_sync_toggles_subscription() {
        let ( tx, _rx ) = mpsc::channel();
        let mut media = FakeElement::default();
        let mut monitor = LoopMonitor::default();
        let window = LoopWindow { start: 5.0, end: 10.0 };

        monitor.sync( &mut media, &tx, true, window );
        assert!( monitor.is_active() );
        assert_eq!( media.subscribers.len(), 1 );
        assert_eq!( monitor.check( 9.9 ), None );
        assert_eq!( monitor.check( 10.0 ), Some( 5.0 ) );

        monitor.sync( &mut media, &tx, false, window );
        assert!( !monitor.is_active() );
        assert!( media.subscribers.is_empty() );
    }


    #[test]
    fn test_resync_retires_old_subscription() {
        let ( tx, _rx ) = mpsc::channel();
        let mut media = FakeElement::default();
        let mut monitor = LoopMonitor::default();

        monitor.sync( &mut media, &tx, true, LoopWindow { start: 0.0, end: 4.0 } );
        let LoopMonitor::Active { subscription: old, .. } = monitor else {
            panic!( "monitor should be active" );
        };

        monitor.sync( &mut media, &tx, true, LoopWindow { start: 1.0, end: 3.0 } );
        assert!( !monitor.owns( old ) );
        assert_eq!( monitor.check( 3.0 ), Some( 1.0 ) );
        assert_eq!( media.subscribers.len(), 1 );
    }
}
