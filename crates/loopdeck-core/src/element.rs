//! Audio media element
//!
//! [`AudioElement`] implements [`MediaElement`] on top of the Symphonia
//! decoder and cpal output. Each loaded source gets a decode worker thread
//! that owns the decoder, the resampler and the output stream; the element
//! talks to it over a command channel and reads the playhead from shared
//! atomics.
//!
//! Playback rate is realized by resampling: the source is played at
//! `device_rate / (source_rate * rate)`, so pitch follows speed.

use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex };
use std::sync::atomic::{ AtomicBool, AtomicU32, AtomicU64, Ordering };
use std::sync::mpsc::{ self, Receiver, Sender, TryRecvError };
use std::thread;
use std::time::{ Duration, Instant };

use rubato::{ FastFixedOut, PolynomialDegree, Resampler };

use crate::decoder::Decoder;
use crate::media::{
    MediaElement, MediaError, Notification, NotificationKind, NotificationSink, Subscribers, Subscription,
};
use crate::output::{ self, AudioOutput, SampleBuffer };
use crate::resource::Resource;


/// Default cadence of time-advanced notifications while playing.
pub const DEFAULT_NOTIFY_INTERVAL: Duration = Duration::from_millis( 250 );

/// Rates outside this range are clamped before reaching the resampler.
const MIN_RATE: f64 = 0.1;
const MAX_RATE: f64 = 4.0;

/// Resampler ratio headroom around the 1x ratio; covers MIN_RATE..MAX_RATE.
const MAX_RATIO_RELATIVE: f64 = 10.0;

/// Resampler output chunk in frames.
const OUTPUT_CHUNK: usize = 1024;

const IDLE_SLEEP: Duration = Duration::from_millis( 10 );
const FULL_SLEEP: Duration = Duration::from_millis( 5 );


/// Converts planar samples back to interleaved format.
/// [[L0, L1, ...], [R0, R1, ...]] → [L0, R0, L1, R1, ...]
fn interleave( channels: &[Vec<f32>] ) -> Vec<f32> {
    if channels.is_empty() || channels[ 0 ].is_empty() {
        return Vec::new();
    }
    let frames = channels[ 0 ].len();
    let mut out = Vec::with_capacity( frames * channels.len() );
    for f in 0..frames {
        for ch in channels {
            out.push( ch[ f ] );
        }
    }
    out
}


fn effective_rate( rate: f64 ) -> f64 {
    rate.clamp( MIN_RATE, MAX_RATE )
}


/// Commands from the element to its decode worker.
#[derive( Debug, Clone, Copy, PartialEq )]
enum WorkerCommand {
    Play,
    Pause,
    Seek( f64 ),
    SetRate( f64 ),
    SetVolume( f32 ),
    Stop,
}


/// Playhead and readiness shared between the element and its worker.
#[derive( Debug, Default )]
struct Shared {
    /// Source frames decoded up to the playhead
    frames: AtomicU64,
    sample_rate: AtomicU32,
    /// Duration in seconds, as f64 bits
    duration: AtomicU64,
    ready: AtomicBool,
    stop: AtomicBool,
}


impl Shared {
    fn is_ready( &self ) -> bool {
        self.ready.load( Ordering::Acquire )
    }


    fn duration( &self ) -> f64 {
        if self.is_ready() {
            f64::from_bits( self.duration.load( Ordering::Relaxed ) )
        } else {
            0.0
        }
    }


    fn position( &self ) -> f64 {
        let rate = self.sample_rate.load( Ordering::Relaxed );
        if rate == 0 {
            return 0.0;
        }
        let seconds = self.frames.load( Ordering::Relaxed ) as f64 / rate as f64;
        seconds.min( self.duration() )
    }


    fn set_position( &self, seconds: f64 ) {
        let rate = self.sample_rate.load( Ordering::Relaxed );
        self.frames.store( ( seconds.max( 0.0 ) * rate as f64 ) as u64, Ordering::Relaxed );
    }


    fn publish_source( &self, sample_rate: u32, duration: f64 ) {
        self.sample_rate.store( sample_rate, Ordering::Relaxed );
        self.duration.store( duration.to_bits(), Ordering::Relaxed );
        self.frames.store( 0, Ordering::Relaxed );
        self.ready.store( true, Ordering::Release );
    }
}


/// Notification fan-out for one worker. Stops emitting once the worker
/// has been told to stop, so a superseded source stays silent.
#[derive( Clone )]
struct Emitter {
    subscribers: Arc<Mutex<Subscribers>>,
    shared: Arc<Shared>,
}


impl Emitter {
    fn emit( &self, notification: Notification ) {
        let mut subscribers = self.subscribers.lock().unwrap();
        if self.shared.stop.load( Ordering::Relaxed ) {
            return;
        }
        subscribers.emit( &notification );
    }
}


/// Handle to a running decode worker.
struct Playback {
    commands: Sender<WorkerCommand>,
    shared: Arc<Shared>,
    thread: Option<thread::JoinHandle<()>>,
}


/// Media element playing local files through the default output device.
pub struct AudioElement {
    playback: Option<Playback>,
    subscribers: Arc<Mutex<Subscribers>>,
    notify_interval: Duration,
    rate: f64,
    volume: f64,
}


impl AudioElement {
    pub fn new() -> Self {
        Self::with_notify_interval( DEFAULT_NOTIFY_INTERVAL )
    }


    /// Creates an element emitting time-advanced at the given cadence.
    pub fn with_notify_interval( notify_interval: Duration ) -> Self {
        Self {
            playback: None,
            subscribers: Arc::new( Mutex::new( Subscribers::new() ) ),
            notify_interval,
            rate: 1.0,
            volume: 1.0,
        }
    }


    fn send( &self, command: WorkerCommand ) -> Result<(), MediaError> {
        let playback = self.playback.as_ref().ok_or( MediaError::NoSource )?;
        playback.commands.send( command ).map_err( |_| MediaError::NotReady )
    }


    /// Stops and joins the current worker.
    fn stop( &mut self ) {
        if let Some( mut playback ) = self.playback.take() {
            playback.shared.stop.store( true, Ordering::Relaxed );
            let _ = playback.commands.send( WorkerCommand::Stop );
            if let Some( thread ) = playback.thread.take() {
                let _ = thread.join();
            }
            tracing::info!( "Stopped" );
        }
    }
}


impl Default for AudioElement {
    fn default() -> Self {
        Self::new()
    }
}


impl Drop for AudioElement {
    fn drop( &mut self ) {
        self.stop();
    }
}


impl MediaElement for AudioElement {
    fn load( &mut self, resource: &Resource ) {
        self.stop();

        let shared = Arc::new( Shared::default() );
        let ( commands, inbox ) = mpsc::channel();
        let emitter = Emitter {
            subscribers: Arc::clone( &self.subscribers ),
            shared: Arc::clone( &shared ),
        };
        let settings = WorkerSettings {
            path: resource.path().to_path_buf(),
            notify_interval: self.notify_interval,
            rate: self.rate,
            volume: self.volume,
        };

        let worker_shared = Arc::clone( &shared );
        let worker_emitter = emitter.clone();
        let spawned = thread::Builder::new()
            .name( "loopdeck-decode".into() )
            .spawn( move || Worker::start( settings, worker_shared, inbox, worker_emitter ) );

        let thread = match spawned {
            Ok( handle ) => Some( handle ),
            Err( e ) => {
                tracing::error!( "Failed to spawn decode worker: {}", e );
                emitter.emit( Notification::LoadFailed { message: e.to_string() } );
                None
            }
        };

        self.playback = Some( Playback { commands, shared, thread } );
    }


    fn play( &mut self ) -> Result<(), MediaError> {
        if let Some( playback ) = &self.playback {
            if !playback.shared.is_ready() {
                return Err( MediaError::NotReady );
            }
        }
        self.send( WorkerCommand::Play )
    }


    fn pause( &mut self ) {
        let _ = self.send( WorkerCommand::Pause );
    }


    fn position( &self ) -> f64 {
        self.playback.as_ref().map( |p| p.shared.position() ).unwrap_or( 0.0 )
    }


    fn set_position( &mut self, seconds: f64 ) {
        if let Some( playback ) = &self.playback {
            if playback.shared.is_ready() {
                let clamped = seconds.clamp( 0.0, playback.shared.duration() );
                playback.shared.set_position( clamped );
            }
        }
        if self.send( WorkerCommand::Seek( seconds ) ).is_err() {
            tracing::debug!( "Seek ignored: no active source" );
        }
    }


    fn duration( &self ) -> f64 {
        self.playback.as_ref().map( |p| p.shared.duration() ).unwrap_or( 0.0 )
    }


    fn playback_rate( &self ) -> f64 {
        self.rate
    }


    fn set_playback_rate( &mut self, rate: f64 ) {
        self.rate = rate;
        let _ = self.send( WorkerCommand::SetRate( rate ) );
    }


    fn volume( &self ) -> f64 {
        self.volume
    }


    fn set_volume( &mut self, level: f64 ) {
        self.volume = level.clamp( 0.0, 1.0 );
        let _ = self.send( WorkerCommand::SetVolume( self.volume as f32 ) );
    }


    fn subscribe( &mut self, kind: NotificationKind, sink: NotificationSink ) -> Subscription {
        self.subscribers.lock().unwrap().add( kind, sink )
    }


    fn unsubscribe( &mut self, subscription: Subscription ) {
        self.subscribers.lock().unwrap().remove( subscription );
    }
}


/// Inputs captured when a worker is spawned.
struct WorkerSettings {
    path: PathBuf,
    notify_interval: Duration,
    rate: f64,
    volume: f64,
}


/// Decode worker for one source.
struct Worker {
    decoder: Decoder,
    output: AudioOutput,
    buffer: Arc<SampleBuffer>,
    resampler: FastFixedOut<f32>,
    /// Device rate over source rate, i.e. the ratio at 1x
    base_ratio: f64,
    /// Planar source samples waiting for the resampler
    pending: Vec<Vec<f32>>,
    shared: Arc<Shared>,
    commands: Receiver<WorkerCommand>,
    emitter: Emitter,
    notify_interval: Duration,
    last_notify: Instant,
    paused: bool,
    draining: bool,
    ended: bool,
}


impl Worker {
    /// Thread entry: opens the source, reports the outcome, then runs.
    fn start( settings: WorkerSettings, shared: Arc<Shared>, commands: Receiver<WorkerCommand>, emitter: Emitter ) {
        match Self::open( &settings, Arc::clone( &shared ), commands, emitter.clone() ) {
            Ok( worker ) => {
                emitter.emit( Notification::MetadataReady );
                worker.run();
            }
            Err( message ) => {
                tracing::warn!( "Cannot play {:?}: {}", settings.path, message );
                emitter.emit( Notification::LoadFailed { message } );
            }
        }
    }


    fn open(
        settings: &WorkerSettings,
        shared: Arc<Shared>,
        commands: Receiver<WorkerCommand>,
        emitter: Emitter,
    ) -> Result<Self, String> {
        let decoder = Self::open_decoder( &settings.path )?;
        let channels = decoder.channels();

        let ( output, buffer ) = AudioOutput::new( decoder.sample_rate(), channels as u16 )
            .map_err( |e| e.to_string() )?;

        let base_ratio = output.sample_rate() as f64 / decoder.sample_rate() as f64;
        let mut resampler = FastFixedOut::<f32>::new(
            base_ratio,
            MAX_RATIO_RELATIVE,
            PolynomialDegree::Cubic,
            OUTPUT_CHUNK,
            channels,
        ).map_err( |e| format!( "Failed to create resampler: {}", e ) )?;

        resampler
            .set_resample_ratio( base_ratio / effective_rate( settings.rate ), false )
            .map_err( |e| format!( "Failed to set playback rate: {}", e ) )?;

        buffer.set_volume( settings.volume as f32 );
        output.play().map_err( |e| e.to_string() )?;

        shared.publish_source( decoder.sample_rate(), decoder.duration() );

        Ok( Self {
            pending: vec![ Vec::new(); channels ],
            decoder,
            output,
            buffer,
            resampler,
            base_ratio,
            shared,
            commands,
            emitter,
            notify_interval: settings.notify_interval,
            last_notify: Instant::now(),
            paused: true,
            draining: false,
            ended: false,
        })
    }


    fn open_decoder( path: &Path ) -> Result<Decoder, String> {
        Decoder::open( path ).map_err( |e| e.to_string() )
    }


    fn run( mut self ) {
        loop {
            if !self.handle_commands() {
                break;
            }

            if self.paused || self.ended {
                thread::sleep( IDLE_SLEEP );
                continue;
            }

            self.notify_if_due();

            if self.draining {
                if self.buffer.is_empty() {
                    self.finish();
                } else {
                    thread::sleep( IDLE_SLEEP );
                }
                continue;
            }

            // Keep about 50ms buffered
            let target = ( self.output.sample_rate() as usize * self.output.channels() as usize ) / 20;
            if self.buffer.len() > target {
                thread::sleep( FULL_SLEEP );
                continue;
            }

            match self.decoder.decode_next() {
                Ok( Some( samples ) ) => {
                    let frames = samples.len() / self.decoder.channels();
                    self.shared.frames.fetch_add( frames as u64, Ordering::Relaxed );
                    let out = self.resample( &samples );
                    self.push( &out );
                }
                Ok( None ) => {
                    tracing::info!( "Decode worker: reached end of file" );
                    self.flush();
                    self.draining = true;
                }
                Err( e ) => {
                    tracing::error!( "Decode error: {}", e );
                    self.draining = true;
                }
            }
        }

        tracing::debug!( "Decode worker: exiting" );
    }


    /// Applies queued commands. Returns false when the worker should exit.
    fn handle_commands( &mut self ) -> bool {
        if self.shared.stop.load( Ordering::Relaxed ) {
            return false;
        }

        loop {
            match self.commands.try_recv() {
                Ok( WorkerCommand::Stop ) | Err( TryRecvError::Disconnected ) => return false,
                Ok( command ) => self.apply( command ),
                Err( TryRecvError::Empty ) => return true,
            }
        }
    }


    fn apply( &mut self, command: WorkerCommand ) {
        match command {
            WorkerCommand::Play => {
                // Playing an ended source starts over
                if self.ended {
                    self.seek( 0.0 );
                }
                self.paused = false;
                self.buffer.set_paused( false );
                self.last_notify = Instant::now();
            }
            WorkerCommand::Pause => {
                self.paused = true;
                self.buffer.set_paused( true );
            }
            WorkerCommand::Seek( seconds ) => self.seek( seconds ),
            WorkerCommand::SetRate( rate ) => {
                let ratio = self.base_ratio / effective_rate( rate );
                if let Err( e ) = self.resampler.set_resample_ratio( ratio, true ) {
                    tracing::warn!( "Cannot apply rate {}: {}", rate, e );
                }
            }
            WorkerCommand::SetVolume( volume ) => self.buffer.set_volume( volume ),
            WorkerCommand::Stop => {}
        }
    }


    fn seek( &mut self, seconds: f64 ) {
        let target = seconds.clamp( 0.0, self.decoder.duration() );

        if let Err( e ) = self.decoder.seek( target ) {
            tracing::warn!( "Seek to {:.2}s failed: {}", target, e );
        }

        self.buffer.clear();
        for channel in &mut self.pending {
            channel.clear();
        }
        self.resampler.reset();
        self.shared.set_position( target );
        self.draining = false;
        self.ended = false;

        self.emitter.emit( Notification::TimeAdvanced );
        self.last_notify = Instant::now();
    }


    fn notify_if_due( &mut self ) {
        if self.last_notify.elapsed() >= self.notify_interval {
            self.emitter.emit( Notification::TimeAdvanced );
            self.last_notify = Instant::now();
        }
    }


    /// Playback drained past the last sample: the element pauses at the end.
    fn finish( &mut self ) {
        self.shared.set_position( self.decoder.duration() );
        self.ended = true;
        self.paused = true;
        self.buffer.set_paused( true );
        self.emitter.emit( Notification::Ended );
    }


    /// Resamples interleaved source samples and remixes them for the device.
    fn resample( &mut self, samples: &[f32] ) -> Vec<f32> {
        let channels = self.pending.len();
        for frame in samples.chunks( channels ) {
            for ( ch, sample ) in frame.iter().enumerate() {
                self.pending[ ch ].push( *sample );
            }
        }

        let mut resampled = Vec::new();
        while self.pending[ 0 ].len() >= self.resampler.input_frames_next() {
            let needed = self.resampler.input_frames_next();
            let chunk: Vec<Vec<f32>> = self.pending
                .iter_mut()
                .map( |ch| ch.drain( ..needed ).collect() )
                .collect();

            match self.resampler.process( &chunk, None ) {
                Ok( out ) => resampled.extend( interleave( &out ) ),
                Err( e ) => {
                    tracing::error!( "Resample error: {}", e );
                    break;
                }
            }
        }

        output::remix( &resampled, channels, self.output.channels() as usize )
    }


    /// Resamples whatever is left at end of file and queues it.
    fn flush( &mut self ) {
        if self.pending[ 0 ].is_empty() {
            return;
        }

        match self.resampler.process_partial( Some( self.pending.as_slice() ), None ) {
            Ok( out ) => {
                let out = output::remix( &interleave( &out ), self.pending.len(), self.output.channels() as usize );
                self.push( &out );
            }
            Err( e ) => tracing::error!( "Final resample error: {}", e ),
        }

        for channel in &mut self.pending {
            channel.clear();
        }
    }


    fn push( &self, samples: &[f32] ) {
        let mut offset = 0;
        while offset < samples.len() && !self.shared.stop.load( Ordering::Relaxed ) {
            let pushed = self.buffer.push( &samples[ offset.. ] );
            offset += pushed;
            if pushed == 0 {
                thread::sleep( FULL_SLEEP );
            }
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_interleave() {
        let planar = vec![ vec![ 1.0, 2.0 ], vec![ 3.0, 4.0 ] ];
        assert_eq!( interleave( &planar ), vec![ 1.0, 3.0, 2.0, 4.0 ] );
        assert!( interleave( &[] ).is_empty() );
    }


    #[test]
    fn test_effective_rate_is_bounded() {
        assert_eq!( effective_rate( 1.25 ), 1.25 );
        assert_eq!( effective_rate( 0.01 ), MIN_RATE );
        assert_eq!( effective_rate( 16.0 ), MAX_RATE );
    }


    #[test]
    fn test_shared_position_before_ready() {
        let shared = Shared::default();
        shared.set_position( 12.0 );
        assert_eq!( shared.position(), 0.0 );
        assert_eq!( shared.duration(), 0.0 );
    }


    #[test]
    fn test_shared_position_is_clamped_to_duration() {
        let shared = Shared::default();
        shared.publish_source( 48_000, 10.0 );
        shared.set_position( 4.5 );
        assert_eq!( shared.position(), 4.5 );
        shared.frames.store( 48_000 * 11, Ordering::Relaxed );
        assert_eq!( shared.position(), 10.0 );
    }


    #[test]
    fn test_element_without_source() {
        let mut element = AudioElement::new();
        assert!( matches!( element.play(), Err( MediaError::NoSource ) ) );
        element.set_position( 3.0 );
        element.pause();
        assert_eq!( element.position(), 0.0 );
        assert_eq!( element.duration(), 0.0 );
    }


    #[test]
    fn test_element_keeps_exact_rate_and_clamped_volume() {
        let mut element = AudioElement::new();
        element.set_playback_rate( 1.75 );
        element.set_volume( 3.0 );
        assert_eq!( element.playback_rate(), 1.75 );
        assert_eq!( element.volume(), 1.0 );
    }


    #[test]
    fn test_missing_file_reports_load_failure() {
        let ( tx, rx ) = mpsc::channel();
        let mut element = AudioElement::new();
        element.subscribe( NotificationKind::LoadFailed, tx );
        element.load( &Resource::new( "/no/such/file.flac" ) );

        let delivery = rx.recv_timeout( Duration::from_secs( 5 ) ).unwrap();
        assert!( matches!( delivery.notification, Notification::LoadFailed { .. } ) );
        assert_eq!( element.duration(), 0.0 );
    }
}
