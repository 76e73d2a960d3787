//! Audio output via cpal
//!
//! Handles sending decoded PCM samples to the system audio device.

use std::collections::VecDeque;
use std::sync::{ Arc, Mutex };
use std::sync::atomic::{ AtomicBool, AtomicU32, Ordering };

use cpal::traits::{ DeviceTrait, HostTrait, StreamTrait };
use thiserror::Error;


/// Errors that can occur with audio output.
#[derive( Debug, Error )]
pub enum OutputError {
    #[error( "No output device available" )]
    NoDevice,

    #[error( "Failed to get default stream config: {0}" )]
    StreamConfig( String ),

    #[error( "Failed to build output stream: {0}" )]
    BuildStream( String ),

    #[error( "Failed to play stream: {0}" )]
    PlayStream( String ),
}


/// Shared sample buffer between the decode worker and the audio callback.
///
/// Samples are stored in the device's channel layout; the worker remixes
/// before pushing.
pub struct SampleBuffer {
    buffer: Mutex<VecDeque<f32>>,
    capacity: usize,
    paused: AtomicBool,
    /// Volume stored as f32 bits
    volume: AtomicU32,
}


impl SampleBuffer {
    pub fn new( capacity: usize ) -> Self {
        Self {
            buffer: Mutex::new( VecDeque::with_capacity( capacity ) ),
            capacity,
            paused: AtomicBool::new( true ),
            volume: AtomicU32::new( 1.0_f32.to_bits() ),
        }
    }


    /// Pushes samples to the buffer. Returns number of samples actually pushed.
    pub fn push( &self, samples: &[f32] ) -> usize {
        let mut buf = self.buffer.lock().unwrap();
        let available = self.capacity.saturating_sub( buf.len() );
        let to_push = samples.len().min( available );
        buf.extend( samples[ ..to_push ].iter().copied() );
        to_push
    }


    /// Fills `output` from the buffer, padding with silence. Writes only
    /// silence while paused. Returns the number of real samples written.
    pub fn pop( &self, output: &mut [f32] ) -> usize {
        if self.paused.load( Ordering::Relaxed ) {
            output.fill( 0.0 );
            return 0;
        }

        let volume = self.volume();
        let mut buf = self.buffer.lock().unwrap();
        let written = output.len().min( buf.len() );

        for ( out, sample ) in output.iter_mut().zip( buf.drain( ..written ) ) {
            *out = sample * volume;
        }
        output[ written.. ].fill( 0.0 );

        written
    }


    pub fn len( &self ) -> usize {
        self.buffer.lock().unwrap().len()
    }


    pub fn is_empty( &self ) -> bool {
        self.buffer.lock().unwrap().is_empty()
    }


    pub fn clear( &self ) {
        self.buffer.lock().unwrap().clear();
    }


    pub fn set_paused( &self, paused: bool ) {
        self.paused.store( paused, Ordering::Relaxed );
    }


    pub fn is_paused( &self ) -> bool {
        self.paused.load( Ordering::Relaxed )
    }


    /// Sets the gain applied on output (0.0 = mute, 1.0 = unity).
    pub fn set_volume( &self, volume: f32 ) {
        self.volume.store( volume.to_bits(), Ordering::Relaxed );
    }


    pub fn volume( &self ) -> f32 {
        f32::from_bits( self.volume.load( Ordering::Relaxed ) )
    }
}


/// Converts interleaved frames from `src_ch` to `out_ch` channels.
///
/// Mono is duplicated, stereo to mono is averaged, anything else keeps the
/// leading channels and repeats the last one.
pub fn remix( samples: &[f32], src_ch: usize, out_ch: usize ) -> Vec<f32> {
    if src_ch == out_ch || src_ch == 0 || out_ch == 0 {
        return samples.to_vec();
    }

    let mut out = Vec::with_capacity( samples.len() / src_ch * out_ch );
    for frame in samples.chunks_exact( src_ch ) {
        if src_ch == 2 && out_ch == 1 {
            out.push(( frame[ 0 ] + frame[ 1 ] ) * 0.5 );
            continue;
        }
        for ch in 0..out_ch {
            out.push( frame[ ch.min( src_ch - 1 ) ] );
        }
    }
    out
}


/// Audio output stream.
///
/// Not Send: cpal streams stay on the thread that created them, so the
/// decode worker creates and owns its output.
pub struct AudioOutput {
    stream: cpal::Stream,
    sample_rate: u32,
    channels: u16,
}


impl AudioOutput {
    /// Opens the default device, preferring a config at the source rate.
    ///
    /// Returns the output and the buffer feeding it.
    pub fn new( source_sample_rate: u32, source_channels: u16 ) -> Result<( Self, Arc<SampleBuffer> ), OutputError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or( OutputError::NoDevice )?;

        tracing::info!( "Using output device: {:?}", device.name() );

        let supported_configs: Vec<_> = device
            .supported_output_configs()
            .map_err( |e| OutputError::StreamConfig( e.to_string() ) )?
            .collect();

        let supports_rate = |c: &cpal::SupportedStreamConfigRange| {
            c.min_sample_rate().0 <= source_sample_rate && c.max_sample_rate().0 >= source_sample_rate
        };

        // Exact match first, then any channel layout at the source rate,
        // then the device default (resampled by the worker).
        let config = if let Some( c ) = supported_configs.iter()
            .find( |c| c.channels() == source_channels && supports_rate( *c ) )
        {
            c.clone().with_sample_rate( cpal::SampleRate( source_sample_rate ) ).config()
        } else if let Some( c ) = supported_configs.iter().find( |c| supports_rate( *c ) ) {
            c.clone().with_sample_rate( cpal::SampleRate( source_sample_rate ) ).config()
        } else {
            device
                .default_output_config()
                .map_err( |e| OutputError::StreamConfig( e.to_string() ) )?
                .config()
        };

        tracing::info!(
            "Audio output config: {} Hz, {} channels",
            config.sample_rate.0,
            config.channels
        );

        // ~500ms of audio
        let capacity = ( config.sample_rate.0 as usize ) * ( config.channels as usize ) / 2;
        let sample_buffer = Arc::new( SampleBuffer::new( capacity ) );
        let callback_buffer = Arc::clone( &sample_buffer );

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    callback_buffer.pop( data );
                },
                |err| {
                    tracing::error!( "Audio output error: {}", err );
                },
                None,
            )
            .map_err( |e| OutputError::BuildStream( e.to_string() ) )?;

        Ok((
            Self {
                stream,
                sample_rate: config.sample_rate.0,
                channels: config.channels,
            },
            sample_buffer,
        ))
    }


    pub fn play( &self ) -> Result<(), OutputError> {
        self.stream
            .play()
            .map_err( |e| OutputError::PlayStream( e.to_string() ) )
    }


    pub fn sample_rate( &self ) -> u32 {
        self.sample_rate
    }


    pub fn channels( &self ) -> u16 {
        self.channels
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_paused_buffer_outputs_silence() {
        let buf = SampleBuffer::new( 16 );
        buf.push( &[ 0.5; 8 ] );
        let mut out = [ 1.0; 4 ];
        assert_eq!( buf.pop( &mut out ), 0 );
        assert_eq!( out, [ 0.0; 4 ] );
        assert_eq!( buf.len(), 8 );
    }


    #[test]
    fn test_pop_applies_volume_and_pads() {
        let buf = SampleBuffer::new( 16 );
        buf.set_paused( false );
        buf.set_volume( 0.5 );
        buf.push( &[ 1.0, -1.0 ] );

        let mut out = [ 9.0; 4 ];
        assert_eq!( buf.pop( &mut out ), 2 );
        assert_eq!( out, [ 0.5, -0.5, 0.0, 0.0 ] );
        assert!( buf.is_empty() );
    }


    #[test]
    fn test_push_respects_capacity() {
        let buf = SampleBuffer::new( 3 );
        assert_eq!( buf.push( &[ 0.1; 5 ] ), 3 );
        assert_eq!( buf.push( &[ 0.1 ] ), 0 );
        buf.clear();
        assert!( buf.is_empty() );
    }


    #[test]
    fn test_remix_layouts() {
        assert_eq!( remix( &[ 0.2, 0.4 ], 1, 2 ), vec![ 0.2, 0.2, 0.4, 0.4 ] );
        assert_eq!( remix( &[ 0.25, 0.75, 1.0, 0.0 ], 2, 1 ), vec![ 0.5, 0.5 ] );
        assert_eq!( remix( &[ 1.0, 2.0, 3.0 ], 3, 2 ), vec![ 1.0, 2.0 ] );
        assert_eq!( remix( &[ 1.0, 2.0 ], 2, 4 ), vec![ 1.0, 2.0, 2.0, 2.0 ] );
        assert_eq!( remix( &[ 1.0, 2.0 ], 2, 2 ), vec![ 1.0, 2.0 ] );
    }
}
