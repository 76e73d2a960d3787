//! Loopdeck Core - Practice player engine
//!
//! This crate provides the player controller with its A/B loop, the media
//! element abstraction, and an audio element built on Symphonia decoding
//! and cpal output.

pub mod command;
pub mod controller;
pub mod decoder;
pub mod element;
pub mod format;
pub mod media;
pub mod monitor;
pub mod output;
pub mod resource;
pub mod state;

pub use command::{ Command, CommandError };
pub use controller::{ ControllerError, PlayerController, PlayerEvent };
pub use element::AudioElement;
pub use format::{ format_time, progress_percent };
pub use media::{ MediaElement, MediaError };
pub use resource::{ Resource, ResourceError };
pub use state::{ LoopWindow, PlayerState };
