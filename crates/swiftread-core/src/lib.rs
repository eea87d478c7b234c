//! Presentation and pacing engine for RSVP speed reading.
//!
//! The crate owns the word sequence, the per-word timing model, the
//! optical-center split and the playback state machine. Rendering, audio,
//! power management and durable storage are reached through the traits in
//! [`render`], [`device`], [`storage`] and [`settings`].

pub mod chapter;
pub mod content;
pub mod device;
pub mod error;
pub mod fixation;
pub mod input;
pub mod pacing;
pub mod playback;
pub mod render;
pub mod settings;
pub mod storage;
pub mod text_policy;
pub mod word_store;
