//! Core library for turning a video into a sequence of captioned GIFs.
//!
//! Bounded contexts follow a `domain` / `infrastructure` split: domain
//! modules hold types and capability traits, infrastructure modules hold
//! the ffmpeg, whisper, HTTP and GIF adapters behind those traits.

pub mod audio;
pub mod caption;
pub mod pipeline;
pub mod segmentation;
pub mod shared;
pub mod video;
