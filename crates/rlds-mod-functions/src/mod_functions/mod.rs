//! The built-in mod functions.

mod filter_success;
mod flip_image_channels;
mod resize_and_jpeg_encode;

pub use filter_success::FilterSuccess;
pub use flip_image_channels::{FlipImageChannels, FlipKeyPreset};
pub use resize_and_jpeg_encode::ResizeAndJpegEncode;
