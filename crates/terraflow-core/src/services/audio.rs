pub mod backend;
pub mod model;
mod service;

pub use service::PulseAudioClient;
