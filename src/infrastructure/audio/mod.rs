mod duration;
mod mock_engine;
mod whisper_api_engine;

pub use duration::probe_duration_seconds;
pub use mock_engine::{FailingTranscriptionEngine, MockTranscriptionEngine};
pub use whisper_api_engine::WhisperApiEngine;
