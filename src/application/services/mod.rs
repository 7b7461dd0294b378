mod auth_service;
pub mod billing;
mod transcription_service;

pub use auth_service::{AuthError, AuthService, SignupOutcome};
pub use billing::{BillingRates, billable_minutes, cost_for_minutes, round2};
pub use transcription_service::{DurationProbe, IngestError, TranscriptionService, UploadedAudio};
