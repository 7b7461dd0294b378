mod identity_provider;
mod mailer;
mod repository_error;
mod session_store;
mod staging_store;
mod transcript_repository;
mod transcription_engine;
mod user_repository;

pub use identity_provider::{FederatedProfile, IdentityProvider, IdentityProviderError};
pub use mailer::{Mailer, MailerError};
pub use repository_error::RepositoryError;
pub use session_store::SessionStore;
pub use staging_store::{StagingStore, StagingStoreError};
pub use transcript_repository::{OwnerStats, TranscriptRepository};
pub use transcription_engine::{AudioPayload, TranscriptionEngine, TranscriptionError};
pub use user_repository::UserRepository;
