use std::sync::Arc;

use crate::application::ports::IdentityProvider;
use crate::application::services::{AuthService, TranscriptionService};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub transcription_service: Arc<TranscriptionService>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub settings: Settings,
}
