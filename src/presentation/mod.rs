pub mod auth_context;
pub mod config;
pub mod cookies;
pub mod handlers;
pub mod router;
pub mod state;

pub use auth_context::{AuthenticatedContext, MaybeAuthenticated};
pub use config::{Environment, Settings};
pub use router::create_router;
pub use state::AppState;
