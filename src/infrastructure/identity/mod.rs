mod google_provider;
mod mock_provider;

pub use google_provider::GoogleIdentityProvider;
pub use mock_provider::MockIdentityProvider;
