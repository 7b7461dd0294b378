mod memory;
mod pg_pool;
mod pg_session_store;
mod pg_transcript_repository;
mod pg_user_repository;
mod schema;

pub use memory::{MemorySessionStore, MemoryTranscriptRepository, MemoryUserRepository};
pub use pg_pool::create_pool;
pub use pg_session_store::PgSessionStore;
pub use pg_transcript_repository::PgTranscriptRepository;
pub use pg_user_repository::PgUserRepository;
pub use schema::run_migrations;
