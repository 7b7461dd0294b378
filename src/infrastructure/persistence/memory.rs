use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::application::ports::{
    OwnerStats, RepositoryError, SessionStore, TranscriptRepository, UserRepository,
};
use crate::domain::{AuthSession, SessionToken, Transcript, TranscriptId, User, UserId};

/// In-memory user store for tests. Enforces the same uniqueness rules as
/// the Postgres adapter.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let duplicate = users.values().any(|u| {
            (user.email.is_some() && u.email == user.email)
                || (user.google_id.is_some() && u.google_id == user.google_id)
        });
        if duplicate {
            return Err(RepositoryError::ConstraintViolation(
                "duplicate email or google id".to_string(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&user.id) {
            return Err(RepositoryError::NotFound(user.id.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }
}

/// In-memory transcript store for tests.
#[derive(Default)]
pub struct MemoryTranscriptRepository {
    transcripts: Mutex<Vec<Transcript>>,
}

impl MemoryTranscriptRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TranscriptRepository for MemoryTranscriptRepository {
    async fn create(&self, transcript: &Transcript) -> Result<(), RepositoryError> {
        self.transcripts.lock().unwrap().push(transcript.clone());
        Ok(())
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Transcript>, RepositoryError> {
        // Newest first; insertion order breaks timestamp ties.
        let mut owned: Vec<(usize, Transcript)> = self
            .transcripts
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.owner_id == owner_id)
            .map(|(i, t)| (i, t.clone()))
            .collect();
        owned.sort_by(|(ia, a), (ib, b)| b.created_at.cmp(&a.created_at).then(ib.cmp(ia)));
        Ok(owned.into_iter().map(|(_, t)| t).collect())
    }

    async fn delete_for_owner(
        &self,
        id: TranscriptId,
        owner_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let mut transcripts = self.transcripts.lock().unwrap();
        let before = transcripts.len();
        transcripts.retain(|t| !(t.id == id && t.owner_id == owner_id));
        Ok(transcripts.len() < before)
    }

    async fn stats_for_owner(&self, owner_id: UserId) -> Result<OwnerStats, RepositoryError> {
        let transcripts = self.transcripts.lock().unwrap();
        let month_start = month_start(Utc::now());
        let mut stats = OwnerStats::default();
        for t in transcripts.iter().filter(|t| t.owner_id == owner_id) {
            stats.total_count += 1;
            stats.total_cost += t.cost;
            stats.total_minutes += u64::from(t.duration_minutes);
            if t.created_at >= month_start {
                stats.month_count += 1;
            }
        }
        Ok(stats)
    }

    async fn recent_for_owner(
        &self,
        owner_id: UserId,
        limit: usize,
    ) -> Result<Vec<Transcript>, RepositoryError> {
        let mut owned = self.list_by_owner(owner_id).await?;
        owned.truncate(limit);
        Ok(owned)
    }
}

fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    use chrono::{Datelike, TimeZone};
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// In-memory session store for tests.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, AuthSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &AuthSession) -> Result<(), RepositoryError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.token.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn get(&self, token: &SessionToken) -> Result<Option<AuthSession>, RepositoryError> {
        Ok(self.sessions.lock().unwrap().get(token.as_str()).cloned())
    }

    async fn extend(
        &self,
        token: &SessionToken,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(token.as_str()) {
            session.expires_at = expires_at;
        }
        Ok(())
    }

    async fn remove(&self, token: &SessionToken) -> Result<(), RepositoryError> {
        self.sessions.lock().unwrap().remove(token.as_str());
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at >= now);
        Ok((before - sessions.len()) as u64)
    }
}
