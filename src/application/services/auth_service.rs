use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::application::ports::{
    FederatedProfile, Mailer, RepositoryError, SessionStore, UserRepository,
};
use crate::domain::{AuthSession, SessionToken, User, UserId, normalize_email};

/// Result of a local signup: the created (unverified) user, plus the OTP
/// code when delivery was unavailable and the configuration allows echoing
/// it back (never in production).
#[derive(Debug)]
pub struct SignupOutcome {
    pub user: User,
    pub otp_echo: Option<String>,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    mailer: Arc<dyn Mailer>,
    session_ttl: Duration,
    /// Whether undeliverable OTP codes may appear in responses. False in
    /// production.
    echo_undelivered_otp: bool,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        mailer: Arc<dyn Mailer>,
        session_ttl: Duration,
        echo_undelivered_otp: bool,
    ) -> Self {
        Self {
            users,
            sessions,
            mailer,
            session_ttl,
            echo_undelivered_otp,
        }
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupOutcome, AuthError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "name, email and password are required".to_string(),
            ));
        }

        let normalized = normalize_email(email);
        if self.users.find_by_email(&normalized).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        let user = User::local(name.trim().to_string(), &normalized, hash, Utc::now());
        match self.users.create(&user).await {
            Ok(()) => {}
            // Backstop for a concurrent signup racing the pre-check.
            Err(RepositoryError::ConstraintViolation(_)) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        let code = user
            .otp
            .as_ref()
            .map(|c| c.code.clone())
            .unwrap_or_default();
        let otp_echo = self.deliver_otp(&normalized, &user.name, &code).await;

        tracing::info!(user_id = %user.id, "Local account created, verification pending");
        Ok(SignupOutcome { user, otp_echo })
    }

    #[tracing::instrument(skip(self, code))]
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<User, AuthError> {
        let normalized = normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&normalized)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let now = Utc::now();
        let valid = user
            .otp
            .as_ref()
            .is_some_and(|c| c.matches(code) && !c.is_expired(now));
        if !valid {
            return Err(AuthError::InvalidOrExpiredOtp);
        }

        user.mark_verified(now);
        self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "Email verified");

        // Welcome notification is fire-and-forget; its failure never
        // reaches the caller.
        let mailer = Arc::clone(&self.mailer);
        let (to, name) = (normalized, user.name.clone());
        tokio::spawn(async move {
            if let Err(e) = mailer.send_welcome(&to, &name).await {
                tracing::warn!(error = %e, "Welcome email not delivered");
            }
        });

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn resend_otp(&self, email: &str) -> Result<Option<String>, AuthError> {
        let normalized = normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&normalized)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_email_verified {
            return Err(AuthError::AlreadyVerified);
        }

        let challenge = user.reissue_otp(Utc::now());
        self.users.update(&user).await?;

        Ok(self
            .deliver_otp(&normalized, &user.name, &challenge.code)
            .await)
    }

    /// Credential check against the stored hash. The failure reason is
    /// deliberately generic; callers never learn which field was wrong.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let normalized = normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&normalized)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;

        if !bcrypt::verify(password, hash).unwrap_or(false) {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_email_verified {
            return Err(AuthError::VerificationRequired);
        }

        user.record_login(Utc::now());
        self.users.update(&user).await?;
        Ok(user)
    }

    /// Resolve a federated callback profile to an account: by subject id,
    /// else by email (linking the provider to the existing account), else by
    /// creating a fresh, already-verified user.
    #[tracing::instrument(skip(self, profile), fields(subject = %profile.subject))]
    pub async fn resolve_federated(&self, profile: FederatedProfile) -> Result<User, AuthError> {
        let now = Utc::now();

        if let Some(mut user) = self.users.find_by_google_id(&profile.subject).await? {
            user.record_login(now);
            self.users.update(&user).await?;
            return Ok(user);
        }

        if let Some(email) = profile.email.as_deref() {
            let normalized = normalize_email(email);
            if let Some(mut user) = self.users.find_by_email(&normalized).await? {
                user.link_google(profile.subject.clone(), profile.picture.clone(), now);
                // The provider vouches for the address.
                user.mark_verified(now);
                user.record_login(now);
                self.users.update(&user).await?;
                tracing::info!(user_id = %user.id, "Federated identity linked to existing account");
                return Ok(user);
            }
        }

        let user = User::federated(
            profile.subject,
            profile.name,
            profile.email.as_deref(),
            profile.picture,
            now,
        );
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "Account created from federated profile");
        Ok(user)
    }

    pub async fn establish_session(&self, user_id: UserId) -> Result<AuthSession, AuthError> {
        let session = AuthSession::start(user_id, self.session_ttl, Utc::now());
        self.sessions.insert(&session).await?;
        Ok(session)
    }

    /// Resolve a cookie token to a live user. Expired sessions and sessions
    /// pointing at missing users self-heal by deletion; both resolve to
    /// "unauthenticated", never an error. Successful resolution slides the
    /// expiry forward.
    pub async fn resolve_session(&self, token: &SessionToken) -> Result<Option<User>, AuthError> {
        let Some(session) = self.sessions.get(token).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        if session.is_expired(now) {
            let _ = self.sessions.remove(token).await;
            return Ok(None);
        }

        let Some(user) = self.users.find_by_id(session.user_id).await? else {
            let _ = self.sessions.remove(token).await;
            return Ok(None);
        };

        if let Err(e) = self.sessions.extend(token, now + self.session_ttl).await {
            tracing::warn!(error = %e, "Failed to slide session expiry");
        }

        Ok(Some(user))
    }

    /// Idempotent; succeeds even when no session existed.
    pub async fn terminate_session(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.sessions.remove(token).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, name, email))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<User, AuthError> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(new_email) = email {
            let normalized = normalize_email(&new_email);
            if user.email.as_deref() != Some(normalized.as_str()) {
                if let Some(other) = self.users.find_by_email(&normalized).await? {
                    if other.id != user.id {
                        return Err(AuthError::EmailTaken);
                    }
                }
                user.email = Some(normalized);
            }
        }

        if let Some(new_name) = name {
            if !new_name.trim().is_empty() {
                user.name = new_name.trim().to_string();
            }
        }

        user.updated_at = Utc::now();
        self.users.update(&user).await?;
        Ok(user)
    }

    /// Attempt delivery; on unavailability or failure return the code for
    /// echoing when (and only when) the configuration permits it.
    async fn deliver_otp(&self, email: &str, name: &str, code: &str) -> Option<String> {
        match self.mailer.send_otp(email, name, code).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(error = %e, "OTP email not delivered");
                self.echo_undelivered_otp.then(|| code.to_string())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("email not verified")]
    VerificationRequired,
    #[error("user not found")]
    UserNotFound,
    #[error("email already verified")]
    AlreadyVerified,
    #[error("invalid or expired verification code")]
    InvalidOrExpiredOtp,
    #[error("credential hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
