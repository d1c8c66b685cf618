use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use chrono::Duration;
use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{debug, info, Error, ErrorKind, Result, Time};
use crate::core::{validation, Identity};
use crate::provider::{AuthProvider, AuthStateBroadcast, AuthStateReceiver};
use crate::store::{generate_id, Document, DocumentId, SharedStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Account {
    email: String,
    password_hash: String,
    created_at: Time,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordReset {
    uid: String,
    email: String,
    requested_at: Time,
}

/// Auth provider keeping accounts in the document store.
///
/// Passwords are stored as argon2 PHC strings. A password reset is recorded in
/// an outbox collection keyed by a one time code, from which a mailer picks it
/// up; `confirm_password_reset` consumes the code.
pub struct LocalAuthProvider {
    store: SharedStore,
    min_password_length: usize,
    current: Mutex<Option<Identity>>,
    broadcast: Mutex<AuthStateBroadcast>,
    // Held across the email uniqueness check and the account write.
    accounts: tokio::sync::Mutex<()>,
}

impl LocalAuthProvider {
    pub const ACCOUNTS: &'static str = "accounts";
    pub const PASSWORD_RESETS: &'static str = "passwordResets";
    const RESET_CODE_LENGTH: usize = 32;
    const RESET_CODE_TTL_MINUTES: i64 = 60;

    pub fn new(store: SharedStore, min_password_length: usize) -> Self {
        Self {
            store,
            min_password_length,
            current: Mutex::new(None),
            broadcast: Mutex::new(AuthStateBroadcast::default()),
            accounts: tokio::sync::Mutex::new(()),
        }
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.current.lock().clone()
    }

    /// Number of identity streams that may still be listening.
    pub fn stream_count(&self) -> usize {
        self.broadcast.lock().len()
    }

    /// Set a new password using a code issued by `send_password_reset`.
    pub async fn confirm_password_reset(&self, code: &str, new_password: &str) -> Result<()> {
        self.check_password_strength(new_password)?;

        let reset: PasswordReset = match self.store.get(Self::PASSWORD_RESETS, code).await? {
            Some(doc) => from_document(doc)?,
            None => {
                return Err(ErrorKind::Provider(
                    "The action code is invalid. This can happen if the code is malformed, expired, or has already been used.".into(),
                )
                .into())
            }
        };
        // Codes are single use, expired or not.
        self.store.delete(Self::PASSWORD_RESETS, code).await?;

        if chrono::Utc::now() - reset.requested_at > Duration::minutes(Self::RESET_CODE_TTL_MINUTES) {
            return Err(ErrorKind::Provider("The action code has expired.".into()).into());
        }

        let mut fields = Document::new();
        fields.insert(
            "passwordHash".to_owned(),
            serde_json::Value::String(hash_password(new_password)?),
        );
        self.store.update(Self::ACCOUNTS, &reset.uid, fields).await?;
        info!(email=%reset.email, "Password reset confirmed");

        Ok(())
    }

    async fn find_account(&self, email: &str) -> Result<Option<(DocumentId, Account)>> {
        let email = normalize_email(email);
        for (id, doc) in self.store.list(Self::ACCOUNTS, None).await? {
            let account: Account = from_document(doc)?;
            if account.email == email {
                return Ok(Some((id, account)));
            }
        }
        Ok(None)
    }

    fn check_password_strength(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_password_length {
            Err(ErrorKind::WeakPassword {
                min_length: self.min_password_length,
            }
            .into())
        } else {
            Ok(())
        }
    }

    fn change_user(&self, identity: Option<Identity>) {
        *self.current.lock() = identity.clone();
        self.broadcast.lock().send(identity);
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    fn auth_state_changes(&self) -> AuthStateReceiver {
        let current = self.current.lock().clone();
        self.broadcast.lock().subscribe(current)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let (id, account) = self
            .find_account(email)
            .await?
            .ok_or_else(|| Error::from(ErrorKind::UserNotFound))?;

        let parsed = PasswordHash::new(&account.password_hash)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            debug!(email=%account.email, "Password mismatch");
            return Err(ErrorKind::InvalidCredential.into());
        }

        let identity = Identity::new(id, account.email);
        self.change_user(Some(identity.clone()));
        Ok(identity)
    }

    async fn create_user(&self, email: &str, password: &str) -> Result<Identity> {
        validation::email(email)?;
        self.check_password_strength(password)?;

        let account = Account {
            email: normalize_email(email),
            password_hash: hash_password(password)?,
            created_at: chrono::Utc::now(),
        };
        let id = generate_id();
        {
            let _guard = self.accounts.lock().await;
            if self.find_account(email).await?.is_some() {
                return Err(ErrorKind::EmailAlreadyInUse.into());
            }
            self.store
                .set(Self::ACCOUNTS, &id, to_document(&account)?)
                .await?;
        }
        info!(email=%account.email, uid=%id, "Account created");

        let identity = Identity::new(id, account.email);
        self.change_user(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        self.change_user(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<()> {
        let (uid, account) = self
            .find_account(email)
            .await?
            .ok_or_else(|| Error::from(ErrorKind::UserNotFound))?;

        let code: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::RESET_CODE_LENGTH)
            .map(char::from)
            .collect();
        let reset = PasswordReset {
            uid,
            email: account.email,
            requested_at: chrono::Utc::now(),
        };
        self.store
            .set(Self::PASSWORD_RESETS, &code, to_document(&reset)?)
            .await?;
        info!(email=%reset.email, "Password reset requested");

        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)?;
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(doc) => Ok(doc),
        _ => Err(ErrorKind::Internal("document is not an object".into()).into()),
    }
}

fn from_document<T: serde::de::DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
}
