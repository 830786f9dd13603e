//! Session - the context a logged-in user's requests run against.
//!
//! A [`Session`] exists only after a successful login and owns that user's
//! [`Ledger`]. Handlers receive it explicitly; dropping it is logging out.

use crate::{
    core::{
        identity::{self, UserId},
        ledger::Ledger,
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

/// An authenticated user together with their loaded ledger.
#[derive(Debug)]
pub struct Session {
    db: Arc<DatabaseConnection>,
    ledger: Ledger,
}

impl Session {
    /// Authenticates and loads the user's ledger. `Ok(None)` on bad credentials.
    pub async fn login(
        db: &Arc<DatabaseConnection>,
        username: &str,
        password: &str,
    ) -> Result<Option<Self>> {
        let Some(user_id) = identity::authenticate(db, username, password).await? else {
            return Ok(None);
        };

        let ledger = Ledger::load(db, user_id).await?;
        info!(user_id, "Session started");
        Ok(Some(Self {
            db: Arc::clone(db),
            ledger,
        }))
    }

    /// The logged-in user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.ledger.user_id()
    }

    /// Read access to the user's ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Write access to the user's ledger.
    pub const fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Renames the logged-in user. `Ok(false)` if the name is taken.
    pub async fn change_username(&self, new_username: &str) -> Result<bool> {
        identity::update_username(&self.db, self.user_id(), new_username).await
    }

    /// Changes the logged-in user's password.
    pub async fn change_password(&self, new_password: &str) -> Result<bool> {
        identity::update_password(&self.db, self.user_id(), new_password).await
    }
}
