//! Session management.

use tracing::info;

use super::Agent;
use crate::core::auth;
use crate::core::remote::{Api, VerifyRequest};
use crate::error::Result;

impl<A: Api> Agent<A> {
    /// Prove possession of the machine key and store the session token.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::AuthFailure` if the challenge is not addressed to
    /// this machine's key, and `RemoteError::Rejected` if the server refuses
    /// the signature.
    pub async fn login(&mut self) -> Result<()> {
        let machine_id = self.store.machine_id().to_string();
        let challenge = self
            .remote(self.api.request_challenge(&machine_id))
            .await?;

        let signature = {
            let key = self.store.private_key()?;
            auth::answer_challenge(&key, &challenge.challenge)?
        };

        let request = VerifyRequest {
            machine_name: machine_id,
            challenge_id: challenge.challenge_id,
            signature,
        };
        let response = self.remote(self.api.verify_challenge(&request)).await?;
        let token = auth::accept(response)?;

        self.store.save_jwt(&token)?;
        self.api.set_session_token(Some(&token));
        info!(machine_id = %self.store.machine_id(), "logged in");
        Ok(())
    }

    /// Forget the session token.
    pub fn logout(&mut self) -> Result<()> {
        self.store.save_jwt("")?;
        self.api.set_session_token(None);
        Ok(())
    }
}
