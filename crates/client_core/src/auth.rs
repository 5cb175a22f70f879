use async_trait::async_trait;
use reqwest::Method;
use shared::protocol::{Credentials, LoginResponse};
use tracing::{info, warn};

use crate::{
    error::ClientError,
    http::{error_body, login_route, users_route, HttpStorefront},
    session::AuthToken,
};

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Every failure collapses to [`ClientError::invalid_credentials`].
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ClientError>;

    /// A backend `error` message becomes [`ClientError::Validation`], anything
    /// else [`ClientError::Registration`].
    async fn register(&self, credentials: &Credentials) -> Result<(), ClientError>;
}

#[async_trait]
impl AuthApi for HttpStorefront {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ClientError> {
        let response = self
            .request(Method::POST, login_route(), None)
            .json(credentials)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "login request failed");
                ClientError::invalid_credentials()
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, username = %credentials.username, "login rejected");
            return Err(ClientError::invalid_credentials());
        }

        let body: LoginResponse = response.json().await.map_err(|err| {
            warn!(error = %err, "malformed login response");
            ClientError::invalid_credentials()
        })?;
        let token = AuthToken::new(body.token).ok_or_else(ClientError::invalid_credentials)?;
        info!(username = %credentials.username, "login accepted");
        Ok(token)
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let response = self
            .request(Method::POST, users_route(), None)
            .json(credentials)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "registration request failed");
                ClientError::Registration
            })?;

        let status = response.status();
        if status.is_success() {
            info!(username = %credentials.username, "registration accepted");
            return Ok(());
        }

        let body = error_body(response).await;
        warn!(%status, backend_error = ?body.message(), "registration rejected");
        match body.message() {
            Some(message) => Err(ClientError::Validation(message.to_string())),
            None => Err(ClientError::Registration),
        }
    }
}
