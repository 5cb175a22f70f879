use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::error::ApiErrorBody;
use tracing::{debug, warn};
use url::Url;

use crate::{error::ClientError, session::AuthToken};

pub fn users_route() -> &'static str {
    "/api/users"
}

pub fn login_route() -> &'static str {
    "/api/users/login"
}

pub fn items_route() -> &'static str {
    "/api/items"
}

pub fn carts_route() -> &'static str {
    "/api/carts"
}

pub fn orders_route() -> &'static str {
    "/api/orders"
}

/// Reqwest-backed implementation of every storefront client trait.
///
/// Each call is a single request-response round trip. The underlying client is
/// built without a request timeout and nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpStorefront {
    pub(crate) http: Client,
    base_url: Url,
}

/// Whether a failed call reads state or changes it; decides between
/// [`ClientError::Fetch`] and [`ClientError::Submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Read,
    Write,
}

impl Operation {
    fn failure(self, message: String) -> ClientError {
        match self {
            Self::Read => ClientError::Fetch(message),
            Self::Write => ClientError::Submit(message),
        }
    }
}

impl HttpStorefront {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, route: &str) -> String {
        format!("{}{route}", self.base_url.as_str().trim_end_matches('/'))
    }

    pub(crate) fn request(
        &self,
        method: Method,
        route: &str,
        token: Option<&AuthToken>,
    ) -> RequestBuilder {
        debug!(%method, route, authenticated = token.is_some(), "storefront request");
        let builder = self.http.request(method, self.endpoint(route));
        match token {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    /// Sends a request and turns transport errors and non-2xx statuses into
    /// [`ClientError`]s. 401/403 on an authenticated call is an auth failure.
    pub(crate) async fn execute(
        &self,
        builder: RequestBuilder,
        operation: Operation,
        label: &str,
        authenticated: bool,
    ) -> Result<Response, ClientError> {
        let response = builder.send().await.map_err(|err| {
            warn!(error = %err, label, "storefront request failed");
            operation.failure(format!("{label}: {err}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = error_body(response).await;
        warn!(%status, label, backend_error = ?body.message(), "storefront request rejected");
        if authenticated && is_auth_rejection(status) {
            return Err(ClientError::Auth(
                body.message()
                    .unwrap_or("session token was rejected")
                    .to_string(),
            ));
        }
        Err(operation.failure(match body.message() {
            Some(message) => format!("{label}: {status}: {message}"),
            None => format!("{label}: {status}"),
        }))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
        token: Option<&AuthToken>,
        label: &str,
    ) -> Result<T, ClientError> {
        let response = self
            .execute(
                self.request(Method::GET, route, token),
                Operation::Read,
                label,
                token.is_some(),
            )
            .await?;
        response.json().await.map_err(|err| {
            warn!(error = %err, label, "malformed storefront response");
            ClientError::Fetch(format!("{label}: malformed response: {err}"))
        })
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        route: &str,
        token: Option<&AuthToken>,
        body: &B,
        label: &str,
    ) -> Result<(), ClientError> {
        self.execute(
            self.request(Method::POST, route, token).json(body),
            Operation::Write,
            label,
            token.is_some(),
        )
        .await?;
        Ok(())
    }
}

pub(crate) async fn error_body(response: Response) -> ApiErrorBody {
    response.json().await.unwrap_or_default()
}

fn is_auth_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let client = HttpStorefront::new(Url::parse("http://shop.test/").expect("url"));
        assert_eq!(client.endpoint(items_route()), "http://shop.test/api/items");

        let prefixed = HttpStorefront::new(Url::parse("http://shop.test/v2").expect("url"));
        assert_eq!(prefixed.endpoint(carts_route()), "http://shop.test/v2/api/carts");
    }

    #[test]
    fn only_401_and_403_are_auth_rejections() {
        assert!(is_auth_rejection(StatusCode::UNAUTHORIZED));
        assert!(is_auth_rejection(StatusCode::FORBIDDEN));
        assert!(!is_auth_rejection(StatusCode::NOT_FOUND));
    }
}
