mod error;
mod jwks;
mod jwt;

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{body::Body, response::IntoResponse};
use config::{OauthConfig, SecurityConfig};
pub(crate) use error::AuthError;
use http::{Request, Response, header::AUTHORIZATION, request::Parts};
use identity::{Authentication, Token};
use jwt::JwtAuth;

use tower::Layer;

use crate::access::AccessPolicy;

type AuthResult<T> = Result<T, AuthError>;

/// Authenticates bearer tokens and enforces the access policy.
///
/// On success the request carries an [`Authentication`] extension: the validated token, or
/// [`Authentication::Anonymous`] for requests without credentials on a public path.
///
/// Without an OAuth configuration no token can be validated: the access policy is still enforced
/// and any request carrying credentials is rejected.
#[derive(Clone)]
pub struct AuthLayer(Arc<AuthLayerInner>);

struct AuthLayerInner {
    jwt: Option<JwtAuth>,
    access: AccessPolicy,
}

impl AuthLayer {
    pub fn new(oauth: Option<OauthConfig>, security: &SecurityConfig) -> Self {
        let jwt = oauth.map(JwtAuth::new);
        let access = AccessPolicy::new(security);

        Self(Arc::new(AuthLayerInner { jwt, access }))
    }
}

impl AuthLayerInner {
    async fn authenticate(&self, parts: &Parts) -> AuthResult<Option<Token>> {
        match &self.jwt {
            Some(jwt) => jwt.authenticate(parts).await,
            None if parts.headers.contains_key(AUTHORIZATION) => {
                Err(AuthError::InvalidToken("token validation is not configured"))
            }
            None => Ok(None),
        }
    }
}

impl<Service> Layer<Service> for AuthLayer
where
    Service: Send + Clone,
{
    type Service = AuthService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        AuthService {
            next,
            layer: self.0.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthService<Service> {
    next: Service,
    layer: Arc<AuthLayerInner>,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for AuthService<Service>
where
    Service: tower::Service<Request<ReqBody>, Response = Response<Body>> + Send + Clone + 'static,
    Service::Future: Send,
    Service::Error: Display + 'static,
    ReqBody: http_body::Body + Send + 'static,
{
    type Response = http::Response<Body>;
    type Error = Service::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response<Body>, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let clone = self.next.clone();
        let mut next = std::mem::replace(&mut self.next, clone);
        let layer = self.layer.clone();

        let (mut parts, body) = req.into_parts();

        Box::pin(async move {
            let authentication = match layer.authenticate(&parts).await {
                Ok(Some(token)) => {
                    log::debug!(
                        path = parts.uri.path(),
                        subject = token.subject().unwrap_or("<none>");
                        "Authenticated request"
                    );

                    Authentication::from(token)
                }
                Ok(None) if !layer.access.requires_authentication(parts.uri.path()) => Authentication::Anonymous,
                Ok(None) => {
                    log::debug!(path = parts.uri.path(); "Rejected unauthenticated request");
                    return Ok(AuthError::MissingToken.into_response());
                }
                Err(auth_error) => {
                    log::debug!(path = parts.uri.path(); "Rejected request: {auth_error}");
                    return Ok(auth_error.into_response());
                }
            };

            parts.extensions.insert(authentication);
            next.call(Request::from_parts(parts, body)).await
        })
    }
}
