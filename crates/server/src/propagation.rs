use std::task::{Context, Poll};

use http::Request;
use identity::Authentication;
use tower::Layer;

/// Injects the `X-User-*` identity headers for requests carrying a validated token.
///
/// Must sit inside [`AuthLayer`](crate::auth::AuthLayer) so the principal is already attached.
#[derive(Clone, Copy, Default)]
pub struct IdentityLayer;

impl<Service> Layer<Service> for IdentityLayer {
    type Service = IdentityService<Service>;

    fn layer(&self, next: Service) -> Self::Service {
        IdentityService { next }
    }
}

#[derive(Clone)]
pub struct IdentityService<Service> {
    next: Service,
}

impl<Service, ReqBody> tower::Service<Request<ReqBody>> for IdentityService<Service>
where
    Service: tower::Service<Request<ReqBody>>,
{
    type Response = Service::Response;
    type Error = Service::Error;
    type Future = Service::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let authentication = req.extensions().get::<Authentication>().cloned();

        identity::forward(req, authentication.as_ref(), |req| self.next.call(req))
    }
}
