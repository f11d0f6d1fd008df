//! The seam between the session layer and whatever carries requests.

use std::future::Future;
use std::sync::Arc;

use questline_protocol::{ApiRequest, ApiResponse};

use crate::TransportError;

/// Sends one request and returns the server's response.
///
/// A non-2xx status is a response, not an error: `Err` means no response
/// arrived at all.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because the coordinator shares one transport
/// with the task that runs the refresh exchange and replays.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send {
        (**self).send(request)
    }
}
