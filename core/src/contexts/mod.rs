//! Async facades: request value → factory → connection → response factory.
//!
//! One call is one exchange. Nothing is retried, cached or run in the
//! background; cancelling is dropping the future.

mod changes;
mod databases;
mod documents;
mod queries;
mod searches;
mod views;

pub use changes::Changes;
pub use databases::{Database, Databases};
pub use documents::{Documents, Entities};
pub use queries::Queries;
pub use searches::Searches;
pub use views::Views;

use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::Result;
use crate::factories::HttpRequestFactory;
use crate::http::{HttpRequest, HttpResponse};
use crate::requests::Request;
use crate::responses::{Response, ResponseFactory};

/// Sends one request and logs the outcome.
async fn send(connection: &dyn Connection, request: HttpRequest) -> Result<HttpResponse> {
    let method = request.method;
    let url = request.url(connection.address());
    let response = connection.send(request).await?;
    debug!(%method, %url, status = response.status, "exchange completed");
    if !response.is_success() {
        warn!(%method, %url, status = response.status, body = %response.body, "request failed");
    }
    Ok(response)
}

async fn execute<R, F, RF>(
    connection: &dyn Connection,
    factory: &F,
    request: &R,
    responses: &RF,
) -> Result<Response<RF::Content>>
where
    R: Request,
    F: HttpRequestFactory<R>,
    RF: ResponseFactory,
{
    let http_request = factory.create(request)?;
    let http_response = send(connection, http_request).await?;
    responses.create(http_response)
}
