//! A path parameter extractor that answers with JSON errors.

use axum::extract::{FromRequestParts, rejection::PathRejection};

use crate::Error;

/// Extracts path parameters like [axum::extract::Path], but a segment that
/// does not parse, e.g. a non-numeric ID, is reported as [Error::NotFound].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(error) => {
                tracing::debug!("could not parse path parameters: {error}");
            }
            other => tracing::error!("could not extract path parameters: {other}"),
        }

        Error::NotFound
    }
}
