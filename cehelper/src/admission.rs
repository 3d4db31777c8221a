use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use kube::ResourceExt;
use kube::api::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

use crate::Error;

const JSON_MEDIA_TYPE: &str = "application/json";

#[async_trait]
pub trait MutatingAdmissionHandler: Send + Sync {
    /// Error type returned by the handler
    type Err: StdError + Send + Sync + 'static;

    /// Returns the name of this handler for logging purposes
    fn name(&self) -> &'static str;

    /// Mutates the resource in the admission request
    ///
    /// Returns an `AdmissionResponse` that may include JSON patches to modify the resource.
    /// Use `AdmissionResponse::from(req).with_patch(patches)` to apply patches.
    /// If no patches are needed, return `AdmissionResponse::from(req)`.
    async fn mutate(
        &self,
        req: &AdmissionRequest<DynamicObject>,
    ) -> Result<AdmissionResponse, Self::Err>;
}

/// Creates the warp route serving `POST /mutate`
///
/// Without a handler every well-formed review is answered with a 500 naming
/// the missing provider configuration.
pub fn mutate_route<H>(
    handler: Option<Arc<H>>,
) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone
where
    H: MutatingAdmissionHandler + 'static,
{
    warp::post()
        .and(warp::path("mutate"))
        .and(warp::path::end())
        .and(warp::header::optional::<String>("content-type"))
        .and(warp::body::bytes())
        .then(move |content_type: Option<String>, body: Bytes| {
            let handler = handler.clone();
            async move { review(handler.as_deref(), content_type.as_deref(), &body).await }
        })
}

async fn review<H>(handler: Option<&H>, content_type: Option<&str>, body: &[u8]) -> Response
where
    H: MutatingAdmissionHandler,
{
    if body.is_empty() {
        return plain("Empty request body", StatusCode::BAD_REQUEST);
    }

    if !is_json(content_type) {
        return plain(
            "Invalid Content-Type, expected application/json",
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
        );
    }

    let req = match decode(body) {
        Ok(req) => req,
        Err(err) => {
            error!(error = %err, "could not decode admission review");
            return plain(err.to_string(), StatusCode::BAD_REQUEST);
        }
    };

    let Some(handler) = handler else {
        error!(uid = %req.uid, "{}", Error::NoProvider);
        return plain(Error::NoProvider.to_string(), StatusCode::INTERNAL_SERVER_ERROR);
    };

    let (kind, name) = req
        .object
        .as_ref()
        .map(|obj| {
            let kind = obj.types.clone().unwrap_or_default().kind;
            (kind, obj.name_any())
        })
        .unwrap_or_default();

    let res = match handler.mutate(&req).await {
        Ok(res) => {
            if res.allowed {
                info!(
                    handler = handler.name(),
                    operation = ?req.operation,
                    kind = %kind,
                    name = %name,
                    patched = res.patch.is_some(),
                    "admitted resource"
                );
            } else {
                warn!(
                    handler = handler.name(),
                    operation = ?req.operation,
                    kind = %kind,
                    name = %name,
                    "mutation denied"
                );
            }
            res
        }
        Err(err) => {
            error!(
                handler = handler.name(),
                operation = ?req.operation,
                kind = %kind,
                name = %name,
                error = %err,
                "mutation failed"
            );
            AdmissionResponse::from(&req).deny(err.to_string())
        }
    };

    warp::reply::json(&res.into_review()).into_response()
}

fn decode(body: &[u8]) -> crate::Result<AdmissionRequest<DynamicObject>> {
    let review: AdmissionReview<DynamicObject> =
        serde_json::from_slice(body).map_err(Error::Decode)?;
    Ok(review.try_into()?)
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|value| value.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

fn plain(message: impl Into<String>, status: StatusCode) -> Response {
    warp::reply::with_status(message.into(), status).into_response()
}
