use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub apps: usize,
}

#[derive(Serialize, Deserialize)]
pub struct MetricsResponse {
    pub callbacks_received: u64,
    pub callbacks_accepted: u64,
    pub callbacks_rejected: u64,
    pub health_checks: u64,
}

/// Callback body, posted either as a JSON object or as an urlencoded form.
/// Form fields arrive as strings.
pub struct CallbackPayload(pub Map<String, Value>);

impl<S> FromRequest<S> for CallbackPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            ))
        } else {
            let Json(map) = Json::<Map<String, Value>>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(map))
        }
    }
}
