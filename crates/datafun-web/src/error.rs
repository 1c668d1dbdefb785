//! Mapping from application errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use datafun_common::DatafunError;
use thiserror::Error;
use tracing::warn;

use crate::render::escape;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Core(#[from] DatafunError),

    #[error("{0} does not accept submissions")]
    MethodNotAllowed(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Core(DatafunError::UnknownPage(_))     => StatusCode::NOT_FOUND,
            WebError::Core(DatafunError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            WebError::Core(DatafunError::FileParse(_))       => StatusCode::UNPROCESSABLE_ENTITY,
            WebError::Core(_)                                => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::MethodNotAllowed(_)                    => StatusCode::METHOD_NOT_ALLOWED,
            WebError::BadRequest(_)                          => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let body = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{code} — Fun Data App</title>
<link rel="stylesheet" href="/static/css/main.css"></head>
<body><main class="main-content">
<h1 class="page-title">{code}</h1>
<div class="alert alert-error">{message}</div>
<p><a href="/overview" class="btn btn-outline">Back to the dashboard</a></p>
</main></body>
</html>"#,
            code = status.as_u16(),
            message = escape(&self.to_string()),
        );
        (status, Html(body)).into_response()
    }
}

pub type WebResult<T> = std::result::Result<T, WebError>;
