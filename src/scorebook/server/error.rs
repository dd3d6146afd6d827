use crate::error::CatalogError;
use crate::form::{SheetForm, ValidationErrors};
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Shown for every write failure that is not the client's fault.
pub const SAVE_FAILED: &str = "Could not save the sheet. Please try again.";
const INTERNAL: &str = "Something went wrong. Please try again.";
const LOGIN_PATH: &str = "/login/";

/// Error response of the HTTP layer.
///
/// Most errors serialise as:
/// ```json
/// { "ok": false, "error": { "code": "<code>", "message": "<message>" } }
/// ```
/// Rejected forms instead carry the field errors and the submitted input, so
/// the client can re-render the form:
/// ```json
/// { "ok": false, "errors": { "title": "This field is required." }, "input": { ... } }
/// ```
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum ErrorBody {
    Error(ApiErrorResponse),
    Form(FormErrorResponse),
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub ok: bool,
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    /// Where to authenticate, on 401 only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormErrorResponse {
    pub ok: bool,
    pub errors: ValidationErrors,
    pub input: SheetForm,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::Error(ApiErrorResponse {
                ok: false,
                error: ApiErrorBody {
                    code: code.into(),
                    message: message.into(),
                    login: None,
                },
            }),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn unauthenticated() -> Self {
        let mut err = Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "Please log in to use the catalog.",
        );
        if let ErrorBody::Error(resp) = &mut err.body {
            resp.error.login = Some(LOGIN_PATH.to_string());
        }
        err
    }

    pub fn form(errors: ValidationErrors, input: SheetForm) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorBody::Form(FormErrorResponse {
                ok: false,
                errors,
                input,
            }),
        }
    }

    /// Maps a failed write. Server-side causes are logged and answered with
    /// [`SAVE_FAILED`]; a validation failure echoes `input`.
    pub fn from_write(err: CatalogError, input: Option<SheetForm>) -> Self {
        match err {
            CatalogError::Validation(errors) => Self::form(errors, input.unwrap_or_default()),
            err if is_client_error(&err) => Self::from(err),
            err => {
                tracing::error!(error = %err, "write failed");
                Self::internal(SAVE_FAILED)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn is_client_error(err: &CatalogError) -> bool {
    matches!(
        err,
        CatalogError::SheetNotFound(_)
            | CatalogError::SlugNotFound(_)
            | CatalogError::Forbidden(_)
            | CatalogError::Unauthenticated
            | CatalogError::InvalidQuery(_)
            | CatalogError::Validation(_)
    )
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Malformed query strings get the same JSON error shape as every other 400.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::SheetNotFound(_) | CatalogError::SlugNotFound(_) => {
                Self::not_found(err.to_string())
            }
            CatalogError::Forbidden(msg) => Self::forbidden(msg),
            CatalogError::Unauthenticated => Self::unauthenticated(),
            CatalogError::InvalidQuery(msg) => Self::bad_request(msg),
            CatalogError::Validation(errors) => Self::form(errors, SheetForm::default()),
            err => {
                tracing::error!(error = %err, "request failed");
                Self::internal(INTERNAL)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use serde::Deserialize;
    use uuid::Uuid;

    #[test]
    fn client_errors_keep_their_status() {
        let cases = [
            (CatalogError::SheetNotFound(Uuid::new_v4()), StatusCode::NOT_FOUND),
            (CatalogError::SlugNotFound("x".into()), StatusCode::NOT_FOUND),
            (CatalogError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (CatalogError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (CatalogError::InvalidQuery("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from_write(err, None).status(), status);
        }
    }

    #[test]
    fn server_side_write_failures_hide_details() {
        let err = ApiError::from_write(CatalogError::Store("disk on fire".into()), None);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let ErrorBody::Error(body) = &err.body else {
            panic!("expected error body");
        };
        assert_eq!(body.error.message, SAVE_FAILED);
    }

    #[test]
    fn validation_echoes_input() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "This field is required.");
        let input = SheetForm {
            composer: "Arcadelt".into(),
            ..Default::default()
        };
        let err = ApiError::from_write(CatalogError::Validation(errors), Some(input));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = serde_json::to_value(&err.body).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["errors"]["title"], "This field is required.");
        assert_eq!(json["input"]["composer"], "Arcadelt");
    }

    #[test]
    fn unauthenticated_points_to_login() {
        let json = serde_json::to_value(&ApiError::unauthenticated().body).unwrap();
        assert_eq!(json["error"]["code"], "unauthenticated");
        assert_eq!(json["error"]["login"], LOGIN_PATH);
    }

    #[test]
    fn malformed_query_is_a_json_bad_request() {
        #[derive(Debug, Deserialize)]
        struct Paging {
            #[allow(dead_code)]
            page: u32,
        }

        let uri = "/?page=abc".parse().unwrap();
        let rejection = Query::<Paging>::try_from_uri(&uri).unwrap_err();
        let err = ApiError::from(rejection);

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let ErrorBody::Error(body) = &err.body else {
            panic!("expected error body");
        };
        assert!(!body.ok);
        assert_eq!(body.error.code, "bad_request");
        assert!(body.error.message.contains("query string"));
    }
}
