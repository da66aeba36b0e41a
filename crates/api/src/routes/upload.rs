//! File upload route.
//!
//! `POST /upload` takes a multipart form with a `file` part, spools the part
//! to an anonymous temp file, and hands that file to the upload service.
//!
//! | Failure                         | Status | Body                              |
//! |---------------------------------|--------|-----------------------------------|
//! | no usable `file` part           | 400    | `{"error":"File is required"}`    |
//! | spool file cannot be written    | 500    | `{"error":"Failed to open file"}` |
//! | upload service error            | 500    | `{"error":"File upload failed"}`  |

use std::path::{Path, PathBuf};

use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    routing::post,
};
use serde::Serialize;
use stowage_shared::{AppError, AppResult};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

use crate::{ApiError, AppState};

/// Form field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Creates the upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_file))
}

/// Response for a stored file.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// URL of the stored object.
    pub file_url: String,
}

/// POST `/upload`
async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        warn!(error = %e, "Rejected upload: body is not multipart");
        AppError::FileRequired
    })?;

    let (filename, mut stream) = loop {
        let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!(error = %e, "Rejected upload: malformed multipart body");
            AppError::FileRequired
        })?
        else {
            warn!("Rejected upload: no file part");
            return Err(AppError::FileRequired.into());
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            continue;
        };

        let stream = spool(field, state.upload_config.spool_dir.as_deref()).await?;
        break (filename, stream);
    };

    // `stream` is dropped on every path out of here, which closes and
    // removes the spool file.
    let file_url = state
        .uploads
        .upload_file(&mut stream, &filename)
        .await
        .map_err(|_| AppError::UploadFailed)?;

    Ok(Json(UploadResponse { file_url }))
}

/// Copy a multipart field into an anonymous temp file, chunk by chunk.
async fn spool(mut field: Field<'_>, dir: Option<&Path>) -> AppResult<File> {
    let dir: Option<PathBuf> = dir.map(Path::to_path_buf);
    let file = tokio::task::spawn_blocking(move || match dir {
        Some(dir) => tempfile::tempfile_in(dir),
        None => tempfile::tempfile(),
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Spool task failed");
        AppError::StreamOpenFailed
    })?
    .map_err(|e| {
        error!(error = %e, "Failed to create spool file");
        AppError::StreamOpenFailed
    })?;

    let mut file = File::from_std(file);
    while let Some(chunk) = field.chunk().await.map_err(|e| {
        warn!(error = %e, "Rejected upload: file part could not be read");
        AppError::FileRequired
    })? {
        file.write_all(&chunk).await.map_err(|e| {
            error!(error = %e, "Failed to write spool file");
            AppError::StreamOpenFailed
        })?;
    }
    file.flush().await.map_err(|e| {
        error!(error = %e, "Failed to flush spool file");
        AppError::StreamOpenFailed
    })?;

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use stowage_core::storage::{StorageBackend, StorageError, content_length, object_url};
    use stowage_core::upload::UploadService;
    use stowage_shared::UploadConfig;
    use tokio::io::AsyncReadExt;
    use tower::ServiceExt;

    const BOUNDARY: &str = "stowage-test-boundary";

    /// One multipart part: field name, optional filename, content.
    type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(
        service: UploadService,
        request: Request<Body>,
    ) -> (StatusCode, serde_json::Value) {
        let app = routes().with_state(AppState::new(service, UploadConfig::default()));
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    /// Echoes the received content back in the URL.
    struct EchoBackend;

    #[async_trait]
    impl StorageBackend for EchoBackend {
        async fn upload_file(
            &self,
            stream: &mut File,
            filename: &str,
        ) -> Result<String, StorageError> {
            content_length(stream).await.map_err(StorageError::transfer)?;
            let mut content = String::new();
            stream
                .read_to_string(&mut content)
                .await
                .map_err(StorageError::transfer)?;
            Ok(format!(
                "{}?content={content}",
                object_url("http://mock", "bucket", filename)
            ))
        }

        fn kind(&self) -> &'static str {
            "Echo"
        }

        fn bucket(&self) -> &str {
            "bucket"
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl StorageBackend for FailingBackend {
        async fn upload_file(&self, _: &mut File, _: &str) -> Result<String, StorageError> {
            Err(StorageError::transfer(std::io::Error::other(
                "SignatureDoesNotMatch for key AKIA...",
            )))
        }

        fn kind(&self) -> &'static str {
            "Failing"
        }

        fn bucket(&self) -> &str {
            "bucket"
        }
    }

    fn echo() -> UploadService {
        UploadService::new(Arc::new(EchoBackend))
    }

    fn failing() -> UploadService {
        UploadService::new(Arc::new(FailingBackend))
    }

    #[tokio::test]
    async fn test_upload_success() {
        let body = multipart_body(&[("file", Some("hello.txt"), b"hi there")]);

        let (status, json) = send(echo(), upload_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({ "file_url": "http://mock/bucket/hello.txt?content=hi there" })
        );
    }

    #[tokio::test]
    async fn test_other_fields_are_skipped() {
        let body = multipart_body(&[
            ("description", None, b"quarterly report"),
            ("attachment", Some("other.bin"), b"nope"),
            ("file", Some("report.csv"), b"a,b"),
        ]);

        let (status, json) = send(echo(), upload_request(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["file_url"], "http://mock/bucket/report.csv?content=a,b");
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let body = multipart_body(&[("description", None, b"no file here")]);

        let (status, json) = send(echo(), upload_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "File is required" }));
    }

    #[tokio::test]
    async fn test_file_field_without_filename() {
        let body = multipart_body(&[("file", None, b"plain value")]);

        let (status, json) = send(echo(), upload_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "File is required" }));
    }

    #[tokio::test]
    async fn test_file_field_with_empty_filename() {
        let body = multipart_body(&[("file", Some(""), b"anonymous")]);

        let (status, json) = send(echo(), upload_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "File is required" }));
    }

    #[tokio::test]
    async fn test_not_multipart() {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"file":"x"}"#))
            .unwrap();

        let (status, json) = send(echo(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({ "error": "File is required" }));
    }

    #[tokio::test]
    async fn test_uninitialized_service_returns_500() {
        let body = multipart_body(&[("file", Some("a.txt"), b"data")]);

        let (status, json) = send(UploadService::uninitialized(), upload_request(body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": "File upload failed" }));
    }

    #[tokio::test]
    async fn test_backend_failure_hides_cause() {
        let body = multipart_body(&[("file", Some("a.txt"), b"data")]);

        let (status, json) = send(failing(), upload_request(body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({ "error": "File upload failed" }));
    }

    #[tokio::test]
    async fn test_unwritable_spool_dir_returns_500() {
        let dir = tempfile::tempdir().unwrap();
        let config = UploadConfig {
            spool_dir: Some(dir.path().join("missing")),
            ..UploadConfig::default()
        };
        let app = routes().with_state(AppState::new(echo(), config));
        let body = multipart_body(&[("file", Some("a.txt"), b"data")]);

        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": "Failed to open file" }));
    }
}
