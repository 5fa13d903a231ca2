//! Image collection and item API routes.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use imagehost_common::{Error, ImageId};
use imagehost_db::models::Image;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::ApiError;
use super::upload_form::{title_from_filename, RawUpload};
use super::AppContext;
use crate::images::prepare_image;

/// Create image routes.
pub fn image_routes() -> Router<AppContext> {
    Router::new()
        .route("/images/", get(list_images).post(create_image))
        .route("/images", get(list_images).post(create_image))
        .route("/images/:image_id", get(get_image))
}

// ============================================================================
// Request / response types
// ============================================================================

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Case-insensitive substring the title must contain
    pub title: Option<String>,
}

/// Public view of a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: i64,
    /// Path the stored file is served from
    pub url: String,
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl ImageResponse {
    pub fn from_image(image: Image, media_url: &str) -> Self {
        Self {
            id: image.id.get(),
            url: media_file_url(media_url, &image.path),
            title: image.title,
            width: image.width,
            height: image.height,
        }
    }
}

/// Public URL of a stored file. Each path segment is percent-encoded.
fn media_file_url(media_url: &str, path: &str) -> String {
    let encoded: Vec<_> = path.split('/').map(urlencoding::encode).collect();
    format!("{}{}", media_url, encoded.join("/"))
}

// ============================================================================
// Handlers
// ============================================================================

/// List images, optionally filtered by title.
#[utoipa::path(
    get,
    path = "/images/",
    tag = "images",
    params(ListQuery),
    responses(
        (status = 200, description = "Stored images in creation order", body = Vec<ImageResponse>),
        (status = 500, description = "Storage failure", body = ErrorMessage)
    )
)]
pub async fn list_images(
    State(ctx): State<AppContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ImageResponse>>, ApiError> {
    let images = ctx.store.list(query.title.as_deref())?;
    let media_url = &ctx.config.storage.media_url;

    Ok(Json(
        images
            .into_iter()
            .map(|image| ImageResponse::from_image(image, media_url))
            .collect(),
    ))
}

/// Upload an image, optionally resizing it.
///
/// A zero `width` and `height` stores the file unchanged. When exactly one is
/// zero it is derived from the source aspect ratio.
#[utoipa::path(
    post,
    path = "/images/",
    tag = "images",
    request_body(content = UploadImageRequest, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ImageResponse),
        (status = 400, description = "Invalid form fields or image", body = ErrorMessage),
        (status = 413, description = "Request body too large"),
        (status = 500, description = "Storage failure", body = ErrorMessage)
    )
)]
pub async fn create_image(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = RawUpload::from_multipart(multipart?).await?;
    let upload = raw.clean().map_err(ApiError::Validation)?;

    let title = upload
        .title
        .unwrap_or_else(|| title_from_filename(&upload.image.filename));

    let store = ctx.store.clone();
    let (width, height) = (upload.width, upload.height);
    let file = upload.image;

    let image = tokio::task::spawn_blocking(move || -> Result<Image, ApiError> {
        let prepared = prepare_image(file.data, &file.filename, width, height)?;
        let image = store.save(
            &title,
            prepared.width,
            prepared.height,
            &prepared.data,
            &file.filename,
        )?;
        Ok(image)
    })
    .await
    .map_err(|e| Error::internal(format!("Upload task failed: {}", e)))??;

    tracing::info!(
        "Stored {} at {} ({}x{})",
        image.id,
        image.path,
        image.width,
        image.height
    );

    Ok((
        StatusCode::CREATED,
        Json(ImageResponse::from_image(
            image,
            &ctx.config.storage.media_url,
        )),
    ))
}

/// Get an image by ID.
#[utoipa::path(
    get,
    path = "/images/{image_id}",
    tag = "images",
    params(
        ("image_id" = i64, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image details", body = ImageResponse),
        (status = 404, description = "Image not found", body = ErrorMessage),
        (status = 500, description = "Storage failure", body = ErrorMessage)
    )
)]
pub async fn get_image(
    State(ctx): State<AppContext>,
    Path(image_id): Path<String>,
) -> Result<Json<ImageResponse>, ApiError> {
    let id: ImageId = image_id
        .parse()
        .map_err(|_| ApiError::ImageNotFound(image_id.clone()))?;

    match ctx.store.get(id) {
        Ok(image) => Ok(Json(ImageResponse::from_image(
            image,
            &ctx.config.storage.media_url,
        ))),
        Err(Error::NotFound(_)) => Err(ApiError::ImageNotFound(image_id)),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Documentation-only schemas
// ============================================================================

/// Multipart fields accepted by the upload endpoint.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    /// At most 80 characters; defaults to the filename before its first `.`
    pub title: Option<String>,
    /// Target width in pixels, 0 to derive or keep
    pub width: Option<u32>,
    /// Target height in pixels, 0 to derive or keep
    pub height: Option<u32>,
    /// The image file
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Error body. `error` is a message, or a map of field name to messages for
/// form validation failures.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct ErrorMessage {
    #[schema(value_type = Object)]
    pub error: String,
}
