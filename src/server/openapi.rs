//! OpenAPI documentation and Swagger UI integration.

use axum::{http::header, response::IntoResponse, routing::get, Router};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use super::error::ApiError;
use super::AppContext;

/// OpenAPI documentation for the image API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Imagehost API",
        version = "0.1.0",
        description = "Upload, resize and list images",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Default server")
    ),
    paths(
        super::routes_images::list_images,
        super::routes_images::create_image,
        super::routes_images::get_image,
    ),
    components(
        schemas(
            super::routes_images::ImageResponse,
            super::routes_images::UploadImageRequest,
            super::routes_images::ErrorMessage,
        )
    ),
    tags(
        (name = "images", description = "Image upload and retrieval")
    )
)]
pub struct ApiDoc;

/// Create OpenAPI documentation routes.
/// - `/swagger` - Swagger UI
/// - `/swagger.json` - Raw OpenAPI JSON document (served by SwaggerUi)
/// - `/swagger.yaml` - The same document as YAML
/// - `/redoc` - ReDoc UI
pub fn openapi_routes() -> Router<AppContext> {
    Router::new()
        .merge(SwaggerUi::new("/swagger").url("/swagger.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .route("/swagger.yaml", get(openapi_yaml))
}

async fn openapi_yaml() -> Result<impl IntoResponse, ApiError> {
    let yaml = ApiDoc::openapi().to_yaml().map_err(|e| {
        imagehost_common::Error::internal(format!("Failed to render OpenAPI YAML: {}", e))
    })?;
    Ok(([(header::CONTENT_TYPE, "application/yaml")], yaml))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[test]
    fn test_document_lists_image_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/images/".to_string()));
        assert!(paths.contains(&"/images/{image_id}".to_string()));
    }

    #[test]
    fn test_document_serializes() {
        let json = ApiDoc::openapi().to_pretty_json().unwrap();
        assert!(json.contains("ImageResponse"));
    }

    #[tokio::test]
    async fn test_yaml_export() {
        let response = Router::new()
            .route("/swagger.yaml", get(openapi_yaml))
            .oneshot(Request::get("/swagger.yaml").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/yaml");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("openapi:"));
        assert!(text.contains("/images/{image_id}"));
    }
}
