//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    CategoryDto, ErrorResponse, SummarizeRequest, SummarizeResponse, SummaryDto, SummaryMeta,
};

#[derive(OpenApi)]
#[openapi(
    paths(super::summarize::summarize),
    info(
        title = "TinyText API",
        version = "0.1.0",
        description = "Reads tiny printed text from a photo and returns a templated summary.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Summarize", description = "Summarize - Image to per-domain category summary"),
    ),
    components(
        schemas(
            SummarizeRequest,
            SummarizeResponse,
            SummaryDto,
            CategoryDto,
            SummaryMeta,
            ErrorResponse,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_summarize_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/summarize"));
    }
}
