//! Keyword tag suggestions.

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;

use quill_core::{extract_tags, ErrorBody, TagsResponse};

pub const TAGS_FAILED_MESSAGE: &str = "Failed to generate tags";

#[derive(Debug, Deserialize)]
pub struct TagsForm {
    #[serde(default)]
    pub content: String,
}

/// `POST /tags` with form field `content`.
///
/// Public: the extractor is pure and reads no stored notes.
pub async fn generate_tags(form: Result<Form<TagsForm>, FormRejection>) -> Response {
    match form {
        Ok(Form(form)) => {
            let tags = extract_tags(&form.content);
            tracing::debug!(
                op = "extract_tags",
                content_len = form.content.len(),
                tag_count = tags.len(),
                "Generated tags"
            );
            Json(TagsResponse { tags }).into_response()
        }
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Tag request rejected");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: TAGS_FAILED_MESSAGE.to_string(),
                }),
            )
                .into_response()
        }
    }
}
