//! The file attachment resource.

use reviewkit_types::{ResourceError, Result};

use crate::entity::AttrView;
use crate::resource::ResourceKind;
use crate::schema::{field, Schema};

/// Mapping table for file attachments.
///
/// Only the caption is writable; everything else describes the uploaded
/// file and is server-maintained. File attachments keep the server's
/// `extra_data` object.
pub static SCHEMA: Schema = Schema {
    rsp_namespace: "file_attachment",
    fields: &[
        field("caption").read_write(),
        field("filename").readable(),
        field("downloadURL").json("url").readable(),
        field("fileSize").json("size").readable(),
        field("mimetype").readable(),
        field("thumbnailHTML").json("thumbnail").readable(),
        field("reviewRequestID"),
        field("localSitePrefix"),
    ],
    expansions: &[],
    track_extra_data: true,
};

/// A file attached to a review request.
pub struct FileAttachment;

impl ResourceKind for FileAttachment {
    const NAME: &'static str = "file_attachment";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn collection_url(attrs: &AttrView<'_>) -> Result<String> {
        let review_request_id = attrs.int("reviewRequestID").ok_or_else(|| {
            ResourceError::Url(
                "reviewRequestID must be set to resolve a file attachment URL".to_string(),
            )
        })?;
        let prefix = attrs.str("localSitePrefix").unwrap_or("");
        Ok(format!(
            "{prefix}api/review-requests/{review_request_id}/file-attachments/"
        ))
    }
}
