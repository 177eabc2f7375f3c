//! The diff comment resource: a comment on a range of lines in a filediff.

use reviewkit_types::{AttrValue, ResourceError, Result};
use serde_json::{Map, Value};

use crate::entity::AttrView;
use crate::resource::{Resource, ResourceKind};
use crate::resources::{comment, filediff};
use crate::schema::{field, Expansion, Schema};
use crate::validation::ValidationRule;

/// Violation message for a negative begin line.
pub const BEGIN_LINE_GTE_0: &str = "beginLineNum must be >= 0";
/// Violation message for a negative end line.
pub const END_LINE_GTE_0: &str = "endLineNum must be >= 0";
/// Violation message for an inverted line range.
pub const BEGIN_LTE_END: &str = "beginLineNum must be <= endLineNum";
/// Violation message for a missing filediff linkage.
pub const INVALID_FILEDIFF_ID: &str = "fileDiffID must be a valid ID";

/// Mapping table for diff comments.
///
/// The line range travels as `first_line` plus a derived `num_lines`;
/// `text_type` carries the rich-text flag. The filediff linkage ids are
/// sent only while the comment is unloaded. `reviewRequestID`, `reviewID`,
/// and `localSitePrefix` are local-only hierarchy attributes.
pub static SCHEMA: Schema = Schema {
    rsp_namespace: "diff_comment",
    fields: &[
        field("text")
            .read_write()
            .with_default(|| AttrValue::Str(String::new())),
        field("richText")
            .json("text_type")
            .serialize_with(comment::rich_text_to_wire)
            .deserialize_with(comment::rich_text_from_wire)
            .with_default(|| AttrValue::Bool(false)),
        field("forceTextType")
            .json("force_text_type")
            .serialize_with(comment::skip_when_null)
            .with_default(|| AttrValue::Null),
        field("includeTextTypes")
            .json("include_text_types")
            .serialize_with(comment::skip_when_null)
            .with_default(|| AttrValue::Null),
        field("issueOpened")
            .json("issue_opened")
            .read_write()
            .with_default(|| AttrValue::Bool(true)),
        field("issueStatus").json("issue_status").read_write(),
        field("beginLineNum").json("first_line").read_write(),
        field("endLineNum")
            .json("num_lines")
            .serialize_with(num_lines_to_wire)
            .deserialize_with(end_line_from_wire),
        field("fileDiffID")
            .json("filediff_id")
            .serialize_with(comment::id_unless_loaded),
        field("interFileDiffID")
            .json("interfilediff_id")
            .serialize_with(comment::id_unless_loaded)
            .with_default(|| AttrValue::Null),
        field("reviewRequestID"),
        field("reviewID"),
        field("localSitePrefix"),
    ],
    expansions: &[
        Expansion {
            json_key: "filediff",
            attr: "fileDiff",
            child: &filediff::SCHEMA,
        },
        Expansion {
            json_key: "interfilediff",
            attr: "interFileDiff",
            child: &filediff::SCHEMA,
        },
    ],
    track_extra_data: true,
};

/// Validation chain: base comment rules first, then line-range and
/// filediff-linkage rules.
static VALIDATORS: &[ValidationRule] = &[
    comment::parent_object_set,
    comment::parent_object_public,
    begin_line_non_negative,
    end_line_non_negative,
    line_range_ordered,
    filediff_id_set,
];

/// A comment on a line range within a filediff.
pub struct DiffComment;

impl ResourceKind for DiffComment {
    const NAME: &'static str = "diff_comment";

    fn schema() -> &'static Schema {
        &SCHEMA
    }

    fn validators() -> &'static [ValidationRule] {
        VALIDATORS
    }

    fn collection_url(attrs: &AttrView<'_>) -> Result<String> {
        let review_request_id = attrs.int("reviewRequestID").ok_or_else(|| {
            ResourceError::Url("reviewRequestID must be set to resolve a diff comment URL".to_string())
        })?;
        let review_id = attrs.int("reviewID").ok_or_else(|| {
            ResourceError::Url("reviewID must be set to resolve a diff comment URL".to_string())
        })?;
        let prefix = attrs.str("localSitePrefix").unwrap_or("");
        Ok(format!(
            "{prefix}api/review-requests/{review_request_id}/reviews/{review_id}/diff-comments/"
        ))
    }
}

impl Resource<DiffComment> {
    /// The number of lines the comment spans, once the range is set.
    pub fn num_lines(&self) -> Option<i64> {
        let view = self.entity().view();
        Some(view.int("endLineNum")? - view.int("beginLineNum")? + 1)
    }
}

fn begin_line_non_negative(view: &AttrView<'_>) -> Option<String> {
    match view.int("beginLineNum") {
        Some(n) if n < 0 => Some(BEGIN_LINE_GTE_0.to_string()),
        _ => None,
    }
}

fn end_line_non_negative(view: &AttrView<'_>) -> Option<String> {
    match view.int("endLineNum") {
        Some(n) if n < 0 => Some(END_LINE_GTE_0.to_string()),
        _ => None,
    }
}

fn line_range_ordered(view: &AttrView<'_>) -> Option<String> {
    match (view.int("beginLineNum"), view.int("endLineNum")) {
        (Some(begin), Some(end)) if begin > end => Some(BEGIN_LTE_END.to_string()),
        _ => None,
    }
}

fn filediff_id_set(view: &AttrView<'_>) -> Option<String> {
    if view.int("fileDiffID").is_none() {
        Some(INVALID_FILEDIFF_ID.to_string())
    } else {
        None
    }
}

/// Outbound line count, derived from the line range.
fn num_lines_to_wire(value: &AttrValue, view: &AttrView<'_>) -> Result<Option<Value>> {
    let end = value.as_int().ok_or_else(|| {
        ResourceError::Validation("endLineNum must be an integer".to_string())
    })?;
    let begin = view.int("beginLineNum").ok_or_else(|| {
        ResourceError::Validation("beginLineNum must be set to serialize a line range".to_string())
    })?;
    Ok(Some(Value::from(end - begin + 1)))
}

/// Inbound end line, derived from `first_line` and `num_lines`.
fn end_line_from_wire(value: &Value, payload: &Map<String, Value>) -> Result<AttrValue> {
    let num_lines = value.as_i64().ok_or_else(|| {
        ResourceError::Deserialization(format!("num_lines is not an integer: {value}"))
    })?;
    let first_line = payload.get("first_line").and_then(Value::as_i64).ok_or_else(|| {
        ResourceError::Deserialization("num_lines arrived without first_line".to_string())
    })?;
    Ok(AttrValue::Int(first_line + num_lines - 1))
}
