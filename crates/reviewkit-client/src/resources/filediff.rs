//! The per-file diff resource.
//!
//! Filediffs are read-only children: they are never fetched directly by
//! this layer, only expanded out of a parent comment's payload, so the
//! module exports just the mapping table.

use crate::schema::{field, Schema};

/// Mapping table for filediffs.
pub static SCHEMA: Schema = Schema {
    rsp_namespace: "filediff",
    fields: &[
        field("sourceFilename").json("source_file").readable(),
        field("destFilename").json("dest_file").readable(),
        field("sourceRevision").json("source_revision").readable(),
    ],
    expansions: &[],
    track_extra_data: false,
};
