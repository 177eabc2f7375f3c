//! Concrete resource kinds.
//!
//! Each kind module declares its mapping table as `'static` data plus a
//! `ResourceKind` implementation; `comment` holds the behavior shared by
//! every comment-like kind.

pub mod api_token;
pub mod comment;
pub mod diff_comment;
pub mod file_attachment;
pub mod filediff;

pub use api_token::ApiToken;
pub use diff_comment::DiffComment;
pub use file_attachment::FileAttachment;

#[cfg(test)]
mod tests {
    use crate::schema::Schema;

    #[test]
    fn test_all_schemas_satisfy_invariants() {
        let schemas: &[(&str, &Schema)] = &[
            ("api_token", &super::api_token::SCHEMA),
            ("diff_comment", &super::diff_comment::SCHEMA),
            ("filediff", &super::filediff::SCHEMA),
            ("file_attachment", &super::file_attachment::SCHEMA),
        ];

        for (name, schema) in schemas {
            if let Err(violation) = schema.check_invariants() {
                panic!("schema {name}: {violation}");
            }
        }
    }
}
