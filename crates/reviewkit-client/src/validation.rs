//! Validation chains.
//!
//! Each resource kind carries an ordered slice of rules, base-kind rules
//! first. Validation is checked before every mutating network operation;
//! the first violated rule rejects the operation locally and no request is
//! ever issued.

use crate::entity::AttrView;

/// One validation rule: returns the violation message, or `None` to pass.
pub type ValidationRule = fn(&AttrView<'_>) -> Option<String>;

/// Run a rule chain against a candidate attribute view, returning the
/// first violation in chain order.
pub fn run_chain(rules: &[ValidationRule], view: &AttrView<'_>) -> Option<String> {
    rules.iter().find_map(|rule| rule(view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::schema::{field, Schema};

    static SCHEMA: Schema = Schema {
        rsp_namespace: "widget",
        fields: &[field("count").read_write()],
        expansions: &[],
        track_extra_data: false,
    };

    fn count_set(view: &AttrView<'_>) -> Option<String> {
        if view.int("count").is_none() {
            Some("count must be set".to_string())
        } else {
            None
        }
    }

    fn count_positive(view: &AttrView<'_>) -> Option<String> {
        match view.int("count") {
            Some(n) if n < 0 => Some("count must be >= 0".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_first_violation_wins() {
        let entity = Entity::new(&SCHEMA);
        let rules: &[ValidationRule] = &[count_set, count_positive];

        assert_eq!(
            run_chain(rules, &entity.view()),
            Some("count must be set".to_string())
        );
    }

    #[test]
    fn test_passes_when_all_rules_pass() {
        let mut entity = Entity::new(&SCHEMA);
        entity.set("count", 3i64).unwrap();

        let rules: &[ValidationRule] = &[count_set, count_positive];
        assert_eq!(run_chain(rules, &entity.view()), None);
    }
}
