//! Stack labels.
//!
//! | mode | label                                        |
//! |------|----------------------------------------------|
//! | 0    | none, stacks keep whatever name they have     |
//! | 1    | the grouping key (`mail.example.com`)         |
//! | 2    | first label of the base domain, capitalised   |

use super::domain::UrlFragments;
use super::host::StackNames;
use super::state::StackId;
use crate::config::NamingMode;

/// Computes the label for a stack, or `None` when naming is disabled.
#[must_use]
pub fn stack_label(mode: NamingMode, key: &str, fragments: &UrlFragments) -> Option<String> {
    match mode {
        NamingMode::Disabled => None,
        NamingMode::Hostname => Some(key.to_string()),
        NamingMode::BaseDomain => {
            let base = fragments.base_domain();
            let name = base.split('.').next().unwrap_or(base);
            Some(capitalize(name))
        }
    }
}

/// Records `label` for `stack_id`, keeping every other entry.
///
/// Returns false when the stored label was already the same.
pub fn merge_label(names: &mut StackNames, stack_id: &StackId, label: &str) -> bool {
    if names.get(stack_id).is_some_and(|current| current == label) {
        return false;
    }
    names.insert(stack_id.clone(), label.to_string());
    true
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}
