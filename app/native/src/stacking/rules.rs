//! Host rule matching for stacking eligibility.
//!
//! This module decides whether a tab's host takes part in automatic stacking,
//! based on the `includes` and `excludes` rule lists from the configuration.
//!
//! # Rule Matching
//!
//! A host is eligible when the include list is empty or one include rule
//! matches, and no exclude rule matches. Exclusion always wins.
//!
//! # Examples
//!
//! ```text
//! // includes = [], excludes = ["chat.example.com"]
//! // mail.example.com -> eligible
//! // chat.example.com -> not eligible
//!
//! // includes = [{ pattern: "example\\.com$" }], excludes = []
//! // docs.example.com -> eligible
//! // news.ycombinator.com -> not eligible
//! ```

use crate::config::{HostRule, StackingConfig};

/// Checks if any rule in the list matches the host.
#[must_use]
pub fn any_rule_matches(rules: &[HostRule], host: &str) -> bool {
    rules.iter().any(|rule| rule.matches(host))
}

/// Checks if a host is eligible for automatic stacking.
#[must_use]
pub fn is_host_eligible(config: &StackingConfig, host: &str) -> bool {
    let included = config.includes.is_empty() || any_rule_matches(&config.includes, host);
    included && !any_rule_matches(&config.excludes, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(includes: Vec<HostRule>, excludes: Vec<HostRule>) -> StackingConfig {
        StackingConfig { includes, excludes, ..Default::default() }
    }

    // ========================================================================
    // Single rule tests
    // ========================================================================

    #[test]
    fn test_exact_rule_matches_whole_host() {
        let rules = [HostRule::exact("www.example.com")];
        assert!(any_rule_matches(&rules, "www.example.com"));
        assert!(!any_rule_matches(&rules, "example.com"));
        assert!(!any_rule_matches(&rules, "WWW.example.com"));
    }

    #[test]
    fn test_pattern_rule() {
        let rules = [HostRule::pattern(r"^(.+\.)?example\.net$").unwrap()];
        assert!(any_rule_matches(&rules, "example.net"));
        assert!(any_rule_matches(&rules, "cdn.assets.example.net"));
        assert!(!any_rule_matches(&rules, "example.org"));
    }

    #[test]
    fn test_empty_rule_list_matches_nothing() {
        assert!(!any_rule_matches(&[], "example.com"));
    }

    // ========================================================================
    // Eligibility tests
    // ========================================================================

    #[test]
    fn test_empty_lists_allow_everything() {
        let config = make_config(vec![], vec![]);
        assert!(is_host_eligible(&config, "example.com"));
        assert!(is_host_eligible(&config, "localhost"));
    }

    #[test]
    fn test_exclude_rule_blocks_host() {
        let config = make_config(vec![], vec![HostRule::exact("chat.example.com")]);
        assert!(!is_host_eligible(&config, "chat.example.com"));
        assert!(is_host_eligible(&config, "mail.example.com"));
    }

    #[test]
    fn test_include_rules_restrict_hosts() {
        let config = make_config(vec![HostRule::pattern(r"example\.com$").unwrap()], vec![]);
        assert!(is_host_eligible(&config, "docs.example.com"));
        assert!(!is_host_eligible(&config, "news.ycombinator.com"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let config = make_config(
            vec![HostRule::pattern(r"example\.com$").unwrap()],
            vec![HostRule::exact("chat.example.com")],
        );
        assert!(!is_host_eligible(&config, "chat.example.com"));
        assert!(is_host_eligible(&config, "example.com"));
    }

    #[test]
    fn test_single_label_host_rules() {
        let config = make_config(vec![HostRule::exact("intranet")], vec![]);
        assert!(is_host_eligible(&config, "intranet"));
        assert!(!is_host_eligible(&config, "intranet.example.com"));
    }
}
