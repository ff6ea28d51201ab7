//! Static feed of recent UK immigration rule changes, newest first.

use chrono::NaiveDate;
use serde::Serialize;

use super::documents::VisaRoute;

/// How many updates the summary panel shows.
pub const RECENT_RULE_UPDATES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleUpdate {
    /// ISO `YYYY-MM-DD`.
    pub published: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub affected_routes: &'static [&'static str],
    pub impact: &'static str,
}

impl RuleUpdate {
    pub fn published_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.published, "%Y-%m-%d").ok()
    }

    /// Long en-GB form, e.g. "4 April 2025".
    pub fn published_label(&self) -> String {
        self.published_on()
            .map(|date| date.format("%-d %B %Y").to_string())
            .unwrap_or_else(|| self.published.to_string())
    }

    pub fn affects(&self, route: VisaRoute) -> bool {
        self.affected_routes.contains(&route.label())
    }
}

// Affected routes are free text; some (Parent Visa, Health and Care Worker)
// have no intake route of their own.
const RULE_UPDATES: &[RuleUpdate] = &[
    RuleUpdate {
        published: "2025-04-04",
        title: "Skilled Worker Salary Threshold Increase",
        description: "Minimum salary increased from £26,200 to £38,700 for most roles",
        affected_routes: &["Skilled Worker", "Health and Care Worker"],
        impact: "Existing visa holders unaffected; new applicants must meet higher threshold",
    },
    RuleUpdate {
        published: "2025-03-15",
        title: "ETA Requirement Expansion",
        description: "Electronic Travel Authorization now required for all non-visa nationals",
        affected_routes: &["Visit Visa"],
        impact: "Visitors from visa-exempt countries must obtain ETA before travel",
    },
    RuleUpdate {
        published: "2025-02-01",
        title: "Family Visa Financial Requirement",
        description: "Minimum income requirement confirmed at £29,000",
        affected_routes: &["Spouse Visa", "Parent Visa", "Partner Visa"],
        impact: "Applies to all new applications; savings can supplement income",
    },
    RuleUpdate {
        published: "2025-01-10",
        title: "Student Work Hour Restrictions",
        description: "Term-time work limit remains 20 hours/week; vacation work unlimited",
        affected_routes: &["Student Visa"],
        impact: "Breach can lead to visa curtailment; employers must verify",
    },
];

pub fn rule_updates() -> &'static [RuleUpdate] {
    RULE_UPDATES
}

pub fn recent_rule_updates(limit: usize) -> &'static [RuleUpdate] {
    &RULE_UPDATES[..limit.min(RULE_UPDATES.len())]
}

pub fn rules_affecting(route: VisaRoute) -> Vec<&'static RuleUpdate> {
    RULE_UPDATES
        .iter()
        .filter(|update| update.affects(route))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_is_newest_first_with_valid_dates() {
        let dates: Vec<NaiveDate> = rule_updates()
            .iter()
            .map(|update| update.published_on().expect("valid date"))
            .collect();
        assert!(dates.windows(2).all(|pair| pair[0] > pair[1]));
        assert_eq!(rule_updates()[0].published_label(), "4 April 2025");
        assert_eq!(rule_updates()[3].published_label(), "10 January 2025");
    }

    #[test]
    fn recent_updates_are_capped() {
        assert_eq!(recent_rule_updates(RECENT_RULE_UPDATES).len(), 3);
        assert_eq!(
            recent_rule_updates(RECENT_RULE_UPDATES)[2].title,
            "Family Visa Financial Requirement"
        );
        assert_eq!(recent_rule_updates(10).len(), rule_updates().len());
        assert!(recent_rule_updates(0).is_empty());
    }

    #[test]
    fn route_lookup_matches_affected_labels() {
        let spouse = rules_affecting(VisaRoute::Spouse);
        assert_eq!(spouse.len(), 1);
        assert!(spouse[0].description.contains("£29,000"));

        let skilled = rules_affecting(VisaRoute::SkilledWorker);
        assert_eq!(skilled[0].title, "Skilled Worker Salary Threshold Increase");

        assert_eq!(rules_affecting(VisaRoute::Visit).len(), 1);
        assert!(rules_affecting(VisaRoute::Euss).is_empty());
    }
}
