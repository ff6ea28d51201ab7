use super::domain::{CompletionSummary, Requirement, UploadedArtifact};

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '/' | '(' | ')')
}

/// Lowercased tokens of the label longer than two characters.
pub fn requirement_tokens(label: &str) -> Vec<String> {
    label
        .to_lowercase()
        .split(is_separator)
        .filter(|token| token.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Satisfied when any file name contains any token as a substring.
pub fn label_matches<'a, I>(label: &str, file_names: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens = requirement_tokens(label);
    if tokens.is_empty() {
        return false;
    }
    file_names.into_iter().any(|name| {
        let name = name.to_lowercase();
        tokens.iter().any(|token| name.contains(token.as_str()))
    })
}

pub fn is_satisfied(requirement: &Requirement, artifacts: &[UploadedArtifact]) -> bool {
    label_matches(
        requirement.label,
        artifacts.iter().map(|artifact| artifact.file_name.as_str()),
    )
}

pub fn completion_summary(
    requirements: &[Requirement],
    artifacts: &[UploadedArtifact],
) -> CompletionSummary {
    CompletionSummary {
        satisfied: requirements
            .iter()
            .filter(|requirement| is_satisfied(requirement, artifacts))
            .count(),
        total: requirements.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_split_on_whitespace_slashes_and_parentheses() {
        assert_eq!(
            requirement_tokens("Accommodation Proof (tenancy agreement/mortgage)"),
            vec!["accommodation", "proof", "tenancy", "agreement", "mortgage"]
        );
        assert_eq!(requirement_tokens("P60/Payslips"), vec!["p60", "payslips"]);
        assert_eq!(requirement_tokens("HR ID"), Vec::<String>::new());
    }

    #[test]
    fn passport_scan_satisfies_valid_passport() {
        assert!(label_matches("Valid Passport", ["my_passport_scan.pdf"]));
    }

    #[test]
    fn photo_does_not_satisfy_cas() {
        assert!(!label_matches(
            "CAS (Confirmation of Acceptance for Studies)",
            ["photo.jpg"]
        ));
    }

    #[test]
    fn matching_is_case_insensitive_and_substring_based() {
        assert!(label_matches("Council Tax Bills", ["TAXBILL_2024.PDF"]));
        assert!(!label_matches("Council Tax Bills", Vec::<&str>::new()));
    }

    #[test]
    fn labels_without_long_tokens_are_never_satisfied() {
        assert!(!label_matches("HR ID", ["hr_id_card.pdf"]));
    }
}
