use crate::core::{CheckResult, Status};

/// Checks that share a category tag, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckGroup<'a> {
    pub category: &'a str,
    pub checks: Vec<&'a CheckResult>,
}

/// Groups checks by category. A group sits where its category first appears;
/// nothing is sorted or deduplicated.
pub fn group_by_category(checks: &[CheckResult]) -> Vec<CheckGroup<'_>> {
    let mut groups: Vec<CheckGroup<'_>> = Vec::new();
    for check in checks {
        match groups.iter_mut().find(|g| g.category == check.category) {
            Some(group) => group.checks.push(check),
            None => groups.push(CheckGroup {
                category: check.category.as_str(),
                checks: vec![check],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub success: usize,
    pub warning: usize,
    pub danger: usize,
    pub info: usize,
}

impl StatusCounts {
    pub const fn total(&self) -> usize {
        self.success + self.warning + self.danger + self.info
    }
}

/// Distribution over the four known statuses; unknown ones are not counted.
pub fn status_counts(checks: &[CheckResult]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for check in checks {
        match check.status {
            Status::Success => counts.success += 1,
            Status::Warning => counts.warning += 1,
            Status::Danger => counts.danger += 1,
            Status::Info => counts.info += 1,
            Status::Other(_) => {}
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, category: &str, status: Status) -> CheckResult {
        CheckResult::new(name, category, status, 0.0, "")
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let checks = vec![
            check("hsts", "headers", Status::Success),
            check("secure flag", "cookies", Status::Warning),
            check("csp", "headers", Status::Danger),
        ];
        let groups = group_by_category(&checks);

        let order: Vec<&str> = groups.iter().map(|g| g.category).collect();
        assert_eq!(order, vec!["headers", "cookies"]);
        let headers: Vec<&str> = groups[0].checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(headers, vec!["hsts", "csp"]);
    }

    #[test]
    fn order_is_not_alphabetical() {
        let checks = vec![
            check("a", "server", Status::Info),
            check("b", "content", Status::Info),
            check("c", "connection", Status::Info),
        ];
        let order: Vec<&str> = group_by_category(&checks)
            .iter()
            .map(|g| g.category)
            .collect();
        assert_eq!(order, vec!["server", "content", "connection"]);
    }

    #[test]
    fn duplicates_and_unknown_tags_pass_through() {
        let checks = vec![
            check("same", "quantum", Status::Info),
            check("same", "quantum", Status::Info),
        ];
        let groups = group_by_category(&checks);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, "quantum");
        assert_eq!(groups[0].checks.len(), 2);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }

    #[test]
    fn status_counts_skip_unknown_statuses() {
        let checks = vec![
            check("a", "x", Status::Success),
            check("b", "x", Status::Success),
            check("c", "x", Status::Danger),
            check("d", "x", Status::Other("weird".to_string())),
        ];
        let counts = status_counts(&checks);
        assert_eq!(
            counts,
            StatusCounts {
                success: 2,
                warning: 0,
                danger: 1,
                info: 0
            }
        );
        assert_eq!(counts.total(), 3);
    }
}
