use serde::{Deserialize, Serialize};

use super::domain::CaseRecord;

pub const DEFAULT_PAGE_SIZE: usize = 25;
const DEFAULT_SORT_COLUMN: &str = "Case ID";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseFilter {
    /// Case-insensitive substring over Case ID, Name, and Email.
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, record: &CaseRecord) -> bool {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);
        let matches_search = search.map_or(true, |needle| {
            [&record.case_id, &record.name, &record.email]
                .into_iter()
                .any(|cell| cell.to_lowercase().contains(&needle))
        });

        let matches_status = non_empty(&self.status).map_or(true, |status| record.status == status);
        let matches_urgency =
            non_empty(&self.urgency).map_or(true, |urgency| record.urgency == urgency);

        matches_search && matches_status && matches_urgency
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaseStats {
    pub total: usize,
    pub urgent: usize,
    pub pending: usize,
    pub completed: usize,
}

impl CaseStats {
    pub fn tally(cases: &[CaseRecord]) -> Self {
        cases.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            stats.urgent += usize::from(record.is_urgent());
            stats.pending += usize::from(record.is_pending());
            stats.completed += usize::from(record.is_completed());
            stats
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CasePage {
    pub rows: Vec<CaseRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub page_size: usize,
}

impl CasePage {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Solicitor view over the fetched cases: filter, sort, page, and tally.
#[derive(Debug, Clone)]
pub struct CaseDashboard {
    cases: Vec<CaseRecord>,
    filter: CaseFilter,
    visible: Vec<usize>,
    sort: SortState,
    page: usize,
    page_size: usize,
}

impl Default for CaseDashboard {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl CaseDashboard {
    pub fn new(cases: Vec<CaseRecord>) -> Self {
        let mut dashboard = Self {
            cases: Vec::new(),
            filter: CaseFilter::default(),
            visible: Vec::new(),
            sort: SortState {
                column: DEFAULT_SORT_COLUMN.to_string(),
                ascending: true,
            },
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        };
        dashboard.replace_cases(cases);
        dashboard
    }

    /// Swaps in a fresh fetch, keeping the current filter and sort.
    pub fn replace_cases(&mut self, cases: Vec<CaseRecord>) {
        self.cases = cases;
        self.refresh();
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn find(&self, case_id: &str) -> Option<&CaseRecord> {
        self.cases.iter().find(|record| record.case_id == case_id)
    }

    pub fn filter(&self) -> &CaseFilter {
        &self.filter
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    /// Any filter change returns to the first page.
    pub fn apply_filter(&mut self, filter: CaseFilter) {
        self.filter = filter;
        self.refresh();
    }

    /// Re-selecting the active column flips direction; a new column starts
    /// ascending.
    pub fn sort_by(&mut self, column: &str) {
        if self.sort.column == column {
            self.sort.ascending = !self.sort.ascending;
        } else {
            self.sort = SortState {
                column: column.to_string(),
                ascending: true,
            };
        }
        self.resort();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    pub fn total_pages(&self) -> usize {
        self.visible.len().div_ceil(self.page_size).max(1)
    }

    /// Clamped to the available range.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) -> bool {
        if self.page < self.total_pages() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn current_page(&self) -> CasePage {
        let rows = self
            .visible
            .iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .map(|&index| self.cases[index].clone())
            .collect();
        CasePage {
            rows,
            page: self.page,
            total_pages: self.total_pages(),
            total_matches: self.visible.len(),
            page_size: self.page_size,
        }
    }

    /// Counts over every fetched case, ignoring the filter.
    pub fn stats(&self) -> CaseStats {
        CaseStats::tally(&self.cases)
    }

    fn refresh(&mut self) {
        self.visible = self
            .cases
            .iter()
            .enumerate()
            .filter(|(_, record)| self.filter.matches(record))
            .map(|(index, _)| index)
            .collect();
        self.resort();
        self.page = 1;
    }

    fn resort(&mut self) {
        let cases = &self.cases;
        let column = self.sort.column.as_str();
        let ascending = self.sort.ascending;
        self.visible.sort_by(|&a, &b| {
            let ordering = cases[a].column(column).cmp(&cases[b].column(column));
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });
    }
}
