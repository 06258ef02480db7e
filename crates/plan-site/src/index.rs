//! Year and month index tree.
//!
//! Two nested ordered maps keyed by year and month. Entries within a month
//! are kept in insertion order and sorted newest first on read.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use plan_vcs::DateKey;

/// A link to one day's page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayEntry {
    pub date: DateKey,
    /// Site-relative link (e.g., `/2024/01/05`).
    pub link: String,
}

impl DayEntry {
    #[must_use]
    pub fn new(date: DateKey) -> Self {
        Self {
            date,
            link: date.link_path(),
        }
    }
}

/// Year → month → days.
#[derive(Clone, Debug, Default)]
pub struct IndexTree {
    years: BTreeMap<i32, BTreeMap<u32, Vec<DayEntry>>>,
}

impl IndexTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a day. Adding the same day twice has no effect.
    pub fn insert(&mut self, date: DateKey) {
        let days = self
            .years
            .entry(date.year())
            .or_default()
            .entry(date.month())
            .or_default();
        if !days.iter().any(|entry| entry.date == date) {
            days.push(DayEntry::new(date));
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Years present, newest first.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().rev().copied()
    }

    /// Months present in `year`, newest first.
    pub fn months(&self, year: i32) -> impl Iterator<Item = u32> + '_ {
        self.years
            .get(&year)
            .into_iter()
            .flat_map(|months| months.keys().rev().copied())
    }

    /// All days in `year`, newest first regardless of month.
    #[must_use]
    pub fn year_entries(&self, year: i32) -> Vec<&DayEntry> {
        let mut entries: Vec<&DayEntry> = self
            .years
            .get(&year)
            .into_iter()
            .flat_map(BTreeMap::values)
            .flatten()
            .collect();
        sort_descending(&mut entries);
        entries
    }

    /// Days in `year`/`month`, newest first.
    #[must_use]
    pub fn month_entries(&self, year: i32, month: u32) -> Vec<&DayEntry> {
        let mut entries: Vec<&DayEntry> = self
            .years
            .get(&year)
            .and_then(|months| months.get(&month))
            .into_iter()
            .flatten()
            .collect();
        sort_descending(&mut entries);
        entries
    }
}

fn sort_descending(entries: &mut [&DayEntry]) {
    entries.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Full month name (`3` → `March`).
///
/// Falls back to the two-digit numeral when `month` is not a calendar month.
#[must_use]
pub fn month_name(month: u32) -> String {
    NaiveDate::from_ymd_opt(2000, month, 1).map_or_else(
        || format!("{month:02}"),
        |date| date.format("%B").to_string(),
    )
}

/// Markdown for a year index page.
#[must_use]
pub fn year_markdown(year: i32, entries: &[&DayEntry]) -> String {
    link_list(&format!("History for {year}"), entries)
}

/// Markdown for a month index page.
#[must_use]
pub fn month_markdown(year: i32, month: u32, entries: &[&DayEntry]) -> String {
    link_list(&format!("History for {} {year}", month_name(month)), entries)
}

fn link_list(heading: &str, entries: &[&DayEntry]) -> String {
    let mut markdown = format!("# {heading}\n\n");
    for entry in entries {
        let _ = writeln!(markdown, "- [{}]({})", entry.date, entry.link);
    }
    markdown
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn tree(dates: &[&str]) -> IndexTree {
        let mut tree = IndexTree::new();
        for d in dates {
            tree.insert(date(d));
        }
        tree
    }

    fn dates(entries: &[&DayEntry]) -> Vec<String> {
        entries.iter().map(|e| e.date.to_string()).collect()
    }

    #[test]
    fn test_entries_sorted_descending_on_read() {
        let tree = tree(&["2024-01-05", "2024-02-01", "2024-01-20"]);

        assert_eq!(
            dates(&tree.year_entries(2024)),
            vec!["2024-02-01", "2024-01-20", "2024-01-05"]
        );
        assert_eq!(
            dates(&tree.month_entries(2024, 1)),
            vec!["2024-01-20", "2024-01-05"]
        );
        assert_eq!(dates(&tree.month_entries(2024, 2)), vec!["2024-02-01"]);
    }

    #[test]
    fn test_years_and_months_descending() {
        let tree = tree(&["2023-11-02", "2024-03-01", "2023-12-25", "2024-01-01"]);

        assert_eq!(tree.years().collect::<Vec<_>>(), vec![2024, 2023]);
        assert_eq!(tree.months(2023).collect::<Vec<_>>(), vec![12, 11]);
        assert_eq!(tree.months(2024).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(tree.months(1999).count(), 0);
    }

    #[test]
    fn test_insert_is_idempotent() {
        let tree = tree(&["2024-01-05", "2024-01-05"]);
        assert_eq!(tree.year_entries(2024).len(), 1);
    }

    #[test]
    fn test_empty_tree() {
        let tree = IndexTree::new();
        assert!(tree.is_empty());
        assert!(tree.year_entries(2024).is_empty());
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(3), "March");
        assert_eq!(month_name(12), "December");
    }

    #[test]
    fn test_month_name_falls_back_to_numeral() {
        assert_eq!(month_name(0), "00");
        assert_eq!(month_name(13), "13");
    }

    #[test]
    fn test_year_markdown() {
        let tree = tree(&["2024-01-05", "2024-02-01"]);
        assert_eq!(
            year_markdown(2024, &tree.year_entries(2024)),
            "# History for 2024\n\n- [2024-02-01](/2024/02/01)\n- [2024-01-05](/2024/01/05)\n"
        );
    }

    #[test]
    fn test_month_markdown() {
        let tree = tree(&["2024-01-05", "2024-01-20"]);
        assert_eq!(
            month_markdown(2024, 1, &tree.month_entries(2024, 1)),
            "# History for January 2024\n\n- [2024-01-20](/2024/01/20)\n- [2024-01-05](/2024/01/05)\n"
        );
    }
}
