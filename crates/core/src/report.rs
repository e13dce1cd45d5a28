use std::fmt::Write as _;

use serde::Serialize;

use crate::model::{Category, TaskRecord};

/// Hours credited to each scheduled slot.
const HOURS_PER_TASK: f64 = 1.0;

/// Aggregate view of the week used by the analytics prompts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    pub total: usize,
    pub important: usize,
    pub urgent: usize,
    pub important_and_urgent: usize,
    /// Task counts per category, in [`Category::ALL`] order.
    pub by_category: Vec<(Category, usize)>,
}

impl WeeklyReport {
    pub fn from_records(records: &[TaskRecord]) -> Self {
        let mut by_category: Vec<(Category, usize)> =
            Category::ALL.iter().map(|category| (*category, 0)).collect();
        for record in records {
            if let Some(slot) = by_category
                .iter_mut()
                .find(|(category, _)| *category == record.category)
            {
                slot.1 += 1;
            }
        }

        Self {
            total: records.len(),
            important: records.iter().filter(|r| r.is_important).count(),
            urgent: records.iter().filter(|r| r.is_urgent).count(),
            important_and_urgent: records
                .iter()
                .filter(|r| r.is_important && r.is_urgent)
                .count(),
            by_category,
        }
    }

    pub fn total_hours(&self) -> f64 {
        self.by_category
            .iter()
            .map(|(_, count)| *count as f64 * HOURS_PER_TASK)
            .sum()
    }

    pub fn hours_per_category(&self) -> Vec<(Category, f64)> {
        self.by_category
            .iter()
            .map(|(category, count)| (*category, *count as f64 * HOURS_PER_TASK))
            .collect()
    }

    /// Multi-line summary shown to the user and sent as chat context.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total tasks/events: {}", self.total);
        let _ = writeln!(out, "Important: {}", self.important);
        let _ = writeln!(out, "Urgent: {}", self.urgent);
        let _ = writeln!(out, "Both important & urgent: {}", self.important_and_urgent);
        let _ = writeln!(out);
        let _ = writeln!(out, "Estimated total hours this week: {}h", self.total_hours());
        let _ = writeln!(out);
        let _ = writeln!(out, "By category:");
        for (category, count) in &self.by_category {
            let _ = writeln!(out, "  • {}: {} ({}h)", category, count, count);
        }
        out
    }

    /// Hours-per-category prompt, largest allocation first.
    pub fn hours_prompt(&self) -> String {
        let mut hours = self.hours_per_category();
        hours.sort_by(|a, b| b.1.total_cmp(&a.1));
        let lines: Vec<String> = hours
            .iter()
            .map(|(category, h)| format!("- {}: {:.1}h", category, h))
            .collect();
        format!(
            "Here is how my time was allocated this week (in hours):\n{}\n\n\
             Can you suggest how I might reallocate my time to improve productivity, \
             reduce burnout, or balance my schedule better?",
            lines.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Weekday;
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<TaskRecord> {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let loaded: TaskRecord = serde_json::from_str(
            r#"{"Title":"Dentist","Day":"Friday","Time":"15:00:00","Category":"Health"}"#,
        )
        .unwrap();
        vec![
            TaskRecord::new(Weekday::Monday, at(9), Category::Work, "Standup").with_flags(true, true),
            TaskRecord::new(Weekday::Monday, at(10), Category::Work, "Deep work").with_flags(true, false),
            TaskRecord::new(Weekday::Tuesday, at(18), Category::Study, "Course"),
            TaskRecord::new(Weekday::Sunday, at(8), Category::Activity, "Run").with_flags(false, true),
            loaded,
        ]
    }

    #[test]
    fn counts_flags_and_categories() {
        let report = WeeklyReport::from_records(&sample());
        assert_eq!(report.total, 5);
        assert_eq!(report.important, 2);
        assert_eq!(report.urgent, 2);
        assert_eq!(report.important_and_urgent, 1);
        assert_eq!(
            report.by_category,
            vec![
                (Category::Work, 2),
                (Category::Study, 1),
                (Category::Personal, 1),
                (Category::Activity, 1),
            ]
        );
        assert_eq!(report.total_hours(), 5.0);
    }

    #[test]
    fn render_lists_every_category() {
        let text = WeeklyReport::from_records(&sample()).render();
        assert!(text.starts_with("Total tasks/events: 5\n"));
        assert!(text.contains("Estimated total hours this week: 5h"));
        assert!(text.contains("  • Work: 2 (2h)"));
        assert!(text.contains("  • Activity: 1 (1h)"));
    }

    #[test]
    fn hours_prompt_orders_by_allocation() {
        let prompt = WeeklyReport::from_records(&sample()).hours_prompt();
        let work = prompt.find("- Work: 2.0h").unwrap();
        let study = prompt.find("- Study: 1.0h").unwrap();
        assert!(work < study);
        assert!(prompt.ends_with("balance my schedule better?"));
    }
}
