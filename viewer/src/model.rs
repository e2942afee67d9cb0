use std::path::PathBuf;

use tm_screen_common::{sort_by_score, summarize, ReportRow, RowFilter, ScoreOrder, TargetSummary};

/// 行の識別子。表示の並びや絞り込みが変わっても同じ行を指す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKey {
    pub target_name: String,
    pub stem: String,
    pub serial_number: String,
}

impl RowKey {
    pub fn of(row: &ReportRow) -> Self {
        Self {
            target_name: row.target_name.clone(),
            stem: row.stem.clone(),
            serial_number: row.serial_number.clone(),
        }
    }

    fn matches(&self, row: &ReportRow) -> bool {
        self.target_name == row.target_name
            && self.stem == row.stem
            && self.serial_number == row.serial_number
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub rows: Vec<ReportRow>,
    pub source_path: Option<PathBuf>,
    pub filter: RowFilter,
    pub order: ScoreOrder,
    pub selected: Option<RowKey>,
}

impl AppState {
    pub fn load(&mut self, rows: Vec<ReportRow>, source: PathBuf) {
        self.rows = rows;
        self.source_path = Some(source);
        self.selected = None;
    }

    /// 絞り込みを通った行を、選んだスコア順で
    pub fn visible_rows(&self) -> Vec<&ReportRow> {
        let mut rows = self.filter.apply(&self.rows);
        sort_by_score(&mut rows, self.order);
        rows
    }

    pub fn select(&mut self, row: &ReportRow) {
        self.selected = Some(RowKey::of(row));
    }

    pub fn is_selected(&self, row: &ReportRow) -> bool {
        self.selected.as_ref().is_some_and(|key| key.matches(row))
    }

    /// 選択中の行。絞り込みで隠れている間は `None`
    pub fn selected_row(&self) -> Option<&ReportRow> {
        let key = self.selected.as_ref()?;
        self.rows
            .iter()
            .find(|row| key.matches(row) && self.filter.matches(row))
    }

    pub fn summaries(&self) -> Vec<TargetSummary> {
        summarize(std::iter::empty::<&str>(), &self.rows)
    }

    pub fn toggle_order(&mut self) {
        self.order = match self.order {
            ScoreOrder::Descending => ScoreOrder::Ascending,
            ScoreOrder::Ascending => ScoreOrder::Descending,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tm_screen_common::{MarkStatus, Verdict};

    fn row(target: &str, score: f64, serial: &str, verdict: Verdict) -> ReportRow {
        ReportRow {
            target_name: target.into(),
            stem: "STEM".into(),
            matched_mark: target.into(),
            score,
            status: MarkStatus::Live,
            serial_number: serial.into(),
            verdict,
            registration_number: String::new(),
            inferred_classes: String::new(),
            class_match: false,
        }
    }

    #[test]
    fn test_visible_rows_filter_and_order() {
        let mut state = AppState::default();
        state.load(
            vec![
                row("LEAPWISE", 80.0, "2", Verdict::Risk),
                row("LEAPWISE", 100.0, "1", Verdict::Blocked),
                row("SPRYNOVA", 77.0, "3", Verdict::Risk),
            ],
            PathBuf::from("report.csv"),
        );

        let serials: Vec<&str> = state.visible_rows().iter().map(|r| r.serial_number.as_str()).collect();
        assert_eq!(serials, vec!["1", "2", "3"]);

        state.filter.verdict = Some(Verdict::Risk);
        state.toggle_order();
        let serials: Vec<&str> = state.visible_rows().iter().map(|r| r.serial_number.as_str()).collect();
        assert_eq!(serials, vec!["3", "2"]);
    }

    /// 並び順や絞り込みを変えても選択は同じ行に付いたまま
    #[test]
    fn test_selection_follows_row_across_view_changes() {
        let mut state = AppState::default();
        state.load(
            vec![
                row("LEAPWISE", 80.0, "2", Verdict::Risk),
                row("LEAPWISE", 100.0, "1", Verdict::Blocked),
                row("SPRYNOVA", 77.0, "3", Verdict::Risk),
            ],
            PathBuf::from("report.csv"),
        );

        let second = state.visible_rows()[1].clone();
        state.select(&second);
        assert_eq!(state.selected_row().map(|r| r.serial_number.as_str()), Some("2"));

        state.toggle_order();
        assert_eq!(state.visible_rows()[1].serial_number, "2");
        state.filter.verdict = Some(Verdict::Risk);
        let visible = state.visible_rows();
        assert!(visible.iter().any(|r| state.is_selected(r)));
        assert_eq!(state.selected_row().map(|r| r.serial_number.as_str()), Some("2"));
        assert!(!state.is_selected(visible[0]));

        state.filter.min_score = 90.0;
        assert!(state.selected_row().is_none());
    }

    #[test]
    fn test_load_clears_selection() {
        let mut state = AppState::default();
        let rows = vec![row("LEAPWISE", 80.0, "2", Verdict::Risk)];
        state.load(rows.clone(), PathBuf::from("a.csv"));
        state.select(&rows[0]);
        state.load(rows, PathBuf::from("b.csv"));
        assert!(state.selected_row().is_none());
    }

    #[test]
    fn test_summaries_follow_rows() {
        let mut state = AppState::default();
        state.load(vec![row("LEAPWISE", 80.0, "2", Verdict::Risk)], PathBuf::from("r.csv"));
        let summaries = state.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].verdict, Verdict::Risk);
    }
}
