//! Selection and reconciliation state
//!
//! Every view holds a [`ViewState`] keyed by the selected production line.
//! Fetch results carry the line they were requested for and are applied
//! only while that line is still selected, so a slow response for a line
//! the user already left can never overwrite newer data.

use crate::models::{LineId, ProductionLine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, RwLock, RwLockWriteGuard};

/// Key used by views whose data does not depend on the selected line
pub const GLOBAL_SCOPE: LineId = 0;

/// Whether a fetch result was applied to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Discarded { selected: LineId, response: LineId },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewState<T> {
    pub selected_line: LineId,
    pub last_applied_line: Option<LineId>,
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> ViewState<T> {
    /// Empty state waiting for its first fetch
    pub fn new(initial: LineId) -> Self {
        Self {
            selected_line: initial,
            last_applied_line: None,
            data: None,
            loading: true,
            error: None,
            updated_at: None,
        }
    }

    /// Switch to another line; previous data stays visible while loading
    ///
    /// Returns `false` when the line was already selected.
    pub fn select(&mut self, line: LineId) -> bool {
        if line == self.selected_line {
            return false;
        }
        self.selected_line = line;
        self.loading = true;
        true
    }

    fn guard(&self, line: LineId) -> ApplyOutcome {
        if line == self.selected_line {
            ApplyOutcome::Applied
        } else {
            ApplyOutcome::Discarded {
                selected: self.selected_line,
                response: line,
            }
        }
    }

    pub fn apply_success(&mut self, line: LineId, payload: T) -> ApplyOutcome {
        let outcome = self.guard(line);
        if outcome.is_applied() {
            self.data = Some(payload);
            self.error = None;
            self.loading = false;
            self.last_applied_line = Some(line);
            self.updated_at = Some(Utc::now());
        }
        outcome
    }

    /// Record a failed fetch, keeping the last good data
    pub fn apply_failure(&mut self, line: LineId, error: impl ToString) -> ApplyOutcome {
        let outcome = self.guard(line);
        if outcome.is_applied() {
            self.error = Some(error.to_string());
            self.loading = false;
        }
        outcome
    }
}

/// A view state shared between its poller and readers
#[derive(Debug)]
pub struct SharedView<T> {
    inner: Arc<RwLock<ViewState<T>>>,
}

impl<T> Clone for SharedView<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> SharedView<T> {
    pub fn new(initial: LineId) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ViewState::new(initial))),
        }
    }

    pub async fn snapshot(&self) -> ViewState<T> {
        self.inner.read().await.clone()
    }

    /// Exclusive access for a multi-step update
    pub async fn write(&self) -> RwLockWriteGuard<'_, ViewState<T>> {
        self.inner.write().await
    }

    pub async fn select(&self, line: LineId) -> bool {
        self.inner.write().await.select(line)
    }

    pub async fn apply_success(&self, line: LineId, payload: T) -> ApplyOutcome {
        self.inner.write().await.apply_success(line, payload)
    }

    pub async fn apply_failure(&self, line: LineId, error: impl ToString) -> ApplyOutcome {
        self.inner.write().await.apply_failure(line, error)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("production line {0} is not in the current line list")]
    UnknownLine(LineId),

    #[error("production line list has not been loaded yet")]
    LinesNotLoaded,
}

/// The user's line selection, broadcast to every line-scoped poller
#[derive(Debug)]
pub struct Selection {
    tx: watch::Sender<Option<LineId>>,
    lines: std::sync::RwLock<Vec<ProductionLine>>,
}

impl Selection {
    pub fn new(initial: Option<LineId>) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            tx,
            lines: std::sync::RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<LineId>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<LineId> {
        *self.tx.borrow()
    }

    pub fn lines(&self) -> Vec<ProductionLine> {
        match self.lines.read() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the known line list
    ///
    /// Falls back to the first line when nothing is selected or the selected
    /// line disappeared from the list. Returns the line selected this way.
    pub fn set_lines(&self, lines: Vec<ProductionLine>) -> Option<LineId> {
        let ids: Vec<LineId> = lines.iter().map(|l| l.id).collect();
        match self.lines.write() {
            Ok(mut guard) => *guard = lines,
            Err(poisoned) => *poisoned.into_inner() = lines,
        }

        let first = *ids.first()?;
        let changed = self.tx.send_if_modified(|current| match current {
            Some(line) if ids.contains(line) => false,
            _ => {
                *current = Some(first);
                true
            }
        });
        changed.then_some(first)
    }

    /// Select a line from the known list
    ///
    /// Returns `Ok(false)` when the line was already selected; subscribers
    /// are only notified on an actual change.
    pub fn select(&self, line: LineId) -> Result<bool, SelectionError> {
        let lines = self.lines();
        if lines.is_empty() {
            return Err(SelectionError::LinesNotLoaded);
        }
        if !lines.iter().any(|l| l.id == line) {
            return Err(SelectionError::UnknownLine(line));
        }

        Ok(self.tx.send_if_modified(|current| {
            if *current == Some(line) {
                false
            } else {
                *current = Some(line);
                true
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineStatus;

    fn line(id: LineId) -> ProductionLine {
        ProductionLine {
            id,
            name: format!("Production Line {}", id),
            product: "Paracetamol 500mg".to_string(),
            status: LineStatus::Running,
            batches_range: "1-250".to_string(),
            total_batches: 250,
        }
    }

    #[test]
    fn test_select_keeps_data_and_sets_loading() {
        let mut state = ViewState::new(1);
        assert!(state.apply_success(1, "line-1").is_applied());
        assert!(!state.loading);

        assert!(state.select(2));
        assert_eq!(state.selected_line, 2);
        assert!(state.loading);
        assert_eq!(state.data, Some("line-1"));
        assert_eq!(state.last_applied_line, Some(1));
    }

    #[test]
    fn test_reselecting_same_line_is_noop() {
        let mut state: ViewState<()> = ViewState::new(1);
        state.apply_success(1, ());
        assert!(!state.select(1));
        assert!(!state.loading);
    }

    #[test]
    fn test_stale_success_is_discarded() {
        let mut state = ViewState::new(1);
        state.select(2);

        let outcome = state.apply_success(1, "late line-1 data");
        assert_eq!(
            outcome,
            ApplyOutcome::Discarded {
                selected: 2,
                response: 1
            }
        );
        assert_eq!(state.data, None);
        assert!(state.loading);

        assert!(state.apply_success(2, "line-2 data").is_applied());
        assert_eq!(state.data, Some("line-2 data"));
        assert_eq!(state.last_applied_line, Some(2));
    }

    #[test]
    fn test_failure_keeps_last_good_data() {
        let mut state = ViewState::new(1);
        state.apply_success(1, 42);

        assert!(state.apply_failure(1, "HTTP 500").is_applied());
        assert_eq!(state.data, Some(42));
        assert_eq!(state.error.as_deref(), Some("HTTP 500"));
        assert!(!state.loading);

        state.apply_success(1, 43);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut state: ViewState<u8> = ViewState::new(1);
        state.select(2);
        assert!(!state.apply_failure(1, "timeout").is_applied());
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_data_always_matches_last_applied_line() {
        // Interleave selections and responses in every order over three lines
        let events: Vec<(bool, LineId)> = vec![
            (true, 2),
            (false, 1),
            (false, 2),
            (true, 3),
            (false, 2),
            (true, 1),
            (false, 3),
            (false, 1),
            (true, 2),
            (false, 2),
        ];
        let mut state = ViewState::new(1);

        for (is_select, line) in events {
            if is_select {
                state.select(line);
            } else {
                state.apply_success(line, line);
            }
            if let Some(data) = state.data {
                assert_eq!(Some(data), state.last_applied_line);
            }
        }
        assert_eq!(state.data, Some(2));
    }

    #[tokio::test]
    async fn test_shared_view_snapshot() {
        let view = SharedView::new(GLOBAL_SCOPE);
        view.apply_success(GLOBAL_SCOPE, vec![1, 2, 3]).await;

        let snapshot = view.snapshot().await;
        assert_eq!(snapshot.data, Some(vec![1, 2, 3]));
        assert!(snapshot.updated_at.is_some());
    }

    #[test]
    fn test_selection_rejects_unknown_lines() {
        let selection = Selection::new(None);
        assert_eq!(selection.select(1), Err(SelectionError::LinesNotLoaded));

        assert_eq!(selection.set_lines(vec![line(1), line(2)]), Some(1));
        assert_eq!(selection.current(), Some(1));
        assert_eq!(selection.select(9), Err(SelectionError::UnknownLine(9)));
        assert_eq!(selection.current(), Some(1));
    }

    #[test]
    fn test_vanished_selection_falls_back_to_first_line() {
        let selection = Selection::new(Some(7));
        assert_eq!(selection.set_lines(vec![line(2), line(3)]), Some(2));
        assert_eq!(selection.set_lines(vec![line(3), line(2)]), None);
        assert_eq!(selection.current(), Some(2));
    }

    #[tokio::test]
    async fn test_selection_notifies_only_on_change() {
        let selection = Selection::new(Some(1));
        selection.set_lines(vec![line(1), line(2)]);
        let mut rx = selection.subscribe();
        rx.borrow_and_update();

        assert_eq!(selection.select(1), Ok(false));
        assert!(!rx.has_changed().unwrap());

        assert_eq!(selection.select(2), Ok(true));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(2));
    }
}
