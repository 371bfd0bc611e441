use std::time::Duration;

use crate::models::{DraftStatus, DraftSummary};

/// Delay between consecutive rows becoming visible after a result lands.
pub const REVEAL_STEP: Duration = Duration::from_millis(40);

pub const SKELETON_ROWS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Nothing exists yet.
    Onboarding,
    /// Filters exclude everything; offer to clear them.
    NoMatches,
}

impl EmptyState {
    pub fn title(&self) -> &'static str {
        match self {
            EmptyState::Onboarding => "No drafts yet",
            EmptyState::NoMatches => "No drafts match your filters",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            EmptyState::Onboarding => {
                "Connect a meeting platform (press i). Drafts appear here after your next recorded meeting ends."
            }
            EmptyState::NoMatches => "Press c to clear filters.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    Skeleton { rows: usize },
    Empty(EmptyState),
    /// All rows are selectable; only the first `visible` are drawn with content.
    Rows { visible: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub body: ListBody,
    pub banner: Option<String>,
}

pub struct ViewInput<'a> {
    pub items: &'a [DraftSummary],
    pub loading: bool,
    pub error: Option<&'a str>,
    pub has_active_filters: bool,
    /// Time since the current items landed; `None` shows every row.
    pub revealed_for: Option<Duration>,
}

pub fn list_view(input: &ViewInput) -> ListView {
    let body = if input.items.is_empty() {
        if input.loading {
            ListBody::Skeleton {
                rows: SKELETON_ROWS,
            }
        } else if input.has_active_filters {
            ListBody::Empty(EmptyState::NoMatches)
        } else {
            ListBody::Empty(EmptyState::Onboarding)
        }
    } else {
        ListBody::Rows {
            visible: visible_rows(input.items.len(), input.revealed_for),
        }
    };

    ListView {
        body,
        banner: input.error.map(|e| format!("Couldn't load drafts: {e} (press r to retry)")),
    }
}

fn visible_rows(len: usize, revealed_for: Option<Duration>) -> usize {
    match revealed_for {
        None => len,
        Some(elapsed) => {
            let steps = elapsed.as_millis() / REVEAL_STEP.as_millis();
            len.min(steps as usize + 1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    Send,
    Delete,
}

impl RowAction {
    pub fn key_hint(&self) -> &'static str {
        match self {
            RowAction::View => "Enter:view",
            RowAction::Edit => "e:edit",
            RowAction::Send => "s:send",
            RowAction::Delete => "d:delete",
        }
    }
}

/// Actions offered for a row in the given status.
pub fn available_actions(status: DraftStatus) -> Vec<RowAction> {
    match status {
        DraftStatus::Generated => vec![
            RowAction::View,
            RowAction::Edit,
            RowAction::Send,
            RowAction::Delete,
        ],
        DraftStatus::Generating => vec![RowAction::View],
        DraftStatus::Pending | DraftStatus::Sent | DraftStatus::Failed => {
            vec![RowAction::View, RowAction::Delete]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: &str) -> DraftSummary {
        DraftSummary {
            id: id.to_string(),
            meeting: None,
            subject: None,
            body: None,
            status: DraftStatus::Generated,
            cost: None,
            input_tokens: None,
            output_tokens: None,
            latency_ms: None,
            sent_to: None,
            sent_at: None,
        }
    }

    fn input(items: &[DraftSummary], loading: bool, filtered: bool) -> ViewInput<'_> {
        ViewInput {
            items,
            loading,
            error: None,
            has_active_filters: filtered,
            revealed_for: None,
        }
    }

    #[test]
    fn test_loading_without_items_is_skeleton_never_empty() {
        for filtered in [false, true] {
            let view = list_view(&input(&[], true, filtered));
            assert_eq!(view.body, ListBody::Skeleton { rows: SKELETON_ROWS });
        }
    }

    #[test]
    fn test_empty_without_filters_is_onboarding() {
        let view = list_view(&input(&[], false, false));
        assert_eq!(view.body, ListBody::Empty(EmptyState::Onboarding));
    }

    #[test]
    fn test_empty_with_filters_offers_clear() {
        let view = list_view(&input(&[], false, true));
        assert_eq!(view.body, ListBody::Empty(EmptyState::NoMatches));
        assert!(EmptyState::NoMatches.hint().contains("clear"));
    }

    #[test]
    fn test_loading_with_items_keeps_rows() {
        let items = vec![draft("a"), draft("b")];
        let view = list_view(&input(&items, true, false));
        assert_eq!(view.body, ListBody::Rows { visible: 2 });
    }

    #[test]
    fn test_error_banner_keeps_last_good_rows() {
        let items = vec![draft("a")];
        let view = list_view(&ViewInput {
            error: Some("HTTP 502: bad gateway"),
            ..input(&items, false, false)
        });
        assert_eq!(view.body, ListBody::Rows { visible: 1 });
        assert!(view.banner.unwrap().contains("HTTP 502"));
    }

    #[test]
    fn test_staggered_reveal() {
        let items: Vec<_> = (0..10).map(|i| draft(&i.to_string())).collect();
        let at = |ms| {
            list_view(&ViewInput {
                revealed_for: Some(Duration::from_millis(ms)),
                ..input(&items, false, false)
            })
            .body
        };

        assert_eq!(at(0), ListBody::Rows { visible: 1 });
        assert_eq!(at(39), ListBody::Rows { visible: 1 });
        assert_eq!(at(120), ListBody::Rows { visible: 4 });
        assert_eq!(at(10_000), ListBody::Rows { visible: 10 });
    }

    #[test]
    fn test_actions_by_status() {
        assert!(available_actions(DraftStatus::Generated).contains(&RowAction::Send));
        assert_eq!(available_actions(DraftStatus::Generating), vec![RowAction::View]);
        assert!(!available_actions(DraftStatus::Sent).contains(&RowAction::Send));
        assert!(available_actions(DraftStatus::Failed).contains(&RowAction::Delete));
    }
}
