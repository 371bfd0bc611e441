use super::DraftStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(DraftStatus),
}

impl StatusFilter {
    const ORDER: [StatusFilter; 6] = [
        StatusFilter::All,
        StatusFilter::Only(DraftStatus::Pending),
        StatusFilter::Only(DraftStatus::Generating),
        StatusFilter::Only(DraftStatus::Generated),
        StatusFilter::Only(DraftStatus::Sent),
        StatusFilter::Only(DraftStatus::Failed),
    ];

    pub fn as_param(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(DraftStatus::Pending) => "pending",
            StatusFilter::Only(DraftStatus::Generating) => "generating",
            StatusFilter::Only(DraftStatus::Generated) => "generated",
            StatusFilter::Only(DraftStatus::Sent) => "sent",
            StatusFilter::Only(DraftStatus::Failed) => "failed",
        }
    }

    pub fn from_param(s: &str) -> Option<Self> {
        Self::ORDER
            .into_iter()
            .find(|f| f.as_param().eq_ignore_ascii_case(s))
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All statuses",
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn cycle(&self) -> Self {
        let pos = Self::ORDER.iter().position(|f| f == self).unwrap_or(0);
        Self::ORDER[(pos + 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateRange {
    #[default]
    All,
    Week,
    Month,
}

impl DateRange {
    pub fn as_param(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Week => "week",
            DateRange::Month => "month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::All => "All time",
            DateRange::Week => "Past week",
            DateRange::Month => "Past month",
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            DateRange::All => DateRange::Week,
            DateRange::Week => DateRange::Month,
            DateRange::Month => DateRange::All,
        }
    }
}

/// Everything that determines a listing request. Nothing else is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftListQuery {
    pub page: u32,
    pub status: StatusFilter,
    pub search: String,
    pub date_range: DateRange,
}

impl Default for DraftListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            status: StatusFilter::All,
            search: String::new(),
            date_range: DateRange::All,
        }
    }
}

impl DraftListQuery {
    pub fn has_active_filters(&self) -> bool {
        self.status != StatusFilter::All
            || !self.search.is_empty()
            || self.date_range != DateRange::All
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("status", self.status.as_param().to_string()),
            ("search", self.search.clone()),
            ("dateRange", self.date_range.as_param().to_string()),
        ]
    }
}
