use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-side lifecycle of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Pending,
    Generating,
    Generated,
    Sent,
    Failed,
}

impl DraftStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DraftStatus::Pending => "Pending",
            DraftStatus::Generating => "Generating",
            DraftStatus::Generated => "Generated",
            DraftStatus::Sent => "Sent",
            DraftStatus::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRef {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub host_email: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSummary {
    pub id: String,
    #[serde(default)]
    pub meeting: Option<MeetingRef>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    pub status: DraftStatus,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub input_tokens: Option<u64>,
    #[serde(default)]
    pub output_tokens: Option<u64>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub sent_to: Option<String>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

impl DraftSummary {
    pub fn topic(&self) -> &str {
        self.meeting
            .as_ref()
            .and_then(|m| m.topic.as_deref())
            .unwrap_or("Untitled meeting")
    }

    pub fn platform(&self) -> &str {
        self.meeting
            .as_ref()
            .and_then(|m| m.platform.as_deref())
            .unwrap_or("-")
    }

    pub fn host_email(&self) -> Option<&str> {
        self.meeting.as_ref().and_then(|m| m.host_email.as_deref())
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.meeting.as_ref().and_then(|m| m.start_time)
    }

    pub fn total_tokens(&self) -> Option<u64> {
        match (self.input_tokens, self.output_tokens) {
            (None, None) => None,
            (input, output) => Some(input.unwrap_or(0) + output.unwrap_or(0)),
        }
    }
}

/// Aggregates over the current filter scope, computed by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftStats {
    pub total: u64,
    pub generated: u64,
    pub sent: u64,
    pub failed: u64,
    pub avg_cost: f64,
    pub avg_latency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftListResult {
    #[serde(default)]
    pub drafts: Vec<DraftSummary>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub stats: DraftStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_deserializes() {
        let json = r#"{
            "drafts": [{
                "id": "d1",
                "meeting": {
                    "topic": "Quarterly review",
                    "platform": "zoom",
                    "hostEmail": "host@example.com",
                    "startTime": "2026-10-01T15:00:00Z"
                },
                "subject": "Follow-up: Quarterly review",
                "status": "generated",
                "cost": 0.0123,
                "inputTokens": 1200,
                "outputTokens": 300,
                "latencyMs": 2400
            }],
            "total": 41,
            "totalPages": 3,
            "stats": {"total": 41, "generated": 20, "sent": 18, "failed": 3, "avgCost": 0.011, "avgLatency": 2100.5}
        }"#;

        let result: DraftListResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.total, 41);
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.stats.failed, 3);
        assert_eq!(result.stats.avg_latency, 2100.5);

        let draft = &result.drafts[0];
        assert_eq!(draft.status, DraftStatus::Generated);
        assert_eq!(draft.topic(), "Quarterly review");
        assert_eq!(draft.host_email(), Some("host@example.com"));
        assert_eq!(draft.total_tokens(), Some(1500));
        assert!(draft.sent_at.is_none());
    }

    #[test]
    fn test_missing_meeting_and_stats_fields() {
        let json = r#"{"drafts":[{"id":"d2","status":"pending"}],"total":1,"totalPages":1,"stats":{"total":1}}"#;
        let result: DraftListResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.drafts[0].topic(), "Untitled meeting");
        assert_eq!(result.drafts[0].platform(), "-");
        assert_eq!(result.drafts[0].total_tokens(), None);
        assert_eq!(result.stats.sent, 0);
        assert_eq!(result.stats.avg_cost, 0.0);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let json = r#"{"id":"d3","status":"archived"}"#;
        assert!(serde_json::from_str::<DraftSummary>(json).is_err());
    }
}
