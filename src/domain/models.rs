use serde::{Deserialize, Serialize};

/// A profile eligible for a swipe decision.
///
/// Candidates are owned by the server. The client never edits one, it only
/// removes it from the queue once a decision has been made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
}

impl Candidate {
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// "29, female" style subtitle; `None` when neither field is known.
    pub fn subtitle(&self) -> Option<String> {
        match (self.age, self.gender.as_deref()) {
            (Some(age), Some(gender)) => Some(format!("{age}, {gender}")),
            (Some(age), None) => Some(age.to_string()),
            (None, Some(gender)) => Some(gender.to_string()),
            (None, None) => None,
        }
    }
}

/// Direction a card left the deck in.
///
/// Only horizontal swipes carry a decision; vertical ones are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SwipeDirection {
    pub fn decision(self) -> Option<FeedDecision> {
        match self {
            SwipeDirection::Left => Some(FeedDecision::Ignored),
            SwipeDirection::Right => Some(FeedDecision::Interested),
            SwipeDirection::Up | SwipeDirection::Down => None,
        }
    }
}

/// Decision sent to the server for a feed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedDecision {
    Ignored,
    Interested,
}

impl FeedDecision {
    /// Path segment used by the send endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            FeedDecision::Ignored => "ignored",
            FeedDecision::Interested => "interested",
        }
    }

    /// The gesture a button press for this decision replays.
    pub fn direction(self) -> SwipeDirection {
        match self {
            FeedDecision::Ignored => SwipeDirection::Left,
            FeedDecision::Interested => SwipeDirection::Right,
        }
    }
}

/// Outcome chosen when reviewing a received connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewDecision {
    Accepted,
    Rejected,
}

impl ReviewDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewDecision::Accepted => "accepted",
            ReviewDecision::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Ignored,
    Interested,
}

/// The part of the sender's profile shipped with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSender {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl RequestSender {
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// A connection request received by the current user.
///
/// Received requests are always pending when fetched. Reviewing one removes
/// it from the visible page through a refetch, its status is never edited
/// locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fromUserId")]
    pub from_user: RequestSender,
    #[serde(default)]
    pub status: RequestStatus,
}

/// One server-paginated slice of the received requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPage {
    pub items: Vec<ConnectionRequest>,
    pub total_items: u32,
    pub current_page: u32,
    pub total_pages: u32,
}

impl Default for RequestPage {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl RequestPage {
    /// Builds a page from server metadata. Page numbers are 1-based, so zeros
    /// are read as 1; nothing else is adjusted.
    pub fn new(items: Vec<ConnectionRequest>, total_items: u32, current_page: u32, total_pages: u32) -> Self {
        Self {
            items,
            total_items,
            current_page: current_page.max(1),
            total_pages: total_pages.max(1),
        }
    }

    /// True when the server answered for a page that no longer exists, e.g.
    /// after the last item of the last page was reviewed.
    pub fn is_past_end(&self) -> bool {
        self.current_page > self.total_pages || (self.items.is_empty() && self.current_page > 1)
    }
}

/// `GET /user/feed` body.
#[derive(Debug, Deserialize)]
pub struct FeedEnvelope {
    #[serde(default)]
    pub users: Vec<Candidate>,
}

/// `GET /requests/requests` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestsEnvelope {
    #[serde(default)]
    pub requests: Vec<ConnectionRequest>,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl From<RequestsEnvelope> for RequestPage {
    fn from(envelope: RequestsEnvelope) -> Self {
        RequestPage::new(
            envelope.requests,
            envelope.total,
            envelope.current_page,
            envelope.total_pages,
        )
    }
}

/// `GET /user/users/connections` body.
#[derive(Debug, Deserialize)]
pub struct ConnectionsEnvelope {
    #[serde(default)]
    pub connections: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_server_json() {
        let json = r#"{"_id":"a1","firstName":"Ada","lastName":"Lovelace","age":36,"gender":"female","photoUrl":"http://x/a.png"}"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.id, "a1");
        assert_eq!(candidate.display_name(), "Ada Lovelace");
        assert_eq!(candidate.subtitle().as_deref(), Some("36, female"));
        assert_eq!(candidate.photo_url.as_deref(), Some("http://x/a.png"));
        assert!(candidate.about.is_none());
    }

    #[test]
    fn test_candidate_optional_fields_missing() {
        let candidate: Candidate = serde_json::from_str(r#"{"_id":"b","firstName":"Bo"}"#).unwrap();
        assert_eq!(candidate.display_name(), "Bo");
        assert_eq!(candidate.subtitle(), None);
    }

    #[test]
    fn test_swipe_direction_decisions() {
        assert_eq!(SwipeDirection::Left.decision(), Some(FeedDecision::Ignored));
        assert_eq!(SwipeDirection::Right.decision(), Some(FeedDecision::Interested));
        assert_eq!(SwipeDirection::Up.decision(), None);
        assert_eq!(SwipeDirection::Down.decision(), None);
        assert_eq!(FeedDecision::Interested.direction(), SwipeDirection::Right);
        assert_eq!(FeedDecision::Ignored.direction(), SwipeDirection::Left);
    }

    #[test]
    fn test_requests_envelope_into_page() {
        let json = r#"{
            "requests": [
                {"_id": "r1", "fromUserId": {"_id": "u1", "firstName": "Cy", "lastName": "Young"}, "status": "pending"}
            ],
            "total": 6,
            "currentPage": 2,
            "totalPages": 2
        }"#;
        let envelope: RequestsEnvelope = serde_json::from_str(json).unwrap();
        let page = RequestPage::from(envelope);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].from_user.display_name(), "Cy Young");
        assert_eq!(page.items[0].status, RequestStatus::Pending);
        assert_eq!(page.total_items, 6);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_request_page_keeps_server_metadata() {
        let empty = RequestPage::new(Vec::new(), 0, 0, 0);
        assert_eq!(empty.current_page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.is_past_end());

        let past_end = RequestPage::new(Vec::new(), 5, 2, 1);
        assert_eq!(past_end.current_page, 2);
        assert_eq!(past_end.total_pages, 1);
        assert!(past_end.is_past_end());

        let drained = RequestPage::new(Vec::new(), 5, 2, 2);
        assert!(drained.is_past_end());
    }
}
