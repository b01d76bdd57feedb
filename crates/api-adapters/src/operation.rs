//! The eight board endpoints, and the text each one answers with on failure.

use prometheus_client::encoding::EncodeLabelValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue)]
pub enum Operation {
    CreateThread,
    ListThreads,
    ReportThread,
    DeleteThread,
    CreateReply,
    GetThread,
    ReportReply,
    DeleteReply,
}

impl Operation {
    /// Body sent when a required field is absent.
    pub fn missing_message(self, field: &str) -> &'static str {
        if field == "board" {
            return "Missing board parameter";
        }
        match self {
            Operation::CreateThread | Operation::CreateReply => "Missing parameter!",
            Operation::ReportThread | Operation::GetThread => "Missing thread_id",
            Operation::ListThreads => "Missing board parameter",
            Operation::DeleteThread | Operation::ReportReply | Operation::DeleteReply => {
                "Missing parameter"
            }
        }
    }

    /// Body sent when the store or hasher fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::CreateThread => "Error saving new thread to db",
            Operation::ListThreads => "Error retrieving threads",
            Operation::ReportThread => "Error reporting thread",
            Operation::DeleteThread => "Error deleting thread",
            Operation::CreateReply => "Error saving new reply to db",
            Operation::GetThread => "Error retrieving thread",
            Operation::ReportReply => "Error reporting reply",
            Operation::DeleteReply => "Error deleting reply",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_board_wins_over_endpoint_text() {
        assert_eq!(
            Operation::CreateThread.missing_message("board"),
            "Missing board parameter"
        );
        assert_eq!(
            Operation::CreateThread.missing_message("text"),
            "Missing parameter!"
        );
        assert_eq!(
            Operation::ReportThread.missing_message("thread_id"),
            "Missing thread_id"
        );
    }
}
