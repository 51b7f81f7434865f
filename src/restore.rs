/// Session restoration: re-open every saved tab through the host API.

use crate::registry::{CreateTabRequest, create_tab};
use crate::tab_data::SavedTab;

/// One saved tab the host refused to re-create.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreFailure {
    pub url: String,
    pub error: String,
}

/// Summary of a whole-session restore. Failures are collected per tab,
/// never short-circuited: one bad tab must not stop the rest. There is no
/// rollback; partially restored sessions are left as-is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestoreReport {
    pub attempted: usize,
    pub failures: Vec<RestoreFailure>,
}

impl RestoreReport {
    pub fn restored(&self) -> usize {
        self.attempted - self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record(&mut self, url: &str, outcome: Result<(), String>) {
        self.attempted += 1;
        if let Err(error) = outcome {
            self.failures.push(RestoreFailure {
                url: url.to_string(),
                error,
            });
        }
    }
}

/// Build the host create requests for a session's tabs, in saved order.
/// Restored tabs carry their pinned flag and never steal focus.
pub fn restore_requests(tabs: &[SavedTab]) -> Vec<CreateTabRequest> {
    tabs.iter()
        .map(|tab| CreateTabRequest {
            url: tab.url.clone(),
            pinned: tab.pinned,
            active: false,
        })
        .collect()
}

/// Re-create every tab of a saved session. Each create is independent;
/// failures are logged and reported in the returned summary. The session
/// record itself is never touched.
pub async fn restore_session(tabs: &[SavedTab]) -> RestoreReport {
    let mut report = RestoreReport::default();
    for request in restore_requests(tabs) {
        let outcome = create_tab(&request).await;
        report.record(&request.url, outcome);
    }
    for failure in &report.failures {
        log::error!("Restore failed for {}: {}", failure.url, failure.error);
    }
    report
}
