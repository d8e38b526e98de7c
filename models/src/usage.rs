use serde::{Deserialize, Serialize};

/// Enhancement counters kept alongside the credential.
///
/// `last_date` is a calendar date (`YYYY-MM-DD`) supplied by the caller;
/// this type never reads the clock itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageStats {
    pub total: u64,
    pub today: u64,
    pub last_date: String,
}

impl UsageStats {
    /// Count one successful enhancement performed on `date`.
    ///
    /// `today` restarts from zero when `date` differs from the stored date.
    pub fn record_enhancement(&mut self, date: &str) {
        if self.last_date != date {
            self.today = 0;
            self.last_date = date.to_string();
        }

        self.total = self.total.saturating_add(1);
        self.today = self.today.saturating_add(1);
    }

    /// Today's count as seen on `date`, without rolling the stored value.
    pub fn today_count(&self, date: &str) -> u64 {
        if self.last_date == date { self.today } else { 0 }
    }
}
