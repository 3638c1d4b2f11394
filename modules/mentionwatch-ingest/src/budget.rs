use std::time::{Duration, Instant};

/// Per-invocation fetch budget: a hard wall-clock deadline plus a page
/// ceiling. Checked before every fetch so the pipeline stops pulling new
/// pages in time to flush writes and persist the cursor.
pub struct RunBudget {
    deadline: Instant,
    /// Page ceiling. 0 = unlimited.
    max_pages: u32,
    pages_fetched: u32,
}

impl RunBudget {
    pub fn new(wall_clock: Duration, max_pages: u32) -> Self {
        Self {
            deadline: Instant::now() + wall_clock,
            max_pages,
            pages_fetched: 0,
        }
    }

    pub fn record_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Why fetching must stop, if it must.
    pub fn exhausted(&self) -> Option<&'static str> {
        if self.max_pages > 0 && self.pages_fetched >= self.max_pages {
            return Some("page budget");
        }
        if Instant::now() >= self.deadline {
            return Some("wall-clock budget");
        }
        None
    }
}
