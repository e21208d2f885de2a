/// Position of a traversal within its shard
///
/// The cursor only moves forward. Advancing to the next target clears the failure
/// counter and any continuation page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalCursor {
    index: usize,
    failures: u32,
    page_index: usize,
    continuation: Option<String>,
}

impl TraversalCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the current target in the shard
    pub fn index(&self) -> usize {
        self.index
    }

    /// Failed attempts on the current page so far
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Zero-based page of the current target
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// True once every target has been passed
    pub fn is_finished(&self, targets: &[String]) -> bool {
        self.index >= targets.len()
    }

    /// Target the cursor is on
    pub fn target<'a>(&self, targets: &'a [String]) -> Option<&'a str> {
        targets.get(self.index).map(String::as_str)
    }

    /// URL to load next: the continuation page if one is set, else the target itself
    pub fn page_url<'a>(&'a self, targets: &'a [String]) -> Option<&'a str> {
        match self.continuation {
            Some(ref url) => Some(url.as_str()),
            None => self.target(targets),
        }
    }

    /// Counts a failed attempt and returns the new total
    pub fn record_failure(&mut self) -> u32 {
        self.failures += 1;
        self.failures
    }

    pub fn reset_failures(&mut self) {
        self.failures = 0;
    }

    /// Moves to the next page of the same target
    pub fn continue_to(&mut self, url: String) {
        self.page_index += 1;
        self.failures = 0;
        self.continuation = Some(url);
    }

    /// Moves to the next target
    pub fn advance(&mut self) {
        self.index += 1;
        self.failures = 0;
        self.page_index = 0;
        self.continuation = None;
    }
}
