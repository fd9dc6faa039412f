/// Identifies one fetch issued by a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The collection was replaced with fresh data
    Replaced,
    /// The fetch failed; previous data is kept
    Failed(String),
    /// Superseded or arrived after teardown
    Discarded,
}

/// In-flight bookkeeping. Only the latest ticket is applied, and nothing is
/// applied after `dispose`.
#[derive(Debug, Default)]
pub(crate) struct FetchState {
    generation: u64,
    loading: bool,
    settled: bool,
    disposed: bool,
    error: Option<String>,
}

impl FetchState {
    pub(crate) fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    /// Whether a result for `ticket` may be applied. Loading is cleared for
    /// every accepted ticket, whatever the result.
    pub(crate) fn accept(&mut self, ticket: FetchTicket) -> bool {
        if self.disposed || ticket.0 != self.generation {
            return false;
        }
        self.loading = false;
        self.settled = true;
        true
    }

    pub(crate) fn succeed(&mut self) {
        self.error = None;
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.error = Some(message);
    }

    pub(crate) fn dispose(&mut self) {
        self.disposed = true;
        self.loading = false;
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading
    }

    /// At least one fetch has completed, successfully or not
    pub(crate) fn has_settled(&self) -> bool {
        self.settled
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
