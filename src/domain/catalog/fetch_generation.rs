/// Hands out tickets for in-flight fetches so that only the newest one may
/// land. A response carrying an older ticket is stale and must be dropped.
#[derive(Debug, Default)]
pub struct FetchGeneration {
    current: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchGeneration {
    pub fn next(&mut self) -> FetchTicket {
        self.current += 1;
        FetchTicket(self.current)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.current
    }
}
