pub mod format;
pub mod model;
pub mod poller;
pub mod source;

// Re-export the essential types
pub use model::{normalize_strikes, RawStrike, Snapshot, StrikeEvent, StrikeId};
pub use poller::{FeedPoller, FeedStatus, FetchTicket, PollOutcome};
pub use source::{HttpStrikeSource, StrikeSource};
