pub mod event_log;
pub mod flow;
pub mod hash;
pub mod merge;
pub mod repository;
pub mod sync;
pub mod templates;

pub use event_log::{EventLog, LineKind};
pub use flow::{FlowSnapshot, PrFlow, PrStep};
pub use hash::{CommitId, IdentifierGenerator};
pub use merge::MergeEngine;
pub use repository::{Branch, Commit, MergeRecord, Repository, RepositorySnapshot};
pub use sync::{
    CommitSequence, RemoteRepository, SyncSimulator, SyncSnapshot, SyncStatus, Transfer,
    TransferDirection,
};
