// Core modules
pub mod cli;
pub mod config;
pub mod git;
pub mod infrastructure;

pub use git::{
    EventLog, IdentifierGenerator, MergeEngine, PrFlow, PrStep, RemoteRepository, Repository,
    SyncSimulator,
};
pub use infrastructure::error::SimError;
