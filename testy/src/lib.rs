//! Helpers for writing tests.
//!
//! The centerpiece is [`wait::wait_or_die`], which waits for a condition over shared state to
//! become true (or for a failure condition to show up first) without blocking a thread.
//! The rest are small conveniences: JSON shortcuts, randomization, tables, timers, fixtures with
//! LIFO clean-up, scoped environment variables, temporary directories and test logging.

pub mod env;
pub mod error;
pub mod fixture;
pub mod json;
pub mod observability;
pub mod random;
pub mod table;
pub mod temp_dir;
pub mod timing;
pub mod wait;

pub use error::{Error, ErrorDetails};
pub use wait::{Predicate, WaitOutcome, wait_or_die};

/// Re-exports for `use testy::prelude::*;`
pub mod prelude {
    pub use crate::env::EnvironmentVariable;
    pub use crate::fixture::{DeferredCallback, Fixture};
    pub use crate::json::{JsonExt, indent_json, json_clone};
    pub use crate::predicate;
    pub use crate::random::{RandomOrder, random_picks_from};
    pub use crate::table::ToTable;
    pub use crate::temp_dir::TemporaryTestDirectory;
    pub use crate::timing::{PeriodicCallback, TimerScope};
    pub use crate::wait::{Predicate, WaitConfig, WaitOutcome, wait_or_die};
}
