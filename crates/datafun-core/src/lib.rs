//! datafun-core — Decision logic for the datafun dashboard.
//! Synthetic data, filtering, the guessing game, table statistics and the
//! per-session reducer that ties them to the five pages.

pub mod contact;
pub mod dataset;
pub mod filter;
pub mod game;
pub mod page;
pub mod session;
pub mod stats;
pub mod view;
pub mod views;

pub use dataset::{generate, Dataset, DatasetCache};
pub use filter::{filter, FilterCriteria};
pub use game::{GuessGame, GuessOutcome};
pub use page::{route, Page};
pub use session::{Event, Rendered, SessionState};
