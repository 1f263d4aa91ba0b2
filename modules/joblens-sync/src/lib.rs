pub mod debounce;
pub mod driver;
pub mod errors;
pub mod fetch;
pub mod filters;
pub mod list;
pub mod mutate;
pub mod query;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use debounce::Debouncer;
pub use driver::spawn_filter_driver;
pub use errors::ErrorSurface;
pub use fetch::FetchOrchestrator;
pub use filters::{FilterState, FilterWatcher};
pub use list::{JobList, Phase};
pub use mutate::OptimisticMutator;
pub use query::build_query;
pub use traits::JobApi;
