//! Collaborator traits implemented outside `docscrub-core`.

pub mod clock;
pub mod status_store;
pub mod transform;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use status_store::StatusStore;
pub use transform::{TransformError, TransformRequest, Transformer};
