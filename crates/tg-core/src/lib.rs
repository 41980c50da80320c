pub mod error;
pub use error::CoreError;
pub mod schema;
pub mod state;
pub use state::CoreState;
pub mod registry;
pub use registry::Registry;
pub mod authorize;
pub mod admission;
pub use admission::{AdmissionEngine, AdmissionRequest};
pub mod lifecycle;
pub mod terminate;
pub use terminate::TerminationBus;
