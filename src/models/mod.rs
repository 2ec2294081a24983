pub mod destination;
pub mod loaders;
pub mod request;

pub use destination::{DestinationDescriptor, DestinationRegistry};
pub use loaders::{load_job, load_registry, UploadJob};
pub use request::{BatchResult, UploadOutcome, UploadRequest};
