pub mod client;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod types;

pub use client::{JobApi, RemoteJobClient, DEFAULT_REQUEST_TIMEOUT};
pub use controller::{ExecutionController, PollPolicy};
pub use credentials::Credentials;
pub use error::{ErrorKind, QueryError, Result};
pub use types::{ExecutionRequest, Job, JobStatus, Parameters, ResultSet};
