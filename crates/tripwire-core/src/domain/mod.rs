//! Domain model (identifiers, messages, decisions, integration state, errors).

pub mod credentials;
pub mod decision;
pub mod errors;
pub mod ids;
pub mod message;
pub mod state;

pub use credentials::{AccessKeyPair, BucketRegion};
pub use decision::{BuildCondition, TriggerDecision};
pub use errors::{ObjectStoreError, QueueError, RemoteFault, StateError};
pub use ids::{InvalidQueueUrl, MessageId, ProjectName, QueueUrl, ReceiptHandle};
pub use message::{PendingMessage, ReceivedMessage};
pub use state::{IntegrationState, IntegrationStatus};
