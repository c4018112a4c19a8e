//! Registry API records, as exchanged with the backend through the proxy.

pub mod audit;
pub mod event;
pub mod object;

pub use audit::{AuditQuery, AuditRecord};
pub use event::{CreatedResponse, EventRecord, EventRequest, NotifyConfig};
pub use object::{ListObjectsResponse, ObjectEnvelope, ObjectMetadata, ObjectSummary};
