//! Service layer for session lifecycle logic
//!
//! Services orchestrate between the web surface and the repository layer:
//! lifecycle transitions, tag attachment, the reconciliation sweep and the
//! background sweeper that drives it.

pub mod lost_stream_sweeper;
pub mod session_probe;
pub mod session_reconciler;
pub mod stream_service;
pub mod tag_associator;

pub use lost_stream_sweeper::LostStreamSweeper;
pub use session_probe::{IngestProbe, ProbeOutcome, SessionProbe};
pub use session_reconciler::{SessionReconciler, SweepReport};
pub use stream_service::StreamService;
pub use tag_associator::TagAssociator;
