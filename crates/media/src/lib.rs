//! # pathe-media
//!
//! Inbound media pipeline:
//!
//! - [`classifier`]: picks the relevant attachment of a message, checks its content type against the
//!   allow-list and resolves a retrieval handle ([`MediaDescriptor`]).
//! - [`aggregator`]: buffers descriptors per album and, once no sibling has arrived for the quiescence
//!   window, downloads them and hands one [`ConversationTurn`] to a [`TurnSink`].
//! - [`scheduler`]: keyed, cancellable single-shot timers the aggregator runs on.
//!
//! The transport is reached only through [`MediaFetcher`].

pub mod aggregator;
pub mod classifier;
pub mod descriptor;
pub mod error;
pub mod scheduler;

pub use aggregator::{
    DispatchOutcome, MediaGroupAggregator, PendingGroup, Submission, TurnSink,
    DEFAULT_QUIESCENCE_WINDOW,
};
pub use classifier::{
    is_supported_content_type, Classification, MediaClassifier, DEFAULT_CONTENT_TYPE,
    SUPPORTED_CONTENT_TYPES, UNDECLARED_CONTENT_TYPE,
};
pub use descriptor::{FileHandle, MediaDescriptor, MediaFetcher};
pub use error::MediaError;
pub use scheduler::{Job, Scheduler, TokioScheduler};
pub use pathe_core::{resolve_caption, ConversationTurn, TurnAttachment};
