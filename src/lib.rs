//! ctxlog - per-context buffered loggers
//!
//! Each concurrent unit of work (a thread, a task) owns its own log instance.
//! Entries are echoed to the console and collected in memory, then written
//! to a timestamped file in the context's folder when the context is
//! disposed. Folders are kept under a file-count cap, and observers can be
//! registered to see every write.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ctxlog::{LogRegistry, Source};
//!
//! struct Fetcher;
//!
//! let registry = Arc::new(LogRegistry::new());
//! let log = registry.handle("worker-1");
//! log.initialize("/tmp/logs", true);
//! log.info(Source::of::<Fetcher>(), "starting");
//! log.debug(Source::of::<Fetcher>(), "detail=42");
//! log.dispose();
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod format;
pub mod instance;
pub mod level;
pub mod observer;
pub mod registry;
pub mod source;

pub use config::LogConfig;
pub use console::{Console, MemoryConsole, StdConsole, Stream};
pub use error::LogError;
pub use instance::{InstanceStatus, LogInstance, RetentionMode, RetentionReport};
pub use level::LogLevel;
pub use observer::{WriteObserver, WriterActions};
pub use registry::{ContextId, LogHandle, LogRegistry};
pub use source::Source;
