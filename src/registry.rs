//! Instance registry and logging facade
//!
//! Maps each context to its private [`LogInstance`], creating instances on
//! first use. Context identity is an explicit [`ContextId`] value rather than
//! the calling thread, so the same registry works for threads and for async
//! tasks that hop between threads.
//!
//! Lock order is always map, then instance. Log calls release the map before
//! locking the instance, and observers run after the instance lock is gone,
//! so an observer may itself log.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use uuid::Uuid;

use crate::config::LogConfig;
use crate::console::{Console, StdConsole};
use crate::error::LogError;
use crate::instance::{InstanceStatus, LogInstance, PendingDeletions, RetentionMode};
use crate::level::LogLevel;
use crate::observer::{WriteObserver, WriterActions};
use crate::source::Source;

/// Identifier of a concurrent unit of work that owns one log instance
///
/// Also names the context's subfolder under the base log folder. Distinct
/// ids always map to distinct folders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId {
    id: String,
    /// Derived from an unnamed thread's id, never equal to a named context
    unnamed_thread: bool,
}

impl ContextId {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unnamed_thread: false,
        }
    }

    /// Identify the calling thread by name, or `thread-<n>` if unnamed
    pub fn current_thread() -> Self {
        let thread = std::thread::current();
        match thread.name() {
            Some(name) => Self::new(name),
            None => {
                let id = format!("{:?}", thread.id());
                let digits: String = id.chars().filter(char::is_ascii_digit).collect();
                Self {
                    id: format!("thread-{}", digits),
                    unnamed_thread: true,
                }
            }
        }
    }

    /// A fresh id that no other context uses
    pub fn anonymous() -> Self {
        Self::new(format!("ctx-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// Check if the id was derived from an unnamed thread
    pub fn is_unnamed_thread(&self) -> bool {
        self.unnamed_thread
    }

    /// Subfolder name, percent-encoded so that no two ids share one
    ///
    /// Unnamed threads get a `%` prefix, which encoding never produces.
    pub fn folder_name(&self) -> String {
        if self.unnamed_thread {
            return format!("%{}", self.id);
        }

        match self.id.as_str() {
            "" => "%".to_string(),
            "." => "%2E".to_string(),
            ".." => "%2E%2E".to_string(),
            id => urlencoding::encode(id).into_owned(),
        }
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for ContextId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ContextId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

type SharedInstance = Arc<Mutex<LogInstance>>;

/// Routes per-context log calls to their instances
///
/// Instances are built, and their folders prepared, without holding the
/// map lock. Dropping the registry runs [`LogRegistry::shutdown`].
pub struct LogRegistry {
    /// Live instances, at most one per context
    instances: Mutex<HashMap<ContextId, SharedInstance>>,
    /// Settings for instances created from now on
    defaults: RwLock<LogConfig>,
    observers: WriterActions,
    console: Arc<dyn Console>,
    /// Entries queued by deferred retention
    pending: PendingDeletions,
}

impl LogRegistry {
    /// Create a registry with default settings echoing to stdout/stderr
    pub fn new() -> Self {
        Self::with_config(LogConfig::default())
    }

    pub fn with_config(config: LogConfig) -> Self {
        Self::with_console(config, Arc::new(StdConsole))
    }

    /// Create a registry echoing to a custom console
    pub fn with_console(config: LogConfig, console: Arc<dyn Console>) -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
            defaults: RwLock::new(config),
            observers: WriterActions::new(),
            console,
            pending: PendingDeletions::new(),
        }
    }

    /// Get a handle bound to `context`
    pub fn handle(self: &Arc<Self>, context: impl Into<ContextId>) -> LogHandle {
        LogHandle {
            registry: Arc::clone(self),
            context: context.into(),
        }
    }

    /// Record `folder` and `debug` as defaults and start `context`'s instance
    ///
    /// If `context` already has a live instance nothing else happens and
    /// `false` is returned; the new defaults apply to later instances only.
    /// When two callers race to start the same context, one instance wins
    /// and the other is dropped unflushed.
    pub fn initialize(&self, context: &ContextId, folder: impl Into<PathBuf>, debug: bool) -> bool {
        let config = {
            let mut defaults = self.defaults.write().unwrap_or_else(PoisonError::into_inner);
            defaults.folder = folder.into();
            defaults.debug = debug;
            defaults.clone()
        };

        if self.is_active(context) {
            return false;
        }

        let instance = self.create_instance(context, &config);
        let (_, inserted) = self.insert_instance(context, instance);
        inserted
    }

    /// Set the file cap for new instances and every live one
    pub fn set_max_log_files(&self, max_files: usize) {
        self.defaults.write().unwrap_or_else(PoisonError::into_inner).max_files = max_files;

        for instance in self.lock_instances().values() {
            instance
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .set_max_files(max_files);
        }
    }

    /// Set the file extension for instances created from now on
    pub fn set_file_extension(&self, extension: impl Into<String>) {
        self.defaults.write().unwrap_or_else(PoisonError::into_inner).file_extension = extension.into();
    }

    /// Set the retention mode for instances created from now on
    pub fn set_retention_mode(&self, mode: RetentionMode) {
        self.defaults.write().unwrap_or_else(PoisonError::into_inner).retention = mode;
    }

    /// Current defaults for new instances
    pub fn config(&self) -> LogConfig {
        self.defaults.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Register an observer called on every write of every instance
    pub fn add_write_observer(&self, observer: impl WriteObserver + 'static) {
        self.observers.add(observer);
    }

    pub fn info(&self, context: &ContextId, source: impl Into<Source>, message: impl AsRef<str>) {
        self.log(LogLevel::Info, context, source, message);
    }

    /// Write a debug entry; nothing happens unless the instance has debug on
    pub fn debug(&self, context: &ContextId, source: impl Into<Source>, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, context, source, message);
    }

    pub fn error(&self, context: &ContextId, source: impl Into<Source>, message: impl AsRef<str>) {
        self.log(LogLevel::Error, context, source, message);
    }

    /// Write an entry to `context`'s instance, creating it from the defaults
    /// if needed, then notify observers
    pub fn log(&self, level: LogLevel, context: &ContextId, source: impl Into<Source>, message: impl AsRef<str>) {
        let instance = self.get_or_create(context);
        let mut guard = instance.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(line) = guard.log(level, &source.into(), message.as_ref()) else {
            return;
        };

        if self.observers.is_empty() {
            return;
        }
        let log = guard.buffer().as_str().to_string();
        drop(guard);

        self.observers.notify(&line, &log);
    }

    /// Flush and forget `context`'s instance
    ///
    /// Returns the written file. A flush failure is reported to the console
    /// and tracing and yields `None`, as does a context with no instance.
    pub fn dispose(&self, context: &ContextId) -> Option<PathBuf> {
        match self.try_dispose(context) {
            Ok(path) => path,
            Err(e) => {
                self.report_failure(context, &e);
                None
            }
        }
    }

    /// Like [`dispose`](Self::dispose) but returns flush failures
    ///
    /// The instance is forgotten even when the flush fails.
    pub fn try_dispose(&self, context: &ContextId) -> Result<Option<PathBuf>, LogError> {
        let removed = self.lock_instances().remove(context);
        match removed {
            Some(instance) => flush_instance(context, &instance).map(Some),
            None => Ok(None),
        }
    }

    /// Flush and forget every live instance, returning how many there were
    pub fn dispose_all(&self) -> usize {
        let drained: Vec<(ContextId, SharedInstance)> = self.lock_instances().drain().collect();
        let count = drained.len();

        for (context, instance) in drained {
            if let Err(e) = flush_instance(&context, &instance) {
                self.report_failure(&context, &e);
            }
        }

        count
    }

    /// Dispose every instance, then remove entries queued by deferred retention
    pub fn shutdown(&self) -> usize {
        let disposed = self.dispose_all();
        self.pending.run();
        disposed
    }

    /// Check if `context` has a live instance
    pub fn is_active(&self, context: &ContextId) -> bool {
        self.lock_instances().contains_key(context)
    }

    /// Contexts with a live instance, sorted
    pub fn active_contexts(&self) -> Vec<ContextId> {
        let mut contexts: Vec<ContextId> = self.lock_instances().keys().cloned().collect();
        contexts.sort();
        contexts
    }

    /// Number of live instances
    pub fn len(&self) -> usize {
        self.lock_instances().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Settings and entry count of `context`'s live instance, if any
    pub fn status(&self, context: &ContextId) -> Option<InstanceStatus> {
        let instance = self.lock_instances().get(context).cloned()?;
        let status = instance.lock().unwrap_or_else(PoisonError::into_inner).status();
        Some(status)
    }

    /// Current buffer contents of `context`'s live instance
    pub fn buffer_snapshot(&self, context: &ContextId) -> Option<String> {
        let instance = self.lock_instances().get(context).cloned()?;
        let contents = instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .buffer()
            .as_str()
            .to_string();
        Some(contents)
    }

    /// Number of entries waiting for deferred retention
    pub fn pending_deletions(&self) -> usize {
        self.pending.len()
    }

    fn lock_instances(&self) -> MutexGuard<'_, HashMap<ContextId, SharedInstance>> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_or_create(&self, context: &ContextId) -> SharedInstance {
        if let Some(instance) = self.lock_instances().get(context).cloned() {
            return instance;
        }

        let instance = self.create_instance(context, &self.config());
        self.insert_instance(context, instance).0
    }

    /// Insert a freshly built instance unless `context` gained one meanwhile
    ///
    /// Returns the live instance and whether it is the one passed in.
    fn insert_instance(&self, context: &ContextId, instance: LogInstance) -> (SharedInstance, bool) {
        match self.lock_instances().entry(context.clone()) {
            Entry::Occupied(existing) => {
                tracing::debug!(context = %context, "Dropped duplicate log instance");
                (Arc::clone(existing.get()), false)
            }
            Entry::Vacant(slot) => (Arc::clone(slot.insert(Arc::new(Mutex::new(instance)))), true),
        }
    }

    fn create_instance(&self, context: &ContextId, config: &LogConfig) -> LogInstance {
        let mut instance = LogInstance::new(Arc::clone(&self.console));
        instance.set_max_files(config.max_files);
        instance.set_file_extension(config.file_extension.clone());
        instance.set_retention_mode(config.retention);
        instance.set_console_echo(config.console_echo);

        let folder = config.resolved_folder().join(context.folder_name());
        match instance.initialize(&folder, config.debug) {
            Ok(report) => {
                if config.retention == RetentionMode::Deferred {
                    self.pending.schedule(report.selected);
                }
            }
            Err(e) => self.report_failure(context, &e),
        }

        tracing::debug!(
            context = %context,
            folder = %folder.display(),
            debug = config.debug,
            "Created log instance"
        );

        instance
    }

    fn report_failure(&self, context: &ContextId, error: &LogError) {
        let detail = match std::error::Error::source(error) {
            Some(source) => format!("{}: {}", error, source),
            None => error.to_string(),
        };

        tracing::error!(context = %context, error = %detail, "Log instance failure");
        self.console.report(&format!("[{}] {}", context, detail));
    }
}

impl Default for LogRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LogRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for LogRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogRegistry")
            .field("contexts", &self.active_contexts())
            .field("defaults", &self.config())
            .field("observers", &self.observers)
            .finish()
    }
}

fn flush_instance(context: &ContextId, instance: &Mutex<LogInstance>) -> Result<PathBuf, LogError> {
    let path = instance.lock().unwrap_or_else(PoisonError::into_inner).flush()?;
    tracing::debug!(context = %context, path = %path.display(), "Disposed log instance");
    Ok(path)
}

/// A context bound to its registry
///
/// Pass one to each worker instead of the registry plus an id.
#[derive(Debug, Clone)]
pub struct LogHandle {
    registry: Arc<LogRegistry>,
    context: ContextId,
}

impl LogHandle {
    pub fn context(&self) -> &ContextId {
        &self.context
    }

    pub fn registry(&self) -> &Arc<LogRegistry> {
        &self.registry
    }

    /// See [`LogRegistry::initialize`]
    pub fn initialize(&self, folder: impl Into<PathBuf>, debug: bool) -> bool {
        self.registry.initialize(&self.context, folder, debug)
    }

    pub fn info(&self, source: impl Into<Source>, message: impl AsRef<str>) {
        self.registry.info(&self.context, source, message);
    }

    pub fn debug(&self, source: impl Into<Source>, message: impl AsRef<str>) {
        self.registry.debug(&self.context, source, message);
    }

    pub fn error(&self, source: impl Into<Source>, message: impl AsRef<str>) {
        self.registry.error(&self.context, source, message);
    }

    pub fn dispose(&self) -> Option<PathBuf> {
        self.registry.dispose(&self.context)
    }

    pub fn try_dispose(&self) -> Result<Option<PathBuf>, LogError> {
        self.registry.try_dispose(&self.context)
    }

    pub fn is_active(&self) -> bool {
        self.registry.is_active(&self.context)
    }
}
