/// Galaxy3D Engine - explicit service registry for the transient allocator
///
/// Owns the process-wide transient `ResourceSystem` and the global logger.
/// The resource system is created and destroyed explicitly; callers obtain
/// an `Arc` handle to it rather than reaching into hidden global state.

use std::sync::{Arc, OnceLock, RwLock};
use std::time::SystemTime;
use crate::error::{Error, Result};
use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use crate::transient::{ResourceSystem, TransientAllocatorConfig};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Internal state structure holding the engine services
struct EngineState {
    /// Transient resource system (heap pool shared by allocator sessions)
    transient_resource_system: RwLock<Option<Arc<ResourceSystem>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            transient_resource_system: RwLock::new(None),
        }
    }
}

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger::default())))
}

// ===== PUBLIC API =====

/// Main engine service registry
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_transient_allocator::galaxy3d::Engine;
/// use galaxy_3d_transient_allocator::galaxy3d::render::ImmediateCommandContext;
/// use galaxy_3d_transient_allocator::galaxy3d::transient::{
///     ResourceAllocator, TransientAllocatorConfig,
/// };
///
/// Engine::initialize()?;
/// Engine::create_transient_resource_system(TransientAllocatorConfig::default())?;
///
/// let system = Engine::transient_resource_system()?;
/// let session = ResourceAllocator::new(system);
/// // ... create transient textures / buffers
/// session.freeze(&mut ImmediateCommandContext::new())?;
///
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_transient_allocator::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log errors before returning them (internal use)
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("galaxy3d::Engine", "{}", error);
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get().ok_or_else(|| Self::log_and_return_error(
            Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
        ))
    }

    /// Initialize the engine
    ///
    /// Must be called once at application startup before creating any service.
    /// Calling it again is harmless.
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Shutdown the engine and destroy every service
    ///
    /// Idle heaps of the transient resource system are released immediately;
    /// the system itself is dropped once the last session handle goes away.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut lock) = state.transient_resource_system.write() {
                if let Some(system) = lock.take() {
                    if let Err(e) = system.release_idle_heaps() {
                        crate::engine_warn!("galaxy3d::Engine",
                            "Failed to release idle transient heaps at shutdown: {}", e);
                    }
                }
            }
        }
    }

    // ===== TRANSIENT RESOURCE SYSTEM API =====

    /// Create and register the transient resource system
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine is not initialized
    /// - A resource system already exists
    /// - The configuration is invalid
    pub fn create_transient_resource_system(config: TransientAllocatorConfig) -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.transient_resource_system.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("ResourceSystem lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("ResourceSystem already exists. Call Engine::destroy_transient_resource_system() first.".to_string())
            ));
        }

        let system = ResourceSystem::new(config).map_err(Self::log_and_return_error)?;
        *lock = Some(Arc::new(system));

        crate::engine_info!("galaxy3d::Engine", "Transient ResourceSystem created successfully");

        Ok(())
    }

    /// Get the transient resource system
    ///
    /// # Errors
    ///
    /// Returns an error if the engine is not initialized or the system has
    /// not been created.
    pub fn transient_resource_system() -> Result<Arc<ResourceSystem>> {
        let state = Self::state()?;

        let lock = state.transient_resource_system.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("ResourceSystem lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("ResourceSystem not created. Call Engine::create_transient_resource_system() first.".to_string())
            ))
    }

    /// Destroy the transient resource system
    ///
    /// Idle heaps are released now. Sessions still holding a handle keep the
    /// system alive until they are frozen and dropped.
    pub fn destroy_transient_resource_system() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.transient_resource_system.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("ResourceSystem lock poisoned".to_string())
            ))?;

        if let Some(system) = lock.take() {
            system.release_idle_heaps()?;
        }

        crate::engine_info!("galaxy3d::Engine", "Transient ResourceSystem destroyed");

        Ok(())
    }

    /// Reset all services for testing (only available in test builds)
    #[cfg(test)]
    pub fn reset_for_testing() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut lock) = state.transient_resource_system.write() {
                *lock = None;
            }
        }
    }

    // ===== LOGGING API =====

    /// Replace the global logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset the global logger to `DefaultLogger::default()`
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger::default());
        }
    }

    /// Logging entry point used by the `engine_*!` macros
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Logging entry point with file:line information (used by `engine_error!`)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger_lock().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
