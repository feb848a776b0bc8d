pub mod http_server;

/// Stderr logging for test binaries; later calls are no-ops.
pub fn init_logging() {
    resrc::logging::init_logging_stderr();
}
