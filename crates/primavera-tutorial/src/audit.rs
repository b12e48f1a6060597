//! Singleton audit service reaching the per-request logger

use primavera_container::{BeanProvider, ContainerResult};

use crate::logger::RequestLogger;

/// Records audit events against the caller's current request.
///
/// The service is a singleton but the logger is request-scoped, so the
/// service holds a deferred provider instead of an instance: every
/// [`record`](AuditService::record) resolves the logger of whichever window
/// is active on the calling thread.
pub struct AuditService {
	logger: BeanProvider<RequestLogger>,
}

impl AuditService {
	pub fn new(logger: BeanProvider<RequestLogger>) -> Self {
		Self { logger }
	}

	/// Logs `message` under the active request's identity. Fails when no
	/// request window is active on this thread.
	pub fn record(&self, message: &str) -> ContainerResult<()> {
		self.logger.get()?.log(message);
		Ok(())
	}
}
