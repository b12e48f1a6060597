//! Request window tokens and the per-thread active-window stack

use std::cell::RefCell;

/// Opaque handle for one request window.
///
/// Returned by [`Container::begin_request`] and consumed by
/// [`Container::end_request`]. The token may be moved to another thread to
/// end the window there, but resolution only sees windows begun on the
/// resolving thread.
///
/// [`Container::begin_request`]: crate::container::Container::begin_request
/// [`Container::end_request`]: crate::container::Container::end_request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestToken {
	container: u64,
	request: u64,
}

impl RequestToken {
	pub(crate) fn new(container: u64, request: u64) -> Self {
		Self { container, request }
	}

	pub(crate) fn container_id(&self) -> u64 {
		self.container
	}

	pub(crate) fn request_id(&self) -> u64 {
		self.request
	}
}

thread_local! {
	/// Stack of `(container id, request id)` pairs for windows begun on this
	/// thread. The innermost live entry for a container wins.
	static ACTIVE_WINDOWS: RefCell<Vec<(u64, u64)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a freshly begun window active on the current thread.
pub(crate) fn push_window(container: u64, request: u64) {
	ACTIVE_WINDOWS.with(|stack| stack.borrow_mut().push((container, request)));
}

/// Removes a window from the current thread's stack, if present here.
///
/// Ending a window on another thread leaves a stale entry behind on the
/// beginning thread; [`current_window`] prunes it on its next scan.
pub(crate) fn pop_window(container: u64, request: u64) {
	ACTIVE_WINDOWS.with(|stack| {
		let mut stack = stack.borrow_mut();
		if let Some(index) = stack
			.iter()
			.rposition(|&entry| entry == (container, request))
		{
			stack.remove(index);
		}
	});
}

/// Innermost live window for `container` on the current thread.
///
/// Entries whose window has already ended are dropped from the stack as the
/// scan passes them.
pub(crate) fn current_window(container: u64, is_live: impl Fn(u64) -> bool) -> Option<u64> {
	ACTIVE_WINDOWS.with(|stack| {
		let mut stack = stack.borrow_mut();
		let mut index = stack.len();
		while index > 0 {
			index -= 1;
			let (entry_container, request) = stack[index];
			if entry_container != container {
				continue;
			}
			if is_live(request) {
				return Some(request);
			}
			stack.remove(index);
		}
		None
	})
}
