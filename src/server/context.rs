//! A test case that handlers can report failures to.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::error;

/// Collects failures raised while a test server handles requests.
///
/// Recording a failure does not stop the request that raised it. The
/// enclosing test checks the context once it is done, either explicitly with
/// [`TestContext::assert_passed`] or by dropping the
/// [`TestServer`](crate::server::TestServer) that owns it.
#[derive(Debug, Default)]
pub struct TestContext {
    name: String,
    failures: Mutex<Vec<String>>,
}

impl TestContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panicking handler must not hide the failures recorded before it.
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a failure and keep going.
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        error!("[{name}] {message}", name = self.name);
        self.lock().push(message);
    }

    pub fn failed(&self) -> bool {
        !self.lock().is_empty()
    }

    /// The failures recorded so far, oldest first.
    pub fn failures(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Panic with every recorded failure, if there are any.
    pub fn assert_passed(&self) {
        let failures = self.lock();
        if !failures.is_empty() {
            panic!(
                "{name} recorded {count} failure(s):\n{list}",
                name = self.name,
                count = failures.len(),
                list = failures.join("\n")
            );
        }
    }
}
