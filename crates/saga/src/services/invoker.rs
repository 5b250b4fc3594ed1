//! Step invoker trait and in-memory implementation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::SagaError;
use crate::order_fulfillment::STATUS_OK;

/// Status code and payload returned by a remote step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    pub status_code: i32,
    pub payload: Vec<u8>,
}

impl StepOutput {
    /// A successful output carrying `payload`.
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            status_code: STATUS_OK,
            payload,
        }
    }

    /// An output with an explicit status code.
    pub fn with_status(status_code: i32, payload: Vec<u8>) -> Self {
        Self {
            status_code,
            payload,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

/// Trait for invoking named remote compute steps.
///
/// Implementations carry no timeout or retry policy of their own beyond
/// what their transport does; the coordinator decides what a non-200 status
/// or an invocation error means.
#[async_trait]
pub trait StepInvoker: Send + Sync {
    /// Invokes `step` with `payload` and waits for its output.
    async fn invoke(&self, step: &str, payload: Vec<u8>) -> Result<StepOutput, SagaError>;
}

#[async_trait]
impl<T: StepInvoker + ?Sized> StepInvoker for Arc<T> {
    async fn invoke(&self, step: &str, payload: Vec<u8>) -> Result<StepOutput, SagaError> {
        (**self).invoke(step, payload).await
    }
}

/// Handler standing in for a remote step.
pub type StepHandler = Arc<dyn Fn(&[u8]) -> Result<StepOutput, SagaError> + Send + Sync>;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRecord {
    pub step: String,
    pub payload: Vec<u8>,
}

/// Number of calls kept by default; older calls are dropped first.
pub const DEFAULT_CALL_HISTORY: usize = 1024;

struct InMemoryInvokerState {
    handlers: HashMap<String, StepHandler>,
    calls: VecDeque<InvocationRecord>,
    history_limit: usize,
    failing: HashSet<String>,
}

impl Default for InMemoryInvokerState {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            calls: VecDeque::new(),
            history_limit: DEFAULT_CALL_HISTORY,
            failing: HashSet::new(),
        }
    }
}

impl InMemoryInvokerState {
    fn record(&mut self, step: &str, payload: &[u8]) {
        if self.history_limit == 0 {
            return;
        }
        while self.calls.len() >= self.history_limit {
            self.calls.pop_front();
        }
        self.calls.push_back(InvocationRecord {
            step: step.to_string(),
            payload: payload.to_vec(),
        });
    }
}

/// In-memory step invoker for testing and local runs.
///
/// Each step is served by a registered handler. The most recent calls are
/// recorded, including calls that fail, up to the history limit.
#[derive(Clone, Default)]
pub struct InMemoryStepInvoker {
    state: Arc<Mutex<InMemoryInvokerState>>,
}

impl InMemoryStepInvoker {
    /// Creates an invoker with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `limit` recorded calls. Zero disables recording.
    pub fn with_history_limit(self, limit: usize) -> Self {
        {
            let mut state = self.lock();
            state.history_limit = limit;
            while state.calls.len() > limit {
                state.calls.pop_front();
            }
        }
        self
    }

    /// Registers `handler` for `step`, replacing any previous one.
    pub fn with_handler<F>(self, step: &str, handler: F) -> Self
    where
        F: Fn(&[u8]) -> Result<StepOutput, SagaError> + Send + Sync + 'static,
    {
        self.set_handler(step, handler);
        self
    }

    /// Registers `handler` for `step` on a shared invoker.
    pub fn set_handler<F>(&self, step: &str, handler: F)
    where
        F: Fn(&[u8]) -> Result<StepOutput, SagaError> + Send + Sync + 'static,
    {
        self.lock()
            .handlers
            .insert(step.to_string(), Arc::new(handler));
    }

    /// Configures the invoker to fail every call to `step`.
    pub fn set_fail_on(&self, step: &str, fail: bool) {
        let mut state = self.lock();
        if fail {
            state.failing.insert(step.to_string());
        } else {
            state.failing.remove(step);
        }
    }

    /// Returns the recorded calls in order.
    pub fn calls(&self) -> Vec<InvocationRecord> {
        self.lock().calls.iter().cloned().collect()
    }

    /// Returns the names of invoked steps in order.
    pub fn invoked_steps(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.step.clone()).collect()
    }

    /// Returns the number of calls made to `step`.
    pub fn call_count(&self, step: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.step == step).count()
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryInvokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StepInvoker for InMemoryStepInvoker {
    async fn invoke(&self, step: &str, payload: Vec<u8>) -> Result<StepOutput, SagaError> {
        let handler = {
            let mut state = self.lock();
            state.record(step, &payload);

            if state.failing.contains(step) {
                return Err(SagaError::StepInvocation {
                    step: step.to_string(),
                    reason: "injected failure".to_string(),
                });
            }

            state.handlers.get(step).cloned()
        };

        match handler {
            Some(handler) => handler(&payload),
            None => Err(SagaError::StepInvocation {
                step: step.to_string(),
                reason: "no handler registered".to_string(),
            }),
        }
    }
}
