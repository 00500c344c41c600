//! Assembly lifecycle events.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::unit::AssembledUnit;

/// Terminal outcome of an approved proposal.
#[derive(Clone)]
pub enum AssemblyEvent {
    /// The unit was constructed and registered.
    UnitAssembled {
        name: String,
        unit: Arc<dyn AssembledUnit>,
    },
    /// A post-approval stage failed.
    AssemblyFailed { name: String, reason: String },
}

impl fmt::Debug for AssemblyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitAssembled { name, .. } => {
                f.debug_struct("UnitAssembled").field("name", name).finish()
            }
            Self::AssemblyFailed { name, reason } => f
                .debug_struct("AssemblyFailed")
                .field("name", name)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Fan-out bus for assembly events.
///
/// Each subscriber gets its own unbounded channel; events arrive in
/// emission order. Dropped receivers are pruned on the next emit.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<AssemblyEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AssemblyEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .expect("event bus lock poisoned")
            .push(tx);
        rx
    }

    pub fn emit(&self, event: AssemblyEvent) {
        self.subscribers
            .lock()
            .expect("event bus lock poisoned")
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
