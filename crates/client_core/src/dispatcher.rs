//! Single-flight dispatch of counter actions.
//!
//! At most one action is in flight per dispatcher. Each action runs
//! submit, confirm and refresh, then returns to idle whatever the outcome.

use std::sync::{Arc, Mutex, MutexGuard};

use shared::{
    domain::{Address, CounterAction, ObjectId, PendingAction, TransactionDigest},
    error::CounterError,
    protocol::{CallArg, MoveCall},
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    locator::validate_package_id, snapshot::SnapshotState, SignAndExecute, SnapshotReader,
    TransactionResponseOptions, TransactionWaiter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Submitting,
    Confirming,
    Refreshing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatcherEvent {
    Phase {
        action: CounterAction,
        phase: DispatchPhase,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Another action was in flight; nothing was submitted.
    Busy,
    Completed {
        digest: TransactionDigest,
        snapshot: SnapshotState,
    },
    Failed(CounterError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub action: CounterAction,
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    action: CounterAction,
    phase: DispatchPhase,
}

/// Clears the in-flight slot when the round trip ends, including when the
/// dispatching future is dropped.
struct InFlightGuard<'a> {
    dispatcher: &'a ActionDispatcher,
    action: CounterAction,
}

impl InFlightGuard<'_> {
    fn advance(&self, phase: DispatchPhase) {
        if let Some(in_flight) = self.dispatcher.lock_slot().as_mut() {
            in_flight.phase = phase;
        }
        self.dispatcher.emit(self.action, phase);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.dispatcher.lock_slot().take();
        self.dispatcher.emit(self.action, DispatchPhase::Idle);
    }
}

pub struct ActionDispatcher {
    package_id: String,
    signer: Arc<dyn SignAndExecute>,
    waiter: Arc<dyn TransactionWaiter>,
    snapshot: Arc<SnapshotReader>,
    slot: Mutex<Option<InFlight>>,
    events: broadcast::Sender<DispatcherEvent>,
}

impl ActionDispatcher {
    pub fn new(
        package_id: impl Into<String>,
        signer: Arc<dyn SignAndExecute>,
        waiter: Arc<dyn TransactionWaiter>,
        snapshot: Arc<SnapshotReader>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            package_id: package_id.into(),
            signer,
            waiter,
            snapshot,
            slot: Mutex::new(None),
            events,
        }
    }

    pub fn object_id(&self) -> &ObjectId {
        self.snapshot.object_id()
    }

    pub fn snapshot(&self) -> &Arc<SnapshotReader> {
        &self.snapshot
    }

    pub fn pending(&self) -> PendingAction {
        self.lock_slot().map(|in_flight| in_flight.action)
    }

    pub fn phase(&self) -> DispatchPhase {
        self.lock_slot()
            .map_or(DispatchPhase::Idle, |in_flight| in_flight.phase)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DispatcherEvent> {
        self.events.subscribe()
    }

    /// Reset is offered only to the owner of the displayed counter. The
    /// module enforces the actual permission.
    pub fn reset_visible(&self, identity: Option<&Address>) -> bool {
        self.snapshot
            .current()
            .snapshot()
            .is_some_and(|snapshot| snapshot.is_owned_by(identity))
    }

    pub fn buttons(&self, identity: Option<&Address>) -> Vec<ActionButton> {
        let pending = self.pending();
        let reset_visible = self.reset_visible(identity);
        CounterAction::ALL
            .into_iter()
            .filter(|action| *action != CounterAction::Reset || reset_visible)
            .map(|action| ActionButton {
                action,
                label: if pending == Some(action) {
                    action.busy_label()
                } else {
                    action.idle_label()
                },
                enabled: pending.is_none(),
            })
            .collect()
    }

    pub async fn increment(&self) -> ActionOutcome {
        self.dispatch(CounterAction::Increment).await
    }

    pub async fn decrement(&self) -> ActionOutcome {
        self.dispatch(CounterAction::Decrement).await
    }

    pub async fn reset(&self) -> ActionOutcome {
        self.dispatch(CounterAction::Reset).await
    }

    pub async fn dispatch(&self, action: CounterAction) -> ActionOutcome {
        let Some(guard) = self.try_begin(action) else {
            debug!(%action, pending = ?self.pending(), "action ignored while another is in flight");
            return ActionOutcome::Busy;
        };

        match self.round_trip(&guard).await {
            Ok((digest, snapshot)) => {
                info!(%action, %digest, object_id = %self.object_id(), "counter action confirmed");
                ActionOutcome::Completed { digest, snapshot }
            }
            Err(err) => {
                warn!(%action, object_id = %self.object_id(), error = %err, "counter action failed");
                ActionOutcome::Failed(err)
            }
        }
    }

    fn try_begin(&self, action: CounterAction) -> Option<InFlightGuard<'_>> {
        {
            let mut slot = self.lock_slot();
            if slot.is_some() {
                return None;
            }
            *slot = Some(InFlight {
                action,
                phase: DispatchPhase::Submitting,
            });
        }
        self.emit(action, DispatchPhase::Submitting);
        Some(InFlightGuard {
            dispatcher: self,
            action,
        })
    }

    async fn round_trip(
        &self,
        guard: &InFlightGuard<'_>,
    ) -> Result<(TransactionDigest, SnapshotState), CounterError> {
        let call = self.build_call(guard.action)?;
        let digest = self
            .signer
            .sign_and_execute(call)
            .await
            .map_err(|err| CounterError::Transaction(err.to_string()))?;

        guard.advance(DispatchPhase::Confirming);
        let response = self
            .waiter
            .wait_for_transaction(&digest, TransactionResponseOptions::effects())
            .await
            .map_err(|err| CounterError::TransientFetch(err.to_string()))?;
        if let Some(error) = response.execution_error() {
            return Err(CounterError::Transaction(error));
        }

        guard.advance(DispatchPhase::Refreshing);
        let snapshot = self.snapshot.refetch().await;
        snapshot.clone().into_result()?;
        Ok((digest, snapshot))
    }

    fn build_call(&self, action: CounterAction) -> Result<MoveCall, CounterError> {
        let package_id = validate_package_id(&self.package_id)?;
        let mut arguments = vec![CallArg::Object(self.object_id().clone())];
        if action == CounterAction::Reset {
            arguments.push(CallArg::PureU64(0));
        }
        Ok(MoveCall::counter(&package_id, action.entry_point(), arguments))
    }

    fn emit(&self, action: CounterAction, phase: DispatchPhase) {
        // No subscribers is fine.
        let _ = self.events.send(DispatcherEvent::Phase { action, phase });
    }

    fn lock_slot(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
