//! Application shell: picks the screen to show and owns the resolved counter.

use std::{fmt::Write as _, sync::Arc};

use shared::{
    domain::{Address, ObjectId},
    error::CounterError,
};
use tracing::{info, warn};

use crate::{
    ActionButton, ActionDispatcher, CounterServices, ObjectLocator, Resolution, SnapshotReader,
    SnapshotState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    ConnectWallet,
    CreateCounter,
    Counter(ObjectId),
}

pub struct CounterApp {
    services: CounterServices,
    package_id: String,
    location: String,
    account: Option<Address>,
    dispatcher: Option<Arc<ActionDispatcher>>,
}

impl CounterApp {
    /// Resolves the counter from `location` (a `#<id>` fragment) up front.
    pub fn new(
        services: CounterServices,
        package_id: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        let mut app = Self {
            services,
            package_id: package_id.into(),
            location: location.into(),
            account: None,
            dispatcher: None,
        };
        if let Resolution::Resolved(object_id) = ObjectLocator::resolve(&app.location) {
            app.adopt(object_id);
        }
        app
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    pub fn counter_id(&self) -> Option<&ObjectId> {
        self.dispatcher.as_ref().map(|dispatcher| dispatcher.object_id())
    }

    pub fn dispatcher(&self) -> Option<&Arc<ActionDispatcher>> {
        self.dispatcher.as_ref()
    }

    /// Asks the session provider which account is connected. A failing
    /// provider counts as disconnected.
    pub async fn refresh_account(&mut self) -> Option<&Address> {
        self.account = match self.services.session.current_account().await {
            Ok(account) => account,
            Err(err) => {
                warn!(error = %err, "failed to query connected account");
                None
            }
        };
        self.account.as_ref()
    }

    pub fn screen(&self) -> Screen {
        match (&self.account, self.counter_id()) {
            (None, _) => Screen::ConnectWallet,
            (Some(_), None) => Screen::CreateCounter,
            (Some(_), Some(object_id)) => Screen::Counter(object_id.clone()),
        }
    }

    pub fn locator(&self) -> ObjectLocator {
        ObjectLocator::new(
            self.package_id.clone(),
            self.services.signer.clone(),
            self.services.waiter.clone(),
        )
    }

    pub async fn create_counter(&mut self) -> Result<ObjectId, CounterError> {
        let object_id = self.locator().create().await?;
        self.on_created(object_id.clone());
        Ok(object_id)
    }

    /// Adopts a freshly created counter and persists it in the location.
    pub fn on_created(&mut self, object_id: ObjectId) {
        self.location = object_id.to_fragment();
        info!(%object_id, location = %self.location, "counter adopted");
        self.adopt(object_id);
    }

    fn adopt(&mut self, object_id: ObjectId) {
        let snapshot = Arc::new(SnapshotReader::new(
            object_id,
            self.services.reader.clone(),
        ));
        self.dispatcher = Some(Arc::new(ActionDispatcher::new(
            self.package_id.clone(),
            self.services.signer.clone(),
            self.services.waiter.clone(),
            snapshot,
        )));
    }

    /// Text rendering of the current screen.
    pub fn render(&self) -> String {
        match self.screen() {
            Screen::ConnectWallet => "Please connect your wallet to get started.\n".to_string(),
            Screen::CreateCounter => "No counter selected. Run `create` to make one.\n".to_string(),
            Screen::Counter(_) => match &self.dispatcher {
                Some(dispatcher) => render_counter(dispatcher, self.account.as_ref()),
                None => String::new(),
            },
        }
    }
}

pub fn render_counter(dispatcher: &ActionDispatcher, account: Option<&Address>) -> String {
    let state = dispatcher.snapshot().current();
    let mut out = String::new();
    match &state {
        SnapshotState::Loading => out.push_str("Loading...\n"),
        SnapshotState::Error(message) => {
            let _ = writeln!(out, "Error: {message}");
        }
        SnapshotState::NotFound => out.push_str("Not found\n"),
        SnapshotState::Ready(snapshot) => {
            let _ = writeln!(out, "Counter {}", dispatcher.object_id());
            let value = snapshot
                .as_ref()
                .map(|snapshot| snapshot.value.to_string())
                .unwrap_or_default();
            let _ = writeln!(out, "Count: {value}");
            let _ = writeln!(out, "{}", render_buttons(&dispatcher.buttons(account)));
        }
    }
    out
}

fn render_buttons(buttons: &[ActionButton]) -> String {
    buttons
        .iter()
        .map(|button| {
            if button.enabled {
                format!("[{}]", button.label)
            } else {
                format!("({})", button.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
