//! Agent Lifecycle
//!
//! `Installing -> Installed -> Active`. The agent never waits: installation
//! skips the waiting phase and activation claims every open client at once.

use tracing::info;

use crate::error::AgentError;

// == Lifecycle State ==
/// Where the agent is in its install/activate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Registered, install event not yet handled
    Installing,
    /// Installed with waiting skipped, ready to activate
    Installed,
    /// Handling fetches for every client
    Active,
}

// == Lifecycle ==
/// Tracks the agent's state and the effects of its lifecycle events.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    skip_waiting: bool,
    clients_claimed: bool,
}

impl Lifecycle {
    // == Constructor ==
    /// Starts in [`LifecycleState::Installing`].
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Installing,
            skip_waiting: false,
            clients_claimed: false,
        }
    }

    // == State ==
    /// Current state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    // == Is Active ==
    /// True once activation completed.
    pub fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    // == Skipped Waiting ==
    /// True once the install handler asked to skip the waiting phase.
    pub fn skipped_waiting(&self) -> bool {
        self.skip_waiting
    }

    // == Controls Clients ==
    /// True once activation took control of the open clients.
    pub fn controls_clients(&self) -> bool {
        self.clients_claimed
    }

    // == Install ==
    /// Handles the install event.
    pub fn install(&mut self) -> Result<(), AgentError> {
        if self.state != LifecycleState::Installing {
            return Err(AgentError::InvalidTransition {
                from: self.state,
                event: "install",
            });
        }
        self.skip_waiting = true;
        self.state = LifecycleState::Installed;
        info!("Offline cache agent installed, skipping wait");
        Ok(())
    }

    // == Activate ==
    /// Handles the activate event.
    pub fn activate(&mut self) -> Result<(), AgentError> {
        if self.state != LifecycleState::Installed {
            return Err(AgentError::InvalidTransition {
                from: self.state,
                event: "activate",
            });
        }
        self.clients_claimed = true;
        self.state = LifecycleState::Active;
        info!("Offline cache agent active, clients claimed");
        Ok(())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
