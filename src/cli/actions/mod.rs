pub mod inventory;
pub mod session;

// Internal "interpreter" for `Action`.
// The match lives in its own module so `mod.rs` stays a list of variants.
mod run;

use crate::{auth::Registration, cli::globals::GlobalArgs};
use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Login { email: String, password: SecretString },
    Logout,
    Whoami,
    Register(Box<Registration>),
    Products(inventory::ProductAction),
    Movements(inventory::MovementAction),
    Alerts(inventory::AlertAction),
    Dashboard,
}

impl Action {
    /// Execute the action against the API configured in `globals`.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
