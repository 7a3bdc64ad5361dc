use crate::auth::SupabaseAuth;
use crate::config::{self, AppConfig};
use crate::controller::{ControllerOptions, RegistrationController, Services, PAYMENT_PAGE};
use crate::records::SupabaseRecords;
use crate::remote::SupabaseClient;
use crate::render;
use crate::storage::FileStore;
use anyhow::Result;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

/// Resolved state directory and configuration for one invocation.
pub struct AppContext {
    state_dir: PathBuf,
    config: AppConfig,
}

impl AppContext {
    pub fn load(explicit_state_dir: Option<&Path>) -> Result<Self> {
        let state_dir = config::resolve_state_dir(explicit_state_dir)?;
        let config = config::load_config(&state_dir)?;
        tracing::debug!(
            state_dir = %state_dir.display(),
            backend = %config.backend.url,
            "loaded configuration"
        );
        Ok(Self { state_dir, config })
    }

    /// Mount the controller against the real storage and backend, run one
    /// action, then dispose it and render any page it navigated to.
    pub fn with_controller<T>(
        &self,
        action: impl FnOnce(&mut RegistrationController<'_>) -> Result<T>,
    ) -> Result<T> {
        let store = FileStore::new(&self.state_dir);
        tracing::debug!(storage = %store.path().display(), "mounting registration form");
        let client = SupabaseClient::new(&self.config.backend);
        let auth = SupabaseAuth::new(client.clone(), &store);
        let records = SupabaseRecords::new(client, &self.config.registrations_table);
        let navigations = RefCell::new(Vec::new());
        let options = ControllerOptions {
            redirect_url: self.config.redirect_url.clone(),
            require_email_verification: self.config.require_email_verification,
        };

        let result = {
            let mut controller = RegistrationController::init(
                Services {
                    store: &store,
                    auth: &auth,
                    records: &records,
                },
                options,
                |page: &str| navigations.borrow_mut().push(page.to_string()),
            )?;
            let result = action(&mut controller);
            controller.dispose();
            result
        };

        for page in navigations.borrow().iter() {
            if page == PAYMENT_PAGE {
                print!("{}", render::render_payment());
            }
        }
        result
    }
}
