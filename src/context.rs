use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::database::DrinkStore;
use crate::handlers::login::LoginPages;

/// Everything a handler needs, built once at startup and cloned per request
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn DrinkStore>,
    pub verifier: Arc<TokenVerifier>,
    pub login: Option<Arc<LoginPages>>,
}

impl AppContext {
    pub fn new(store: Arc<dyn DrinkStore>, verifier: Arc<TokenVerifier>) -> Self {
        Self {
            store,
            verifier,
            login: None,
        }
    }

    pub fn with_login(mut self, login: LoginPages) -> Self {
        self.login = Some(Arc::new(login));
        self
    }
}
