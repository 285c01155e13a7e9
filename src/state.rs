use std::sync::Arc;

use crate::auth::{CredentialPolicy, TokenIssuer};
use crate::store::TaskRepository;

#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskRepository>,
    pub tokens: Arc<TokenIssuer>,
    pub credentials: Arc<dyn CredentialPolicy>,
}
