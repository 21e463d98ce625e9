//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on the driving
//! ports, so tests can wire any implementation behind them.

use std::sync::Arc;

use crate::domain::ports::{AccountService, RecipeService, TaxonomyService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub taxonomy: Arc<dyn TaxonomyService>,
    pub recipes: Arc<dyn RecipeService>,
}

impl HttpState {
    pub fn new(
        accounts: Arc<dyn AccountService>,
        taxonomy: Arc<dyn TaxonomyService>,
        recipes: Arc<dyn RecipeService>,
    ) -> Self {
        Self {
            accounts,
            taxonomy,
            recipes,
        }
    }
}
