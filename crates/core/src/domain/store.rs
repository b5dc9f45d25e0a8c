use serde::{Deserialize, Serialize};

/// Display context for the store a computation runs against. Threaded
/// explicitly into scenario and report calls; never global state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreContext {
    pub store_name: String,
    pub currency_symbol: String,
}

impl Default for StoreContext {
    fn default() -> Self {
        Self { store_name: "Main Street Store".to_string(), currency_symbol: "₹".to_string() }
    }
}
