pub mod dispatch;
pub mod error;
pub mod inspect;
pub mod provider;
pub mod reconcile;
pub mod resolve;

pub mod prelude {
    pub use crate::dispatch::{Dispatcher, ReconcileHandle};
    pub use crate::error::ReconcileError;
    pub use crate::inspect::StackInspector;
    pub use crate::provider::{ProviderError, StackProvider};
    pub use crate::reconcile::{ReconcileConfig, StackReconciler};
    pub use crate::resolve::resolve;
}
