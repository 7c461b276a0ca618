pub mod amount;
pub mod bond_status;
pub mod severity;
pub mod snapshot;
pub mod state;

pub use amount::{format_balance, Coin};
pub use bond_status::BondStatus;
pub use severity::Severity;
pub use snapshot::{Coverage, MetricsSnapshot};
pub use state::PersistedState;
