//! Client side of the dashboard: the view state a viewer holds and the loop
//! that keeps it fresh.

pub mod reconcile;
pub mod refresh;
pub use reconcile::{diff, CardChange, CardKey, CardPatch, DashboardView};
pub use refresh::{ClientError, RefreshLoop, StatusClient};
