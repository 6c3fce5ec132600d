//! Application shell: permission prompt flow and event routing.

mod activity;
mod permission_flow;

pub use activity::PreviewApp;
pub use permission_flow::{PermissionFlow, PermissionView};
