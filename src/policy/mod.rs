//! Workspace-level catalog policy: which workspaces take part, which group a
//! new dependency defaults to, and how strictly catalog use is enforced.

pub mod defaults;
pub mod validation;
pub mod workspace;
