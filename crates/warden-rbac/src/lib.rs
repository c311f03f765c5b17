//! # warden-rbac: Role-Based Access Control
//!
//! The coarse baseline layer of Warden's authorization engine: subjects hold
//! roles, roles bundle permissions, and a permission is an action verb on a
//! resource type. A subject's effective permissions are the union across all
//! held roles.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Baseline Query                              │
//! │  (subject, resource type, action)            │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  BaselineChecker                             │
//! │  ├─ Cached per-subject permission union      │
//! │  ├─ RoleStore lookups on cache miss          │
//! │  └─ Push-based invalidation on mutation      │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//!            allow / deny (attribute-blind)
//! ```
//!
//! The baseline is deliberately attribute-blind: conditional overrides live
//! in `warden-abac`, and the decision engine in `warden-engine` combines the
//! two layers.
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use warden_rbac::baseline::BaselineChecker;
//! use warden_rbac::builtin;
//! use warden_rbac::store::{InMemoryRoleStore, RoleStore};
//! use warden_types::{CancelToken, SubjectId};
//!
//! let store = Arc::new(InMemoryRoleStore::new());
//! builtin::install(&store);
//! store.assign_role("alice", builtin::role_id::VIEWER);
//!
//! let checker = BaselineChecker::new(store.clone() as Arc<dyn RoleStore>);
//! store.add_listener(checker.cache());
//!
//! let cancel = CancelToken::new();
//! let alice = SubjectId::from("alice");
//! assert!(checker.check_baseline(&alice, "env_var", "read", &cancel)?);
//! assert!(!checker.check_baseline(&alice, "env_var", "write", &cancel)?);
//! # Ok::<(), warden_types::StoreError>(())
//! ```

pub mod baseline;
pub mod builtin;
pub mod permissions;
pub mod roles;
pub mod store;

// Re-export commonly used types
pub use baseline::{BaselineChecker, PermissionCache, SubjectGrants};
pub use permissions::{Permission, PermissionKey, PermissionSet};
pub use roles::{Role, RoleAssignment};
pub use store::{InMemoryRoleStore, RoleAdminError, RoleChangeListener, RoleStore};
