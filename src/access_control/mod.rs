//! Access control module
//!
//! Resolves permission groups into the full set of permissions they grant.
//!
//! ## Access Control Model
//!
//! A [`Schema`] lists top-level groups. Each group owns leaf permissions and
//! may inherit other groups. Inheritance is a plain union: a group grants its
//! own permissions plus everything its inherited groups grant, transitively.
//!
//! Initialization runs in three steps and stops at the first error:
//!
//! 1. **Validation** - the schema is non-empty and inheritance is acyclic
//! 2. **Indexing** - every reachable identifier is bound to exactly one node
//! 3. **Resolution** - read-only queries against the frozen index
//!
//! ## Example
//!
//! ```
//! use access_schema::access_control::{AccessControlProvider, AccessResolver, Group, Schema};
//!
//! let mut schema = Schema::new();
//! let read = schema.add_group(Group::new("ReadOnly").with_permission("Customer_ReadCustomer"));
//! let admin = schema.add_group(Group::new("Admin").with_permission("Customer_DeleteCustomer"));
//! schema.add_inherit(admin, read);
//!
//! let resolver = AccessResolver::initialize(schema).unwrap();
//! let (found, ids) = resolver.resolve("Admin");
//! assert!(found);
//! assert!(ids.contains("Customer_ReadCustomer"));
//! ```

pub mod index;
pub mod resolver;
pub mod schema;
pub mod types;
pub mod validator;

pub use index::{AccessIndex, NodeRef};
pub use resolver::AccessResolver;
pub use schema::{Group, GroupRef, Permission, Schema};
pub use types::{AccessControl, AccessControlKind, AccessControlProvider};
pub use validator::validate;
