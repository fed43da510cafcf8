//! Catalog definitions, inheritance and the host's native catalog surface.
//!
//! A project declares its catalogs once, in `catalogs.yml`:
//!
//! ```yaml
//! options:
//!   defaultGroups: [stable]
//!   validation: {stable: strict}
//! list:
//!   lodash: ^4.17.21        # shortcut for the root group
//!   stable:
//!     react: ^18.3.1
//!   stable/next:
//!     react-dom: ^19.0.0    # inherits react from stable
//! ```
//!
//! Groups form a hierarchy through their `/`-delimited names. Resolving a
//! group merges its ancestors' entries with its own, the most specific entry
//! winning. Named groups never inherit from `root`.
//!
//! ## Example
//!
//! ```rust
//! use catalog_resolver::catalog::definition::CatalogDefinition;
//! use catalog_resolver::catalog::hierarchical::InheritanceResolver;
//! use catalog_resolver::core::types::GroupName;
//!
//! let yaml = "list:\n  stable:\n    react: ^18.3.1\n  stable/next:\n    react-dom: ^19.0.0\n";
//! let definition = CatalogDefinition::from_yaml(yaml).unwrap();
//!
//! let resolved = InheritanceResolver::new(&definition).resolve(&GroupName::new("stable/next"));
//! assert_eq!(resolved.len(), 2);
//! ```
//!
//! ## Applying
//!
//! The package manager only understands a flat default catalog plus named
//! catalogs. [`projection::ApplyProjector`] flattens every group into that
//! shape and [`native::NativeSurface`] writes it into `.yarnrc.yml`, leaving
//! every other line of the file untouched.

pub mod definition;
pub mod hierarchical;
pub mod native;
pub mod projection;
pub mod store;
