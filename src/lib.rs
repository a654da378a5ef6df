//! Label-driven DNS record synthesis for cluster services.
//!
//! This crate derives the DNS records of services running in a cluster
//! from two labels on the service object: one naming the stack the service
//! belongs to and one naming the service within that stack. Labeled
//! services become resolvable under `<service>.<stack>.<namespace>.svc.`
//! names next to their native ones; services without the labels are left
//! alone entirely.
//!
//! Records live in a hierarchical [tree] whose nodes follow the reversed
//! DNS names, with each labeled service owning one subtree. The [synth]
//! module rebuilds a service's subtree from its current descriptors and
//! replaces the stored one wholesale, so updates never diff and repeating
//! an update is harmless. The tree itself is single threaded; concurrent
//! setups hand it to the writer task in [store] and go through its handle.
//!
//! # Modules
//!
//! * [config] holds the cluster naming conventions and builds tree paths
//!   and fully qualified names from them,
//! * [fqdn] provides domain paths and the name composition they render to,
//! * [record] defines record payloads and the hashed leaf names of
//!   anonymous targets,
//! * [service] describes services and endpoints as reported by the
//!   cluster control plane,
//! * [synth] turns those descriptors into record tree updates,
//! * [tree] implements the record tree and its write contract, and
//! * [store] wraps the tree into a single writer task for concurrent use.
//!
//! # Example
//!
//! ```
//! use stackdns::config::ClusterConfig;
//! use stackdns::service::ServiceDescriptor;
//! use stackdns::synth::Synthesizer;
//! use stackdns::tree::TreeCache;
//!
//! let config = ClusterConfig::new("cluster.local").unwrap();
//! let synth = Synthesizer::new(config.clone());
//!
//! let mut service = ServiceDescriptor {
//!     namespace: "prod".into(),
//!     name: "db-0".into(),
//!     cluster_ip: Some("10.3.0.10".into()),
//!     ..Default::default()
//! };
//! service
//!     .labels
//!     .insert(config.stack_label().into(), "billing".into());
//! service
//!     .labels
//!     .insert(config.service_label().into(), "db".into());
//!
//! let mut tree = TreeCache::new();
//! synth.add_portal_service(&mut tree, &service);
//! assert_eq!(tree.entry_count(), 1);
//! ```

pub mod config;
pub mod fqdn;
pub mod record;
pub mod service;
pub mod store;
pub mod synth;
pub mod tree;
