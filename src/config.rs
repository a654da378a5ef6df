//! Cluster naming configuration.
//!
//! Everything the synthesis logic needs to know about its environment is
//! collected in a [`ClusterConfig`] and passed in explicitly: the cluster
//! domain, the subdomain under which services live, and the two label keys
//! that opt a service into stack naming. The config also owns the helpers
//! that turn namespaces and labels into tree paths and names, so the layout
//! of the namespace is decided in one place.

use core::fmt;
use std::error;

use crate::fqdn::{compose_fqdn, DomainPath, Fqdn};

/// The cluster domain used by [`ClusterConfig::default`].
pub const DEFAULT_CLUSTER_DOMAIN: &str = "cluster.local";

/// The subdomain under which all service names live.
pub const DEFAULT_SERVICE_SUBDOMAIN: &str = "svc";

/// The label key naming the stack a service belongs to.
pub const DEFAULT_STACK_LABEL: &str = "stackdns.io/stack";

/// The label key naming a service within its stack.
pub const DEFAULT_SERVICE_LABEL: &str = "stackdns.io/service";

//------------ ClusterConfig -------------------------------------------------

/// The naming conventions of one cluster.
///
/// The cluster domain is normalized on construction: a trailing dot is
/// accepted and stripped for splitting, and the stored form always carries
/// the trailing dot. The reversed sequence of domain labels prefixes every
/// tree path, so records for the domain `cluster.local` live under the
/// path `local/cluster/...`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClusterConfig {
    /// The cluster domain as a fully-qualified name.
    cluster_domain: String,

    /// The domain labels in path order, i.e., reversed.
    domain_path: Vec<String>,

    /// The subdomain for services, `svc` by convention.
    service_subdomain: String,

    /// The label key carrying the stack name.
    stack_label: String,

    /// The label key carrying the service name.
    service_label: String,
}

impl ClusterConfig {
    /// Creates a configuration for the given cluster domain.
    ///
    /// The remaining conventions start out at their defaults and can be
    /// changed through the `set_*` methods.
    pub fn new(cluster_domain: &str) -> Result<Self, ClusterDomainError> {
        let trimmed = cluster_domain.trim_end_matches('.');
        if trimmed.is_empty() {
            return Err(ClusterDomainError::Empty);
        }
        let mut domain_path = Vec::new();
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(ClusterDomainError::EmptyLabel);
            }
            domain_path.push(label.to_string());
        }
        domain_path.reverse();
        Ok(ClusterConfig {
            cluster_domain: format!("{}.", trimmed),
            domain_path,
            service_subdomain: DEFAULT_SERVICE_SUBDOMAIN.into(),
            stack_label: DEFAULT_STACK_LABEL.into(),
            service_label: DEFAULT_SERVICE_LABEL.into(),
        })
    }

    /// Replaces the label keys that opt a service into stack naming.
    pub fn set_label_keys(
        &mut self,
        stack_label: impl Into<String>,
        service_label: impl Into<String>,
    ) {
        self.stack_label = stack_label.into();
        self.service_label = service_label.into();
    }

    /// Replaces the subdomain under which services live.
    pub fn set_service_subdomain(&mut self, subdomain: impl Into<String>) {
        self.service_subdomain = subdomain.into();
    }

    /// Returns the cluster domain as a fully-qualified name.
    pub fn cluster_domain(&self) -> &str {
        &self.cluster_domain
    }

    /// Returns the domain labels in path order.
    pub fn domain_path(&self) -> &[String] {
        &self.domain_path
    }

    /// Returns the subdomain under which services live.
    pub fn service_subdomain(&self) -> &str {
        &self.service_subdomain
    }

    /// Returns the label key carrying the stack name.
    pub fn stack_label(&self) -> &str {
        &self.stack_label
    }

    /// Returns the label key carrying the service name.
    pub fn service_label(&self) -> &str {
        &self.service_label
    }

    //--- Path construction

    /// Returns the path of the namespace node for `namespace`.
    ///
    /// All records of the namespace live below this path.
    pub fn namespace_path(&self, namespace: &str) -> DomainPath {
        let mut path = DomainPath::from_segments(self.domain_path.iter().cloned());
        path.push(self.service_subdomain.as_str());
        path.push(namespace);
        path
    }

    /// Returns the path of the stack node for `stack` in `namespace`.
    ///
    /// This is where a labeled service's subtree is grafted, keyed by the
    /// service label.
    pub fn stack_path(&self, namespace: &str, stack: &str) -> DomainPath {
        let mut path = self.namespace_path(namespace);
        path.push(stack);
        path
    }

    /// Returns the path used when removing a labeled service.
    ///
    /// Note the segment order: the service label comes before the stack
    /// label, the reverse of the nesting used on insertion.
    pub fn removal_path(
        &self,
        namespace: &str,
        service: &str,
        stack: &str,
    ) -> DomainPath {
        let mut path = self.namespace_path(namespace);
        path.push(service);
        path.push(stack);
        path
    }

    //--- Name construction

    /// Builds a name under the stack naming scheme.
    ///
    /// The name is composed from the domain labels, the service subdomain,
    /// the namespace and the given subpath segments, reversed into DNS
    /// label order.
    pub fn stack_fqdn(&self, namespace: &str, subpaths: &[&str]) -> Fqdn {
        let mut segments: Vec<&str> =
            self.domain_path.iter().map(String::as_str).collect();
        segments.push(&self.service_subdomain);
        segments.push(namespace);
        segments.extend_from_slice(subpaths);
        compose_fqdn(&segments)
    }

    /// Builds a name under the native naming scheme.
    ///
    /// Unlike [`stack_fqdn`][Self::stack_fqdn], the service's own name is
    /// part of the path, directly below the namespace.
    pub fn service_fqdn(
        &self,
        namespace: &str,
        service_name: &str,
        subpaths: &[&str],
    ) -> Fqdn {
        let mut segments: Vec<&str> =
            self.domain_path.iter().map(String::as_str).collect();
        segments.push(&self.service_subdomain);
        segments.push(namespace);
        segments.push(service_name);
        segments.extend_from_slice(subpaths);
        compose_fqdn(&segments)
    }

    /// Returns the host name SRV records of a service point at.
    pub fn srv_target(&self, namespace: &str, service_name: &str) -> String {
        format!(
            "{}.{}.{}.{}",
            service_name, namespace, self.service_subdomain, self.cluster_domain
        )
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        match Self::new(DEFAULT_CLUSTER_DOMAIN) {
            Ok(config) => config,
            Err(_) => unreachable!(),
        }
    }
}

//------------ ClusterDomainError --------------------------------------------

/// A cluster domain could not be used for configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClusterDomainError {
    /// The domain was empty or consisted only of dots.
    Empty,

    /// The domain contained an empty label, e.g. `cluster..local`.
    EmptyLabel,
}

impl fmt::Display for ClusterDomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterDomainError::Empty => {
                f.write_str("cluster domain is empty")
            }
            ClusterDomainError::EmptyLabel => {
                f.write_str("cluster domain contains an empty label")
            }
        }
    }
}

impl error::Error for ClusterDomainError {}

//============ Tests =========================================================
