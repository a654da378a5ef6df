//! Service and endpoint descriptors.
//!
//! These types mirror what the cluster control plane reports about a
//! service: its metadata including the label map, the assigned virtual IP
//! or external name, its ports, and for headless services the endpoint
//! addresses backing it. The descriptors deliberately carry only the fields
//! record synthesis looks at.
//!
//! Whether a service takes part in stack naming at all is decided by
//! [`LabelPair::from_service`]: only services carrying both configured
//! label keys do. A missing key is not an error, the service simply is not
//! ours to name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ClusterConfig;

/// The cluster IP value marking a service as headless.
const CLUSTER_IP_NONE: &str = "None";

//------------ ServiceDescriptor ---------------------------------------------

/// What the control plane knows about one service.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServiceDescriptor {
    /// The namespace the service lives in.
    pub namespace: String,

    /// The service's own name.
    pub name: String,

    /// The service's label map.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// The assigned virtual IP, if any.
    ///
    /// The control plane reports the literal `"None"` for headless
    /// services and may leave the field unset on fresh objects.
    #[serde(default)]
    pub cluster_ip: Option<String>,

    /// The external host name for alias services.
    #[serde(default)]
    pub external_name: Option<String>,

    /// The service's ports.
    #[serde(default)]
    pub ports: Vec<ServicePort>,
}

impl ServiceDescriptor {
    /// Returns whether a usable virtual IP is assigned.
    ///
    /// Both an unset field and the literal `"None"` count as no IP.
    pub fn has_cluster_ip(&self) -> bool {
        match self.cluster_ip.as_deref() {
            Some(ip) => !ip.is_empty() && ip != CLUSTER_IP_NONE,
            None => false,
        }
    }

    /// Returns which record synthesis variant applies to the service.
    pub fn variant(&self) -> ServiceVariant {
        let external = self
            .external_name
            .as_deref()
            .map_or(false, |name| !name.is_empty());
        if external {
            ServiceVariant::ExternalName
        } else if self.has_cluster_ip() {
            ServiceVariant::Portal
        } else {
            ServiceVariant::Headless
        }
    }
}

//------------ ServicePort ---------------------------------------------------

/// One port of a service.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ServicePort {
    /// The port's name. May be empty for single-port services.
    #[serde(default)]
    pub name: String,

    /// The transport protocol, e.g. `TCP`.
    #[serde(default)]
    pub protocol: String,

    /// The port number.
    pub port: u16,
}

impl ServicePort {
    /// Creates a port from its parts.
    pub fn new(
        name: impl Into<String>,
        protocol: impl Into<String>,
        port: u16,
    ) -> Self {
        ServicePort {
            name: name.into(),
            protocol: protocol.into(),
            port,
        }
    }
}

//------------ ServiceVariant ------------------------------------------------

/// The record synthesis variant applying to a service.
///
/// An external name takes precedence over an assigned IP; a service with
/// neither is headless.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ServiceVariant {
    /// No virtual IP, records come from the endpoint addresses.
    Headless,

    /// A virtual IP is assigned and answers for the whole service.
    Portal,

    /// The service is an alias for a name outside the cluster.
    ExternalName,
}

//------------ Endpoints -----------------------------------------------------

/// The endpoint addresses backing a headless service.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Endpoints {
    /// The subsets the control plane groups the addresses into.
    #[serde(default)]
    pub subsets: Vec<EndpointSubset>,
}

//------------ EndpointSubset ------------------------------------------------

/// One group of endpoint addresses.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EndpointSubset {
    /// The ready addresses of the subset.
    #[serde(default)]
    pub addresses: Vec<EndpointAddress>,
}

//------------ EndpointAddress -----------------------------------------------

/// A single endpoint address.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EndpointAddress {
    /// The address itself.
    pub ip: String,

    /// An explicit host name for the address, if one was set.
    #[serde(default)]
    pub hostname: Option<String>,
}

impl EndpointAddress {
    /// Creates an address without a host name.
    pub fn new(ip: impl Into<String>) -> Self {
        EndpointAddress {
            ip: ip.into(),
            hostname: None,
        }
    }

    /// Creates an address with an explicit host name.
    pub fn with_hostname(
        ip: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        EndpointAddress {
            ip: ip.into(),
            hostname: Some(hostname.into()),
        }
    }

    /// Returns the explicit host name if one is set and non-empty.
    pub fn hostname_override(&self) -> Option<&str> {
        self.hostname.as_deref().filter(|name| !name.is_empty())
    }
}

//------------ LabelPair -----------------------------------------------------

/// The two label values opting a service into stack naming.
///
/// The values are taken verbatim from the label map. Nothing is trimmed,
/// escaped or validated beyond the presence of both keys.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LabelPair {
    /// The stack the service belongs to.
    pub stack: String,

    /// The service's name within its stack.
    pub service: String,
}

impl LabelPair {
    /// Reads the configured label keys off a service.
    ///
    /// Returns `None` if either key is absent. That service has not opted
    /// into stack naming and every synthesis operation skips it.
    pub fn from_service(
        config: &ClusterConfig,
        service: &ServiceDescriptor,
    ) -> Option<Self> {
        let stack = service.labels.get(config.stack_label())?;
        let name = service.labels.get(config.service_label())?;
        Some(LabelPair {
            stack: stack.clone(),
            service: name.clone(),
        })
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn mk_service(
        cluster_ip: Option<&str>,
        external_name: Option<&str>,
    ) -> ServiceDescriptor {
        ServiceDescriptor {
            namespace: "prod".into(),
            name: "db-0".into(),
            cluster_ip: cluster_ip.map(Into::into),
            external_name: external_name.map(Into::into),
            ..Default::default()
        }
    }

    #[rstest]
    #[case(None, None, ServiceVariant::Headless)]
    #[case(Some("None"), None, ServiceVariant::Headless)]
    #[case(Some(""), None, ServiceVariant::Headless)]
    #[case(Some("10.3.0.10"), None, ServiceVariant::Portal)]
    #[case(Some("10.3.0.10"), Some("db.example.com"), ServiceVariant::ExternalName)]
    #[case(None, Some("db.example.com"), ServiceVariant::ExternalName)]
    #[case(None, Some(""), ServiceVariant::Headless)]
    fn variant_classification(
        #[case] cluster_ip: Option<&str>,
        #[case] external_name: Option<&str>,
        #[case] expected: ServiceVariant,
    ) {
        let service = mk_service(cluster_ip, external_name);
        assert_eq!(service.variant(), expected);
    }

    #[test]
    fn hostname_override_requires_a_non_empty_name() {
        assert_eq!(EndpointAddress::new("10.1.1.1").hostname_override(), None);
        assert_eq!(
            EndpointAddress::with_hostname("10.1.1.1", "")
                .hostname_override(),
            None
        );
        assert_eq!(
            EndpointAddress::with_hostname("10.1.1.1", "db-0")
                .hostname_override(),
            Some("db-0")
        );
    }

    #[test]
    fn label_pair_requires_both_keys() {
        let config = ClusterConfig::default();
        let mut service = mk_service(None, None);
        assert_eq!(LabelPair::from_service(&config, &service), None);

        service
            .labels
            .insert(config.stack_label().into(), "billing".into());
        assert_eq!(LabelPair::from_service(&config, &service), None);

        service
            .labels
            .insert(config.service_label().into(), "db".into());
        assert_eq!(
            LabelPair::from_service(&config, &service),
            Some(LabelPair {
                stack: "billing".into(),
                service: "db".into()
            })
        );
    }

    #[test]
    fn label_values_are_taken_verbatim() {
        let config = ClusterConfig::default();
        let mut service = mk_service(None, None);
        service
            .labels
            .insert(config.stack_label().into(), " Billing ".into());
        service.labels.insert(config.service_label().into(), "".into());

        // Presence of the keys is all that counts; the values pass
        // through untouched, even an empty one.
        let labels = LabelPair::from_service(&config, &service).unwrap();
        assert_eq!(labels.stack, " Billing ");
        assert_eq!(labels.service, "");
    }
}
