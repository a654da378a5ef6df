//! Record synthesis for labeled services.
//!
//! The [`Synthesizer`] turns service and endpoint descriptors into write
//! operations against a [`RecordStore`]. Which records a service gets is
//! decided by its [variant][crate::service::ServiceVariant]:
//!
//! * a headless service gets one address record per endpoint address,
//!   collected into a subtree below its stack node;
//! * a portal service gets a single address record for its virtual IP plus
//!   one SRV record per named, protocoled port, again as one subtree;
//! * an external name service gets a single alias entry directly on its
//!   stack node.
//!
//! Every operation starts by reading the stack and service labels off the
//! service. A service without both labels has not opted in and every entry
//! point returns without touching the store. That is the only way an
//! operation can do nothing; none of them can fail.
//!
//! Subtrees are built from scratch on every call and grafted over whatever
//! was stored before, so repeating or reordering calls for one service
//! converges on the same tree.

use tracing::debug;

use crate::config::ClusterConfig;
use crate::fqdn::DomainPath;
use crate::record::{encode_target, RecordEntry, RecordValue};
use crate::service::{Endpoints, LabelPair, ServiceDescriptor};
use crate::tree::{RecordStore, StoreOp, TreeCache};

//------------ Synthesizer ---------------------------------------------------

/// Builds and commits the records of labeled services.
///
/// The type is a thin wrapper around a [`ClusterConfig`] and therefore
/// cheap to clone. The `add_*` and `remove_service` methods apply to any
/// [`RecordStore`] handed to them; the `*_op` methods prepare the same
/// writes as [`StoreOp`] values for callers that apply operations
/// elsewhere, e.g. by sending them to the store task.
#[derive(Clone, Debug)]
pub struct Synthesizer {
    config: ClusterConfig,
}

impl Synthesizer {
    /// Creates a synthesizer for the given cluster conventions.
    pub fn new(config: ClusterConfig) -> Self {
        Synthesizer { config }
    }

    /// Returns the cluster conventions in use.
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    //--- Entry points

    /// Rebuilds the records of a headless service from its endpoints.
    pub fn add_headless_service<Store: RecordStore>(
        &self,
        store: &mut Store,
        service: &ServiceDescriptor,
        endpoints: &Endpoints,
    ) {
        if let Some(op) = self.headless_op(service, endpoints) {
            store.apply(op);
        }
    }

    /// Rebuilds the records of a portal service from its virtual IP.
    pub fn add_portal_service<Store: RecordStore>(
        &self,
        store: &mut Store,
        service: &ServiceDescriptor,
    ) {
        if let Some(op) = self.portal_op(service) {
            store.apply(op);
        }
    }

    /// Stores the alias entry of an external name service.
    pub fn add_external_name_service<Store: RecordStore>(
        &self,
        store: &mut Store,
        service: &ServiceDescriptor,
    ) {
        if let Some(op) = self.external_name_op(service) {
            store.apply(op);
        }
    }

    /// Removes the records of a service.
    ///
    /// Returns whether anything was deleted. A service without the labels
    /// never had records, so removing it trivially succeeds.
    pub fn remove_service<Store: RecordStore>(
        &self,
        store: &mut Store,
        service: &ServiceDescriptor,
    ) -> bool {
        let Some(labels) = LabelPair::from_service(&self.config, service)
        else {
            return true;
        };
        let path = self.config.removal_path(
            &service.namespace,
            &labels.service,
            &labels.stack,
        );
        let removed = store.delete_path(&path);
        debug!(
            "Removed service {}/{} at path {}: {}",
            service.namespace, service.name, path, removed
        );
        removed
    }

    //--- Operation builders

    /// Prepares the subtree graft for a headless service.
    ///
    /// Every ready endpoint address becomes one address record. The leaf
    /// name is the address's explicit host name if set, otherwise the
    /// hashed target name, so unnamed endpoints stay stable across
    /// rebuilds. Returns `None` if the service has not opted in.
    pub fn headless_op(
        &self,
        service: &ServiceDescriptor,
        endpoints: &Endpoints,
    ) -> Option<StoreOp> {
        let labels = LabelPair::from_service(&self.config, service)?;
        let root = DomainPath::new();
        let mut subtree = TreeCache::new();
        for subset in &endpoints.subsets {
            for address in &subset.addresses {
                let (value, hashed) = encode_target(&address.ip, 0);
                let name = match address.hostname_override() {
                    Some(hostname) => hostname.to_string(),
                    None => hashed,
                };
                let fqdn = self.config.stack_fqdn(
                    &service.namespace,
                    &[&labels.stack, &labels.service, &name],
                );
                subtree.set_entry(
                    &name,
                    RecordEntry::new(value, fqdn),
                    &root,
                );
            }
        }
        Some(self.subtree_op(service, labels, subtree))
    }

    /// Prepares the subtree graft for a portal service.
    ///
    /// The virtual IP becomes a single address record named after its
    /// hashed target. Each port carrying both a name and a protocol adds
    /// an SRV record below the `_protocol/_name` subpath; unnamed ports
    /// are covered by the address record alone. Returns `None` if the
    /// service has not opted in.
    pub fn portal_op(
        &self,
        service: &ServiceDescriptor,
    ) -> Option<StoreOp> {
        let labels = LabelPair::from_service(&self.config, service)?;
        let cluster_ip = service.cluster_ip.as_deref().unwrap_or_default();
        let (value, name) = encode_target(cluster_ip, 0);

        let mut subtree = TreeCache::new();
        let fqdn = self.config.service_fqdn(
            &service.namespace,
            &service.name,
            &[&name],
        );
        subtree.set_entry(
            &name,
            RecordEntry::new(value, fqdn),
            &DomainPath::new(),
        );

        for port in &service.ports {
            if port.name.is_empty() || port.protocol.is_empty() {
                continue;
            }
            let srv_value = RecordValue::new(
                self.config.srv_target(&service.namespace, &service.name),
                port.port,
            );
            let protocol = format!("_{}", port.protocol.to_lowercase());
            let port_name = format!("_{}", port.name);
            let srv_fqdn = self.config.service_fqdn(
                &service.namespace,
                &service.name,
                &[&protocol, &port_name, &name],
            );
            debug!("Added SRV record {:?}", srv_value);
            subtree.set_entry(
                &name,
                RecordEntry::new(srv_value, srv_fqdn),
                &DomainPath::from_segments([protocol, port_name]),
            );
        }
        Some(self.subtree_op(service, labels, subtree))
    }

    /// Prepares the alias entry for an external name service.
    ///
    /// Unlike the other variants this writes a single entry directly on
    /// the stack node, keyed by the service label; no subtree is involved.
    /// Returns `None` if the service has not opted in.
    pub fn external_name_op(
        &self,
        service: &ServiceDescriptor,
    ) -> Option<StoreOp> {
        let labels = LabelPair::from_service(&self.config, service)?;
        let target = service.external_name.as_deref().unwrap_or_default();
        let (value, _) = encode_target(target, 0);
        let fqdn = self
            .config
            .stack_fqdn(&service.namespace, &[&labels.stack]);
        let path = self
            .config
            .stack_path(&service.namespace, &labels.stack);
        debug!(
            "Storing external name entry {} as {} at path {}",
            labels.service, fqdn, path
        );
        Some(StoreOp::SetEntry {
            key: labels.service,
            entry: RecordEntry::new(value, fqdn),
            path,
        })
    }

    /// Prepares the deletion of a service's records.
    ///
    /// The deletion path lists the service label before the stack label,
    /// the reverse of the nesting used on insertion. Returns `None` if the
    /// service has not opted in.
    pub fn removal_op(
        &self,
        service: &ServiceDescriptor,
    ) -> Option<StoreOp> {
        let labels = LabelPair::from_service(&self.config, service)?;
        Some(StoreOp::DeletePath {
            path: self.config.removal_path(
                &service.namespace,
                &labels.service,
                &labels.stack,
            ),
        })
    }

    /// Wraps a finished subtree into the graft replacing the service.
    fn subtree_op(
        &self,
        service: &ServiceDescriptor,
        labels: LabelPair,
        subtree: TreeCache,
    ) -> StoreOp {
        let path = self
            .config
            .stack_path(&service.namespace, &labels.stack);
        StoreOp::SetSubCache {
            key: labels.service,
            subtree,
            path,
        }
    }
}

//============ Tests =========================================================
