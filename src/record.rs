//! Record values and target encoding.
//!
//! A stored record is a [`RecordEntry`]: the payload in the resolver's
//! exchange format plus the name the record answers for. Payloads are built
//! through [`encode_target`] which also derives the synthetic leaf name
//! used whenever no explicit name is available, by hashing the target. Equal
//! targets therefore always land on the same leaf and re-adding a record is
//! naturally idempotent.

use serde::{Deserialize, Serialize};

use crate::fqdn::Fqdn;

/// The priority assigned to every synthesized record.
const DEFAULT_PRIORITY: u16 = 10;

/// The weight assigned to every synthesized record.
const DEFAULT_WEIGHT: u16 = 10;

/// The TTL in seconds assigned to every synthesized record.
const DEFAULT_TTL: u32 = 30;

//------------ RecordValue ---------------------------------------------------

/// The payload of one synthesized record.
///
/// The host carries an IP address for address records and a host name for
/// CNAME and SRV records. Priority, weight and TTL are fixed; only SRV
/// records put the port to use.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordValue {
    host: String,
    port: u16,
    priority: u16,
    weight: u16,
    ttl: u32,
}

impl RecordValue {
    /// Creates a value for the given target host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        RecordValue {
            host: host.into(),
            port,
            priority: DEFAULT_PRIORITY,
            weight: DEFAULT_WEIGHT,
            ttl: DEFAULT_TTL,
        }
    }

    /// Returns the target host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the target port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the record priority.
    pub fn priority(&self) -> u16 {
        self.priority
    }

    /// Returns the record weight.
    pub fn weight(&self) -> u16 {
        self.weight
    }

    /// Returns the TTL in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }
}

//------------ RecordEntry ---------------------------------------------------

/// One stored record: the payload plus the name it answers for.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordEntry {
    value: RecordValue,
    fqdn: Fqdn,
}

impl RecordEntry {
    /// Creates an entry from a payload and its name.
    pub fn new(value: RecordValue, fqdn: Fqdn) -> Self {
        RecordEntry { value, fqdn }
    }

    /// Returns the payload.
    pub fn value(&self) -> &RecordValue {
        &self.value
    }

    /// Returns the name the record answers for.
    pub fn fqdn(&self) -> &Fqdn {
        &self.fqdn
    }
}

//------------ encode_target -------------------------------------------------

/// Builds the record value for a target and derives its leaf name.
///
/// The leaf name is the lowercase hex form, without leading zeroes, of the
/// 32-bit FNV-1a hash of `"<host>:<port>"`. The port doubles as a
/// disambiguation index and is zero for every record that is not an SRV
/// record.
pub fn encode_target(host: &str, port: u16) -> (RecordValue, String) {
    let name = format!("{:x}", fnv32a(&format!("{}:{}", host, port)));
    (RecordValue::new(host, port), name)
}

/// Returns the 32-bit FNV-1a hash of `input`.
fn fnv32a(input: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for octet in input.as_bytes() {
        hash ^= u32::from(*octet);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fqdn::compose_fqdn;

    #[test]
    fn values_carry_the_fixed_defaults() {
        let value = RecordValue::new("10.3.0.1", 0);
        assert_eq!(value.host(), "10.3.0.1");
        assert_eq!(value.port(), 0);
        assert_eq!(value.priority(), 10);
        assert_eq!(value.weight(), 10);
        assert_eq!(value.ttl(), 30);
    }

    #[test]
    fn fnv32a_matches_the_reference_vectors() {
        assert_eq!(fnv32a(""), 0x811c_9dc5);
        assert_eq!(fnv32a("a"), 0xe40c_292c);
        assert_eq!(fnv32a("foobar"), 0xbf9c_f968);
    }

    #[test]
    fn leaf_names_are_stable_and_distinguish_targets() {
        let (_, first) = encode_target("10.3.0.1", 0);
        let (_, again) = encode_target("10.3.0.1", 0);
        assert_eq!(first, again);

        let (_, other_host) = encode_target("10.3.0.2", 0);
        let (_, other_port) = encode_target("10.3.0.1", 1);
        assert_ne!(first, other_host);
        assert_ne!(first, other_port);
    }

    #[test]
    fn leaf_names_are_lowercase_hex() {
        let (_, name) = encode_target("endpoint.example.com", 53);
        assert!(!name.is_empty());
        assert!(name
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn entries_round_trip_through_json() {
        let fqdn = compose_fqdn(&["local", "cluster", "svc", "prod", "db"]);
        let (value, _) = encode_target("10.3.0.1", 0);
        let entry = RecordEntry::new(value, fqdn);
        let json = serde_json::to_string(&entry).unwrap();
        let back: RecordEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
