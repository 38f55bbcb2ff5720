use serde::{Deserialize, Serialize};

/// A domain as handed over by the persistence layer.
///
/// `name` is fully qualified without the trailing dot. The owner is carried
/// along for the caller's benefit; nothing in this crate inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub owner: String,
}

impl Domain {
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
        }
    }

    /// Fully qualified name with exactly one trailing dot
    pub fn fqdn(&self) -> String {
        format!("{}.", self.name.trim_end_matches('.'))
    }
}

/// An RRset as exposed by the API, relative to its domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rrset {
    /// Owner name relative to the domain, `""` for the apex
    pub subname: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub records: Vec<String>,
    pub ttl: u32,
}

impl Rrset {
    pub fn new(
        subname: impl Into<String>,
        rtype: impl Into<String>,
        records: Vec<String>,
        ttl: u32,
    ) -> Self {
        Self {
            subname: subname.into(),
            rtype: rtype.into(),
            records,
            ttl,
        }
    }

    /// Fully qualified owner name within `domain`, with trailing dot
    pub fn owner_name(&self, domain: &Domain) -> String {
        if self.subname.is_empty() {
            domain.fqdn()
        } else {
            format!("{}.{}", self.subname, domain.fqdn())
        }
    }
}

/// Public DNSSEC key material suitable for DS publication at the parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnssecKey {
    pub dnskey: String,
    pub ds: Vec<String>,
    pub flags: u16,
    pub keytype: String,
}
