//! Conversion between the server's zone RRsets and the API's RRsets.
//!
//! The server names RRsets by their fully qualified owner name with a
//! trailing dot; the API names them by subname relative to the domain.

use crate::error::{Result, SyncError};
use crate::model::{Domain, Rrset};
use crate::transport::{PdnsClient, ServerRole};
use crate::zone::zone_path;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub content: String,
    #[serde(default)]
    pub disabled: bool,
}

/// One RRset as listed in the server's zone representation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerRrset {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub ttl: u32,
    #[serde(default)]
    pub records: Vec<ServerRecord>,
}

/// The part of a zone snapshot the transcoder reads
#[derive(Debug, Clone, Deserialize)]
pub struct ZoneSnapshot {
    #[serde(default)]
    pub rrsets: Vec<ServerRrset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeType {
    Replace,
    Delete,
}

/// One entry of a zone PATCH body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RrsetChange {
    pub name: String,
    #[serde(rename = "type")]
    pub rtype: String,
    pub ttl: u32,
    pub changetype: ChangeType,
    pub records: Vec<ServerRecord>,
}

/// Owner name relative to `domain`.
///
/// The name must be the zone apex or lie strictly below it (ASCII case is
/// ignored); anything else is rejected instead of being cut to a wrong
/// subname.
pub fn subname(name: &str, domain: &Domain) -> Result<String> {
    let zone = domain.fqdn();
    if name.eq_ignore_ascii_case(&zone) {
        return Ok(String::new());
    }

    let foreign = || SyncError::ForeignRrset {
        name: name.to_string(),
        zone: zone.clone(),
    };

    // ".<domain>."
    let suffix_len = zone.len() + 1;
    let split = name.len().checked_sub(suffix_len).ok_or_else(foreign)?;
    let (head, tail) = match (name.get(..split), name.get(split..)) {
        (Some(head), Some(tail)) => (head, tail),
        _ => return Err(foreign()),
    };

    if head.is_empty() || !tail.starts_with('.') || !tail[1..].eq_ignore_ascii_case(&zone) {
        return Err(foreign());
    }

    Ok(head.to_string())
}

/// Convert the server's RRsets of `domain` into API RRsets, keeping their order
pub fn to_api_rrsets(domain: &Domain, rrsets: Vec<ServerRrset>) -> Result<Vec<Rrset>> {
    rrsets
        .into_iter()
        .map(|rrset| -> Result<Rrset> {
            Ok(Rrset {
                subname: subname(&rrset.name, domain)?,
                rtype: rrset.rtype,
                records: rrset.records.into_iter().map(|r| r.content).collect(),
                ttl: rrset.ttl,
            })
        })
        .collect()
}

/// Convert API RRsets into PATCH entries; an RRset without records is deleted
pub fn to_server_rrsets(domain: &Domain, rrsets: &[Rrset]) -> Vec<RrsetChange> {
    rrsets
        .iter()
        .map(|rrset| RrsetChange {
            name: rrset.owner_name(domain),
            rtype: rrset.rtype.clone(),
            ttl: rrset.ttl,
            changetype: if rrset.records.is_empty() {
                ChangeType::Delete
            } else {
                ChangeType::Replace
            },
            records: rrset
                .records
                .iter()
                .map(|content| ServerRecord {
                    content: content.clone(),
                    disabled: false,
                })
                .collect(),
        })
        .collect()
}

#[derive(Serialize)]
struct RrsetPatch<'a> {
    rrsets: &'a [RrsetChange],
}

impl PdnsClient {
    /// Current RRsets of `domain`, read fresh from the editor
    pub async fn get_rrsets(&self, domain: &Domain) -> Result<Vec<Rrset>> {
        let zone = self.get_zone(domain).await?;
        let snapshot: ZoneSnapshot = serde_json::from_value(zone)?;
        let rrsets = to_api_rrsets(domain, snapshot.rrsets)?;
        debug!(zone = %domain.name, count = rrsets.len(), "Fetched RRsets");
        Ok(rrsets)
    }

    /// Write RRsets of `domain` to the editor in a single PATCH
    pub async fn set_rrsets(&self, domain: &Domain, rrsets: &[Rrset]) -> Result<()> {
        let path = zone_path(&domain.name)?;
        let changes = to_server_rrsets(domain, rrsets);
        self.patch(ServerRole::Editor, &path, &RrsetPatch { rrsets: &changes })
            .await?;
        debug!(zone = %domain.name, count = changes.len(), "Updated RRsets");
        Ok(())
    }
}
