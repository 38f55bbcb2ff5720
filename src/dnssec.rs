use crate::error::{Result, SyncError};
use crate::model::{DnssecKey, Domain};
use crate::transport::{PdnsClient, ServerRole};
use crate::zone::zone_path;
use serde_json::Value;
use tracing::debug;

/// Key types whose DS records are meant for the parent zone
pub const EXPOSED_KEYTYPES: [&str; 2] = ["csk", "ksk"];

fn is_exposed(key: &Value) -> bool {
    let active = key.get("active").and_then(Value::as_bool).unwrap_or(false);
    let keytype = key.get("keytype").and_then(Value::as_str).unwrap_or("");
    active && EXPOSED_KEYTYPES.contains(&keytype)
}

/// Keep active KSKs and CSKs, reduced to their public fields, in server order
pub fn exposed_keys(keys: Vec<Value>) -> Result<Vec<DnssecKey>> {
    keys.into_iter()
        .filter(is_exposed)
        .map(|key| serde_json::from_value(key).map_err(SyncError::from))
        .collect()
}

impl PdnsClient {
    /// DNSSEC keys of `domain` that may be published as DS at the parent
    pub async fn get_keys(&self, domain: &Domain) -> Result<Vec<DnssecKey>> {
        let path = format!("{}/cryptokeys", zone_path(&domain.name)?);
        let keys: Vec<Value> = self.get(ServerRole::Editor, &path).await?.json()?;
        let total = keys.len();
        let exposed = exposed_keys(keys)?;
        debug!(zone = %domain.name, total, exposed = exposed.len(), "Fetched DNSSEC keys");
        Ok(exposed)
    }
}
