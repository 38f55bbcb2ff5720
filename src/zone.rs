//! Zone level operations against the authoritative servers.

use crate::error::Result;
use crate::identifier;
use crate::model::Domain;
use crate::transport::{PdnsClient, ServerRole};
use serde_json::{Value, json};
use tracing::info;

/// NSEC3 parameters for new zones: SHA-1, no opt-out, 127 iterations, no salt
pub const NSEC3PARAM: &str = "1 0 127 -";

/// Path of a zone resource, e.g. `/zones/example.com.`
pub fn zone_path(name: &str) -> Result<String> {
    Ok(format!("/zones/{}", identifier::encode(name)?))
}

impl PdnsClient {
    /// Fetch the full zone from the editor, as the server returns it
    pub async fn get_zone(&self, domain: &Domain) -> Result<Value> {
        let path = zone_path(&domain.name)?;
        self.get(ServerRole::Editor, &path).await?.json()
    }

    /// Create a signed native zone on the editor
    pub async fn create_zone_editor(&self, domain: &Domain) -> Result<()> {
        let body = json!({
            "name": domain.fqdn(),
            "kind": "MASTER",
            "dnssec": true,
            "nsec3param": NSEC3PARAM,
            "nameservers": self.config().default_nameservers,
        });
        self.post(ServerRole::Editor, "/zones", &body).await?;
        info!(zone = %domain.name, "Created zone on editor");
        Ok(())
    }

    /// Create the zone on the publisher as a secondary of the configured masters
    pub async fn create_zone_publisher(&self, domain: &Domain) -> Result<()> {
        let body = json!({
            "name": domain.fqdn(),
            "kind": "SLAVE",
            "masters": self.config().publisher_masters,
        });
        self.post(ServerRole::Publisher, "/zones", &body).await?;
        info!(zone = %domain.name, "Created zone on publisher");
        Ok(())
    }

    pub async fn delete_zone(&self, role: ServerRole, domain: &Domain) -> Result<()> {
        let path = zone_path(&domain.name)?;
        self.delete(role, &path).await?;
        info!(zone = %domain.name, role = %role, "Deleted zone");
        Ok(())
    }

    /// Have the editor send NOTIFY for the zone to its secondaries
    pub async fn notify(&self, domain: &Domain) -> Result<()> {
        let path = format!("{}/notify", zone_path(&domain.name)?);
        self.put::<()>(ServerRole::Editor, &path, None).await?;
        Ok(())
    }

    /// Have the publisher transfer the zone from its masters right away
    pub async fn axfr_retrieve(&self, domain: &Domain) -> Result<()> {
        let path = format!("{}/axfr-retrieve", zone_path(&domain.name)?);
        self.put::<()>(ServerRole::Publisher, &path, None).await?;
        Ok(())
    }
}
