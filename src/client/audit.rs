use reqwest::Method;

use super::{ClientError, RegistryClient};
use crate::models::{AuditQuery, AuditRecord};

impl RegistryClient {
    /// Audit records matching `query`, newest first as returned by the registry
    pub async fn list_audit_logs(&self, query: &AuditQuery) -> Result<Vec<AuditRecord>, ClientError> {
        let mut url = self.url("audit")?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query.to_pairs() {
                pairs.append_pair(name, &value);
            }
        }
        let response = self
            .send(self.request(Method::GET, url), "list audit logs")
            .await?;
        Ok(response.json().await?)
    }
}
