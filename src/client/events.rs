use reqwest::Method;

use super::{ClientError, RegistryClient};
use crate::models::{CreatedResponse, EventRecord, EventRequest};

impl RegistryClient {
    /// Event subscriptions registered on a namespace
    pub async fn list_events(&self, namespace: &str) -> Result<Vec<EventRecord>, ClientError> {
        let url = self.url(&format!("events/{}", namespace))?;
        let response = self
            .send(self.request(Method::GET, url), "list events")
            .await?;
        Ok(response.json().await?)
    }

    /// Register a subscription, returning the id the registry assigned
    pub async fn create_event(
        &self,
        namespace: &str,
        event: &EventRequest,
    ) -> Result<CreatedResponse, ClientError> {
        let url = self.url(&format!("events/{}", namespace))?;
        let response = self
            .send(self.request(Method::POST, url).json(event), "create event")
            .await?;
        Ok(response.json().await?)
    }

    pub async fn update_event(
        &self,
        namespace: &str,
        id: &str,
        event: &EventRequest,
    ) -> Result<CreatedResponse, ClientError> {
        let url = self.url(&format!("events/{}/{}", namespace, id))?;
        let response = self
            .send(self.request(Method::PUT, url).json(event), "update event")
            .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_event(&self, namespace: &str, id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("events/{}/{}", namespace, id))?;
        self.send(self.request(Method::DELETE, url), "delete event")
            .await?;
        Ok(())
    }
}
