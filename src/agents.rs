//! Agent management under an API-key account.

use crate::api::types::{Agent, AgentList, CreateAgentRequest, CreatedAgent};
use crate::api::{encode_path_segment, ApiClient};
use crate::error::{Result, TetherError};

/// Create, list, and delete agents. Every call sends the key as a bearer token.
#[derive(Clone)]
pub struct AgentRegistry {
    api: ApiClient,
    api_key: String,
}

impl AgentRegistry {
    pub fn new(api: ApiClient, api_key: impl Into<String>) -> Self {
        Self {
            api,
            api_key: api_key.into(),
        }
    }

    fn bearer(&self) -> Result<&str> {
        if self.api_key.is_empty() {
            return Err(TetherError::Unauthorized);
        }
        Ok(&self.api_key)
    }

    /// The returned token is shown once and never again.
    pub async fn create(&self, name: &str, description: &str) -> Result<CreatedAgent> {
        let bearer = self.bearer()?;
        let body = CreateAgentRequest {
            agent_name: name,
            description,
        };
        let created: CreatedAgent = self.api.post_json("/agents", &body, Some(bearer)).await?;
        tracing::info!(id = %created.agent.id, name = %created.agent.agent_name, "agent created");
        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Agent>> {
        let bearer = self.bearer()?;
        let list: AgentList = self.api.get_json("/agents", Some(bearer)).await?;
        let agents = list.into_vec();
        tracing::debug!(count = agents.len(), "agents listed");
        Ok(agents)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let bearer = self.bearer()?;
        let path = format!("/agents/{}", encode_path_segment(id));
        self.api.delete(&path, Some(bearer)).await?;
        tracing::info!(id, "agent deleted");
        Ok(())
    }
}
