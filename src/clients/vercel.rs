// src/clients/vercel.rs
//
// Cliente fino do provedor de deploy: flag de manutenção no Edge Config e
// redirecionamento do domínio custom entre o deployment de manutenção e a
// produção mais recente.

use serde_json::json;

use crate::common::error::AppError;

#[derive(Clone)]
pub struct VercelClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl VercelClient {
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url: "https://api.vercel.com".to_string(),
        }
    }

    /// Lê a flag booleana "maintenance" do Edge Config do projeto.
    pub async fn get_maintenance(&self, edge_config_id: &str) -> Result<bool, AppError> {
        let response = self
            .http
            .get(format!(
                "{}/v1/edge-config/{}/item/maintenance",
                self.base_url, edge_config_id
            ))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let body: serde_json::Value = response.error_for_status()?.json().await?;
        Ok(body["value"].as_bool().unwrap_or(false))
    }

    /// Grava a flag "maintenance" no Edge Config.
    pub async fn set_maintenance(
        &self,
        edge_config_id: &str,
        enabled: bool,
    ) -> Result<(), AppError> {
        self.http
            .patch(format!(
                "{}/v1/edge-config/{}/items",
                self.base_url, edge_config_id
            ))
            .bearer_auth(&self.token)
            .json(&json!({
                "items": [
                    { "operation": "upsert", "key": "maintenance", "value": enabled }
                ]
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Cria o projeto do cliente apontando para o repositório clonado.
    /// Devolve (project_id, edge_config_id).
    pub async fn create_project(
        &self,
        project_name: &str,
        github_repo: &str,
    ) -> Result<(String, String), AppError> {
        let body: serde_json::Value = self
            .http
            .post(format!("{}/v10/projects", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({
                "name": project_name,
                "gitRepository": { "type": "github", "repo": github_repo },
                "framework": "nextjs",
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let project_id = body["id"]
            .as_str()
            .ok_or_else(|| AppError::UpstreamError("resposta sem id de projeto".into()))?
            .to_string();

        let edge: serde_json::Value = self
            .http
            .post(format!("{}/v1/edge-config", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "slug": project_name }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let edge_config_id = edge["id"]
            .as_str()
            .ok_or_else(|| AppError::UpstreamError("resposta sem id de edge config".into()))?
            .to_string();

        Ok((project_id, edge_config_id))
    }

    /// Aponta o domínio custom para o deployment de manutenção ou de volta
    /// para a última produção.
    pub async fn redirect_domain(
        &self,
        project_id: &str,
        domain: &str,
        to_maintenance: bool,
    ) -> Result<(), AppError> {
        self.http
            .patch(format!(
                "{}/v9/projects/{}/domains/{}",
                self.base_url, project_id, domain
            ))
            .bearer_auth(&self.token)
            .json(&json!({
                "gitBranch": if to_maintenance { "maintenance" } else { "main" },
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), AppError> {
        self.http
            .delete(format!("{}/v9/projects/{}", self.base_url, project_id))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
