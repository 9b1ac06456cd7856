// src/clients/github.rs
//
// Cliente fino da hospedagem de código: clona o repositório-template por
// cliente, reescreve os placeholders conhecidos e pode apagar o repositório
// no desprovisionamento.

use serde_json::json;

use crate::common::error::AppError;

// Arquivos do template que carregam placeholders {{CLIENT_NAME}} / {{PROJECT_NAME}}
const TEMPLATE_FILES: &[&str] = &["README.md", "site.config.json", ".env.production"];

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    token: String,
    owner: String,
    template_repo: String,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: String, owner: String, template_repo: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            owner,
            template_repo,
            base_url: "https://api.github.com".to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("User-Agent", "hr-backend")
            .header("Accept", "application/vnd.github+json")
    }

    /// Reescreve os tokens de placeholder do template.
    pub fn fill_placeholders(content: &str, client_name: &str, project_name: &str) -> String {
        content
            .replace("{{CLIENT_NAME}}", client_name)
            .replace("{{PROJECT_NAME}}", project_name)
    }

    /// Gera o repositório do cliente a partir do template e reescreve os
    /// placeholders nos arquivos conhecidos. Devolve "owner/repo".
    pub async fn clone_template(
        &self,
        client_name: &str,
        project_name: &str,
    ) -> Result<String, AppError> {
        // 1. Generate a partir do template
        self.request(
            reqwest::Method::POST,
            format!("/repos/{}/{}/generate", self.owner, self.template_repo),
        )
        .json(&json!({
            "owner": self.owner,
            "name": project_name,
            "private": true,
        }))
        .send()
        .await?
        .error_for_status()?;

        let full_name = format!("{}/{}", self.owner, project_name);

        // 2. Reescreve os placeholders arquivo a arquivo
        for file in TEMPLATE_FILES {
            if let Err(e) = self.rewrite_file(&full_name, file, client_name, project_name).await {
                // Arquivo ausente no template não é fatal
                tracing::warn!(file = file, "Falha ao reescrever placeholder: {}", e);
            }
        }

        Ok(full_name)
    }

    async fn rewrite_file(
        &self,
        full_name: &str,
        path: &str,
        client_name: &str,
        project_name: &str,
    ) -> Result<(), AppError> {
        use base64::Engine as _;
        use base64::engine::general_purpose::STANDARD as BASE64;

        let body: serde_json::Value = self
            .request(
                reqwest::Method::GET,
                format!("/repos/{}/contents/{}", full_name, path),
            )
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let sha = body["sha"]
            .as_str()
            .ok_or_else(|| AppError::UpstreamError("conteúdo sem sha".into()))?;
        let encoded = body["content"].as_str().unwrap_or_default().replace('\n', "");
        let content = BASE64
            .decode(&encoded)
            .map_err(|e| AppError::UpstreamError(format!("base64 inválido: {e}")))?;
        let content = String::from_utf8_lossy(&content);

        let rewritten = Self::fill_placeholders(&content, client_name, project_name);
        if rewritten == content {
            return Ok(());
        }

        self.request(
            reqwest::Method::PUT,
            format!("/repos/{}/contents/{}", full_name, path),
        )
        .json(&json!({
            "message": format!("chore: configura {}", project_name),
            "content": BASE64.encode(rewritten.as_bytes()),
            "sha": sha,
        }))
        .send()
        .await?
        .error_for_status()?;

        Ok(())
    }

    pub async fn delete_repo(&self, full_name: &str) -> Result<(), AppError> {
        self.request(reqwest::Method::DELETE, format!("/repos/{}", full_name))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_known_placeholder() {
        let template = r#"{"name":"{{PROJECT_NAME}}","client":"{{CLIENT_NAME}}"}"#;
        let filled = GithubClient::fill_placeholders(template, "Da Mario", "da-mario");
        assert_eq!(filled, r#"{"name":"da-mario","client":"Da Mario"}"#);
        assert!(!filled.contains("{{"));
    }
}
