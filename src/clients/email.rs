// src/clients/email.rs
//
// Cliente fino do serviço transacional de e-mail (API key). A entrega é
// independente da persistência das notificações: falha aqui nunca desfaz as
// linhas já gravadas, só vira log.

use serde_json::json;

use crate::common::error::AppError;

#[derive(Clone)]
pub struct EmailClient {
    http: reqwest::Client,
    api_key: String,
    from: String,
    base_url: String,
}

impl EmailClient {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
            base_url: "https://api.resend.com".to_string(),
        }
    }

    /// Uma chamada por notificação lógica, com o mesmo payload persistido.
    pub async fn send(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
        topic: &str,
    ) -> Result<(), AppError> {
        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": body,
                "tags": [{ "name": "topic", "value": topic }],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError(format!(
                "envio de e-mail falhou ({status}): {text}"
            )));
        }

        Ok(())
    }
}
