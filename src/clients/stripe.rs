// src/clients/stripe.rs
//
// Provedor de pagamentos via REST, sem SDK. Só o que o webhook precisa:
// verificação da assinatura (HMAC-SHA256, esquema t= / v1=).

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::common::error::AppError;

/// Verifica o header de assinatura do webhook contra o segredo compartilhado.
/// Rejeita também eventos com mais de 5 minutos (replay).
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), AppError> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err(AppError::InvalidWebhookSignature);
    }

    let signed_payload = format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap_or(""));
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::InvalidWebhookSignature)?;
    mac.update(signed_payload.as_bytes());

    // Comparação em tempo constante via verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| AppError::InvalidWebhookSignature)?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| AppError::InvalidWebhookSignature)?;

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| AppError::InvalidWebhookSignature)?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > 300 {
        return Err(AppError::InvalidWebhookSignature);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &[u8], secret: &str, ts: i64) -> String {
        let signed = format!("{ts}.{}", std::str::from_utf8(payload).unwrap());
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        format!("t={ts},v1={sig}")
    }

    #[test]
    fn accepts_a_freshly_signed_payload() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = sign(payload, "whsec_test", chrono::Utc::now().timestamp());
        assert!(verify_webhook_signature(payload, &header, "whsec_test").is_ok());
    }

    #[test]
    fn rejects_wrong_secret_and_stale_timestamp() {
        let payload = br#"{"id":"evt_1"}"#;
        let now = chrono::Utc::now().timestamp();

        let header = sign(payload, "whsec_other", now);
        assert!(verify_webhook_signature(payload, &header, "whsec_test").is_err());

        let stale = sign(payload, "whsec_test", now - 600);
        assert!(verify_webhook_signature(payload, &stale, "whsec_test").is_err());
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(verify_webhook_signature(b"{}", "garbage", "whsec_test").is_err());
    }
}
