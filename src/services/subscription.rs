// src/services/subscription.rs
//
// Redutor de status de assinatura: traduz eventos de webhook do provedor de
// pagamentos no próximo estado persistido do assinante. Função pura de
// (estado atual, evento, agora) → patch; o handler do webhook só aplica.

use chrono::{DateTime, Months, TimeDelta, Utc};
use rust_decimal::Decimal;

use crate::models::subscriber::{BillingInterval, SubscriptionStatus};

/// Dados de um invoice para o ledger de pagamentos.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInfo {
    /// Payment intent do provedor, chave de idempotência do ledger.
    pub payment_intent_id: String,
    pub amount: Decimal,
    pub currency: String,
}

/// Evento fechado, convertido do JSON do provedor na borda do webhook.
/// Sacos de campos opcionais não entram na lógica de negócio.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionEvent {
    SubscriptionCreated {
        provider_status: String,
        current_period_end: Option<DateTime<Utc>>,
        trial_end: Option<DateTime<Utc>>,
        created: DateTime<Utc>,
    },
    SubscriptionUpdated {
        provider_status: String,
        current_period_end: Option<DateTime<Utc>>,
    },
    SubscriptionDeleted,
    InvoicePaymentSucceeded {
        current_period_end: Option<DateTime<Utc>>,
        payment: Option<PaymentInfo>,
    },
    InvoicePaymentFailed {
        payment: Option<PaymentInfo>,
    },
}

/// O subconjunto do assinante que o redutor lê.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingState {
    pub status: SubscriptionStatus,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub interval: BillingInterval,
}

/// O que o redutor manda persistir.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingPatch {
    pub status: SubscriptionStatus,
    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_payment_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Mapeia 1:1 o enum do provedor. Status desconhecido vira PENDING/inativo em
/// vez de erro: nunca bloqueamos o ack do webhook por um valor novo do
/// provedor.
pub fn map_provider_status(status: &str) -> SubscriptionStatus {
    match status {
        "active" => SubscriptionStatus::Active,
        "past_due" => SubscriptionStatus::PastDue,
        "canceled" | "unpaid" => SubscriptionStatus::Canceled,
        "paused" => SubscriptionStatus::Paused,
        other => {
            tracing::warn!(provider_status = other, "Status de assinatura desconhecido, usando PENDING");
            SubscriptionStatus::Pending
        }
    }
}

/// Soma um intervalo de cobrança (dia/mês/ano) a um instante, fallback quando
/// o provedor não informa o fim do período corrente.
pub fn add_billing_interval(interval: BillingInterval, from: DateTime<Utc>) -> DateTime<Utc> {
    match interval {
        BillingInterval::Day => from + TimeDelta::days(1),
        BillingInterval::Month => from
            .checked_add_months(Months::new(1))
            .unwrap_or(from + TimeDelta::days(30)),
        BillingInterval::Year => from
            .checked_add_months(Months::new(12))
            .unwrap_or(from + TimeDelta::days(365)),
    }
}

pub fn reduce(
    current: &BillingState,
    event: &SubscriptionEvent,
    now: DateTime<Utc>,
) -> BillingPatch {
    match event {
        SubscriptionEvent::SubscriptionCreated {
            provider_status,
            current_period_end,
            trial_end,
            created,
        } => {
            // fim do período > fim do trial > criação + 1 intervalo
            let next_billing = current_period_end
                .or(*trial_end)
                .unwrap_or_else(|| add_billing_interval(current.interval, *created));

            if provider_status == "active" {
                BillingPatch {
                    status: SubscriptionStatus::Active,
                    next_billing_date: Some(next_billing),
                    // fallback: refinado pelo primeiro invoice pago
                    last_payment_date: Some(*created),
                    is_active: true,
                }
            } else {
                BillingPatch {
                    status: SubscriptionStatus::PastDue,
                    next_billing_date: Some(next_billing),
                    last_payment_date: current.last_payment_date,
                    is_active: false,
                }
            }
        }

        SubscriptionEvent::SubscriptionUpdated {
            provider_status,
            current_period_end,
        } => {
            let status = map_provider_status(provider_status);
            BillingPatch {
                status,
                next_billing_date: current_period_end.or(current.next_billing_date),
                last_payment_date: current.last_payment_date,
                is_active: status == SubscriptionStatus::Active,
            }
        }

        // Sempre CANCELED + inativo, independente do estado anterior
        SubscriptionEvent::SubscriptionDeleted => BillingPatch {
            status: SubscriptionStatus::Canceled,
            next_billing_date: current.next_billing_date,
            last_payment_date: current.last_payment_date,
            is_active: false,
        },

        SubscriptionEvent::InvoicePaymentSucceeded {
            current_period_end, ..
        } => BillingPatch {
            status: SubscriptionStatus::Active,
            next_billing_date: current_period_end.or(current.next_billing_date),
            last_payment_date: Some(now),
            is_active: true,
        },

        SubscriptionEvent::InvoicePaymentFailed { .. } => BillingPatch {
            status: SubscriptionStatus::PastDue,
            next_billing_date: current.next_billing_date,
            last_payment_date: current.last_payment_date,
            is_active: false,
        },
    }
}

impl BillingPatch {
    /// Estado resultante da aplicação do patch, útil para reaplicar eventos.
    pub fn apply(&self, current: &BillingState) -> BillingState {
        BillingState {
            status: self.status,
            next_billing_date: self.next_billing_date,
            last_payment_date: self.last_payment_date,
            is_active: self.is_active,
            interval: current.interval,
        }
    }
}

// =============================================================================
//  CONVERSÃO DA BORDA (JSON do provedor → evento fechado)
// =============================================================================

fn epoch_to_utc(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    value.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn invoice_payment_info(object: &serde_json::Value, succeeded: bool) -> Option<PaymentInfo> {
    let payment_intent_id = object["payment_intent"].as_str()?.to_string();
    let cents = if succeeded {
        object["amount_paid"].as_i64().unwrap_or(0)
    } else {
        object["amount_due"].as_i64().unwrap_or(0)
    };
    Some(PaymentInfo {
        payment_intent_id,
        // o provedor manda centavos
        amount: Decimal::new(cents, 2),
        currency: object["currency"].as_str().unwrap_or("eur").to_string(),
    })
}

/// Converte (event.type, data.object) no evento fechado. `None` = tipo de
/// evento que não tratamos (o webhook responde 200 mesmo assim).
pub fn parse_event(
    event_type: &str,
    object: &serde_json::Value,
) -> Option<SubscriptionEvent> {
    match event_type {
        "customer.subscription.created" => Some(SubscriptionEvent::SubscriptionCreated {
            provider_status: object["status"].as_str().unwrap_or("").to_string(),
            current_period_end: epoch_to_utc(&object["current_period_end"]),
            trial_end: epoch_to_utc(&object["trial_end"]),
            created: epoch_to_utc(&object["created"]).unwrap_or_else(Utc::now),
        }),
        "customer.subscription.updated" => Some(SubscriptionEvent::SubscriptionUpdated {
            provider_status: object["status"].as_str().unwrap_or("").to_string(),
            current_period_end: epoch_to_utc(&object["current_period_end"]),
        }),
        "customer.subscription.deleted" => Some(SubscriptionEvent::SubscriptionDeleted),
        "invoice.payment_succeeded" => Some(SubscriptionEvent::InvoicePaymentSucceeded {
            current_period_end: object
                .get("lines")
                .and_then(|l| l.get("data"))
                .and_then(|d| d.as_array())
                .and_then(|a| a.first())
                .and_then(|line| line.get("period"))
                .and_then(|p| epoch_to_utc(&p["end"])),
            payment: invoice_payment_info(object, true),
        }),
        "invoice.payment_failed" => Some(SubscriptionEvent::InvoicePaymentFailed {
            payment: invoice_payment_info(object, false),
        }),
        _ => None,
    }
}

/// Id da assinatura referenciado pelo evento (campo diferente em eventos de
/// assinatura e de invoice).
pub fn subscription_id_of(event_type: &str, object: &serde_json::Value) -> Option<String> {
    if event_type.starts_with("customer.subscription.") {
        object["id"].as_str().map(String::from)
    } else {
        object["subscription"].as_str().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn pending_state() -> BillingState {
        BillingState {
            status: SubscriptionStatus::Pending,
            next_billing_date: None,
            last_payment_date: None,
            is_active: false,
            interval: BillingInterval::Month,
        }
    }

    #[test]
    fn created_active_uses_period_end_and_activates() {
        let patch = reduce(
            &pending_state(),
            &SubscriptionEvent::SubscriptionCreated {
                provider_status: "active".into(),
                current_period_end: Some(ts(2_000_000)),
                trial_end: Some(ts(1_500_000)),
                created: ts(1_000_000),
            },
            ts(1_000_100),
        );
        assert_eq!(patch.status, SubscriptionStatus::Active);
        assert!(patch.is_active);
        assert_eq!(patch.next_billing_date, Some(ts(2_000_000)));
        assert_eq!(patch.last_payment_date, Some(ts(1_000_000)));
    }

    #[test]
    fn created_falls_back_to_trial_then_interval() {
        // sem period_end: usa trial_end
        let patch = reduce(
            &pending_state(),
            &SubscriptionEvent::SubscriptionCreated {
                provider_status: "active".into(),
                current_period_end: None,
                trial_end: Some(ts(1_500_000)),
                created: ts(1_000_000),
            },
            ts(1_000_100),
        );
        assert_eq!(patch.next_billing_date, Some(ts(1_500_000)));

        // sem nada: criação + 1 intervalo (mês)
        let patch = reduce(
            &pending_state(),
            &SubscriptionEvent::SubscriptionCreated {
                provider_status: "active".into(),
                current_period_end: None,
                trial_end: None,
                created: ts(1_000_000),
            },
            ts(1_000_100),
        );
        assert_eq!(
            patch.next_billing_date,
            Some(add_billing_interval(BillingInterval::Month, ts(1_000_000)))
        );
    }

    #[test]
    fn created_not_active_goes_past_due() {
        let patch = reduce(
            &pending_state(),
            &SubscriptionEvent::SubscriptionCreated {
                provider_status: "incomplete".into(),
                current_period_end: Some(ts(2_000_000)),
                trial_end: None,
                created: ts(1_000_000),
            },
            ts(1_000_100),
        );
        assert_eq!(patch.status, SubscriptionStatus::PastDue);
        assert!(!patch.is_active);
        // last_payment_date fica inalterado
        assert_eq!(patch.last_payment_date, None);
    }

    #[test]
    fn updated_maps_provider_enum_one_to_one() {
        let cases = [
            ("active", SubscriptionStatus::Active, true),
            ("past_due", SubscriptionStatus::PastDue, false),
            ("canceled", SubscriptionStatus::Canceled, false),
            ("unpaid", SubscriptionStatus::Canceled, false),
            ("paused", SubscriptionStatus::Paused, false),
        ];
        for (provider, expected, active) in cases {
            let patch = reduce(
                &pending_state(),
                &SubscriptionEvent::SubscriptionUpdated {
                    provider_status: provider.into(),
                    current_period_end: Some(ts(3_000_000)),
                },
                ts(1_000_000),
            );
            assert_eq!(patch.status, expected, "provider={provider}");
            assert_eq!(patch.is_active, active, "provider={provider}");
            assert_eq!(patch.next_billing_date, Some(ts(3_000_000)));
        }
    }

    #[test]
    fn unknown_provider_status_defaults_to_pending_inactive() {
        assert_eq!(map_provider_status("trialing_weirdness"), SubscriptionStatus::Pending);
        let patch = reduce(
            &pending_state(),
            &SubscriptionEvent::SubscriptionUpdated {
                provider_status: "something_new".into(),
                current_period_end: None,
            },
            ts(1_000_000),
        );
        assert_eq!(patch.status, SubscriptionStatus::Pending);
        assert!(!patch.is_active);
    }

    #[test]
    fn deleted_always_cancels_and_deactivates() {
        for status in [
            SubscriptionStatus::Pending,
            SubscriptionStatus::Active,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Paused,
        ] {
            let mut state = pending_state();
            state.status = status;
            state.is_active = true;
            state.next_billing_date = Some(ts(9_000_000));

            let patch = reduce(&state, &SubscriptionEvent::SubscriptionDeleted, ts(1));
            assert_eq!(patch.status, SubscriptionStatus::Canceled);
            assert!(!patch.is_active);
            // datas de cobrança ficam como estavam
            assert_eq!(patch.next_billing_date, Some(ts(9_000_000)));
        }
    }

    #[test]
    fn invoice_succeeded_activates_and_stamps_now() {
        let now = ts(5_000_000);
        let patch = reduce(
            &pending_state(),
            &SubscriptionEvent::InvoicePaymentSucceeded {
                current_period_end: Some(ts(8_000_000)),
                payment: None,
            },
            now,
        );
        assert_eq!(patch.status, SubscriptionStatus::Active);
        assert!(patch.is_active);
        assert_eq!(patch.next_billing_date, Some(ts(8_000_000)));
        assert_eq!(patch.last_payment_date, Some(now));
    }

    #[test]
    fn invoice_failed_goes_past_due_keeping_dates() {
        let mut state = pending_state();
        state.next_billing_date = Some(ts(8_000_000));
        state.last_payment_date = Some(ts(4_000_000));

        let patch = reduce(&state, &SubscriptionEvent::InvoicePaymentFailed { payment: None }, ts(9));
        assert_eq!(patch.status, SubscriptionStatus::PastDue);
        assert!(!patch.is_active);
        assert_eq!(patch.next_billing_date, Some(ts(8_000_000)));
        assert_eq!(patch.last_payment_date, Some(ts(4_000_000)));
    }

    #[test]
    fn replaying_the_same_event_is_idempotent() {
        let event = SubscriptionEvent::InvoicePaymentSucceeded {
            current_period_end: Some(ts(8_000_000)),
            payment: None,
        };
        let now = ts(5_000_000);

        let first = reduce(&pending_state(), &event, now);
        let after_first = first.apply(&pending_state());
        let second = reduce(&after_first, &event, now);

        assert_eq!(first, second);
        assert_eq!(second.apply(&after_first), after_first);
    }

    #[test]
    fn parse_event_converts_invoice_payload() {
        let object = json!({
            "payment_intent": "pi_123",
            "amount_paid": 4990,
            "currency": "eur",
            "subscription": "sub_1",
            "lines": { "data": [ { "period": { "end": 8_000_000 } } ] }
        });
        let event = parse_event("invoice.payment_succeeded", &object).unwrap();
        match event {
            SubscriptionEvent::InvoicePaymentSucceeded {
                current_period_end,
                payment,
            } => {
                assert_eq!(current_period_end, Some(ts(8_000_000)));
                let payment = payment.unwrap();
                assert_eq!(payment.payment_intent_id, "pi_123");
                assert_eq!(payment.amount, Decimal::new(4990, 2));
                assert_eq!(payment.currency, "eur");
            }
            other => panic!("evento inesperado: {other:?}"),
        }
    }

    #[test]
    fn parse_event_ignores_unknown_types() {
        assert!(parse_event("charge.refunded", &json!({})).is_none());
    }

    #[test]
    fn subscription_id_field_depends_on_event_family() {
        let sub_obj = json!({ "id": "sub_1" });
        let inv_obj = json!({ "subscription": "sub_1" });
        assert_eq!(
            subscription_id_of("customer.subscription.updated", &sub_obj).as_deref(),
            Some("sub_1")
        );
        assert_eq!(
            subscription_id_of("invoice.payment_failed", &inv_obj).as_deref(),
            Some("sub_1")
        );
    }
}
