// src/services/leave_service.rs

use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeaveRepository, leave_repo::request_year},
    models::leave::{LeaveKind, LeaveRequest, LeaveStatus},
    services::notification_service::{NotificationService, OutgoingNotification},
};

/// Horas decimais de uma janela de permesso (precisão de minuto: 14:00 a 16:00
/// vale exatamente 2.00).
pub fn permesso_hours(from: NaiveTime, to: NaiveTime) -> Decimal {
    let minutes = (to - from).num_minutes();
    Decimal::new(minutes, 0) / Decimal::new(60, 0)
}

/// Dias corridos (inclusivos) de um pedido de ferie.
pub fn ferie_days(from: NaiveDate, to: NaiveDate) -> i32 {
    ((to - from).num_days() + 1) as i32
}

#[derive(Clone)]
pub struct LeaveService {
    leave_repo: LeaveRepository,
    notification_service: NotificationService,
    pool: sqlx::PgPool,
}

impl LeaveService {
    pub fn new(
        leave_repo: LeaveRepository,
        notification_service: NotificationService,
        pool: sqlx::PgPool,
    ) -> Self {
        Self {
            leave_repo,
            notification_service,
            pool,
        }
    }

    /// Submissão de ferie. Estourar o saldo restante bloqueia a submissão
    /// (nunca retroativamente).
    pub async fn submit_ferie(
        &self,
        employee_id: Uuid,
        date_from: NaiveDate,
        date_to: NaiveDate,
        note: Option<&str>,
    ) -> Result<LeaveRequest, AppError> {
        if date_from > date_to {
            return Err(AppError::InvalidDateRange);
        }

        let year = date_from.year();
        let requested = ferie_days(date_from, date_to);

        let mut tx = self.pool.begin().await?;
        let balance = self
            .leave_repo
            .get_or_create_balance(&mut *tx, employee_id, year)
            .await?;

        let remaining = balance.vacation_days_total - balance.vacation_days_used;
        if requested > remaining {
            return Err(AppError::InsufficientBalance(format!(
                "Pedido de {} dias de ferie, mas restam apenas {}.",
                requested, remaining
            )));
        }

        let request = self
            .leave_repo
            .create_request(
                &mut *tx,
                employee_id,
                LeaveKind::Ferie,
                Some(date_from),
                Some(date_to),
                None,
                None,
                None,
                note,
            )
            .await?;
        tx.commit().await?;

        Ok(request)
    }

    /// Submissão de permesso (janela de horário em um único dia).
    pub async fn submit_permesso(
        &self,
        employee_id: Uuid,
        day: NaiveDate,
        time_from: NaiveTime,
        time_to: NaiveTime,
        note: Option<&str>,
    ) -> Result<LeaveRequest, AppError> {
        if time_from >= time_to {
            return Err(AppError::InvalidDateRange);
        }

        let year = day.year();
        let requested = permesso_hours(time_from, time_to);

        let mut tx = self.pool.begin().await?;
        let balance = self
            .leave_repo
            .get_or_create_balance(&mut *tx, employee_id, year)
            .await?;

        let remaining = balance.permission_hours_total - balance.permission_hours_used;
        if requested > remaining {
            return Err(AppError::InsufficientBalance(format!(
                "Pedido de {} horas de permesso, mas restam apenas {}.",
                requested, remaining
            )));
        }

        let request = self
            .leave_repo
            .create_request(
                &mut *tx,
                employee_id,
                LeaveKind::Permesso,
                None,
                None,
                Some(day),
                Some(time_from),
                Some(time_to),
                note,
            )
            .await?;
        tx.commit().await?;

        Ok(request)
    }

    /// Aprovação/rejeição pelo admin. A aprovação debita o saldo na mesma
    /// transação; a notificação ao funcionário sai depois do commit.
    pub async fn decide(
        &self,
        admin_id: Uuid,
        request_id: Uuid,
        approve: bool,
        admin_note: Option<&str>,
    ) -> Result<LeaveRequest, AppError> {
        let request = self
            .leave_repo
            .find_request_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Requisição".to_string()))?;

        if request.status != LeaveStatus::Pending {
            return Err(AppError::ScheduleConflict(vec![
                "A requisição já foi decidida.".to_string(),
            ]));
        }

        let new_status = if approve {
            LeaveStatus::Approved
        } else {
            LeaveStatus::Rejected
        };

        let mut tx = self.pool.begin().await?;

        let updated = self
            .leave_repo
            .update_status(&mut *tx, request_id, new_status, admin_note)
            .await?;

        if approve {
            let year = request_year(&request);
            // Garante que o saldo do ano do pedido existe antes de debitar
            self.leave_repo
                .get_or_create_balance(&mut *tx, request.employee_id, year)
                .await?;

            match request.kind {
                LeaveKind::Ferie => {
                    if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
                        self.leave_repo
                            .add_vacation_days_used(
                                &mut *tx,
                                request.employee_id,
                                year,
                                ferie_days(from, to),
                            )
                            .await?;
                    }
                }
                LeaveKind::Permesso => {
                    if let (Some(from), Some(to)) = (request.time_from, request.time_to) {
                        self.leave_repo
                            .add_permission_hours_used(
                                &mut *tx,
                                request.employee_id,
                                year,
                                permesso_hours(from, to),
                            )
                            .await?;
                    }
                }
            }
        }

        tx.commit().await?;

        // Notificação pós-commit: falha aqui não desfaz a decisão
        let (topic, title) = notification_topic(request.kind, approve);
        let message = match request.kind {
            LeaveKind::Ferie => format!(
                "Sua requisição de ferie de {} a {} foi {}.",
                request.date_from.map(|d| d.to_string()).unwrap_or_default(),
                request.date_to.map(|d| d.to_string()).unwrap_or_default(),
                if approve { "aprovada" } else { "rejeitada" },
            ),
            LeaveKind::Permesso => format!(
                "Sua requisição de permesso do dia {} foi {}.",
                request.day.map(|d| d.to_string()).unwrap_or_default(),
                if approve { "aprovada" } else { "rejeitada" },
            ),
        };

        self.notification_service
            .dispatch(OutgoingNotification {
                sender_id: Some(admin_id),
                sender_role: crate::models::employee::EmployeeRole::Admin,
                recipient_id: Some(request.employee_id),
                title: title.to_string(),
                message,
                topic: topic.to_string(),
                attachment_url: None,
            })
            .await?;

        Ok(updated)
    }

    pub async fn list_for_employee(&self, employee_id: Uuid) -> Result<Vec<LeaveRequest>, AppError> {
        self.leave_repo.list_by_employee(employee_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<LeaveRequest>, AppError> {
        self.leave_repo.list_all().await
    }

    pub async fn balance_for(
        &self,
        employee_id: Uuid,
        year: i32,
    ) -> Result<Option<crate::models::leave::LeaveBalance>, AppError> {
        self.leave_repo.get_balance(employee_id, year).await
    }
}

fn notification_topic(kind: LeaveKind, approved: bool) -> (&'static str, &'static str) {
    match (kind, approved) {
        (LeaveKind::Permesso, true) => ("permessi-approvazione", "Permesso aprovado"),
        (LeaveKind::Permesso, false) => ("permessi-rifiuto", "Permesso rejeitado"),
        (LeaveKind::Ferie, true) => ("ferie-approvazione", "Ferie aprovadas"),
        (LeaveKind::Ferie, false) => ("ferie-rifiuto", "Ferie rejeitadas"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn two_hour_window_is_exactly_two_decimal_hours() {
        assert_eq!(permesso_hours(time(14, 0), time(16, 0)), Decimal::new(200, 2));
    }

    #[test]
    fn minutes_keep_decimal_precision() {
        // 90 minutos = 1.5 horas
        assert_eq!(permesso_hours(time(9, 0), time(10, 30)), Decimal::new(15, 1));
        // 20 minutos = 0.333...: o decimal preserva o que 1/3 permite
        let third = permesso_hours(time(9, 0), time(9, 20));
        assert_eq!(third, Decimal::new(20, 0) / Decimal::new(60, 0));
    }

    #[test]
    fn ferie_days_are_inclusive() {
        let from: NaiveDate = "2024-08-05".parse().unwrap();
        let to: NaiveDate = "2024-08-16".parse().unwrap();
        assert_eq!(ferie_days(from, to), 12);
        assert_eq!(ferie_days(from, from), 1);
    }

    #[test]
    fn approval_topics_follow_the_kind() {
        assert_eq!(
            notification_topic(LeaveKind::Permesso, true).0,
            "permessi-approvazione"
        );
        assert_eq!(notification_topic(LeaveKind::Ferie, false).0, "ferie-rifiuto");
    }
}
