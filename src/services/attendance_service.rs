// src/services/attendance_service.rs
//
// Orquestra o validador de conflitos e as escritas de presença. O padrão
// check-then-write NÃO é atômico: duas submissões simultâneas para o mesmo
// (funcionário, dia) podem passar ambas na validação e correr no upsert: o
// banco resolve pela unicidade, sobrescrevendo em silêncio.

use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Weekday};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AttendanceRepository, LeaveRepository, SettingsRepository, attendance_repo::NewAttendance},
    models::{
        attendance::{Attendance, BusinessTrip, CompanySettings, SickLeave},
        employee::EmployeeRole,
    },
    services::conflict::{self, ConflictReport},
};

/// Resultado por funcionário de uma submissão em lote.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkEntryOutcome {
    pub employee_id: Uuid,
    pub created: bool,
    pub report: ConflictReport,
}

impl BulkEntryOutcome {
    /// Quem tem conflito bloqueante vira created=false mas continua na
    /// resposta, com o laudo completo.
    fn from_report(employee_id: Uuid, report: ConflictReport) -> Self {
        Self {
            employee_id,
            created: report.can_proceed,
            report,
        }
    }
}

#[derive(Clone)]
pub struct AttendanceService {
    attendance_repo: AttendanceRepository,
    leave_repo: LeaveRepository,
    settings_repo: SettingsRepository,
    pool: sqlx::PgPool,
}

impl AttendanceService {
    pub fn new(
        attendance_repo: AttendanceRepository,
        leave_repo: LeaveRepository,
        settings_repo: SettingsRepository,
        pool: sqlx::PgPool,
    ) -> Self {
        Self {
            attendance_repo,
            leave_repo,
            settings_repo,
            pool,
        }
    }

    /// Monta o quadro do dia consultando as quatro fontes de forma
    /// independente (sem transação) e classifica.
    pub async fn check_day(
        &self,
        role: EmployeeRole,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<ConflictReport, AppError> {
        let sick_leaves = self
            .attendance_repo
            .list_sick_leaves_covering(employee_id, date)
            .await?;
        let trips = self.attendance_repo.list_trips_covering(employee_id, date).await?;
        let requests = self.leave_repo.list_touching_date(employee_id, date).await?;
        let attendance = self
            .attendance_repo
            .find_by_employee_and_date(employee_id, date)
            .await?;

        Ok(conflict::classify_day(
            role,
            date,
            &sick_leaves,
            &trips,
            &requests,
            attendance.as_ref(),
        ))
    }

    /// Entrada manual de presença. Bloqueada por qualquer conflito das classes
    /// 4/1 (e 2 para não-admin); avisos voltam junto com a linha criada.
    pub async fn create_manual_entry(
        &self,
        caller_role: EmployeeRole,
        employee_id: Uuid,
        date: NaiveDate,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        notes: Option<String>,
    ) -> Result<(Attendance, ConflictReport), AppError> {
        let report = self.check_day(caller_role, employee_id, date).await?;
        if !report.can_proceed {
            return Err(AppError::ScheduleConflict(report.conflicts));
        }

        let settings = self.settings_repo.get().await?;
        let (is_late, late_minutes) = late_against_schedule(
            check_in,
            settings.check_in_time,
            settings.late_tolerance_minutes,
        );

        let row = NewAttendance {
            employee_id,
            date,
            check_in,
            check_out,
            is_manual: true,
            is_business_trip: false,
            is_sick_leave: false,
            is_late,
            late_minutes,
            notes,
        };
        let attendance = self.attendance_repo.upsert(&self.pool, &row).await?;

        Ok((attendance, report))
    }

    /// Variante em lote: a classificação roda por funcionário; quem tem
    /// conflito bloqueante fica de fora, os demais seguem.
    pub async fn create_bulk_entries(
        &self,
        caller_role: EmployeeRole,
        employee_ids: &[Uuid],
        date: NaiveDate,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
        notes: Option<String>,
    ) -> Result<Vec<BulkEntryOutcome>, AppError> {
        let settings = self.settings_repo.get().await?;
        let (is_late, late_minutes) = late_against_schedule(
            check_in,
            settings.check_in_time,
            settings.late_tolerance_minutes,
        );

        let mut outcomes = Vec::with_capacity(employee_ids.len());
        for &employee_id in employee_ids {
            let report = self.check_day(caller_role, employee_id, date).await?;
            let outcome = BulkEntryOutcome::from_report(employee_id, report);

            if outcome.created {
                let row = NewAttendance {
                    employee_id,
                    date,
                    check_in,
                    check_out,
                    is_manual: true,
                    is_business_trip: false,
                    is_sick_leave: false,
                    is_late,
                    late_minutes,
                    notes: notes.clone(),
                };
                self.attendance_repo.upsert(&self.pool, &row).await?;
            }
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    // =========================================================================
    //  AFASTAMENTOS POR DOENÇA
    // =========================================================================

    pub async fn create_sick_leave(
        &self,
        caller_role: EmployeeRole,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        notes: Option<String>,
    ) -> Result<(SickLeave, ConflictReport), AppError> {
        // A procedure do banco valida o intervalo
        if !self.attendance_repo.verify_sick_leave_dates(start, end).await? {
            return Err(AppError::InvalidDateRange);
        }

        let report = self
            .check_range(caller_role, employee_id, start, end)
            .await?;
        if !report.can_proceed {
            return Err(AppError::ScheduleConflict(report.conflicts));
        }

        let settings = self.settings_repo.get().await?;

        let mut tx = self.pool.begin().await?;

        // Pré-checagem para responder com a lista de conflitos; sob
        // concorrência, quem garante a não-sobreposição é a constraint de
        // exclusão de sick_leaves (traduzida no repositório)
        if self
            .attendance_repo
            .check_sick_leave_overlaps(&mut *tx, employee_id, start, end, None)
            .await?
        {
            return Err(AppError::ScheduleConflict(vec![
                "Já existe um afastamento por doença sobreposto a este período".to_string(),
            ]));
        }

        let sick = self
            .attendance_repo
            .create_sick_leave(&mut *tx, employee_id, start, end, notes.as_deref())
            .await?;

        // Sintetiza as presenças dos dias úteis do intervalo
        for day in working_days(start, end, &settings) {
            let row = NewAttendance {
                employee_id,
                date: day,
                check_in: settings.check_in_time,
                check_out: Some(settings.check_out_time),
                is_manual: false,
                is_business_trip: false,
                is_sick_leave: true,
                is_late: false,
                late_minutes: 0,
                notes: None,
            };
            self.attendance_repo.upsert(&mut *tx, &row).await?;
        }

        tx.commit().await?;

        Ok((sick, report))
    }

    pub async fn delete_sick_leave(&self, id: Uuid) -> Result<(), AppError> {
        let sick = self
            .attendance_repo
            .find_sick_leave(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Afastamento".to_string()))?;

        let mut tx = self.pool.begin().await?;
        self.attendance_repo
            .delete_sick_leave_rows(&mut *tx, sick.employee_id, sick.start_date, sick.end_date)
            .await?;
        self.attendance_repo.delete_sick_leave(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  VIAGENS DE TRABALHO
    // =========================================================================

    /// Cria a viagem (auto-aprovada) e sintetiza uma presença por dia útil do
    /// intervalo com os horários padrão configurados.
    pub async fn create_business_trip(
        &self,
        caller_role: EmployeeRole,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        destination: &str,
        reason: Option<String>,
    ) -> Result<(BusinessTrip, ConflictReport), AppError> {
        if start > end {
            return Err(AppError::InvalidDateRange);
        }

        let report = self
            .check_range(caller_role, employee_id, start, end)
            .await?;
        if !report.can_proceed {
            return Err(AppError::ScheduleConflict(report.conflicts));
        }

        let settings = self.settings_repo.get().await?;

        let mut tx = self.pool.begin().await?;

        let trip = self
            .attendance_repo
            .create_trip(&mut *tx, employee_id, start, end, destination, reason.as_deref())
            .await?;

        for row in trip_rows(employee_id, start, end, destination, &settings) {
            self.attendance_repo.upsert(&mut *tx, &row).await?;
        }

        tx.commit().await?;

        Ok((trip, report))
    }

    /// Remove a viagem e exatamente as presenças que ela sintetizou
    /// (flag is_business_trip dentro do intervalo), nada além.
    pub async fn delete_business_trip(&self, id: Uuid) -> Result<(), AppError> {
        let trip = self
            .attendance_repo
            .find_trip(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Viagem".to_string()))?;

        let mut tx = self.pool.begin().await?;
        self.attendance_repo
            .delete_business_trip_rows(&mut *tx, trip.employee_id, trip.start_date, trip.end_date)
            .await?;
        self.attendance_repo.delete_trip(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // --- helpers ---

    async fn check_range(
        &self,
        role: EmployeeRole,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ConflictReport, AppError> {
        let sick_leaves = self
            .attendance_repo
            .list_sick_leaves_overlapping(employee_id, start, end)
            .await?;
        let trips = self
            .attendance_repo
            .list_trips_overlapping(employee_id, start, end)
            .await?;
        let requests = self
            .leave_repo
            .list_overlapping_range(employee_id, start, end)
            .await?;

        Ok(conflict::classify_range(
            role,
            start,
            end,
            &sick_leaves,
            &trips,
            &requests,
        ))
    }

    /// Listagem do próprio espelho de ponto. O executor vem do handler, que o
    /// adquire já com as variáveis RLS definidas.
    pub async fn list_for_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Attendance>, AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        self.attendance_repo
            .list_by_employee(executor, employee_id, from, to)
            .await
    }

    pub async fn list_sick_leaves(&self, employee_id: Uuid) -> Result<Vec<SickLeave>, AppError> {
        self.attendance_repo.list_sick_leaves(employee_id).await
    }

    pub async fn list_trips(&self, employee_id: Uuid) -> Result<Vec<BusinessTrip>, AppError> {
        self.attendance_repo.list_trips(employee_id).await
    }
}

// =============================================================================
//  FUNÇÕES PURAS DE CALENDÁRIO
// =============================================================================

fn weekday_number(day: Weekday) -> i32 {
    day.number_from_monday() as i32
}

/// Expande [start, end] nos dias úteis segundo a semana configurada.
pub fn working_days(start: NaiveDate, end: NaiveDate, settings: &CompanySettings) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = start;
    while current <= end {
        if settings.work_days.contains(&weekday_number(current.weekday())) {
            days.push(current);
        }
        current += TimeDelta::days(1);
    }
    days
}

/// Presenças sintetizadas por uma viagem: uma por dia útil, com os horários
/// padrão da empresa.
pub fn trip_rows(
    employee_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    destination: &str,
    settings: &CompanySettings,
) -> Vec<NewAttendance> {
    working_days(start, end, settings)
        .into_iter()
        .map(|day| NewAttendance {
            employee_id,
            date: day,
            check_in: settings.check_in_time,
            check_out: Some(settings.check_out_time),
            is_manual: false,
            is_business_trip: true,
            is_sick_leave: false,
            is_late: false,
            late_minutes: 0,
            notes: Some(format!("Viagem de trabalho: {}", destination)),
        })
        .collect()
}

/// Atraso contra o horário padrão, com tolerância em minutos.
pub fn late_against_schedule(
    check_in: NaiveTime,
    scheduled: NaiveTime,
    tolerance_minutes: i32,
) -> (bool, i32) {
    let delta = (check_in - scheduled).num_minutes();
    if delta > tolerance_minutes as i64 {
        (true, delta as i32)
    } else {
        (false, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(work_days: Vec<i32>) -> CompanySettings {
        CompanySettings {
            id: 1,
            work_days,
            check_in_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            check_out_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            late_tolerance_minutes: 10,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn monday_to_friday_trip_yields_five_working_days() {
        // 2024-06-03 é segunda, 2024-06-07 é sexta
        let days = working_days(date("2024-06-03"), date("2024-06-07"), &settings(vec![1, 2, 3, 4, 5]));
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date("2024-06-03"));
        assert_eq!(days[4], date("2024-06-07"));
    }

    #[test]
    fn weekend_is_skipped() {
        // segunda a domingo, semana Seg a Sex: sábado e domingo ficam de fora
        let days = working_days(date("2024-06-03"), date("2024-06-09"), &settings(vec![1, 2, 3, 4, 5]));
        assert_eq!(days.len(), 5);
        assert!(!days.contains(&date("2024-06-08")));
        assert!(!days.contains(&date("2024-06-09")));
    }

    #[test]
    fn six_day_work_week_includes_saturday() {
        let days = working_days(date("2024-06-03"), date("2024-06-09"), &settings(vec![1, 2, 3, 4, 5, 6]));
        assert_eq!(days.len(), 6);
        assert!(days.contains(&date("2024-06-08")));
    }

    #[test]
    fn bulk_outcome_mirrors_the_conflict_decision() {
        let id = Uuid::new_v4();

        let ok = BulkEntryOutcome::from_report(id, ConflictReport::allowed());
        assert!(ok.created);
        assert_eq!(ok.employee_id, id);

        let mut blocked = ConflictReport::allowed();
        blocked
            .conflicts
            .push("Afastamento por doença de 2024-01-01 a 2024-01-05".to_string());
        blocked.can_proceed = false;

        // Bloqueado não cria, mas permanece na resposta com o laudo
        let skipped = BulkEntryOutcome::from_report(id, blocked);
        assert!(!skipped.created);
        assert_eq!(skipped.report.conflicts.len(), 1);
    }

    #[test]
    fn trip_synthesizes_one_row_per_working_day_with_schedule_times() {
        let rows = trip_rows(
            Uuid::new_v4(),
            date("2024-06-03"),
            date("2024-06-07"),
            "Milano",
            &settings(vec![1, 2, 3, 4, 5]),
        );
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert!(row.is_business_trip);
            assert!(!row.is_manual);
            assert_eq!(row.check_in, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
            assert_eq!(row.check_out, NaiveTime::from_hms_opt(18, 0, 0));
        }
    }

    #[test]
    fn late_only_beyond_tolerance() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        let on_time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(late_against_schedule(on_time, nine, 10), (false, 0));

        let late = NaiveTime::from_hms_opt(9, 25, 0).unwrap();
        assert_eq!(late_against_schedule(late, nine, 10), (true, 25));

        let early = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        assert_eq!(late_against_schedule(early, nine, 10), (false, 0));
    }
}
