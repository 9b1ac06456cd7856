// src/db/attendance_repo.rs

use chrono::{NaiveDate, NaiveTime};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::attendance::{Attendance, BusinessTrip, SickLeave},
};

/// Campos de uma linha de presença a gravar (upsert em (employee_id, date)).
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub check_out: Option<NaiveTime>,
    pub is_manual: bool,
    pub is_business_trip: bool,
    pub is_sick_leave: bool,
    pub is_late: bool,
    pub late_minutes: i32,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  PRESENÇAS
    // =========================================================================

    pub async fn find_by_employee_and_date(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<Attendance>, AppError> {
        let maybe = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE employee_id = $1 AND date = $2",
        )
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    // Recebe o executor para rodar em cima da conexão RLS do chamador
    pub async fn list_by_employee<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Attendance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT * FROM attendance
            WHERE employee_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date ASC
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // Upsert em (employee_id, date): o banco é o árbitro final da unicidade.
    // Nota: numa corrida check-then-write, o perdedor sobrescreve em silêncio.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        row: &NewAttendance,
    ) -> Result<Attendance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let attendance = sqlx::query_as::<_, Attendance>(
            r#"
            INSERT INTO attendance
                (employee_id, date, check_in, check_out,
                 is_manual, is_business_trip, is_sick_leave,
                 is_late, late_minutes, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (employee_id, date) DO UPDATE SET
                check_in = EXCLUDED.check_in,
                check_out = EXCLUDED.check_out,
                is_manual = EXCLUDED.is_manual,
                is_business_trip = EXCLUDED.is_business_trip,
                is_sick_leave = EXCLUDED.is_sick_leave,
                is_late = EXCLUDED.is_late,
                late_minutes = EXCLUDED.late_minutes,
                notes = EXCLUDED.notes
            RETURNING *
            "#,
        )
        .bind(row.employee_id)
        .bind(row.date)
        .bind(row.check_in)
        .bind(row.check_out)
        .bind(row.is_manual)
        .bind(row.is_business_trip)
        .bind(row.is_sick_leave)
        .bind(row.is_late)
        .bind(row.late_minutes)
        .bind(row.notes.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(attendance)
    }

    /// Remove somente as linhas sintetizadas por uma viagem (flag + intervalo),
    /// deixando intocadas as presenças manuais do período.
    pub async fn delete_business_trip_rows<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM attendance
            WHERE employee_id = $1 AND is_business_trip AND date BETWEEN $2 AND $3
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_sick_leave_rows<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM attendance
            WHERE employee_id = $1 AND is_sick_leave AND date BETWEEN $2 AND $3
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    //  AFASTAMENTOS POR DOENÇA
    // =========================================================================

    pub async fn list_sick_leaves(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<SickLeave>, AppError> {
        let rows = sqlx::query_as::<_, SickLeave>(
            "SELECT * FROM sick_leaves WHERE employee_id = $1 ORDER BY start_date DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_sick_leaves_covering(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<SickLeave>, AppError> {
        let rows = sqlx::query_as::<_, SickLeave>(
            r#"
            SELECT * FROM sick_leaves
            WHERE employee_id = $1 AND start_date <= $2 AND end_date >= $2
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_sick_leave(&self, id: Uuid) -> Result<Option<SickLeave>, AppError> {
        let maybe = sqlx::query_as::<_, SickLeave>("SELECT * FROM sick_leaves WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    /// Procedure do banco: o intervalo é válido? (start <= end)
    pub async fn verify_sick_leave_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AppError> {
        let (ok,): (bool,) = sqlx::query_as("SELECT verify_sick_leave_dates($1, $2)")
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool)
            .await?;
        Ok(ok)
    }

    /// Procedure do banco: existe sobreposição com outro afastamento?
    /// O banco, e não o código da aplicação, é o árbitro final aqui.
    pub async fn check_sick_leave_overlaps<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (overlaps,): (bool,) =
            sqlx::query_as("SELECT check_sick_leave_overlaps($1, $2, $3, $4)")
                .bind(employee_id)
                .bind(start)
                .bind(end)
                .bind(exclude)
                .fetch_one(executor)
                .await?;
        Ok(overlaps)
    }

    // Insere o afastamento, traduzindo a violação da constraint de exclusão
    // (intervalos sobrepostos do mesmo funcionário) em conflito de agenda
    pub async fn create_sick_leave<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        notes: Option<&str>,
    ) -> Result<SickLeave, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SickLeave>(
            r#"
            INSERT INTO sick_leaves (employee_id, start_date, end_date, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                // 23P01 = exclusion_violation
                if db_err.code().as_deref() == Some("23P01") {
                    return AppError::ScheduleConflict(vec![
                        "Já existe um afastamento por doença sobreposto a este período"
                            .to_string(),
                    ]);
                }
            }
            e.into()
        })
    }

    pub async fn delete_sick_leave<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sick_leaves WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  VIAGENS DE TRABALHO
    // =========================================================================

    pub async fn list_trips(&self, employee_id: Uuid) -> Result<Vec<BusinessTrip>, AppError> {
        let rows = sqlx::query_as::<_, BusinessTrip>(
            "SELECT * FROM business_trips WHERE employee_id = $1 ORDER BY start_date DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_trips_covering(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BusinessTrip>, AppError> {
        let rows = sqlx::query_as::<_, BusinessTrip>(
            r#"
            SELECT * FROM business_trips
            WHERE employee_id = $1 AND status = 'approved'
              AND start_date <= $2 AND end_date >= $2
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_trips_overlapping(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<BusinessTrip>, AppError> {
        let rows = sqlx::query_as::<_, BusinessTrip>(
            r#"
            SELECT * FROM business_trips
            WHERE employee_id = $1 AND status = 'approved'
              AND start_date <= $3 AND end_date >= $2
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_sick_leaves_overlapping(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SickLeave>, AppError> {
        let rows = sqlx::query_as::<_, SickLeave>(
            r#"
            SELECT * FROM sick_leaves
            WHERE employee_id = $1 AND start_date <= $3 AND end_date >= $2
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_trip(&self, id: Uuid) -> Result<Option<BusinessTrip>, AppError> {
        let maybe =
            sqlx::query_as::<_, BusinessTrip>("SELECT * FROM business_trips WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(maybe)
    }

    pub async fn create_trip<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        destination: &str,
        reason: Option<&str>,
    ) -> Result<BusinessTrip, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let trip = sqlx::query_as::<_, BusinessTrip>(
            r#"
            INSERT INTO business_trips (employee_id, start_date, end_date, destination, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .bind(destination)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(trip)
    }

    pub async fn delete_trip<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM business_trips WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
