// src/services/conflict.rs
//
// Validador de conflitos de agenda. A classificação em si é uma função pura
// sobre registros já carregados: o papel do chamador entra como valor
// explícito, em vez de `if role == admin` espalhado pelos call sites.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    attendance::{Attendance, BusinessTrip, SickLeave},
    employee::EmployeeRole,
    leave::{LeaveKind, LeaveRequest, LeaveStatus},
};

/// Resultado da classificação: decisão + motivos legíveis.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub can_proceed: bool,
    /// Motivos bloqueantes, ordenados da classe mais alta para a mais baixa.
    pub conflicts: Vec<String>,
    /// Avisos que não bloqueiam (permesso visto por admin, requisições pendentes).
    pub warnings: Vec<String>,
}

impl ConflictReport {
    pub(crate) fn allowed() -> Self {
        Self {
            can_proceed: true,
            conflicts: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Dois intervalos fechados [a_start, a_end] e [b_start, b_end] se sobrepõem?
/// Intervalos adjacentes (ex.: termina dia 5, começa dia 6) NÃO se sobrepõem.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Classifica os conflitos de um único (funcionário, dia).
///
/// Classes em ordem de prioridade, todas as ocorrências são coletadas:
///   4 (crítica): malattia / viagem aprovada / ferie aprovadas cobrindo o dia
///                → bloqueia sempre, admin incluso;
///   2 (média):   permesso aprovado no dia → bloqueia employee, vira aviso
///                para admin;
///   1 (menor):   presença já registrada no dia → bloqueia sempre;
///   0 (info):    requisição pendente tocando o dia → nunca bloqueia.
pub fn classify_day(
    role: EmployeeRole,
    date: NaiveDate,
    sick_leaves: &[SickLeave],
    trips: &[BusinessTrip],
    requests: &[LeaveRequest],
    attendance: Option<&Attendance>,
) -> ConflictReport {
    let mut report = ConflictReport::allowed();

    // Classe 4: ausências críticas
    for sick in sick_leaves.iter().filter(|s| s.covers(date)) {
        report.conflicts.push(format!(
            "Afastamento por doença de {} a {}",
            sick.start_date, sick.end_date
        ));
    }
    for trip in trips.iter().filter(|t| t.is_approved() && t.covers(date)) {
        report.conflicts.push(format!(
            "Viagem de trabalho para {} de {} a {}",
            trip.destination, trip.start_date, trip.end_date
        ));
    }
    for ferie in requests.iter().filter(|r| {
        r.kind == LeaveKind::Ferie && r.status == LeaveStatus::Approved && r.covers(date)
    }) {
        report.conflicts.push(format!(
            "Ferie aprovadas de {} a {}",
            ferie.date_from.unwrap_or(date),
            ferie.date_to.unwrap_or(date)
        ));
    }

    // Classe 2: permesso aprovado no dia exato (bloqueia employee, avisa admin)
    for permesso in requests.iter().filter(|r| {
        r.kind == LeaveKind::Permesso && r.status == LeaveStatus::Approved && r.day == Some(date)
    }) {
        let window = match (permesso.time_from, permesso.time_to) {
            (Some(from), Some(to)) => format!(" ({}-{})", from.format("%H:%M"), to.format("%H:%M")),
            _ => String::new(),
        };
        let description = format!("Permesso aprovado no dia {}{}", date, window);
        if role.is_admin() {
            report.warnings.push(description);
        } else {
            report.conflicts.push(description);
        }
    }

    // Classe 1: presença duplicada
    if attendance.is_some() {
        report
            .conflicts
            .push(format!("Já existe um registro de presença em {}", date));
    }

    // Classe 0: pendências nunca bloqueiam, só informam
    for pending in requests
        .iter()
        .filter(|r| r.status == LeaveStatus::Pending && r.covers(date))
    {
        let kind = match pending.kind {
            LeaveKind::Ferie => "ferie",
            LeaveKind::Permesso => "permesso",
        };
        report.warnings.push(format!(
            "Existe uma requisição de {} pendente que toca o dia {}",
            kind, date
        ));
    }

    report.can_proceed = report.conflicts.is_empty();
    report
}

/// Variante de intervalo (malattia, viagem): o intervalo novo é comparado por
/// sobreposição de intervalos com os registros existentes, sem expandir dia a
/// dia contra calendários.
pub fn classify_range(
    role: EmployeeRole,
    start: NaiveDate,
    end: NaiveDate,
    sick_leaves: &[SickLeave],
    trips: &[BusinessTrip],
    requests: &[LeaveRequest],
) -> ConflictReport {
    let mut report = ConflictReport::allowed();

    // Classe 4
    for sick in sick_leaves
        .iter()
        .filter(|s| ranges_overlap(start, end, s.start_date, s.end_date))
    {
        report.conflicts.push(format!(
            "Afastamento por doença de {} a {}",
            sick.start_date, sick.end_date
        ));
    }
    for trip in trips.iter().filter(|t| {
        t.is_approved() && ranges_overlap(start, end, t.start_date, t.end_date)
    }) {
        report.conflicts.push(format!(
            "Viagem de trabalho para {} de {} a {}",
            trip.destination, trip.start_date, trip.end_date
        ));
    }
    for ferie in requests.iter().filter(|r| {
        r.kind == LeaveKind::Ferie
            && r.status == LeaveStatus::Approved
            && match (r.date_from, r.date_to) {
                (Some(from), Some(to)) => ranges_overlap(start, end, from, to),
                _ => false,
            }
    }) {
        report.conflicts.push(format!(
            "Ferie aprovadas de {} a {}",
            ferie.date_from.unwrap_or(start),
            ferie.date_to.unwrap_or(end)
        ));
    }

    // Classe 2: permesso tratado como intervalo de um dia
    for day in requests.iter().filter_map(|r| {
        (r.kind == LeaveKind::Permesso && r.status == LeaveStatus::Approved)
            .then_some(r.day)
            .flatten()
            .filter(|d| start <= *d && *d <= end)
    }) {
        let description = format!("Permesso aprovado no dia {}", day);
        if role.is_admin() {
            report.warnings.push(description);
        } else {
            report.conflicts.push(description);
        }
    }

    // Classe 0
    for pending in requests.iter().filter(|r| {
        r.status == LeaveStatus::Pending
            && match r.kind {
                LeaveKind::Ferie => match (r.date_from, r.date_to) {
                    (Some(from), Some(to)) => ranges_overlap(start, end, from, to),
                    _ => false,
                },
                LeaveKind::Permesso => r.day.map(|d| start <= d && d <= end).unwrap_or(false),
            }
    }) {
        let kind = match pending.kind {
            LeaveKind::Ferie => "ferie",
            LeaveKind::Permesso => "permesso",
        };
        report
            .warnings
            .push(format!("Existe uma requisição de {} pendente no período", kind));
    }

    report.can_proceed = report.conflicts.is_empty();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn sick(start: &str, end: &str) -> SickLeave {
        SickLeave {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            start_date: date(start),
            end_date: date(end),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn trip(start: &str, end: &str) -> BusinessTrip {
        BusinessTrip {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            start_date: date(start),
            end_date: date(end),
            destination: "Milano".into(),
            status: "approved".into(),
            reason: None,
            created_at: Utc::now(),
        }
    }

    fn ferie(from: &str, to: &str, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            kind: LeaveKind::Ferie,
            date_from: Some(date(from)),
            date_to: Some(date(to)),
            day: None,
            time_from: None,
            time_to: None,
            status,
            note: None,
            admin_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn permesso(day: &str, status: LeaveStatus) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            kind: LeaveKind::Permesso,
            date_from: None,
            date_to: None,
            day: Some(date(day)),
            time_from: NaiveTime::from_hms_opt(14, 0, 0),
            time_to: NaiveTime::from_hms_opt(16, 0, 0),
            status,
            note: None,
            admin_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn attendance_row(day: &str) -> Attendance {
        Attendance {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            date: date(day),
            check_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            check_out: NaiveTime::from_hms_opt(18, 0, 0),
            is_manual: true,
            is_business_trip: false,
            is_sick_leave: false,
            is_late: false,
            late_minutes: 0,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sick_leave_blocks_everyone() {
        for role in [EmployeeRole::Admin, EmployeeRole::Employee] {
            let report = classify_day(
                role,
                date("2024-02-06"),
                &[sick("2024-02-05", "2024-02-09")],
                &[],
                &[],
                None,
            );
            assert!(!report.can_proceed);
            assert_eq!(report.conflicts.len(), 1);
        }
    }

    #[test]
    fn approved_trip_blocks_everyone() {
        for role in [EmployeeRole::Admin, EmployeeRole::Employee] {
            let report = classify_day(
                role,
                date("2024-06-05"),
                &[],
                &[trip("2024-06-03", "2024-06-07")],
                &[],
                None,
            );
            assert!(!report.can_proceed);
        }
    }

    #[test]
    fn approved_ferie_blocks_everyone() {
        for role in [EmployeeRole::Admin, EmployeeRole::Employee] {
            let report = classify_day(
                role,
                date("2024-08-10"),
                &[],
                &[],
                &[ferie("2024-08-05", "2024-08-16", LeaveStatus::Approved)],
                None,
            );
            assert!(!report.can_proceed);
        }
    }

    #[test]
    fn approved_permesso_blocks_employee_but_warns_admin() {
        let requests = [permesso("2024-07-01", LeaveStatus::Approved)];

        let employee =
            classify_day(EmployeeRole::Employee, date("2024-07-01"), &[], &[], &requests, None);
        assert!(!employee.can_proceed);
        assert!(employee.warnings.is_empty());

        let admin =
            classify_day(EmployeeRole::Admin, date("2024-07-01"), &[], &[], &requests, None);
        assert!(admin.can_proceed);
        assert_eq!(admin.warnings.len(), 1);
        assert!(admin.warnings[0].contains("14:00"));
    }

    #[test]
    fn existing_attendance_blocks_any_role() {
        let row = attendance_row("2024-07-01");
        for role in [EmployeeRole::Admin, EmployeeRole::Employee] {
            let report = classify_day(role, date("2024-07-01"), &[], &[], &[], Some(&row));
            assert!(!report.can_proceed);
        }
    }

    #[test]
    fn pending_request_only_warns() {
        let requests = [ferie("2024-08-05", "2024-08-16", LeaveStatus::Pending)];
        let report =
            classify_day(EmployeeRole::Employee, date("2024-08-10"), &[], &[], &requests, None);
        assert!(report.can_proceed);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn rejected_requests_are_ignored() {
        let requests = [
            ferie("2024-08-05", "2024-08-16", LeaveStatus::Rejected),
            permesso("2024-08-10", LeaveStatus::Rejected),
        ];
        let report =
            classify_day(EmployeeRole::Employee, date("2024-08-10"), &[], &[], &requests, None);
        assert!(report.can_proceed);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn all_matches_are_collected_in_priority_order() {
        let row = attendance_row("2024-08-10");
        let report = classify_day(
            EmployeeRole::Employee,
            date("2024-08-10"),
            &[sick("2024-08-10", "2024-08-12")],
            &[],
            &[permesso("2024-08-10", LeaveStatus::Approved)],
            Some(&row),
        );
        assert!(!report.can_proceed);
        assert_eq!(report.conflicts.len(), 3);
        // classe 4 primeiro, depois classe 2, depois classe 1
        assert!(report.conflicts[0].contains("doença"));
        assert!(report.conflicts[1].contains("Permesso"));
        assert!(report.conflicts[2].contains("registro de presença"));
    }

    #[test]
    fn interval_overlap_is_inclusive() {
        assert!(ranges_overlap(
            date("2024-01-01"),
            date("2024-01-05"),
            date("2024-01-05"),
            date("2024-01-10"),
        ));
    }

    #[test]
    fn adjacent_intervals_do_not_overlap() {
        // [1 gen, 5 gen] e [6 gen, 10 gen]: adjacentes, sem conflito
        assert!(!ranges_overlap(
            date("2024-01-01"),
            date("2024-01-05"),
            date("2024-01-06"),
            date("2024-01-10"),
        ));
    }

    #[test]
    fn range_variant_flags_overlapping_sick_leave() {
        let report = classify_range(
            EmployeeRole::Admin,
            date("2024-01-04"),
            date("2024-01-08"),
            &[sick("2024-01-01", "2024-01-05")],
            &[],
            &[],
        );
        assert!(!report.can_proceed);
    }

    #[test]
    fn range_variant_allows_adjacent_sick_leave() {
        let report = classify_range(
            EmployeeRole::Admin,
            date("2024-01-06"),
            date("2024-01-10"),
            &[sick("2024-01-01", "2024-01-05")],
            &[],
            &[],
        );
        assert!(report.can_proceed);
    }
}
