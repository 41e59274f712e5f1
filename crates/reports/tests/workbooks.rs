use std::io::Cursor;

use chrono::{TimeZone, Utc};
use engine::{
    Budget, BudgetStatus, DentistRef, Money, Patient, PatientOverview, PatientRef, UserRef,
};
use reports::{BudgetSummary, NOT_INFORMED, Total};
use umya_spreadsheet::Spreadsheet;

fn budget(
    id: i32,
    patient: (i32, &str),
    dentist: Option<(i32, &str)>,
    cents: i64,
    status: BudgetStatus,
) -> Budget {
    let at = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    Budget {
        id,
        patient_id: patient.0,
        dentist_id: dentist.map(|d| d.0),
        created_by: 1,
        total: Money::new(cents),
        discount: Money::ZERO,
        final_total: Money::new(cents),
        status,
        notes: None,
        created_at: at,
        updated_at: at,
        patient: Some(PatientRef {
            id: patient.0,
            name: patient.1.to_string(),
            phone: Some("11 90000-0000".to_string()),
            email: None,
        }),
        dentist: dentist.map(|(id, name)| DentistRef {
            id,
            name: name.to_string(),
            cro: format!("SP-{id}"),
            specialty: None,
        }),
        user: Some(UserRef {
            id: 1,
            name: "Ana Admin".to_string(),
            email: "ana@clinica.com".to_string(),
        }),
        items: Vec::new(),
    }
}

fn sample() -> Vec<Budget> {
    vec![
        budget(3, (1, "Maria"), Some((1, "Dr. Paulo")), 90_00, BudgetStatus::Accepted),
        budget(2, (2, "Joao"), None, 30_30, BudgetStatus::Negotiating),
        budget(1, (1, "Maria"), Some((1, "Dr. Paulo")), 50_00, BudgetStatus::Rejected),
    ]
}

fn read(bytes: Vec<u8>) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true).unwrap()
}

fn number(book: &Spreadsheet, sheet: &str, cell: &str) -> f64 {
    book.get_sheet_by_name(sheet)
        .unwrap()
        .get_value(cell)
        .parse()
        .unwrap()
}

#[test]
fn summary_groups_by_status_dentist_and_patient() {
    let summary = BudgetSummary::from_budgets(&sample());

    assert_eq!(summary.count, 3);
    assert_eq!(summary.value, Total::from(Money::new(170_30)));
    assert_eq!(summary.status(BudgetStatus::Accepted), 1);
    assert_eq!(summary.status(BudgetStatus::Negotiating), 1);
    assert_eq!(summary.average_ticket(), Money::new(56_77));

    let dentists: Vec<(&str, u64, Total)> = summary
        .by_dentist
        .iter()
        .map(|g| (g.name.as_str(), g.count, g.value))
        .collect();
    assert_eq!(
        dentists,
        vec![
            ("Dr. Paulo", 2, Money::new(140_00).into()),
            (NOT_INFORMED, 1, Money::new(30_30).into()),
        ]
    );
    assert_eq!(summary.by_dentist[0].average(), Money::new(70_00));

    let patients: Vec<(&str, u64)> = summary
        .by_patient
        .iter()
        .map(|g| (g.name.as_str(), g.count))
        .collect();
    assert_eq!(patients, vec![("Maria", 2), ("Joao", 1)]);

    let shares: Vec<f64> = summary.by_status.iter().map(|s| s.share).collect();
    assert!(shares.iter().all(|s| (s - 1.0 / 3.0).abs() < 1e-9));
}

#[test]
fn budgets_workbook_has_three_sheets() {
    let at = Utc.with_ymd_and_hms(2025, 3, 10, 15, 30, 0).unwrap();
    let book = read(reports::budgets_workbook(&sample(), at).unwrap());

    let names: Vec<&str> = book
        .get_sheet_collection()
        .iter()
        .map(|sheet| sheet.get_name())
        .collect();
    assert_eq!(names, vec!["Capa", "Orcamentos", "Dashboard"]);

    let cover = book.get_sheet_by_name("Capa").unwrap();
    assert_eq!(cover.get_value("B2"), "RELATÓRIO DE ORÇAMENTOS");
    assert_eq!(cover.get_value("B5"), "Data do Relatório: 10/03/2025");
    assert_eq!(number(&book, "Capa", "B10"), 3.0);
    assert!((number(&book, "Capa", "D10") - 170.3).abs() < 1e-9);

    let listing = book.get_sheet_by_name("Orcamentos").unwrap();
    assert_eq!(listing.get_value("B3"), "Paciente");
    assert_eq!(listing.get_value("B4"), "Maria");
    assert_eq!(listing.get_value("E5"), "-");
    assert_eq!(listing.get_value("H4"), "Aceito");
    assert_eq!(listing.get_value("H5"), "Em Negociação");
    assert_eq!(listing.get_value("F7"), "Total:");
    assert!((number(&book, "Orcamentos", "G7") - 170.3).abs() < 1e-9);

    let dashboard = book.get_sheet_by_name("Dashboard").unwrap();
    assert_eq!(dashboard.get_value("B5"), "Aceito");
    assert_eq!(dashboard.get_value("B8"), "TOTAL");
}

#[test]
fn sums_beyond_i64_do_not_overflow() {
    let half = i64::MAX / 2 + 1;
    let budgets = vec![
        budget(1, (1, "Maria"), None, half, BudgetStatus::Accepted),
        budget(2, (2, "Joao"), None, half, BudgetStatus::Accepted),
    ];

    let summary = BudgetSummary::from_budgets(&budgets);
    assert_eq!(summary.value.cents(), 2 * i128::from(half));
    assert_eq!(summary.by_status[0].value.cents(), 2 * i128::from(half));
    assert_eq!(summary.by_dentist[0].value.cents(), 2 * i128::from(half));
    assert_eq!(summary.average_ticket(), Money::new(half));

    let book = read(reports::budgets_workbook(&budgets, Utc::now()).unwrap());
    let expected = 2.0 * half as f64 / 100.0;
    assert!((number(&book, "Capa", "D10") / expected - 1.0).abs() < 1e-9);
}

#[test]
fn budgets_workbook_without_budgets() {
    let book = read(reports::budgets_workbook(&[], Utc::now()).unwrap());
    assert_eq!(number(&book, "Capa", "B10"), 0.0);
    assert_eq!(number(&book, "Capa", "B14"), 0.0);
}

#[test]
fn patients_workbook_lists_every_patient() {
    let at = Utc.with_ymd_and_hms(2024, 12, 1, 9, 0, 0).unwrap();
    let patients = vec![
        PatientOverview {
            patient: Patient {
                id: 7,
                name: "Maria".to_string(),
                phone: None,
                email: Some("maria@mail.com".to_string()),
                created_at: at,
                updated_at: at,
            },
            budget_count: 2,
        },
        PatientOverview {
            patient: Patient {
                id: 8,
                name: "Joao".to_string(),
                phone: Some("11 91111-2222".to_string()),
                email: None,
                created_at: at,
                updated_at: at,
            },
            budget_count: 0,
        },
    ];

    let book = read(reports::patients_workbook(&patients).unwrap());
    let sheet = book.get_sheet_by_name("Pacientes").unwrap();
    assert_eq!(sheet.get_value("A1"), "ID");
    assert_eq!(sheet.get_value("E1"), "Total de Orçamentos");
    assert_eq!(sheet.get_value("B2"), "Maria");
    assert_eq!(sheet.get_value("C2"), "-");
    assert_eq!(sheet.get_value("F2"), "01/12/2024");
    assert_eq!(sheet.get_value("D3"), "-");
    assert_eq!(number(&book, "Pacientes", "A3"), 8.0);
    assert_eq!(number(&book, "Pacientes", "E2"), 2.0);
}
