use engine::PatientOverview;
use umya_spreadsheet::{Spreadsheet, structs::HorizontalAlignmentValues};

use crate::{ReportError, style};

const HEADERS: [&str; 6] = [
    "ID",
    "Nome",
    "Telefone",
    "Email",
    "Total de Orçamentos",
    "Data de Cadastro",
];

pub(crate) fn build(book: &mut Spreadsheet, patients: &[PatientOverview]) -> Result<(), ReportError> {
    let sheet = book
        .new_sheet("Pacientes")
        .map_err(|err| ReportError::Workbook(format!("sheet Pacientes: {err}")))?;

    style::widths(
        sheet,
        &[
            ("A", 10.0),
            ("B", 30.0),
            ("C", 18.0),
            ("D", 35.0),
            ("E", 20.0),
            ("F", 20.0),
        ],
    );
    style::header_row(sheet, 1, 1, &HEADERS);
    sheet.get_row_dimension_mut(&1).set_height(25.0);

    for (index, overview) in patients.iter().enumerate() {
        let row = index as u32 + 2;
        let patient = &overview.patient;
        sheet
            .get_cell_mut((1, row))
            .set_value_number(f64::from(patient.id));
        sheet.get_cell_mut((2, row)).set_value(patient.name.as_str());
        sheet
            .get_cell_mut((3, row))
            .set_value(patient.phone.as_deref().unwrap_or("-"));
        sheet
            .get_cell_mut((4, row))
            .set_value(patient.email.as_deref().unwrap_or("-"));
        style::number(sheet, (5, row), overview.budget_count);
        sheet
            .get_cell_mut((6, row))
            .set_value(patient.created_at.format("%d/%m/%Y").to_string());
        sheet
            .get_style_mut((6, row))
            .get_alignment_mut()
            .set_horizontal(HorizontalAlignmentValues::Center);
    }

    sheet.set_auto_filter("A1:F1");
    Ok(())
}
