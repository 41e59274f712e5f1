use chrono::{DateTime, Utc};
use engine::{Budget, BudgetStatus};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::{
    ReportError,
    style::{self, PRIMARY},
    summary::BudgetSummary,
};

const DASH: &str = "-";

pub(crate) fn build(
    book: &mut Spreadsheet,
    budgets: &[Budget],
    generated_at: DateTime<Utc>,
) -> Result<(), ReportError> {
    let summary = BudgetSummary::from_budgets(budgets);

    cover(new_sheet(book, "Capa")?, &summary, generated_at);
    listing(new_sheet(book, "Orcamentos")?, budgets, &summary);
    dashboard(new_sheet(book, "Dashboard")?, &summary);
    Ok(())
}

fn new_sheet<'a>(book: &'a mut Spreadsheet, name: &str) -> Result<&'a mut Worksheet, ReportError> {
    book.new_sheet(name)
        .map_err(|err| ReportError::Workbook(format!("sheet {name}: {err}")))
}

fn cover(sheet: &mut Worksheet, summary: &BudgetSummary, generated_at: DateTime<Utc>) {
    style::widths(
        sheet,
        &[("A", 5.0), ("B", 25.0), ("C", 15.0), ("D", 25.0), ("E", 15.0)],
    );

    sheet.add_merge_cells("B2:E2");
    style::title(sheet, (2, 2), "RELATÓRIO DE ORÇAMENTOS", 18.0);
    sheet.add_merge_cells("B3:E3");
    style::caption(sheet, (2, 3), "Clínica Odontológica - Análise de Orçamentos");
    sheet.add_merge_cells("B5:E5");
    style::caption(
        sheet,
        (2, 5),
        &format!("Data do Relatório: {}", generated_at.format("%d/%m/%Y")),
    );

    sheet.add_merge_cells("B7:E7");
    style::title(sheet, (2, 7), "MÉTRICAS CHAVE", 12.0);

    style::caption(sheet, (2, 9), "Total de Orçamentos");
    metric_count(sheet, (2, 10), summary.count);
    style::caption(sheet, (4, 9), "Valor Total");
    style::money(sheet, (4, 10), summary.value);
    metric_font(sheet, (4, 10));

    style::caption(sheet, (2, 11), "Orçamentos Aceitos");
    metric_count(sheet, (2, 12), summary.status(BudgetStatus::Accepted));
    style::caption(sheet, (4, 11), "Em Negociação");
    metric_count(sheet, (4, 12), summary.status(BudgetStatus::Negotiating));

    style::caption(sheet, (2, 13), "Ticket Médio");
    style::money(sheet, (2, 14), summary.average_ticket());
    metric_font(sheet, (2, 14));

    sheet.add_merge_cells("B16:E16");
    style::title(sheet, (2, 16), "CONTEÚDO DO RELATÓRIO", 12.0);
    style::title(sheet, (2, 18), "Orçamentos", 11.0);
    style::caption(sheet, (4, 18), "Lista completa de orçamentos com filtros");
    style::title(sheet, (2, 19), "Dashboard", 11.0);
    style::caption(sheet, (4, 19), "Análises por status, dentista e paciente");
}

fn metric_count(sheet: &mut Worksheet, cell: (u32, u32), value: u64) {
    sheet.get_cell_mut(cell).set_value_number(value as f64);
    metric_font(sheet, cell);
}

fn metric_font(sheet: &mut Worksheet, cell: (u32, u32)) {
    sheet
        .get_style_mut(cell)
        .get_font_mut()
        .set_bold(true)
        .set_size(14.0);
}

/// Columns B..=J, header on row 3, one row per budget, then a totals row.
fn listing(sheet: &mut Worksheet, budgets: &[Budget], summary: &BudgetSummary) {
    style::widths(
        sheet,
        &[
            ("A", 4.0),
            ("B", 22.0),
            ("C", 16.0),
            ("D", 28.0),
            ("E", 18.0),
            ("F", 12.0),
            ("G", 14.0),
            ("H", 16.0),
            ("I", 25.0),
            ("J", 16.0),
        ],
    );

    sheet.add_merge_cells("A1:J1");
    style::title(sheet, (1, 1), "ORÇAMENTOS", 16.0);
    sheet.get_row_dimension_mut(&1).set_height(28.0);

    style::header_row(
        sheet,
        3,
        2,
        &[
            "Paciente",
            "Telefone",
            "Email",
            "Dentista",
            "CRO",
            "Valor Total",
            "Status",
            "Observações",
            "Criado por",
        ],
    );
    sheet.get_row_dimension_mut(&3).set_height(20.0);

    let mut row = 4;
    for budget in budgets {
        let patient = budget.patient.as_ref();
        let dentist = budget.dentist.as_ref();
        let text: [(u32, Option<&str>); 7] = [
            (2, patient.map(|p| p.name.as_str())),
            (3, patient.and_then(|p| p.phone.as_deref())),
            (4, patient.and_then(|p| p.email.as_deref())),
            (5, dentist.map(|d| d.name.as_str())),
            (6, dentist.map(|d| d.cro.as_str())),
            (9, budget.notes.as_deref()),
            (10, budget.user.as_ref().map(|u| u.name.as_str())),
        ];
        for (col, value) in text {
            sheet.get_cell_mut((col, row)).set_value(value.unwrap_or(DASH));
        }
        style::money(sheet, (7, row), budget.final_total);

        sheet
            .get_cell_mut((8, row))
            .set_value(budget.status.label());
        let (fill, font) = style::status_colors(budget.status);
        let status_style = sheet.get_style_mut((8, row));
        status_style.set_background_color(fill);
        status_style.get_font_mut().get_color_mut().set_argb(font);
        row += 1;
    }

    if !budgets.is_empty() {
        sheet.set_auto_filter(format!("B3:J{}", row - 1));
    }

    sheet.get_cell_mut((6, row)).set_value("Total:");
    style::bold(sheet, (6, row));
    style::money(sheet, (7, row), summary.value);
    total_font(sheet, (7, row));

    sheet.get_cell_mut((8, row)).set_value("Média:");
    style::bold(sheet, (8, row));
    sheet.add_merge_cells(format!("I{row}:J{row}"));
    style::money(sheet, (9, row), summary.average_ticket());
    total_font(sheet, (9, row));
}

fn total_font(sheet: &mut Worksheet, cell: (u32, u32)) {
    sheet
        .get_style_mut(cell)
        .get_font_mut()
        .set_bold(true)
        .get_color_mut()
        .set_argb(PRIMARY);
}

/// Three stacked tables in columns B..=E.
fn dashboard(sheet: &mut Worksheet, summary: &BudgetSummary) {
    style::widths(
        sheet,
        &[("A", 3.0), ("B", 24.0), ("C", 12.0), ("D", 16.0), ("E", 16.0)],
    );
    sheet.add_merge_cells("B1:E1");
    style::title(sheet, (2, 1), "DASHBOARD DE ORÇAMENTOS", 16.0);

    style::title(sheet, (2, 3), "ANÁLISE POR STATUS", 11.0);
    style::header_row(sheet, 4, 2, &["Status", "Quantidade", "Valor Total", "% do Total"]);
    let mut row = 5;
    for status_row in &summary.by_status {
        let (fill, font) = style::status_colors(status_row.status);
        sheet
            .get_cell_mut((2, row))
            .set_value(status_row.status.label());
        let label_style = sheet.get_style_mut((2, row));
        label_style.set_background_color(fill);
        label_style
            .get_font_mut()
            .set_bold(true)
            .get_color_mut()
            .set_argb(font);
        style::number(sheet, (3, row), status_row.count);
        style::money(sheet, (4, row), status_row.value);
        style::percent(sheet, (5, row), status_row.share);
        row += 1;
    }
    sheet.get_cell_mut((2, row)).set_value("TOTAL");
    style::number(sheet, (3, row), summary.count);
    style::money(sheet, (4, row), summary.value);
    style::percent(sheet, (5, row), if summary.count == 0 { 0.0 } else { 1.0 });
    for col in 2..=5 {
        style::bold(sheet, (col, row));
    }

    row += 2;
    style::title(sheet, (2, row), "ANÁLISE POR DENTISTA", 11.0);
    row += 1;
    style::header_row(
        sheet,
        row,
        2,
        &["Dentista", "Quantidade", "Valor Total", "Ticket Médio"],
    );
    row += 1;
    for group in &summary.by_dentist {
        sheet.get_cell_mut((2, row)).set_value(group.name.as_str());
        style::number(sheet, (3, row), group.count);
        style::money(sheet, (4, row), group.value);
        style::money(sheet, (5, row), group.average());
        row += 1;
    }

    row += 2;
    style::title(sheet, (2, row), "ANÁLISE POR PACIENTE", 11.0);
    row += 1;
    style::header_row(sheet, row, 2, &["Paciente", "Orçamentos", "Valor Total"]);
    row += 1;
    for group in &summary.by_patient {
        sheet.get_cell_mut((2, row)).set_value(group.name.as_str());
        style::number(sheet, (3, row), group.count);
        style::money(sheet, (4, row), group.value);
        row += 1;
    }
}
