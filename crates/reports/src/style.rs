//! Cell styling shared by the workbooks.

use umya_spreadsheet::{Worksheet, structs::HorizontalAlignmentValues};

use crate::summary::Total;

pub(crate) const PRIMARY: &str = "FF1F4E79";
pub(crate) const GRAY: &str = "FF666666";
pub(crate) const WHITE: &str = "FFFFFFFF";
pub(crate) const MONEY_FORMAT: &str = r#""R$" #,##0.00"#;
pub(crate) const PERCENT_FORMAT: &str = "0.00%";

/// Fill and font colours of a status cell.
pub(crate) fn status_colors(status: engine::BudgetStatus) -> (&'static str, &'static str) {
    match status {
        engine::BudgetStatus::Accepted => ("FFC6EFCE", "FF006100"),
        engine::BudgetStatus::Negotiating => ("FFFFEB9C", "FF9C5700"),
        engine::BudgetStatus::Rejected => ("FFFFC7CE", "FF9C0006"),
    }
}

pub(crate) fn title(sheet: &mut Worksheet, cell: (u32, u32), text: &str, size: f64) {
    sheet.get_cell_mut(cell).set_value(text);
    let style = sheet.get_style_mut(cell);
    style
        .get_font_mut()
        .set_bold(true)
        .set_size(size)
        .get_color_mut()
        .set_argb(PRIMARY);
}

pub(crate) fn caption(sheet: &mut Worksheet, cell: (u32, u32), text: &str) {
    sheet.get_cell_mut(cell).set_value(text);
    let font = sheet.get_style_mut(cell).get_font_mut();
    font.set_size(10.0);
    font.get_color_mut().set_argb(GRAY);
}

/// White bold text on the primary colour, centered.
pub(crate) fn header_row(sheet: &mut Worksheet, row: u32, first_col: u32, labels: &[&str]) {
    for (offset, label) in labels.iter().enumerate() {
        let cell = (first_col + offset as u32, row);
        sheet.get_cell_mut(cell).set_value(*label);
        let style = sheet.get_style_mut(cell);
        style.set_background_color(PRIMARY);
        let font = style.get_font_mut();
        font.set_bold(true);
        font.get_color_mut().set_argb(WHITE);
        style
            .get_alignment_mut()
            .set_horizontal(HorizontalAlignmentValues::Center);
    }
}

pub(crate) fn money(sheet: &mut Worksheet, cell: (u32, u32), amount: impl Into<Total>) {
    sheet.get_cell_mut(cell).set_value_number(amount.into().to_major());
    sheet
        .get_style_mut(cell)
        .get_number_format_mut()
        .set_format_code(MONEY_FORMAT);
}

pub(crate) fn number(sheet: &mut Worksheet, cell: (u32, u32), value: u64) {
    sheet.get_cell_mut(cell).set_value_number(value as f64);
    sheet
        .get_style_mut(cell)
        .get_alignment_mut()
        .set_horizontal(HorizontalAlignmentValues::Center);
}

pub(crate) fn percent(sheet: &mut Worksheet, cell: (u32, u32), value: f64) {
    sheet.get_cell_mut(cell).set_value_number(value);
    sheet
        .get_style_mut(cell)
        .get_number_format_mut()
        .set_format_code(PERCENT_FORMAT);
}

pub(crate) fn bold(sheet: &mut Worksheet, cell: (u32, u32)) {
    sheet.get_style_mut(cell).get_font_mut().set_bold(true);
}

pub(crate) fn widths(sheet: &mut Worksheet, widths: &[(&str, f64)]) {
    for (column, width) in widths {
        sheet.get_column_dimension_mut(column).set_width(*width);
    }
}
