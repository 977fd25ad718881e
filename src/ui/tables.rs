use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::CategoryColors;
use crate::data::model::{CellValue, Table};

/// Render a table with a sticky header, scrolling both ways.
///
/// When `label_colors` is given, string cells of the last column are tinted
/// with their category colour.
pub fn data_table(
    ui: &mut Ui,
    id: &str,
    table: &Table,
    max_height: f32,
    label_colors: Option<&CategoryColors>,
) {
    let last = table.width().saturating_sub(1);

    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(max_height)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(36.0))
                .columns(Column::auto().at_least(72.0), table.width())
                .header(22.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("#");
                    });
                    for name in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.len(), |mut row| {
                        let idx = row.index();
                        row.col(|ui: &mut Ui| {
                            ui.weak(idx.to_string());
                        });
                        for (col, cell) in table.rows()[idx].iter().enumerate() {
                            row.col(|ui: &mut Ui| {
                                let mut text = RichText::new(cell.to_string());
                                match (cell, label_colors) {
                                    (CellValue::String(s), Some(colors)) if col == last => {
                                        text = text.color(colors.color_for(s)).strong();
                                    }
                                    (CellValue::Null, _) => text = text.weak(),
                                    _ => {}
                                }
                                ui.label(text);
                            });
                        }
                    });
                });
        });
    });
}
