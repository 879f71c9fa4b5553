use crate::error::Result;
use crate::services::report_service::OverviewReport;
use rust_xlsxwriter::*;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub struct ExportService;

struct Styles {
    header: Format,
    label: Format,
    number: Format,
    alt_row: Color,
}

impl Styles {
    fn new(border_color: Color, header_bg: Color, alt_row: Color) -> Self {
        let header = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let label = Format::new()
            .set_font_size(10)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let number = label.clone().set_align(FormatAlign::Center);
        Self {
            header,
            label,
            number,
            alt_row,
        }
    }
}

/// Two-column table with zebra rows; leaves `row` one past a blank spacer.
fn write_section(
    worksheet: &mut Worksheet,
    styles: &Styles,
    row: &mut u32,
    title: &str,
    lines: &[(String, i64)],
) -> Result<()> {
    worksheet.write_string_with_format(*row, 0, title, &styles.header)?;
    worksheet.write_string_with_format(*row, 1, "Total", &styles.header)?;
    *row += 1;
    for (idx, (label, value)) in lines.iter().enumerate() {
        let (label_fmt, value_fmt) = if idx % 2 == 1 {
            (
                styles.label.clone().set_background_color(styles.alt_row),
                styles.number.clone().set_background_color(styles.alt_row),
            )
        } else {
            (styles.label.clone(), styles.number.clone())
        };
        worksheet.write_string_with_format(*row, 0, label, &label_fmt)?;
        worksheet.write_number_with_format(*row, 1, *value as f64, &value_fmt)?;
        *row += 1;
    }
    *row += 1;
    Ok(())
}

impl ExportService {
    fn role_label(role: crate::models::user::UserRole) -> &'static str {
        use crate::models::user::UserRole;
        match role {
            UserRole::Admin => "Administrador",
            UserRole::Manager => "Gerente",
            UserRole::Seller => "Vendedor",
        }
    }

    /// Styled workbook with the overview counts: headline figures, then one
    /// table per breakdown.
    pub fn generate_overview_xlsx(report: &OverviewReport) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Resumen")?;

        // ── Palette ──
        let primary_color = Color::RGB(0x0B3D91);
        let header_bg = Color::RGB(0x1E293B);
        let alt_row = Color::RGB(0xF1F5F9);
        let border_color = Color::RGB(0xE2E8F0);
        let accent = Color::RGB(0x10B981);

        worksheet.set_column_width(0, 36.0)?;
        worksheet.set_column_width(1, 18.0)?;

        let title_format = Format::new()
            .set_font_size(16)
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(primary_color)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        worksheet.set_row_height(0, 36)?;
        worksheet.merge_range(0, 0, 0, 1, "Desafío Aviva: resumen", &title_format)?;

        let subtitle_format = Format::new()
            .set_font_size(10)
            .set_italic()
            .set_font_color(Color::RGB(0x94A3B8))
            .set_align(FormatAlign::Center);
        let subtitle = format!(
            "Generado: {}",
            report.generated_at.format("%d/%m/%Y %H:%M UTC")
        );
        worksheet.merge_range(1, 0, 1, 1, &subtitle, &subtitle_format)?;

        let styles = Styles::new(border_color, header_bg, alt_row);
        let highlight_format = styles
            .number
            .clone()
            .set_bold()
            .set_font_color(accent);

        let mut row: u32 = 3;
        write_section(
            worksheet,
            &styles,
            &mut row,
            "Indicador",
            &[
                ("Preguntas".to_string(), report.total_questions),
                ("Quizzes publicados".to_string(), report.quizzes_published),
                ("Quizzes en borrador".to_string(), report.quizzes_draft),
                ("Invitaciones pendientes".to_string(), report.pending_invitations),
                ("Recorridos".to_string(), report.journeys),
            ],
        )?;

        let per_product: Vec<(String, i64)> = report
            .questions_per_product
            .iter()
            .map(|p| {
                let name = p.product_name.clone().unwrap_or_else(|| "Sin producto".to_string());
                (name, p.questions)
            })
            .collect();
        write_section(worksheet, &styles, &mut row, "Preguntas por producto", &per_product)?;

        let per_role: Vec<(String, i64)> = report
            .users_per_role
            .iter()
            .map(|r| (Self::role_label(r.role).to_string(), r.users))
            .collect();
        write_section(worksheet, &styles, &mut row, "Usuarios por rol", &per_role)?;
        let users_total: i64 = report.users_per_role.iter().map(|r| r.users).sum();
        worksheet.write_string_with_format(row, 0, "Total usuarios", &styles.label)?;
        worksheet.write_number_with_format(row, 1, users_total as f64, &highlight_format)?;

        worksheet.set_freeze_panes(2, 0)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
