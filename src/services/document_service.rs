// src/services/document_service.rs

use std::path::PathBuf;

use genpdf::{elements, style, Alignment, Element};

use crate::{
    common::error::AppError,
    services::report_builder::{ReportBlock, ReportDocument, ReportTable},
};

#[derive(Debug, Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
    font_family: String,
    logo_path: Option<PathBuf>,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>, logo_path: Option<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
            logo_path,
        }
    }

    /// Renderiza o documento em memória (bytes do PDF).
    pub fn render(&self, report: &ReportDocument) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|_| {
                AppError::FontNotFound(format!(
                    "{} em {}",
                    self.font_family,
                    self.fonts_dir.display()
                ))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(report.title.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        if let Some(logo) = self.logo() {
            doc.push(logo);
            doc.push(elements::Break::new(1));
        }

        let mut title = elements::Paragraph::new(report.title.clone());
        title.set_alignment(Alignment::Center);
        doc.push(title.styled(style::Style::new().bold().with_font_size(16)));
        doc.push(elements::Break::new(1));

        doc.push(elements::Paragraph::new(format!("Date du Rapport : {}", report.generated_on)));
        doc.push(elements::Paragraph::new(format!("Période Analysée : {}", report.period)));
        doc.push(elements::Break::new(1.5));

        // --- SEÇÕES ---
        for section in &report.sections {
            doc.push(
                elements::Paragraph::new(section.heading.clone())
                    .styled(style::Style::new().bold().with_font_size(13)),
            );
            doc.push(elements::Break::new(0.5));

            for block in &section.blocks {
                match block {
                    ReportBlock::Subtitle(text) => doc.push(
                        elements::Paragraph::new(text.clone())
                            .styled(style::Style::new().italic().with_font_size(11)),
                    ),
                    ReportBlock::Table(table) => {
                        doc.push(table_layout(table)?);
                        doc.push(elements::Break::new(0.5));
                    }
                }
            }
            doc.push(elements::Break::new(1));
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::PdfRender(e.to_string()))?;

        tracing::debug!("PDF \"{}\" renderizado ({} bytes)", report.title, buffer.len());
        Ok(buffer)
    }

    // Logo é opcional: se não carregar, o relatório sai sem ele.
    fn logo(&self) -> Option<elements::Image> {
        let path = self.logo_path.as_ref()?;
        match elements::Image::from_path(path) {
            Ok(image) => Some(
                image
                    .with_alignment(Alignment::Center)
                    .with_scale(genpdf::Scale::new(0.5, 0.5)),
            ),
            Err(e) => {
                tracing::warn!("Logo {} ignorado: {}", path.display(), e);
                None
            }
        }
    }
}

fn table_layout(table: &ReportTable) -> Result<elements::TableLayout, AppError> {
    let columns = table.headers.len().max(1);
    let mut layout = elements::TableLayout::new(vec![1; columns]);
    layout.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let bold = style::Style::new().bold();
    let mut header = layout.row();
    for cell in &table.headers {
        header.push_element(elements::Paragraph::new(cell.clone()).styled(bold));
    }
    header.push().map_err(|e| AppError::PdfRender(e.to_string()))?;

    for row in &table.rows {
        let mut line = layout.row();
        // Linha curta é completada com células vazias
        for i in 0..columns {
            let text = row.get(i).cloned().unwrap_or_default();
            line.push_element(elements::Paragraph::new(text));
        }
        line.push().map_err(|e| AppError::PdfRender(e.to_string()))?;
    }

    Ok(layout)
}
