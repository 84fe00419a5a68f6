//! Minimal single-page PDF 1.4 writer for text-only documents.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone)]
struct TextRun {
    font: Font,
    size: f32,
    x: f32,
    y: f32,
    text: String,
}

#[derive(Debug, Clone)]
pub struct PdfPage {
    width: f32,
    height: f32,
    runs: Vec<TextRun>,
    border: Option<f32>,
}

impl PdfPage {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            runs: Vec::new(),
            border: None,
        }
    }

    /// A4 landscape in points.
    pub fn a4_landscape() -> Self {
        Self::new(842.0, 595.0)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Draws a rectangle inset by `margin` points from every edge.
    pub fn border(mut self, margin: f32) -> Self {
        self.border = Some(margin);
        self
    }

    pub fn text(mut self, font: Font, size: f32, x: f32, y: f32, text: &str) -> Self {
        self.runs.push(TextRun {
            font,
            size,
            x,
            y,
            text: text.to_string(),
        });
        self
    }

    /// Horizontally centred using an average glyph width of half the font size.
    pub fn centered_text(self, font: Font, size: f32, y: f32, text: &str) -> Self {
        let approx_width = text.chars().count() as f32 * size * 0.5;
        let x = ((self.width - approx_width) / 2.0).max(0.0);
        self.text(font, size, x, y, text)
    }

    fn content_stream(&self) -> String {
        let mut out = String::new();
        if let Some(margin) = self.border {
            let _ = writeln!(
                out,
                "2 w {margin:.2} {margin:.2} {:.2} {:.2} re S",
                self.width - 2.0 * margin,
                self.height - 2.0 * margin
            );
        }
        for run in &self.runs {
            let _ = writeln!(
                out,
                "BT /{} {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
                run.font.resource_name(),
                run.size,
                run.x,
                run.y,
                escape_text(&run.text)
            );
        }
        out
    }

    pub fn render(&self) -> Vec<u8> {
        let content = self.content_stream();
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.0} {:.0}] \
                 /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>",
                self.width, self.height
            ),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                content.len(),
                content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut out = String::from("%PDF-1.4\n");
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
        }

        let xref_offset = out.len();
        let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(out, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            out,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        );

        out.into_bytes()
    }
}

/// Escapes PDF string delimiters. Characters the fonts' WinAnsi encoding covers are
/// written as octal escapes; anything else becomes `?`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            ' '..='~' => out.push(c),
            _ => match winansi_byte(c) {
                Some(byte) => {
                    let _ = write!(out, "\\{byte:03o}");
                }
                None => out.push('?'),
            },
        }
    }
    out
}

/// Byte for `c` in WinAnsiEncoding (Windows-1252), outside printable ASCII.
fn winansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => return None,
    };
    Some(byte)
}
