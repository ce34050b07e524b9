//! A small PDF 1.4 writer for text-only reports.
//!
//! Pages use the standard Helvetica faces with WinAnsi encoding, so no
//! fonts are embedded. Characters WinAnsi cannot represent print as `?`.

use std::fmt::Write as _;

const POINTS_PER_MM: f32 = 72.0 / 25.4;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;
const LEADING: f32 = 1.35;

/// Code points WinAnsi places in 0x80..=0x9F, where Latin-1 has controls.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// Portrait paper size and margins, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width_mm: f32,
    pub height_mm: f32,
    /// Top, right, bottom, left.
    pub margins_mm: [f32; 4],
}

impl PageSetup {
    pub const fn a4_portrait(margin_mm: f32) -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margins_mm: [margin_mm; 4],
        }
    }

    fn page_size_pt(&self) -> (f32, f32) {
        (self.width_mm * POINTS_PER_MM, self.height_mm * POINTS_PER_MM)
    }

    /// Width left between the side margins, in points.
    fn usable_width_pt(&self) -> f32 {
        let [_, right, _, left] = self.margins_pt();
        self.page_size_pt().0 - left - right
    }

    fn margins_pt(&self) -> [f32; 4] {
        self.margins_mm.map(|m| m * POINTS_PER_MM)
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4_portrait(10.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
}

impl PdfLine {
    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 14.0,
            bold: true,
        }
    }

    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 10.0,
            bold: false,
        }
    }

    pub fn blank() -> Self {
        Self::body("")
    }
}

/// Lays `lines` out top to bottom, wrapping long lines and starting new
/// pages as needed, and returns the encoded document.
pub fn write_pdf(
    lines: &[PdfLine],
    setup: &PageSetup,
) -> Vec<u8> {
    let (width, height) = setup.page_size_pt();
    let [top, _, bottom, left] = setup.margins_pt();
    let pages = paginate(lines, setup.usable_width_pt(), height - top - bottom);

    let mut doc = Document::default();
    doc.object(1, b"<< /Type /Catalog /Pages 2 0 R >>");

    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", page_object(i)))
        .collect();
    doc.object(
        2,
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .as_bytes(),
    );
    doc.object(
        3,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );
    doc.object(
        4,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );

    for (i, page) in pages.iter().enumerate() {
        let content = page_content(page, left, height - top);
        doc.object(
            page_object(i),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width:.2} {height:.2}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                page_object(i) + 1
            )
            .as_bytes(),
        );
        doc.stream(page_object(i) + 1, &content);
    }

    doc.finish()
}

/// Page objects start after the catalog, page tree and two fonts; each
/// page is followed by its content stream.
fn page_object(index: usize) -> usize {
    5 + index * 2
}

fn paginate(
    lines: &[PdfLine],
    usable_width: f32,
    usable_height: f32,
) -> Vec<Vec<PdfLine>> {
    let mut pages = vec![Vec::new()];
    let mut used = 0.0;

    for line in lines.iter().flat_map(|line| wrap(line, usable_width)) {
        let advance = line.size * LEADING;
        if used + advance > usable_height && used > 0.0 {
            pages.push(Vec::new());
            used = 0.0;
        }
        used += advance;
        if let Some(page) = pages.last_mut() {
            page.push(line);
        }
    }
    pages
}

fn chars_per_line(
    size: f32,
    usable_width: f32,
) -> usize {
    ((usable_width / (size * GLYPH_WIDTH)) as usize).max(1)
}

/// Breaks `line` at whitespace so each piece fits `usable_width`. Words
/// wider than a whole line are cut at the width.
fn wrap(
    line: &PdfLine,
    usable_width: f32,
) -> Vec<PdfLine> {
    let max_chars = chars_per_line(line.size, usable_width);
    if line.text.chars().count() <= max_chars {
        return vec![line.clone()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let words = line.text.split_whitespace().flat_map(|word| {
        let chars: Vec<char> = word.chars().collect();
        chars
            .chunks(max_chars)
            .map(|piece| piece.iter().collect::<String>())
            .collect::<Vec<_>>()
    });
    for word in words {
        let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
        if needed > max_chars && !current.is_empty() {
            out.push(PdfLine {
                text: std::mem::take(&mut current),
                ..line.clone()
            });
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        out.push(PdfLine {
            text: current,
            ..line.clone()
        });
    }
    out
}

fn page_content(
    lines: &[PdfLine],
    left: f32,
    top: f32,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut y = top;
    for line in lines {
        y -= line.size * LEADING;
        if line.text.is_empty() {
            continue;
        }
        let font = if line.bold { "F2" } else { "F1" };
        let mut ops = String::new();
        let _ = write!(ops, "BT /{font} {:.1} Tf {left:.2} {y:.2} Td (", line.size);
        out.extend_from_slice(ops.as_bytes());
        encode_text(&line.text, &mut out);
        out.extend_from_slice(b") Tj ET\n");
    }
    out
}

/// Escapes and encodes `text` as a PDF literal string body in WinAnsi.
fn encode_text(
    text: &str,
    out: &mut Vec<u8>,
) {
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            c if (c as u32) < 0x20 => out.push(b' '),
            c => out.push(win_ansi(c)),
        }
    }
}

/// WinAnsi byte for `ch`: ASCII and Latin-1 map to themselves, the
/// typographic extras to their slot in 0x80..=0x9F, everything else to `?`.
fn win_ansi(ch: char) -> u8 {
    match u32::from(ch) {
        0x20..=0x7E | 0xA0..=0xFF => ch as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(c, _)| *c == ch)
            .map_or(b'?', |(_, byte)| *byte),
    }
}

#[derive(Default)]
struct Document {
    bytes: Vec<u8>,
    offsets: Vec<(usize, usize)>,
}

impl Document {
    fn begin(
        &mut self,
        id: usize,
    ) {
        if self.bytes.is_empty() {
            self.bytes.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        }
        self.offsets.push((id, self.bytes.len()));
        self.bytes.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    }

    fn object(
        &mut self,
        id: usize,
        body: &[u8],
    ) {
        self.begin(id);
        self.bytes.extend_from_slice(body);
        self.bytes.extend_from_slice(b"\nendobj\n");
    }

    fn stream(
        &mut self,
        id: usize,
        data: &[u8],
    ) {
        self.begin(id);
        self.bytes
            .extend_from_slice(format!("<< /Length {} >>\nstream\n", data.len()).as_bytes());
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        self.offsets.sort_unstable();
        let xref_at = self.bytes.len();
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for (_, offset) in &self.offsets {
            let _ = write!(xref, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
        );
        self.bytes.extend_from_slice(xref.as_bytes());
        self.bytes
    }
}
