//! Word-compatible HTML rendering.
//!
//! Word opens HTML saved with a `.doc` extension when the root element carries
//! the Office namespaces, so a report is a single HTML page with a header block
//! and one bordered table.

use std::borrow::Cow;
use std::fmt;

use crate::config::TeacherData;
use crate::model::{CounselingLog, Student};

use super::escape::Escaper;

/// Fixed column set and cell values of one record type.
pub trait ReportRow {
    /// Column headings after the leading `No` column.
    const COLUMNS: &'static [&'static str];

    /// Cell values in `COLUMNS` order, unescaped.
    fn cells(&self) -> Vec<String>;
}

impl ReportRow for Student {
    const COLUMNS: &'static [&'static str] = &["Nama Siswa", "Kelas", "No. HP", "Alamat"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.class_name.clone(),
            self.phone.clone(),
            self.address.clone(),
        ]
    }
}

impl ReportRow for CounselingLog {
    const COLUMNS: &'static [&'static str] = &[
        "Tanggal",
        "Nama Siswa",
        "Kelas",
        "Jenis",
        "Aspek",
        "Hasil",
        "Tindak Lanjut",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.date.format("%Y-%m-%d").to_string(),
            self.student.student_name.clone(),
            self.student.class_name.clone(),
            self.counseling_type.label().to_string(),
            self.aspect.label().to_string(),
            self.result.clone(),
            self.follow_up.clone(),
        ]
    }
}

/// Text above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader<'a> {
    /// Content of the `<title>` element.
    pub document_title: &'a str,
    /// Centered heading.
    pub title: &'a str,
    /// Teacher identity block.
    pub teacher: &'a TeacherData,
    /// Academic year line.
    pub academic_year: &'a str,
    /// Optional `Kategori :` line (the active filter).
    pub category: Option<&'a str>,
}

/// Column headings and rows, in the order they will be numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    columns: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl ReportTable {
    /// Collect the rows of `records`, keeping their order.
    pub fn from_records<'r, R, I>(records: I) -> Self
    where
        R: ReportRow + 'r,
        I: IntoIterator<Item = &'r R>,
    {
        Self {
            columns: R::COLUMNS,
            rows: records.into_iter().map(R::cells).collect(),
        }
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

const CELL: &str = r#"<td style="padding:5px">"#;
const NUMBER_CELL: &str = r#"<td style="padding:5px; text-align:center">"#;
const HEADING_CELL: &str = r#"<th style="padding:5px">"#;
const CENTERED: &str = r#"<p style="text-align:center">"#;

/// Render a complete report document.
#[must_use]
pub fn render_report(header: &ReportHeader<'_>, table: &ReportTable, escaper: &dyn Escaper) -> String {
    HtmlReport {
        header,
        table,
        escaper,
    }
    .to_string()
}

struct HtmlReport<'a> {
    header: &'a ReportHeader<'a>,
    table: &'a ReportTable,
    escaper: &'a dyn Escaper,
}

impl HtmlReport<'_> {
    fn esc<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.escaper.escape(text)
    }
}

impl fmt::Display for HtmlReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header;

        writeln!(
            f,
            "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
             xmlns:w='urn:schemas-microsoft-com:office:word' \
             xmlns='http://www.w3.org/TR/REC-html40'>"
        )?;
        writeln!(
            f,
            "<head><meta charset='utf-8'><title>{}</title></head>",
            self.esc(header.document_title)
        )?;
        writeln!(f, "<body>")?;
        writeln!(
            f,
            r#"<h1 style="text-align:center">{}</h1>"#,
            self.esc(header.title)
        )?;
        writeln!(f, "{CENTERED}{}</p>", self.esc(&header.teacher.school))?;
        writeln!(f, "{CENTERED}Guru Wali : {}</p>", self.esc(&header.teacher.name))?;
        writeln!(f, "{CENTERED}NIP : {}</p>", self.esc(&header.teacher.nip))?;
        writeln!(
            f,
            r#"<p style="text-align:center; font-weight:bold">Tahun Ajaran : {}</p>"#,
            self.esc(header.academic_year)
        )?;
        if let Some(category) = header.category {
            writeln!(f, "{CENTERED}Kategori : {}</p>", self.esc(category))?;
        }
        writeln!(f, "<hr>")?;

        writeln!(
            f,
            r#"<table border="1" style="width:100%; border-collapse:collapse">"#
        )?;
        writeln!(f, "<thead>")?;
        writeln!(f, r#"<tr style="background:#eee">"#)?;
        writeln!(f, "{HEADING_CELL}No</th>")?;
        for column in self.table.columns {
            writeln!(f, "{HEADING_CELL}{column}</th>")?;
        }
        writeln!(f, "</tr>")?;
        writeln!(f, "</thead>")?;

        writeln!(f, "<tbody>")?;
        for (index, cells) in self.table.rows.iter().enumerate() {
            writeln!(f, "<tr>")?;
            writeln!(f, "{NUMBER_CELL}{}</td>", index + 1)?;
            for cell in cells {
                writeln!(f, "{CELL}{}</td>", self.esc(cell))?;
            }
            writeln!(f, "</tr>")?;
        }
        writeln!(f, "</tbody>")?;
        writeln!(f, "</table>")?;
        writeln!(f, "</body>")?;
        write!(f, "</html>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewStudent, StudentId};
    use crate::report::escape::{HtmlEscaper, Verbatim};

    fn teacher() -> TeacherData {
        TeacherData {
            name: "Siti Aminah".to_string(),
            school: "SMA Negeri 1 Contoh".to_string(),
            nip: "1980".to_string(),
        }
    }

    fn student(n: usize, name: &str) -> Student {
        Student::from_new(
            StudentId::from(format!("s-{n}")),
            NewStudent {
                name: name.to_string(),
                class_name: "X-1".to_string(),
                address: "Jl. Mawar".to_string(),
                phone: "0812".to_string(),
                ..NewStudent::default()
            },
        )
    }

    fn header<'a>(teacher: &'a TeacherData, category: Option<&'a str>) -> ReportHeader<'a> {
        ReportHeader {
            document_title: "Daftar Siswa Bimbingan",
            title: "Daftar Siswa Bimbingan",
            teacher,
            academic_year: "2024/2025",
            category,
        }
    }

    fn body_rows(html: &str) -> usize {
        let start = html.find("<tbody>").unwrap();
        let end = html.find("</tbody>").unwrap();
        html[start..end].matches("<tr>").count()
    }

    #[test]
    fn test_empty_table_is_well_formed() {
        let teacher = teacher();
        let table = ReportTable::from_records::<Student, _>(&[]);
        let html = render_report(&header(&teacher, None), &table, &HtmlEscaper);

        assert!(table.is_empty());
        assert_eq!(body_rows(&html), 0);
        assert!(html.contains("<tbody>\n</tbody>"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_rows_numbered_from_one_in_order() {
        let teacher = teacher();
        let students = vec![student(1, "Ani"), student(2, "Bayu"), student(3, "Citra")];
        let table = ReportTable::from_records(&students);
        let html = render_report(&header(&teacher, None), &table, &HtmlEscaper);

        assert_eq!(body_rows(&html), 3);
        let ani = html.find(">Ani<").unwrap();
        let bayu = html.find(">Bayu<").unwrap();
        let citra = html.find(">Citra<").unwrap();
        assert!(ani < bayu && bayu < citra);
        for n in 1..=3 {
            assert!(html.contains(&format!("{NUMBER_CELL}{n}</td>")));
        }
    }

    #[test]
    fn test_student_columns_in_fixed_order() {
        let teacher = teacher();
        let table = ReportTable::from_records(&[student(1, "Ani")]);
        let html = render_report(&header(&teacher, None), &table, &HtmlEscaper);

        let order = ["No", "Nama Siswa", "Kelas", "No. HP", "Alamat"];
        let positions: Vec<usize> = order
            .iter()
            .map(|h| html.find(&format!("{HEADING_CELL}{h}</th>")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_teacher_block_and_category() {
        let teacher = teacher();
        let table = ReportTable::from_records::<Student, _>(&[]);
        let html = render_report(&header(&teacher, Some("Klasikal")), &table, &HtmlEscaper);

        assert!(html.contains("Guru Wali : Siti Aminah"));
        assert!(html.contains("NIP : 1980"));
        assert!(html.contains("SMA Negeri 1 Contoh"));
        assert!(html.contains("Tahun Ajaran : 2024/2025"));
        assert!(html.contains("Kategori : Klasikal"));
        assert!(html.contains("urn:schemas-microsoft-com:office:word"));
    }

    #[test]
    fn test_no_category_line_without_category() {
        let teacher = teacher();
        let table = ReportTable::from_records::<Student, _>(&[]);
        let html = render_report(&header(&teacher, None), &table, &HtmlEscaper);
        assert!(!html.contains("Kategori"));
    }

    #[test]
    fn test_markup_in_free_text_cannot_break_table() {
        let teacher = teacher();
        let table = ReportTable::from_records(&[student(1, "</td></tr><tr><td>Ani")]);
        let html = render_report(&header(&teacher, None), &table, &HtmlEscaper);

        assert_eq!(body_rows(&html), 1);
        assert!(html.contains("&lt;/td&gt;&lt;/tr&gt;&lt;tr&gt;&lt;td&gt;Ani"));
    }

    #[test]
    fn test_verbatim_policy_reproduces_unescaped_output() {
        let teacher = teacher();
        let table = ReportTable::from_records(&[student(1, "A & B")]);
        let html = render_report(&header(&teacher, None), &table, &Verbatim);
        assert!(html.contains(">A & B<"));
    }

    #[test]
    fn test_ampersand_in_category_is_escaped() {
        let teacher = teacher();
        let table = ReportTable::from_records::<Student, _>(&[]);
        let html = render_report(
            &header(&teacher, Some("Individual & Klasikal")),
            &table,
            &HtmlEscaper,
        );
        assert!(html.contains("Kategori : Individual &amp; Klasikal"));
    }
}
