use chrono::{Local, TimeZone};
use project_report::fonts;
use project_report::model::ProjectStatistics;
use project_report::pdf::PdfCanvas;
use project_report::samples;
use project_report::style::PageSize;
use project_report::{RenderedReport, ReportError, ReportGenerator};
use sha2::{Digest, Sha256};

fn generator() -> ReportGenerator {
    let generated_at = Local
        .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
        .single()
        .expect("unambiguous local time");
    ReportGenerator::new().with_timestamp(generated_at)
}

fn render_sample_report() -> RenderedReport {
    generator()
        .render(
            &samples::sample_statistics(),
            &samples::sample_members(),
            Some(samples::SAMPLE_OWNER_ID),
        )
        .expect("render sample report")
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() && data[cursor] != terminator {
                    if terminator == b')'
                        || !matches!(data[cursor], b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t')
                    {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while let Some(start_pos) = data[offset..]
            .windows(start.len())
            .position(|window| window == start)
        {
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    for (start, end) in [
        (&b"<xmp:CreateDate>"[..], &b"</xmp:CreateDate>"[..]),
        (b"<xmp:ModifyDate>", b"</xmp:ModifyDate>"),
        (b"<xmp:MetadataDate>", b"</xmp:MetadataDate>"),
        (b"<xmpMM:DocumentID>", b"</xmpMM:DocumentID>"),
        (b"<xmpMM:InstanceID>", b"</xmpMM:InstanceID>"),
        (b"<xmpMM:VersionID>", b"</xmpMM:VersionID>"),
    ] {
        scrub_xml(&mut normalized, start, end);
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(scrub_pdf(bytes)).into()
}

#[test]
fn renders_pdf_output() {
    let report = render_sample_report();
    assert!(report.bytes.starts_with(b"%PDF"));
    assert_eq!(report.page_count, 1);
    assert_eq!(report.file_name, "Q3_Launch_Analytics_Report.pdf");
    assert_eq!(report.sections.len(), 5);
    assert!(report.sections.iter().all(|mark| mark.page == 1));
}

#[test]
fn rendering_is_deterministic() {
    let report_a = render_sample_report();
    let report_b = render_sample_report();

    assert_eq!(
        report_a.bytes.len(),
        report_b.bytes.len(),
        "PDF sizes should match"
    );
    assert_eq!(
        normalized_hash(&report_a.bytes),
        normalized_hash(&report_b.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn empty_statistics_render_without_error() {
    let report = generator()
        .with_logo(None)
        .render(&ProjectStatistics::new("Nothing Yet"), &[], None)
        .expect("empty statistics render");
    assert!(report.bytes.starts_with(b"%PDF"));
    assert_eq!(report.page_count, 1);
}

#[test]
fn overflowing_report_spans_pages() {
    let mut stats = samples::sample_statistics();
    stats.tasks_by_status = (0..80).map(|index| (format!("Stage {index}"), 3)).collect();
    let report = generator()
        .render(&stats, &samples::sample_members(), None)
        .expect("long report renders");
    assert!(report.page_count >= 3);
}

#[test]
fn saves_report_into_directory() {
    let report = render_sample_report();
    let dir = tempfile::tempdir().expect("temp dir");
    let target = dir.path().join("nested");

    let path = report.save(&target).expect("report saved");
    assert_eq!(path, target.join("Q3_Launch_Analytics_Report.pdf"));
    assert_eq!(std::fs::read(&path).expect("saved file"), report.bytes);
}

#[test]
fn save_failure_is_reported() {
    let report = render_sample_report();
    let dir = tempfile::tempdir().expect("temp dir");
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, b"not a directory").expect("blocker file");

    match report.save(&blocker) {
        Err(ReportError::Io { path, .. }) => assert_eq!(path, blocker),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn embedded_fonts_are_used_when_available() {
    if !fonts::default_fonts_available() {
        eprintln!(
            "Skipping embedded_fonts_are_used_when_available: fonts missing. Set PROJECT_REPORT_FONTS_DIR or copy assets/fonts next to the binary."
        );
        return;
    }
    let canvas = PdfCanvas::new("Fonts", PageSize::A4).expect("canvas with fonts");
    assert!(canvas.uses_embedded_fonts());
}

#[cfg(feature = "bookmarks")]
#[test]
fn bookmarks_add_an_outline_per_section() {
    let report = generator()
        .render_with_bookmarks(
            &samples::sample_statistics(),
            &samples::sample_members(),
            None,
        )
        .expect("bookmarked render");

    let document = lopdf::Document::load_mem(&report.bytes).expect("valid PDF");
    let catalog = document.catalog().expect("catalog");
    let outlines_id = catalog
        .get(b"Outlines")
        .and_then(lopdf::Object::as_reference)
        .expect("outline root");
    let outlines = document
        .get_dictionary(outlines_id)
        .expect("outline dictionary");
    let count = outlines
        .get(b"Count")
        .and_then(lopdf::Object::as_i64)
        .expect("outline count");
    assert_eq!(count, report.sections.len() as i64);
}
