use std::error::Error;

use project_report::samples;
use project_report::ReportGenerator;

fn main() -> Result<(), Box<dyn Error>> {
    let statistics = samples::sample_statistics();
    let members = samples::sample_members();

    let report = ReportGenerator::new().render(
        &statistics,
        &members,
        Some(samples::SAMPLE_OWNER_ID),
    )?;
    let path = report.save(".")?;
    println!(
        "Generated {} ({} page(s), {} bytes)",
        path.display(),
        report.page_count,
        report.bytes.len()
    );
    Ok(())
}
