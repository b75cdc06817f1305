use jobmatch_core::types::or_fallback;
use jobmatch_core::JobRecord;

use crate::intent::DetailKind;

/// Render one attribute of `record` as a reply sentence.
pub fn describe(record: &JobRecord, kind: DetailKind) -> String {
    match kind {
        DetailKind::Link => {
            format!("Here is the job link: {}.", or_fallback(&record.redirect_url, "No link available"))
        }
        DetailKind::Salary => format!(
            "The salary range is {} - {} ({}).",
            or_fallback(&record.salary_min, "N/A"),
            or_fallback(&record.salary_max, "N/A"),
            or_fallback(&record.contract_type, "N/A"),
        ),
        DetailKind::Skills => {
            format!("Job description/skills: {}.", or_fallback(&record.description, "No description available"))
        }
        DetailKind::Experience => "Experience details are not available for this job.".to_string(),
        DetailKind::ContractTime => format!("The contract time is {}.", or_fallback(&record.contract_time, "N/A")),
    }
}
