use citypulse_core::filter::Selected;
use citypulse_core::presentation::MarkerKind;
use citypulse_core::project::Project;
use citypulse_core::report::Report;

/// Look up a marker's item in the mirrors.
pub(crate) fn find_selected(
    projects: &[Project],
    reports: &[Report],
    kind: MarkerKind,
    id: &str,
) -> Option<Selected> {
    match kind {
        MarkerKind::Project => projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .map(Selected::Project),
        MarkerKind::Report => reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .map(Selected::Report),
    }
}
