//! Full report command implementation

use anyhow::Result;
use runway_core::analyze;

use super::core::{analysis_input, print_json, Session};
use crate::cli::AnalysisArgs;

/// Always JSON: the report is the machine-readable contract
pub fn cmd_report(session: &Session, args: &AnalysisArgs) -> Result<()> {
    let input = analysis_input(session, args)?;
    let report = analyze(&input, session.clock.as_ref(), &session.config)?;
    print_json(&report)
}
