//! Human-readable console report.

use super::line::UNRECOGNIZED;
use super::ResultEncoder;
use crate::core::orchestrator::{OrchestrationOutcome, Strategy};
use crate::core::recognizer::TaskResult;
use crate::error::PlateError;
use console::style;
use std::fmt::Write;

const RULE_WIDTH: usize = 30;

/// Renders both strategy results in labeled sections
#[derive(Debug, Clone, Default)]
pub struct ReportEncoder {
    verbose: bool,
}

impl ReportEncoder {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn section(&self, out: &mut String, index: usize, strategy: Strategy, result: &TaskResult) {
        let title = match strategy {
            Strategy::Shape => "shape location",
            Strategy::Color => "color location",
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", style(format!("[Method {}: {}]", index, title)).bold());

        let label = if result.is_recognized() {
            style(result.label_text()).green().bold().to_string()
        } else {
            style(UNRECOGNIZED).yellow().to_string()
        };
        let _ = writeln!(out, "  Plate:  {}", label);
        let _ = writeln!(out, "  Color:  {}", result.color());

        if self.verbose {
            let region = match result.region() {
                Some(region) => format!("{}x{}", region.width(), region.height()),
                None => "no candidate".to_string(),
            };
            let _ = writeln!(out, "  Region: {}", style(region).dim());
        }
    }
}

impl ResultEncoder for ReportEncoder {
    fn encode(&self, outcome: &OrchestrationOutcome) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut out = String::new();

        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "{:^width$}", "Recognition result", width = RULE_WIDTH);
        let _ = writeln!(out, "{}", rule);

        self.section(&mut out, 1, Strategy::Shape, outcome.shape());
        self.section(&mut out, 2, Strategy::Color, outcome.color());

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", rule);
        let _ = write!(
            out,
            "Finished in {:.2}s",
            outcome.elapsed().as_secs_f64()
        );
        if self.verbose {
            let _ = write!(
                out,
                " {}",
                style(format!(
                    "(back to back: {:.2}s)",
                    outcome.timings().sequential().as_secs_f64()
                ))
                .dim()
            );
        }
        out
    }

    fn encode_failure(&self, error: &PlateError) -> String {
        format!(
            "{} {} {}",
            style("✗").red().bold(),
            style(format!("[{}]", error.stage())).bold(),
            error
        )
    }
}
