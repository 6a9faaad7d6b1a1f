//! Rendering of comparison results for people.
//!
//! [`Status`] is the per-interface verdict shown in summary cells, with
//! the fill colour used for it in spreadsheet reports. [`render_markdown`]
//! produces a summary table followed by the differences and warnings of
//! each interface.

#[cfg(feature = "json")]
use alloc::format;
use alloc::string::String;
use core::fmt::{self, Display, Write};

use crate::compare::{ComparisonOutcome, ComparisonResult, Difference, QueryComparison};

/// Verdict of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// The statements are equivalent.
    Equal,
    /// The statements differ on at least one column.
    Different,
    /// The statements could not be compared.
    NotComparable,
}

impl Status {
    /// Label shown in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Different => "different",
            Self::NotComparable => "comparison not possible",
        }
    }

    /// Cell fill colour as an RGB hex string.
    #[must_use]
    pub fn fill_colour(self) -> &'static str {
        match self {
            Self::Equal => "C6EFCE",
            Self::Different => "FFC7CE",
            Self::NotComparable => "DDDDDD",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} | {}",
            self.column,
            self.left.as_deref().unwrap_or("(absent)"),
            self.right.as_deref().unwrap_or("(absent)")
        )
    }
}

impl Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_equal() {
            return f.write_str("Statements are equal");
        }
        f.write_str("Statements differ:")?;
        for difference in &self.differences {
            write!(f, "\n  {difference}")?;
        }
        Ok(())
    }
}

impl Display for ComparisonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => f.write_str("Statements are equal"),
            Self::Different(differences) => {
                f.write_str("Statements differ:")?;
                for difference in differences {
                    write!(f, "\n  {difference}")?;
                }
                Ok(())
            }
            Self::NotComparable(error) => write!(f, "Comparison not possible: {error}"),
        }
    }
}

/// Comparison results of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterfaceReport {
    /// Interface identifier.
    pub id: String,
    /// Human readable interface name.
    pub name: String,
    /// Comparison of the send statements, if the interface has a send side.
    pub send: Option<QueryComparison>,
    /// Comparison of the receive statements, if the interface has a receive side.
    pub receive: Option<QueryComparison>,
}

impl InterfaceReport {
    /// Create a report with neither side compared.
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            send: None,
            receive: None,
        }
    }

    /// Set the send-side comparison.
    #[must_use]
    pub fn with_send(mut self, comparison: QueryComparison) -> Self {
        self.send = Some(comparison);
        self
    }

    /// Set the receive-side comparison.
    #[must_use]
    pub fn with_receive(mut self, comparison: QueryComparison) -> Self {
        self.receive = Some(comparison);
        self
    }

    /// Worst status over both sides, `None` if neither was compared.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        [&self.send, &self.receive]
            .into_iter()
            .flatten()
            .map(QueryComparison::status)
            .max_by_key(|status| match status {
                Status::Equal => 0,
                Status::Different => 1,
                Status::NotComparable => 2,
            })
    }
}

/// Render reports as Markdown: a summary table, then per-interface details.
///
/// Interfaces whose compared sides are all equal and warning-free get no
/// detail section.
#[must_use]
pub fn render_markdown(reports: &[InterfaceReport]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_markdown(&mut out, reports);
    out
}

fn write_markdown(out: &mut String, reports: &[InterfaceReport]) -> fmt::Result {
    let status = |comparison: &Option<QueryComparison>| -> &'static str {
        comparison
            .as_ref()
            .map_or("-", |comparison| comparison.status().label())
    };

    writeln!(out, "| Interface | Name | Send | Receive |")?;
    writeln!(out, "|-----------|------|------|---------|")?;
    for report in reports {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            cell(&report.id),
            cell(&report.name),
            status(&report.send),
            status(&report.receive)
        )?;
    }

    for report in reports {
        let sides = [("Send", &report.send), ("Receive", &report.receive)];
        let noteworthy = sides.iter().any(|(_, comparison)| {
            comparison
                .as_ref()
                .is_some_and(|c| !c.outcome.is_equal() || !c.warnings.is_empty())
        });
        if !noteworthy {
            continue;
        }

        writeln!(out, "\n## {} {}", report.id, report.name)?;
        for (label, comparison) in sides {
            let Some(comparison) = comparison else {
                continue;
            };
            if comparison.outcome.is_equal() && comparison.warnings.is_empty() {
                continue;
            }
            writeln!(out, "\n### {label}: {}\n", comparison.status())?;
            match &comparison.outcome {
                ComparisonOutcome::Equal => {}
                ComparisonOutcome::Different(differences) => {
                    writeln!(out, "| Column | Left | Right |")?;
                    writeln!(out, "|--------|------|-------|")?;
                    for difference in differences {
                        writeln!(
                            out,
                            "| {} | {} | {} |",
                            cell(&difference.column),
                            cell(difference.left.as_deref().unwrap_or("(absent)")),
                            cell(difference.right.as_deref().unwrap_or("(absent)"))
                        )?;
                    }
                }
                ComparisonOutcome::NotComparable(error) => writeln!(out, "{error}")?,
            }
            for warning in &comparison.warnings {
                writeln!(out, "- warning: {warning}")?;
            }
        }
    }
    Ok(())
}

/// Table cell text with `|` escaped.
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Serialize reports as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`crate::Error::Report`] if serialization fails.
#[cfg(feature = "json")]
pub fn to_json(reports: &[InterfaceReport]) -> Result<String, crate::Error> {
    serde_json::to_string_pretty(reports).map_err(|err| crate::Error::Report(format!("{err}")))
}
