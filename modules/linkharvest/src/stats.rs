/// Stats from one flow run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlowStats {
    pub keywords: u32,
    pub searches_failed: u32,
    /// URLs already in the sink when the flow started.
    pub seeded: u32,
    /// Candidates returned by the aggregator across all keywords.
    pub candidates: u32,
    pub duplicates_skipped: u32,
    pub rows_written: u32,
}

impl std::fmt::Display for FlowStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} keywords ({} failed searches), {} known URLs, {} candidates, {} duplicates skipped, {} rows written",
            self.keywords,
            self.searches_failed,
            self.seeded,
            self.candidates,
            self.duplicates_skipped,
            self.rows_written
        )
    }
}

/// How one flow of a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed(FlowStats),
    Failed(String),
}

/// Per-flow outcomes of a job, in flow order.
#[derive(Debug, Default, Clone)]
pub struct JobReport {
    pub flows: Vec<(String, FlowOutcome)>,
}

impl JobReport {
    pub fn rows_written(&self) -> u32 {
        self.flows
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                FlowOutcome::Completed(stats) => Some(stats.rows_written),
                FlowOutcome::Failed(_) => None,
            })
            .sum()
    }

    pub fn failed_flows(&self) -> Vec<&str> {
        self.flows
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FlowOutcome::Failed(_)))
            .map(|(label, _)| label.as_str())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed_flows().is_empty()
    }

    /// `Err` naming the failed flows, so the process exits non-zero.
    pub fn ensure_success(&self) -> anyhow::Result<()> {
        let failed = self.failed_flows();
        if !failed.is_empty() {
            anyhow::bail!(
                "{} of {} flows failed: {}",
                failed.len(),
                self.flows.len(),
                failed.join(", ")
            );
        }
        Ok(())
    }
}

impl std::fmt::Display for JobReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Harvest Run Complete ===")?;
        for (label, outcome) in &self.flows {
            match outcome {
                FlowOutcome::Completed(stats) => writeln!(f, "{label}: {stats}")?,
                FlowOutcome::Failed(reason) => writeln!(f, "{label}: FAILED ({reason})")?,
            }
        }
        write!(f, "Total rows written: {}", self.rows_written())
    }
}
