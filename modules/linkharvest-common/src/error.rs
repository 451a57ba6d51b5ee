use thiserror::Error;

/// Errors that stop a job before any flow runs. Failures inside a flow
/// travel as `anyhow::Error` and are reported per flow instead.
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Setup error: {0}")]
    Setup(String),
}

impl HarvestError {
    pub fn setup(msg: impl Into<String>) -> Self {
        HarvestError::Setup(msg.into())
    }

    pub fn is_setup(&self) -> bool {
        matches!(self, HarvestError::Setup(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_errors_carry_their_message() {
        let err = HarvestError::setup("Worksheet 'Article' not found");
        assert!(err.is_setup());
        assert_eq!(err.to_string(), "Setup error: Worksheet 'Article' not found");
    }
}
