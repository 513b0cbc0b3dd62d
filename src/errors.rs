use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("provider error: {0}")] Provider(String),
    #[error("ambiguous or missing code block (found {found})")] Extraction { found: usize },
}

impl GenError {
    /// Text shown to the user for a failed generation cycle.
    pub fn user_message(&self) -> String {
        match self {
            GenError::Provider(detail) => format!("Error while generating code. {}", detail),
            GenError::Extraction { .. } => {
                "Something went wrong. Please try again or change the instructions.".to_string()
            }
        }
    }
}

impl From<anyhow::Error> for GenError {
    fn from(e: anyhow::Error) -> Self {
        // Keep the whole context chain, providers attach the useful part at the top.
        GenError::Provider(format!("{:#}", e))
    }
}
