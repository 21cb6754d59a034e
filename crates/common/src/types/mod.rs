use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Body returned by successful deletes, kept compatible with the dashboard frontend.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
}
