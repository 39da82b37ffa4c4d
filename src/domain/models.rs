use crate::services::analyzers::Finding;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErrOut {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Build ledger persisted across invocations; feeds `plan --resume`.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    pub completed: Vec<BuildRecord>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BuildRecord {
    pub project: String,
    pub package: String,
    pub recorded_at: u64,
}

#[derive(Serialize, Clone)]
pub struct PlanStatus {
    pub status: String,
    pub waves: usize,
}

#[derive(Serialize, Clone)]
pub struct CoverageGate {
    pub package: String,
    pub status: String,
    pub package_test_coverage: u64,
}

#[derive(Serialize)]
pub struct ReleaseCheckReport {
    pub overall: String,
    pub manifest: String,
    pub findings: Vec<Finding>,
    pub plan: PlanStatus,
    pub coverage: Option<CoverageGate>,
    pub recommendations: Vec<String>,
}
