//! Two-attempt execution: hardware first, then at most one software retry

use tracing::{error, warn};

use crate::engine::executor::{AttemptRunner, ExecutionResult};
use crate::error::{HighlightError, HighlightResult};
use crate::planner::{AssemblyPlan, AssemblyPlanner, Backend};

/// Every attempt made for one plan, in order
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub attempts: Vec<ExecutionResult>,
    pub fallback_occurred: bool,
    /// Plan of the last attempt
    pub final_plan: AssemblyPlan,
}

impl ExecutionReport {
    pub fn last(&self) -> Option<&ExecutionResult> {
        self.attempts.last()
    }

    pub fn succeeded(&self) -> bool {
        self.last().map_or(false, |attempt| attempt.success)
    }

    pub fn backend_used(&self) -> Backend {
        self.final_plan.backend()
    }

    /// The successful attempt, or the escalated failure of the last one
    pub fn outcome(&self) -> HighlightResult<&ExecutionResult> {
        match self.last() {
            Some(attempt) if attempt.success => Ok(attempt),
            Some(attempt) => Err(attempt.to_failure()),
            None => Err(HighlightError::InvalidPlan {
                message: "no execution attempt was made".to_string(),
            }),
        }
    }
}

/// Runs a plan with the hardware-to-software fallback policy
pub struct ExecutionEngine {
    runner: AttemptRunner,
}

impl ExecutionEngine {
    pub fn new(runner: AttemptRunner) -> Self {
        Self { runner }
    }

    /// Execute the plan. A failed hardware attempt is retried once with a freshly
    /// compiled software plan; a failed software attempt is never retried.
    pub async fn execute(&self, plan: AssemblyPlan, planner: &AssemblyPlanner) -> ExecutionReport {
        let first = self.runner.run(&plan).await;
        let retry = !first.success && plan.backend() == Backend::Hardware;
        let mut attempts = vec![first];

        if !retry {
            return ExecutionReport {
                attempts,
                fallback_occurred: false,
                final_plan: plan,
            };
        }

        warn!("Hardware encode failed, retrying once with the software encoder");
        let software_plan =
            match planner.plan_for_backend(&plan.source_path, &plan.segments, Backend::Software) {
                Ok(software_plan) => software_plan,
                Err(e) => {
                    error!("Could not compile software fallback plan: {}", e);
                    return ExecutionReport {
                        attempts,
                        fallback_occurred: false,
                        final_plan: plan,
                    };
                }
            };

        attempts.push(self.runner.run(&software_plan).await);
        ExecutionReport {
            attempts,
            fallback_occurred: true,
            final_plan: software_plan,
        }
    }
}
