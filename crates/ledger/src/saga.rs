//! Minimal saga executor: ordered forward actions, each paired with a
//! compensating action, executed forward and unwound in reverse on the
//! first failure.

use salon_store::StoreError;
use tracing::{error, warn};

type Action<'a> = Box<dyn FnMut() -> Result<(), StoreError> + 'a>;

pub struct SagaStep<'a> {
    pub label: String,
    forward: Action<'a>,
    compensate: Action<'a>,
}

impl<'a> SagaStep<'a> {
    pub fn new(
        label: impl Into<String>,
        forward: impl FnMut() -> Result<(), StoreError> + 'a,
        compensate: impl FnMut() -> Result<(), StoreError> + 'a,
    ) -> Self {
        Self {
            label: label.into(),
            forward: Box::new(forward),
            compensate: Box::new(compensate),
        }
    }
}

/// The forward step that failed, if any.
#[derive(Debug)]
pub struct StepFailure {
    pub step: usize,
    pub label: String,
    pub error: StoreError,
}

/// A compensation that itself failed while unwinding.
#[derive(Debug)]
pub struct CompensationFailure {
    pub label: String,
    pub error: StoreError,
}

#[derive(Debug)]
pub struct SagaRun {
    pub failure: Option<StepFailure>,
    pub compensation_failures: Vec<CompensationFailure>,
}

impl SagaRun {
    pub fn completed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn fully_compensated(&self) -> bool {
        self.compensation_failures.is_empty()
    }
}

/// Execute the steps in order. On the first forward failure, run the
/// compensations of every previously completed step in reverse order,
/// collecting (not aborting on) compensation failures.
pub fn run(mut steps: Vec<SagaStep<'_>>) -> SagaRun {
    for index in 0..steps.len() {
        if let Err(step_error) = (steps[index].forward)() {
            warn!(
                step = %steps[index].label,
                error = %step_error,
                "Saga step failed; unwinding"
            );
            let failure = StepFailure {
                step: index,
                label: steps[index].label.clone(),
                error: step_error,
            };

            let mut compensation_failures = Vec::new();
            for prior in (0..index).rev() {
                if let Err(error) = (steps[prior].compensate)() {
                    error!(
                        step = %steps[prior].label,
                        error = %error,
                        "Saga compensation failed; manual reconciliation required"
                    );
                    compensation_failures.push(CompensationFailure {
                        label: steps[prior].label.clone(),
                        error,
                    });
                }
            }
            return SagaRun {
                failure: Some(failure),
                compensation_failures,
            };
        }
    }
    SagaRun {
        failure: None,
        compensation_failures: Vec::new(),
    }
}
