//! Compensation log for the create workflow
//!
//! Every resource step that succeeds records how to undo itself. On failure
//! the log is replayed newest first. Undo steps are best effort: a failing
//! compensation is logged and the rest still run.

use duroxide::OrchestrationContext;

use crate::activity_names::activities;
use crate::activity_types::{
    DeleteEndpointTopicInput, DeleteEndpointTopicOutput, DeleteQueueInput, DeleteQueueOutput,
    DeleteTableInput, DeleteTableOutput, UnbindEventSourceInput, UnbindEventSourceOutput,
    UnsubscribeQueueInput, UnsubscribeQueueOutput,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    DeleteTable { table_arn: String },
    DeleteQueue { queue_url: String },
    DeleteEndpointTopic { topic_arn: String },
    Unsubscribe { subscription_arn: String },
    RemoveEventBinding { mapping_uuid: String },
}

impl Compensation {
    async fn run(self, ctx: &OrchestrationContext) -> Result<(), String> {
        match self {
            Compensation::DeleteTable { table_arn } => {
                ctx.schedule_activity_typed::<DeleteTableInput, DeleteTableOutput>(
                    activities::DELETE_TABLE,
                    &DeleteTableInput { table_arn },
                )
                .into_activity_typed::<DeleteTableOutput>()
                .await?;
            }
            Compensation::DeleteQueue { queue_url } => {
                ctx.schedule_activity_typed::<DeleteQueueInput, DeleteQueueOutput>(
                    activities::DELETE_QUEUE,
                    &DeleteQueueInput { queue_url },
                )
                .into_activity_typed::<DeleteQueueOutput>()
                .await?;
            }
            Compensation::DeleteEndpointTopic { topic_arn } => {
                ctx.schedule_activity_typed::<DeleteEndpointTopicInput, DeleteEndpointTopicOutput>(
                    activities::DELETE_ENDPOINT_TOPIC,
                    &DeleteEndpointTopicInput { topic_arn },
                )
                .into_activity_typed::<DeleteEndpointTopicOutput>()
                .await?;
            }
            Compensation::Unsubscribe { subscription_arn } => {
                ctx.schedule_activity_typed::<UnsubscribeQueueInput, UnsubscribeQueueOutput>(
                    activities::UNSUBSCRIBE_QUEUE,
                    &UnsubscribeQueueInput { subscription_arn },
                )
                .into_activity_typed::<UnsubscribeQueueOutput>()
                .await?;
            }
            Compensation::RemoveEventBinding { mapping_uuid } => {
                ctx.schedule_activity_typed::<UnbindEventSourceInput, UnbindEventSourceOutput>(
                    activities::UNBIND_EVENT_SOURCE,
                    &UnbindEventSourceInput { mapping_uuid },
                )
                .into_activity_typed::<UnbindEventSourceOutput>()
                .await?;
            }
        }
        Ok(())
    }
}

/// Undo steps for resources this run created. Never holds anything the run
/// found already in place.
#[derive(Debug, Default)]
pub struct Saga {
    steps: Vec<Compensation>,
}

impl Saga {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, step: Compensation) {
        self.steps.push(step);
    }

    /// Undo every recorded step, newest first. Returns how many undo steps failed.
    pub async fn compensate(self, ctx: &OrchestrationContext) -> usize {
        if self.steps.is_empty() {
            return 0;
        }

        ctx.trace_warn(format!("Compensating {} completed step(s)", self.steps.len()));

        let mut failures = 0;
        for step in self.steps.into_iter().rev() {
            let description = format!("{:?}", step);
            if let Err(e) = step.run(ctx).await {
                failures += 1;
                ctx.trace_error(format!("Compensation {} failed: {}", description, e));
            }
        }

        if failures > 0 {
            ctx.trace_error(format!("{} compensation(s) failed; resources may be orphaned", failures));
        } else {
            ctx.trace_info("Compensation complete");
        }
        failures
    }
}
