//! Replays a script of user and notification actions against a
//! [`SplitEngine`]. This is what the command-line driver runs in place of
//! the app's screens.

use super::csv::script_reader::{ScriptAction, ScriptRow};
use crate::application::engine::{ActionOutcome, IncomingRequest, SplitEngine};
use crate::domain::ids::{PaymentId, PresetId, SplitRequestId};
use crate::domain::notification::{CategoryTag, NotificationActionKind, NotificationEvent};
use crate::domain::preset::Preset;
use crate::error::{BilsError, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
enum Target {
    Payment(PaymentId),
    Request(SplitRequestId),
    Preset(PresetId),
}

pub struct ScriptRunner<'a> {
    engine: &'a SplitEngine,
    refs: HashMap<String, Target>,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(engine: &'a SplitEngine) -> Self {
        Self {
            engine,
            refs: HashMap::new(),
        }
    }

    /// Applies one row. Rows that go through the notification path return
    /// the resulting [`ActionOutcome`].
    pub async fn apply(&mut self, row: ScriptRow) -> Result<Option<ActionOutcome>> {
        match row.action {
            ScriptAction::Preset => {
                let preset = self
                    .engine
                    .add_preset(required(&row.name, "name")?, row.phone.as_deref().unwrap_or(""))
                    .await?;
                self.bind(&row, Target::Preset(preset.id));
                Ok(None)
            }
            ScriptAction::Pay => {
                let amount = row
                    .amount
                    .ok_or_else(|| missing("amount"))?;
                let payment = self
                    .engine
                    .log_payment(
                        required(&row.name, "name")?,
                        amount,
                        row.category.unwrap_or_default(),
                    )
                    .await?;
                self.bind(&row, Target::Payment(payment.id));
                Ok(None)
            }
            ScriptAction::SplitEven => {
                let payment_id = self.payment(&row)?;
                let presets = self.engine.presets().await?;
                let ids = required(&row.with, "with")?
                    .split(';')
                    .map(|name| find_preset(&presets, name).map(|p| p.id))
                    .collect::<Result<Vec<_>>>()?;
                self.engine
                    .split_evenly(payment_id, &ids, note(&row))
                    .await?;
                Ok(None)
            }
            ScriptAction::SplitCustom => {
                let payment_id = self.payment(&row)?;
                let presets = self.engine.presets().await?;
                let entries = required(&row.with, "with")?
                    .split(';')
                    .map(|entry| {
                        let (name, amount) = entry.split_once('=').unwrap_or((entry, ""));
                        find_preset(&presets, name).map(|p| (p.id, amount.trim().to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                self.engine
                    .split_custom(payment_id, &entries, note(&row))
                    .await?;
                Ok(None)
            }
            ScriptAction::QuickSplit => {
                let payment_id = self.payment(&row)?;
                let index = required(&row.with, "with")?
                    .parse::<usize>()
                    .map_err(|_| BilsError::Validation("`with` must be a preset index".to_string()))?;
                self.notification(
                    CategoryTag::PaymentSplit,
                    payment_id.as_uuid(),
                    NotificationActionKind::PresetQuickSplit(index),
                )
                .await
            }
            ScriptAction::DontSplit => {
                let payment_id = self.payment(&row)?;
                self.notification(
                    CategoryTag::PaymentSplit,
                    payment_id.as_uuid(),
                    NotificationActionKind::DontSplit,
                )
                .await
            }
            ScriptAction::Open => match self.target(&row)? {
                Target::Request(id) => {
                    self.notification(
                        CategoryTag::IncomingRequest,
                        id.as_uuid(),
                        NotificationActionKind::IncomingRequestOpened,
                    )
                    .await
                }
                Target::Payment(id) => {
                    self.notification(
                        CategoryTag::PaymentSplit,
                        id.as_uuid(),
                        NotificationActionKind::DefaultTap,
                    )
                    .await
                }
                Target::Preset(_) => Err(BilsError::Validation(
                    "cannot open a preset".to_string(),
                )),
            },
            ScriptAction::Incoming => {
                let presets = self.engine.presets().await?;
                let from = find_preset(&presets, required(&row.with, "with")?)?;
                let amount = row.amount.ok_or_else(|| missing("amount"))?;
                let request = self
                    .engine
                    .receive_incoming_request(IncomingRequest {
                        from: from.id,
                        merchant: required(&row.name, "name")?.to_string(),
                        total: amount,
                        amount_owed: amount,
                        note: note(&row).to_string(),
                    })
                    .await?;
                self.bind(&row, Target::Request(request.id));
                Ok(None)
            }
            ScriptAction::Remind => {
                if row.r#ref.is_none() {
                    let open = self.engine.remind_all().await?;
                    tracing::info!(open, "reminded everyone");
                } else {
                    let id = self.request(&row).await?;
                    self.engine.send_reminder(id).await?;
                }
                Ok(None)
            }
            ScriptAction::Resolve => {
                let id = self.request(&row).await?;
                self.engine.mark_resolved(id).await?;
                Ok(None)
            }
        }
    }

    fn bind(&mut self, row: &ScriptRow, target: Target) {
        if let Some(label) = row.r#ref.as_deref() {
            self.refs.insert(label.to_string(), target);
        }
    }

    fn target(&self, row: &ScriptRow) -> Result<Target> {
        let label = required(&row.r#ref, "ref")?;
        self.refs
            .get(label)
            .copied()
            .ok_or_else(|| BilsError::not_found("Reference", label))
    }

    fn payment(&self, row: &ScriptRow) -> Result<PaymentId> {
        match self.target(row)? {
            Target::Payment(id) => Ok(id),
            _ => Err(BilsError::Validation(format!(
                "`{}` is not a payment",
                row.r#ref.as_deref().unwrap_or_default()
            ))),
        }
    }

    /// A request ref, or a payment ref standing for its latest request.
    async fn request(&self, row: &ScriptRow) -> Result<SplitRequestId> {
        match self.target(row)? {
            Target::Request(id) => Ok(id),
            Target::Payment(payment_id) => self
                .engine
                .requests_for_payment(payment_id)
                .await?
                .first()
                .map(|r| r.id)
                .ok_or_else(|| BilsError::not_found("Request for payment", payment_id)),
            Target::Preset(id) => Err(BilsError::Validation(format!(
                "preset {id} has no request"
            ))),
        }
    }

    async fn notification(
        &self,
        category: CategoryTag,
        correlation_id: uuid::Uuid,
        action: NotificationActionKind,
    ) -> Result<Option<ActionOutcome>> {
        let event = NotificationEvent::new(category, correlation_id, action);
        let outcome = self.engine.handle_action(event).await?;
        tracing::info!(?outcome, "notification action handled");
        Ok(Some(outcome))
    }
}

fn required<'r>(field: &'r Option<String>, name: &'static str) -> Result<&'r str> {
    field
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| missing(name))
}

fn missing(name: &'static str) -> BilsError {
    BilsError::Validation(format!("row needs `{name}`"))
}

fn note(row: &ScriptRow) -> &str {
    row.note.as_deref().unwrap_or("")
}

fn find_preset<'p>(presets: &'p [Preset], name: &str) -> Result<&'p Preset> {
    let name = name.trim();
    presets
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| BilsError::not_found("Preset", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::domain::destination::Destination;
    use crate::domain::payment::SplitStatus;
    use crate::domain::split_request::SplitRequestStatus;
    use crate::infrastructure::scheduler::InProcessScheduler;
    use crate::interfaces::csv::script_reader::ScriptReader;
    use std::sync::Arc;

    fn engine() -> SplitEngine {
        SplitEngine::in_memory(
            Arc::new(InProcessScheduler::new(true)),
            AppConfig::default(),
        )
    }

    async fn run(engine: &SplitEngine, script: &str) -> Vec<Result<Option<ActionOutcome>>> {
        let mut runner = ScriptRunner::new(engine);
        let mut results = Vec::new();
        for row in ScriptReader::new(script.as_bytes()).rows() {
            results.push(match row {
                Ok(row) => runner.apply(row).await,
                Err(e) => Err(e),
            });
        }
        results
    }

    #[tokio::test]
    async fn test_pay_split_resolve() {
        let engine = engine();
        let results = run(
            &engine,
            "action,ref,name,amount,category,with,note\n\
             pay,p1,Mojo East,61.70,restaurant,,\n\
             split_even,p1,,,,alex;Sam,dinner\n\
             resolve,p1,,,,,",
        )
        .await;
        assert!(results.iter().all(|r| r.is_ok()), "{results:?}");

        let requests = engine.split_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].participants.len(), 2);
        assert_eq!(requests[0].status, SplitRequestStatus::Resolved);
    }

    #[tokio::test]
    async fn test_notification_rows() {
        let engine = engine();
        let results = run(
            &engine,
            "action,ref,name,amount,category,with,note\n\
             pay,p1,Blue Bottle Coffee,8.44,,,\n\
             pay,p2,CVS Pharmacy,19.04,other,,\n\
             quick_split,p1,,,,0,\n\
             dont_split,p2,,,,,\n\
             open,p2,,,,,",
        )
        .await;

        assert!(matches!(
            results[2],
            Ok(Some(ActionOutcome::QuickSplitSent { .. }))
        ));
        let payments = engine.payments().await.unwrap();
        assert_eq!(payments[0].split_status, SplitStatus::Ignored);
        assert_eq!(payments[1].split_status, SplitStatus::SplitEvenly);
        assert!(matches!(
            results[4],
            Ok(Some(ActionOutcome::Navigate(Destination::Split { .. })))
        ));
    }

    #[tokio::test]
    async fn test_bad_rows_do_not_stop_the_script() {
        let engine = engine();
        let results = run(
            &engine,
            "action,ref,name,amount,category,with,note,phone\n\
             preset,j,Jordan,,,,,555-000-1111\n\
             split_even,nope,,,,Alex,,\n\
             pay,p1,Mojo East,61.70,,,,\n\
             split_custom,p1,,,,Jordan=30;Nobody=1,,\n\
             split_custom,p1,,,,Jordan=30;Alex=abc,,",
        )
        .await;

        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap_err().is_not_found());
        assert!(results[3].as_ref().unwrap_err().is_not_found());
        assert!(results[4].is_ok());

        let request = engine.split_requests().await.unwrap().remove(0);
        assert_eq!(request.participants.len(), 1);
        assert_eq!(request.participants[0].name_snapshot, "Jordan");
    }

    #[tokio::test]
    async fn test_incoming_and_open() {
        let engine = engine();
        let results = run(
            &engine,
            "action,ref,name,amount,category,with,note\n\
             incoming,r1,Mojo East,20.57,,Sam,dinner\n\
             open,r1,,,,,\n\
             remind,r1,,,,,\n\
             remind,,,,,,",
        )
        .await;
        assert!(results.iter().all(|r| r.is_ok()), "{results:?}");
        assert!(matches!(
            results[1],
            Ok(Some(ActionOutcome::Navigate(Destination::SplitRequestDetail { .. })))
        ));
    }
}
