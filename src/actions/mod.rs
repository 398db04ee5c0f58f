use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;

use crate::dispatch::DispatchOutcome;

pub type ParamMap = HashMap<String, String>;

/// How a single-template action produces its parameters
pub enum ParamRule {
    Static(ParamMap),
    Generated(fn() -> ParamMap),
}

impl ParamRule {
    fn resolve(&self) -> ParamMap {
        match self {
            ParamRule::Static(map) => map.clone(),
            ParamRule::Generated(f) => f(),
        }
    }
}

/// One step of a multi-step action
pub struct ActionStep {
    pub template_id: String,
    pub params: ParamMap,
}

pub enum ActionKind {
    Single {
        template_id: String,
        params: ParamRule,
    },
    MultiStep {
        steps: Vec<ActionStep>,
    },
}

/// A predefined composite action: one user gesture, one or more template
/// instantiations
pub struct QuickAction {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ActionKind,
}

impl QuickAction {
    pub fn step_count(&self) -> usize {
        match &self.kind {
            ActionKind::Single { .. } => 1,
            ActionKind::MultiStep { steps } => steps.len(),
        }
    }
}

/// Outcome of one executed step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub template_id: String,
    #[serde(flatten)]
    pub outcome: DispatchOutcome,
}

/// Full report of a sequenced action run
#[derive(Debug, Clone, Serialize)]
pub struct SequenceReport {
    pub action_id: String,
    pub steps: Vec<StepResult>,
}

impl SequenceReport {
    pub fn succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.is_success()).count()
    }
}

/// Run an action's steps strictly in order, awaiting each outcome before
/// starting the next. A failing step is recorded and the remaining steps
/// still run; the sequencer itself always completes.
pub async fn execute<F, Fut>(action: &QuickAction, mut dispatch: F) -> SequenceReport
where
    F: FnMut(String, ParamMap) -> Fut,
    Fut: Future<Output = DispatchOutcome>,
{
    let mut results = Vec::new();
    match &action.kind {
        ActionKind::Single {
            template_id,
            params,
        } => {
            let outcome = dispatch(template_id.clone(), params.resolve()).await;
            results.push(StepResult {
                template_id: template_id.clone(),
                outcome,
            });
        }
        ActionKind::MultiStep { steps } => {
            for step in steps {
                let outcome = dispatch(step.template_id.clone(), step.params.clone()).await;
                results.push(StepResult {
                    template_id: step.template_id.clone(),
                    outcome,
                });
            }
        }
    }
    SequenceReport {
        action_id: action.id.clone(),
        steps: results,
    }
}

/// Static catalog of the built-in quick actions
pub struct ActionCatalog {
    actions: Vec<QuickAction>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self {
            actions: builtin_actions(),
        }
    }

    pub fn list(&self) -> &[QuickAction] {
        &self.actions
    }

    pub fn get(&self, id: &str) -> Option<&QuickAction> {
        self.actions.iter().find(|a| a.id == id)
    }
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn params(pairs: &[(&str, &str)]) -> ParamMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn step(template_id: &str, pairs: &[(&str, &str)]) -> ActionStep {
    ActionStep {
        template_id: template_id.to_string(),
        params: params(pairs),
    }
}

fn backup_params() -> ParamMap {
    let now = Utc::now();
    params(&[(
        "Backup Name",
        &format!("backup-{}-{}", now.format("%Y-%m-%d"), now.timestamp_millis()),
    )])
}

fn builtin_actions() -> Vec<QuickAction> {
    vec![
        QuickAction {
            id: "backup_now".into(),
            name: "Backup Now".into(),
            description: "Create timestamped backup".into(),
            kind: ActionKind::Single {
                template_id: "system_backup".into(),
                params: ParamRule::Generated(backup_params),
            },
        },
        QuickAction {
            id: "secure_device".into(),
            name: "Secure Device".into(),
            description: "Disable telnet, enable SSH".into(),
            kind: ActionKind::MultiStep {
                steps: vec![
                    step(
                        "service_toggle",
                        &[
                            ("Service Name", "telnet"),
                            ("State (enable/disable)", "disable"),
                            ("Port", "23"),
                        ],
                    ),
                    step(
                        "service_toggle",
                        &[
                            ("Service Name", "ssh"),
                            ("State (enable/disable)", "enable"),
                            ("Port", "22"),
                        ],
                    ),
                ],
            },
        },
        QuickAction {
            id: "setup_ntp".into(),
            name: "Setup NTP".into(),
            description: "Configure Google NTP servers".into(),
            kind: ActionKind::Single {
                template_id: "system_ntp_client".into(),
                params: ParamRule::Static(params(&[
                    ("Primary NTP Server", "time.google.com"),
                    ("Secondary NTP Server", "time.cloudflare.com"),
                    ("Enabled", "yes"),
                ])),
            },
        },
        QuickAction {
            id: "basic_firewall".into(),
            name: "Basic Firewall".into(),
            description: "Drop invalid, allow established".into(),
            kind: ActionKind::MultiStep {
                steps: vec![
                    step(
                        "firewall_filter_add",
                        &[
                            ("Chain", "input"),
                            ("Protocol", "tcp"),
                            ("Dst Port", ""),
                            ("Action", "accept"),
                            ("Src Address", ""),
                            ("Comment", "Accept established connections"),
                        ],
                    ),
                    step(
                        "firewall_filter_add",
                        &[
                            ("Chain", "input"),
                            ("Protocol", "icmp"),
                            ("Dst Port", ""),
                            ("Action", "accept"),
                            ("Src Address", ""),
                            ("Comment", "Accept ICMP"),
                        ],
                    ),
                    step(
                        "firewall_filter_add",
                        &[
                            ("Chain", "input"),
                            ("Protocol", "tcp"),
                            ("Dst Port", ""),
                            ("Action", "drop"),
                            ("Src Address", ""),
                            ("Comment", "Drop everything else"),
                        ],
                    ),
                ],
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;

    fn recorded_dispatch(
        calls: Arc<Mutex<Vec<(String, ParamMap)>>>,
        fail_templates: Vec<String>,
    ) -> impl FnMut(String, ParamMap) -> std::pin::Pin<Box<dyn Future<Output = DispatchOutcome> + Send>>
    {
        move |template_id: String, params: ParamMap| {
            let calls = calls.clone();
            let fail = fail_templates.contains(&template_id)
                || fail_templates
                    .iter()
                    .any(|f| f == &format!("{}#{}", template_id, params.get("Service Name").cloned().unwrap_or_default()));
            Box::pin(async move {
                calls.lock().unwrap().push((template_id.clone(), params));
                if fail {
                    DispatchOutcome::Failure {
                        detail: format!("{} failed", template_id),
                    }
                } else {
                    DispatchOutcome::Success {
                        message: format!("Applied {}", template_id),
                    }
                }
            })
        }
    }

    #[tokio::test]
    async fn test_secure_device_runs_steps_in_order() {
        let catalog = ActionCatalog::new();
        let action = catalog.get("secure_device").unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let report = execute(action, recorded_dispatch(calls.clone(), vec![])).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.get("Service Name").unwrap(), "telnet");
        assert_eq!(calls[1].1.get("Service Name").unwrap(), "ssh");
        assert_eq!(report.succeeded(), 2);
    }

    #[tokio::test]
    async fn test_failed_step_does_not_stop_sequence() {
        let catalog = ActionCatalog::new();
        let action = catalog.get("secure_device").unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        // First step (telnet) fails; ssh step must still run
        let report = execute(
            action,
            recorded_dispatch(calls.clone(), vec!["service_toggle#telnet".to_string()]),
        )
        .await;

        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(report.steps.len(), 2);
        assert!(!report.steps[0].outcome.is_success());
        assert!(report.steps[1].outcome.is_success());
    }

    #[tokio::test]
    async fn test_single_action_dispatches_once() {
        let catalog = ActionCatalog::new();
        let action = catalog.get("setup_ntp").unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        execute(action, recorded_dispatch(calls.clone(), vec![])).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "system_ntp_client");
        assert_eq!(calls[0].1.get("Primary NTP Server").unwrap(), "time.google.com");
    }

    #[tokio::test]
    async fn test_backup_params_are_timestamped() {
        let catalog = ActionCatalog::new();
        let action = catalog.get("backup_now").unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));

        execute(action, recorded_dispatch(calls.clone(), vec![])).await;

        let calls = calls.lock().unwrap();
        let name = calls[0].1.get("Backup Name").unwrap();
        assert!(name.starts_with("backup-"));
    }

    #[test]
    fn test_basic_firewall_has_three_ordered_steps() {
        let catalog = ActionCatalog::new();
        let action = catalog.get("basic_firewall").unwrap();
        assert_eq!(action.step_count(), 3);
        if let ActionKind::MultiStep { steps } = &action.kind {
            assert_eq!(steps[0].params.get("Action").unwrap(), "accept");
            assert_eq!(steps[2].params.get("Action").unwrap(), "drop");
        } else {
            panic!("expected multi-step");
        }
    }
}
