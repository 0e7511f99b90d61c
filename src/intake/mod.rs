//! Order intake: the state behind the order dialog
//!
//! An [`OrderIntake`] owns one draft and walks it through
//! `Editing → Submitting → Submitted → Closed`. Every dispatch attempt
//! schedules a reset that clears the draft and closes the dialog after
//! `reset_delay`. Drafts rejected before dispatch stay in `Editing`.
//! Only an `Editing` dialog accepts a submit; a closed one must be
//! [opened](OrderIntake::open) again.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::core::category::Category;
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::order::{DraftField, OrderDraft};
use crate::dispatch::OrderDispatcher;

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
    Closed,
}

/// When the reset timer clears the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// After every attempt, failed ones included
    #[default]
    Always,
    /// Only after a successful submission; failed drafts stay for a retry
    OnSuccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Feedback shown after a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Required fields are empty; nothing was sent
    MissingFields { fields: Vec<&'static str> },
    /// The draft is complete but some value is not acceptable
    Invalid { errors: Vec<FieldValidationError> },
    /// At least one sink accepted the order
    Placed { notification_sent: bool },
    /// Every sink failed
    Failed,
    /// A submission is already in flight
    Busy,
    /// This draft was already placed; it is cleared by the reset
    AlreadyPlaced,
    /// The dialog is closed
    Closed,
}

/// Display form of a [`Notice`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeView {
    pub title: &'static str,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::MissingFields { .. } => "Champs requis",
            Notice::Invalid { .. } => "Champs invalides",
            Notice::Placed { .. } => "Commande envoyée !",
            Notice::Failed => "Erreur",
            Notice::Busy => "Envoi en cours",
            Notice::AlreadyPlaced => "Commande déjà envoyée",
            Notice::Closed => "Formulaire fermé",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Notice::MissingFields { .. } => {
                "Veuillez remplir tous les champs obligatoires.".to_string()
            }
            Notice::Invalid { errors } => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            Notice::Placed {
                notification_sent: true,
            } => "Votre commande a été envoyée au télégram et enregistrée.".to_string(),
            Notice::Placed {
                notification_sent: false,
            } => "Votre commande a été enregistrée.".to_string(),
            Notice::Failed => "Impossible d'envoyer la commande. Veuillez réessayer.".to_string(),
            Notice::Busy => "Votre commande est en cours d'envoi.".to_string(),
            Notice::AlreadyPlaced => "Cette commande a déjà été envoyée.".to_string(),
            Notice::Closed => "Ouvrez le formulaire pour passer une commande.".to_string(),
        }
    }

    pub fn variant(&self) -> NoticeVariant {
        match self {
            Notice::Placed { .. } | Notice::Busy | Notice::AlreadyPlaced | Notice::Closed => {
                NoticeVariant::Default
            }
            _ => NoticeVariant::Destructive,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notice::Placed { .. })
    }

    pub fn view(&self) -> NoticeView {
        NoticeView {
            title: self.title(),
            description: self.description(),
            variant: self.variant(),
        }
    }
}

struct IntakeState {
    draft: OrderDraft,
    category: Category,
    phase: Phase,
    reset_timer: Option<JoinHandle<()>>,
}

/// One order dialog
///
/// Clones share the same draft.
#[derive(Clone)]
pub struct OrderIntake {
    dispatcher: OrderDispatcher,
    state: Arc<Mutex<IntakeState>>,
    reset_delay: Duration,
    reset_policy: ResetPolicy,
}

impl OrderIntake {
    pub fn new(dispatcher: OrderDispatcher) -> Self {
        Self {
            dispatcher,
            state: Arc::new(Mutex::new(IntakeState {
                draft: OrderDraft::default(),
                category: Category::default(),
                phase: Phase::Editing,
                reset_timer: None,
            })),
            reset_delay: DEFAULT_RESET_DELAY,
            reset_policy: ResetPolicy::default(),
        }
    }

    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    pub fn with_reset_policy(mut self, policy: ResetPolicy) -> Self {
        self.reset_policy = policy;
        self
    }

    fn lock(&self) -> MutexGuard<'_, IntakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn draft(&self) -> OrderDraft {
        self.lock().draft.clone()
    }

    pub fn category(&self) -> Category {
        self.lock().category
    }

    /// Open the dialog for `category`
    pub fn open(&self, category: Category) {
        let mut state = self.lock();
        state.category = category;
        if state.phase == Phase::Closed {
            state.phase = Phase::Editing;
        }
    }

    /// Close the dialog, keeping the draft
    pub fn close(&self) {
        let mut state = self.lock();
        if state.phase != Phase::Submitting {
            state.phase = Phase::Closed;
        }
    }

    /// Edit one field; refused while a submission is in flight
    pub fn set_field(&self, field: DraftField, value: impl Into<String>) -> bool {
        let mut state = self.lock();
        if state.phase == Phase::Submitting {
            return false;
        }
        state.draft.set(field, value);
        true
    }

    /// Submit the current draft
    ///
    /// Missing required fields and rejected values stop the submission
    /// before any sink is called; the draft stays editable and no reset is
    /// scheduled. Otherwise the dispatcher is called exactly once.
    pub async fn submit(&self) -> Notice {
        let order = {
            let mut state = self.lock();
            match state.phase {
                Phase::Editing => {}
                Phase::Submitting => return Notice::Busy,
                Phase::Submitted => return Notice::AlreadyPlaced,
                Phase::Closed => return Notice::Closed,
            }

            let missing = state.draft.missing_fields();
            if !missing.is_empty() {
                tracing::debug!(?missing, "order draft incomplete");
                return Notice::MissingFields { fields: missing };
            }

            let checked = state.draft.to_order(state.category);
            match checked {
                Ok(order) => {
                    state.phase = Phase::Submitting;
                    order
                }
                Err(e) => {
                    tracing::debug!(error = %e, "order draft rejected");
                    return Notice::Invalid {
                        errors: match e {
                            ValidationError::FieldErrors(errors) => errors,
                            other => {
                                vec![FieldValidationError::new("order", other.to_string())]
                            }
                        },
                    };
                }
            }
        };

        let outcome = self.dispatcher.dispatch(order).await;
        let notice = if outcome.success {
            Notice::Placed {
                notification_sent: outcome.notification_sent,
            }
        } else {
            Notice::Failed
        };

        let success = notice.is_success();
        {
            let mut state = self.lock();
            state.phase = if success {
                Phase::Submitted
            } else {
                Phase::Editing
            };
        }

        if success || self.reset_policy == ResetPolicy::Always {
            self.schedule_reset();
        }

        notice
    }

    fn schedule_reset(&self) {
        let state = self.state.clone();
        let delay = self.reset_delay;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            if state.phase == Phase::Submitting {
                return;
            }
            state.draft = OrderDraft::default();
            state.phase = Phase::Closed;
            state.reset_timer = None;
        });

        // A newer attempt restarts the countdown
        if let Some(previous) = self.lock().reset_timer.replace(timer) {
            previous.abort();
        }
    }
}
