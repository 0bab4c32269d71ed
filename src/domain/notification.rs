//! Local notification vocabulary: what the engine asks the scheduler to show,
//! and the action events the scheduler hands back.

use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

pub const PRESET_ACTION_PREFIX: &str = "PRESET_";
pub const CUSTOM_SPLIT_ACTION: &str = "CUSTOM_SPLIT_ACTION";
pub const DONT_SPLIT_ACTION: &str = "DONT_SPLIT_ACTION";
pub const VIEW_REQUEST_ACTION: &str = "VIEW_REQUEST_ACTION";
pub const DEFAULT_ACTION: &str = "com.apple.UNNotificationDefaultActionIdentifier";

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum CategoryTag {
    PaymentSplit,
    IncomingRequest,
    Generic,
}

impl CategoryTag {
    pub fn identifier(&self) -> &'static str {
        match self {
            CategoryTag::PaymentSplit => "PAYMENT_SPLIT_CATEGORY",
            CategoryTag::IncomingRequest => "INCOMING_REQUEST_CATEGORY",
            CategoryTag::Generic => "GENERIC_CATEGORY",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        [
            CategoryTag::PaymentSplit,
            CategoryTag::IncomingRequest,
            CategoryTag::Generic,
        ]
        .into_iter()
        .find(|tag| tag.identifier() == identifier)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActionPresentation {
    /// Handled without opening the app.
    #[default]
    Background,
    /// Brings the app to the foreground.
    Foreground,
    Destructive,
}

/// A button shown on a notification's long-press menu.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ActionButton {
    pub identifier: String,
    pub title: String,
    pub presentation: ActionPresentation,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct NotificationCategory {
    pub tag: CategoryTag,
    pub actions: Vec<ActionButton>,
}

impl NotificationCategory {
    /// Payment prompt actions: one quick split per preset (up to
    /// `preset_limit`), then "Custom..." and "Don't Split".
    pub fn payment_split(presets: &[Preset], preset_limit: usize) -> Self {
        let mut actions: Vec<ActionButton> = presets
            .iter()
            .take(preset_limit)
            .enumerate()
            .map(|(index, preset)| ActionButton {
                identifier: NotificationActionKind::PresetQuickSplit(index).identifier(),
                title: format!("Split w/ {}", preset.name),
                presentation: ActionPresentation::Background,
            })
            .collect();

        actions.push(ActionButton {
            identifier: CUSTOM_SPLIT_ACTION.to_string(),
            title: "Custom...".to_string(),
            presentation: ActionPresentation::Foreground,
        });
        actions.push(ActionButton {
            identifier: DONT_SPLIT_ACTION.to_string(),
            title: "Don't Split".to_string(),
            presentation: ActionPresentation::Destructive,
        });

        Self {
            tag: CategoryTag::PaymentSplit,
            actions,
        }
    }

    pub fn incoming_request() -> Self {
        Self {
            tag: CategoryTag::IncomingRequest,
            actions: vec![ActionButton {
                identifier: VIEW_REQUEST_ACTION.to_string(),
                title: "View".to_string(),
                presentation: ActionPresentation::Foreground,
            }],
        }
    }

    pub fn generic() -> Self {
        Self {
            tag: CategoryTag::Generic,
            actions: Vec::new(),
        }
    }
}

/// A notification to be shown after `delay`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub delay: Duration,
    pub category: CategoryTag,
    /// Payment id for split prompts, split request id for incoming requests.
    pub correlation_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum NotificationActionKind {
    /// Quick split with the preset at this index of the preset list.
    PresetQuickSplit(usize),
    CustomSplit,
    DontSplit,
    IncomingRequestOpened,
    /// The notification body was tapped.
    DefaultTap,
}

impl NotificationActionKind {
    pub fn identifier(&self) -> String {
        match self {
            NotificationActionKind::PresetQuickSplit(index) => {
                format!("{PRESET_ACTION_PREFIX}{index}")
            }
            NotificationActionKind::CustomSplit => CUSTOM_SPLIT_ACTION.to_string(),
            NotificationActionKind::DontSplit => DONT_SPLIT_ACTION.to_string(),
            NotificationActionKind::IncomingRequestOpened => VIEW_REQUEST_ACTION.to_string(),
            NotificationActionKind::DefaultTap => DEFAULT_ACTION.to_string(),
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        if let Some(index) = identifier.strip_prefix(PRESET_ACTION_PREFIX) {
            return index.parse().ok().map(NotificationActionKind::PresetQuickSplit);
        }
        match identifier {
            CUSTOM_SPLIT_ACTION => Some(NotificationActionKind::CustomSplit),
            DONT_SPLIT_ACTION => Some(NotificationActionKind::DontSplit),
            VIEW_REQUEST_ACTION => Some(NotificationActionKind::IncomingRequestOpened),
            DEFAULT_ACTION => Some(NotificationActionKind::DefaultTap),
            _ => None,
        }
    }
}

/// What the scheduler reports back when the user interacts with a
/// delivered notification.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub struct NotificationEvent {
    pub correlation_id: Option<Uuid>,
    pub category: CategoryTag,
    pub action: NotificationActionKind,
}

impl NotificationEvent {
    pub fn new(category: CategoryTag, correlation_id: Uuid, action: NotificationActionKind) -> Self {
        Self {
            correlation_id: Some(correlation_id),
            category,
            action,
        }
    }

    /// Decodes the raw identifiers a platform notification center delivers.
    pub fn from_identifiers(
        category: &str,
        action: &str,
        correlation_id: Option<&str>,
    ) -> Option<Self> {
        Some(Self {
            correlation_id: correlation_id.and_then(|id| Uuid::parse_str(id).ok()),
            category: CategoryTag::from_identifier(category)?,
            action: NotificationActionKind::from_identifier(action)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::preset::default_presets;

    #[test]
    fn test_action_identifiers_parse() {
        assert_eq!(
            NotificationActionKind::from_identifier("PRESET_1"),
            Some(NotificationActionKind::PresetQuickSplit(1))
        );
        assert_eq!(
            NotificationActionKind::from_identifier(DONT_SPLIT_ACTION),
            Some(NotificationActionKind::DontSplit)
        );
        assert_eq!(NotificationActionKind::from_identifier("PRESET_x"), None);
        assert_eq!(NotificationActionKind::from_identifier("SNOOZE"), None);
    }

    #[test]
    fn test_payment_category_actions() {
        let mut presets = default_presets();
        presets.push(Preset::new("Jordan", "555-000-0000"));

        let category = NotificationCategory::payment_split(&presets, 2);
        let titles: Vec<_> = category.actions.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Split w/ Alex", "Split w/ Sam", "Custom...", "Don't Split"]
        );
        assert_eq!(category.actions[0].identifier, "PRESET_0");
        assert_eq!(category.actions[3].presentation, ActionPresentation::Destructive);
    }

    #[test]
    fn test_payment_category_without_presets() {
        let category = NotificationCategory::payment_split(&[], 2);
        assert_eq!(category.actions.len(), 2);
        assert_eq!(category.actions[0].identifier, CUSTOM_SPLIT_ACTION);
    }

    #[test]
    fn test_event_from_identifiers() {
        let id = Uuid::new_v4();
        let event = NotificationEvent::from_identifiers(
            "PAYMENT_SPLIT_CATEGORY",
            "PRESET_0",
            Some(&id.to_string()),
        )
        .unwrap();
        assert_eq!(event.category, CategoryTag::PaymentSplit);
        assert_eq!(event.action, NotificationActionKind::PresetQuickSplit(0));
        assert_eq!(event.correlation_id, Some(id));

        assert!(NotificationEvent::from_identifiers("NOPE", "PRESET_0", None).is_none());
    }
}
