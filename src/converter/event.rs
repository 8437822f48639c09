//! Storage notifications that trigger conversions.
use crate::converter::{ArchiveConverter, ConvertOutcome};
use crate::error::ConvertError;
use log::info;
use serde::Deserialize;

/// Kind of change reported for an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ObjectFinalize,
    ObjectMetadataUpdate,
    ObjectDelete,
    ObjectArchive,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        match value {
            "OBJECT_FINALIZE" => EventKind::ObjectFinalize,
            "OBJECT_METADATA_UPDATE" => EventKind::ObjectMetadataUpdate,
            "OBJECT_DELETE" => EventKind::ObjectDelete,
            "OBJECT_ARCHIVE" => EventKind::ObjectArchive,
            other => EventKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct Notification {
    #[serde(default)]
    message: NotificationMessage,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationMessage {
    #[serde(default)]
    attributes: NotificationAttributes,
    #[serde(rename = "messageId", default)]
    message_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct NotificationAttributes {
    #[serde(rename = "bucketId", default)]
    bucket: String,
    #[serde(rename = "objectId", default)]
    object: String,
    #[serde(rename = "eventType", default)]
    event_type: String,
}

/// An object change notification.
///
/// Parsed from the push payload:
/// ```json
/// {"message": {"attributes": {"bucketId": "...", "objectId": "...", "eventType": "..."},
///              "messageId": "..."}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionEvent {
    pub bucket: String,
    pub object: String,
    pub kind: EventKind,
    pub message_id: String,
}

impl ConversionEvent {
    pub fn from_json(payload: &[u8]) -> Result<ConversionEvent, serde_json::Error> {
        let notification: Notification = serde_json::from_slice(payload)?;
        let message = notification.message;
        Ok(ConversionEvent {
            kind: EventKind::from(message.attributes.event_type.as_str()),
            bucket: message.attributes.bucket,
            object: message.attributes.object,
            message_id: message.message_id,
        })
    }

    /// Whether the object is complete and ready to convert.
    pub fn triggers_conversion(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ObjectFinalize | EventKind::ObjectMetadataUpdate
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Processed(ConvertOutcome),
    Ignored(EventKind),
}

impl ArchiveConverter {
    /// Converts the object named by `event` if the event kind calls for it.
    pub fn handle_event(&self, event: &ConversionEvent) -> Result<EventOutcome, ConvertError> {
        if !event.triggers_conversion() {
            info!(
                "skipped {:?} event: id {}, object {}",
                event.kind, event.message_id, event.object
            );
            return Ok(EventOutcome::Ignored(event.kind.clone()));
        }
        info!(
            "converting archive {}/{} (message {})",
            event.bucket, event.object, event.message_id
        );
        self.process(&event.object).map(EventOutcome::Processed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event() {
        let payload = br#"{
            "message": {
                "attributes": {
                    "bucketId": "archive-bucket",
                    "objectId": "bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2",
                    "eventType": "OBJECT_METADATA_UPDATE"
                },
                "messageId": "42"
            },
            "subscription": "projects/x/subscriptions/y"
        }"#;
        let event = ConversionEvent::from_json(payload).unwrap();
        assert_eq!(event.bucket, "archive-bucket");
        assert_eq!(
            event.object,
            "bgpdata/2022.04/UPDATES/updates.20220427.1900.bz2"
        );
        assert_eq!(event.kind, EventKind::ObjectMetadataUpdate);
        assert_eq!(event.message_id, "42");
        assert!(event.triggers_conversion());
    }

    #[test]
    fn test_other_kinds() {
        let event =
            ConversionEvent::from_json(br#"{"message":{"attributes":{"eventType":"OBJECT_DELETE"}}}"#)
                .unwrap();
        assert_eq!(event.kind, EventKind::ObjectDelete);
        assert!(!event.triggers_conversion());

        let event = ConversionEvent::from_json(br#"{"message":{}}"#).unwrap();
        assert_eq!(event.kind, EventKind::Other(String::new()));
        assert!(ConversionEvent::from_json(b"not json").is_err());
    }
}
