use crate::config::DEFAULT_EVENT_SOURCE_URL;
use crate::hashing::{sha256_lower, sha256_phone};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Inbound lead record posted by the capture form.
///
/// Every field is optional; unknown fields are ignored. A malformed body is
/// treated as the empty record rather than rejected, so the struct derives
/// `Default`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    /// Caller-supplied deduplication id; a server id is generated when absent.
    pub event_id: Option<String>,
    /// Page the lead was captured on.
    pub event_source_url: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Meta browser cookie (_fbp), passed through verbatim.
    pub fbp: Option<String>,
    /// Meta click id cookie (_fbc), passed through verbatim.
    pub fbc: Option<String>,
    pub user_agent: Option<String>,
}

/// Hashed/pass-through user identifiers, in the Graph API `user_data` shape.
///
/// Absent fields are omitted from the JSON entirely (never sent as null or
/// empty) so the upstream schema treats them as missing.
#[derive(Debug, Clone, Serialize)]
pub struct UserData {
    /// Single-element list holding the normalized email digest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub em: Option<Vec<String>>,
    /// Single-element list holding the digits-only phone digest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_user_agent: Option<String>,
}

/// Fixed custom data attached to every lead event.
#[derive(Debug, Clone, Serialize)]
pub struct CustomData {
    pub currency: &'static str,
    pub value: u32,
}

/// One normalized conversion event in the Graph API `events` schema.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionEvent {
    pub event_name: &'static str,
    /// Unix timestamp, seconds.
    pub event_time: i64,
    pub event_id: String,
    pub action_source: &'static str,
    pub event_source_url: String,
    pub user_data: UserData,
    pub custom_data: CustomData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_event_code: Option<String>,
}

/// Wire envelope for the Graph API: always exactly one event per request.
#[derive(Debug, Clone, Serialize)]
pub struct EventsPayload {
    pub data: Vec<ConversionEvent>,
}

/// Presence gate shared by all optional identifiers: `None` and `""` both
/// mean "not supplied" (the capture form sends empty strings for untouched
/// inputs).
fn supplied(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl ConversionEvent {
    /// Builds the outbound event from an inbound lead.
    ///
    /// Email and phone are hashed before inclusion; everything else passes
    /// through verbatim. Missing `event_id` falls back to `srv-<millis>`,
    /// missing `event_source_url` to the clinic landing page.
    pub fn from_lead(lead: LeadRequest, test_event_code: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            event_name: "Lead",
            event_time: now.timestamp(),
            event_id: supplied(lead.event_id)
                .unwrap_or_else(|| format!("srv-{}", now.timestamp_millis())),
            action_source: "website",
            event_source_url: supplied(lead.event_source_url)
                .unwrap_or_else(|| DEFAULT_EVENT_SOURCE_URL.to_string()),
            user_data: UserData {
                em: supplied(lead.email).map(|e| vec![sha256_lower(&e)]),
                ph: supplied(lead.phone).map(|p| vec![sha256_phone(&p)]),
                fbp: supplied(lead.fbp),
                fbc: supplied(lead.fbc),
                client_user_agent: supplied(lead.user_agent),
            },
            custom_data: CustomData {
                currency: "JPY",
                value: 0,
            },
            test_event_code,
        }
    }
}

impl EventsPayload {
    pub fn single(event: ConversionEvent) -> Self {
        Self { data: vec![event] }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead_with(email: Option<&str>, phone: Option<&str>) -> LeadRequest {
        LeadRequest {
            email: email.map(String::from),
            phone: phone.map(String::from),
            ..LeadRequest::default()
        }
    }

    #[test]
    fn test_email_and_phone_are_hashed() {
        let event = ConversionEvent::from_lead(
            lead_with(Some("Test@Example.com "), Some("+1 (555) 123-4567")),
            None,
        );

        assert_eq!(
            event.user_data.em,
            Some(vec![
                "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b".to_string()
            ])
        );
        assert_eq!(
            event.user_data.ph,
            Some(vec![
                "d6736136ea896c1bfdc553e0e86e702c70d060d805696ca3e4e9e0961353860a".to_string()
            ])
        );
    }

    #[test]
    fn test_absent_identifiers_are_omitted() {
        let event = ConversionEvent::from_lead(LeadRequest::default(), None);
        let json = serde_json::to_value(&event).unwrap();
        let user_data = json.get("user_data").unwrap();

        assert!(user_data.get("em").is_none());
        assert!(user_data.get("ph").is_none());
        assert!(user_data.get("fbp").is_none());
        assert!(user_data.get("fbc").is_none());
        assert!(user_data.get("client_user_agent").is_none());
        assert!(json.get("test_event_code").is_none());
    }

    #[test]
    fn test_empty_strings_count_as_absent() {
        let event = ConversionEvent::from_lead(lead_with(Some(""), Some("")), None);
        assert!(event.user_data.em.is_none());
        assert!(event.user_data.ph.is_none());
    }

    #[test]
    fn test_defaults_for_event_id_and_source_url() {
        let event = ConversionEvent::from_lead(LeadRequest::default(), None);

        assert!(event.event_id.starts_with("srv-"));
        assert!(event.event_id["srv-".len()..]
            .chars()
            .all(|c| c.is_ascii_digit()));
        assert_eq!(event.event_source_url, DEFAULT_EVENT_SOURCE_URL);
        assert_eq!(event.event_name, "Lead");
        assert_eq!(event.action_source, "website");
        assert_eq!(event.custom_data.currency, "JPY");
        assert_eq!(event.custom_data.value, 0);
    }

    #[test]
    fn test_caller_values_win_over_defaults() {
        let lead = LeadRequest {
            event_id: Some("evt-123".to_string()),
            event_source_url: Some("https://example.com/landing".to_string()),
            ..LeadRequest::default()
        };
        let event = ConversionEvent::from_lead(lead, Some("TEST123".to_string()));

        assert_eq!(event.event_id, "evt-123");
        assert_eq!(event.event_source_url, "https://example.com/landing");
        assert_eq!(event.test_event_code.as_deref(), Some("TEST123"));
    }

    #[test]
    fn test_payload_carries_exactly_one_event() {
        let payload =
            EventsPayload::single(ConversionEvent::from_lead(LeadRequest::default(), None));
        assert_eq!(payload.data.len(), 1);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_lead_request_ignores_unknown_fields() {
        let lead: LeadRequest = serde_json::from_str(
            r#"{"email": "a@b.com", "campaign": "summer", "nested": {"x": 1}}"#,
        )
        .unwrap();
        assert_eq!(lead.email.as_deref(), Some("a@b.com"));
        assert!(lead.phone.is_none());
    }

    #[test]
    fn test_lead_request_camel_case_wire_names() {
        let lead: LeadRequest = serde_json::from_str(
            r#"{"eventId": "e1", "eventSourceUrl": "https://x.test/", "userAgent": "UA"}"#,
        )
        .unwrap();
        assert_eq!(lead.event_id.as_deref(), Some("e1"));
        assert_eq!(lead.event_source_url.as_deref(), Some("https://x.test/"));
        assert_eq!(lead.user_agent.as_deref(), Some("UA"));
    }
}
