// Push Payload
//
// Untrusted payload model for inbound push messages and its resolution
// into concrete display parameters.
//
// The backend sends JSON with optional keys; nothing is validated there,
// so resolution falls back in two levels: structured JSON, then the raw
// text as the notification body, then hard-coded product defaults.

use serde::Deserialize;

pub const DEFAULT_TITLE: &str = "Yo Heladerías";
pub const DEFAULT_BODY: &str = "Tenés un pedido para aceptar o seguir.";
pub const DEFAULT_URL: &str = "/cadete/panel/";
pub const DEFAULT_ICON: &str = "/static/images/logo_yo_heladeria_blanco.png";
pub const DEFAULT_TAG: &str = "yo-pedido";
pub const DEFAULT_VIBRATE: [u32; 3] = [200, 100, 200];

/// Push payload as sent by the backend. Every field is optional and
/// unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    /// Older backend payloads use "head" instead of "title"
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub badge: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub vibrate: Option<Vec<u32>>,
    #[serde(default, rename = "requireInteraction")]
    pub require_interaction: Option<bool>,
}

/// Single action button attached to a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Fully resolved display parameters. Invariant: `title` and `body` are
/// never empty once resolution has run.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationSpec {
    pub title: String,
    pub body: String,
    pub url: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub vibrate: Vec<u32>,
    pub require_interaction: bool,
    pub renotify: bool,
    pub actions: Vec<NotificationAction>,
}

/// Parse a raw payload, falling back to plain text on malformed JSON.
///
/// A payload that is not valid JSON becomes a payload whose body is the
/// raw text and whose title is the product name. An empty payload parses
/// to an all-default payload.
pub fn parse_payload(raw: &str) -> PushPayload {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return PushPayload::default();
    }

    match serde_json::from_str::<PushPayload>(trimmed) {
        Ok(payload) => payload,
        Err(e) => {
            println!("[Payload] Not JSON ({}), using raw text as body", e);
            PushPayload {
                title: Some(DEFAULT_TITLE.to_string()),
                body: Some(trimmed.to_string()),
                ..PushPayload::default()
            }
        }
    }
}

/// Resolve a payload into display parameters, substituting the product
/// defaults for anything missing or empty.
pub fn resolve(payload: &PushPayload) -> NotificationSpec {
    let title = payload
        .title
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| payload.head.as_deref().filter(|s| !s.trim().is_empty()))
        .unwrap_or(DEFAULT_TITLE);

    let body = payload
        .body
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_BODY);

    let icon = payload
        .icon
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_ICON);

    // Android-style badge falls back to the icon, then the product logo
    let badge = payload
        .badge
        .as_deref()
        .or_else(|| payload.icon.as_deref())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_ICON);

    let url = payload
        .url
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_URL);

    let tag = payload
        .tag
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_TAG);

    NotificationSpec {
        title: title.to_string(),
        body: body.to_string(),
        url: url.to_string(),
        icon: icon.to_string(),
        badge: badge.to_string(),
        tag: tag.to_string(),
        vibrate: payload
            .vibrate
            .clone()
            .unwrap_or_else(|| DEFAULT_VIBRATE.to_vec()),
        require_interaction: payload.require_interaction.unwrap_or(false),
        renotify: true,
        actions: vec![NotificationAction {
            action: "open".to_string(),
            title: "Abrir".to_string(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_uses_defaults() {
        let spec = resolve(&parse_payload("{}"));
        assert_eq!(spec.title, DEFAULT_TITLE);
        assert_eq!(spec.body, DEFAULT_BODY);
        assert_eq!(spec.url, DEFAULT_URL);
        assert_eq!(spec.icon, DEFAULT_ICON);
        assert_eq!(spec.tag, DEFAULT_TAG);
        assert_eq!(spec.vibrate, DEFAULT_VIBRATE.to_vec());
        assert!(!spec.require_interaction);
        assert!(spec.renotify);
    }

    #[test]
    fn test_full_payload_wins_over_defaults() {
        let raw = r#"{
            "title": "Pedido #42",
            "body": "Nuevo pedido",
            "url": "/cadete/panel/?order=42",
            "icon": "/static/images/push-icon.png",
            "tag": "pedido-42",
            "vibrate": [100, 50, 100],
            "requireInteraction": true
        }"#;
        let spec = resolve(&parse_payload(raw));
        assert_eq!(spec.title, "Pedido #42");
        assert_eq!(spec.body, "Nuevo pedido");
        assert_eq!(spec.url, "/cadete/panel/?order=42");
        assert_eq!(spec.icon, "/static/images/push-icon.png");
        assert_eq!(spec.tag, "pedido-42");
        assert_eq!(spec.vibrate, vec![100, 50, 100]);
        assert!(spec.require_interaction);
    }

    #[test]
    fn test_head_is_accepted_as_title() {
        let spec = resolve(&parse_payload(r#"{"head": "¡Nuevo Pedido Disponible!"}"#));
        assert_eq!(spec.title, "¡Nuevo Pedido Disponible!");
    }

    #[test]
    fn test_title_wins_over_head() {
        let spec = resolve(&parse_payload(r#"{"title": "Pedido", "head": "Otro"}"#));
        assert_eq!(spec.title, "Pedido");
    }

    #[test]
    fn test_malformed_json_becomes_plain_text_body() {
        let spec = resolve(&parse_payload("pedido listo en sucursal centro"));
        assert_eq!(spec.title, DEFAULT_TITLE);
        assert_eq!(spec.body, "pedido listo en sucursal centro");
        assert_eq!(spec.url, DEFAULT_URL);
    }

    #[test]
    fn test_empty_input_resolves_like_empty_object() {
        let spec = resolve(&parse_payload(""));
        assert_eq!(spec.title, DEFAULT_TITLE);
        assert_eq!(spec.body, DEFAULT_BODY);
    }

    #[test]
    fn test_empty_strings_are_treated_as_missing() {
        let spec = resolve(&parse_payload(r#"{"title": "", "body": "  "}"#));
        assert_eq!(spec.title, DEFAULT_TITLE);
        assert_eq!(spec.body, DEFAULT_BODY);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let spec = resolve(&parse_payload(
            r#"{"body": "hola", "priority": "high", "ttl": 1000}"#,
        ));
        assert_eq!(spec.body, "hola");
        assert_eq!(spec.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_badge_falls_back_to_icon() {
        let spec = resolve(&parse_payload(r#"{"icon": "/static/images/push-icon.png"}"#));
        assert_eq!(spec.badge, "/static/images/push-icon.png");
    }
}
