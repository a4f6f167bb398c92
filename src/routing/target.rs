// Target Resolution
//
// Normalizes the URL stashed in a notification against the panel origin
// before any navigation happens. A payload can carry anything, including
// an absolute foreign-origin URL; the resolved target is always
// same-origin with the panel.

use url::Url;

pub const APP_ORIGIN: &str = "https://pedidosyoheladerias.com";
pub const PANEL_PATH: &str = "/cadete/panel/";

fn origin_base() -> Url {
    // APP_ORIGIN is a compile-time constant, parse cannot fail
    Url::parse(APP_ORIGIN).expect("invalid APP_ORIGIN constant")
}

/// Absolute URL of the panel root
pub fn panel_url() -> Url {
    origin_base()
        .join(PANEL_PATH)
        .expect("invalid PANEL_PATH constant")
}

/// Resolve a stored notification target into an absolute same-origin URL.
///
/// Relative targets resolve against the origin; absolute same-origin
/// targets pass through; anything foreign or unparseable is rewritten to
/// the panel root.
pub fn resolve_target(raw: &str) -> Url {
    let base = origin_base();
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return panel_url();
    }

    match base.join(trimmed) {
        Ok(joined) if joined.origin() == base.origin() => joined,
        Ok(joined) => {
            println!(
                "[Routing] ⚠️ Rejecting foreign-origin target '{}', using panel root",
                joined
            );
            panel_url()
        }
        Err(e) => {
            println!(
                "[Routing] ⚠️ Unparseable target '{}' ({}), using panel root",
                trimmed, e
            );
            panel_url()
        }
    }
}

/// Whether a client's current location already sits on the panel path
pub fn is_panel_url(candidate: &str) -> bool {
    let base = origin_base();
    match Url::parse(candidate) {
        Ok(parsed) => {
            parsed.origin() == base.origin() && parsed.path().starts_with("/cadete/panel")
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_target_resolves_against_origin() {
        let resolved = resolve_target("/cadete/panel/?order=42");
        assert_eq!(
            resolved.as_str(),
            "https://pedidosyoheladerias.com/cadete/panel/?order=42"
        );
    }

    #[test]
    fn test_absolute_same_origin_passes_through() {
        let resolved = resolve_target("https://pedidosyoheladerias.com/cadete/panel/");
        assert_eq!(resolved, panel_url());
    }

    #[test]
    fn test_foreign_origin_is_rewritten_to_panel_root() {
        let resolved = resolve_target("https://evil.example.com/phish");
        assert_eq!(resolved, panel_url());
    }

    #[test]
    fn test_scheme_relative_foreign_origin_is_rewritten() {
        let resolved = resolve_target("//evil.example.com/phish");
        assert_eq!(resolved, panel_url());
    }

    #[test]
    fn test_empty_target_defaults_to_panel_root() {
        assert_eq!(resolve_target(""), panel_url());
        assert_eq!(resolve_target("   "), panel_url());
    }

    #[test]
    fn test_query_is_preserved() {
        let resolved = resolve_target("/cadete/panel/?order=42&from=push");
        assert_eq!(resolved.query(), Some("order=42&from=push"));
    }

    #[test]
    fn test_is_panel_url() {
        assert!(is_panel_url("https://pedidosyoheladerias.com/cadete/panel/"));
        assert!(is_panel_url(
            "https://pedidosyoheladerias.com/cadete/panel/?order=7"
        ));
        assert!(is_panel_url("https://pedidosyoheladerias.com/cadete/panel"));
        assert!(!is_panel_url("https://pedidosyoheladerias.com/"));
        assert!(!is_panel_url("https://evil.example.com/cadete/panel/"));
        assert!(!is_panel_url("not a url"));
    }
}
