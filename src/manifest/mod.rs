//! Mini-app manifest served at `/.well-known/farcaster.json`.
//!
//! The document is fixed apart from `homeUrl`, which follows the configured
//! public site URL. Placeholder fields (empty strings, empty lists) are
//! dropped before serving, and a section left with no fields is dropped too.

use serde::Serialize;
use serde_json::{Map, Value};

/// Signed domain association. Empty until the app is verified.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseBuilder {
    pub owner_address: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniApp {
    pub version: String,
    pub name: String,
    pub home_url: String,
    pub icon_url: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
    pub webhook_url: String,
    pub subtitle: String,
    pub description: String,
    pub screenshot_urls: Vec<String>,
    pub primary_category: String,
    pub tags: Vec<String>,
    pub hero_image_url: String,
    pub tagline: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image_url: String,
    pub noindex: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub account_association: AccountAssociation,
    pub base_builder: BaseBuilder,
    pub miniapp: MiniApp,
}

impl Default for Manifest {
    fn default() -> Self {
        let description = "Recycle and earn EcoCoins ($EC0) and NFTs.";
        Self {
            account_association: AccountAssociation::default(),
            base_builder: BaseBuilder {
                owner_address: "0x1eEEEE08C989155cA0AA46A3b37d611622e94c1d".into(),
            },
            miniapp: MiniApp {
                version: "1".into(),
                name: "EcoChain".into(),
                home_url: "https://eco-chain-wallet.vercel.app/".into(),
                icon_url: "https://ex.co/i.png".into(),
                splash_image_url: "https://ex.co/l.png".into(),
                splash_background_color: "#000000".into(),
                webhook_url: "https://ex.co/api/webhook".into(),
                subtitle: "Recycle, earn, win".into(),
                description: description.into(),
                screenshot_urls: vec![
                    "https://ex.co/s1.png".into(),
                    "https://ex.co/s2.png".into(),
                    "https://ex.co/s3.png".into(),
                ],
                primary_category: "social".into(),
                tags: vec!["example".into(), "miniapp".into(), "baseapp".into()],
                hero_image_url: "https://ex.co/og.png".into(),
                tagline: "Earn EcoCoins".into(),
                og_title: "EcoChain".into(),
                og_description: description.into(),
                og_image_url: "https://ex.co/og.png".into(),
                noindex: true,
            },
        }
    }
}

impl Manifest {
    /// Default manifest, with `homeUrl` replaced when a site URL is set.
    pub fn for_site(site_url: Option<&str>) -> Self {
        let mut manifest = Self::default();
        if let Some(url) = site_url.map(str::trim).filter(|u| !u.is_empty()) {
            manifest.miniapp.home_url = url.to_string();
        }
        manifest
    }

    /// Serialized document with placeholder fields removed.
    pub fn to_json(&self) -> Value {
        let sections = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => return Value::Object(Map::new()),
        };

        let mut out = Map::new();
        for (name, section) in sections {
            match section {
                Value::Object(fields) => {
                    let kept = with_valid_properties(fields);
                    if !kept.is_empty() {
                        out.insert(name, Value::Object(kept));
                    }
                }
                other if is_valid(&other) => {
                    out.insert(name, other);
                }
                _ => {}
            }
        }
        Value::Object(out)
    }
}

/// Keeps only fields with a truthy value; lists must be non-empty.
pub fn with_valid_properties(properties: Map<String, Value>) -> Map<String, Value> {
    properties.into_iter().filter(|(_, value)| is_valid(value)).collect()
}

fn is_valid(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_drops_empty_strings_and_lists() {
        let input = json!({
            "name": "EcoChain",
            "subtitle": "",
            "tags": [],
            "screenshotUrls": ["a.png"],
            "noindex": true,
        });
        let Value::Object(map) = input else { unreachable!() };
        let kept = with_valid_properties(map);

        assert_eq!(kept.get("name"), Some(&json!("EcoChain")));
        assert_eq!(kept.get("screenshotUrls"), Some(&json!(["a.png"])));
        assert_eq!(kept.get("noindex"), Some(&json!(true)));
        assert!(!kept.contains_key("subtitle"));
        assert!(!kept.contains_key("tags"));
    }

    #[test]
    fn empty_association_section_is_omitted() {
        let doc = Manifest::default().to_json();
        assert!(doc.get("accountAssociation").is_none());
        assert_eq!(doc["baseBuilder"]["ownerAddress"], "0x1eEEEE08C989155cA0AA46A3b37d611622e94c1d");
        assert_eq!(doc["miniapp"]["name"], "EcoChain");
        assert_eq!(doc["miniapp"]["tags"], json!(["example", "miniapp", "baseapp"]));
    }

    #[test]
    fn site_url_replaces_home_url() {
        let doc = Manifest::for_site(Some("https://eco.example/")).to_json();
        assert_eq!(doc["miniapp"]["homeUrl"], "https://eco.example/");

        let blank = Manifest::for_site(Some("  ")).to_json();
        assert_eq!(blank["miniapp"]["homeUrl"], "https://eco-chain-wallet.vercel.app/");
    }

    #[test]
    fn signed_association_is_served() {
        let mut manifest = Manifest::default();
        manifest.account_association = AccountAssociation {
            header: "h".into(),
            payload: "p".into(),
            signature: String::new(),
        };
        let doc = manifest.to_json();
        assert_eq!(doc["accountAssociation"], json!({"header": "h", "payload": "p"}));
    }
}
