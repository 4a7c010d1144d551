//! Deploy configuration and scaffold file generation
//!
//! `DeployConfig` is the immutable per-request input bundle: display
//! metadata, target coordinates and credential groups. Credential groups
//! are keyed by a closed provider enumeration; unknown keys in a request
//! are dropped during conversion rather than rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Third-party services whose credentials can be baked into the generated
/// environment file. Unknown names in a request are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialProvider {
    Supabase,
    Stripe,
    Openai,
    Resend,
    Github,
    Vercel,
}

impl CredentialProvider {
    pub const ALL: &'static [CredentialProvider] = &[
        CredentialProvider::Supabase,
        CredentialProvider::Stripe,
        CredentialProvider::Openai,
        CredentialProvider::Resend,
        CredentialProvider::Github,
        CredentialProvider::Vercel,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "supabase" => Some(CredentialProvider::Supabase),
            "stripe" => Some(CredentialProvider::Stripe),
            "openai" => Some(CredentialProvider::Openai),
            "resend" => Some(CredentialProvider::Resend),
            "github" => Some(CredentialProvider::Github),
            "vercel" => Some(CredentialProvider::Vercel),
            _ => None,
        }
    }

    /// Label used for the env-file block header.
    pub fn label(&self) -> &'static str {
        match self {
            CredentialProvider::Supabase => "Supabase",
            CredentialProvider::Stripe => "Stripe",
            CredentialProvider::Openai => "OpenAI",
            CredentialProvider::Resend => "Resend",
            CredentialProvider::Github => "GitHub",
            CredentialProvider::Vercel => "Vercel",
        }
    }
}

/// Opaque key/value record for one provider, passed through verbatim into
/// the generated env file.
pub type CredentialGroup = BTreeMap<String, String>;

/// Immutable input bundle for one deploy request. Constructed once,
/// discarded when the request completes.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Display name, used for the generated README and commit message.
    pub name: String,
    pub description: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub project_name: String,
    pub credentials: BTreeMap<CredentialProvider, CredentialGroup>,
}

impl DeployConfig {
    /// Fields that must be non-empty before any I/O is attempted.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.name),
            ("repoOwner", &self.repo_owner),
            ("repoName", &self.repo_name),
            ("projectName", &self.project_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("missing required config field: {}", field));
            }
        }
        Ok(())
    }

    /// Convert a raw string-keyed credential map (as received on the wire)
    /// into the closed enumeration, silently dropping unknown providers.
    pub fn credentials_from_raw(
        raw: &BTreeMap<String, CredentialGroup>,
    ) -> BTreeMap<CredentialProvider, CredentialGroup> {
        raw.iter()
            .filter_map(|(key, group)| {
                CredentialProvider::from_key(key).map(|p| (p, group.clone()))
            })
            .collect()
    }

    /// Env-file content: one labeled `KEY=value` block per credential
    /// group actually present, in a fixed provider order. Absent groups
    /// contribute nothing.
    pub fn render_env_file(&self) -> String {
        let mut out = String::new();
        for provider in CredentialProvider::ALL {
            let Some(group) = self.credentials.get(provider) else {
                continue;
            };
            if group.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("# {}\n", provider.label()));
            for (key, value) in group {
                out.push_str(&format!("{}={}\n", key, value));
            }
        }
        out
    }

    /// README content derived from the config's display metadata.
    pub fn render_readme(&self) -> String {
        let mut out = format!("# {}\n", self.name);
        if !self.description.trim().is_empty() {
            out.push('\n');
            out.push_str(self.description.trim());
            out.push('\n');
        }
        out
    }

    /// Default ignore file written when the snapshot carries none.
    pub fn render_gitignore(&self) -> &'static str {
        "node_modules/\n.next/\ndist/\nbuild/\ncoverage/\n.env\n.env.local\n.DS_Store\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(pairs: &[(&str, &str)]) -> CredentialGroup {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn config_with(credentials: BTreeMap<CredentialProvider, CredentialGroup>) -> DeployConfig {
        DeployConfig {
            name: "Demo App".to_string(),
            description: "A generated starter".to_string(),
            repo_owner: "acme".to_string(),
            repo_name: "demo-app".to_string(),
            project_name: "demo-app".to_string(),
            credentials,
        }
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut config = config_with(BTreeMap::new());
        config.repo_name = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("repoName"));
    }

    #[test]
    fn test_env_file_renders_only_present_groups() {
        let mut credentials = BTreeMap::new();
        credentials.insert(
            CredentialProvider::Supabase,
            group(&[("SUPABASE_URL", "https://x.supabase.co"), ("SUPABASE_KEY", "sk")]),
        );
        credentials.insert(
            CredentialProvider::Stripe,
            group(&[("STRIPE_SECRET_KEY", "sk_test")]),
        );
        let config = config_with(credentials);

        let env = config.render_env_file();
        assert!(env.starts_with("# Supabase\n"));
        assert!(env.contains("SUPABASE_URL=https://x.supabase.co\n"));
        assert!(env.contains("# Stripe\nSTRIPE_SECRET_KEY=sk_test\n"));
        assert!(!env.contains("OpenAI"));
    }

    #[test]
    fn test_unknown_provider_keys_are_ignored() {
        let mut raw = BTreeMap::new();
        raw.insert("stripe".to_string(), group(&[("K", "v")]));
        raw.insert("some-future-provider".to_string(), group(&[("X", "y")]));

        let converted = DeployConfig::credentials_from_raw(&raw);
        assert_eq!(converted.len(), 1);
        assert!(converted.contains_key(&CredentialProvider::Stripe));
    }

    #[test]
    fn test_readme_includes_description() {
        let config = config_with(BTreeMap::new());
        let readme = config.render_readme();
        assert!(readme.starts_with("# Demo App\n"));
        assert!(readme.contains("A generated starter"));
    }
}
