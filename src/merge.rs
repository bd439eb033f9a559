//! Flag overrides for the config-derived certificate template.
//!
//! Each override field uses its zero value as an "unset" sentinel: an
//! empty string, empty list, empty map, or zero int means "inherit from
//! the config template".  Consequence for `enabled`: the flag can turn
//! it on, but can't explicitly turn it off; the config is the only way
//! to disable a certificate at creation.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::vault::CertificateCreateParameters;

/// Per-invocation overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct FlagOverrides {
    pub subject: String,
    pub sans: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub validity_in_months: i32,
    pub enabled: bool,
    pub issuer_name: String,
}

/// Overwrites fields of `params` where the override is set.
///
/// Flag tags replace the config tags wholesale; they are not merged.
pub fn apply_overrides(params: &mut CertificateCreateParameters,
                       flags: &FlagOverrides)
{
    if !flags.subject.is_empty() {
        params.policy.x509_props.subject = flags.subject.clone();
    }
    if !flags.sans.is_empty() {
        params.policy.x509_props.sans.dns_names = flags.sans.clone();
    }
    if !flags.tags.is_empty() {
        params.tags = flags.tags.clone();
    }
    if flags.validity_in_months != 0 {
        params.policy.x509_props.validity_months = flags.validity_in_months;
    }
    // A false flag is indistinguishable from an unpassed one, so false
    // inherits the config value.
    if flags.enabled {
        params.attributes.enabled = true;
    }
    if !flags.issuer_name.is_empty() {
        params.policy.issuer.name = flags.issuer_name.clone();
    }
}

/// Decodes repeated `key=value` tokens.  Exactly one `=` per token;
/// duplicate keys silently overwrite.
pub fn parse_tags(tokens: &[String]) -> Result<BTreeMap<String, String>> {
    let mut tags = BTreeMap::new();
    for token in tokens {
        let fields: Vec<&str> = token.split('=').collect();
        if fields.len() != 2 {
            return Err(Error::FlagParse(format!(
                "tags should be formatted key=value: {}", token)));
        }
        tags.insert(fields[0].to_string(), fields[1].to_string());
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    fn params() -> CertificateCreateParameters {
        let cfg: config::Config =
            serde_yaml::from_str(config::DEFAULT_CONFIG).unwrap();
        CertificateCreateParameters::from(&cfg.certificate_create_parameters)
    }

    #[test]
    fn unset_overrides_inherit_everything() {
        let mut p = params();
        let before = p.clone();
        apply_overrides(&mut p, &FlagOverrides::default());
        assert_eq!(p, before);
    }

    #[test]
    fn set_overrides_win_over_config() {
        let mut p = params();
        let flags = FlagOverrides {
            subject: "CN=foo.com".into(),
            sans: vec!["a.foo.com".into(), "b.foo.com".into()],
            tags: [("env".to_string(), "prod".to_string())].into(),
            validity_in_months: 6,
            enabled: true,
            issuer_name: "MyCA".into(),
        };
        apply_overrides(&mut p, &flags);

        assert_eq!(p.policy.x509_props.subject, "CN=foo.com");
        assert_eq!(p.policy.x509_props.sans.dns_names,
                   ["a.foo.com", "b.foo.com"]);
        assert_eq!(p.policy.x509_props.validity_months, 6);
        assert!(p.attributes.enabled);
        assert_eq!(p.policy.issuer.name, "MyCA");
        // Config tags are discarded, not merged.
        assert_eq!(p.tags.len(), 1);
        assert_eq!(p.tags["env"], "prod");
    }

    #[test]
    fn false_enabled_flag_inherits_config() {
        let mut p = params();
        assert!(!p.attributes.enabled);
        apply_overrides(&mut p, &FlagOverrides::default());
        assert!(!p.attributes.enabled);

        // And a true config value survives a false flag.
        p.attributes.enabled = true;
        apply_overrides(&mut p, &FlagOverrides::default());
        assert!(p.attributes.enabled);
    }

    #[test]
    fn parse_tags_accepts_key_value_pairs() {
        let tags = parse_tags(&["a=b".into(), "c=d".into()]).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags["a"], "b");
        assert_eq!(tags["c"], "d");
    }

    #[test]
    fn parse_tags_rejects_missing_separator() {
        let err = parse_tags(&["x".into()]).unwrap_err();
        assert!(err.to_string()
                .contains("tags should be formatted key=value: x"));
    }

    #[test]
    fn parse_tags_rejects_extra_separator() {
        assert!(parse_tags(&["a=b=c".into()]).is_err());
    }

    #[test]
    fn parse_tags_rejects_empty_token() {
        assert!(parse_tags(&["".into()]).is_err());
    }

    #[test]
    fn parse_tags_last_duplicate_wins() {
        let tags = parse_tags(&["k=1".into(), "k=2".into()]).unwrap();
        assert_eq!(tags["k"], "2");
    }
}
