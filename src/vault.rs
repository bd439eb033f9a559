//! Key vault client adapter.
//!
//! Wraps the vault's HTTPS interface behind the [`VaultOps`] trait so the
//! orchestrators can be tested against a mock.  Every request and
//! response is dumped (headers and body) at DEBUG; `Authorization` is
//! redacted unless the operator opted into `--unsafe-log-auth`.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Request};
use reqwest::header;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config;
use crate::credentials::AccessToken;
use crate::error::{Error, Result};

/// REST api-version sent on every request.
pub const API_VERSION: &str = "7.4";

/// Returns the vault base URL for a vault name, without a trailing slash.
pub fn vault_url(vault_name: &str) -> String {
    format!("https://{}.vault.azure.net", vault_name)
}

/// The wire shape of a create-certificate request body.
///
/// Field names follow the vault's REST schema, not the config document;
/// [`From<&config::CertificateTemplate>`] maps between the two.  This is
/// also what the confirmation prompt renders, so the operator sees
/// exactly what goes over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateCreateParameters {
    pub policy: CertificatePolicy,
    pub attributes: CertificateAttributes,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificatePolicy {
    pub key_props: KeyProperties,
    pub secret_props: SecretProperties,
    pub x509_props: X509Properties,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lifetime_actions: Vec<LifetimeAction>,
    pub issuer: IssuerParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyProperties {
    pub exportable: bool,
    pub kty: String,
    pub key_size: i32,
    pub reuse_key: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretProperties {
    #[serde(rename = "contentType")]
    pub content_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct X509Properties {
    pub subject: String,
    pub sans: SubjectAlternativeNames,
    pub validity_months: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectAlternativeNames {
    pub dns_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeAction {
    pub trigger: Trigger,
    pub action: Action,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime_percentage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_before_expiry: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    pub action_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssuerParameters {
    pub name: String,
}

impl From<&config::CertificateTemplate> for CertificateCreateParameters {
    fn from(tpl: &config::CertificateTemplate) -> Self {
        let policy = &tpl.certificate_policy;
        CertificateCreateParameters {
            policy: CertificatePolicy {
                key_props: KeyProperties {
                    exportable: policy.key_properties.exportable,
                    kty: policy.key_properties.key_type.clone(),
                    key_size: policy.key_properties.key_size,
                    reuse_key: policy.key_properties.reuse_key,
                },
                secret_props: SecretProperties {
                    content_type: policy.secret_properties
                        .content_type.clone(),
                },
                x509_props: X509Properties {
                    subject: policy.x509_certificate_properties
                        .subject.clone(),
                    sans: SubjectAlternativeNames {
                        dns_names: policy.x509_certificate_properties
                            .subject_alternative_names.clone(),
                    },
                    validity_months: policy.x509_certificate_properties
                        .validity_in_months,
                },
                lifetime_actions: policy.lifetime_actions.iter()
                    .map(|la| LifetimeAction {
                        trigger: Trigger {
                            lifetime_percentage:
                                la.trigger.lifetime_percentage,
                            days_before_expiry:
                                la.trigger.days_before_expiry,
                        },
                        action: Action {
                            action_type: la.action.clone(),
                        },
                    })
                    .collect(),
                issuer: IssuerParameters {
                    name: policy.issuer_parameters.name.clone(),
                },
            },
            attributes: CertificateAttributes {
                enabled: tpl.certificate_attributes.enabled,
            },
            tags: tpl.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateAttributes {
    pub enabled: bool,
}

/// The latest version of an existing certificate, as returned by the
/// get-certificate operation.  Unknown response fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CertificateBundle {
    pub id: Option<String>,
    pub policy: Option<CertificatePolicy>,
    pub attributes: Option<CertificateAttributes>,
    pub tags: Option<BTreeMap<String, String>>,
}

/// Creation receipt returned by the create-certificate operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CertificateOperation {
    pub id: Option<String>,
    pub request_id: Option<String>,
    pub status: Option<String>,
    pub status_details: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CertificateListPage {
    value: Vec<serde_json::Value>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

/// The three vault operations the orchestrators need.
///
/// `timeout` bounds each remote call independently; the list iterator
/// reuses its timeout for every page fetch it performs.
pub trait VaultOps {
    /// Fetches the certificate `name`.  An empty `version` means the
    /// latest version.
    fn get_certificate(&self, vault_url: &str, name: &str, version: &str,
                       timeout: Duration)
                       -> Result<CertificateBundle>;

    /// Submits a create request and returns the creation receipt.
    fn create_certificate(&self, vault_url: &str, name: &str,
                          params: &CertificateCreateParameters,
                          timeout: Duration)
                          -> Result<CertificateOperation>;

    /// Returns a lazy iterator over all certificates in the vault.
    /// Advancing it may perform further HTTP requests; the whole
    /// pagination shares the one `timeout` deadline.
    fn list_certificates<'a>(&'a self, vault_url: &str, timeout: Duration)
                             -> Result<Box<dyn Iterator<
                                     Item = Result<serde_json::Value>> + 'a>>;
}

/// HTTP error response from the vault.
#[derive(Debug, thiserror::Error)]
#[error("HTTP {status}: {body}")]
pub struct HttpStatusError {
    pub status: StatusCode,
    pub body: String,
}

/// Blocking HTTP client for the vault REST interface, authenticated with
/// a bearer token from the ambient `az` session.
pub struct KeyVaultClient {
    http: Client,
    token: String,
    log_auth: bool,
}

impl KeyVaultClient {
    pub fn new(credential: AccessToken, log_auth: bool) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::remote("can't build HTTP client", e))?;
        Ok(KeyVaultClient {
            http,
            token: credential.access_token,
            log_auth,
        })
    }

    /// Sends `req`, logging full request and response dumps at DEBUG.
    fn roundtrip(&self, operation: &str, req: Request, timeout: Duration)
                 -> Result<(StatusCode, String)>
    {
        debug!(operation,
               timeout = %humantime::format_duration(timeout),
               request = %self.dump_request(&req),
               "vault HTTP request");

        let resp = self.http.execute(req).map_err(|e| {
            error!(operation, err = %e, "vault HTTP transport error");
            Error::remote(operation.to_string(), e)
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text()
            .map_err(|e| Error::remote(operation.to_string(), e))?;

        let mut dump = format!("HTTP {}\n", status);
        for (name, value) in headers.iter() {
            dump.push_str(name.as_str());
            dump.push_str(": ");
            dump.push_str(value.to_str().unwrap_or("<binary>"));
            dump.push('\n');
        }
        dump.push('\n');
        dump.push_str(&body);
        debug!(operation, response = %dump, "vault HTTP response");

        Ok((status, body))
    }

    fn dump_request(&self, req: &Request) -> String {
        let mut dump = format!("{} {}\n", req.method(), req.url());
        for (name, value) in req.headers().iter() {
            dump.push_str(name.as_str());
            dump.push_str(": ");
            if *name == header::AUTHORIZATION && !self.log_auth {
                dump.push_str("<redacted>");
            } else {
                dump.push_str(value.to_str().unwrap_or("<binary>"));
            }
            dump.push('\n');
        }
        if let Some(bytes) = req.body().and_then(|b| b.as_bytes()) {
            dump.push('\n');
            dump.push_str(&String::from_utf8_lossy(bytes));
        }
        dump
    }

    fn get_json(&self, operation: &str, url: &str, timeout: Duration)
                -> Result<String>
    {
        let req = self.http.get(url)
            .bearer_auth(&self.token)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::remote(operation.to_string(), e))?;
        let (status, body) = self.roundtrip(operation, req, timeout)?;
        if !status.is_success() {
            return Err(Error::remote(operation.to_string(),
                                     HttpStatusError { status, body }));
        }
        Ok(body)
    }

    fn fetch_page(&self, url: &str, timeout: Duration)
                  -> Result<CertificateListPage>
    {
        let body = self.get_json("list certificates", url, timeout)?;
        serde_json::from_str(&body)
            .map_err(|e| Error::remote("list certificates", e))
    }
}

impl VaultOps for KeyVaultClient {
    fn get_certificate(&self, vault_url: &str, name: &str, version: &str,
                       timeout: Duration)
                       -> Result<CertificateBundle>
    {
        let url = if version.is_empty() {
            format!("{}/certificates/{}/?api-version={}",
                    vault_url, name, API_VERSION)
        } else {
            format!("{}/certificates/{}/{}?api-version={}",
                    vault_url, name, version, API_VERSION)
        };
        let body = self.get_json("get certificate", &url, timeout)?;
        serde_json::from_str(&body)
            .map_err(|e| Error::remote("get certificate", e))
    }

    fn create_certificate(&self, vault_url: &str, name: &str,
                          params: &CertificateCreateParameters,
                          timeout: Duration)
                          -> Result<CertificateOperation>
    {
        let operation = "create certificate";
        let url = format!("{}/certificates/{}/create?api-version={}",
                          vault_url, name, API_VERSION);
        let req = self.http.post(&url)
            .bearer_auth(&self.token)
            .timeout(timeout)
            .json(params)
            .build()
            .map_err(|e| Error::remote(operation, e))?;
        let (status, body) = self.roundtrip(operation, req, timeout)?;
        if !status.is_success() {
            return Err(Error::remote(operation,
                                     HttpStatusError { status, body }));
        }
        serde_json::from_str(&body).map_err(|e| Error::remote(operation, e))
    }

    fn list_certificates<'a>(&'a self, vault_url: &str, timeout: Duration)
                             -> Result<Box<dyn Iterator<
                                     Item = Result<serde_json::Value>> + 'a>>
    {
        let first = format!("{}/certificates?api-version={}",
                            vault_url, API_VERSION);
        Ok(Box::new(CertificatePager {
            client: self,
            deadline: Instant::now() + timeout,
            items: VecDeque::new(),
            next_link: Some(first),
        }))
    }
}

/// Lazily walks the paged certificate list, following `nextLink`.
///
/// One deadline covers the whole walk: each page fetch gets whatever
/// remains of it, and an exhausted deadline fails the iteration.
struct CertificatePager<'c> {
    client: &'c KeyVaultClient,
    deadline: Instant,
    items: VecDeque<serde_json::Value>,
    next_link: Option<String>,
}

impl Iterator for CertificatePager<'_> {
    type Item = Result<serde_json::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.items.pop_front() {
                return Some(Ok(item));
            }
            let url = self.next_link.take()?;
            let remaining =
                self.deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Some(Err(Error::remote(
                    "list certificates",
                    "deadline exceeded while paging the certificate list",
                )));
            }
            match self.client.fetch_page(&url, remaining) {
                Ok(page) => {
                    self.items = page.value.into();
                    self.next_link =
                        page.next_link.filter(|l| !l.is_empty());
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
