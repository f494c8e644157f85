//! LuCI JSON-RPC backend.
//!
//! Talks to the `luci-mod-rpc` endpoints of an OpenWrt device:
//!
//! - `POST {endpoint}/cgi-bin/luci/rpc/auth` with method `login` returns a
//!   session token
//! - `POST {endpoint}/cgi-bin/luci/rpc/uci?auth=TOKEN` exposes the UCI
//!   cursor (`add`, `get_all`, `tset`, `delete`, `commit`)
//!
//! Named sections are looked up with `get_all` before a write or a delete,
//! so a name owned by a section of another type is reported as not found.
//!
//! Every mutating call is followed by `commit` on the same config so that
//! one [`Backend`] call is one visible change on the device.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{Credentials, OptionValue, Options, SectionId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const AUTH_PATH: &str = "/cgi-bin/luci/rpc/auth";
const UCI_PATH: &str = "/cgi-bin/luci/rpc/uci";

/// Default timeout for a single HTTP exchange.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Value,
}

/// Backend for a device running `luci-mod-rpc`.
///
/// # Example
///
/// ```no_run
/// use lucirpc::backend::Backend;
/// use lucirpc::backend::http::HttpBackend;
/// use lucirpc::{Credentials, SectionId};
///
/// let backend = HttpBackend::new("http://192.168.1.1", Credentials::new("root", "secret"));
/// let lan = backend.get("firewall", "zone", &SectionId::Named("lan".into())).unwrap();
/// println!("{lan:?}");
/// ```
pub struct HttpBackend {
    agent: ureq::Agent,
    endpoint: String,
    credentials: Credentials,
    token: Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl HttpBackend {
    /// Create a backend with the default request timeout.
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_timeout(endpoint, credentials, DEFAULT_TIMEOUT)
    }

    /// Create a backend with a custom per-request timeout.
    pub fn with_timeout(
        endpoint: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            credentials,
            token: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Get the endpoint this backend talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn post(&self, url: &str, auth: Option<&str>, method: &str, params: Value) -> Result<Value> {
        let request = RpcRequest {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let mut builder = self.agent.post(url);
        if let Some(token) = auth {
            builder = builder.query("auth", token);
        }

        let response: RpcResponse = builder.send_json(&request)?.body_mut().read_json()?;

        if !response.error.is_null() {
            let message = match &response.error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(Error::Rpc { message });
        }
        Ok(response.result)
    }

    fn login(&self) -> Result<String> {
        log::debug!(
            "logging in to {} as {}",
            self.endpoint,
            self.credentials.username
        );
        let url = format!("{}{}", self.endpoint, AUTH_PATH);
        let result = self.post(
            &url,
            None,
            "login",
            json!([self.credentials.username, self.credentials.password]),
        )?;

        match result {
            Value::String(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::Auth {
                message: "login returned no session token".to_string(),
            }),
        }
    }

    fn session(&self, refresh: bool) -> Result<String> {
        let mut guard = self
            .token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if refresh {
            *guard = None;
        }
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }
        let token = self.login()?;
        *guard = Some(token.clone());
        Ok(token)
    }

    /// Call a method of the UCI RPC module, logging in first if needed.
    ///
    /// A rejected session is refreshed once before giving up.
    fn uci(&self, method: &str, params: Value) -> Result<Value> {
        log::debug!("uci {method} {params}");
        let url = format!("{}{}", self.endpoint, UCI_PATH);

        let token = self.session(false)?;
        match self.post(&url, Some(&token), method, params.clone()) {
            Err(Error::Http {
                status: 401 | 403, ..
            }) => {
                log::debug!("session rejected, logging in again");
                let token = self.session(true)?;
                self.post(&url, Some(&token), method, params)
            }
            other => other,
        }
    }

    fn commit(&self, config: &str) -> Result<()> {
        match self.uci("commit", json!([config]))? {
            Value::Bool(true) => Ok(()),
            other => Err(Error::InvalidResponse(format!(
                "commit of {config} returned {other}"
            ))),
        }
    }

    /// Position of the section called `name` among sections of its type.
    fn ordinal_of(&self, config: &str, section_type: &str, name: &str) -> Result<usize> {
        let all = self.uci("get_all", json!([config]))?;
        let sections = all.as_object().ok_or_else(|| {
            Error::InvalidResponse(format!("get_all {config} did not return an object"))
        })?;

        let mut of_type: Vec<(u64, &str)> = sections
            .iter()
            .filter(|(_, section)| section.get(".type").and_then(Value::as_str) == Some(section_type))
            .map(|(section_name, section)| {
                let index = section.get(".index").and_then(Value::as_u64).unwrap_or(u64::MAX);
                (index, section_name.as_str())
            })
            .collect();
        of_type.sort_unstable();

        of_type
            .iter()
            .position(|(_, section_name)| *section_name == name)
            .ok_or_else(|| {
                Error::InvalidResponse(format!(
                    "added section {name} is missing from {config}"
                ))
            })
    }

    /// Make sure a named section exists with the expected type.
    ///
    /// UCI addresses named sections by name alone. Ordinal selectors carry
    /// the type already.
    fn ensure_type(&self, config: &str, section_type: &str, section: &SectionId) -> Result<()> {
        match section {
            SectionId::Named(_) => self.get(config, section_type, section).map(drop),
            SectionId::Ordinal(_) => Ok(()),
        }
    }
}

impl Backend for HttpBackend {
    fn add(&self, config: &str, section_type: &str) -> Result<usize> {
        let name = match self.uci("add", json!([config, section_type]))? {
            Value::String(name) => name,
            other => {
                return Err(Error::InvalidResponse(format!(
                    "add {config} {section_type} returned {other}"
                )));
            }
        };
        self.commit(config)?;
        self.ordinal_of(config, section_type, &name)
    }

    fn get(&self, config: &str, section_type: &str, section: &SectionId) -> Result<Options> {
        let selector = section.selector(section_type);
        match self.uci("get_all", json!([config, selector]))? {
            Value::Object(object) => {
                let actual_type = object.get(".type").and_then(Value::as_str);
                if actual_type.is_some_and(|t| t != section_type) {
                    return Err(Error::not_found(config, selector));
                }
                options_from_object(object)
            }
            Value::Null | Value::Bool(false) => Err(Error::not_found(config, selector)),
            other => Err(Error::InvalidResponse(format!(
                "get_all {config} {selector} returned {other}"
            ))),
        }
    }

    fn set(
        &self,
        config: &str,
        section_type: &str,
        section: &SectionId,
        options: &Options,
        unset: &[String],
    ) -> Result<()> {
        self.ensure_type(config, section_type, section)?;
        let selector = section.selector(section_type);
        match self.uci("tset", json!([config, selector, options]))? {
            Value::Bool(true) => {}
            Value::Null | Value::Bool(false) => return Err(Error::not_found(config, selector)),
            other => {
                return Err(Error::InvalidResponse(format!(
                    "tset {config} {selector} returned {other}"
                )));
            }
        }

        // `false` only means the option was not set in the first place.
        for option in unset {
            match self.uci("delete", json!([config, selector, option]))? {
                Value::Bool(_) | Value::Null => {}
                other => {
                    return Err(Error::InvalidResponse(format!(
                        "delete {config} {selector} {option} returned {other}"
                    )));
                }
            }
        }
        self.commit(config)
    }

    fn delete(&self, config: &str, section_type: &str, section: &SectionId) -> Result<()> {
        self.ensure_type(config, section_type, section)?;
        let selector = section.selector(section_type);
        match self.uci("delete", json!([config, selector]))? {
            Value::Bool(true) => self.commit(config),
            Value::Null | Value::Bool(false) => Err(Error::not_found(config, selector)),
            other => Err(Error::InvalidResponse(format!(
                "delete {config} {selector} returned {other}"
            ))),
        }
    }
}

/// Convert a `get_all` section object into an option bag.
///
/// Metadata keys (`.name`, `.type`, `.anonymous`, `.index`) are dropped.
fn options_from_object(object: Map<String, Value>) -> Result<Options> {
    let mut options = Options::new();
    for (key, value) in object {
        if key.starts_with('.') {
            continue;
        }
        let option = match value {
            Value::String(s) => OptionValue::String(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => OptionValue::Integer(i),
                None => OptionValue::String(n.to_string()),
            },
            Value::Bool(b) => OptionValue::String(if b { "1" } else { "0" }.to_string()),
            Value::Array(items) => OptionValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            other => {
                return Err(Error::InvalidResponse(format!(
                    "option {key} has unsupported value {other}"
                )));
            }
        };
        options.insert(key, option);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn rpc_body(result: Value) -> String {
        json!({ "id": 1, "result": result, "error": null }).to_string()
    }

    fn backend(server: &Server) -> HttpBackend {
        HttpBackend::new(server.url(), Credentials::new("root", "secret"))
    }

    fn mock_login(server: &mut Server) -> mockito::Mock {
        server
            .mock("POST", AUTH_PATH)
            .match_body(Matcher::PartialJson(json!({ "method": "login" })))
            .with_body(rpc_body(json!("token123")))
            .create()
    }

    fn mock_uci(server: &mut Server, method: &str, result: Value) -> mockito::Mock {
        server
            .mock("POST", UCI_PATH)
            .match_query(Matcher::UrlEncoded("auth".into(), "token123".into()))
            .match_body(Matcher::PartialJson(json!({ "method": method })))
            .with_body(rpc_body(result))
            .create()
    }

    fn mock_uci_unused(server: &mut Server, method: &str) -> mockito::Mock {
        server
            .mock("POST", UCI_PATH)
            .match_body(Matcher::PartialJson(json!({ "method": method })))
            .with_body(rpc_body(json!(true)))
            .expect(0)
            .create()
    }

    #[test]
    fn test_get_strips_metadata_and_converts_values() {
        let mut server = Server::new();
        let login = mock_login(&mut server);
        let get = mock_uci(
            &mut server,
            "get_all",
            json!({
                ".name": "lan",
                ".type": "zone",
                ".anonymous": false,
                ".index": 1,
                "name": "lan",
                "mtu": 1500,
                "network": ["lan", "guest"]
            }),
        );

        let options = backend(&server)
            .get("firewall", "zone", &SectionId::Named("lan".into()))
            .unwrap();

        login.assert();
        get.assert();
        assert_eq!(options.len(), 3);
        assert_eq!(options["name"], OptionValue::from("lan"));
        assert_eq!(options["mtu"], OptionValue::Integer(1500));
        assert_eq!(
            options["network"],
            OptionValue::List(vec!["lan".into(), "guest".into()])
        );
    }

    #[test]
    fn test_get_missing_section_is_not_found() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "get_all", Value::Null);

        let err = backend(&server)
            .get("firewall", "zone", &SectionId::Ordinal(4))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "section not found: firewall.@zone[4]");
    }

    #[test]
    fn test_get_section_of_other_type_is_not_found() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(
            &mut server,
            "get_all",
            json!({ ".type": "rule", "name": "Allow-Ping" }),
        );

        let err = backend(&server)
            .get("firewall", "zone", &SectionId::Named("cfg0a92bd".into()))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_set_commits_config() {
        let mut server = Server::new();
        mock_login(&mut server);
        let tset = server
            .mock("POST", UCI_PATH)
            .match_query(Matcher::UrlEncoded("auth".into(), "token123".into()))
            .match_body(Matcher::PartialJson(json!({
                "method": "tset",
                "params": ["firewall", "@zone[0]", { "input": "ACCEPT" }]
            })))
            .with_body(rpc_body(json!(true)))
            .create();
        let commit = mock_uci(&mut server, "commit", json!(true));

        let mut options = Options::new();
        options.insert("input".into(), "ACCEPT".into());
        backend(&server)
            .set("firewall", "zone", &SectionId::Ordinal(0), &options, &[])
            .unwrap();

        tset.assert();
        commit.assert();
    }

    #[test]
    fn test_set_deletes_unset_options_before_commit() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "tset", json!(true));
        let unset = server
            .mock("POST", UCI_PATH)
            .match_query(Matcher::UrlEncoded("auth".into(), "token123".into()))
            .match_body(Matcher::PartialJson(json!({
                "method": "delete",
                "params": ["firewall", "@zone[0]", "network"]
            })))
            .with_body(rpc_body(json!(true)))
            .expect(1)
            .create();
        let commit = mock_uci(&mut server, "commit", json!(true));

        backend(&server)
            .set(
                "firewall",
                "zone",
                &SectionId::Ordinal(0),
                &Options::new(),
                &["network".to_string()],
            )
            .unwrap();

        unset.assert();
        commit.assert();
    }

    #[test]
    fn test_named_set_checks_type_first() {
        let mut server = Server::new();
        mock_login(&mut server);
        let lookup = mock_uci(&mut server, "get_all", json!({ ".type": "zone", "name": "lan" }));
        let tset = mock_uci(&mut server, "tset", json!(true));
        mock_uci(&mut server, "commit", json!(true));

        let mut options = Options::new();
        options.insert("input".into(), "ACCEPT".into());
        backend(&server)
            .set("firewall", "zone", &SectionId::Named("lan".into()), &options, &[])
            .unwrap();

        lookup.assert();
        tset.assert();
    }

    #[test]
    fn test_named_set_of_other_type_writes_nothing() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "get_all", json!({ ".type": "zone", "name": "lan" }));
        let tset = mock_uci_unused(&mut server, "tset");

        let err = backend(&server)
            .set("firewall", "rule", &SectionId::Named("lan".into()), &Options::new(), &[])
            .unwrap_err();

        assert!(err.is_not_found());
        tset.assert();
    }

    #[test]
    fn test_named_delete_of_other_type_deletes_nothing() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "get_all", json!({ ".type": "zone", "name": "lan" }));
        let delete = mock_uci_unused(&mut server, "delete");

        let err = backend(&server)
            .delete("firewall", "rule", &SectionId::Named("lan".into()))
            .unwrap_err();

        assert!(err.is_not_found());
        delete.assert();
    }

    #[test]
    fn test_named_delete_of_matching_type() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "get_all", json!({ ".type": "rule", "name": "Allow-SSH" }));
        let delete = mock_uci(&mut server, "delete", json!(true));
        let commit = mock_uci(&mut server, "commit", json!(true));

        backend(&server)
            .delete("firewall", "rule", &SectionId::Named("ssh".into()))
            .unwrap();

        delete.assert();
        commit.assert();
    }

    #[test]
    fn test_add_resolves_ordinal() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "add", json!("cfg0c92bd"));
        mock_uci(&mut server, "commit", json!(true));
        server
            .mock("POST", UCI_PATH)
            .match_query(Matcher::UrlEncoded("auth".into(), "token123".into()))
            .match_body(Matcher::PartialJson(json!({
                "method": "get_all",
                "params": ["firewall"]
            })))
            .with_body(rpc_body(json!({
                "defaults": { ".type": "defaults", ".index": 0 },
                "lan": { ".type": "zone", ".index": 1 },
                "wan": { ".type": "zone", ".index": 2 },
                "cfg0b92bd": { ".type": "rule", ".index": 3 },
                "cfg0c92bd": { ".type": "zone", ".index": 4 }
            })))
            .create();

        let ordinal = backend(&server).add("firewall", "zone").unwrap();
        assert_eq!(ordinal, 2);
    }

    #[test]
    fn test_delete_false_is_not_found() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "delete", json!(false));

        let err = backend(&server)
            .delete("firewall", "zone", &SectionId::Ordinal(3))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_named_delete_of_missing_section_is_not_found() {
        let mut server = Server::new();
        mock_login(&mut server);
        mock_uci(&mut server, "get_all", Value::Null);
        let delete = mock_uci_unused(&mut server, "delete");

        let err = backend(&server)
            .delete("firewall", "zone", &SectionId::Named("dmz".into()))
            .unwrap_err();
        assert!(err.is_not_found());
        delete.assert();
    }

    #[test]
    fn test_rpc_error_member() {
        let mut server = Server::new();
        mock_login(&mut server);
        server
            .mock("POST", UCI_PATH)
            .match_query(Matcher::Any)
            .with_body(json!({ "id": 1, "result": null, "error": "Method not found." }).to_string())
            .create();

        let err = backend(&server)
            .get("firewall", "zone", &SectionId::Named("lan".into()))
            .unwrap_err();
        assert!(matches!(err, Error::Rpc { ref message } if message == "Method not found."));
    }

    #[test]
    fn test_failed_login_is_auth_error() {
        let mut server = Server::new();
        server
            .mock("POST", AUTH_PATH)
            .with_body(rpc_body(Value::Null))
            .create();

        let err = backend(&server)
            .get("firewall", "zone", &SectionId::Named("lan".into()))
            .unwrap_err();
        assert!(matches!(err, Error::Auth { .. }));
    }

    #[test]
    fn test_server_error_is_retryable() {
        let mut server = Server::new();
        mock_login(&mut server);
        server.mock("POST", UCI_PATH).with_status(502).create();

        let err = backend(&server)
            .get("firewall", "zone", &SectionId::Named("lan".into()))
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_options_from_object_rejects_nested_objects() {
        let mut object = Map::new();
        object.insert("weird".into(), json!({ "nested": true }));
        assert!(matches!(
            options_from_object(object),
            Err(Error::InvalidResponse(_))
        ));
    }
}
