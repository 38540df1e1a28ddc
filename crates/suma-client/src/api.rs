//! # Remote API
//!
//! Typed methods over any [`Transport`].

use crate::error::Error;
use crate::transport::Transport;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use suma_core::{SystemId, SystemRecord};

// =============================================================================
// SESSION
// =============================================================================

/// An authenticated session.
///
/// Obtained from [`RemoteApiClient::login`], handed back to
/// [`RemoteApiClient::logout`]. The token is never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("token", &"<redacted>").finish()
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Advisory type of security errata.
pub const SECURITY_ADVISORY: &str = "Security Advisory";

/// Typed access to the management server's remote API.
#[derive(Debug, Clone)]
pub struct RemoteApiClient<T> {
    transport: T,
}

impl<T: Transport> RemoteApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `auth.login`: open a session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the server answers with anything other
    /// than a non-empty token string.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, Error> {
        let value = self
            .transport
            .call("auth.login", vec![username.into(), password.into()])
            .await?;

        match value {
            Value::String(token) if !token.is_empty() => Ok(Session::new(token)),
            other => Err(Error::Protocol(format!(
                "auth.login returned {} instead of a session token",
                describe(&other)
            ))),
        }
    }

    /// `auth.logout`: close the session. The session is consumed either way.
    pub async fn logout(&self, session: Session) -> Result<(), Error> {
        self.transport
            .call("auth.logout", vec![Value::String(session.token)])
            .await?;
        Ok(())
    }

    /// `system.listSystems`: every system visible to the session's user.
    pub async fn list_systems(&self, session: &Session) -> Result<Vec<SystemRecord>, Error> {
        self.call_list(session, "system.listSystems", Vec::new()).await
    }

    /// `system.getRelevantErrataByType`: errata of one advisory type that apply to a system.
    ///
    /// Only the number of records matters to the report, so the records are
    /// returned undecoded.
    pub async fn relevant_errata(
        &self,
        session: &Session,
        system: SystemId,
        advisory_type: &str,
    ) -> Result<Vec<Value>, Error> {
        self.call_array(
            session,
            "system.getRelevantErrataByType",
            vec![system.0.into(), advisory_type.into()],
        )
        .await
    }

    /// `system.listPackages`: packages installed on a system, undecoded.
    pub async fn list_packages(
        &self,
        session: &Session,
        system: SystemId,
    ) -> Result<Vec<Value>, Error> {
        self.call_array(session, "system.listPackages", vec![system.0.into()])
            .await
    }

    async fn call_list<R: DeserializeOwned>(
        &self,
        session: &Session,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Vec<R>, Error> {
        self.call_array(session, method, params)
            .await?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(Error::from))
            .collect()
    }

    async fn call_array(
        &self,
        session: &Session,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Value>, Error> {
        let mut all = Vec::with_capacity(params.len() + 1);
        all.push(Value::String(session.token.clone()));
        all.extend(params);

        match self.transport.call(method, all).await? {
            Value::Array(items) => Ok(items),
            other => Err(Error::Protocol(format!(
                "{} returned {} instead of a list",
                method,
                describe(&other)
            ))),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a struct",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned value and records what was sent.
    struct Canned {
        reply: Value,
        sent: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl Canned {
        fn new(reply: Value) -> Self {
            Self {
                reply,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn call(
            &self,
            method: &str,
            params: Vec<Value>,
        ) -> impl std::future::Future<Output = Result<Value, Error>> + Send {
            self.sent.lock().unwrap().push((method.to_string(), params));
            std::future::ready(Ok(self.reply.clone()))
        }
    }

    #[tokio::test]
    async fn login_returns_session() {
        let api = RemoteApiClient::new(Canned::new(json!("tok-1")));
        let session = api.login("admin", "pw").await.unwrap();
        assert_eq!(session.token(), "tok-1");

        let sent = api.transport().sent.lock().unwrap();
        assert_eq!(sent[0].0, "auth.login");
        assert_eq!(sent[0].1, vec![json!("admin"), json!("pw")]);
    }

    #[tokio::test]
    async fn login_rejects_empty_token() {
        let api = RemoteApiClient::new(Canned::new(json!("")));
        assert!(matches!(api.login("a", "b").await, Err(Error::Protocol(_))));
    }

    #[tokio::test]
    async fn login_rejects_non_string() {
        let api = RemoteApiClient::new(Canned::new(Value::Null));
        match api.login("a", "b").await {
            Err(Error::Protocol(msg)) => assert!(msg.contains("nil")),
            other => panic!("Expected Protocol error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn token_is_first_parameter() {
        let api = RemoteApiClient::new(Canned::new(json!([])));
        let session = Session::new("tok-9");
        api.relevant_errata(&session, SystemId(12), SECURITY_ADVISORY)
            .await
            .unwrap();

        let sent = api.transport().sent.lock().unwrap();
        assert_eq!(sent[0].0, "system.getRelevantErrataByType");
        assert_eq!(
            sent[0].1,
            vec![json!("tok-9"), json!(12), json!("Security Advisory")]
        );
    }

    #[tokio::test]
    async fn list_systems_decodes_records() {
        let api = RemoteApiClient::new(Canned::new(json!([
            {"id": 1, "name": "h1", "last_checkin": "20240101T00:00:00"},
            {"id": 2, "name": "h2"}
        ])));
        let systems = api.list_systems(&Session::new("t")).await.unwrap();
        assert_eq!(systems, vec![SystemRecord::new(1, "h1"), SystemRecord::new(2, "h2")]);
    }

    #[tokio::test]
    async fn list_rejects_non_list() {
        let api = RemoteApiClient::new(Canned::new(json!(1)));
        match api.list_packages(&Session::new("t"), SystemId(1)).await {
            Err(Error::Protocol(msg)) => assert!(msg.starts_with("system.listPackages")),
            other => panic!("Expected Protocol error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn list_rejects_malformed_record() {
        let api = RemoteApiClient::new(Canned::new(json!([{"name": "no-id"}])));
        assert!(matches!(
            api.list_systems(&Session::new("t")).await,
            Err(Error::Json(_))
        ));
    }

    #[tokio::test]
    async fn package_records_are_counted_not_decoded() {
        let api = RemoteApiClient::new(Canned::new(json!([
            {"name": "bash", "version": "5.2", "arch": "x86_64", "arch_label": "x86_64", "epoch": " "},
            {"name": "zypper", "arch": 64},
            "not even a struct"
        ])));
        let packages = api.list_packages(&Session::new("t"), SystemId(1)).await.unwrap();
        assert_eq!(packages.len(), 3);
    }

    #[tokio::test]
    async fn errata_with_string_id_are_counted() {
        let api = RemoteApiClient::new(Canned::new(json!([
            {"id": "1234", "advisory_name": "SUSE-2024-1"},
            {"id": 1235, "advisory_name": "SUSE-2024-2"}
        ])));
        let errata = api
            .relevant_errata(&Session::new("t"), SystemId(1), SECURITY_ADVISORY)
            .await
            .unwrap();
        assert_eq!(errata.len(), 2);
    }

    #[tokio::test]
    async fn logout_sends_token() {
        let api = RemoteApiClient::new(Canned::new(json!(1)));
        api.logout(Session::new("tok-3")).await.unwrap();
        let sent = api.transport().sent.lock().unwrap();
        assert_eq!(sent[0], ("auth.logout".to_string(), vec![json!("tok-3")]));
    }

    #[test]
    fn session_debug_hides_token() {
        let debug = format!("{:?}", Session::new("super-secret"));
        assert!(!debug.contains("super-secret"));
    }
}
