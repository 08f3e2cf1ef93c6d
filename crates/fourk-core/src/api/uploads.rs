//! File sending to partner systems and the parts-data helpers around it.

use std::fmt;
use std::str::FromStr;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use super::{decode_json, parse_detail, ApiClient, ApiError, ApiResult};
use crate::auth::{Session, SessionPersistence};
use crate::models::WireScalar;

/// Partner endpoint a file is sent to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SendTarget {
    JohnDeerePmm,
    JohnDeerePartsData,
    JohnDeereElips,
    /// Seedz accepts several file types under `/seedz/{file_type}`
    Seedz(String),
}

impl SendTarget {
    #[must_use]
    pub fn endpoint(&self) -> String {
        match self {
            Self::JohnDeerePmm => "/rpm/pmm/send-to-johndeere".to_string(),
            Self::JohnDeerePartsData => "/rpm/partsdata/send-to-johndeere".to_string(),
            Self::JohnDeereElips => "/elips/send-to-johndeere".to_string(),
            Self::Seedz(file_type) => format!("/seedz/{}", urlencoding::encode(file_type)),
        }
    }

    #[must_use]
    pub const fn partner(&self) -> &'static str {
        match self {
            Self::Seedz(_) => "Seedz",
            _ => "John Deere",
        }
    }

    /// `file_type` recorded in `/rpm/logs`.
    #[must_use]
    pub fn file_type(&self) -> &str {
        match self {
            Self::JohnDeerePmm => "pmm",
            Self::JohnDeerePartsData => "partsdata",
            Self::JohnDeereElips => "elips",
            Self::Seedz(file_type) => file_type,
        }
    }

    fn failure_message(&self) -> String {
        format!("Failed to send file to {}", self.partner())
    }
}

impl fmt::Display for SendTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seedz(file_type) => write!(f, "seedz:{file_type}"),
            other => f.write_str(other.file_type()),
        }
    }
}

impl FromStr for SendTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pmm" => Ok(Self::JohnDeerePmm),
            "partsdata" | "parts-data" => Ok(Self::JohnDeerePartsData),
            "elips" => Ok(Self::JohnDeereElips),
            other => match other.strip_prefix("seedz:").map(str::trim) {
                Some(file_type) if !file_type.is_empty() => Ok(Self::Seedz(file_type.to_string())),
                _ => Err(format!(
                    "unknown send target '{other}' (expected pmm, partsdata, elips or seedz:<type>)"
                )),
            },
        }
    }
}

/// A file ready to be posted as multipart `file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content: Vec<u8>,
    pub target_client_id: Option<String>,
}

impl FileUpload {
    fn form(&self) -> ApiResult<Form> {
        let mime = mime_guess::from_path(&self.file_name).first_or_octet_stream();
        let part = Part::bytes(self.content.clone())
            .file_name(self.file_name.clone())
            .mime_str(mime.essence_str())?;

        let form = Form::new().part("file", part);
        Ok(match &self.target_client_id {
            Some(client_id) => form.text("target_client_id", client_id.clone()),
            None => form,
        })
    }
}

/// Body of `POST /rpm/logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendLog {
    pub file_type: String,
    pub filename: String,
    pub client_id: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `processed` endpoints answer with a bare array or a keyed object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProcessedIds {
    List(Vec<WireScalar>),
    Orders { order_ids: Vec<WireScalar> },
    Transfers { transfer_ids: Vec<WireScalar> },
}

impl ProcessedIds {
    fn into_ids(self) -> Vec<WireScalar> {
        match self {
            Self::List(ids)
            | Self::Orders { order_ids: ids }
            | Self::Transfers {
                transfer_ids: ids,
            } => ids,
        }
    }
}

impl ApiClient {
    /// Post `upload` to `target`. Failures carry the backend's `detail`.
    pub async fn send_file<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        target: &SendTarget,
        upload: &FileUpload,
    ) -> ApiResult<serde_json::Value> {
        let url = self.url(&target.endpoint());
        let response = self
            .send_authorized_unchecked(session, |client| {
                Ok(client.post(&url).multipart(upload.form()?))
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_detail(&body).unwrap_or_else(|| target.failure_message());
            tracing::warn!(
                "Sending {} to {} failed ({}): {}",
                upload.file_name,
                target.partner(),
                status.as_u16(),
                message
            );
            return Err(ApiError::Api(message));
        }

        tracing::info!("Sent {} to {}", upload.file_name, target.partner());
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// `GET /rpm/orders/processed`
    pub async fn processed_order_ids<S: SessionPersistence>(
        &self,
        session: &Session<S>,
    ) -> ApiResult<Vec<WireScalar>> {
        self.processed_ids(session, "/rpm/orders/processed").await
    }

    /// `GET /rpm/transfers/processed`
    pub async fn processed_transfer_ids<S: SessionPersistence>(
        &self,
        session: &Session<S>,
    ) -> ApiResult<Vec<WireScalar>> {
        self.processed_ids(session, "/rpm/transfers/processed").await
    }

    async fn processed_ids<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        path: &str,
    ) -> ApiResult<Vec<WireScalar>> {
        let url = self.url(path);
        let response = self
            .send_authorized(session, |client| Ok(client.get(&url)))
            .await?;
        Ok(decode_json::<ProcessedIds>(response).await?.into_ids())
    }

    /// `PUT /rpm/orders/mark-sent`
    pub async fn mark_orders_sent<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        order_ids: &[WireScalar],
    ) -> ApiResult<()> {
        let url = self.url("/rpm/orders/mark-sent");
        let payload = serde_json::json!({ "order_ids": order_ids });
        self.send_authorized(session, |client| Ok(client.put(&url).json(&payload)))
            .await?;
        Ok(())
    }

    /// `PUT /rpm/transfers/mark-sent`
    pub async fn mark_transfers_sent<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        transfer_ids: &[WireScalar],
    ) -> ApiResult<()> {
        let url = self.url("/rpm/transfers/mark-sent");
        let payload = serde_json::json!({ "transfer_ids": transfer_ids });
        self.send_authorized(session, |client| Ok(client.put(&url).json(&payload)))
            .await?;
        Ok(())
    }

    /// `POST /rpm/logs`. Failures are logged and otherwise ignored.
    pub async fn record_send_log<S: SessionPersistence>(&self, session: &Session<S>, log: &SendLog) {
        let url = self.url("/rpm/logs");
        if let Err(error) = self
            .send_authorized(session, |client| Ok(client.post(&url).json(log)))
            .await
        {
            tracing::warn!("Failed to record send log for {}: {}", log.filename, error);
        }
    }
}

/// Prefix parts-data content with the processed order and transfer ids.
#[must_use]
pub fn prepend_parts_data_ids(
    content: &str,
    order_ids: &[WireScalar],
    transfer_ids: &[WireScalar],
) -> String {
    format!(
        "ORDER\t{}\tTRNSFR\t{}\n{content}",
        join_ids(order_ids),
        join_ids(transfer_ids)
    )
}

fn join_ids(ids: &[WireScalar]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::test_server::ScriptedServer;
    use crate::auth::{AuthTokens, MemorySessionStore};

    fn session() -> Session<MemorySessionStore> {
        let session = Session::new(MemorySessionStore::default());
        session.set_tokens(AuthTokens::new("a", "r")).unwrap();
        session
    }

    fn upload() -> FileUpload {
        FileUpload {
            file_name: "PARTS_20250320.txt".to_string(),
            content: b"line one\nline two\n".to_vec(),
            target_client_id: Some("4".to_string()),
        }
    }

    #[test]
    fn targets_parse_and_map_to_endpoints() {
        let cases = [
            ("pmm", "/rpm/pmm/send-to-johndeere", "John Deere"),
            ("PartsData", "/rpm/partsdata/send-to-johndeere", "John Deere"),
            ("elips", "/elips/send-to-johndeere", "John Deere"),
            ("seedz:invoices", "/seedz/invoices", "Seedz"),
        ];
        for (raw, endpoint, partner) in cases {
            let target = raw.parse::<SendTarget>().unwrap();
            assert_eq!(target.endpoint(), endpoint);
            assert_eq!(target.partner(), partner);
        }
        assert!("seedz:".parse::<SendTarget>().is_err());
        assert!("ftp".parse::<SendTarget>().is_err());
        assert_eq!(
            "seedz:orders".parse::<SendTarget>().unwrap().to_string(),
            "seedz:orders"
        );
    }

    #[test]
    fn parts_data_ids_are_prepended_as_a_tab_separated_line() {
        let orders = [
            WireScalar::Number(serde_json::Number::from(101)),
            WireScalar::Text("102".to_string()),
        ];
        let transfers = [WireScalar::Number(serde_json::Number::from(7))];
        assert_eq!(
            prepend_parts_data_ids("BODY", &orders, &transfers),
            "ORDER\t101,102\tTRNSFR\t7\nBODY"
        );
        assert_eq!(prepend_parts_data_ids("BODY", &[], &[]), "ORDER\t\tTRNSFR\t\nBODY");
    }

    #[tokio::test]
    async fn send_file_posts_multipart_with_target_client() {
        let server = ScriptedServer::start(&[(
            "POST /rpm/partsdata/send-to-johndeere",
            200,
            r#"{"status":"queued"}"#,
        )])
        .await;
        let client = ApiClient::new(server.base_url()).unwrap();

        let body = client
            .send_file(&session(), &SendTarget::JohnDeerePartsData, &upload())
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({"status": "queued"}));

        let request = &server.requests()[0];
        assert!(request
            .content_type
            .as_deref()
            .is_some_and(|value| value.starts_with("multipart/form-data")));
        assert!(request.body.contains(r#"name="file"; filename="PARTS_20250320.txt""#));
        assert!(request.body.contains("text/plain"));
        assert!(request.body.contains(r#"name="target_client_id""#));
        assert!(request.body.contains("line two"));
    }

    #[tokio::test]
    async fn send_failure_surfaces_detail_or_partner_fallback() {
        let server = ScriptedServer::start(&[
            ("POST /elips/send-to-johndeere", 422, r#"{"detail":"Dealer not enrolled"}"#),
            ("POST /seedz/orders", 502, ""),
        ])
        .await;
        let client = ApiClient::new(server.base_url()).unwrap();
        let session = session();

        let error = client
            .send_file(&session, &SendTarget::JohnDeereElips, &upload())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Dealer not enrolled");

        let error = client
            .send_file(&session, &SendTarget::Seedz("orders".to_string()), &upload())
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Failed to send file to Seedz");
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn processed_ids_accept_array_and_object_bodies() {
        let server = ScriptedServer::start(&[
            ("GET /rpm/orders/processed", 200, "[1, 2]"),
            ("GET /rpm/transfers/processed", 200, r#"{"transfer_ids": ["T9"]}"#),
            ("PUT /rpm/orders/mark-sent", 200, "{}"),
        ])
        .await;
        let client = ApiClient::new(server.base_url()).unwrap();
        let session = session();

        let orders = client.processed_order_ids(&session).await.unwrap();
        let transfers = client.processed_transfer_ids(&session).await.unwrap();
        assert_eq!(join_ids(&orders), "1,2");
        assert_eq!(join_ids(&transfers), "T9");

        client.mark_orders_sent(&session, &orders).await.unwrap();
        let mark = &server.requests_to("PUT", "/rpm/orders/mark-sent")[0];
        let body: serde_json::Value = serde_json::from_str(&mark.body).unwrap();
        assert_eq!(body, serde_json::json!({"order_ids": [1, 2]}));
    }

    #[tokio::test]
    async fn send_log_failures_are_swallowed() {
        let server = ScriptedServer::start(&[("POST /rpm/logs", 500, "{}")]).await;
        let client = ApiClient::new(server.base_url()).unwrap();
        let log = SendLog {
            file_type: "elips".to_string(),
            filename: "E.DAT".to_string(),
            client_id: Some("4".to_string()),
            success: false,
            message: None,
            error: Some("Dealer not enrolled".to_string()),
        };

        client.record_send_log(&session(), &log).await;
        let recorded = &server.requests_to("POST", "/rpm/logs")[0];
        let body: serde_json::Value = serde_json::from_str(&recorded.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "file_type": "elips",
                "filename": "E.DAT",
                "client_id": "4",
                "success": false,
                "error": "Dealer not enrolled"
            })
        );
    }
}
