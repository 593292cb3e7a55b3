pub mod full_node;

use crate::tls::{load_certs, load_private_key, NoCertificateVerification};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use rustls::ClientConfig;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::{Error, ErrorKind};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[must_use]
pub fn get_url(host: &str, port: u16, request_uri: &str) -> String {
    format!("https://{host}:{port}/{request_uri}")
}

/// Builds an HTTPS client. With `ssl_path` the client authenticates with the full node's
/// private certificate found under `{ssl_path}/full_node/`.
pub fn get_client(ssl_path: Option<&str>) -> Result<Client, Error> {
    if let Some(ssl_path) = ssl_path {
        let ssl_dir = Path::new(ssl_path).join("full_node");
        let certs = load_certs(&ssl_dir.join("private_full_node.crt"))?;
        let key = load_private_key(&ssl_dir.join("private_full_node.key"))?;
        let config = ClientConfig::builder()
            .with_safe_defaults()
            .with_custom_certificate_verifier(Arc::new(NoCertificateVerification {}))
            .with_client_auth_cert(certs, key)
            .map_err(|e| Error::new(ErrorKind::Other, format!("{e:?}")))?;
        ClientBuilder::new()
            .use_preconfigured_tls(config)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::new(ErrorKind::Other, format!("{e:?}")))
    } else {
        ClientBuilder::new()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::new(ErrorKind::Other, format!("{e:?}")))
    }
}

pub fn build_headers(additional_headers: &Option<HashMap<String, String>>) -> Result<HeaderMap, Error> {
    let mut header_map = HeaderMap::new();
    if let Some(m) = additional_headers {
        for (k, v) in m {
            header_map.insert(
                HeaderName::from_str(k).map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to Parse Header Name {k},\r\n {e}"),
                    )
                })?,
                HeaderValue::from_str(v).map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to Parse Header value {v},\r\n {e}"),
                    )
                })?,
            );
        }
    }
    Ok(header_map)
}

pub async fn post<T>(
    client: &Client,
    url: &str,
    data: &Map<String, Value>,
    additional_headers: &Option<HashMap<String, String>>,
) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let header_map = build_headers(additional_headers)?;
    match client.post(url).headers(header_map).json(data).send().await {
        Ok(resp) => match resp.status() {
            reqwest::StatusCode::OK => {
                let body = resp
                    .text()
                    .await
                    .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
                serde_json::from_str(body.as_str()).map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to Parse Json {body},\r\n {e}"),
                    )
                })
            }
            _ => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Bad Status Code: {:?}, for URL {url:?}", resp.status()),
            )),
        },
        Err(err) => Err(Error::new(ErrorKind::InvalidData, format!("{err:?}"))),
    }
}
