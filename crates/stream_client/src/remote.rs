//! RemoteStreamClient - newline-delimited JSON over TCP

use std::collections::HashMap;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tracing::{debug, instrument};

use contracts::{Batch, BatchResult, ProducerError, Record, StreamClient, THROTTLED_ERROR_CODE};

/// Configuration for RemoteStreamClient
#[derive(Debug, Clone)]
pub struct RemoteClientConfig {
    /// Stream service address
    pub addr: SocketAddr,
}

impl RemoteClientConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        Ok(Self { addr })
    }
}

/// Request envelope, one JSON object per line
#[derive(Serialize)]
struct WireRequest<'a> {
    stream: &'a str,
    records: &'a [Record],
}

/// Response envelope: either a batch result or an error object
#[derive(Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Error { error: WireError },
    Result(BatchResult),
}

#[derive(Deserialize)]
struct WireError {
    code: String,
    #[serde(default)]
    message: String,
}

impl WireError {
    fn into_producer_error(self, stream: &str) -> ProducerError {
        match self.code.as_str() {
            THROTTLED_ERROR_CODE => ProducerError::throughput_exceeded(stream),
            "stream_not_found" => ProducerError::StreamNotFound {
                stream: stream.to_string(),
            },
            "access_denied" => ProducerError::AccessDenied {
                message: self.message,
            },
            code => ProducerError::Other(format!("{code}: {}", self.message)),
        }
    }
}

/// Client that submits batches to a remote stream service over TCP
pub struct RemoteStreamClient {
    name: String,
    config: RemoteClientConfig,
    connection: tokio::sync::Mutex<Option<BufStream<TcpStream>>>,
}

impl RemoteStreamClient {
    /// Create a new RemoteStreamClient (not yet connected)
    pub fn new(name: impl Into<String>, config: RemoteClientConfig) -> Self {
        Self {
            name: name.into(),
            config,
            connection: tokio::sync::Mutex::new(None),
        }
    }

    /// Create from params (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ProducerError> {
        let config = RemoteClientConfig::from_params(params)
            .map_err(|e| ProducerError::config_validation("stream.client.params", e))?;
        Ok(Self::new(name, config))
    }

    async fn round_trip(&self, batch: &Batch) -> Result<BatchResult, ProducerError> {
        let mut guard = self.connection.lock().await;
        let connection = guard
            .as_mut()
            .ok_or_else(|| ProducerError::connection("client not open"))?;

        let request = WireRequest {
            stream: &batch.stream,
            records: &batch.records,
        };
        let mut line = serde_json::to_vec(&request)
            .map_err(|e| ProducerError::Other(format!("request encode error: {e}")))?;
        line.push(b'\n');

        connection.write_all(&line).await?;
        connection.flush().await?;

        let mut response_line = String::new();
        let read = connection.read_line(&mut response_line).await?;
        if read == 0 {
            // Peer closed; drop the dead connection
            *guard = None;
            return Err(ProducerError::connection("connection closed by peer"));
        }

        let response: WireResponse = serde_json::from_str(&response_line)
            .map_err(|e| ProducerError::Other(format!("response decode error: {e}")))?;

        match response {
            WireResponse::Error { error } => Err(error.into_producer_error(&batch.stream)),
            WireResponse::Result(result) => Ok(result),
        }
    }
}

impl StreamClient for RemoteStreamClient {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "remote_client_open", skip(self), fields(addr = %self.config.addr))]
    async fn open(&mut self) -> Result<(), ProducerError> {
        let stream = TcpStream::connect(self.config.addr)
            .await
            .map_err(|e| ProducerError::connection(format!("{}: {e}", self.config.addr)))?;
        *self.connection.lock().await = Some(BufStream::new(stream));
        debug!(client = %self.name, addr = %self.config.addr, "RemoteStreamClient connected");
        Ok(())
    }

    #[instrument(
        name = "remote_client_submit",
        skip(self, batch),
        fields(client = %self.name, stream = %batch.stream, records = batch.len())
    )]
    async fn submit(&self, batch: &Batch) -> Result<BatchResult, ProducerError> {
        self.round_trip(batch).await
    }

    #[instrument(name = "remote_client_healthy", skip(self))]
    async fn healthy(&self) -> Result<bool, ProducerError> {
        Ok(self.connection.lock().await.is_some())
    }

    #[instrument(name = "remote_client_close", skip(self))]
    async fn close(&mut self) -> Result<(), ProducerError> {
        if let Some(mut connection) = self.connection.lock().await.take() {
            connection.shutdown().await?;
        }
        debug!(client = %self.name, "RemoteStreamClient closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;

    fn batch(keys: &[&str]) -> Batch {
        Batch::new(
            "orders",
            keys.iter()
                .map(|k| Record::new(*k, Bytes::from_static(b"x")))
                .collect(),
        )
    }

    /// One-shot server answering each request line with a fixed body
    async fn serve_lines(responses: Vec<String>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut stream = BufStream::new(stream);
            for response in responses {
                let mut request = String::new();
                if stream.read_line(&mut request).await.unwrap() == 0 {
                    return;
                }
                stream
                    .write_all(format!("{response}\n").as_bytes())
                    .await
                    .unwrap();
                stream.flush().await.unwrap();
            }
        });

        addr
    }

    #[test]
    fn test_config_from_params() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:9999".to_string());

        let config = RemoteClientConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 9999);

        assert!(RemoteClientConfig::from_params(&HashMap::new()).is_err());

        params.insert("addr".to_string(), "not-an-addr".to_string());
        assert!(RemoteClientConfig::from_params(&params).is_err());
    }

    #[tokio::test]
    async fn test_submit_round_trip() {
        let addr = serve_lines(vec![
            r#"{"failed_record_count": 0, "results": [{"sequence": "seq-1"}, {"sequence": "seq-2"}]}"#
                .to_string(),
        ])
        .await;

        let mut client = RemoteStreamClient::new("remote", RemoteClientConfig { addr });
        client.open().await.unwrap();

        let result = client.submit(&batch(&["a", "b"])).await.unwrap();
        assert!(result.fully_accepted());
        assert_eq!(result.results.len(), 2);

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_error_envelope_maps_to_throughput_exceeded() {
        let addr = serve_lines(vec![
            r#"{"error": {"code": "throughput_exceeded", "message": "slow down"}}"#.to_string(),
        ])
        .await;

        let mut client = RemoteStreamClient::new("remote", RemoteClientConfig { addr });
        client.open().await.unwrap();

        let err = client.submit(&batch(&["a"])).await.unwrap_err();
        assert!(err.is_throughput_exceeded());
    }

    #[tokio::test]
    async fn test_submit_without_open_fails() {
        let client = RemoteStreamClient::new(
            "remote",
            RemoteClientConfig {
                addr: "127.0.0.1:1".parse().unwrap(),
            },
        );
        let err = client.submit(&batch(&["a"])).await.unwrap_err();
        assert!(matches!(err, ProducerError::Connection { .. }));
    }
}
