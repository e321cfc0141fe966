use std::time::Duration;

use super::error::DeliveryError;

/// Posts a JSON body and returns the HTTP status.
///
/// Implementations block; the dispatcher calls them from `spawn_blocking`.
pub trait Transport: Send + Sync + 'static {
    fn post(&self, url: &str, body: &str) -> Result<u16, DeliveryError>;
}

pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, body: &str) -> Result<u16, DeliveryError> {
        match self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_string(body)
        {
            Ok(response) => Ok(response.status()),
            Err(ureq::Error::Status(code, _)) => Err(DeliveryError::Status(code)),
            Err(ureq::Error::Transport(t)) => Err(DeliveryError::Transport(t.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Accepts one request, hands back (request head, body), and answers with `status`.
    fn one_shot_server(status: u16) -> (String, thread::JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let join = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
                head.push_str(&line);
            }

            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {} X\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            )
            .unwrap();

            (head, String::from_utf8(body).unwrap())
        });

        (addr, join)
    }

    #[test]
    fn test_post_sends_json() {
        let (addr, server) = one_shot_server(201);
        let transport = HttpTransport::new(Duration::from_secs(2));

        let url = format!("http://{}/api/v1/mpu6500", addr);
        let status = transport.post(&url, r#"{"data":{}}"#).unwrap();
        let (head, body) = server.join().unwrap();

        assert_eq!(status, 201);
        assert!(head.starts_with("POST /api/v1/mpu6500 HTTP/1.1"));
        assert!(head
            .to_ascii_lowercase()
            .contains("content-type: application/json"));
        assert_eq!(body, r#"{"data":{}}"#);
    }

    #[test]
    fn test_error_status_is_reported() {
        let (addr, server) = one_shot_server(500);
        let transport = HttpTransport::new(Duration::from_secs(2));

        let err = transport
            .post(&format!("http://{}/api/v1/neo7m", addr), "{}")
            .unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, DeliveryError::Status(500)));
    }

    #[test]
    fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(Duration::from_millis(500));
        let err = transport
            .post(&format!("http://{}/api/v1/neo7m", addr), "{}")
            .unwrap_err();

        assert!(err.is_transport());
    }
}
