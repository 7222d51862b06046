// ABOUTME: Shared test doubles for integration tests
// ABOUTME: A recording fake of the pipeline API and a one-shot HTTP stub server

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use privacy_job_runner::remote::models::{
    DestinationConnection, JobRun, JobRunQuery, JobRunSummary, PostgresConnection, Project,
    QueueProject,
};
use privacy_job_runner::remote::PipelineApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetProject(String),
    UpdateConnection(String, PostgresConnection),
    EnqueueJob(QueueProject),
    ListJobRuns(JobRunQuery),
    GetJobRun(String),
}

pub struct FakeApi {
    pub project: Option<Project>,
    pub update_error: Option<&'static str>,
    pub enqueue_error: Option<&'static str>,
    pub list_error: Option<&'static str>,
    pub runs: Vec<JobRunSummary>,
    pub statuses: Mutex<VecDeque<&'static str>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    /// Project "42" writing to connection c1/dest/mydb, with one listed run "r9".
    pub fn new(statuses: &[&'static str]) -> Self {
        Self {
            project: Some(Project {
                destination_connection: DestinationConnection {
                    connection_id: "c1".to_string(),
                    connection_name: "dest".to_string(),
                    database: "mydb".to_string(),
                },
            }),
            update_error: None,
            enqueue_error: None,
            list_error: None,
            runs: vec![JobRunSummary {
                job_run_id: "r9".to_string(),
            }],
            statuses: Mutex::new(statuses.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn status_fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::GetJobRun(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PipelineApi for FakeApi {
    async fn get_project(&self, project_id: &str) -> anyhow::Result<Project> {
        self.record(Call::GetProject(project_id.to_string()));
        self.project
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Project lookup failed with status 404 Not Found"))
    }

    async fn update_connection(
        &self,
        connection_id: &str,
        connection: &PostgresConnection,
    ) -> anyhow::Result<()> {
        self.record(Call::UpdateConnection(
            connection_id.to_string(),
            connection.clone(),
        ));
        match self.update_error {
            Some(msg) => anyhow::bail!("{}", msg),
            None => Ok(()),
        }
    }

    async fn enqueue_job(&self, job: &QueueProject) -> anyhow::Result<()> {
        self.record(Call::EnqueueJob(job.clone()));
        match self.enqueue_error {
            Some(msg) => anyhow::bail!("{}", msg),
            None => Ok(()),
        }
    }

    async fn list_job_runs(&self, query: &JobRunQuery) -> anyhow::Result<Vec<JobRunSummary>> {
        self.record(Call::ListJobRuns(query.clone()));
        match self.list_error {
            Some(msg) => anyhow::bail!("{}", msg),
            None => Ok(self.runs.clone()),
        }
    }

    async fn get_job_run(&self, job_run_id: &str) -> anyhow::Result<JobRun> {
        self.record(Call::GetJobRun(job_run_id.to_string()));
        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or("PENDING");
        Ok(JobRun {
            status: status.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request_line: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Serves the canned `(status line, json body)` responses in order, one per connection.
pub struct StubServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub async fn start(responses: Vec<(&'static str, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                recorded.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        Self { base_url, requests }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "authorization" => authorization = Some(value.to_string()),
                _ => {}
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    RecordedRequest {
        request_line,
        authorization,
        body,
    }
}
