use std::time::Duration;

use reqwest::{Client, Error};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpClient;

impl HttpClient {
  pub fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
  }

  /// Client shared by metadata calls and upstream media fetches.
  ///
  /// No overall request timeout is set: media bodies may stream for many
  /// minutes. Metadata calls set their own per-request timeout.
  pub fn new(user_agent: Option<&str>) -> Result<Client, Error> {
    Client::builder()
      .user_agent(user_agent.map(str::to_string).unwrap_or_else(Self::default_user_agent))
      .connect_timeout(CONNECT_TIMEOUT)
      .build()
  }
}
