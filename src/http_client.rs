use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config::http_timeout_secs;
use crate::error::{FetchError, FetchResult};

const USER_AGENT: &str = concat!("team_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> FetchResult<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(http_timeout_secs()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))
    })
}
