//! Ophalen van geotag-resultaten bij de backend.

use gloo_net::http::Request;
use thiserror::Error;
use wasm_bindgen_futures::spawn_local;

use crate::model::{GeotagResponse, ResponseError, parse_response};

pub const GEOTAG_URL: &str = "./geotag";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("verzoek mislukt: {0}")]
    Transport(#[from] gloo_net::Error),
    #[error("onverwachte HTTP-status {0}")]
    Status(u16),
    #[error(transparent)]
    Decode(#[from] ResponseError),
}

/// Queryparameter `vals`: getrimde namen, lege regels weggelaten, één per regel.
#[must_use]
pub fn geotag_query<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits vrije invoertekst in plaatsnamen.
#[must_use]
pub fn split_input(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Volgnummer van een uitgegeven verzoek.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

/// Alleen het laatst uitgegeven verzoek mag zijn antwoord nog tonen.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_ticket(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    #[must_use]
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }
}

pub async fn fetch_geotag<S: AsRef<str>>(names: &[S]) -> Result<GeotagResponse, FetchError> {
    let vals = geotag_query(names);
    let response = Request::get(GEOTAG_URL)
        .query([("vals", vals.as_str())])
        .send()
        .await?;
    if response.status() != 200 {
        return Err(FetchError::Status(response.status()));
    }
    let text = response.text().await?;
    Ok(parse_response(&text)?)
}

/// Start een verzoek op de achtergrond. De callback volgt alleen bij succes;
/// fouten worden gelogd en verder genegeerd.
pub fn geocode<F>(names: Vec<String>, callback: F)
where
    F: FnOnce(GeotagResponse) + 'static,
{
    spawn_local(async move {
        match fetch_geotag(&names).await {
            Ok(response) => callback(response),
            Err(err) => log::warn!("geotag voor {} namen mislukt: {err}", names.len()),
        }
    });
}
