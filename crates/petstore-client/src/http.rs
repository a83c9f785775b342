use crate::{ClientConfig, ClientError};
use petstore_core::{ApiResponse, Pet, Status, STATUS_SEPARATOR};
use serde::de::DeserializeOwned;
use std::io::Read;

/// HTTP client for the pet catalog.
///
/// Routes:
/// - `GET    /pet`                        — list pets
/// - `GET    /pet/<id>`                   — fetch one pet
/// - `POST   /pet`                        — create (id assigned when absent)
/// - `PUT    /pet/<id>`                   — overwrite the fields of a stored pet
/// - `PUT    /pet`                        — replace a stored pet by its body id
/// - `DELETE /pet/<id>`                   — delete (idempotent)
/// - `GET    /pet/findByStatus?status=..` — filter by status labels
pub struct PetClient {
    config: ClientConfig,
    agent: ureq::Agent,
}

impl PetClient {
    pub fn new(config: ClientConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build(),
        );
        Self { config, agent }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn pet_url(&self, id: i64) -> String {
        format!("{}/pet/{id}", self.config.url)
    }

    fn collection_url(&self) -> String {
        format!("{}/pet", self.config.url)
    }

    fn read_response(
        url: &str,
        result: Result<ureq::http::Response<ureq::Body>, ureq::Error>,
    ) -> Result<(u16, Vec<u8>), ClientError> {
        let resp = result.map_err(|e| ClientError::Http(format!("{url}: {e}")))?;
        let code = resp.status().as_u16();
        let mut body = Vec::new();
        resp.into_body()
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok((code, body))
    }

    /// Turn a non-2xx response into the matching error variant.
    fn check_status(url: &str, code: u16, body: &[u8]) -> Result<(), ClientError> {
        if (200..300).contains(&code) {
            return Ok(());
        }
        let message = serde_json::from_slice::<ApiResponse>(body)
            .map(|r| r.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());
        match code {
            400 => Err(ClientError::InvalidArgument(message)),
            404 => Err(ClientError::NotFound(message)),
            _ => Err(ClientError::Http(format!("HTTP {code} for {url}: {message}"))),
        }
    }

    fn decode<T: DeserializeOwned>(url: &str, code: u16, body: &[u8]) -> Result<T, ClientError> {
        Self::check_status(url, code, body)?;
        serde_json::from_slice(body).map_err(|e| ClientError::Decode(format!("{url}: {e}")))
    }

    fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        tracing::debug!("GET {url}");
        let result = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .call();
        let (code, body) = Self::read_response(url, result)?;
        Self::decode(url, code, &body)
    }

    fn do_send(&self, method: &str, url: &str, pet: &Pet) -> Result<Pet, ClientError> {
        let payload = serde_json::to_vec(pet).map_err(|e| ClientError::Decode(e.to_string()))?;
        tracing::debug!("{method} {url} ({} bytes)", payload.len());
        let req = match method {
            "POST" => self.agent.post(url),
            _ => self.agent.put(url),
        };
        let result = req
            .header("Content-Type", "application/json")
            .send(payload.as_slice());
        let (code, body) = Self::read_response(url, result)?;
        Self::decode(url, code, &body)
    }

    /// `true` when the server answers its health route.
    pub fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.config.url);
        tracing::debug!("GET {url}");
        let result = self.agent.get(&url).call();
        let (code, _) = Self::read_response(&url, result)?;
        Ok(code == 200)
    }

    pub fn list_pets(&self) -> Result<Vec<Pet>, ClientError> {
        self.do_get(&self.collection_url())
    }

    pub fn get_pet(&self, id: i64) -> Result<Pet, ClientError> {
        self.do_get(&self.pet_url(id))
    }

    pub fn create_pet(&self, pet: &Pet) -> Result<Pet, ClientError> {
        self.do_send("POST", &self.collection_url(), pet)
    }

    pub fn update_pet(&self, id: i64, pet: &Pet) -> Result<Pet, ClientError> {
        self.do_send("PUT", &self.pet_url(id), pet)
    }

    pub fn replace_pet(&self, pet: &Pet) -> Result<Pet, ClientError> {
        self.do_send("PUT", &self.collection_url(), pet)
    }

    pub fn delete_pet(&self, id: i64) -> Result<(), ClientError> {
        let url = self.pet_url(id);
        tracing::debug!("DELETE {url}");
        let result = self.agent.delete(&url).call();
        let (code, body) = Self::read_response(&url, result)?;
        Self::check_status(&url, code, &body)
    }

    pub fn find_by_status(&self, statuses: &[Status]) -> Result<Vec<Pet>, ClientError> {
        let filter = statuses
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(STATUS_SEPARATOR);
        self.find_by_status_raw(&filter)
    }

    /// Send `filter` as the `status` query value without checking it locally.
    pub fn find_by_status_raw(&self, filter: &str) -> Result<Vec<Pet>, ClientError> {
        let url = format!(
            "{}/pet/findByStatus?status={}",
            self.config.url,
            urlencoding::encode(filter)
        );
        self.do_get(&url)
    }
}
