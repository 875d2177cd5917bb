// Copyright (c) 2026 radvd-fleet contributors
// SPDX-License-Identifier: AGPL-3.0

//! HTTP client for one router's instance API.

use radvd_fleet_core::domain::instance::Instance;
use reqwest::{Client, StatusCode};
use thiserror::Error;

/// Port the router agent listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8888;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },
}

/// Client for one router's REST surface.
#[derive(Clone)]
pub struct RouterClient {
    base_url: String,
    client: Client,
}

impl RouterClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    /// Client for a router addressed by its IPv6 router ID.
    pub fn for_router(router_id: &str, port: u16) -> Self {
        Self::new(format!("http://[{router_id}]:{port}"))
    }

    pub async fn list(&self) -> Result<Vec<Instance>, ClientError> {
        let url = format!("{}/interfaces", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = expect_status(response, StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    pub async fn get(&self, id: u32) -> Result<Instance, ClientError> {
        let url = format!("{}/interfaces/{id}", self.base_url);
        let response = self.client.get(&url).send().await?;
        let response = expect_status(response, StatusCode::OK).await?;
        Ok(response.json().await?)
    }

    pub async fn create(&self, instance: &Instance) -> Result<(), ClientError> {
        let url = format!("{}/interfaces/{}", self.base_url, instance.id);
        let response = self.client.post(&url).json(instance).send().await?;
        expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }

    pub async fn update(&self, instance: &Instance) -> Result<(), ClientError> {
        let url = format!("{}/interfaces/{}", self.base_url, instance.id);
        let response = self.client.put(&url).json(instance).send().await?;
        expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }

    pub async fn delete(&self, id: u32) -> Result<(), ClientError> {
        let url = format!("{}/interfaces/{id}", self.base_url);
        let response = self.client.delete(&url).send().await?;
        expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), ClientError> {
        let url = format!("{}/interfaces", self.base_url);
        let response = self.client.delete(&url).send().await?;
        expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }
}

async fn expect_status(
    response: reqwest::Response,
    expected: StatusCode,
) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status == expected {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::UnexpectedStatus { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: u32) -> Instance {
        Instance {
            id,
            router_id: "fd00::1".to_string(),
            name: "eth0".to_string(),
            ..Instance::default()
        }
    }

    #[tokio::test]
    async fn list_decodes_instances() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::to_string(&vec![instance(1), instance(2)]).unwrap();
        let mock = server
            .mock("GET", "/interfaces")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let listed = RouterClient::new(server.url()).list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].id, 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_expects_created() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/interfaces/1")
            .with_status(201)
            .create_async()
            .await;

        RouterClient::new(server.url())
            .create(&instance(1))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn conflict_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/interfaces/1")
            .with_status(409)
            .with_body(r#"{"error":"instance 1 already exists"}"#)
            .create_async()
            .await;

        let err = RouterClient::new(server.url())
            .create(&instance(1))
            .await
            .unwrap_err();
        match err {
            ClientError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::CONFLICT);
                assert!(body.contains("already exists"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn delete_all_expects_no_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/interfaces")
            .with_status(204)
            .create_async()
            .await;

        RouterClient::new(server.url()).delete_all().await.unwrap();
        mock.assert_async().await;
    }
}
