use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{AppConfig, Credentials};
use crate::domain::branch::BranchSpec;
use crate::domain::change::{Change, ChangeType, Changeset};
use crate::domain::work_item::WorkItem;
use crate::error::{AppError, AppResult};
use crate::services::{Connection, ServerConnector, VersionControlService, WorkItemService};

const CHANGE_PAGE_SIZE: usize = 1000;
const WORK_ITEM_BATCH_SIZE: usize = 200;
const TITLE_FIELD: &str = "System.Title";
const TYPE_FIELD: &str = "System.WorkItemType";

/// Opens sessions against a TFS / Azure DevOps Server project collection.
pub struct TfsConnector {
    base_url: String,
    credentials: Credentials,
    api_version: String,
}

impl TfsConnector {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            base_url: config.url.clone(),
            credentials: config.credentials.clone(),
            api_version: config.api_version.clone(),
        }
    }
}

impl ServerConnector for TfsConnector {
    fn connect(&self) -> AppResult<Connection> {
        let client = Arc::new(TfsClient::new(
            &self.base_url,
            &self.credentials,
            &self.api_version,
        )?);
        Ok(Connection {
            version_control: client.clone(),
            work_items: client,
        })
    }
}

pub struct TfsClient {
    http: Client,
    base_url: String,
    authorization: Option<String>,
    api_version: String,
}

impl TfsClient {
    pub fn new(base_url: &str, credentials: &Credentials, api_version: &str) -> AppResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|err| AppError::Connection(format!("failed to create HTTP client: {err}")))?;
        let authorization = credentials.token.as_deref().map(|token| {
            Self::auth_header(credentials.user.as_deref().unwrap_or_default(), token)
        });
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization,
            api_version: api_version.to_string(),
        })
    }

    fn auth_header(user: &str, token: &str) -> String {
        let credentials = format!("{user}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/_apis/{}", self.base_url, path)
    }

    async fn send(&self, url: &str, query: &[(&str, String)]) -> AppResult<Response> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .query(query)
            .query(&[("api-version", self.api_version.as_str())]);
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|err| AppError::Connection(format!("failed to call {url}: {err}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Connection(format!(
                "server rejected credentials for {url} ({status})"
            )));
        }
        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        failure: fn(String) -> AppError,
    ) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(failure(format!("server responded with {status}: {body}")));
        }
        response
            .json()
            .await
            .map_err(|err| failure(format!("failed to parse server response: {err}")))
    }

    async fn get_version_control<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self.send(url, query).await?;
        Self::read_json(response, AppError::VersionControl).await
    }

    async fn get_work_items<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self.send(url, query).await?;
        Self::read_json(response, AppError::WorkItemTracking).await
    }

    async fn work_items_batch(&self, ids: &[u32]) -> AppResult<Vec<WorkItem>> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(WORK_ITEM_BATCH_SIZE) {
            let ids = chunk
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",");
            // Deleted or restricted items come back as nulls instead of failing the batch.
            let page: ListResponse<Option<WorkItemDto>> = self
                .get_work_items(
                    &self.endpoint("wit/workitems"),
                    &[
                        ("ids", ids),
                        ("$expand", "relations".to_string()),
                        ("errorPolicy", "Omit".to_string()),
                    ],
                )
                .await?;
            let fetched = present_work_items(page);
            if fetched.len() < chunk.len() {
                debug!(
                    requested = chunk.len(),
                    received = fetched.len(),
                    "some associated work items are unavailable"
                );
            }
            items.extend(fetched);
        }
        Ok(items)
    }
}

#[async_trait]
impl VersionControlService for TfsClient {
    async fn changesets(
        &self,
        branch: &BranchSpec,
        skip: usize,
        top: usize,
    ) -> AppResult<Vec<Changeset>> {
        let page: ListResponse<ChangesetDto> = self
            .get_version_control(
                &self.endpoint("tfvc/changesets"),
                &[
                    ("searchCriteria.itemPath", branch.path.clone()),
                    ("searchCriteria.fromId", branch.from.to_string()),
                    ("searchCriteria.toId", branch.to.to_string()),
                    ("maxCommentLength", i32::MAX.to_string()),
                    ("$skip", skip.to_string()),
                    ("$top", top.to_string()),
                ],
            )
            .await?;
        debug!(
            branch = branch.path.as_str(),
            skip,
            received = page.value.len(),
            "fetched changeset page"
        );
        Ok(page.value.into_iter().map(Changeset::from).collect())
    }

    async fn changes(&self, changeset_id: u32) -> AppResult<Vec<Change>> {
        let url = self.endpoint(&format!("tfvc/changesets/{changeset_id}/changes"));
        let mut changes = Vec::new();
        loop {
            let page: ListResponse<ChangeDto> = self
                .get_version_control(
                    &url,
                    &[
                        ("$skip", changes.len().to_string()),
                        ("$top", CHANGE_PAGE_SIZE.to_string()),
                    ],
                )
                .await?;
            let received = page.value.len();
            changes.extend(page.value.into_iter().map(Change::from));
            if received < CHANGE_PAGE_SIZE {
                return Ok(changes);
            }
        }
    }

    async fn count_files(&self, scope_path: &str) -> AppResult<usize> {
        let response = self
            .send(
                &self.endpoint("tfvc/items"),
                &[
                    ("scopePath", scope_path.to_string()),
                    ("recursionLevel", "Full".to_string()),
                ],
            )
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            warn!(scope = scope_path, "module path does not exist");
            return Ok(0);
        }
        let items: ListResponse<ItemDto> =
            Self::read_json(response, AppError::VersionControl).await?;
        Ok(items.value.iter().filter(|item| !item.is_folder).count())
    }
}

#[async_trait]
impl WorkItemService for TfsClient {
    async fn linked_work_items(&self, changeset_id: u32) -> AppResult<Vec<WorkItem>> {
        let associated: ListResponse<AssociatedWorkItemDto> = self
            .get_work_items(
                &self.endpoint(&format!("tfvc/changesets/{changeset_id}/workItems")),
                &[],
            )
            .await?;
        let ids: Vec<u32> = associated.value.iter().map(|item| item.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let fetched = self.work_items_batch(&ids).await?;
        Ok(in_association_order(&ids, fetched))
    }

    async fn work_item(&self, id: u32) -> AppResult<WorkItem> {
        let item: WorkItemDto = self
            .get_work_items(
                &self.endpoint(&format!("wit/workitems/{id}")),
                &[("$expand", "relations".to_string())],
            )
            .await?;
        Ok(item.into())
    }
}

fn present_work_items(page: ListResponse<Option<WorkItemDto>>) -> Vec<WorkItem> {
    page.value.into_iter().flatten().map(WorkItem::from).collect()
}

/// Reorders batch results to follow the changeset's association list.
fn in_association_order(ids: &[u32], fetched: Vec<WorkItem>) -> Vec<WorkItem> {
    let mut by_id: HashMap<u32, WorkItem> =
        fetched.into_iter().map(|item| (item.id, item)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

/// Id of the work item a relation points at, if it points at one.
fn linked_work_item_id(url: &str) -> Option<u32> {
    let lower = url.to_ascii_lowercase();
    let index = lower.find("/_apis/wit/workitems/")?;
    url[index + "/_apis/wit/workitems/".len()..]
        .split(['/', '?'])
        .next()?
        .parse()
        .ok()
}

#[derive(Deserialize)]
struct ListResponse<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangesetDto {
    changeset_id: u32,
    #[serde(default)]
    comment: Option<String>,
    created_date: DateTime<Utc>,
}

impl From<ChangesetDto> for Changeset {
    fn from(dto: ChangesetDto) -> Self {
        Self {
            id: dto.changeset_id,
            comment: dto.comment.unwrap_or_default(),
            created: dto.created_date,
            changes: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangeDto {
    item: ItemDto,
    change_type: String,
}

impl From<ChangeDto> for Change {
    fn from(dto: ChangeDto) -> Self {
        Change::new(dto.item.path, ChangeType::parse(&dto.change_type))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto {
    path: String,
    #[serde(default)]
    is_folder: bool,
}

#[derive(Deserialize)]
struct AssociatedWorkItemDto {
    id: u32,
}

#[derive(Deserialize)]
struct WorkItemDto {
    id: u32,
    #[serde(default)]
    fields: HashMap<String, serde_json::Value>,
    #[serde(default)]
    relations: Option<Vec<RelationDto>>,
}

#[derive(Deserialize)]
struct RelationDto {
    url: String,
}

impl WorkItemDto {
    fn text_field(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

impl From<WorkItemDto> for WorkItem {
    fn from(dto: WorkItemDto) -> Self {
        let title = dto.text_field(TITLE_FIELD);
        let type_name = dto.text_field(TYPE_FIELD);
        let links = dto
            .relations
            .unwrap_or_default()
            .into_iter()
            .filter_map(|relation| linked_work_item_id(&relation.url));
        WorkItem::new(dto.id, type_name, title).with_links(links)
    }
}
