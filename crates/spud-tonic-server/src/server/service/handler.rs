//! gRPC service implementation for the potato catalog.
//!
//! [`CatalogService`] implements the [`PotatoService`] trait generated from
//! `potato.proto`. Each call takes a fresh snapshot of the [`Catalog`], runs
//! the requested [`Query`] over it and wraps the resulting page in the
//! response message.
//!
//! ## Page addressing
//!
//! Requests select a page either with `page_token` or with `page_index`. The
//! continuation comes back in the same style: `next_page_index` for index
//! requests, `next_page_token` otherwise.

use crate::server::{
    catalog::Catalog,
    telemetry::{increment_query_errors, increment_requests, record_page_size},
};
use spud_tonic_core::{
    Error,
    proto::{
        GetPotatoRequest, GetPotatoResponse, GetPotatoesRequest, GetPotatoesResponse,
        potato_service_server::PotatoService,
    },
    spud::{Page, PageSelector, Query},
};
use tonic::{Request, Response, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Addressing {
    Token,
    Index,
}

/// Serves [`PotatoService`] from an in-memory [`Catalog`].
#[derive(Clone, Debug, Default)]
pub struct CatalogService {
    catalog: Catalog,
}

impl CatalogService {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    fn potato(&self, req: &GetPotatoRequest) -> Result<GetPotatoResponse, Error> {
        if req.potato_id.is_empty() {
            return Err(Error::InvalidRequest {
                field: "potatoId",
                reason: "potatoId must not be empty".to_string(),
            });
        }

        let potato = self.catalog.find(&req.potato_id).ok_or_else(|| Error::NotFound {
            id: req.potato_id.clone(),
        })?;
        Ok(GetPotatoResponse {
            potato: Some(potato),
        })
    }

    fn potatoes(&self, req: &GetPotatoesRequest) -> Result<GetPotatoesResponse, Error> {
        let (selector, addressing) = page_selector(req)?;
        tracing::debug!(
            order_by = %req.order_by,
            page_size = req.page_size,
            ?selector,
            "Querying potatoes"
        );

        let page = Query::new()
            .order_by(&req.order_by)
            .page_size(i64::from(req.page_size))
            .page(selector)
            .run(self.catalog.snapshot())?;

        into_response(page, addressing)
    }
}

fn page_selector(req: &GetPotatoesRequest) -> Result<(PageSelector<'_>, Addressing), Error> {
    match (req.page_index, req.page_token.as_str()) {
        (Some(_), token) if !token.is_empty() => Err(Error::InvalidRequest {
            field: "pageIndex",
            reason: "pageIndex and pageToken are mutually exclusive".to_string(),
        }),
        (Some(index), _) => Ok((PageSelector::Index(i64::from(index)), Addressing::Index)),
        (None, token) => Ok((PageSelector::Token(token), Addressing::Token)),
    }
}

fn into_response(
    page: Page<spud_tonic_core::proto::Potato>,
    addressing: Addressing,
) -> Result<GetPotatoesResponse, Error> {
    let mut response = GetPotatoesResponse::default();
    match addressing {
        Addressing::Token => response.next_page_token = page.next_token().unwrap_or_default(),
        Addressing::Index => {
            response.next_page_index = page
                .next_index
                .map(i32::try_from)
                .transpose()
                .map_err(|_| Error::Internal {
                    context: "next page index does not fit pageIndex".to_string(),
                })?;
        }
    }
    response.potatoes = page.records;
    Ok(response)
}

#[tonic::async_trait]
impl PotatoService for CatalogService {
    #[tracing::instrument(skip_all, fields(potato_id = %req.get_ref().potato_id))]
    async fn get_potato(
        &self,
        req: Request<GetPotatoRequest>,
    ) -> Result<Response<GetPotatoResponse>, Status> {
        increment_requests("GetPotato");
        match self.potato(req.get_ref()) {
            Ok(response) => Ok(Response::new(response)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get potato");
                increment_query_errors("GetPotato");
                Err(e.into())
            }
        }
    }

    /// Lists potatoes. Sorting is driven by `order_by`, pagination by
    /// `page_size` plus `page_token` or `page_index`.
    #[tracing::instrument(skip_all, fields(order_by = %req.get_ref().order_by, page_size = req.get_ref().page_size))]
    async fn get_potatoes(
        &self,
        req: Request<GetPotatoesRequest>,
    ) -> Result<Response<GetPotatoesResponse>, Status> {
        increment_requests("GetPotatoes");
        if let Ok(page_size) = u64::try_from(req.get_ref().page_size) {
            record_page_size(page_size);
        }

        match self.potatoes(req.get_ref()) {
            Ok(response) => {
                tracing::debug!(
                    returned = response.potatoes.len(),
                    next_page_token = %response.next_page_token,
                    next_page_index = ?response.next_page_index,
                    "Listed potatoes"
                );
                Ok(Response::new(response))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list potatoes");
                increment_query_errors("GetPotatoes");
                Err(e.into())
            }
        }
    }
}
