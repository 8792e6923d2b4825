//! Query and list operation handlers.

use hyper::{body::Bytes, Request, Response};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_list_response, build_response, parse_filter_pairs, parse_list_options, MatchitParams,
};

/// Lists records with criteria filtering, sorting, and pagination.
///
/// # Endpoint
/// `GET /api/{resource}`
///
/// # Query Parameters
/// - `page`: Zero-based page number (default 0)
/// - `size`: Page size (capped by configuration)
/// - `sort`: `field,asc|desc`, repeatable
/// - `{field}.{operator}`: Criteria filter (e.g. `totalAmount.greaterThan=10`)
///
/// # Response
/// - **200 OK**: Returns a JSON array of DTOs; the `X-Total-Count` header
///   carries the total match count before paging
///
/// # Errors
/// - **400 Bad Request**: Unknown filter field, bad operator, or malformed
///   page/size/sort values
/// - **404 Not Found**: Unknown resource
///
/// # Examples
/// ```bash
/// # Second page of 20, newest first
/// curl "http://localhost:8080/api/orders?page=1&size=20&sort=placedAt,desc"
///
/// # Orders above a threshold
/// curl "http://localhost:8080/api/orders?totalAmount.greaterThan=100"
///
/// # Orders for one address
/// curl "http://localhost:8080/api/orders?addressId.equals=3"
/// ```
pub async fn list_records(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let resource = params.get("resource").unwrap_or("unknown");

    let options = parse_list_options(req.uri().query())?;
    let (dtos, total) = state.registry.list(resource, &options)?;

    let json = serde_json::to_vec(&dtos)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;

    build_list_response(200, json, total)
}

/// Counts records matching the criteria.
///
/// # Endpoint
/// `GET /api/{resource}/count`
///
/// # Query Parameters
/// - `{field}.{operator}`: Criteria filter, same syntax as the list endpoint
///
/// # Response
/// - **200 OK**: Returns the count as a bare JSON number
///
/// # Errors
/// - **400 Bad Request**: Unknown filter field or bad operator
/// - **404 Not Found**: Unknown resource
///
/// # Example
/// ```bash
/// curl "http://localhost:8080/api/orders/count?status.equals=SHIPPED"
/// ```
pub async fn count_records(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let resource = params.get("resource").unwrap_or("unknown");

    let filters = parse_filter_pairs(req.uri().query())?;
    let total = state.registry.count(resource, &filters)?;

    let json = serde_json::to_vec(&total)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;

    build_response(200, json)
}
