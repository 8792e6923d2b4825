//! CRUD (Create, Read, Update, Delete) operation handlers.

use hyper::{body::Bytes, Request, Response};

use crate::router::{AppState, RouterError};

use super::request_utils::{
    build_empty_response, build_response, parse_json_body, read_request_body_with_timeout,
    MatchitParams,
};

/// Creates a new record.
///
/// # Endpoint
/// `POST /api/{resource}`
///
/// # Request Body
/// Flat entity DTO without an `id`:
/// ```json
/// {
///   "reference": "ORD-1",
///   "totalAmount": 12.5,
///   "addressId": 3
/// }
/// ```
///
/// # Response
/// - **201 Created**: Returns the stored DTO with its assigned id
///
/// # Errors
/// - **400 Bad Request**: Body carries an id, fails validation, or
///   references a record that does not exist
/// - **404 Not Found**: Unknown resource
///
/// # Example
/// ```bash
/// curl -X POST http://localhost:8080/api/orders \
///   -H "Content-Type: application/json" \
///   -d '{"reference": "ORD-1", "totalAmount": 12.5}'
/// ```
pub async fn create_record(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let resource = params.get("resource").unwrap_or("unknown").to_string();

    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let body = parse_json_body(&body_bytes)?;

    let dto = state.registry.insert(&resource, &body)?;

    let json = serde_json::to_vec(&dto)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;

    build_response(201, json)
}

/// Reads a record by id.
///
/// # Endpoint
/// `GET /api/{resource}/{id}`
///
/// # Response
/// - **200 OK**: Returns the entity DTO
///
/// # Errors
/// - **400 Bad Request**: Malformed id for the entity's identifier kind
/// - **404 Not Found**: Unknown resource or record
///
/// # Example
/// ```bash
/// curl http://localhost:8080/api/orders/1
/// ```
pub async fn read_record(
    _req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let resource = params.get("resource").unwrap_or("unknown");
    let raw_id = params.get("id").unwrap_or("unknown");

    let dto = state.registry.find(resource, raw_id)?;

    let json = serde_json::to_vec(&dto)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;

    build_response(200, json)
}

/// Fully replaces a record.
///
/// # Endpoint
/// `PUT /api/{resource}/{id}`
///
/// # Request Body
/// Full entity DTO; the `id` is required and must match the path.
///
/// # Response
/// - **200 OK**: Returns the stored DTO
///
/// # Errors
/// - **400 Bad Request**: Missing or mismatching body id, or validation failure
/// - **404 Not Found**: Unknown resource or record
///
/// # Notes
/// - Optional fields absent from the body are cleared
///
/// # Example
/// ```bash
/// curl -X PUT http://localhost:8080/api/orders/1 \
///   -H "Content-Type: application/json" \
///   -d '{"id": 1, "reference": "ORD-1", "totalAmount": 20.0}'
/// ```
pub async fn replace_record(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let resource = params.get("resource").unwrap_or("unknown").to_string();
    let raw_id = params.get("id").unwrap_or("unknown").to_string();

    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let body = parse_json_body(&body_bytes)?;

    let dto = state.registry.replace(&resource, &raw_id, &body)?;

    let json = serde_json::to_vec(&dto)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;

    build_response(200, json)
}

/// Partially updates a record with merge-patch semantics.
///
/// # Endpoint
/// `PATCH /api/{resource}/{id}`
///
/// # Request Body
/// Any subset of DTO keys; a present null clears the value, an absent key
/// leaves it unchanged:
/// ```json
/// {
///   "totalAmount": null,
///   "addressId": 5
/// }
/// ```
///
/// # Response
/// - **200 OK**: Returns the merged DTO
///
/// # Errors
/// - **400 Bad Request**: Body id mismatch, clearing a required value, or
///   validation failure
/// - **404 Not Found**: Unknown resource or record
///
/// # Example
/// ```bash
/// curl -X PATCH http://localhost:8080/api/orders/1 \
///   -H "Content-Type: application/json" \
///   -d '{"totalAmount": 25.0}'
/// ```
pub async fn patch_record(
    req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let resource = params.get("resource").unwrap_or("unknown").to_string();
    let raw_id = params.get("id").unwrap_or("unknown").to_string();

    let body_bytes = read_request_body_with_timeout(req, state.config.request_timeout_ms).await?;
    let body = parse_json_body(&body_bytes)?;

    let dto = state.registry.merge_patch(&resource, &raw_id, &body)?;

    let json = serde_json::to_vec(&dto)
        .map_err(|e| RouterError::InternalError(format!("Failed to serialize response: {}", e)))?;

    build_response(200, json)
}

/// Deletes a record.
///
/// # Endpoint
/// `DELETE /api/{resource}/{id}`
///
/// # Response
/// - **204 No Content**: Record successfully deleted
///
/// # Errors
/// - **400 Bad Request**: Malformed id for the entity's identifier kind
/// - **404 Not Found**: Unknown resource or record
///
/// # Example
/// ```bash
/// curl -X DELETE http://localhost:8080/api/orders/1
/// ```
pub async fn delete_record(
    _req: Request<hyper::body::Incoming>,
    params: MatchitParams<'_, '_>,
    state: AppState,
) -> Result<Response<Bytes>, RouterError> {
    let resource = params.get("resource").unwrap_or("unknown");
    let raw_id = params.get("id").unwrap_or("unknown");

    state.registry.delete(resource, raw_id)?;

    build_empty_response(204)
}
