//! Local ("SDK") delivery.
//!
//! Serves a request without the remote delivery service by passing through the
//! requested window of the caller's insertions in their original order. This
//! is not a ranker.

use crate::error::{DeliveryError, Result};
use crate::options::DeliveryRequestOptions;
use crate::types::{Insertion, Request, Response};
use uuid::Uuid;

/// Resolved paging window: absolute offset and requested size.
fn resolve_window(req: &Request) -> (usize, usize) {
    let count = req.insertion.len();
    match req.paging {
        None => (0, count),
        Some(paging) => {
            let offset = usize::try_from(paging.offset).unwrap_or(0);
            let size = match usize::try_from(paging.size) {
                Ok(size) if size > 0 => size,
                _ => count,
            };
            (offset, size)
        }
    }
}

/// Fails if the requested window starts before the retrieved insertions.
pub fn check_paging(req: &Request, options: &DeliveryRequestOptions) -> Result<()> {
    let (offset, _) = resolve_window(req);
    let retrieval_offset = usize::try_from(options.retrieval_insertion_offset()).unwrap_or(0);
    if offset < retrieval_offset {
        return Err(DeliveryError::FallbackPaging {
            offset: i32::try_from(offset).unwrap_or(i32::MAX),
            retrieval_insertion_offset: options.retrieval_insertion_offset(),
        });
    }
    Ok(())
}

/// Serves `req` locally.
///
/// Assigns a fresh request id to both the request and the response. Output
/// positions are absolute (`paging.offset + i`), while the insertion list
/// itself is assumed to start at `retrieval_insertion_offset`.
pub fn deliver(req: &mut Request, options: &DeliveryRequestOptions) -> Result<Response> {
    check_paging(req, options)?;

    req.request_id = Uuid::new_v4().to_string();
    let mut resp = Response {
        request_id: req.request_id.clone(),
        insertion: Vec::new(),
    };

    let (offset, size) = resolve_window(req);
    let retrieval_offset = usize::try_from(options.retrieval_insertion_offset()).unwrap_or(0);
    let relative_offset = offset - retrieval_offset;
    let final_size = size.min(req.insertion.len().saturating_sub(relative_offset));

    resp.insertion = req
        .insertion
        .iter()
        .skip(relative_offset)
        .take(final_size)
        .enumerate()
        .map(|(i, source)| Insertion {
            insertion_id: Uuid::new_v4().to_string(),
            content_id: source.content_id.clone(),
            position: Some((offset + i) as u64),
        })
        .collect();

    Ok(resp)
}
