// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{call, get_request, make_state};

#[tokio::test]
async fn unknown_route_is_404() {
    let router = build_router(make_state());
    let (status, _) = call(router, get_request("/does/not/exist")).await;
    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reconcile_metrics_is_reachable_through_the_full_router() {
    let router = build_router(make_state());
    let (status, body) = call(router, get_request("/reconcile/metrics")).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    let json = crate::test_support::parse_json(body);
    assert_eq!(json["metrics"]["staleClaimsRetried"], 0);
}