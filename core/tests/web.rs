//! Exercises the exported surface inside a wasm runtime (`wasm-pack test --node`).
#![cfg(target_arch = "wasm32")]

use blame_inline_core::{parse_blame, truncate_message, BlameCache};
use wasm_bindgen_test::*;

const RAW: &str = "abcdef0123456789abcdef0123456789abcdef01 1 1 1\nauthor Alice\nauthor-mail <alice@example.com>\nauthor-time 1699913600\nsummary Initial commit\n\tfn main() {}\n";

#[wasm_bindgen_test]
fn parses_blame_in_wasm() {
    let json = parse_blame(RAW, 1_700_000_000);
    assert!(json.contains("\"author\":\"Alice\""));
    assert!(json.contains("\"date\":\"yesterday\""));
}

#[wasm_bindgen_test]
fn cache_round_trip_in_wasm() {
    let cache = BlameCache::new();
    cache.ingest("/ws/main.rs", RAW, 1_700_000_000);
    assert!(cache.get("/ws/main.rs").is_some());
    assert!(cache.invalidate("/ws/main.rs"));
    assert!(cache.get("/ws/main.rs").is_none());
}

#[wasm_bindgen_test]
fn truncates_in_wasm() {
    assert_eq!(truncate_message("hello world", 5), "hello...");
}
