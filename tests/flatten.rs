//! Unit tests for the bundled compressed-tree decoder.

use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::json;
use sqs_forwarder::errors::ForwarderError;
use sqs_forwarder::transform::flatten::flatten_tree;
use sqs_forwarder::transform::{Decoder, TreeDecoder};
use std::io::Write;

fn deflate(value: &serde_json::Value) -> Bytes {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(value.to_string().as_bytes()).unwrap();
    Bytes::from(enc.finish().unwrap())
}

fn lines(records: Vec<Bytes>) -> Vec<String> {
    records
        .into_iter()
        .map(|b| String::from_utf8(b.to_vec()).unwrap())
        .collect()
}

#[tokio::test]
async fn flattens_branching_tree_in_key_order() {
    let payload = deflate(&json!({"a": {"b": {"c": 1, "d": 2}}}));
    let records = TreeDecoder::new().decode(&payload).await.unwrap();
    assert_eq!(lines(records), vec!["a,b,c,1", "a,b,d,2"]);
}

#[tokio::test]
async fn flattens_single_child_chain() {
    let payload = deflate(&json!({"a": {"b": {"c": 1}}}));
    let records = TreeDecoder::new().decode(&payload).await.unwrap();
    assert_eq!(lines(records), vec!["a,b,c,1"]);
}

#[tokio::test]
async fn decoding_twice_gives_identical_sequences() {
    let payload = deflate(&json!({"x": {"y": 1, "z": {"w": "v", "q": null}}, "k": true}));
    let decoder = TreeDecoder::new();
    let first = decoder.decode(&payload).await.unwrap();
    let second = decoder.decode(&payload).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_tree_is_success_with_zero_records() {
    let payload = deflate(&json!({}));
    let records = TreeDecoder::new().decode(&payload).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn garbage_compression_is_a_decode_error() {
    let payload = Bytes::from_static(b"\x00\x01\x02not zlib");
    let err = TreeDecoder::new().decode(&payload).await.unwrap_err();
    assert!(matches!(err, ForwarderError::Decode(_)));
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(b"{not json").unwrap();
    let payload = Bytes::from(enc.finish().unwrap());
    let err = TreeDecoder::new().decode(&payload).await.unwrap_err();
    assert!(matches!(err, ForwarderError::Decode(_)));
}

#[tokio::test]
async fn non_object_top_level_is_a_decode_error() {
    let payload = deflate(&json!([1, 2, 3]));
    let err = TreeDecoder::new().decode(&payload).await.unwrap_err();
    assert!(matches!(err, ForwarderError::Decode(_)));
}

#[tokio::test]
async fn custom_delimiter_joins_path_and_value() {
    let payload = deflate(&json!({"a": {"b": "x"}}));
    let records = TreeDecoder::with_delimiter("/").decode(&payload).await.unwrap();
    assert_eq!(lines(records), vec!["a/b/x"]);
}

#[test]
fn string_leaves_join_unquoted() {
    let tree = json!({"a": {"b": "hello", "c": false}});
    let got = flatten_tree(&tree, ",").unwrap();
    assert_eq!(got, vec!["a,b,hello", "a,c,false"]);
}

#[test]
fn arrays_branch_on_element_index() {
    let tree = json!({"a": [{"b": 1}, 2]});
    let got = flatten_tree(&tree, ",").unwrap();
    assert_eq!(got, vec!["a,0,b,1", "a,1,2"]);
}
