//! Integration tests for syncing a bucket into a directory

mod common;

use ::common::bucket::{Bucket, Content};
use ::common::crypto::ContentAttribute;
use ::common::distribute::DistributeError;
use ::common::hash::{data_path, HashAlgorithm};

#[tokio::test]
async fn test_shared_hash_fetched_once() {
    let env = common::setup_test_env();
    let bucket = common::publish(&env.remote, &[("a.txt", b"hello"), ("b.bin", b"hello")]);
    let hash = bucket.get("a.txt").unwrap().hash.clone();
    assert_eq!(bucket.get("b.bin").unwrap().hash, hash);

    let written = env.distributor.sync(&bucket, &env.target()).await.unwrap();

    assert_eq!(written, 2);
    assert_eq!(env.remote.blob_get_count(&hash), 1);
    let a = std::fs::read(env.target().join("a.txt")).unwrap();
    let b = std::fs::read(env.target().join("b.bin")).unwrap();
    assert_eq!(a, b"hello");
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_zero_size_entry_never_fetched() {
    let env = common::setup_test_env();
    let bucket = common::publish(&env.remote, &[("empty.txt", b""), ("full.txt", b"data")]);

    env.distributor.sync(&bucket, &env.target()).await.unwrap();

    let empty_hash = &bucket.get("empty.txt").unwrap().hash;
    assert_eq!(env.remote.blob_get_count(empty_hash), 0);
    let metadata = std::fs::metadata(env.target().join("empty.txt")).unwrap();
    assert!(metadata.is_file());
    assert_eq!(metadata.len(), 0);
}

#[tokio::test]
async fn test_zero_size_with_nonempty_hash_is_fetched() {
    let env = common::setup_test_env();
    let hash = env.remote.put_blob(HashAlgorithm::Md5, b"real bytes");
    let bucket = Bucket::from_contents(
        HashAlgorithm::Md5,
        [Content {
            path: "liar.txt".to_string(),
            hash: hash.clone(),
            size: 0,
            attr: ContentAttribute::Plain,
        }],
    )
    .unwrap();

    env.distributor.sync(&bucket, &env.target()).await.unwrap();

    assert_eq!(env.remote.blob_get_count(&hash), 1);
    let data = std::fs::read(env.target().join("liar.txt")).unwrap();
    assert_eq!(data, b"real bytes");
}

#[tokio::test]
async fn test_nested_directories_created() {
    let env = common::setup_test_env();
    let bucket = common::publish(
        &env.remote,
        &[("a/b/c/deep.txt", b"deep"), ("a/top.txt", b"top")],
    );

    env.distributor.sync(&bucket, &env.target()).await.unwrap();

    let deep = env.target().join("a").join("b").join("c").join("deep.txt");
    assert_eq!(std::fs::read(deep).unwrap(), b"deep");
    assert_eq!(
        std::fs::read(env.target().join("a").join("top.txt")).unwrap(),
        b"top"
    );
}

#[tokio::test]
async fn test_encrypted_entries_are_decrypted() {
    let env = common::setup_test_env();
    let bucket = common::publish_encrypted(&env.remote, &[("secret.txt", b"plaintext")]);

    env.distributor.sync(&bucket, &env.target()).await.unwrap();

    assert_eq!(
        std::fs::read(env.target().join("secret.txt")).unwrap(),
        b"plaintext"
    );
    // the cache keeps the ciphertext
    let hash = &bucket.get("secret.txt").unwrap().hash;
    let cached = env.fetcher().cache().read(hash).await.unwrap().unwrap();
    assert_ne!(cached.as_ref(), b"plaintext");
}

#[tokio::test]
async fn test_sync_overwrites_existing_files() {
    let env = common::setup_test_env();
    std::fs::create_dir_all(env.target()).unwrap();
    std::fs::write(env.target().join("a.txt"), b"stale contents").unwrap();
    let bucket = common::publish(&env.remote, &[("a.txt", b"fresh")]);

    env.distributor.sync(&bucket, &env.target()).await.unwrap();

    assert_eq!(std::fs::read(env.target().join("a.txt")).unwrap(), b"fresh");
}

#[tokio::test]
async fn test_sync_stops_at_first_error_without_rollback() {
    let env = common::setup_test_env();
    let good = common::publish(&env.remote, &[("a.txt", b"first"), ("c.txt", b"third")]);
    let missing = Content {
        path: "b.txt".to_string(),
        hash: HashAlgorithm::Md5.digest_hex(b"never uploaded"),
        size: 14,
        attr: ContentAttribute::Plain,
    };
    let bucket = Bucket::from_contents(
        HashAlgorithm::Md5,
        good.contents().cloned().chain([missing.clone()]),
    )
    .unwrap();

    let result = env.distributor.sync(&bucket, &env.target()).await;

    match result {
        Err(DistributeError::Fetch { path, .. }) => assert_eq!(path, "b.txt"),
        other => panic!("unexpected result: {:?}", other),
    }
    // entries are processed in path order: a.txt landed, c.txt never started
    assert!(env.target().join("a.txt").exists());
    assert!(!env.target().join("b.txt").exists());
    assert!(!env.target().join("c.txt").exists());
    // no retries during sync
    assert_eq!(env.remote.get_count(&data_path(&missing.hash)), 1);
}

#[tokio::test]
async fn test_sync_from_tag() {
    let env = common::setup_test_env();
    let bucket = common::publish(&env.remote, &[("readme.md", b"# hi")]);
    common::publish_manifest(&env.remote, &bucket, "stable");

    let loaded = env.fetcher().load_bucket("stable").await.unwrap();
    assert_eq!(loaded.tag(), Some("stable"));
    env.distributor.sync(&loaded, &env.target()).await.unwrap();

    assert_eq!(
        std::fs::read(env.target().join("readme.md")).unwrap(),
        b"# hi"
    );
}
