//! `clear()` wipes the process-wide store, so it gets a test binary of
//! its own rather than racing the other shared-cache tests.

mod common;

use common::{process_cache_dir, url};
use reqguard::prelude::*;

#[test]
fn clear_wipes_the_shared_store() {
    let cache = SharedResponseCache::new(process_cache_dir()).expect("init cache");

    for entry in 0..4 {
        let target = url(&format!("http://clear.test/k{entry}"));
        let mut handle = cache
            .prepare(CacheMetadata::new(&target))
            .expect("prepare write");
        handle.write(b"payload");
        cache.insert(handle).expect("commit write");
    }
    assert!(cache.cache_size().expect("size") > 0);

    cache.clear().expect("clear");

    assert_eq!(cache.cache_size().expect("size"), 0);
    for entry in 0..4 {
        assert!(cache
            .data(&url(&format!("http://clear.test/k{entry}")))
            .expect("read")
            .is_none());
    }
}
